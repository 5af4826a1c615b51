use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::application::catalog_service::CatalogImport;

pub(crate) async fn read_catalog_fixture(path: &Path) -> Result<CatalogImport> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read catalog fixture {}", path.display()))?;
    let import = parse_catalog_fixture(&raw)
        .with_context(|| format!("failed to parse catalog fixture {}", path.display()))?;

    info!(path = %path.display(), "catalog fixture loaded");
    Ok(import)
}

fn parse_catalog_fixture(raw: &str) -> Result<CatalogImport> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::parse_catalog_fixture;

    #[test]
    fn missing_sections_default_to_empty() {
        let import = parse_catalog_fixture(r#"{"locations": [{"name": "Paris"}]}"#)
            .expect("fixture must parse");
        assert!(import.categories.is_empty());
        assert_eq!(import.locations.len(), 1);
    }

    #[test]
    fn malformed_fixture_is_an_error() {
        assert!(parse_catalog_fixture("[1, 2]").is_err());
    }
}
