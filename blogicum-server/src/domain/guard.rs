use super::error::DomainError;
use super::viewer::Viewer;

pub(crate) fn can_mutate(owner_id: i64, viewer: &Viewer) -> bool {
    viewer.is_authenticated() && viewer.is(owner_id)
}

/// Anonymous viewers get `AuthenticationRequired`, other users
/// `PermissionDenied`.
pub(crate) fn ensure_can_mutate(owner_id: i64, viewer: &Viewer) -> Result<i64, DomainError> {
    let user_id = viewer.require_authenticated()?;
    if !can_mutate(owner_id, viewer) {
        return Err(DomainError::PermissionDenied);
    }
    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::{DomainError, Viewer, can_mutate, ensure_can_mutate};

    #[test]
    fn only_owner_can_mutate() {
        assert!(can_mutate(3, &Viewer::User(3)));
        assert!(!can_mutate(3, &Viewer::User(4)));
        assert!(!can_mutate(3, &Viewer::Anonymous));
    }

    #[test]
    fn anonymous_is_asked_to_authenticate() {
        let err = ensure_can_mutate(3, &Viewer::Anonymous).expect_err("must fail");
        assert!(matches!(err, DomainError::AuthenticationRequired));
    }

    #[test]
    fn other_user_is_denied() {
        let err = ensure_can_mutate(3, &Viewer::User(4)).expect_err("must fail");
        assert!(matches!(err, DomainError::PermissionDenied));
        assert_eq!(err.to_string(), "you are not the author of this object");
    }

    #[test]
    fn owner_passes_with_own_id() {
        let user_id = ensure_can_mutate(3, &Viewer::User(3)).expect("owner must pass");
        assert_eq!(user_id, 3);
    }
}
