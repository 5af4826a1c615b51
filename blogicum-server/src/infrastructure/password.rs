use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};

use crate::domain::error::DomainError;

// Argon2id, 19 MiB, 2 passes, 1 lane.
const MEMORY_KIB: u32 = 19 * 1024;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

/// Hash of no real password, verified when the account is unknown so both
/// failure paths cost the same.
const DECOY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

fn hasher() -> Result<Argon2<'static>, DomainError> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None)
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub(crate) fn hash_password(raw: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()?
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

/// `InvalidCredentials` on mismatch, `Unexpected` on a corrupt stored hash.
pub(crate) fn verify_password(raw: &str, stored_hash: &str) -> Result<(), DomainError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|err| DomainError::Unexpected(err.to_string()))?;
    hasher()?
        .verify_password(raw.as_bytes(), &parsed)
        .map_err(|err| match err {
            PasswordHashError::Password => DomainError::InvalidCredentials,
            other => DomainError::Unexpected(other.to_string()),
        })
}

pub(crate) fn verify_against_decoy(raw: &str) -> Result<(), DomainError> {
    match verify_password(raw, DECOY_HASH) {
        Ok(()) | Err(DomainError::InvalidCredentials) => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_against_decoy, verify_password};
    use crate::domain::error::DomainError;

    #[test]
    fn hashed_password_verifies_and_rejects_others() {
        let hash = hash_password("correct-password").expect("hash must be created");
        assert!(hash.starts_with("$argon2id$"));

        verify_password("correct-password", &hash).expect("same password must verify");
        let err = verify_password("wrong-password", &hash).expect_err("must not verify");
        assert!(matches!(err, DomainError::InvalidCredentials));
    }

    #[test]
    fn corrupt_stored_hash_is_unexpected() {
        let err = verify_password("any", "not-a-phc-string").expect_err("must fail");
        assert!(matches!(err, DomainError::Unexpected(_)));
    }

    #[test]
    fn decoy_verification_never_reports_a_mismatch() {
        verify_against_decoy("whatever").expect("decoy check must not fail");
    }
}
