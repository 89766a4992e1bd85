//! Version-checked authentication of session tokens.

use serde::Serialize;
use tracing::debug;

use super::token::TokenSigner;
use crate::error::{FolioError, Result};
use crate::models::INITIAL_TOKEN_VERSION;
use crate::store::{Collection, Filter};

/// Looks up an account's current token version.
///
/// Returns `Ok(None)` when the account does not exist.
pub trait TokenVersionSource {
    fn current_token_version(&self, subject_id: &str) -> Result<Option<u64>>;
}

impl<F> TokenVersionSource for F
where
    F: Fn(&str) -> Result<Option<u64>>,
{
    fn current_token_version(&self, subject_id: &str) -> Result<Option<u64>> {
        self(subject_id)
    }
}

/// Accounts collection lookup by `id`. A record without `token_version` is
/// at the initial version; any other non-integer value is rejected.
impl TokenVersionSource for Collection {
    fn current_token_version(&self, subject_id: &str) -> Result<Option<u64>> {
        let Some(account) = self.find_one(&Filter::by_id(subject_id))? else {
            return Ok(None);
        };
        match account.get("token_version") {
            None => Ok(Some(INITIAL_TOKEN_VERSION)),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                FolioError::Validation(format!(
                    "Account {} has a malformed token_version: {}",
                    subject_id, value
                ))
            }),
        }
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Verify a token and check it against the subject's current token version.
///
/// # Errors
///
/// - `FolioError::InvalidToken` / `FolioError::ExpiredToken` from verification
/// - `FolioError::SubjectNotFound` if the account no longer exists
/// - `FolioError::RevokedToken` if the account's token version changed
///   since the token was issued
pub fn authenticate<S>(signer: &TokenSigner, token: &str, source: &S) -> Result<Identity>
where
    S: TokenVersionSource + ?Sized,
{
    let claims = signer.verify(token)?;

    let current = source
        .current_token_version(&claims.sub)?
        .ok_or_else(|| FolioError::SubjectNotFound(claims.sub.clone()))?;
    if current != claims.token_version {
        debug!(
            subject = %claims.sub,
            token_version = claims.token_version,
            current_version = current,
            "Rejected token from an older version"
        );
        return Err(FolioError::RevokedToken);
    }

    Ok(Identity {
        email: claims.email().map(str::to_string),
        id: claims.sub,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use std::cell::Cell;

    fn signer() -> TokenSigner {
        TokenSigner::new("session-test-secret").unwrap()
    }

    fn fixed(version: Option<u64>) -> impl Fn(&str) -> Result<Option<u64>> {
        move |_: &str| Ok(version)
    }

    #[test]
    fn test_matching_version_authenticates() {
        let mut claims = Map::new();
        claims.insert("email".to_string(), json!("a@example.com"));
        let token = signer().issue("admin-1", claims, 1).unwrap();

        let identity = authenticate(&signer(), &token, &fixed(Some(1))).unwrap();

        assert_eq!(identity.id, "admin-1");
        assert_eq!(identity.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_bumped_version_revokes() {
        let token = signer().issue("admin-1", Map::new(), 1).unwrap();
        let current = Cell::new(1);
        let source = |_: &str| -> Result<Option<u64>> { Ok(Some(current.get())) };

        assert!(authenticate(&signer(), &token, &source).is_ok());
        current.set(2);
        assert!(matches!(
            authenticate(&signer(), &token, &source),
            Err(FolioError::RevokedToken)
        ));
    }

    #[test]
    fn test_missing_subject() {
        let token = signer().issue("ghost", Map::new(), 1).unwrap();

        let result = authenticate(&signer(), &token, &fixed(None));
        assert!(matches!(result, Err(FolioError::SubjectNotFound(id)) if id == "ghost"));
    }

    #[test]
    fn test_lookup_is_skipped_for_invalid_tokens() {
        let looked_up = Cell::new(false);
        let source = |_: &str| -> Result<Option<u64>> {
            looked_up.set(true);
            Ok(Some(1))
        };

        let result = authenticate(&signer(), "not-a-token", &source);
        assert!(matches!(result, Err(FolioError::InvalidToken(_))));
        assert!(!looked_up.get());
    }

    #[test]
    fn test_lookup_errors_propagate() {
        let token = signer().issue("admin-1", Map::new(), 1).unwrap();
        let source = |_: &str| -> Result<Option<u64>> {
            Err(FolioError::Storage("disk unavailable".to_string()))
        };

        let result = authenticate(&signer(), &token, &source);
        assert!(matches!(result, Err(FolioError::Storage(_))));
    }
}
