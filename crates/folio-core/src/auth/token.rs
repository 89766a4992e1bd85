//! Session token issuing and verification.
//!
//! Tokens have three base64url segments, `header.claims.signature`, in the
//! familiar JWT layout. The signature is a keyed BLAKE3 MAC over the first two
//! segments, keyed with a subkey derived from the server secret.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zeroize::ZeroizeOnDrop;

use crate::error::{FolioError, Result};

/// Hours a session token stays valid after issue.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Context string for deriving the MAC key from the server secret.
const KEY_CONTEXT: &str = "folio session tokens v1 mac key";

const TOKEN_HEADER: &str = r#"{"alg":"BLAKE3","typ":"JWT"}"#;

/// Claim names the signer owns; callers cannot supply them as extras.
const RESERVED_CLAIMS: [&str; 4] = ["sub", "token_version", "iat", "exp"];

const MAC_LENGTH: usize = 32;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (account) id
    pub sub: String,

    /// Account token version at issue time
    pub token_version: u64,

    /// Issued-at, Unix seconds
    pub iat: i64,

    /// Expiry, Unix seconds
    pub exp: i64,

    /// Auxiliary identity claims such as `email`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionClaims {
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    pub fn email(&self) -> Option<&str> {
        self.claim("email").and_then(Value::as_str)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Issues and verifies session tokens with a server-side secret.
///
/// The derived key is zeroized when the signer is dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct TokenSigner {
    key: [u8; MAC_LENGTH],
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl TokenSigner {
    /// Create a signer from the server secret.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::Config` if the secret is empty or whitespace.
    /// Callers should construct the signer at startup so a missing secret
    /// stops the process before any request is served.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(FolioError::Config(
                "Token signing secret is not set".to_string(),
            ));
        }
        Ok(Self {
            key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
        })
    }

    /// Issue a token valid for 24 hours from now.
    pub fn issue(
        &self,
        subject_id: &str,
        claims: Map<String, Value>,
        token_version: u64,
    ) -> Result<String> {
        self.issue_at(subject_id, claims, token_version, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::InvalidInput` if the subject is empty or an extra
    /// claim uses a reserved name (`sub`, `token_version`, `iat`, `exp`).
    pub fn issue_at(
        &self,
        subject_id: &str,
        claims: Map<String, Value>,
        token_version: u64,
        issued_at: DateTime<Utc>,
    ) -> Result<String> {
        if subject_id.is_empty() {
            return Err(FolioError::InvalidInput(
                "Token subject cannot be empty".to_string(),
            ));
        }
        if let Some(name) = RESERVED_CLAIMS.iter().find(|name| claims.contains_key(**name)) {
            return Err(FolioError::InvalidInput(format!(
                "Claim name is reserved: {}",
                name
            )));
        }

        let expires_at = issued_at + Duration::hours(TOKEN_LIFETIME_HOURS);
        let claims = SessionClaims {
            sub: subject_id.to_string(),
            token_version,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            extra: claims,
        };
        let payload = serde_json::to_vec(&claims)
            .map_err(|e| FolioError::Crypto(format!("Claims encoding failed: {}", e)))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(TOKEN_HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.sign(&signing_input);
        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(signature.as_bytes())
        ))
    }

    /// Check signature and expiry against the current time.
    ///
    /// The token version is not checked here; see
    /// [`authenticate`](super::authenticate).
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        self.verify_at(token, Utc::now())
    }

    /// Check signature and expiry as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// - `FolioError::InvalidToken` if the token is malformed or its
    ///   signature does not match
    /// - `FolioError::ExpiredToken` if `now` is at or past the expiry
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims> {
        let token = token.trim();
        let Some((signing_input, signature)) = token.rsplit_once('.') else {
            return Err(FolioError::InvalidToken(
                "Expected three token segments".to_string(),
            ));
        };
        let Some((header, payload)) = signing_input.split_once('.') else {
            return Err(FolioError::InvalidToken(
                "Expected three token segments".to_string(),
            ));
        };
        if payload.contains('.') {
            return Err(FolioError::InvalidToken(
                "Expected three token segments".to_string(),
            ));
        }

        if decode_segment(header)? != TOKEN_HEADER.as_bytes() {
            return Err(FolioError::InvalidToken(
                "Unsupported token header".to_string(),
            ));
        }

        let signature: [u8; MAC_LENGTH] = decode_segment(signature)?
            .try_into()
            .map_err(|_| FolioError::InvalidToken("Bad signature length".to_string()))?;
        // blake3::Hash equality is constant-time.
        if self.sign(signing_input) != blake3::Hash::from(signature) {
            return Err(FolioError::InvalidToken(
                "Signature mismatch".to_string(),
            ));
        }

        let claims: SessionClaims = serde_json::from_slice(&decode_segment(payload)?)
            .map_err(|e| FolioError::InvalidToken(format!("Bad claims: {}", e)))?;
        if now.timestamp() >= claims.exp {
            return Err(FolioError::ExpiredToken);
        }

        Ok(claims)
    }

    fn sign(&self, signing_input: &str) -> blake3::Hash {
        blake3::keyed_hash(&self.key, signing_input.as_bytes())
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| FolioError::InvalidToken(format!("Bad base64 segment: {}", e)))
}
