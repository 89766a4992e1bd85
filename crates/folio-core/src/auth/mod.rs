//! Authentication for the admin backend.
//!
//! - **Passwords**: Argon2id hashes in PHC string format. The salt and the
//!   cost parameters travel inside the hash string, so verification needs
//!   nothing else.
//! - **Session tokens**: signed with a keyed BLAKE3 MAC over a JSON claims
//!   payload, valid for 24 hours from issue.
//! - **Revocation**: every token carries the account's `token_version`.
//!   Bumping the stored version (on password change) rejects every token
//!   minted before it, without any server-side token list.
//!
//! Token lifecycle: issued, then valid until it either expires (time) or is
//! revoked (version mismatch). Both end states are terminal.

pub mod password;
mod session;
pub mod token;

pub use password::{hash_password, validate_new_password, verify_password};
pub use session::{authenticate, Identity, TokenVersionSource};
pub use token::{SessionClaims, TokenSigner, TOKEN_LIFETIME_HOURS};
