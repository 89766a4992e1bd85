//! Admin account operations: bootstrap, login, session checks and
//! password rotation.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::auth::{
    authenticate, hash_password, validate_new_password, verify_password, Identity, TokenSigner,
};
use crate::error::{FolioError, Result};
use crate::models::{Admin, AdminProfile};
use crate::store::{from_document, to_document, Collection, Filter, Store};

/// Credentials for the admin account created on first start.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl BootstrapAdmin {
    pub const DEFAULT_EMAIL: &'static str = "admin@example.com";
    pub const DEFAULT_PASSWORD: &'static str = "change-me-immediately";
    pub const DEFAULT_NAME: &'static str = "System Administrator";

    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
        }
    }

    /// Well-known credentials for local development only.
    pub fn development_default() -> Self {
        Self::new(
            Self::DEFAULT_EMAIL,
            Self::DEFAULT_PASSWORD,
            Self::DEFAULT_NAME,
        )
    }
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

/// A successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginSession {
    pub access_token: String,
    pub token_type: &'static str,
    pub admin: AdminProfile,
}

/// Admin accounts backed by the `admins` collection.
#[derive(Debug, Clone)]
pub struct AdminAccounts {
    admins: Collection,
    signer: TokenSigner,
}

impl AdminAccounts {
    pub fn new(store: &Store, signer: TokenSigner) -> Self {
        Self {
            admins: store.records::<Admin>(),
            signer,
        }
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Admin>> {
        self.admins.find_one_as(&Filter::new().eq("email", email))
    }

    fn find_by_id(&self, admin_id: &str) -> Result<Option<Admin>> {
        self.admins.find_one_as(&Filter::by_id(admin_id))
    }

    /// Create the bootstrap admin unless an admin with its email exists.
    ///
    /// Returns `true` if an account was created.
    pub fn ensure_bootstrap_admin(&self, bootstrap: &BootstrapAdmin) -> Result<bool> {
        if bootstrap.email.trim().is_empty() {
            return Err(FolioError::InvalidInput(
                "Bootstrap admin email cannot be empty".to_string(),
            ));
        }
        if self.find_by_email(&bootstrap.email)?.is_some() {
            return Ok(false);
        }

        // Re-checked under the writer lock; another caller may have seeded
        // the same email since the lookup above.
        let admin = Admin::new(
            bootstrap.email.clone(),
            hash_password(&bootstrap.password)?,
            bootstrap.name.clone(),
        );
        let created = self.admins.insert_unless_exists(
            &Filter::new().eq("email", admin.email.as_str()),
            to_document(&admin)?,
        )?;
        if created {
            info!(email = %admin.email, admin_id = %admin.id, "Seeded bootstrap admin");
        }
        Ok(created)
    }

    /// Check credentials and issue a session token.
    ///
    /// Returns `Ok(None)` for an unknown email or a wrong password; the two
    /// cases are not distinguished.
    pub fn login(&self, email: &str, password: &str) -> Result<Option<LoginSession>> {
        let Some(admin) = self.find_by_email(email)? else {
            return Ok(None);
        };
        if !verify_password(password, &admin.password) {
            return Ok(None);
        }

        let mut claims = Map::new();
        claims.insert("email".to_string(), Value::String(admin.email.clone()));
        let access_token = self.signer.issue(&admin.id, claims, admin.token_version)?;

        Ok(Some(LoginSession {
            access_token,
            token_type: "bearer",
            admin: AdminProfile::from(&admin),
        }))
    }

    /// Authenticate a session token against the stored token version.
    pub fn authenticate(&self, token: &str) -> Result<Identity> {
        authenticate(&self.signer, token, &self.admins)
    }

    pub fn profile(&self, admin_id: &str) -> Result<Option<AdminProfile>> {
        Ok(self.find_by_id(admin_id)?.as_ref().map(AdminProfile::from))
    }

    /// Replace the password and revoke every previously issued token.
    ///
    /// Returns the new token version.
    ///
    /// # Errors
    ///
    /// - `FolioError::NotFound` if the admin does not exist
    /// - `FolioError::InvalidInput` if `current` is wrong or `new` is too short
    pub fn change_password(&self, admin_id: &str, current: &str, new: &str) -> Result<u64> {
        validate_new_password(new)?;

        // Verify and bump under one writer lock.
        let next_version = self
            .admins
            .modify_one(&Filter::by_id(admin_id), |record| {
                let admin: Admin = from_document(record.clone())?;
                if !verify_password(current, &admin.password) {
                    return Err(FolioError::InvalidInput(
                        "Current password is incorrect".to_string(),
                    ));
                }

                let next_version = admin.token_version + 1;
                record.insert("password".to_string(), Value::String(hash_password(new)?));
                record.insert("token_version".to_string(), Value::from(next_version));
                Ok(next_version)
            })?
            .ok_or_else(|| FolioError::NotFound(format!("Admin {}", admin_id)))?;

        info!(
            admin_id,
            token_version = next_version,
            "Password changed; earlier sessions revoked"
        );
        Ok(next_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn accounts(store: &Store) -> AdminAccounts {
        AdminAccounts::new(store, TokenSigner::new("accounts-test-secret").unwrap())
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let accounts = accounts(&store);
        let bootstrap = BootstrapAdmin::new("owner@example.com", "first-pass", "Owner");

        assert!(accounts.ensure_bootstrap_admin(&bootstrap).unwrap());
        assert!(!accounts.ensure_bootstrap_admin(&bootstrap).unwrap());
        assert_eq!(store.records::<Admin>().count(&Filter::new()).unwrap(), 1);
    }

    #[test]
    fn test_stored_password_is_hashed() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let accounts = accounts(&store);
        accounts
            .ensure_bootstrap_admin(&BootstrapAdmin::new(
                "owner@example.com",
                "first-pass",
                "Owner",
            ))
            .unwrap();

        let raw = std::fs::read_to_string(store.records::<Admin>().path()).unwrap();
        assert!(!raw.contains("first-pass"));
        assert!(raw.contains("$argon2id$"));
    }

    #[test]
    fn test_login_hides_which_part_was_wrong() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let accounts = accounts(&store);
        accounts
            .ensure_bootstrap_admin(&BootstrapAdmin::new(
                "owner@example.com",
                "first-pass",
                "Owner",
            ))
            .unwrap();

        assert!(accounts.login("owner@example.com", "nope").unwrap().is_none());
        assert!(accounts.login("other@example.com", "first-pass").unwrap().is_none());

        let session = accounts.login("owner@example.com", "first-pass").unwrap().unwrap();
        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.admin.email, "owner@example.com");
    }

    #[test]
    fn test_bootstrap_debug_redacts_password() {
        let debug = format!("{:?}", BootstrapAdmin::development_default());
        assert!(!debug.contains(BootstrapAdmin::DEFAULT_PASSWORD));
    }
}
