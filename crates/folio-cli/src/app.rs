use std::path::PathBuf;

use folio_core::{AdminAccounts, Store, TokenSigner};
use tracing::debug;

use crate::cli::Cli;
use crate::config::{
    default_config_path, default_store_path, read_config, require_token_secret, resolve_mode,
    FolioConfig, RunMode,
};

/// Everything a command needs: the opened store, the account service and
/// the resolved run mode.
pub struct AppContext {
    store: Store,
    accounts: AdminAccounts,
    mode: RunMode,
    quiet: bool,
}

impl AppContext {
    /// Resolve config and open the store.
    ///
    /// Fails when the token signing secret is missing, before any data is
    /// touched.
    pub fn boot(cli: &Cli) -> anyhow::Result<Self> {
        let secret = require_token_secret()?;
        let signer = TokenSigner::new(&secret)?;

        let config = load_config(cli)?;
        let mode = resolve_mode(&config)?;
        let root = resolve_store_path(cli, &config)?;
        debug!(root = %root.display(), ?mode, "opening store");

        let store = Store::open(&root)?;
        let accounts = AdminAccounts::new(&store, signer);
        Ok(Self {
            store,
            accounts,
            mode,
            quiet: cli.quiet,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn accounts(&self) -> &AdminAccounts {
        &self.accounts
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    match cli.config.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => default_config_path(),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<FolioConfig> {
    read_config(&resolve_config_path(cli)?)
}

/// `--store`/`FOLIO_STORE` first, then the config file, then the XDG data dir.
pub fn resolve_store_path(cli: &Cli, config: &FolioConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli.store.as_deref().filter(|p| !p.trim().is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = config.store.path.as_deref().filter(|p| !p.trim().is_empty()) {
        return Ok(PathBuf::from(path));
    }
    default_store_path()
}
