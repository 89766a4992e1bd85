use folio_core::BootstrapAdmin;

use crate::app::AppContext;
use crate::config::{resolve_bootstrap_admin, RunMode};

pub fn handle_init(ctx: &AppContext) -> anyhow::Result<()> {
    let bootstrap = resolve_bootstrap_admin(ctx.mode())?;
    let created = ctx.accounts().ensure_bootstrap_admin(&bootstrap)?;

    if ctx.quiet() {
        return Ok(());
    }

    println!("Store ready at {}", ctx.store().root().display());
    if !created {
        println!("Admin {} already exists; nothing to seed.", bootstrap.email);
        return Ok(());
    }

    println!("Created admin {}", bootstrap.email);
    if ctx.mode() == RunMode::Development
        && bootstrap.password == BootstrapAdmin::DEFAULT_PASSWORD
    {
        println!("Using the development default password. Change it with `folio passwd`.");
    }
    Ok(())
}
