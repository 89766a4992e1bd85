use crate::app::AppContext;
use crate::cli::{LoginArgs, PasswdArgs, WhoamiArgs};
use crate::helpers::{describe_auth_error, new_password_or_prompt, password_or_prompt};

pub fn handle_login(ctx: &AppContext, args: &LoginArgs) -> anyhow::Result<()> {
    let password = password_or_prompt(args.password.as_deref(), "Password")?;
    let session = ctx
        .accounts()
        .login(&args.email, &password)?
        .ok_or_else(|| anyhow::anyhow!("Invalid email or password"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        // The bare token goes to stdout so it can be captured by scripts.
        println!("{}", session.access_token);
        if !ctx.quiet() {
            eprintln!("Logged in as {} ({})", session.admin.name, session.admin.email);
        }
    }
    Ok(())
}

pub fn handle_whoami(ctx: &AppContext, args: &WhoamiArgs) -> anyhow::Result<()> {
    let identity = ctx
        .accounts()
        .authenticate(&args.token)
        .map_err(describe_auth_error)?;
    let profile = ctx
        .accounts()
        .profile(&identity.id)?
        .ok_or_else(|| anyhow::anyhow!("The account for this session no longer exists."))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("{} <{}>", profile.name, profile.email);
        if !ctx.quiet() {
            println!("id:   {}", profile.id);
            println!("role: {}", profile.role);
        }
    }
    Ok(())
}

pub fn handle_passwd(ctx: &AppContext, args: &PasswdArgs) -> anyhow::Result<()> {
    let identity = ctx
        .accounts()
        .authenticate(&args.token)
        .map_err(describe_auth_error)?;

    let current = password_or_prompt(args.current.as_deref(), "Current password")?;
    let new = new_password_or_prompt(args.new.as_deref())?;
    ctx.accounts().change_password(&identity.id, &current, &new)?;

    if !ctx.quiet() {
        println!("Password changed. Existing sessions have been signed out.");
    }
    Ok(())
}
