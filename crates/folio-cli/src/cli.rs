use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use folio_core::VERSION;

/// Folio - admin backend tooling for the portfolio site
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the collection files
    #[arg(short, long, global = true, env = "FOLIO_STORE")]
    pub store: Option<String>,

    /// Config file path
    #[arg(long, global = true, env = "FOLIO_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the store and seed the bootstrap admin
    Init,

    /// Log in and print a session token
    Login(LoginArgs),

    /// Show the admin a session token belongs to
    Whoami(WhoamiArgs),

    /// Change the admin password and sign out every existing session
    Passwd(PasswdArgs),

    /// Show dashboard statistics
    Stats(StatsArgs),

    /// List collections and their record counts
    Collections,

    /// Query a collection
    Find(FindArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the `login` command
#[derive(Args)]
pub struct LoginArgs {
    /// Admin email
    #[arg(long)]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,

    /// Output the full session as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `whoami` command
#[derive(Args)]
pub struct WhoamiArgs {
    /// Session token
    #[arg(long, env = "FOLIO_TOKEN")]
    pub token: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `passwd` command
#[derive(Args)]
pub struct PasswdArgs {
    /// Session token
    #[arg(long, env = "FOLIO_TOKEN")]
    pub token: String,

    /// Current password (prompted when omitted)
    #[arg(long)]
    pub current: Option<String>,

    /// New password (prompted when omitted)
    #[arg(long)]
    pub new: Option<String>,
}

/// Arguments for the `stats` command
#[derive(Args)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `find` command
#[derive(Args)]
pub struct FindArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Equality condition (repeatable); values parse as JSON when possible
    #[arg(short, long = "where", value_name = "FIELD=VALUE")]
    pub conditions: Vec<String>,

    /// Sort by field
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Limit number of results (0 means no limit)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
