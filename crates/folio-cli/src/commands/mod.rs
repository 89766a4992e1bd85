mod init;
mod query;
mod session;

pub use init::handle_init;
pub use query::{handle_collections, handle_find, handle_stats};
pub use session::{handle_login, handle_passwd, handle_whoami};
