//! CLI command implementations

pub mod config;
pub mod env;
pub mod key;
pub mod restore;
pub mod save;

pub use config::execute as config;
pub use env::execute as env;
pub use key::execute as key;
pub use restore::execute as restore;
pub use save::execute as save;
