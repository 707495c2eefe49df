//! Command implementations.

pub mod audit;
pub mod challenge;
pub mod config;
pub mod decide;
pub mod ingest;
pub mod keys;

pub use self::audit::execute_audit;
pub use self::challenge::execute_challenge;
pub use self::config::execute_config;
pub use self::decide::execute_decide;
pub use self::ingest::execute_ingest;
pub use self::keys::execute_keys;
