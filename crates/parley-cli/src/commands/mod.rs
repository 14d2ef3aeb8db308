//! Command implementations.

pub mod config;
pub mod personas;
pub mod run;

pub use self::config::execute_config;
pub use self::personas::execute_personas;
pub use self::run::{execute_run, run_session};
