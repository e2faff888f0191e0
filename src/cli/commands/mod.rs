//! CLI command implementations.

mod config;
mod generate;
mod init;
mod show;
mod topics;
mod transcribe;

pub use config::run_config;
pub use generate::{run_generate, GenerateArgs};
pub use init::run_init;
pub use show::run_show;
pub use topics::run_topics;
pub use transcribe::run_transcribe;
