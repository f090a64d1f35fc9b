//! CLI command implementations

mod check;
mod config;
mod normalize;
mod run;

pub use check::cmd_check;
pub use config::{cmd_config_init, cmd_config_show};
pub use normalize::cmd_normalize;
pub use run::cmd_run;
