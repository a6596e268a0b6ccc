use crate::cli::{
    actions::Action,
    commands::{self, logging},
    dispatch::handler,
    telemetry,
};
use anyhow::Result;

/// Parse arguments, install logging and map the matches to an [`Action`].
///
/// # Errors
/// Returns an error if logging cannot be installed or the configuration is invalid.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(logging::level(&matches))?;

    handler(&matches)
}
