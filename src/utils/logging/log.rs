//! Logging utilities
//!
//! Uniform start/complete/warning lines for loads, fits and renders, so a
//! run's log reads as one sequence of steps.

use std::fmt::Display;
use std::time::Duration;

/// Log an operation start
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `target` - File, model or chart being worked on
pub fn log_operation_start(operation: &str, target: impl Display) {
    log::info!("{operation} {target}");
}

/// Log an operation completion
///
/// # Arguments
/// * `operation` - Past-tense verb ("loaded", "rendered")
/// * `target` - File, model or chart that was worked on
/// * `items` - Number of items processed
/// * `noun` - What the items are ("rows", "points")
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    target: impl Display,
    items: usize,
    noun: &str,
    elapsed: Option<Duration>,
) {
    log::info!("{}", completion_message(operation, &target, items, noun, elapsed));
}

fn completion_message(
    operation: &str,
    target: &dyn Display,
    items: usize,
    noun: &str,
    elapsed: Option<Duration>,
) -> String {
    match elapsed {
        Some(duration) => {
            format!("Successfully {operation} {items} {noun} from {target} in {duration:?}")
        }
        None => format!("Successfully {operation} {items} {noun} from {target}"),
    }
}

/// Log a data-quality warning, optionally tied to a source
pub fn log_warning(message: &str, target: Option<&dyn Display>) {
    if let Some(target) = target {
        log::warn!("{message}: {target}");
    } else {
        log::warn!("{message}");
    }
}
