//! Notification seam for batch-level failure conditions.
//!
//! Fire-and-forget: a notification never affects the pipeline's outcome.

use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Warning,
}

/// Alert channel invoked when the batch cannot proceed (bad input directory)
/// or finds zero input files. Implementations must not fail the caller.
pub trait Notifier {
    fn notify(&self, severity: Severity, message: &str);
}

/// Default notifier that records alerts through the tracing pipeline.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Critical => error!(alert = %message, "Critical notification"),
            Severity::Warning => warn!(alert = %message, "Warning notification"),
        }
    }
}
