//! Progress notification port
//!
//! Defines the interface for reporting progress while algorithms run.

/// Callback for progress updates during dispatch
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, nothing).
pub trait ProgressNotifier: Send + Sync {
    /// Called once before any algorithm starts
    fn on_dispatch_start(&self, total: usize);

    /// Called when an algorithm is handed to a worker
    fn on_explainer_start(&self, _name: &str) {}

    /// Called when an algorithm finishes, successfully or not
    fn on_explainer_complete(&self, name: &str, success: bool);

    /// Called once all algorithms have finished
    fn on_dispatch_complete(&self);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_dispatch_start(&self, _total: usize) {}
    fn on_explainer_complete(&self, _name: &str, _success: bool) {}
    fn on_dispatch_complete(&self) {}
}
