use tracing::{info, warn};

use crate::core::selector::SelectionStrategy;
use crate::errors::SelectionError;

/// Hook for the side effects of a selection, handed to the selector and the
/// verifier instead of reaching for a process-wide logger.
pub trait SelectionObserver: Send + Sync {
    /// A candidate was produced by one of the request-driven strategies.
    fn matched(&self, strategy: SelectionStrategy, instance_type: &str);

    /// Nothing was requested, so the policy default was used.
    fn defaulted(&self, default_instance_type: &str);

    /// The selection failed and the error is about to go back to the caller.
    fn rejected(&self, _error: &SelectionError) {}
}

/// Emits every selection event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SelectionObserver for TracingObserver {
    fn matched(&self, strategy: SelectionStrategy, instance_type: &str) {
        info!(
            target: "adaptor::cloud",
            %strategy,
            instance_type,
            "Instance type selected by the cloud provider based on {} annotation(s): {}",
            strategy,
            instance_type
        );
    }

    fn defaulted(&self, default_instance_type: &str) {
        info!(
            target: "adaptor::cloud",
            instance_type = default_instance_type,
            "Using default instance type ({:?})",
            default_instance_type
        );
    }

    fn rejected(&self, error: &SelectionError) {
        warn!(target: "adaptor::cloud", error = %error, "Instance type selection failed");
    }
}

/// Swallows everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SelectionObserver for NoopObserver {
    fn matched(&self, _strategy: SelectionStrategy, _instance_type: &str) {}

    fn defaulted(&self, _default_instance_type: &str) {}
}
