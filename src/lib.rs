pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod utils;

// Re-exports
pub use crate::config::Settings;
pub use crate::core::{
    best_fit, best_fit_with_gpu, filter_out_gpu_instances, select_instance_type,
    sort_instance_types, verify_instance_type, InstanceSelector, InstanceTypeSpec,
    MatchStrategy, NoopObserver, Policy, ResourceRequest, SelectionObserver, SelectionStrategy,
    SortedCatalog, TracingObserver,
};
pub use crate::errors::{
    MatchError, RequestedResources, SelectionError, SelectorError, SelectorResult, VerifyError,
};
