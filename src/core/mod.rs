pub mod best_fit;
pub mod instance_type;
pub mod observer;
pub mod selector;
pub mod sort;
pub mod verifier;

// the whole selection pipeline, one import away
pub use best_fit::{best_fit, best_fit_with_gpu, MatchStrategy};
pub use instance_type::{InstanceTypeSpec, Policy, ResourceRequest};
pub use observer::{NoopObserver, SelectionObserver, TracingObserver};
pub use selector::{select_instance_type, InstanceSelector, SelectionStrategy};
pub use sort::{filter_out_gpu_instances, sort_instance_types, SortedCatalog};
pub use verifier::verify_instance_type;
