use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::core::best_fit::{best_fit, best_fit_with_gpu, MatchStrategy};
use crate::core::instance_type::{InstanceTypeSpec, Policy, ResourceRequest};
use crate::core::observer::{SelectionObserver, TracingObserver};
use crate::core::sort::SortedCatalog;
use crate::core::verifier::verify_instance_type;
use crate::errors::SelectionError;

/// Which branch of the priority policy produced the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    Gpu,
    CpuMemory,
    InstanceType,
    Default,
}

impl SelectionStrategy {
    /// GPU wins over vCPU/memory, which wins over an explicit name.
    pub fn for_request(request: &ResourceRequest) -> Self {
        if request.gpus > 0 {
            SelectionStrategy::Gpu
        } else if request.vcpus != 0 && request.memory != 0 {
            SelectionStrategy::CpuMemory
        } else if !request.instance_type.is_empty() {
            SelectionStrategy::InstanceType
        } else {
            SelectionStrategy::Default
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStrategy::Gpu => write!(f, "GPU, vCPU, and memory"),
            SelectionStrategy::CpuMemory => write!(f, "vCPU and memory"),
            SelectionStrategy::InstanceType => write!(f, "instance type"),
            SelectionStrategy::Default => write!(f, "default"),
        }
    }
}

/// Picks the instance type for one request: resource matching first, then
/// the allow-list and default policy on whatever came out of it.
#[derive(Clone)]
pub struct InstanceSelector {
    match_strategy: MatchStrategy,
    observer: Arc<dyn SelectionObserver>,
}

impl Default for InstanceSelector {
    fn default() -> Self {
        Self::new(MatchStrategy::default())
    }
}

impl fmt::Debug for InstanceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceSelector")
            .field("match_strategy", &self.match_strategy)
            .finish_non_exhaustive()
    }
}

impl InstanceSelector {
    pub fn new(match_strategy: MatchStrategy) -> Self {
        Self::with_observer(match_strategy, Arc::new(TracingObserver))
    }

    pub fn with_observer(match_strategy: MatchStrategy, observer: Arc<dyn SelectionObserver>) -> Self {
        Self {
            match_strategy,
            observer,
        }
    }

    pub fn match_strategy(&self) -> MatchStrategy {
        self.match_strategy
    }

    /// Runs the priority policy against `catalog` and verifies the result.
    ///
    /// The catalog is borrowed and copied into a sorted view, so the caller's
    /// ordering survives. A matcher failure is final: there is no fallback to
    /// a lower-priority strategy.
    pub fn select(
        &self,
        request: &ResourceRequest,
        catalog: &[InstanceTypeSpec],
        policy: &Policy,
    ) -> Result<String, SelectionError> {
        let result = self.candidate(request, catalog).and_then(|candidate| {
            verify_instance_type(
                &candidate,
                &policy.allowed_instance_types,
                &policy.default_instance_type,
                self.observer.as_ref(),
            )
            .map_err(SelectionError::from)
        });

        if let Err(error) = &result {
            self.observer.rejected(error);
        }
        result
    }

    fn candidate(
        &self,
        request: &ResourceRequest,
        catalog: &[InstanceTypeSpec],
    ) -> Result<String, SelectionError> {
        let strategy = SelectionStrategy::for_request(request);
        let candidate = match strategy {
            SelectionStrategy::Gpu => {
                let sorted = SortedCatalog::from_slice(catalog);
                best_fit_with_gpu(
                    &sorted,
                    request.gpus,
                    request.vcpus,
                    request.memory,
                    self.match_strategy,
                )
                .map_err(|source| SelectionError::Match { stage: strategy, source })?
                .instance_type
                .clone()
            }
            SelectionStrategy::CpuMemory => {
                let sorted = SortedCatalog::from_slice(catalog).without_gpu();
                best_fit(&sorted, request.vcpus, request.memory, self.match_strategy)
                    .map_err(|source| SelectionError::Match { stage: strategy, source })?
                    .instance_type
                    .clone()
            }
            SelectionStrategy::InstanceType => request.instance_type.clone(),
            SelectionStrategy::Default => return Ok(String::new()),
        };

        self.observer.matched(strategy, &candidate);
        Ok(candidate)
    }
}

/// One-shot selection with the default strategy, logging through `tracing`.
pub fn select_instance_type(
    request: &ResourceRequest,
    catalog: &[InstanceTypeSpec],
    policy: &Policy,
) -> Result<String, SelectionError> {
    InstanceSelector::default().select(request, catalog, policy)
}
