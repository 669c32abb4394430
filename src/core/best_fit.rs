use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::instance_type::InstanceTypeSpec;
use crate::core::sort::SortedCatalog;
use crate::errors::{MatchError, RequestedResources};

/// How the matcher walks a sorted catalog.
///
/// The catalog is sorted by one composite key but the fit predicate checks
/// every dimension on its own, so it is not monotonic over the ordering.
/// `Exhaustive` always finds the smallest entry that fits. `BinarySearch`
/// keeps the old lower-bound behaviour and can miss a fitting entry when
/// vCPUs don't grow with memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    #[default]
    Exhaustive,
    BinarySearch,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::Exhaustive => write!(f, "exhaustive"),
            MatchStrategy::BinarySearch => write!(f, "binary_search"),
        }
    }
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "exhaustive" => Ok(MatchStrategy::Exhaustive),
            "binary_search" | "binary" => Ok(MatchStrategy::BinarySearch),
            other => Err(format!("unknown match strategy: {other}")),
        }
    }
}

/// Smallest GPU-free entry with at least `vcpus` and `memory`.
///
/// GPU-bearing entries are never returned, even if the caller forgot to
/// filter them out first.
pub fn best_fit(
    catalog: &SortedCatalog,
    vcpus: u64,
    memory: u64,
    strategy: MatchStrategy,
) -> Result<&InstanceTypeSpec, MatchError> {
    let specs = catalog.as_slice();
    // GPU count is the leading sort key, so the GPU-free entries are a prefix.
    let cpu_only = &specs[..specs.partition_point(|spec| !spec.has_gpu())];

    search(cpu_only, strategy, |spec| {
        spec.memory >= memory && spec.vcpus >= vcpus
    })
    .ok_or(MatchError::NoMatchFound {
        requested: RequestedResources {
            gpus: None,
            vcpus,
            memory,
        },
    })
}

/// Smallest entry with at least `gpus`, `vcpus` and `memory`.
// TODO: match on GPU model once catalogs carry it, not just the count.
pub fn best_fit_with_gpu(
    catalog: &SortedCatalog,
    gpus: u64,
    vcpus: u64,
    memory: u64,
    strategy: MatchStrategy,
) -> Result<&InstanceTypeSpec, MatchError> {
    search(catalog.as_slice(), strategy, |spec| {
        spec.gpus >= gpus && spec.vcpus >= vcpus && spec.memory >= memory
    })
    .ok_or(MatchError::NoMatchFound {
        requested: RequestedResources {
            gpus: Some(gpus),
            vcpus,
            memory,
        },
    })
}

fn search<F>(specs: &[InstanceTypeSpec], strategy: MatchStrategy, fits: F) -> Option<&InstanceTypeSpec>
where
    F: Fn(&InstanceTypeSpec) -> bool,
{
    match strategy {
        // Sorted ascending, so the first hit is the minimum by sort key.
        MatchStrategy::Exhaustive => specs.iter().find(|spec| fits(spec)),
        MatchStrategy::BinarySearch => specs.get(lower_bound(specs, fits)),
    }
}

/// First index where `fits` holds, assuming it flips false -> true exactly once.
/// Probes midpoints in the same order as the classic `sort.Search` loop so
/// results on non-monotonic catalogs stay reproducible.
fn lower_bound<F>(specs: &[InstanceTypeSpec], fits: F) -> usize
where
    F: Fn(&InstanceTypeSpec) -> bool,
{
    let (mut lo, mut hi) = (0usize, specs.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if fits(&specs[mid]) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(specs: &[(&str, u64, u64, u64)]) -> SortedCatalog {
        SortedCatalog::new(
            specs
                .iter()
                .map(|(name, vcpus, memory, gpus)| InstanceTypeSpec::new(*name, *vcpus, *memory, *gpus))
                .collect(),
        )
    }

    fn both() -> [MatchStrategy; 2] {
        [MatchStrategy::Exhaustive, MatchStrategy::BinarySearch]
    }

    #[test]
    fn picks_smallest_fitting_cpu_instance() {
        let catalog = catalog(&[
            ("t1", 2, 4096, 0),
            ("t2", 4, 8192, 0),
            ("t3", 8, 16384, 0),
        ]);

        for strategy in both() {
            let found = best_fit(&catalog, 4, 8000, strategy).unwrap();
            assert_eq!(found.instance_type, "t2", "{strategy}");
        }
    }

    #[test]
    fn exact_fit_counts() {
        let catalog = catalog(&[("t1", 2, 4096, 0), ("t2", 4, 8192, 0)]);
        for strategy in both() {
            assert_eq!(best_fit(&catalog, 2, 4096, strategy).unwrap().instance_type, "t1");
        }
    }

    #[test]
    fn cpu_match_never_returns_gpu_instance() {
        let catalog = catalog(&[("small", 2, 4096, 0), ("gpu-huge", 64, 262144, 8)]);

        for strategy in both() {
            let err = best_fit(&catalog, 32, 65536, strategy).unwrap_err();
            assert_eq!(
                err,
                MatchError::NoMatchFound {
                    requested: RequestedResources { gpus: None, vcpus: 32, memory: 65536 }
                }
            );
        }
    }

    #[test]
    fn gpu_match_respects_every_dimension() {
        let catalog = catalog(&[
            ("cpu", 16, 65536, 0),
            ("g1-small", 4, 16384, 1),
            ("g1-large", 16, 65536, 1),
            ("g4", 32, 131072, 4),
        ]);

        for strategy in both() {
            assert_eq!(
                best_fit_with_gpu(&catalog, 1, 8, 32768, strategy).unwrap().instance_type,
                "g1-large"
            );
            assert_eq!(
                best_fit_with_gpu(&catalog, 2, 1, 1, strategy).unwrap().instance_type,
                "g4"
            );
        }
    }

    #[test]
    fn empty_catalog_reports_request() {
        let empty = SortedCatalog::default();
        for strategy in both() {
            let err = best_fit_with_gpu(&empty, 1, 2, 3, strategy).unwrap_err();
            assert_eq!(
                err.to_string(),
                "no instance type found for the given GPUs (1), vCPUs (2), and memory (3)"
            );
        }
    }

    #[test]
    fn binary_search_can_miss_on_non_monotonic_catalog() {
        // Memory grows but vCPUs shrink, so "fits" goes true, false, false.
        let catalog = catalog(&[
            ("wide", 16, 4096, 0),
            ("tall", 2, 8192, 0),
            ("taller", 2, 16384, 0),
        ]);

        assert_eq!(
            best_fit(&catalog, 8, 2048, MatchStrategy::Exhaustive).unwrap().instance_type,
            "wide"
        );
        assert!(best_fit(&catalog, 8, 2048, MatchStrategy::BinarySearch).is_err());
    }

    #[test]
    fn strategy_parses_from_config_strings() {
        assert_eq!("exhaustive".parse::<MatchStrategy>(), Ok(MatchStrategy::Exhaustive));
        assert_eq!("binary-search".parse::<MatchStrategy>(), Ok(MatchStrategy::BinarySearch));
        assert!("linear".parse::<MatchStrategy>().is_err());
    }
}
