// End-to-end selection scenarios, wired the way a cloud provider would call in.

use pod_vm_instance_selector::{
    select_instance_type, InstanceSelector, InstanceTypeSpec, MatchError, MatchStrategy,
    NoopObserver, Policy, ResourceRequest, SelectionError, SelectionStrategy, VerifyError,
};
use std::sync::Arc;

fn catalog() -> Vec<InstanceTypeSpec> {
    vec![
        InstanceTypeSpec::new("t1", 2, 4096, 0),
        InstanceTypeSpec::new("t2", 4, 8192, 0),
        InstanceTypeSpec::new("t3", 8, 16384, 1),
    ]
}

fn quiet(strategy: MatchStrategy) -> InstanceSelector {
    InstanceSelector::with_observer(strategy, Arc::new(NoopObserver))
}

#[test]
fn cpu_request_lands_on_smallest_fitting_cpu_type() {
    let request = ResourceRequest::new(4, 8000, 0);
    let policy = Policy::new(["t2"], "t1");

    assert_eq!(select_instance_type(&request, &catalog(), &policy), Ok("t2".to_string()));
}

#[test]
fn gpu_request_lands_on_gpu_type() {
    let request = ResourceRequest::new(8, 16000, 1);
    let policy = Policy::new(["t3"], "t1");

    assert_eq!(select_instance_type(&request, &catalog(), &policy), Ok("t3".to_string()));
}

#[test]
fn gpu_path_wins_over_everything_else() {
    // t2 would fit the vCPU/memory half, and "foo" is explicitly named,
    // but only the GPU path may run.
    let request = ResourceRequest::new(4, 8192, 1).with_instance_type("foo");
    let policy = Policy::new(["t2", "t3", "foo"], "t1");

    for strategy in [MatchStrategy::Exhaustive, MatchStrategy::BinarySearch] {
        assert_eq!(quiet(strategy).select(&request, &catalog(), &policy), Ok("t3".to_string()));
    }
}

#[test]
fn gpu_match_failure_reports_gpu_stage() {
    let request = ResourceRequest::new(4, 8192, 2).with_instance_type("t1");
    let err = quiet(MatchStrategy::Exhaustive)
        .select(&request, &catalog(), &Policy::new(["t1"], "t1"))
        .unwrap_err();

    match err {
        SelectionError::Match { stage, source: MatchError::NoMatchFound { requested } } => {
            assert_eq!(stage, SelectionStrategy::Gpu);
            assert_eq!(requested.gpus, Some(2));
            assert_eq!((requested.vcpus, requested.memory), (4, 8192));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn cpu_request_too_big_for_cpu_types_does_not_spill_onto_gpu() {
    let request = ResourceRequest::new(8, 16000, 0);
    let err = select_instance_type(&request, &catalog(), &Policy::new(["t3"], "t1")).unwrap_err();

    assert!(err.is_no_match());
    assert_eq!(
        err.to_string(),
        "failed to get instance type based on vCPU and memory annotations: \
         no instance type found for the given vcpus (8) and memory (16000)"
    );
}

#[test]
fn no_preference_gets_default() {
    let policy = Policy::new(Vec::<String>::new(), "t1");
    assert_eq!(
        select_instance_type(&ResourceRequest::default(), &catalog(), &policy),
        Ok("t1".to_string())
    );
}

#[test]
fn half_specified_resources_fall_through_to_name() {
    // memory without vCPUs does not trigger matching
    let request = ResourceRequest::new(0, 8192, 0).with_instance_type("t2");
    assert_eq!(
        select_instance_type(&request, &catalog(), &Policy::new(["t2"], "t1")),
        Ok("t2".to_string())
    );
}

#[test]
fn named_type_with_empty_allow_list_is_ambiguous() {
    let request = ResourceRequest::default().with_instance_type("t2");
    let err = select_instance_type(&request, &catalog(), &Policy::new(Vec::<String>::new(), "t1"))
        .unwrap_err();

    assert_eq!(
        err,
        SelectionError::Verify(VerifyError::AmbiguousDefaultPolicy {
            requested: "t2".into(),
            default: "t1".into(),
        })
    );
    assert!(err.to_string().starts_with("failed to verify instance type:"));
}

#[test]
fn named_default_with_empty_allow_list_passes() {
    let request = ResourceRequest::default().with_instance_type("t1");
    assert_eq!(
        select_instance_type(&request, &catalog(), &Policy::new(Vec::<String>::new(), "t1")),
        Ok("t1".to_string())
    );
}

#[test]
fn empty_catalog_only_serves_named_or_default_requests() {
    let policy = Policy::new(["t2"], "t1");
    assert!(select_instance_type(&ResourceRequest::new(1, 1, 0), &[], &policy).is_err());
    assert_eq!(
        select_instance_type(&ResourceRequest::default(), &[], &policy),
        Ok("t1".to_string())
    );
}
