use serde::Serialize;

use crate::core::instance_type::InstanceTypeSpec;

/// Orders the catalog ascending by GPUs, then memory, then vCPUs.
///
/// Takes the collection by value and hands it back reordered, so a caller that
/// still needs its original ordering has to keep its own copy.
pub fn sort_instance_types(mut specs: Vec<InstanceTypeSpec>) -> Vec<InstanceTypeSpec> {
    specs.sort_unstable_by_key(InstanceTypeSpec::sort_key);
    specs
}

/// Keeps only the entries without GPUs, in their original relative order.
pub fn filter_out_gpu_instances(specs: Vec<InstanceTypeSpec>) -> Vec<InstanceTypeSpec> {
    specs.into_iter().filter(|spec| !spec.has_gpu()).collect()
}

/// A catalog that is known to be sorted by [`InstanceTypeSpec::sort_key`].
///
/// The best-fit matcher relies on that ordering, so the only way in is
/// through a sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SortedCatalog(Vec<InstanceTypeSpec>);

impl SortedCatalog {
    pub fn new(specs: Vec<InstanceTypeSpec>) -> Self {
        Self(sort_instance_types(specs))
    }

    /// Sorted copy of a borrowed catalog; the caller's slice is left alone.
    pub fn from_slice(specs: &[InstanceTypeSpec]) -> Self {
        Self::new(specs.to_vec())
    }

    /// Filtering keeps relative order, so the result is still sorted.
    pub fn without_gpu(&self) -> Self {
        Self(filter_out_gpu_instances(self.0.clone()))
    }

    pub fn as_slice(&self) -> &[InstanceTypeSpec] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InstanceTypeSpec> {
        self.0.iter()
    }
}

impl From<Vec<InstanceTypeSpec>> for SortedCatalog {
    fn from(specs: Vec<InstanceTypeSpec>) -> Self {
        Self::new(specs)
    }
}

impl<'a> IntoIterator for &'a SortedCatalog {
    type Item = &'a InstanceTypeSpec;
    type IntoIter = std::slice::Iter<'a, InstanceTypeSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
