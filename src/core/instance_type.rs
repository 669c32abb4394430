use serde::{Deserialize, Serialize};

/// One entry of a cloud backend's instance type catalog.
///
/// Memory is unit-agnostic, but every entry in a catalog and every request
/// matched against it must use the same unit (MiB in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceTypeSpec {
    pub instance_type: String,
    #[serde(default)]
    pub vcpus: u64,
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub gpus: u64,
}

impl InstanceTypeSpec {
    pub fn new(instance_type: impl Into<String>, vcpus: u64, memory: u64, gpus: u64) -> Self {
        Self {
            instance_type: instance_type.into(),
            vcpus,
            memory,
            gpus,
        }
    }

    /// The composite ordering key: GPUs first, then memory, then vCPUs.
    pub fn sort_key(&self) -> (u64, u64, u64) {
        (self.gpus, self.memory, self.vcpus)
    }

    pub fn has_gpu(&self) -> bool {
        self.gpus > 0
    }
}

/// What a workload asked for, usually pulled out of pod annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    #[serde(default)]
    pub vcpus: u64,
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub gpus: u64,
    #[serde(default)]
    pub instance_type: String,
}

impl ResourceRequest {
    pub fn new(vcpus: u64, memory: u64, gpus: u64) -> Self {
        Self {
            vcpus,
            memory,
            gpus,
            instance_type: String::new(),
        }
    }

    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = instance_type.into();
        self
    }
}

/// Allow-list plus default, handed in per call by the backend config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub allowed_instance_types: Vec<String>,
    pub default_instance_type: String,
}

impl Policy {
    pub fn new<I, S>(allowed_instance_types: I, default_instance_type: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_instance_types: allowed_instance_types.into_iter().map(Into::into).collect(),
            default_instance_type: default_instance_type.into(),
        }
    }
}
