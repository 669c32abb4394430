/*
* Instance Selector Configuration
* -------------------------------
* Where the allow-list, the default instance type and the catalog itself come
* from. Nothing in here is needed by the selection core; it only feeds it.
*
* Configuration Hierarchy (from lowest to highest priority):
* -----------------------------------------------------
* 1. Hardcoded defaults (strategy = exhaustive, userdata under /tmp)
* 2. $CONFIG_PATH/default.{toml,yaml,json} (optional)
* 3. $CONFIG_PATH/local.{toml,yaml,json} (optional, per-node overrides)
* 4. Environment variables, SELECTOR__POLICY__DEFAULT_INSTANCE_TYPE style
*
* An empty default instance type is filled in from POD_VM_INSTANCE_TYPE as a
* last resort, the same way the provider daemons pick up their flags.
*
* Usage Example:
* ------------
* ```rust,ignore
* let settings = Settings::new()?;
* let selector = InstanceSelector::new(settings.matching.strategy);
* let chosen = selector.select(&request, &settings.catalog, &settings.policy())?;
* ```
*/

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::{InstanceTypeSpec, MatchStrategy, Policy};
use crate::errors::{SelectorResult, SettingsError};
use crate::utils::env::default_to_env;

pub const DEFAULT_INSTANCE_TYPE_ENV: &str = "POD_VM_INSTANCE_TYPE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub policy: PolicySettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub provisioning: ProvisioningSettings,
    #[serde(default)]
    pub catalog: Vec<InstanceTypeSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySettings {
    #[serde(default)]
    pub default_instance_type: String,
    #[serde(default)]
    pub allowed_instance_types: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingSettings {
    #[serde(default)]
    pub strategy: MatchStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningSettings {
    pub user_data_dir: PathBuf,
    #[serde(default)]
    pub ssh_key_file: Option<PathBuf>,
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self {
            user_data_dir: PathBuf::from("/tmp/pod-vm-userdata"),
            ssh_key_file: None,
        }
    }
}

impl Settings {
    pub fn new() -> SelectorResult<Self> {
        let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string());

        info!("Loading configuration from path: {}", config_path);

        let builder = Self::defaults()?
            .add_source(File::with_name(&format!("{}/default", config_path)).required(false))
            .add_source(File::with_name(&format!("{}/local", config_path)).required(false));

        Ok(Self::finish(builder)?)
    }

    /// Loads an explicit file instead of the `CONFIG_PATH` directory.
    pub fn new_from_file(path: &Path) -> SelectorResult<Self> {
        info!("Loading configuration from file: {}", path.display());

        let builder = Self::defaults()?.add_source(File::from(path));
        Ok(Self::finish(builder)?)
    }

    /// The allow-list/default pair the selector verifies against.
    pub fn policy(&self) -> Policy {
        Policy {
            allowed_instance_types: self.policy.allowed_instance_types.clone(),
            default_instance_type: self.policy.default_instance_type.clone(),
        }
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, SettingsError> {
        Ok(Config::builder()
            .set_default("matching.strategy", MatchStrategy::default().to_string())?
            .set_default(
                "provisioning.user_data_dir",
                ProvisioningSettings::default().user_data_dir.to_string_lossy().to_string(),
            )?)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, SettingsError> {
        let config = builder
            .add_source(
                Environment::with_prefix("SELECTOR")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("policy.allowed_instance_types")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        default_to_env(
            &mut settings.policy.default_instance_type,
            DEFAULT_INSTANCE_TYPE_ENV,
            "",
        );
        settings.validate()?;
        Ok(settings)
    }

    /// Catches configs the selector could only ever answer with an error.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let mut seen = std::collections::HashSet::new();
        for spec in &self.catalog {
            if spec.instance_type.is_empty() {
                return Err(SettingsError::Invalid {
                    message: "catalog entry without an instance_type".to_string(),
                });
            }
            if !seen.insert(spec.instance_type.as_str()) {
                warn!(
                    instance_type = %spec.instance_type,
                    "Duplicate instance type in catalog, the first sorted entry wins"
                );
            }
        }

        if self.policy.default_instance_type.is_empty() {
            warn!("No default instance type configured; requests without annotations will resolve to an empty name");
        }
        Ok(())
    }
}

pub fn generate_default_config() -> Settings {
    Settings {
        policy: PolicySettings {
            default_instance_type: "t2.small".to_string(),
            allowed_instance_types: vec![
                "t2.small".to_string(),
                "t2.medium".to_string(),
                "t2.xlarge".to_string(),
                "g4dn.xlarge".to_string(),
            ],
        },
        matching: MatchingSettings {
            strategy: MatchStrategy::Exhaustive,
        },
        provisioning: ProvisioningSettings::default(),
        catalog: vec![
            InstanceTypeSpec::new("t2.small", 1, 2048, 0),
            InstanceTypeSpec::new("t2.medium", 2, 4096, 0),
            InstanceTypeSpec::new("t2.xlarge", 4, 16384, 0),
            InstanceTypeSpec::new("g4dn.xlarge", 4, 16384, 1),
        ],
    }
}
