/*
* Instance Selector Command Line Interface
* ----------------------------------------
* A thin operator front-end over the selection core, mostly for answering
* "which instance type would this pod get?" without launching anything.
*
* Command Structure:
* ---------------
* instance-selector
* ├── select [--vcpus] [--memory] [--gpus] [--instance-type]
* ├── verify <NAME>                      // allow-list/default check only
* ├── catalog [--without-gpu] [--json]   // sorted catalog, as the matcher sees it
* ├── prepare --name <VM> --user-data <FILE>
* └── init [--force]                     // writes config/default.toml
*
* Usage Examples:
* -------------
* ```bash
* instance-selector select --vcpus 4 --memory 8192
* instance-selector --config ./aws.toml select --gpus 1 --vcpus 8 --memory 32768
* ```
*/

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::{generate_default_config, Settings};
use crate::utils::{verify_ssh_key_file, write_user_data};
use crate::core::{
    verify_instance_type, InstanceSelector, MatchStrategy, ResourceRequest, SortedCatalog,
    TracingObserver,
};

#[derive(Parser)]
#[command(name = "instance-selector")]
#[command(about = "Pick the best-fit pod VM instance type from a cloud catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Select an instance type for a resource request
    Select {
        #[arg(long, default_value_t = 0)]
        vcpus: u64,
        /// Memory, in the same unit as the catalog (usually MiB)
        #[arg(long, default_value_t = 0)]
        memory: u64,
        #[arg(long, default_value_t = 0)]
        gpus: u64,
        #[arg(short, long, default_value = "")]
        instance_type: String,
        /// Override the configured match strategy
        #[arg(long)]
        strategy: Option<MatchStrategy>,
    },
    /// Check an instance type against the allow-list and default
    Verify {
        instance_type: String,
    },
    /// Print the catalog in matching order
    Catalog {
        #[arg(long)]
        without_gpu: bool,
        #[arg(long)]
        json: bool,
    },
    /// Verify the configured SSH key and stage user-data for an instance
    Prepare {
        #[arg(short, long)]
        name: String,
        /// File holding the user-data to stage
        #[arg(short, long)]
        user_data: PathBuf,
    },
    /// Generate default configuration
    Init {
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run() -> anyhow::Result<()> {
    let Cli { command, config } = Cli::parse();

    match command {
        Commands::Select {
            vcpus,
            memory,
            gpus,
            instance_type,
            strategy,
        } => {
            let settings = load_settings(config.as_deref())?;
            let request = ResourceRequest::new(vcpus, memory, gpus).with_instance_type(instance_type);
            handle_select_command(&request, strategy, &settings)
        }
        Commands::Verify { instance_type } => {
            handle_verify_command(&instance_type, &load_settings(config.as_deref())?)
        }
        Commands::Catalog { without_gpu, json } => {
            handle_catalog_command(without_gpu, json, &load_settings(config.as_deref())?)
        }
        Commands::Prepare { name, user_data } => {
            handle_prepare_command(&name, &user_data, &load_settings(config.as_deref())?)
        }
        Commands::Init { force } => handle_init_command(force),
    }
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => Settings::new_from_file(path)?,
        None => Settings::new()?,
    };
    Ok(settings)
}

fn handle_select_command(
    request: &ResourceRequest,
    strategy: Option<MatchStrategy>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let selector = selector_for(strategy, settings);
    info!(
        ?request,
        strategy = %selector.match_strategy(),
        catalog_size = settings.catalog.len(),
        "Selecting instance type"
    );

    // main prints the error, don't do it twice
    let instance_type = selector.select(request, &settings.catalog, &settings.policy())?;
    println!("{} {}", "✓".green(), instance_type.bold());
    Ok(())
}

/// A `--strategy` flag beats whatever the config says.
fn selector_for(strategy: Option<MatchStrategy>, settings: &Settings) -> InstanceSelector {
    InstanceSelector::new(strategy.unwrap_or(settings.matching.strategy))
}

fn handle_verify_command(instance_type: &str, settings: &Settings) -> anyhow::Result<()> {
    let policy = settings.policy();
    let verified = verify_instance_type(
        instance_type,
        &policy.allowed_instance_types,
        &policy.default_instance_type,
        &TracingObserver,
    )?;
    println!("{} {}", "✓".green(), verified.bold());
    Ok(())
}

fn handle_catalog_command(without_gpu: bool, json: bool, settings: &Settings) -> anyhow::Result<()> {
    let mut catalog = SortedCatalog::from_slice(&settings.catalog);
    if without_gpu {
        catalog = catalog.without_gpu();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    let allowed = &settings.policy.allowed_instance_types;
    println!("{}", "Instance types (matching order):".bold());
    for spec in &catalog {
        let marker = if spec.instance_type == settings.policy.default_instance_type {
            "default".cyan()
        } else if allowed.contains(&spec.instance_type) {
            "allowed".green()
        } else {
            "not allowed".red()
        };
        println!(
            "- {:<24} vcpus={:<4} memory={:<8} gpus={:<2} [{}]",
            spec.instance_type, spec.vcpus, spec.memory, spec.gpus, marker
        );
    }
    Ok(())
}

fn handle_prepare_command(name: &str, user_data: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(key_file) = &settings.provisioning.ssh_key_file {
        let key = verify_ssh_key_file(key_file)?;
        println!("{} SSH key {} ({})", "✓".green(), key_file.display(), key.key_type);
    }

    let contents = std::fs::read_to_string(user_data)
        .with_context(|| format!("reading {}", user_data.display()))?;
    let staged = write_user_data(name, &contents, &settings.provisioning.user_data_dir)?;
    println!("{} User data staged at {}", "✓".green(), staged.display());
    Ok(())
}

fn handle_init_command(force: bool) -> anyhow::Result<()> {
    let config_dir = PathBuf::from("config");
    let target = config_dir.join("default.toml");
    if target.exists() && !force {
        error!("Configuration file already exists. Use --force to overwrite.");
        return Ok(());
    }

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating {}", config_dir.display()))?;
    let default_config = generate_default_config();
    let config_str = toml::to_string_pretty(&default_config)?;
    std::fs::write(&target, config_str).with_context(|| format!("writing {}", target.display()))?;

    println!("{} Default configuration generated at {}", "✓".green(), target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SelectionError;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_select_with_strategy_override() {
        let cli = Cli::try_parse_from([
            "instance-selector",
            "select",
            "--vcpus",
            "4",
            "--memory",
            "8192",
            "--strategy",
            "binary_search",
        ])
        .unwrap();

        match cli.command {
            Commands::Select { vcpus, memory, gpus, strategy, .. } => {
                assert_eq!((vcpus, memory, gpus), (4, 8192, 0));
                assert_eq!(strategy, Some(MatchStrategy::BinarySearch));
            }
            _ => panic!("expected select"),
        }
    }

    #[test]
    fn default_config_serializes_to_toml() {
        let rendered = toml::to_string_pretty(&generate_default_config()).unwrap();
        assert!(rendered.contains("[[catalog]]"));
        assert!(rendered.contains("strategy = \"exhaustive\""));
    }

    #[test]
    fn strategy_flag_overrides_config() {
        let mut settings = generate_default_config();
        settings.matching.strategy = MatchStrategy::BinarySearch;

        assert_eq!(selector_for(None, &settings).match_strategy(), MatchStrategy::BinarySearch);
        assert_eq!(
            selector_for(Some(MatchStrategy::Exhaustive), &settings).match_strategy(),
            MatchStrategy::Exhaustive
        );
    }

    #[test]
    fn failed_select_hands_error_back_untouched() {
        let settings = generate_default_config();
        let request = ResourceRequest::new(512, 1 << 30, 0);

        let err = handle_select_command(&request, None, &settings).unwrap_err();
        let selection = err.downcast_ref::<SelectionError>().unwrap();
        assert!(selection.is_no_match());
        assert_eq!(err.to_string(), selection.to_string());
    }
}
