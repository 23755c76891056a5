//! Command dispatch: load settings, wire services, print results.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::as_datasets;
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings, LOCAL_CONFIG_FILE};
use crate::domain::{CoercionRules, ToTermTree};
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Library {
            format,
            no_fallback,
            fallback,
        }) => _library(cli, *format, *no_fallback, fallback.as_deref()),
        Some(Commands::Lineage { format }) => _lineage(cli, *format),
        Some(Commands::Family { root, format }) => _family(cli, *root, *format),
        Some(Commands::Import {
            path,
            integer_fields,
            float_fields,
        }) => _import(cli, path, integer_fields, float_fields),
        Some(Commands::Config { command }) => _config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `vassar --help`".to_string(),
        )),
    }
}

/// The `--config` file, else `./.vassar.toml` when present.
fn local_config_path(cli: &Cli) -> Option<PathBuf> {
    cli.config.clone().or_else(|| {
        let default = PathBuf::from(LOCAL_CONFIG_FILE);
        default.exists().then_some(default)
    })
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let local = local_config_path(cli);
    let mut settings = Settings::load(local.as_deref())?;
    if let Some(snapshot) = &cli.snapshot {
        settings.snapshot = Some(snapshot.clone());
    }
    debug!("effective settings: {:?}", settings);
    Ok(settings)
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli)?)?)
}

fn print_json(value: &impl Serialize) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(InfraError::from)?;
    output::info(&json);
    Ok(())
}

fn print_tree<T: Serialize + ToTermTree>(tree: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(tree),
        OutputFormat::Tree => {
            output::info(&tree.to_term_tree());
            Ok(())
        }
    }
}

#[instrument(skip(cli))]
fn _library(
    cli: &Cli,
    format: OutputFormat,
    no_fallback: bool,
    fallback: Option<&str>,
) -> CliResult<()> {
    let services = container(cli)?;
    let mut config = services.settings.library.reducer_config();
    if no_fallback {
        config = config.with_fallback_label(None);
    } else if let Some(label) = fallback {
        config = config.with_fallback_label(Some(label));
    }
    let tree = services.hierarchy_service().library_with(&config)?;
    print_tree(&tree, format)
}

#[instrument(skip(cli))]
fn _lineage(cli: &Cli, format: OutputFormat) -> CliResult<()> {
    let tree = container(cli)?.hierarchy_service().lineage()?;
    print_tree(&tree, format)
}

#[instrument(skip(cli))]
fn _family(cli: &Cli, root: Option<i64>, format: OutputFormat) -> CliResult<()> {
    let tree = container(cli)?.hierarchy_service().family(root)?;
    print_tree(&tree, format)
}

#[instrument(skip(cli))]
fn _import(
    cli: &Cli,
    path: &Path,
    integer_fields: &[String],
    float_fields: &[String],
) -> CliResult<()> {
    let services = container(cli)?;
    let rules = if integer_fields.is_empty() && float_fields.is_empty() {
        None
    } else {
        Some(CoercionRules::new(
            integer_fields.iter().cloned(),
            float_fields.iter().cloned(),
        ))
    };
    let tables = services.import_service(rules).import(path)?;
    print_json(&as_datasets(tables))
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no home directory, global config disabled"),
            }
            match local_config_path(cli) {
                Some(path) => output::action("local", &path.display()),
                None => output::action("local", &format!("{} (not found)", LOCAL_CONFIG_FILE)),
            }
        }
    }
    Ok(())
}
