//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/vassar/vassar.toml`
//! 3. Local config: `./.vassar.toml` or the file passed with `--config`
//! 4. Environment variables: `VASSAR_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{CoercionRules, FamilyConfig, FieldMap, ReducerConfig, RootPolicy};

/// File name of the local config, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".vassar.toml";

/// Author → series → book view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LibrarySettings {
    /// Name of the wrapper node (default: "Library")
    pub sentinel: String,
    /// Label for books without a series; `None` attaches them to the author
    pub fallback_label: Option<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            sentinel: "Library".into(),
            fallback_label: Some("Standalone".into()),
        }
    }
}

impl LibrarySettings {
    pub fn reducer_config(&self) -> ReducerConfig {
        ReducerConfig::library()
            .with_sentinel(&self.sentinel)
            .with_fallback_label(self.fallback_label.as_deref())
    }
}

/// Person → descendant view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LineageSettings {
    pub sentinel: String,
    pub parent_field: String,
    pub child_field: String,
}

impl Default for LineageSettings {
    fn default() -> Self {
        Self {
            sentinel: "Tree".into(),
            parent_field: "p".into(),
            child_field: "descendant".into(),
        }
    }
}

impl LineageSettings {
    pub fn reducer_config(&self) -> ReducerConfig {
        ReducerConfig::lineage()
            .with_sentinel(&self.sentinel)
            .with_fields(FieldMap::new(&self.parent_field, &self.child_field))
            .with_root_policy(RootPolicy::CollapseSingle)
    }
}

/// Union-tree view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FamilySettings {
    pub sentinel: String,
    pub couple_separator: String,
    /// Default root person; `None` builds the whole forest
    pub root: Option<i64>,
}

impl Default for FamilySettings {
    fn default() -> Self {
        let defaults = FamilyConfig::default();
        Self {
            sentinel: defaults.sentinel,
            couple_separator: defaults.couple_separator,
            root: None,
        }
    }
}

impl FamilySettings {
    pub fn family_config(&self) -> FamilyConfig {
        FamilyConfig {
            sentinel: self.sentinel.clone(),
            couple_separator: self.couple_separator.clone(),
        }
    }
}

/// CSV import coercion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImportSettings {
    pub integer_fields: Vec<String>,
    pub float_fields: Vec<String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            integer_fields: vec!["publication_year".into(), "book_number".into()],
            float_fields: vec!["contribution_percentage".into()],
        }
    }
}

impl ImportSettings {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(pattern.clone());
            }
        }

        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    pub fn coercion_rules(&self) -> CoercionRules {
        CoercionRules::new(self.integer_fields.iter().cloned(), self.float_fields.iter().cloned())
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub snapshot: Option<PathBuf>,
    pub library: RawLibrarySettings,
    pub lineage: RawLineageSettings,
    pub family: RawFamilySettings,
    pub import: RawImportSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLibrarySettings {
    pub sentinel: Option<String>,
    pub fallback_label: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLineageSettings {
    pub sentinel: Option<String>,
    pub parent_field: Option<String>,
    pub child_field: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawFamilySettings {
    pub sentinel: Option<String>,
    pub couple_separator: Option<String>,
    pub root: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawImportSettings {
    pub integer_fields: Option<Vec<String>>,
    pub float_fields: Option<Vec<String>>,
}

/// Unified configuration for vassar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// JSON snapshot of graph-query results
    pub snapshot: Option<PathBuf>,
    pub library: LibrarySettings,
    pub lineage: LineageSettings,
    pub family: FamilySettings,
    pub import: ImportSettings,
}

/// Get the XDG config directory for vassar.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "vassar").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("vassar.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// An empty label in any layer switches the fallback off.
fn fallback_from(raw: &str) -> Option<String> {
    (!raw.is_empty()).then(|| raw.to_string())
}

impl Settings {
    /// Expand `~` and `$VAR` in the snapshot path.
    fn expand_paths(&mut self) {
        if let Some(snapshot) = &self.snapshot {
            let raw = snapshot.to_string_lossy();
            let expanded = shellexpand::full(raw.as_ref())
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            self.snapshot = Some(PathBuf::from(expanded));
        }
    }

    /// Overlay scalars; arrays REPLACE when `union` is false, UNION otherwise.
    fn overlay(&self, raw: &RawSettings, union: bool) -> Self {
        let merge = |base: &[String], over: &Option<Vec<String>>| match over {
            Some(o) if union => ImportSettings::merge_array(base, o),
            Some(o) => o.clone(),
            None => base.to_vec(),
        };
        Self {
            snapshot: raw.snapshot.clone().or_else(|| self.snapshot.clone()),
            library: LibrarySettings {
                sentinel: raw
                    .library
                    .sentinel
                    .clone()
                    .unwrap_or_else(|| self.library.sentinel.clone()),
                fallback_label: match &raw.library.fallback_label {
                    Some(label) => fallback_from(label),
                    None => self.library.fallback_label.clone(),
                },
            },
            lineage: LineageSettings {
                sentinel: raw
                    .lineage
                    .sentinel
                    .clone()
                    .unwrap_or_else(|| self.lineage.sentinel.clone()),
                parent_field: raw
                    .lineage
                    .parent_field
                    .clone()
                    .unwrap_or_else(|| self.lineage.parent_field.clone()),
                child_field: raw
                    .lineage
                    .child_field
                    .clone()
                    .unwrap_or_else(|| self.lineage.child_field.clone()),
            },
            family: FamilySettings {
                sentinel: raw
                    .family
                    .sentinel
                    .clone()
                    .unwrap_or_else(|| self.family.sentinel.clone()),
                couple_separator: raw
                    .family
                    .couple_separator
                    .clone()
                    .unwrap_or_else(|| self.family.couple_separator.clone()),
                root: raw.family.root.or(self.family.root),
            },
            import: ImportSettings {
                integer_fields: merge(&self.import.integer_fields, &raw.import.integer_fields),
                float_fields: merge(&self.import.float_fields, &raw.import.float_fields),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional local config file; must exist when given
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE (global defines the real baseline)
    /// - Global → Local: UNION with `!item` negation
    /// - Any → Env vars: REPLACE (explicit user override)
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.overlay(&raw, false);
            }
        }

        if let Some(local_path) = local {
            if !local_path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", local_path.display()),
                });
            }
            debug!("loading local config {}", local_path.display());
            let raw = load_raw_settings(local_path)?;
            current = current.overlay(&raw, true);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply VASSAR_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("VASSAR")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("snapshot") {
            settings.snapshot = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("library.sentinel") {
            settings.library.sentinel = val;
        }
        if let Ok(val) = config.get_string("library.fallback_label") {
            settings.library.fallback_label = fallback_from(&val);
        }
        if let Ok(val) = config.get_string("lineage.sentinel") {
            settings.lineage.sentinel = val;
        }
        if let Ok(val) = config.get_string("lineage.parent_field") {
            settings.lineage.parent_field = val;
        }
        if let Ok(val) = config.get_string("lineage.child_field") {
            settings.lineage.child_field = val;
        }
        if let Ok(val) = config.get_string("family.sentinel") {
            settings.family.sentinel = val;
        }
        if let Ok(val) = config.get_string("family.couple_separator") {
            settings.family.couple_separator = val;
        }
        if let Ok(val) = config.get_int("family.root") {
            settings.family.root = Some(val);
        }
        if let Ok(val) = config.get_string("import.integer_fields") {
            settings.import.integer_fields = split_list(&val);
        }
        if let Ok(val) = config.get_string("import.float_fields") {
            settings.import.float_fields = split_list(&val);
        }

        Ok(settings)
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}

/// Comma-separated env value into a field list.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
