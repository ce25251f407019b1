//! Job configuration: config file loading, command line overrides and the
//! plugin list rules.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use specgen_core::naming::CaseStyle;
use specgen_core::{PluginCatalog, PluginDefinition};
use tracing::debug;

use crate::plugins::{CLIENT_PREFIX, CLIENT_TAG, DEFAULT_PLUGINS, Plugin, builtin_catalog};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "specgen.toml";

const MISSING_INPUT: &str =
    "missing input - which OpenAPI specification should we use to generate your output?";
const MISSING_OUTPUT: &str = "missing output - where should we generate your output?";

/// Top-level shapes a config file may take.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConfigFile {
    /// `jobs = [...]`
    Jobs {
        /// The jobs, run in order.
        jobs: Vec<JobConfig>,
    },
    /// A bare array of jobs (JSON / YAML).
    List(Vec<JobConfig>),
    /// One job.
    Single(JobConfig),
}

impl ConfigFile {
    /// Flatten into the job list.
    pub fn into_jobs(self) -> Vec<JobConfig> {
        match self {
            Self::Jobs { jobs } | Self::List(jobs) => jobs,
            Self::Single(job) => vec![job],
        }
    }
}

/// One generation request as written in a config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    /// Label used in logs.
    #[serde(default)]
    pub name: Option<String>,
    /// OpenAPI document path.
    #[serde(default)]
    pub input: Option<PathBuf>,
    /// Output directory.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Plugins to run; the defaults when absent.
    #[serde(default)]
    pub plugins: Option<Vec<PluginEntry>>,
    /// Naming options.
    #[serde(default)]
    pub naming: NamingConfig,
    /// Render without writing.
    #[serde(default, alias = "dry_run")]
    pub dry_run: bool,
}

/// `naming` table.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NamingConfig {
    /// Case style for type and enum names.
    #[serde(default)]
    pub case: CaseStyle,
}

/// A plugin as listed in a job.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PluginEntry {
    /// Just the name.
    Name(String),
    /// Name plus config keys, or a custom definition.
    Object(PluginObject),
}

impl PluginEntry {
    /// The plugin name.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Object(object) => &object.name,
        }
    }
}

/// Object form of [`PluginEntry`].
///
/// With `dependencies` or `tags` it defines a custom plugin; otherwise the
/// remaining keys patch a built-in plugin's config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PluginObject {
    /// Plugin name.
    pub name: String,
    /// Dependencies of a custom plugin.
    #[serde(default)]
    pub dependencies: Option<Vec<String>>,
    /// Tags of a custom plugin.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Every other key.
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

impl PluginObject {
    fn is_custom(&self) -> bool {
        self.dependencies.is_some() || self.tags.is_some()
    }

    fn into_definition(self) -> PluginDefinition {
        let mut definition = PluginDefinition::new(self.name);
        definition.config = self.config;
        for dependency in self.dependencies.into_iter().flatten() {
            definition = definition.depends_on(dependency);
        }
        for tag in self.tags.into_iter().flatten() {
            definition = definition.tagged(tag);
        }
        definition
    }
}

/// Command line values applied over the loaded job.
#[derive(Debug, Clone, Default)]
pub struct JobOverrides {
    /// `--input`
    pub input: Option<PathBuf>,
    /// `--output`
    pub output: Option<PathBuf>,
    /// Repeated `--plugin`
    pub plugins: Vec<String>,
    /// `--dry-run`
    pub dry_run: bool,
}

impl JobOverrides {
    fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none() && self.plugins.is_empty() && !self.dry_run
    }

    fn apply(&self, job: &mut JobConfig) {
        if let Some(input) = &self.input {
            job.input = Some(input.clone());
        }
        if let Some(output) = &self.output {
            job.output = Some(output.clone());
        }
        if !self.plugins.is_empty() {
            job.plugins = Some(self.plugins.iter().cloned().map(PluginEntry::Name).collect());
        }
        job.dry_run |= self.dry_run;
    }
}

/// A validated job, ready for the driver.
#[derive(Debug, Clone)]
pub struct Job {
    /// Position in the config file.
    pub index: usize,
    /// Label used in logs.
    pub name: Option<String>,
    /// OpenAPI document path.
    pub input: PathBuf,
    /// Output directory.
    pub output: PathBuf,
    /// Requested plugin names.
    pub plugins: Vec<String>,
    /// Built-in definitions with this job's overrides.
    pub catalog: PluginCatalog,
    /// Case style for type and enum names.
    pub case: CaseStyle,
    /// Render without writing.
    pub dry_run: bool,
}

impl JobConfig {
    /// Validate and build the job's catalog and plugin list.
    pub fn into_job(self, index: usize, builtins: &[Box<dyn Plugin>]) -> Result<Job, String> {
        let input = self.input.ok_or_else(|| MISSING_INPUT.to_string())?;
        let output = self.output.ok_or_else(|| MISSING_OUTPUT.to_string())?;
        let mut catalog = builtin_catalog(builtins);
        let plugins = requested_plugins(self.plugins, &mut catalog)?;
        debug!(job = index, plugins = ?plugins, "Configured job.");
        Ok(Job {
            index,
            name: self.name,
            input,
            output,
            plugins,
            catalog,
            case: self.naming.case,
            dry_run: self.dry_run,
        })
    }
}

/// Apply the plugin list rules and register overrides in `catalog`.
///
/// - no list: the defaults;
/// - entries with an empty name are dropped;
/// - a lone client plugin gets the defaults prepended.
pub fn requested_plugins(
    entries: Option<Vec<PluginEntry>>,
    catalog: &mut PluginCatalog,
) -> Result<Vec<String>, String> {
    let Some(entries) = entries else {
        return Ok(DEFAULT_PLUGINS.iter().map(|name| (*name).to_string()).collect());
    };

    let mut names = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry.name().is_empty() {
            continue;
        }
        names.push(entry.name().to_string());
        match entry {
            PluginEntry::Name(_) => {}
            PluginEntry::Object(object) if object.is_custom() => {
                catalog
                    .register_custom(object.into_definition())
                    .map_err(|err| err.to_string())?;
            }
            PluginEntry::Object(object) => {
                if !object.config.is_empty() {
                    catalog.override_config(object.name, object.config);
                }
            }
        }
    }

    if let [single] = names.as_slice()
        && is_client(single, catalog)
    {
        let mut with_defaults: Vec<String> =
            DEFAULT_PLUGINS.iter().map(|name| (*name).to_string()).collect();
        with_defaults.append(&mut names);
        return Ok(with_defaults);
    }
    Ok(names)
}

fn is_client(name: &str, catalog: &PluginCatalog) -> bool {
    name.starts_with(CLIENT_PREFIX)
        || catalog
            .definition(name)
            .is_some_and(|definition| definition.has_tag(CLIENT_TAG))
}

/// Parse a config file, picking the format from its extension.
pub fn read_config(path: &Path) -> Result<Vec<JobConfig>, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read config {}: {err}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let file: ConfigFile = match extension.as_str() {
        "toml" => toml::from_str::<ConfigFile>(&text).map_err(|err| err.to_string()),
        "json" => serde_json::from_str::<ConfigFile>(&text).map_err(|err| err.to_string()),
        "yaml" | "yml" => serde_yaml::from_str::<ConfigFile>(&text).map_err(|err| err.to_string()),
        _ => {
            return Err(format!(
                "Unsupported config format: {} (expected .toml, .json, .yaml or .yml)",
                path.display()
            ));
        }
    }
    .map_err(|err| format!("Failed to parse config {}: {err}", path.display()))?;
    let jobs = file.into_jobs();
    debug!(path = %path.display(), jobs = jobs.len(), "Loaded config.");
    Ok(jobs)
}

/// Load the jobs for a run.
///
/// An explicit `config` must exist. Otherwise [`DEFAULT_CONFIG_FILE`] in
/// `cwd` is used when present, and an empty job when not. Overrides apply to
/// a single job only.
pub fn load_jobs(
    config: Option<&Path>,
    cwd: &Path,
    overrides: &JobOverrides,
) -> Result<Vec<JobConfig>, String> {
    let mut jobs = match config {
        Some(path) => read_config(path)?,
        None => {
            let default = cwd.join(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                read_config(&default)?
            } else {
                vec![JobConfig::default()]
            }
        }
    };

    if !overrides.is_empty() {
        match jobs.as_mut_slice() {
            [job] => overrides.apply(job),
            [] => {
                let mut job = JobConfig::default();
                overrides.apply(&mut job);
                jobs.push(job);
            }
            _ => {
                return Err(
                    "Command line input, output, plugin and dry-run flags cannot be combined with multiple jobs"
                        .to_string(),
                );
            }
        }
    }
    Ok(jobs)
}
