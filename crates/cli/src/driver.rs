//! Per-job generation pipeline.
//!
//! 1. Resolve: requested plugins -> execution order
//! 2. Generate: each plugin declares into a fresh context
//! 3. Render: emission order, placeholder substitution
//! 4. Emit: `<output>/index.ts`

use std::path::PathBuf;

use specgen_core::naming::CaseStyle;
use specgen_core::{GenerationContext, PluginCatalog, WalkOptions, resolve};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Job, JobConfig};
use crate::emit::{file_contents, write_output};
use crate::plugins::{Plugin, PluginRun, emission_priority, find};
use crate::spec::OpenApiDocument;

/// A job that failed; the remaining jobs still run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("job {job_index} failed: {message}")]
pub struct JobError {
    /// Position of the job in the config.
    pub job_index: usize,
    /// What went wrong.
    pub message: String,
}

/// A job that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutput {
    /// Position of the job in the config.
    pub job_index: usize,
    /// Target file.
    pub path: PathBuf,
    /// Full file contents.
    pub contents: String,
    /// False for dry runs.
    pub written: bool,
}

/// Run the requested plugins over `document` and render the result.
pub fn render_document(
    document: &OpenApiDocument,
    requested: &[String],
    catalog: &PluginCatalog,
    plugins: &[Box<dyn Plugin>],
    case: CaseStyle,
) -> Result<String, String> {
    let resolution = resolve(requested, catalog).map_err(|err| err.to_string())?;

    let mut context = GenerationContext::new();
    for name in &resolution.order {
        let Some(record) = resolution.resolved.get(name) else {
            continue;
        };
        let Some(plugin) = find(plugins, name) else {
            warn!(plugin = %name, "No generator for plugin, skipping.");
            continue;
        };
        debug!(plugin = %name, "Running plugin.");
        let mut run = PluginRun {
            document,
            record,
            context: &mut context,
            case,
        };
        plugin
            .generate(&mut run)
            .map_err(|err| format!("Plugin {name} failed: {err}"))?;
    }

    let options = WalkOptions::new().priority(&emission_priority);
    context
        .render(&options)
        .map_err(|err| format!("Failed to render output: {err}"))
}

/// Read, generate and write one job.
pub fn run_job(job: &Job, plugins: &[Box<dyn Plugin>]) -> Result<JobOutput, String> {
    info!(
        job = job.index,
        name = job.name.as_deref().unwrap_or_default(),
        input = %job.input.display(),
        "Generating."
    );
    let document = OpenApiDocument::read(&job.input)?;
    let body = render_document(&document, &job.plugins, &job.catalog, plugins, job.case)?;
    let contents = file_contents(&body);
    let path = write_output(&job.output, &contents, job.dry_run)?;
    Ok(JobOutput {
        job_index: job.index,
        path,
        contents,
        written: !job.dry_run,
    })
}

/// Run every job with fresh state, collecting failures instead of stopping.
pub fn run_jobs(
    configs: Vec<JobConfig>,
    plugins: &[Box<dyn Plugin>],
) -> (Vec<JobOutput>, Vec<JobError>) {
    let mut outputs = Vec::new();
    let mut errors = Vec::new();
    for (job_index, config) in configs.into_iter().enumerate() {
        match config
            .into_job(job_index, plugins)
            .and_then(|job| run_job(&job, plugins))
        {
            Ok(output) => outputs.push(output),
            Err(message) => {
                warn!(job = job_index, error = %message, "Job failed.");
                errors.push(JobError { job_index, message });
            }
        }
    }
    (outputs, errors)
}
