//! `fedshare plan` command implementation.
//!
//! Runs one provide pass per target over a resolution manifest and reports
//! the shared module providers each pass would add to the build graph.

use crate::host::PlanHost;
use crate::manifest::{read_manifest, resolve_events, LoadOptions, DEFAULT_MANIFEST_FILE};
use fedshare_core::version::PLAN_SCHEMA_VERSION;
use fedshare_core::{
    load_provide_options, Config, Error, ProvideSharedDependency, ProvideSharedPlugin,
    ProvideWarning,
};
use futures::future::join_all;
use futures::StreamExt;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Target name used when none is given.
pub const DEFAULT_TARGET: &str = "main";

/// Plan command action.
#[derive(Debug, Clone)]
pub struct PlanAction {
    pub cwd: PathBuf,
    /// Federation options file (default: `federation.json`).
    pub config: Option<PathBuf>,
    /// Resolution manifest (default: `resolutions.json`).
    pub manifest: Option<PathBuf>,
    /// Build targets, each an independent pass. Empty = `main`.
    pub targets: Vec<String>,
    pub find_description_files: bool,
    pub verify_resources: bool,
}

/// Plan result for JSON output.
#[derive(Debug, Serialize)]
struct PlanResultJson {
    schema_version: u32,
    cwd: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
    targets: Vec<TargetReport>,
    notes: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorJson {
    code: String,
    message: String,
}

impl From<&Error> for ErrorJson {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TargetReport {
    name: String,
    ok: bool,
    provides: Vec<ProvideSharedDependency>,
    warnings: Vec<ProvideWarning>,
    /// Requests whose resolution must not be cached.
    uncacheable: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

/// Run the plan command.
///
/// Exits with status 1 when configuration is invalid or any target fails.
pub fn run(action: PlanAction, json: bool) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    let cwd = action.cwd.display().to_string();
    let result = runtime.block_on(plan(&action));

    match result {
        Ok((targets, notes)) => {
            let ok = targets.iter().all(|t| t.ok);
            let result = PlanResultJson {
                schema_version: PLAN_SCHEMA_VERSION,
                cwd,
                ok,
                error: None,
                targets,
                notes,
            };
            if json {
                print_json(&result)?;
            } else {
                print_human(&result);
            }
            if !ok {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let result = PlanResultJson {
                    schema_version: PLAN_SCHEMA_VERSION,
                    cwd,
                    ok: false,
                    error: Some(ErrorJson::from(&e)),
                    targets: Vec::new(),
                    notes: Vec::new(),
                };
                print_json(&result)?;
                std::process::exit(1);
            }
            Err(miette::miette!("{e}"))
        }
    }
}

async fn plan(action: &PlanAction) -> Result<(Vec<TargetReport>, Vec<String>), Error> {
    let config = Config::new(action.cwd.clone());
    let options = load_provide_options(&config.options_path(action.config.as_deref()))?;
    let plugin = ProvideSharedPlugin::new(&options)?;

    let manifest_path = match &action.manifest {
        Some(path) => config.cwd.join(path),
        None => config.cwd.join(DEFAULT_MANIFEST_FILE),
    };
    let entries = read_manifest(&manifest_path)?;

    let mut notes = Vec::new();
    if plugin.provides().is_empty() {
        notes.push("no provides configured".to_string());
    }
    if entries.is_empty() {
        notes.push("resolution manifest is empty".to_string());
    }

    let context = dunce::canonicalize(&config.cwd).unwrap_or_else(|_| config.cwd.clone());
    let targets: Vec<String> = if action.targets.is_empty() {
        vec![DEFAULT_TARGET.to_string()]
    } else {
        action.targets.clone()
    };

    let load_options = LoadOptions {
        find_description_files: action.find_description_files,
    };

    let reports = join_all(targets.into_iter().map(|name| {
        run_target(
            &plugin,
            name,
            entries.clone(),
            &context,
            load_options,
            action.verify_resources,
        )
    }))
    .await;

    Ok((reports, notes))
}

async fn run_target(
    plugin: &ProvideSharedPlugin,
    name: String,
    entries: Vec<crate::manifest::ManifestEntry>,
    context: &Path,
    load_options: LoadOptions,
    verify_resources: bool,
) -> TargetReport {
    let host = PlanHost::new(name.clone(), verify_resources);
    let mut pass = plugin.begin_pass(context);
    let mut uncacheable = Vec::new();

    let mut events = std::pin::pin!(resolve_events(entries, context, load_options));
    while let Some(mut event) = events.next().await {
        pass.on_module_resolved(&mut event, &host);
        if !event.cacheable {
            uncacheable.push(event.request);
        }
    }

    let result = pass.finish_make(&host).await;
    let (provides, warnings) = host.into_parts();

    match &result {
        Ok(count) => info!(
            target_name = %name,
            count,
            warnings = warnings.len(),
            "Planned provides"
        ),
        Err(e) => info!(target_name = %name, error = %e, "Provide inclusion failed"),
    }

    TargetReport {
        name,
        ok: result.is_ok(),
        provides,
        warnings,
        uncacheable,
        error: result.err().as_ref().map(ErrorJson::from),
    }
}

fn print_json(result: &PlanResultJson) -> Result<()> {
    let json = serde_json::to_string_pretty(result).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

fn print_human(result: &PlanResultJson) {
    for target in &result.targets {
        println!("target {}", target.name);
        if target.provides.is_empty() {
            println!("  (no shared modules provided)");
        }
        for dep in &target.provides {
            println!(
                "  provide ({}) {} @ {} <- {}{}",
                dep.share_scope,
                dep.share_key,
                dep.version,
                dep.request,
                if dep.eager { " [eager]" } else { "" }
            );
        }
        for warning in &target.warnings {
            println!("  warning: {warning}");
        }
        if let Some(error) = &target.error {
            println!("  error[{}]: {}", error.code, error.message);
        }
    }
    for note in &result.notes {
        println!("note: {note}");
    }
}
