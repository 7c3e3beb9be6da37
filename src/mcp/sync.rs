// ============================================================================
// MCP Sync - propagate the source servers to every target file
// ============================================================================

use serde_json::{Map, Value};

use crate::config::SyncOptions;
use crate::error::AppError;
use crate::report::{SyncReport, TargetReport, TargetStatus};

use super::format::{read_document, TargetDocument};
use super::merge::{merge_entries, MergeMode};
use super::registry::{default_targets, select_targets, TargetSpec};
use super::source::{load_source, SourceConfig};
use super::transform::transform_source;
use super::writer::persist;

/// Load the source, resolve the registry and sync every selected target.
///
/// Only source problems (and an unknown `--only` id) are returned as errors;
/// per-target failures end up in the report.
pub fn run(options: &SyncOptions) -> Result<SyncReport, AppError> {
    let source = load_source(&options.source_path()?)?;
    let home = options.resolve_home()?;
    let targets = select_targets(default_targets(&home, &options.vscode_flavor), &options.only)?;
    Ok(sync_targets(&source, &targets, options))
}

/// Sync an already loaded source into the given targets, in order.
/// A failing target never stops the ones after it.
pub fn sync_targets(
    source: &SourceConfig,
    targets: &[TargetSpec],
    options: &SyncOptions,
) -> SyncReport {
    let mut report = SyncReport::new(source, options.mode == MergeMode::Prune, options.dry_run);
    for spec in targets {
        report.targets.push(sync_target(source, spec, options));
    }
    report
}

fn sync_target(source: &SourceConfig, spec: &TargetSpec, options: &SyncOptions) -> TargetReport {
    let mut report = TargetReport::new(spec);

    if source.is_same_file(&spec.path) {
        log::info!(
            "Skipping {}: {} is the source file",
            spec.display_name,
            spec.path.display()
        );
        report.status = TargetStatus::SkippedSelfReference;
        return report;
    }

    if options.skip_missing && !spec.path.exists() {
        log::info!(
            "Skipping {}: {} not found",
            spec.display_name,
            spec.path.display()
        );
        report.status = TargetStatus::SkippedMissing;
        return report;
    }

    let (incoming, skipped) = transform_source(source, spec);
    report.skipped = skipped;

    let status = match apply_to_target(spec, &incoming, options, &mut report) {
        Ok(status) => status,
        Err(e) => {
            log::error!("Failed to sync {}: {e}", spec.display_name);
            TargetStatus::failed(&e)
        }
    };
    report.status = status;
    report
}

fn apply_to_target(
    spec: &TargetSpec,
    incoming: &Map<String, Value>,
    options: &SyncOptions,
    report: &mut TargetReport,
) -> Result<TargetStatus, AppError> {
    let existing = read_document(spec.format, &spec.path, spec.top_level_key)?;
    let existed = existing.is_some();
    let mut doc = existing.unwrap_or_else(|| TargetDocument::empty(spec.format));

    let outcome = merge_entries(doc.entries(), incoming, options.mode);
    report.changes = outcome.changes.clone();

    if !outcome.has_changes() {
        log::info!("{} is already up to date", spec.display_name);
        return Ok(TargetStatus::UpToDate);
    }
    if options.dry_run {
        log::info!(
            "Dry run: {} would change ({} change(s))",
            spec.display_name,
            outcome.changed_count()
        );
        return Ok(TargetStatus::DryRun);
    }

    doc.apply(spec.top_level_key, &outcome)?;
    let content = doc.render()?;
    let backup = persist(&spec.path, &content, existed)?;
    log::info!("Synced MCP servers to {}", spec.display_name);

    Ok(TargetStatus::Written {
        backup: backup.map(|p| p.display().to_string()),
    })
}
