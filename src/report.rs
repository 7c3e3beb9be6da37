use std::fmt::Write as _;

use serde::Serialize;

use crate::error::AppError;
use crate::mcp::{ChangeKind, EntryChange, FileFormat, SkippedEntry, SourceConfig, TargetSpec};

/// What happened to one target file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum TargetStatus {
    Written {
        #[serde(skip_serializing_if = "Option::is_none")]
        backup: Option<String>,
    },
    UpToDate,
    DryRun,
    SkippedSelfReference,
    SkippedMissing,
    Failed {
        kind: String,
        message: String,
    },
}

impl TargetStatus {
    pub fn failed(err: &AppError) -> Self {
        TargetStatus::Failed {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TargetStatus::Written { .. } => "written",
            TargetStatus::UpToDate => "already up to date",
            TargetStatus::DryRun => "would change (dry run)",
            TargetStatus::SkippedSelfReference => "skipped: self-reference",
            TargetStatus::SkippedMissing => "skipped: config file not found",
            TargetStatus::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub preserved: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetReport {
    pub id: String,
    pub display_name: String,
    pub path: String,
    #[serde(flatten)]
    pub status: TargetStatus,
    pub changes: Vec<EntryChange>,
    pub skipped: Vec<SkippedEntry>,
}

impl TargetReport {
    pub fn new(spec: &TargetSpec) -> Self {
        Self {
            id: spec.id.to_string(),
            display_name: spec.display_name.to_string(),
            path: spec.path.display().to_string(),
            status: TargetStatus::UpToDate,
            changes: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn counts(&self) -> ChangeCounts {
        let mut counts = ChangeCounts {
            skipped: self.skipped.len(),
            ..ChangeCounts::default()
        };
        for change in &self.changes {
            match change.kind {
                ChangeKind::Added => counts.added += 1,
                ChangeKind::Updated => counts.updated += 1,
                ChangeKind::Removed => counts.removed += 1,
                ChangeKind::Unchanged => counts.unchanged += 1,
                ChangeKind::Preserved => counts.preserved += 1,
            }
        }
        counts
    }

    pub fn change(&self, name: &str) -> Option<ChangeKind> {
        self.changes.iter().find(|c| c.name == name).map(|c| c.kind)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidEntry {
    pub name: String,
    pub reason: String,
}

/// Outcome of a whole run, one entry per processed target
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub source: String,
    pub servers: Vec<String>,
    pub invalid: Vec<InvalidEntry>,
    pub prune: bool,
    pub dry_run: bool,
    pub targets: Vec<TargetReport>,
}

impl SyncReport {
    pub fn new(source: &SourceConfig, prune: bool, dry_run: bool) -> Self {
        Self {
            source: source.path().display().to_string(),
            servers: source.servers().iter().map(|s| s.name().to_string()).collect(),
            invalid: source
                .invalid()
                .iter()
                .map(|(name, e)| InvalidEntry {
                    name: name.clone(),
                    reason: e.to_string(),
                })
                .collect(),
            prune,
            dry_run,
            targets: Vec::new(),
        }
    }

    pub fn target(&self, id: &str) -> Option<&TargetReport> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn failed_targets(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| matches!(t.status, TargetStatus::Failed { .. }))
            .count()
    }
}

/// Human readable summary printed at the end of a run
pub fn render_summary(report: &SyncReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Using config file: {}", report.source);
    if report.servers.is_empty() {
        let _ = writeln!(out, "No MCP servers found in source");
    } else {
        let _ = writeln!(out, "Found servers: {}", report.servers.join(", "));
    }
    for entry in &report.invalid {
        let _ = writeln!(out, "  ! ignored '{}': {}", entry.name, entry.reason);
    }
    if report.dry_run {
        let _ = writeln!(out, "Dry run, no files will be written");
    }

    for target in &report.targets {
        let _ = writeln!(out, " -> {} ({})", target.display_name, target.path);
        match &target.status {
            TargetStatus::SkippedSelfReference | TargetStatus::SkippedMissing => {
                let _ = writeln!(out, "    {}", target.status.label());
                continue;
            }
            TargetStatus::Failed { kind, message } => {
                let _ = writeln!(out, "    failed [{kind}]: {message}");
                continue;
            }
            _ => {}
        }

        let c = target.counts();
        let _ = writeln!(
            out,
            "    added {}, updated {}, removed {}, unchanged {}, preserved {}, skipped {}: {}",
            c.added,
            c.updated,
            c.removed,
            c.unchanged,
            c.preserved,
            c.skipped,
            target.status.label()
        );
        if let TargetStatus::Written {
            backup: Some(backup),
        } = &target.status
        {
            let _ = writeln!(out, "    backup: {backup}");
        }
        for skip in &target.skipped {
            let _ = writeln!(out, "    skipped '{}': {}", skip.name, skip.reason);
        }
    }

    let failed = report.failed_targets();
    if failed > 0 {
        let _ = writeln!(out, "Sync finished with {failed} failed target(s).");
    } else {
        let _ = writeln!(out, "Sync complete.");
    }
    out
}

/// One row of `mcp-sync targets`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub path: String,
    pub format: FileFormat,
    pub key: &'static str,
    pub exists: bool,
}

pub fn describe_targets(targets: &[TargetSpec]) -> Vec<TargetInfo> {
    targets
        .iter()
        .map(|t| TargetInfo {
            id: t.id,
            display_name: t.display_name,
            path: t.path.display().to_string(),
            format: t.format,
            key: t.top_level_key,
            exists: t.path.exists(),
        })
        .collect()
}

pub fn render_targets(infos: &[TargetInfo]) -> String {
    let mut out = String::new();
    for info in infos {
        let state = if info.exists { "found" } else { "missing" };
        let _ = writeln!(
            out,
            "{:<14} {:<40} {} [{state}]",
            info.id, info.display_name, info.path
        );
    }
    out
}
