mod config;
mod error;
mod mcp;
mod report;

pub mod cli;

pub use config::{atomic_write, backup_path_for, get_home_dir, SyncOptions, DEFAULT_VSCODE_FLAVOR};
pub use error::AppError;
pub use mcp::{
    default_targets, load_source, merge_entries, persist, read_document, restore_record, run,
    select_targets, sync_targets, toml_compatible, transform_record, transform_source, ChangeKind,
    Constraint, EntryChange, FileFormat, MergeMode, MergeOutcome, ServerRecord, SkippedEntry,
    SourceConfig, TargetDocument, TargetSpec, Transformed, TransportType, ValidationError,
    SOURCE_KEY,
};
pub use report::{
    describe_targets, render_summary, render_targets, ChangeCounts, InvalidEntry, SyncReport,
    TargetInfo, TargetReport, TargetStatus,
};
