// ============================================================================
// MCP Module - source loading, per-target conversion and file sync
// ============================================================================

mod format;
mod merge;
mod record;
mod registry;
mod source;
mod sync;
mod transform;
mod writer;

pub use format::{read_document, toml_compatible, TargetDocument};
pub use merge::{merge_entries, ChangeKind, EntryChange, MergeMode, MergeOutcome};
pub use record::{ServerRecord, TransportType, ValidationError};
pub use registry::{default_targets, select_targets, Constraint, FileFormat, TargetSpec};
pub use source::{load_source, SourceConfig, SOURCE_KEY};
pub use sync::{run, sync_targets};
pub use transform::{restore_record, transform_record, transform_source, SkippedEntry, Transformed};
pub use writer::persist;
