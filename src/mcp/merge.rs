use serde::Serialize;
use serde_json::{Map, Value};

/// Policy for entries that exist only in the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    #[default]
    Preserve,
    Prune,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Updated,
    Unchanged,
    /// Only in the target, kept because the run does not prune
    Preserved,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryChange {
    pub name: String,
    pub kind: ChangeKind,
}

/// New entry section plus what happened to each name
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub entries: Map<String, Value>,
    pub changes: Vec<EntryChange>,
}

impl MergeOutcome {
    pub fn has_changes(&self) -> bool {
        self.changed_count() > 0
    }

    /// Entries added, updated or removed
    pub fn changed_count(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| {
                matches!(
                    c.kind,
                    ChangeKind::Added | ChangeKind::Updated | ChangeKind::Removed
                )
            })
            .count()
    }

    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }
}

/// Merge transformed source entries into a target's existing entries.
///
/// Existing entries keep their position (updates replace the value in place),
/// new ones are appended in source order. Comparison is plain JSON equality,
/// which ignores object key order but not array order.
pub fn merge_entries(
    existing: &Map<String, Value>,
    incoming: &Map<String, Value>,
    mode: MergeMode,
) -> MergeOutcome {
    let mut entries = Map::new();
    let mut changes = Vec::with_capacity(existing.len().max(incoming.len()));

    for (name, current) in existing {
        match incoming.get(name) {
            Some(wanted) if wanted == current => {
                entries.insert(name.clone(), current.clone());
                changes.push(EntryChange {
                    name: name.clone(),
                    kind: ChangeKind::Unchanged,
                });
            }
            Some(wanted) => {
                entries.insert(name.clone(), wanted.clone());
                changes.push(EntryChange {
                    name: name.clone(),
                    kind: ChangeKind::Updated,
                });
            }
            None if mode == MergeMode::Prune => {
                changes.push(EntryChange {
                    name: name.clone(),
                    kind: ChangeKind::Removed,
                });
            }
            None => {
                entries.insert(name.clone(), current.clone());
                changes.push(EntryChange {
                    name: name.clone(),
                    kind: ChangeKind::Preserved,
                });
            }
        }
    }

    for (name, wanted) in incoming {
        if existing.contains_key(name) {
            continue;
        }
        entries.insert(name.clone(), wanted.clone());
        changes.push(EntryChange {
            name: name.clone(),
            kind: ChangeKind::Added,
        });
    }

    MergeOutcome { entries, changes }
}
