//! Due-set resolution.
//!
//! Reconciles a patient's mastery records against the full catalog of
//! reviewable items: records that are due come first, then catalog items
//! that have never been reviewed at all. A pure query over externally
//! supplied collections.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::model::{ItemRef, ItemType, MasteryRecord, ReviewableItem};

/// One entry in the due set.
#[derive(Debug, Clone)]
pub enum DueEntry {
    /// An existing mastery record whose next review is now or overdue.
    Reviewed(MasteryRecord),
    /// A catalog item with no mastery record: never reviewed, so
    /// immediately due.
    Unseen { item_type: ItemType, item_id: Uuid },
}

impl DueEntry {
    pub fn item_ref(&self) -> ItemRef {
        match self {
            DueEntry::Reviewed(record) => ItemRef {
                item_type: record.key.item_type,
                item_id: record.key.item_id,
            },
            DueEntry::Unseen { item_type, item_id } => ItemRef {
                item_type: *item_type,
                item_id: *item_id,
            },
        }
    }
}

/// Resolve the set of items due for review for one patient.
///
/// Mastery-derived entries take precedence over catalog-derived ones for
/// the same item, and an item whose mastery record is scheduled in the
/// future is suppressed entirely; every item appears at most once.
/// Retired knowledge items never surface, with or without a record.
pub fn due_entries(
    patient_id: Uuid,
    now: DateTime<Utc>,
    mastery: &[MasteryRecord],
    items: &[ReviewableItem],
) -> Vec<DueEntry> {
    let mut entries = Vec::new();
    let mut tracked: HashSet<ItemRef> = HashSet::new();
    let retired: HashSet<ItemRef> = items
        .iter()
        .filter(|item| !item.is_active())
        .map(|item| item.item_ref())
        .collect();

    for record in mastery {
        if record.key.patient_id != patient_id {
            continue;
        }
        let item_ref = ItemRef {
            item_type: record.key.item_type,
            item_id: record.key.item_id,
        };
        // A record that exists but is not yet due still suppresses the
        // catalog entry below.
        if tracked.insert(item_ref) && record.is_due(now) && !retired.contains(&item_ref) {
            entries.push(DueEntry::Reviewed(record.clone()));
        }
    }

    for item in items {
        if item.patient_id() != patient_id || !item.is_active() {
            continue;
        }
        let item_ref = item.item_ref();
        if tracked.insert(item_ref) {
            entries.push(DueEntry::Unseen {
                item_type: item_ref.item_type,
                item_id: item_ref.item_id,
            });
        }
    }

    entries
}
