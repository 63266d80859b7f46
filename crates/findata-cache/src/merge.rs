//! Upsert of incoming records into a stored entry.

use findata_core::{Record, RecordIdentity};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Merges `incoming` into `existing` by record identity.
///
/// A record whose identity is already present replaces the stored one in place;
/// any other record is appended. Stored records missing from `incoming` are
/// kept. Within `incoming`, the last record for an identity wins.
#[must_use]
pub fn merge(existing: Vec<Record>, incoming: Vec<Record>) -> Vec<Record> {
    let mut merged = existing;
    let mut index: HashMap<RecordIdentity, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, r)| (r.identity(), i))
        .collect();

    for record in incoming {
        match index.entry(record.identity()) {
            Entry::Occupied(slot) => merged[*slot.get()] = record,
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(record);
            }
        }
    }

    merged
}
