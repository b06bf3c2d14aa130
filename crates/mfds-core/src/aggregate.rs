//! Per-ingredient original/generic statistics over the full candidate pool.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use mfds_model::{CandidateRecord, DedupKey, GroupStats, ProcessOutcome, UNKNOWN_PERMIT_DATE};
use mfds_normalization::{CrossReference, group_key, strip_dosage};
use tracing::{debug, info};

/// Statistics and product names for one ingredient group.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub key: String,
    /// Distinct dosage-normalized product names, first-seen order.
    pub product_names: Vec<String>,
    /// Earliest permit date seen for each product name.
    pub earliest_by_name: HashMap<String, String>,
    pub min_permit_date: String,
    /// Product names flagged as new drugs by the registry.
    pub new_drug_names: BTreeSet<String>,
    pub original_names: BTreeSet<String>,
    pub generic_count: usize,
    /// Deduplicated registry records in the group.
    pub record_count: usize,
    /// Input rows whose matched record falls in the group.
    pub matched_rows: usize,
}

impl GroupSummary {
    fn new(key: String) -> Self {
        Self {
            key,
            product_names: Vec::new(),
            earliest_by_name: HashMap::new(),
            min_permit_date: UNKNOWN_PERMIT_DATE.to_string(),
            new_drug_names: BTreeSet::new(),
            original_names: BTreeSet::new(),
            generic_count: 0,
            record_count: 0,
            matched_rows: 0,
        }
    }

    fn add(&mut self, candidate: &CandidateRecord) {
        let name = strip_dosage(&candidate.item_name);
        let date = candidate.permit_date_or_sentinel();
        self.record_count += 1;
        match self.earliest_by_name.get_mut(&name) {
            Some(earliest) => {
                if date < earliest.as_str() {
                    *earliest = date.to_string();
                }
            }
            None => {
                self.product_names.push(name.clone());
                self.earliest_by_name.insert(name.clone(), date.to_string());
            }
        }
        if date < self.min_permit_date.as_str() {
            self.min_permit_date = date.to_string();
        }
        if candidate.is_new_drug == Some(true) {
            self.new_drug_names.insert(name);
        }
    }

    /// Flag-based originals when the registry flags any product, else every
    /// product first approved on the group's earliest date.
    fn finish(&mut self) {
        let original_count = if self.new_drug_names.is_empty() {
            self.original_names = self
                .earliest_by_name
                .iter()
                .filter(|(_, date)| **date == self.min_permit_date)
                .map(|(name, _)| name.clone())
                .collect();
            self.original_names.len()
        } else {
            self.original_names = self.new_drug_names.clone();
            // A flagged group always has at least one original.
            self.original_names.len().max(1)
        };
        self.generic_count = self.product_names.len().saturating_sub(original_count);
    }

    pub fn is_original(&self, product_name: &str) -> bool {
        self.original_names.contains(product_name)
    }

    pub fn distinct_products(&self) -> usize {
        self.product_names.len()
    }

    pub fn joined_names(&self, separator: &str) -> String {
        self.product_names.join(separator)
    }

    pub fn stats(&self) -> GroupStats {
        GroupStats {
            generic_count: self.generic_count,
            min_permit_date: self.min_permit_date.clone(),
        }
    }
}

/// Ingredient groups of a candidate pool plus the cross-reference used to
/// build them.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    groups: BTreeMap<String, GroupSummary>,
    cross_reference: CrossReference,
    pool_records: usize,
    deduplicated_records: usize,
    ungrouped_records: usize,
}

impl Aggregates {
    /// Group key of a record under this pool's cross-reference.
    pub fn group_key(&self, candidate: &CandidateRecord) -> String {
        group_key(candidate, &self.cross_reference)
    }

    pub fn get(&self, key: &str) -> Option<&GroupSummary> {
        self.groups.get(key)
    }

    pub fn group_for(&self, candidate: &CandidateRecord) -> Option<&GroupSummary> {
        let key = self.group_key(candidate);
        if key.is_empty() {
            return None;
        }
        self.groups.get(&key)
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupSummary> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group key to `{generic_count, min_permit_date}`.
    pub fn stats(&self) -> BTreeMap<String, GroupStats> {
        self.groups
            .iter()
            .map(|(key, group)| (key.clone(), group.stats()))
            .collect()
    }

    pub fn cross_reference(&self) -> &CrossReference {
        &self.cross_reference
    }

    pub fn pool_records(&self) -> usize {
        self.pool_records
    }

    pub fn deduplicated_records(&self) -> usize {
        self.deduplicated_records
    }

    /// Records without ingredient text; they belong to no group.
    pub fn ungrouped_records(&self) -> usize {
        self.ungrouped_records
    }
}

/// Drops repeated registry rows by `item_seq` (then `permit_no`), keeping
/// the first occurrence. Records with neither key are always kept.
pub fn deduplicate(pool: &[CandidateRecord]) -> Vec<&CandidateRecord> {
    let mut seen: HashSet<DedupKey<'_>> = HashSet::new();
    pool.iter()
        .filter(|candidate| match candidate.dedup_key() {
            Some(key) => seen.insert(key),
            None => true,
        })
        .collect()
}

/// Computes per-ingredient statistics over the whole candidate pool.
///
/// `matched` only feeds the per-group matched-row counters; the statistics
/// themselves come from `pool`.
pub fn compute_aggregates(matched: &[ProcessOutcome], pool: &[CandidateRecord]) -> Aggregates {
    let unique = deduplicate(pool);
    let cross_reference = CrossReference::build(unique.iter().copied());

    let mut groups: BTreeMap<String, GroupSummary> = BTreeMap::new();
    let mut ungrouped_records = 0;
    for candidate in &unique {
        let key = group_key(candidate, &cross_reference);
        if key.is_empty() {
            ungrouped_records += 1;
            continue;
        }
        groups
            .entry(key.clone())
            .or_insert_with(|| GroupSummary::new(key))
            .add(candidate);
    }
    for group in groups.values_mut() {
        group.finish();
    }

    for candidate in matched.iter().filter_map(ProcessOutcome::candidate) {
        let key = group_key(candidate, &cross_reference);
        if let Some(group) = groups.get_mut(&key) {
            group.matched_rows += 1;
        }
    }

    debug!(
        cross_references = cross_reference.len(),
        conflicts = cross_reference.conflicts(),
        "built ingredient cross-reference"
    );
    info!(
        pool_records = pool.len(),
        deduplicated_records = unique.len(),
        ungrouped_records,
        groups = groups.len(),
        "aggregation complete"
    );

    Aggregates {
        groups,
        cross_reference,
        pool_records: pool.len(),
        deduplicated_records: unique.len(),
        ungrouped_records,
    }
}
