#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Attaches commune coordinates to hazard declarations.
//!
//! A left join on [`CommuneCode`]: every declaration survives, in input
//! order and without deduplication. Both sides hold already-normalized
//! codes, so `"1234"` from the registry meets `"01234"` from the reference
//! file as the same key.
//!
//! Codes with no reference row are collected in [`MergeReport`] so that
//! operators can judge whether the reference file is stale or simply
//! partial.

use std::collections::BTreeSet;

use georisk_reference::ReferenceTable;
use georisk_risk_models::{CommuneCode, MergedRiskRecord, RiskRecord};

/// Output of [`merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Every input record, in input order.
    pub records: Vec<MergedRiskRecord>,
    /// Distinct commune codes that had no reference row.
    pub unmatched: BTreeSet<CommuneCode>,
}

impl MergeReport {
    /// Number of records that received coordinates.
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_located()).count()
    }

    /// Number of records left without coordinates.
    #[must_use]
    pub fn unmatched_count(&self) -> usize {
        self.records.len() - self.matched_count()
    }

    /// Distinct commune codes missing from the reference table.
    #[must_use]
    pub const fn unmatched_codes(&self) -> &BTreeSet<CommuneCode> {
        &self.unmatched
    }

    /// Whether there were no input records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Left-joins `records` against `table`.
#[must_use]
pub fn merge(records: Vec<RiskRecord>, table: &ReferenceTable) -> MergeReport {
    let mut report = MergeReport {
        records: Vec::with_capacity(records.len()),
        unmatched: BTreeSet::new(),
    };

    for record in records {
        let location = table.get(&record.code_insee);
        if location.is_none() {
            report.unmatched.insert(record.code_insee.clone());
        }
        report.records.push(MergedRiskRecord { record, location });
    }

    let unmatched = report.unmatched_count();
    if unmatched > 0 {
        log::warn!(
            "{unmatched} of {} record(s) have no reference coordinates (communes: {})",
            report.records.len(),
            report
                .unmatched
                .iter()
                .map(CommuneCode::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );
    } else {
        log::debug!("All {} record(s) matched a commune", report.records.len());
    }

    report
}
