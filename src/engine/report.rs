//! Serialized audit result consumed by report renderers.
//!
//! Field names and nesting are a contract with downstream tooling; new fields
//! may be added but existing ones must not be renamed.
use serde::{Deserialize, Serialize};

use crate::elements::types::Element;
use crate::engine::calibration::CalibrationResult;
use crate::engine::checks::{CheckOutcome, CheckStatus, StyleOutcome};
use crate::errors::AuditResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Ordered by the expected element's vertical position.
    pub matched_components: Vec<MatchedPair>,
    pub unmatched_expected: Vec<Element>,
    pub unmatched_actual: Vec<Element>,
    pub summary: AuditSummary,
    /// Horizontal scale used for the run (actual px per design unit).
    pub scale_factor: f64,
    pub calibration: CalibrationResult,
}

impl AuditReport {
    pub fn to_json_pretty(&self) -> AuditResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn has_layout_errors(&self) -> bool {
        self.summary.error_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub name: String,
    pub overall_layout_status: CheckStatus,
    pub overall_style_status: CheckStatus,
    pub tests: PairChecks,
    pub raw_data: RawData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairChecks {
    pub dimensions: CheckOutcome,
    pub spacing: CheckOutcome,
    pub padding: CheckOutcome,
    pub style: StyleOutcome,
}

/// The caller's records as supplied, before offset correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawData {
    pub expected: Element,
    pub actual: Element,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Pairs whose layout verdict is `fail`.
    pub error_count: usize,
    pub layout_success_count: usize,
    pub audit_count: usize,
    pub style_success_count: usize,
    #[serde(default)]
    pub style_error_count: usize,
    pub total_matched: usize,
}

impl AuditSummary {
    pub fn record(&mut self, layout: CheckStatus, style: CheckStatus) {
        self.total_matched += 1;
        match layout {
            CheckStatus::Fail => self.error_count += 1,
            _ => self.layout_success_count += 1,
        }
        match style {
            CheckStatus::Pass => self.style_success_count += 1,
            CheckStatus::Audit => self.audit_count += 1,
            CheckStatus::Fail => self.style_error_count += 1,
            CheckStatus::NotApplicable => {}
        }
    }

    pub fn absorb(&mut self, other: &AuditSummary) {
        self.error_count += other.error_count;
        self.layout_success_count += other.layout_success_count;
        self.audit_count += other.audit_count;
        self.style_success_count += other.style_success_count;
        self.style_error_count += other.style_error_count;
        self.total_matched += other.total_matched;
    }
}
