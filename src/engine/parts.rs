//! Audits of long screens captured as several scrolled parts.
//!
//! Each part is an independent engine run; spacing never crosses a part
//! boundary. The combined summary is the sum of the per-part summaries.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuditConfig;
use crate::elements::types::Element;
use crate::engine::aggregator::AuditEngine;
use crate::engine::checks::Frame;
use crate::engine::report::{AuditReport, AuditSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPart {
    pub expected: Vec<Element>,
    pub actual: Vec<Element>,
    pub frame: Frame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartReport {
    /// 1-based.
    pub part_index: usize,
    pub comparison_results: AuditReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPartReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub summary: AuditSummary,
    pub parts: Vec<PartReport>,
    /// Scale of the first part; 0.0 when there are no parts.
    pub scale_factor: f64,
}

impl AuditEngine {
    pub fn audit_parts(&self, parts: &[AuditPart]) -> MultiPartReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("audit_parts", %run_id, parts = parts.len());
        let _guard = span.enter();

        let mut summary = AuditSummary::default();
        let mut reports = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            tracing::debug!(part_index = i + 1, "auditing part");
            let report = self.audit(&part.expected, &part.actual, part.frame);
            summary.absorb(&report.summary);
            reports.push(PartReport {
                part_index: i + 1,
                comparison_results: report,
            });
        }

        let scale_factor = reports
            .first()
            .map(|p| p.comparison_results.scale_factor)
            .unwrap_or(0.0);

        MultiPartReport {
            run_id,
            generated_at: Utc::now(),
            summary,
            parts: reports,
            scale_factor,
        }
    }
}

/// Convenience wrapper for a one-off multi-part run.
pub fn audit_parts(parts: &[AuditPart], config: &AuditConfig) -> MultiPartReport {
    AuditEngine::new(config.clone()).audit_parts(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::types::{Bounds, ElementKind};
    use crate::engine::checks::CheckStatus;

    fn card(y: f64) -> Element {
        Element::new("card", ElementKind::Container, Bounds::new(0.0, y, 100.0, 50.0))
    }

    #[test]
    fn parts_are_independent_and_summed() {
        let frame = Frame { expected_width: 100.0, actual_width: 200.0 };
        let scaled = |y: f64| Element::new("card", ElementKind::Container, Bounds::new(0.0, y, 200.0, 100.0));
        let parts = vec![
            AuditPart { expected: vec![card(0.0), card(100.0)], actual: vec![scaled(0.0), scaled(200.0)], frame },
            AuditPart { expected: vec![card(600.0)], actual: vec![scaled(1200.0)], frame },
        ];

        let report = audit_parts(&parts, &AuditConfig::default());
        assert_eq!(report.parts.len(), 2);
        assert_eq!(report.parts[1].part_index, 2);
        assert_eq!(report.summary.total_matched, 3);
        assert_eq!(report.summary.error_count, 0);
        assert_eq!(report.scale_factor, 2.0);

        // The first element of a part never has a predecessor.
        let second_part = &report.parts[1].comparison_results.matched_components[0];
        assert_eq!(second_part.tests.spacing.status, CheckStatus::NotApplicable);
    }

    #[test]
    fn no_parts_yields_zero_scale() {
        let report = AuditEngine::default().audit_parts(&[]);
        assert!(report.parts.is_empty());
        assert_eq!(report.scale_factor, 0.0);
        assert_eq!(report.summary, AuditSummary::default());
    }

    #[test]
    fn free_function_honours_the_given_config() {
        // 50 vs 58px height fails at 10% but passes at 20%.
        let frame = Frame { expected_width: 100.0, actual_width: 100.0 };
        let actual = Element::new("card", ElementKind::Container, Bounds::new(0.0, 0.0, 100.0, 58.0));
        let parts = vec![AuditPart { expected: vec![card(0.0)], actual: vec![actual], frame }];

        let strict = audit_parts(&parts, &AuditConfig::default());
        assert_eq!(strict.summary.error_count, 1);

        let loose = audit_parts(&parts, &AuditConfig::default().with_tolerance_fraction(0.2));
        assert_eq!(loose.summary.error_count, 0);
        assert_ne!(strict.run_id, loose.run_id);
    }
}
