//! End-to-end audit of one (expected, actual) element list pair.
use crate::config::AuditConfig;
use crate::elements::types::Element;
use crate::engine::calibration::{calibrate, nominal_scale};
use crate::engine::checks::{
    check_dimensions, check_horizontal_padding, check_style, check_vertical_spacing, layout_status, Frame,
};
use crate::engine::filter::split_pool;
use crate::engine::matcher::match_elements;
use crate::engine::report::{AuditReport, AuditSummary, MatchedPair, PairChecks, RawData};

/// Stateless audit engine bound to one tolerance profile.
///
/// Holding only an immutable config, one engine can serve any number of runs,
/// including concurrent ones on different threads.
#[derive(Debug, Clone, Default)]
pub struct AuditEngine {
    config: AuditConfig,
}

impl AuditEngine {
    pub fn new(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Runs calibration, ghost filtering, matching and every check.
    ///
    /// Never fails: malformed or unmatched input ends up in the unmatched
    /// buckets of the report.
    pub fn audit(&self, expected: &[Element], actual: &[Element], frame: Frame) -> AuditReport {
        let span = tracing::debug_span!("audit", expected = expected.len(), actual = actual.len());
        let _guard = span.enter();
        let cfg = &self.config;

        let nominal = nominal_scale(frame.expected_width, frame.actual_width);
        let (expected_pool, expected_excluded) = split_pool(expected, Some(cfg.ghost_min_size));
        let (actual_pool, actual_excluded) = split_pool(actual, None);

        let calib = calibrate(expected, actual, nominal, &cfg.calibration);
        let corrected: Vec<Element> = actual
            .iter()
            .map(|a| a.shifted_back(calib.offset_x, calib.offset_y))
            .collect();

        let outcome = match_elements(expected, &expected_pool, &corrected, &actual_pool, &calib, &cfg.matching);

        let mut pairs = outcome.pairs;
        pairs.sort_by(|&(ea, _), &(eb, _)| {
            expected[ea]
                .bounds
                .y
                .total_cmp(&expected[eb].bounds.y)
                .then(ea.cmp(&eb))
        });

        let mut summary = AuditSummary::default();
        let mut matched_components = Vec::with_capacity(pairs.len());
        let mut previous: Option<(&Element, &Element)> = None;

        for &(ei, ai) in &pairs {
            let (e, a) = (&expected[ei], &corrected[ai]);

            let dimensions = check_dimensions(e, a, &calib, &cfg.tolerance);
            let padding = check_horizontal_padding(e, a, &frame, &calib, &cfg.tolerance);
            let spacing = check_vertical_spacing(previous, (e, a), &calib, &cfg.tolerance);
            let style = check_style(e, a, &cfg.tolerance);

            let layout = layout_status(&[&dimensions, &padding, &spacing]);
            summary.record(layout, style.status);

            matched_components.push(MatchedPair {
                name: e.name.clone(),
                overall_layout_status: layout,
                overall_style_status: style.status,
                tests: PairChecks { dimensions, spacing, padding, style },
                raw_data: RawData {
                    expected: e.clone(),
                    actual: actual[ai].clone(),
                },
            });
            previous = Some((e, a));
        }

        let unmatched_expected = collect_sorted(expected, expected_excluded, outcome.unmatched_expected);
        let unmatched_actual = collect_sorted(actual, actual_excluded, outcome.unmatched_actual);

        tracing::info!(
            matched = summary.total_matched,
            layout_errors = summary.error_count,
            audits = summary.audit_count,
            unmatched_expected = unmatched_expected.len(),
            unmatched_actual = unmatched_actual.len(),
            scale_x = calib.scale_x,
            scale_y = calib.scale_y,
            "audit finished"
        );

        AuditReport {
            matched_components,
            unmatched_expected,
            unmatched_actual,
            summary,
            scale_factor: calib.scale_x,
            calibration: calib,
        }
    }
}

/// Convenience wrapper for a one-off run.
pub fn audit(expected: &[Element], actual: &[Element], frame: Frame, config: &AuditConfig) -> AuditReport {
    AuditEngine::new(config.clone()).audit(expected, actual, frame)
}

/// Merges two index buckets back into input order.
fn collect_sorted(source: &[Element], mut a: Vec<usize>, b: Vec<usize>) -> Vec<Element> {
    a.extend(b);
    a.sort_unstable();
    a.into_iter().map(|i| source[i].clone()).collect()
}
