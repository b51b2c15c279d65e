//! Per-pair attribute checks: size, horizontal padding, vertical spacing, style.
//!
//! All geometric checks share one tolerance rule:
//! `allowed = max(expected_px * tolerance_fraction, min_tolerance_px)`.
//! Actual elements passed in here are already offset-corrected.
use serde::{Deserialize, Serialize};

use crate::config::ToleranceConfig;
use crate::elements::geometry::{color_distance, Rgb};
use crate::elements::types::{Element, ElementKind};
use crate::engine::calibration::CalibrationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    /// Needs a human decision.
    Audit,
    #[serde(rename = "n/a")]
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    pub message: String,
}

impl CheckOutcome {
    pub fn pass(message: impl Into<String>) -> Self {
        Self { status: CheckStatus::Pass, message: message.into() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { status: CheckStatus::Fail, message: message.into() }
    }

    pub fn not_applicable(message: impl Into<String>) -> Self {
        Self { status: CheckStatus::NotApplicable, message: message.into() }
    }
}

/// Container widths used to anchor right-edge padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub expected_width: f64,
    pub actual_width: f64,
}

impl Frame {
    fn is_usable(&self) -> bool {
        [self.expected_width, self.actual_width]
            .iter()
            .all(|w| w.is_finite() && *w > 0.0)
    }
}

pub fn allowed_delta(expected_px: f64, tol: &ToleranceConfig) -> f64 {
    (expected_px.abs() * tol.tolerance_fraction).max(tol.min_tolerance_px)
}

/// Compares one scaled design value against its actual counterpart.
/// `Err` carries the explanation of a violation.
fn compare(label: &str, design: f64, scale: f64, actual: f64, tol: &ToleranceConfig) -> Result<(), String> {
    let expected_px = (design * scale).round();
    let allowed = allowed_delta(expected_px, tol);
    let diff = actual - expected_px;
    if diff.abs() <= allowed {
        Ok(())
    } else {
        Err(format!(
            "{label}: expected={expected_px:.0}px (design: {design:.1}), actual={actual:.0}px \
             (diff: {diff:+.0}px, allowed: ±{allowed:.0}px)"
        ))
    }
}

fn outcome_from(violations: Vec<String>, ok_message: String) -> CheckOutcome {
    if violations.is_empty() {
        CheckOutcome::pass(ok_message)
    } else {
        CheckOutcome::fail(violations.join(", "))
    }
}

/// Width (skipped for text, which reflows) and height.
pub fn check_dimensions(
    expected: &Element,
    actual: &Element,
    calib: &CalibrationResult,
    tol: &ToleranceConfig,
) -> CheckOutcome {
    let (e, a) = (&expected.bounds, &actual.bounds);
    let mut violations = Vec::new();

    let checks_width = expected.kind != ElementKind::Text;
    if checks_width {
        if let Err(v) = compare("w", e.w, calib.scale_x, a.w, tol) {
            violations.push(v);
        }
    }
    if let Err(v) = compare("h", e.h, calib.scale_y, a.h, tol) {
        violations.push(v);
    }

    let ok = if checks_width {
        format!("OK (w: {:.0}px, h: {:.0}px)", a.w, a.h)
    } else {
        format!("OK (h: {:.0}px, width not checked for text)", a.h)
    };
    outcome_from(violations, ok)
}

/// Left edge offset and, for non-text elements, right edge offset from the container.
pub fn check_horizontal_padding(
    expected: &Element,
    actual: &Element,
    frame: &Frame,
    calib: &CalibrationResult,
    tol: &ToleranceConfig,
) -> CheckOutcome {
    let (e, a) = (&expected.bounds, &actual.bounds);
    let mut violations = Vec::new();

    if let Err(v) = compare("left padding", e.x, calib.scale_x, a.x, tol) {
        violations.push(v);
    }

    if expected.kind == ElementKind::Text || !frame.is_usable() {
        return outcome_from(violations, format!("OK (left: {:.0}px)", a.x));
    }

    // The actual container moves with the offset correction.
    let expected_right = frame.expected_width - e.right();
    let actual_right = frame.actual_width - calib.offset_x - a.right();
    if let Err(v) = compare("right padding", expected_right, calib.scale_x, actual_right, tol) {
        violations.push(v);
    }
    outcome_from(violations, format!("OK (left: {:.0}px, right: {:.0}px)", a.x, actual_right))
}

/// Gap from the previous pair's bottom edge to this pair's top edge.
/// Overlaps count as a zero gap.
pub fn check_vertical_spacing(
    previous: Option<(&Element, &Element)>,
    current: (&Element, &Element),
    calib: &CalibrationResult,
    tol: &ToleranceConfig,
) -> CheckOutcome {
    let Some((prev_e, prev_a)) = previous else {
        return CheckOutcome::not_applicable("first component");
    };
    let (cur_e, cur_a) = current;

    let expected_gap = (cur_e.bounds.y - prev_e.bounds.bottom()).max(0.0);
    let actual_gap = (cur_a.bounds.y - prev_a.bounds.bottom()).max(0.0);

    match compare("spacing", expected_gap, calib.scale_y, actual_gap, tol) {
        Ok(()) => CheckOutcome::pass(format!("OK (spacing: {actual_gap:.0}px)")),
        Err(v) => CheckOutcome::fail(format!("{v} after '{}'", prev_e.name)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl StyleSnapshot {
    fn of(el: &Element) -> Self {
        Self {
            text: el.text_content.clone().filter(|_| el.has_text()),
            color: el.style.color.clone(),
            font_size: el.style.font_size,
            background_color: el.style.background_color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleOutcome {
    pub status: CheckStatus,
    pub message: String,
    pub expected: StyleSnapshot,
    pub actual: StyleSnapshot,
}

fn parse_color(el: &Element, hex: Option<&str>) -> Option<Rgb> {
    let hex = hex?;
    let rgb = Rgb::from_hex(hex);
    if rgb.is_none() {
        tracing::warn!(name = %el.name, color = hex, "unparseable color ignored");
    }
    rgb
}

fn compare_colors(
    label: &str,
    expected: (&Element, Option<&str>),
    actual: (&Element, Option<&str>),
    tol: &ToleranceConfig,
) -> Option<(CheckStatus, String)> {
    let e = parse_color(expected.0, expected.1)?;
    let a = parse_color(actual.0, actual.1)?;
    let dist = color_distance(e, a);
    if dist > tol.color_distance_threshold {
        Some((
            CheckStatus::Fail,
            format!("{label} {} vs {} (distance {dist:.1})", e.to_hex(), a.to_hex()),
        ))
    } else {
        Some((CheckStatus::Pass, format!("{label} OK")))
    }
}

/// Text, colors and font size. Text and font mismatches are `audit` since
/// truncation, localization and estimation noise are often acceptable;
/// color mismatches are `fail`.
pub fn check_style(expected: &Element, actual: &Element, tol: &ToleranceConfig) -> StyleOutcome {
    let mut findings: Vec<(CheckStatus, String)> = Vec::new();

    if expected.has_text() && actual.has_text() {
        let (e, a) = (expected.normalized_text(), actual.normalized_text());
        let same = e == a || (!e.is_empty() && !a.is_empty() && (e.contains(&a) || a.contains(&e)));
        if same {
            findings.push((CheckStatus::Pass, "text OK".into()));
        } else {
            findings.push((
                CheckStatus::Audit,
                format!(
                    "text differs: '{}' vs '{}'",
                    expected.text_content.as_deref().unwrap_or_default().trim(),
                    actual.text_content.as_deref().unwrap_or_default().trim()
                ),
            ));
        }
    }

    findings.extend(compare_colors(
        "color",
        (expected, expected.style.color.as_deref()),
        (actual, actual.style.color.as_deref()),
        tol,
    ));
    findings.extend(compare_colors(
        "background",
        (expected, expected.style.background_color.as_deref()),
        (actual, actual.style.background_color.as_deref()),
        tol,
    ));

    if let (Some(e), Some(a)) = (expected.style.font_size, actual.style.font_size) {
        let allowed = (e.abs() * tol.tolerance_fraction).max(tol.font_min_tolerance_dp);
        if (a - e).abs() <= allowed {
            findings.push((CheckStatus::Pass, "font size OK".into()));
        } else {
            findings.push((CheckStatus::Audit, format!("font size {e:.1}dp vs {a:.1}dp")));
        }
    }

    let status = if findings.is_empty() {
        CheckStatus::NotApplicable
    } else if findings.iter().any(|(s, _)| *s == CheckStatus::Fail) {
        CheckStatus::Fail
    } else if findings.iter().any(|(s, _)| *s == CheckStatus::Audit) {
        CheckStatus::Audit
    } else {
        CheckStatus::Pass
    };
    let message = if findings.is_empty() {
        "no comparable style attributes".to_string()
    } else {
        findings.into_iter().map(|(_, m)| m).collect::<Vec<_>>().join("; ")
    };

    StyleOutcome {
        status,
        message,
        expected: StyleSnapshot::of(expected),
        actual: StyleSnapshot::of(actual),
    }
}

/// Fail if any geometric check failed, pass otherwise.
pub fn layout_status(checks: &[&CheckOutcome]) -> CheckStatus {
    if checks.iter().any(|c| c.status == CheckStatus::Fail) {
        CheckStatus::Fail
    } else {
        CheckStatus::Pass
    }
}
