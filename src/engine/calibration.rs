//! Scale and offset estimation from text-identical landmark pairs.
//!
//! A naive `actual_width / expected_width` scale misses status-bar offsets,
//! density rounding and non-uniform scaling. Elements whose text is identical
//! on both sides are nearly always the same element, so their boxes give a
//! robust (median-based) correction.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::CalibrationConfig;
use crate::elements::geometry::{center, median};
use crate::elements::types::Element;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Subtracted from actual coordinates before matching and checking.
    pub offset_x: f64,
    pub offset_y: f64,
}

impl CalibrationResult {
    pub fn uniform(scale: f64) -> Self {
        Self {
            scale_x: scale,
            scale_y: scale,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// `actual_width / expected_width`, or 1.0 when either width is unusable.
pub fn nominal_scale(expected_width: f64, actual_width: f64) -> f64 {
    let usable = |w: f64| w.is_finite() && w > 0.0;
    if usable(expected_width) && usable(actual_width) {
        actual_width / expected_width
    } else {
        tracing::warn!(expected_width, actual_width, "degenerate container width, using identity scale");
        1.0
    }
}

/// Every (expected, actual) pair whose normalized texts are identical and
/// longer than `min_text_len`. Duplicated texts yield every combination.
fn text_landmarks<'a>(
    expected: &'a [Element],
    actual: &'a [Element],
    min_text_len: usize,
) -> Vec<(&'a Element, &'a Element)> {
    let mut lookup: HashMap<String, Vec<&Element>> = HashMap::new();
    for a in actual.iter().filter(|a| a.bounds.is_well_formed()) {
        let key = a.normalized_text();
        if key.chars().count() > min_text_len {
            lookup.entry(key).or_default().push(a);
        }
    }

    let mut pairs = Vec::new();
    for e in expected.iter().filter(|e| e.bounds.is_well_formed()) {
        if let Some(candidates) = lookup.get(&e.normalized_text()) {
            pairs.extend(candidates.iter().map(|a| (e, *a)));
        }
    }
    pairs
}

/// Median per-axis size ratio over landmark pairs; `None` without landmarks.
pub fn estimate_scale(
    expected: &[Element],
    actual: &[Element],
    cfg: &CalibrationConfig,
) -> Option<(f64, f64)> {
    let (ratios_x, ratios_y): (Vec<f64>, Vec<f64>) = text_landmarks(expected, actual, cfg.scale_min_text_len)
        .into_iter()
        .filter(|(e, _)| e.bounds.w > cfg.min_landmark_size && e.bounds.h > cfg.min_landmark_size)
        .map(|(e, a)| (a.bounds.w / e.bounds.w, a.bounds.h / e.bounds.h))
        .unzip();

    tracing::debug!(landmarks = ratios_x.len(), "scale landmarks collected");
    Some((median(&ratios_x)?, median(&ratios_y)?))
}

/// Median of `actual_center - expected_center * scale` along `axis`.
pub fn estimate_offset(
    expected: &[Element],
    actual: &[Element],
    scale: f64,
    axis: Axis,
    cfg: &CalibrationConfig,
) -> Option<f64> {
    let diffs: Vec<f64> = text_landmarks(expected, actual, cfg.offset_min_text_len)
        .into_iter()
        .map(|(e, a)| {
            let (ec, ac) = (center(&e.bounds), center(&a.bounds));
            match axis {
                Axis::X => ac.0 - ec.0 * scale,
                Axis::Y => ac.1 - ec.1 * scale,
            }
        })
        .collect();
    median(&diffs)
}

/// Resolves the per-run correction, falling back to `nominal` wherever the
/// landmarks are missing or agree with it.
pub fn calibrate(
    expected: &[Element],
    actual: &[Element],
    nominal: f64,
    cfg: &CalibrationConfig,
) -> CalibrationResult {
    let mut result = CalibrationResult::uniform(nominal);
    if !cfg.enabled {
        return result;
    }

    match estimate_scale(expected, actual, cfg) {
        Some((sx, sy)) => {
            if (sx - nominal).abs() > cfg.scale_epsilon {
                result.scale_x = sx;
            }
            if (sy - nominal).abs() > cfg.scale_epsilon {
                result.scale_y = sy;
            }
            tracing::debug!(
                nominal,
                detected_x = sx,
                detected_y = sy,
                scale_x = result.scale_x,
                scale_y = result.scale_y,
                "scale calibrated"
            );
        }
        None => tracing::debug!(nominal, "no scale landmarks, keeping nominal scale"),
    }

    let significant = |o: Option<f64>| o.filter(|v| v.abs() > cfg.min_offset_px).unwrap_or(0.0);
    result.offset_x = significant(estimate_offset(expected, actual, result.scale_x, Axis::X, cfg));
    result.offset_y = significant(estimate_offset(expected, actual, result.scale_y, Axis::Y, cfg));
    if result.offset_x != 0.0 || result.offset_y != 0.0 {
        tracing::debug!(offset_x = result.offset_x, offset_y = result.offset_y, "offset calibrated");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::types::{Bounds, ElementKind};

    fn text(label: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(label, ElementKind::Text, Bounds::new(x, y, w, h)).with_text(label)
    }

    #[test]
    fn nominal_scale_guards_zero_width() {
        assert_eq!(nominal_scale(360.0, 1080.0), 3.0);
        assert_eq!(nominal_scale(0.0, 1080.0), 1.0);
        assert_eq!(nominal_scale(360.0, -1.0), 1.0);
        assert_eq!(nominal_scale(f64::NAN, 1080.0), 1.0);
    }

    #[test]
    fn scale_uses_median_per_axis() {
        let expected = vec![
            text("Create account", 0.0, 0.0, 100.0, 20.0),
            text("Forgot password", 0.0, 50.0, 100.0, 20.0),
            text("Terms of service", 0.0, 100.0, 100.0, 20.0),
        ];
        let actual = vec![
            text("Create account", 0.0, 0.0, 250.0, 60.0),
            text("Forgot password", 0.0, 150.0, 260.0, 60.0),
            // Mis-detected box: the outlier must not drag the estimate.
            text("Terms of service", 0.0, 300.0, 900.0, 61.0),
        ];
        let cfg = CalibrationConfig::default();
        assert_eq!(estimate_scale(&expected, &actual, &cfg), Some((2.6, 3.0)));
    }

    #[test]
    fn short_texts_and_tiny_boxes_are_not_landmarks() {
        let cfg = CalibrationConfig::default();
        let expected = vec![text("Hello", 0.0, 0.0, 100.0, 20.0), text("Continue", 0.0, 0.0, 8.0, 20.0)];
        let actual = vec![text("Hello", 0.0, 0.0, 300.0, 60.0), text("Continue", 0.0, 0.0, 24.0, 60.0)];
        assert_eq!(estimate_scale(&expected, &actual, &cfg), None);
    }

    #[test]
    fn calibrate_keeps_nominal_within_epsilon() {
        let cfg = CalibrationConfig::default();
        let expected = vec![text("Create account", 0.0, 0.0, 100.0, 20.0)];
        let actual = vec![text("Create account", 0.0, 0.0, 200.5, 50.0)];
        let result = calibrate(&expected, &actual, 2.0, &cfg);
        assert_eq!(result.scale_x, 2.0);
        assert_eq!(result.scale_y, 2.5);
    }

    #[test]
    fn offset_applies_only_above_noise_floor() {
        let cfg = CalibrationConfig::default();
        let expected = vec![text("Sign in", 10.0, 100.0, 100.0, 20.0)];

        // 63px status bar pushed everything down.
        let shifted = vec![text("Sign in", 10.0, 163.0, 100.0, 20.0)];
        let result = calibrate(&expected, &shifted, 1.0, &cfg);
        assert_eq!(result.offset_y, 63.0);
        assert_eq!(result.offset_x, 0.0);

        let jitter = vec![text("Sign in", 13.0, 104.0, 100.0, 20.0)];
        let result = calibrate(&expected, &jitter, 1.0, &cfg);
        assert_eq!((result.offset_x, result.offset_y), (0.0, 0.0));
    }

    #[test]
    fn disabled_calibration_is_uniform_nominal() {
        let cfg = CalibrationConfig {
            enabled: false,
            ..CalibrationConfig::default()
        };
        let expected = vec![text("Sign in", 10.0, 100.0, 100.0, 20.0)];
        let actual = vec![text("Sign in", 10.0, 400.0, 100.0, 20.0)];
        assert_eq!(calibrate(&expected, &actual, 3.0, &cfg), CalibrationResult::uniform(3.0));
    }
}
