//! Two-pass greedy assignment of expected elements to actual elements.
//!
//! Pass 1 commits the confident matches: text-identical pairs regardless of
//! drift, then tight-radius geometric matches. Pass 2 revisits the leftovers
//! with a wide radius once the easy candidates have left the pool.
//!
//! Coordinates: expected boxes are scaled into actual space; actual boxes are
//! expected to be offset-corrected already.
use crate::config::MatchingConfig;
use crate::elements::geometry::{aspect_ratio, center, distance};
use crate::elements::types::{Bounds, Element};
use crate::engine::calibration::CalibrationResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// `(expected_index, actual_index)` in commit order.
    pub pairs: Vec<(usize, usize)>,
    /// Pool members left unmatched, ascending index order.
    pub unmatched_expected: Vec<usize>,
    pub unmatched_actual: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextRelation {
    Unrelated,
    Identical,
    Contained,
}

fn text_relation(a: &str, b: &str, cfg: &MatchingConfig) -> TextRelation {
    let (la, lb) = (a.chars().count(), b.chars().count());
    if la <= cfg.text_min_len || lb <= cfg.text_min_len {
        return TextRelation::Unrelated;
    }
    if a == b {
        return TextRelation::Identical;
    }
    if (a.contains(b) || b.contains(a)) && la.abs_diff(lb) < cfg.substring_max_len_diff {
        return TextRelation::Contained;
    }
    TextRelation::Unrelated
}

/// Per-element data computed once per run.
struct Candidate {
    bounds: Bounds,
    text: String,
}

impl Candidate {
    fn expected(el: &Element, calib: &CalibrationResult) -> Self {
        let b = el.bounds;
        Self {
            bounds: Bounds::new(b.x * calib.scale_x, b.y * calib.scale_y, b.w * calib.scale_x, b.h * calib.scale_y),
            text: el.normalized_text(),
        }
    }

    fn actual(el: &Element) -> Self {
        Self {
            bounds: el.bounds,
            text: el.normalized_text(),
        }
    }

    fn distance_to(&self, other: &Candidate) -> f64 {
        distance(center(&self.bounds), center(&other.bounds))
    }

    fn aspect_diff(&self, other: &Candidate) -> f64 {
        (aspect_ratio(&self.bounds) - aspect_ratio(&other.bounds)).abs()
    }
}

pub fn match_elements(
    expected: &[Element],
    expected_pool: &[usize],
    actual: &[Element],
    actual_pool: &[usize],
    calib: &CalibrationResult,
    cfg: &MatchingConfig,
) -> MatchOutcome {
    let exp: Vec<Candidate> = expected.iter().map(|e| Candidate::expected(e, calib)).collect();
    let act: Vec<Candidate> = actual.iter().map(Candidate::actual).collect();

    let mut order: Vec<usize> = expected_pool.to_vec();
    order.sort_by(|&a, &b| expected[a].bounds.y.total_cmp(&expected[b].bounds.y));

    let mut available: Vec<usize> = actual_pool.to_vec();
    let mut pairs = Vec::new();
    let mut deferred = Vec::new();

    // Pass 1
    for &ei in &order {
        let e = &exp[ei];
        let mut text_hit: Option<usize> = None;
        let mut best: Option<(usize, f64)> = None;

        for (pos, &ai) in available.iter().enumerate() {
            let a = &act[ai];
            let dist = e.distance_to(a);

            if text_relation(&e.text, &a.text, cfg) != TextRelation::Unrelated
                && dist <= cfg.text_match_max_distance
            {
                text_hit = Some(pos);
                break;
            }

            let aspect = e.aspect_diff(a);
            if dist <= cfg.pass1_max_distance && aspect <= cfg.pass1_max_aspect_diff {
                let score = dist + aspect * cfg.aspect_penalty_weight;
                if best.map_or(true, |(_, s)| score < s) {
                    best = Some((pos, score));
                }
            }
        }

        match text_hit.or(best.map(|(pos, _)| pos)) {
            Some(pos) => pairs.push((ei, available.remove(pos))),
            None => deferred.push(ei),
        }
    }
    let pass1 = pairs.len();

    // Pass 2
    let mut unmatched_expected = Vec::new();
    for ei in deferred {
        let e = &exp[ei];
        let mut best: Option<(usize, f64)> = None;

        for (pos, &ai) in available.iter().enumerate() {
            let a = &act[ai];
            let dist = e.distance_to(a);
            if dist > cfg.pass2_max_distance {
                continue;
            }

            let mut score = dist;
            if e.aspect_diff(a) > cfg.pass2_max_aspect_diff {
                score += cfg.shape_mismatch_penalty;
            }
            if text_relation(&e.text, &a.text, cfg) != TextRelation::Unrelated {
                score -= cfg.text_bonus;
            }
            if expected[ei].kind == actual[ai].kind {
                score -= cfg.same_kind_bonus;
            }
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((pos, score));
            }
        }

        match best {
            Some((pos, score)) if score < cfg.pass2_accept_score => {
                pairs.push((ei, available.remove(pos)));
            }
            _ => unmatched_expected.push(ei),
        }
    }

    unmatched_expected.sort_unstable();
    available.sort_unstable();

    tracing::debug!(
        pass1,
        pass2 = pairs.len() - pass1,
        unmatched_expected = unmatched_expected.len(),
        unmatched_actual = available.len(),
        "matching finished"
    );

    MatchOutcome {
        pairs,
        unmatched_expected,
        unmatched_actual: available,
    }
}
