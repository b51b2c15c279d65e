//! Pre-match filtering of elements that cannot take part in matching.
use crate::elements::types::{Element, ElementKind};

/// Small textless containers: spacers, dividers and other layout scaffolding
/// that screen-side detectors never surface as distinct elements.
pub fn is_ghost(el: &Element, min_size: f64) -> bool {
    el.kind == ElementKind::Container && !el.has_text() && (el.bounds.w < min_size || el.bounds.h < min_size)
}

/// Splits `elements` into `(kept, ghosts)`, preserving order on both sides.
pub fn filter_ghosts(elements: &[Element], min_size: f64) -> (Vec<Element>, Vec<Element>) {
    elements.iter().cloned().partition(|el| !is_ghost(el, min_size))
}

/// Index-level split used by the engine: `(pool, excluded)`.
///
/// Malformed elements are always excluded; ghosts only when `ghost_min_size`
/// is given (the design side).
pub fn split_pool(elements: &[Element], ghost_min_size: Option<f64>) -> (Vec<usize>, Vec<usize>) {
    let mut pool = Vec::with_capacity(elements.len());
    let mut excluded = Vec::new();

    for (idx, el) in elements.iter().enumerate() {
        if !el.bounds.is_well_formed() {
            tracing::warn!(name = %el.name, bounds = ?el.bounds, "malformed element excluded from matching");
            excluded.push(idx);
        } else if ghost_min_size.is_some_and(|min| is_ghost(el, min)) {
            tracing::debug!(name = %el.name, "ghost element excluded from matching");
            excluded.push(idx);
        } else {
            pool.push(idx);
        }
    }

    (pool, excluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::types::Bounds;

    fn sample() -> Vec<Element> {
        vec![
            Element::new("spacer", ElementKind::Container, Bounds::new(0.0, 0.0, 360.0, 8.0)),
            Element::new("card", ElementKind::Container, Bounds::new(0.0, 10.0, 360.0, 120.0)),
            Element::new("label", ElementKind::Container, Bounds::new(0.0, 140.0, 60.0, 12.0)).with_text("New"),
            Element::new("dot", ElementKind::Icon, Bounds::new(0.0, 160.0, 6.0, 6.0)),
            Element::new("blank", ElementKind::Container, Bounds::new(0.0, 170.0, 10.0, 40.0)).with_text(""),
        ]
    }

    #[test]
    fn only_small_textless_containers_are_ghosts() {
        let (kept, ghosts) = filter_ghosts(&sample(), 20.0);
        let kept: Vec<&str> = kept.iter().map(|e| e.name.as_str()).collect();
        let ghosts: Vec<&str> = ghosts.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(kept, ["card", "label", "dot"]);
        assert_eq!(ghosts, ["spacer", "blank"]);
    }

    #[test]
    fn ghost_filter_is_idempotent() {
        let (once, _) = filter_ghosts(&sample(), 20.0);
        let (twice, removed) = filter_ghosts(&once, 20.0);
        assert_eq!(once, twice);
        assert!(removed.is_empty());
    }

    #[test]
    fn split_pool_excludes_malformed_on_both_sides() {
        let mut elements = sample();
        elements.push(Element::new("broken", ElementKind::Button, Bounds::new(0.0, 0.0, 0.0, 40.0)));

        let (pool, excluded) = split_pool(&elements, Some(20.0));
        assert_eq!(pool, [1, 2, 3]);
        assert_eq!(excluded, [0, 4, 5]);

        let (pool, excluded) = split_pool(&elements, None);
        assert_eq!(pool, [0, 1, 2, 3, 4]);
        assert_eq!(excluded, [5]);
    }
}
