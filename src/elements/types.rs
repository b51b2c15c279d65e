use serde::{Deserialize, Serialize};

/// Closed set of element kinds shared by design and screen sides.
///
/// Detector output occasionally invents kinds ("View", "Group"); those land
/// on `Container`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElementKind {
    Text,
    Button,
    Icon,
    Input,
    Image,
    #[default]
    #[serde(other)]
    Container,
}

/// Axis-aligned box in the element's native unit (design units or device pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Finite coordinates and a strictly positive size.
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.w, self.h].iter().all(|v| v.is_finite()) && self.w > 0.0 && self.h > 0.0
    }
}

/// Best-effort style estimates. Any of them may be missing on either side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleAttrs {
    /// Foreground color as a hex string, e.g. `#E30613`.
    #[serde(rename = "estimated_color", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "estimated_fontSize_dp", default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(
        rename = "estimated_backgroundColor",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub background_color: Option<String>,
}

impl StyleAttrs {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.font_size.is_none() && self.background_color.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: ElementKind,
    /// Missing bounds deserialize as an empty box, which is then rejected as malformed.
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(flatten)]
    pub style: StyleAttrs,
}

impl Element {
    pub fn new(name: impl Into<String>, kind: ElementKind, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            kind,
            bounds,
            text_content: None,
            style: StyleAttrs::default(),
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, hex: impl Into<String>) -> Self {
        self.style.color = Some(hex.into());
        self
    }

    #[must_use]
    pub fn with_background_color(mut self, hex: impl Into<String>) -> Self {
        self.style.background_color = Some(hex.into());
        self
    }

    #[must_use]
    pub fn with_font_size(mut self, size: f64) -> Self {
        self.style.font_size = Some(size);
        self
    }

    /// True when the element carries text with at least one visible character.
    pub fn has_text(&self) -> bool {
        self.text_content
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// Text reduced to lower-cased alphanumerics; empty when absent.
    pub fn normalized_text(&self) -> String {
        self.text_content
            .as_deref()
            .map(normalize_text)
            .unwrap_or_default()
    }

    /// Copy shifted by `(-dx, -dy)`, used to re-register actual coordinates.
    pub fn shifted_back(&self, dx: f64, dy: f64) -> Self {
        let mut out = self.clone();
        out.bounds.x -= dx;
        out.bounds.y -= dy;
        out
    }
}

/// Keeps alphanumeric characters only, lower-cased.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_text("Giriş Yap!"), "girişyap");
        assert_eq!(normalize_text("  +90 (555) 123  "), "90555123");
        assert_eq!(normalize_text("..."), "");
    }

    #[test]
    fn detector_json_maps_onto_element() {
        let json = r##"{
            "name": "kaydet_butonu",
            "type": "Button",
            "bounds": { "x": 0, "y": 10, "w": 100, "h": 50 },
            "text_content": "Kaydet",
            "estimated_color": "#FFFFFF",
            "estimated_fontSize_dp": 16,
            "estimated_backgroundColor": "#E30613"
        }"##;
        let el: Element = serde_json::from_str(json).unwrap();
        assert_eq!(el.kind, ElementKind::Button);
        assert_eq!(el.bounds, Bounds::new(0.0, 10.0, 100.0, 50.0));
        assert_eq!(el.style.font_size, Some(16.0));
        assert_eq!(el.style.background_color.as_deref(), Some("#E30613"));
        assert!(el.has_text());
    }

    #[test]
    fn unknown_kind_and_missing_bounds_are_tolerated() {
        let el: Element = serde_json::from_str(r#"{"name": "group", "type": "View"}"#).unwrap();
        assert_eq!(el.kind, ElementKind::Container);
        assert!(!el.bounds.is_well_formed());
    }

    #[test]
    fn empty_text_is_distinct_from_absent_but_not_textual() {
        let blank = Element::new("a", ElementKind::Text, Bounds::new(0.0, 0.0, 1.0, 1.0)).with_text(" ");
        assert_eq!(blank.text_content.as_deref(), Some(" "));
        assert!(!blank.has_text());

        let round_trip: Element = serde_json::from_value(serde_json::to_value(&blank).unwrap()).unwrap();
        assert_eq!(round_trip, blank);
    }

    #[test]
    fn non_finite_bounds_are_malformed() {
        assert!(!Bounds::new(f64::NAN, 0.0, 10.0, 10.0).is_well_formed());
        assert!(!Bounds::new(0.0, 0.0, -1.0, 10.0).is_well_formed());
        assert!(Bounds::new(-5.0, 0.0, 1.0, 1.0).is_well_formed());
    }
}
