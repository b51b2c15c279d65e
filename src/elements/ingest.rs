//! Parsing of element lists emitted by detectors and vision models.
//!
//! Model replies are not always pure JSON: they may be wrapped in a markdown
//! fence or surrounded by prose. The payload is located first, then parsed.
use std::sync::OnceLock;

use regex::Regex;

use crate::elements::types::Element;
use crate::errors::{AuditError, AuditResult};

fn json_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)```json\s*(.*?)```").expect("static regex"))
}

fn any_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(.*?)```").expect("static regex"))
}

/// Returns the JSON payload inside `text`, or `None` when there is nothing to parse.
pub fn extract_json_payload(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(m) = json_fence().captures(text).and_then(|c| c.get(1)) {
        return Some(m.as_str().trim());
    }
    if let Some(m) = any_fence().captures(text).and_then(|c| c.get(1)) {
        return Some(m.as_str().trim());
    }
    match (text.find('['), text.rfind(']')) {
        (Some(start), Some(end)) if end > start => Some(text[start..=end].trim()),
        _ => Some(text),
    }
}

/// Parses a detector reply into elements.
///
/// Individual malformed elements (bad bounds) are kept; the engine reports
/// them as unmatched. Only a reply that is not a JSON array is an error.
pub fn parse_element_list(text: &str) -> AuditResult<Vec<Element>> {
    let payload = extract_json_payload(text)
        .ok_or_else(|| AuditError::Ingest("empty detector reply".into()))?;
    let value: serde_json::Value = serde_json::from_str(payload)?;
    if !value.is_array() {
        return Err(AuditError::Ingest(format!(
            "expected a JSON array of elements, got {}",
            json_type_name(&value)
        )));
    }
    let elements: Vec<Element> = serde_json::from_value(value)?;
    tracing::debug!(count = elements.len(), "element list parsed");
    Ok(elements)
}

/// Re-bases elements detected in a vertical slice onto full-image coordinates.
pub fn offset_elements_y(elements: &mut [Element], dy: f64) {
    for el in elements.iter_mut() {
        el.bounds.y += dy;
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::types::ElementKind;

    const ONE: &str = r#"[{"name":"ok","type":"Button","bounds":{"x":1,"y":2,"w":3,"h":4}}]"#;

    #[test]
    fn fenced_json_is_unwrapped() {
        let reply = format!("Here you go:\n```json\n{ONE}\n```\nthanks");
        let elements = parse_element_list(&reply).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind, ElementKind::Button);
    }

    #[test]
    fn bare_fence_and_prose_wrapped_arrays() {
        assert_eq!(parse_element_list(&format!("```\n{ONE}\n```")).unwrap().len(), 1);
        assert_eq!(parse_element_list(&format!("Found: {ONE} done.")).unwrap().len(), 1);
    }

    #[test]
    fn non_array_reply_is_an_ingest_error() {
        let err = parse_element_list(r#"{"name": "x"}"#).unwrap_err();
        assert!(matches!(err, AuditError::Ingest(_)));
        assert!(matches!(parse_element_list("   "), Err(AuditError::Ingest(_))));
        assert!(matches!(parse_element_list("[oops]"), Err(AuditError::Json(_))));
    }

    #[test]
    fn slice_offsets_are_applied() {
        let mut elements = parse_element_list(ONE).unwrap();
        offset_elements_y(&mut elements, 1920.0);
        assert_eq!(elements[0].bounds.y, 1922.0);
    }
}
