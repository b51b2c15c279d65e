//! Flattening of a design-tool document tree into expected elements.
//!
//! The document arrives as `{ "nodes": { "<id>": { "document": <node> } } }`.
//! Every root node is a frame; its descendants are positioned relative to the
//! frame's absolute origin. Traversal uses an explicit stack so deeply nested
//! documents cannot exhaust the call stack.
use std::collections::BTreeMap;

use serde::Deserialize;

use crate::elements::geometry::Rgb;
use crate::elements::types::{Bounds, Element, ElementKind};
use crate::errors::{AuditError, AuditResult};

/// Nodes whose name contains one of these are OS chrome, not app content.
const SYSTEM_CHROME_NAMES: [&str; 3] = ["status bar", "navigation bar", "home indicator"];

#[derive(Debug, Clone, Deserialize)]
pub struct DesignDocument {
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeEntry {
    pub document: Option<DesignNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DesignNode {
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(rename = "absoluteBoundingBox", default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub characters: Option<String>,
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    #[serde(default)]
    pub children: Vec<DesignNode>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paint {
    #[serde(rename = "type", default)]
    pub paint_type: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub color: Option<PaintColor>,
}

/// Channels in 0.0–1.0.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaintColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

fn default_true() -> bool {
    true
}

/// Parses a design document and flattens it, see [`flatten_design_tree`].
pub fn parse_design_document(json: &str) -> AuditResult<Vec<Element>> {
    let doc: DesignDocument = serde_json::from_str(json)?;
    if doc.nodes.is_empty() {
        return Err(AuditError::DesignTree("document has no nodes".into()));
    }
    Ok(flatten_design_tree(&doc))
}

/// Flattens every root frame of `doc` into expected elements, in pre-order.
pub fn flatten_design_tree(doc: &DesignDocument) -> Vec<Element> {
    let mut out = Vec::new();

    for (id, entry) in &doc.nodes {
        let Some(root) = entry.document.as_ref() else {
            tracing::warn!(node_id = %id, "design node without document, skipped");
            continue;
        };
        let origin = root
            .bounding_box
            .map(|b| (b.x, b.y))
            .unwrap_or((0.0, 0.0));

        let mut stack: Vec<&DesignNode> = root.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if !node.visible || is_system_chrome(&node.name) {
                continue;
            }
            if let Some(el) = node_to_element(node, origin) {
                out.push(el);
            }
            stack.extend(node.children.iter().rev());
        }
    }

    tracing::debug!(count = out.len(), "design tree flattened");
    out
}

fn is_system_chrome(name: &str) -> bool {
    let lower = name.to_lowercase();
    SYSTEM_CHROME_NAMES.iter().any(|n| lower.contains(n))
}

fn node_kind(node: &DesignNode) -> ElementKind {
    match node.node_type.as_str() {
        "TEXT" => ElementKind::Text,
        "VECTOR" | "BOOLEAN_OPERATION" => ElementKind::Icon,
        "INSTANCE" | "COMPONENT" if node.name.to_lowercase().contains("button") => ElementKind::Button,
        _ => ElementKind::Container,
    }
}

fn first_solid_fill(node: &DesignNode) -> Option<&Paint> {
    node.fills
        .iter()
        .find(|p| p.paint_type == "SOLID" && p.visible)
}

fn paint_to_rgb(color: PaintColor) -> Rgb {
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0) as u8;
    Rgb {
        r: channel(color.r),
        g: channel(color.g),
        b: channel(color.b),
    }
}

fn node_to_element(node: &DesignNode, origin: (f64, f64)) -> Option<Element> {
    let bbox = node.bounding_box?;
    let kind = node_kind(node);

    let solid = first_solid_fill(node);
    let has_visuals = solid.is_some() || node.strokes.iter().any(|s| s.visible);

    let emit = match kind {
        ElementKind::Text | ElementKind::Button | ElementKind::Icon => true,
        _ => has_visuals,
    };
    if !emit {
        return None;
    }

    let bounds = Bounds::new(bbox.x - origin.0, bbox.y - origin.1, bbox.width, bbox.height);
    let mut el = Element::new(node.name.clone(), kind, bounds);
    if kind == ElementKind::Text {
        el.text_content = Some(node.characters.clone().unwrap_or_default());
    }
    el.style.color = solid.and_then(|p| p.color).map(|c| paint_to_rgb(c).to_hex());
    Some(el)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
      "nodes": {
        "1:2": {
          "document": {
            "type": "FRAME",
            "name": "Login",
            "absoluteBoundingBox": { "x": 1000, "y": 500, "width": 360, "height": 800 },
            "children": [
              { "type": "INSTANCE", "name": "Status Bar", "absoluteBoundingBox": { "x": 1000, "y": 500, "width": 360, "height": 24 } },
              { "type": "FRAME", "name": "content",
                "absoluteBoundingBox": { "x": 1000, "y": 524, "width": 360, "height": 700 },
                "children": [
                  { "type": "TEXT", "name": "title", "characters": "Welcome",
                    "absoluteBoundingBox": { "x": 1016, "y": 540, "width": 200, "height": 32 },
                    "fills": [ { "type": "SOLID", "color": { "r": 0, "g": 0, "b": 0 } } ] },
                  { "type": "INSTANCE", "name": "Primary Button",
                    "absoluteBoundingBox": { "x": 1016, "y": 700, "width": 328, "height": 48 },
                    "fills": [ { "type": "SOLID", "visible": false, "color": { "r": 1, "g": 1, "b": 1 } },
                               { "type": "SOLID", "color": { "r": 0.890, "g": 0.024, "b": 0.075 } } ] },
                  { "type": "RECTANGLE", "name": "hidden", "visible": false,
                    "absoluteBoundingBox": { "x": 1016, "y": 760, "width": 10, "height": 10 },
                    "fills": [ { "type": "SOLID", "color": { "r": 0, "g": 0, "b": 0 } } ] },
                  { "type": "RECTANGLE", "name": "divider",
                    "absoluteBoundingBox": { "x": 1000, "y": 780, "width": 360, "height": 1 },
                    "strokes": [ { "type": "SOLID" } ] }
                ] }
            ]
          }
        }
      }
    }"#;

    #[test]
    fn flattens_in_pre_order_relative_to_frame() {
        let elements = parse_design_document(DOC).unwrap();
        let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
        // "content" has no fill or stroke; status bar and hidden nodes are skipped.
        assert_eq!(names, ["title", "Primary Button", "divider"]);

        let title = &elements[0];
        assert_eq!(title.kind, ElementKind::Text);
        assert_eq!(title.bounds, Bounds::new(16.0, 40.0, 200.0, 32.0));
        assert_eq!(title.text_content.as_deref(), Some("Welcome"));
        assert_eq!(title.style.color.as_deref(), Some("#000000"));

        let button = &elements[1];
        assert_eq!(button.kind, ElementKind::Button);
        assert_eq!(button.style.color.as_deref(), Some("#E20613"));

        assert_eq!(elements[2].kind, ElementKind::Container);
        assert_eq!(elements[2].style.color, None);
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(matches!(
            parse_design_document(r#"{"nodes": {}}"#),
            Err(AuditError::DesignTree(_))
        ));
    }

    #[test]
    fn deep_nesting_does_not_recurse() {
        let mut node = DesignNode {
            node_type: "VECTOR".into(),
            name: "leaf".into(),
            visible: true,
            bounding_box: Some(BoundingBox { x: 1.0, y: 1.0, width: 4.0, height: 4.0 }),
            characters: None,
            fills: Vec::new(),
            strokes: Vec::new(),
            children: Vec::new(),
        };
        for _ in 0..1_000 {
            node = DesignNode {
                node_type: "GROUP".into(),
                name: "group".into(),
                children: vec![node],
                ..leaf_frame()
            };
        }
        let doc = DesignDocument {
            nodes: BTreeMap::from([(
                "0:1".to_string(),
                NodeEntry { document: Some(DesignNode { children: vec![node], ..leaf_frame() }) },
            )]),
        };
        let elements = flatten_design_tree(&doc);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind, ElementKind::Icon);
    }

    fn leaf_frame() -> DesignNode {
        DesignNode {
            node_type: "FRAME".into(),
            name: "root".into(),
            visible: true,
            bounding_box: None,
            characters: None,
            fills: Vec::new(),
            strokes: Vec::new(),
            children: Vec::new(),
        }
    }
}
