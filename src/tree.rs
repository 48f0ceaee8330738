//! Tree builder.
//!
//! Converts a parsed element into the serializable tree the editor front end
//! renders. Node ids are dotted child-index paths recomputed on every
//! conversion; the id of the i-th element child of node `P` is `P.i`, and the
//! root id is the literal `"root"`, which makes an id a complete structural
//! locator with no stored state behind it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::parser::{XmlElement, local_part};

/// Path id assigned to the root node of every tree.
pub const ROOT_ID: &str = "root";

/// Discriminator for tree nodes. Only elements are produced today; the tag
/// is kept so other node kinds can be added without changing the wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Element,
}

/// One node of the UI tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Dot-delimited child-index path from the root, e.g. `"root.0.1"`.
    pub id: String,
    /// Namespace-stripped tag name.
    pub name: String,
    pub kind: NodeKind,
    /// Attribute local name to value; order is not significant.
    pub attributes: HashMap<String, String>,
    /// Element children in document order.
    pub children: Vec<TreeNode>,
    /// Trimmed value of the first direct text node, or `""` if none.
    pub text_content: String,
}

/// Convert a parsed root element into a tree rooted at id `"root"`.
pub fn build_tree(root: &XmlElement) -> TreeNode {
    build_node(root, ROOT_ID.to_string())
}

fn build_node(element: &XmlElement, id: String) -> TreeNode {
    let attributes = element
        .attributes()
        .map(|(key, value)| (local_part(key).to_string(), value.to_string()))
        .collect();

    let children = element
        .child_elements()
        .enumerate()
        .map(|(index, child)| build_node(child, format!("{id}.{index}")))
        .collect();

    // Only the first text run contributes; later runs in mixed content are
    // dropped, matching what the editor expects.
    let text_content = element
        .first_text()
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    TreeNode {
        id,
        name: element.local_name().to_string(),
        kind: NodeKind::Element,
        attributes,
        children,
        text_content,
    }
}
