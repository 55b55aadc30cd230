use std::collections::BTreeMap;

/// A backend-agnostic scene node. The engine only decides structure; a
/// separate presentation layer turns the serialized tree into real UI.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Sets text content. Input is escaped here so arbitrary user code strings
    /// can never smuggle markup into the presentation layer.
    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(escape_text(text));
        self
    }

    pub fn child(mut self, node: RenderNode) -> Self {
        self.children.push(node);
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = RenderNode>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn set_class(&mut self, class: &str, on: bool) {
        let present = self.has_class(class);
        if on && !present {
            self.classes.push(class.to_string());
        } else if !on && present {
            self.classes.retain(|c| c != class);
        }
    }
}

/// Escapes markup-significant characters. Applied to every text insertion.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The host-owned mount point. The engine only appends or removes whole
/// subtrees here, never anything outside it.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RenderTarget {
    children: Vec<RenderNode>,
}

impl RenderTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, node: RenderNode) {
        self.children.push(node);
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn nodes(&self) -> &[RenderNode] {
        &self.children
    }

    pub fn nodes_mut(&mut self) -> &mut [RenderNode] {
        &mut self.children
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({ "children": self.children })
    }
}
