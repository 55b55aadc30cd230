use serde_json::Value;

use crate::{
    error::VizletResult,
    layout::{EditorIntegration, LayoutComposer},
    manager::{Rendered, Renderer},
    model::{VisualizationDescriptor, WebConfig},
};

/// Built-in `web` renderer: a panel layout composed over the result tree.
pub struct PanelRenderer {
    composer: LayoutComposer,
}

impl PanelRenderer {
    pub fn new() -> Self {
        Self {
            composer: LayoutComposer::new(),
        }
    }

    pub fn with_editor(editor: Box<dyn EditorIntegration>) -> Self {
        Self {
            composer: LayoutComposer::with_editor(editor),
        }
    }
}

impl Default for PanelRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PanelRenderer {
    fn render(
        &mut self,
        descriptor: &VisualizationDescriptor,
        tree: &Value,
    ) -> VizletResult<Rendered> {
        let config = WebConfig::from_value(&descriptor.config)?;
        config.validate()?;
        let node = self
            .composer
            .compose(config.layout, &config.panels, tree)
            .attr("data-viz-id", &descriptor.id);
        Ok(Rendered::node(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_a_layout_tagged_with_the_descriptor_id() {
        let mut renderer = PanelRenderer::new();
        let descriptor = VisualizationDescriptor {
            id: "web_1".to_string(),
            kind: "web".to_string(),
            enabled: true,
            config: json!({
                "layout": "split-vertical",
                "panels": [
                    { "id": "code", "type": "code" },
                    { "id": "out", "type": "results" }
                ]
            }),
        };
        let rendered = renderer
            .render(&descriptor, &json!({ "user_code": "x = 1" }))
            .unwrap();
        assert_eq!(rendered.node.attrs.get("data-viz-id").unwrap(), "web_1");
        assert!(rendered.node.has_class("layout-split-vertical"));
        assert_eq!(rendered.node.children.len(), 2);
        assert!(rendered.instance.is_none());
    }

    #[test]
    fn malformed_config_is_an_error_not_a_panic() {
        let mut renderer = PanelRenderer::new();
        let descriptor = VisualizationDescriptor {
            id: "web_1".to_string(),
            kind: "web".to_string(),
            enabled: true,
            config: json!({ "layout": "diagonal" }),
        };
        assert!(renderer.render(&descriptor, &json!({})).is_err());
    }
}
