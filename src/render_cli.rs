use serde_json::Value;

use crate::{
    error::VizletResult,
    manager::{Rendered, Renderer},
    model::{CliConfig, VisualizationDescriptor},
    node::RenderNode,
    path::substitute,
};

/// Built-in `cli` renderer: expands a text template with placeholder paths
/// resolved against the result tree. Unresolvable placeholders stay visible
/// as `{path}` so a broken workshop config is diagnosable from the output.
pub struct CliRenderer;

impl Renderer for CliRenderer {
    fn render(
        &mut self,
        descriptor: &VisualizationDescriptor,
        tree: &Value,
    ) -> VizletResult<Rendered> {
        let config = CliConfig::from_value(&descriptor.config)?;
        config.validate()?;

        let output = substitute(&config.template, &config.placeholders, tree);
        let node = RenderNode::element("div")
            .class("viz-cli")
            .attr("data-viz-id", &descriptor.id)
            .child(RenderNode::element("pre").class("cli-output").text(&output));
        Ok(Rendered::node(node))
    }
}
