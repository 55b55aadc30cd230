use serde_json::Value;

use crate::{
    anim::AnimationController,
    error::VizletResult,
    manager::{Instance, Rendered, Renderer},
    model::{AnimationConfig, VisualizationDescriptor},
};

/// Built-in `animation` renderer: one [`AnimationController`] per rendered
/// descriptor, handed to the manager as the live instance so the host can
/// drive it and its timer can never outlive the node.
pub struct AnimationRenderer;

impl Renderer for AnimationRenderer {
    fn render(
        &mut self,
        descriptor: &VisualizationDescriptor,
        _tree: &Value,
    ) -> VizletResult<Rendered> {
        let config = AnimationConfig::from_value(&descriptor.config)?;
        let controller = AnimationController::new(&config)?;
        let node = controller.render_node(&descriptor.id);
        Ok(Rendered {
            node,
            instance: Some(Box::new(controller)),
        })
    }
}

impl Instance for AnimationController {
    fn destroy(&self) {
        AnimationController::destroy(self);
    }

    fn animation(&self) -> Option<&AnimationController> {
        Some(self)
    }
}
