use std::collections::BTreeMap;

use serde_json::Value;

use crate::{
    anim::AnimationController,
    error::{VizletError, VizletResult},
    model::VisualizationDescriptor,
    node::{RenderNode, RenderTarget},
    render_anim::AnimationRenderer,
    render_cli::CliRenderer,
    render_panels::PanelRenderer,
};

/// A pluggable renderer: one descriptor plus the result tree in, one scene
/// node out. Errors stay inside the dispatch boundary.
pub trait Renderer: Send {
    fn render(&mut self, descriptor: &VisualizationDescriptor, tree: &Value)
    -> VizletResult<Rendered>;
}

/// A live per-descriptor instance for renderers that hold state beyond the
/// node (timers). The manager keeps it until the next pass tears it down, and
/// hands the host whatever control surface the renderer exposes.
pub trait Instance: Send + Sync {
    fn destroy(&self);

    /// Animation instances hand back their controller so the host can drive
    /// the timer and the transport controls.
    fn animation(&self) -> Option<&AnimationController> {
        None
    }
}

pub struct Rendered {
    pub node: RenderNode,
    pub instance: Option<Box<dyn Instance>>,
}

impl Rendered {
    pub fn node(node: RenderNode) -> Self {
        Self {
            node,
            instance: None,
        }
    }
}

struct ActiveVisualization {
    descriptor_id: String,
    renderer_kind: String,
    instance: Option<Box<dyn Instance>>,
}

/// Dispatches enabled descriptors to registered renderers and owns the
/// produced visualizations until the next render pass tears them down.
#[derive(Default)]
pub struct VisualizationManager {
    renderers: BTreeMap<String, Box<dyn Renderer>>,
    active: Vec<ActiveVisualization>,
}

impl VisualizationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A manager with the built-in `web`, `cli` and `animation` renderers.
    pub fn with_builtin_renderers() -> Self {
        let mut manager = Self::new();
        manager
            .renderers
            .insert("web".to_string(), Box::new(PanelRenderer::new()));
        manager
            .renderers
            .insert("cli".to_string(), Box::new(CliRenderer));
        manager
            .renderers
            .insert("animation".to_string(), Box::new(AnimationRenderer));
        manager
    }

    /// Registration problems are wiring bugs, so they fail fast instead of
    /// degrading.
    pub fn register_renderer(
        &mut self,
        kind: impl Into<String>,
        renderer: Box<dyn Renderer>,
    ) -> VizletResult<()> {
        let kind = kind.into();
        if kind.trim().is_empty() {
            return Err(VizletError::registry("renderer type tag must be non-empty"));
        }
        if self.renderers.contains_key(&kind) {
            return Err(VizletError::registry(format!(
                "renderer '{kind}' is already registered"
            )));
        }
        self.renderers.insert(kind, renderer);
        Ok(())
    }

    pub fn has_renderer(&self, kind: &str) -> bool {
        self.renderers.contains_key(kind)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// The live controller behind an active `animation` visualization, if the
    /// latest pass produced one for `descriptor_id`.
    pub fn animation(&self, descriptor_id: &str) -> Option<&AnimationController> {
        self.active
            .iter()
            .find(|viz| viz.descriptor_id == descriptor_id)
            .and_then(|viz| viz.instance.as_deref())
            .and_then(|instance| instance.animation())
    }

    /// Every live animation controller with its descriptor id, in render
    /// order. This is the host's hook for driving timer ticks across a pass.
    pub fn animations(&self) -> impl Iterator<Item = (&str, &AnimationController)> {
        self.active.iter().filter_map(|viz| {
            let controller = viz.instance.as_deref()?.animation()?;
            Some((viz.descriptor_id.as_str(), controller))
        })
    }

    /// Tears down the previous pass, then renders each enabled descriptor in
    /// input order. A failing renderer loses only its own slot; everything
    /// else still renders.
    #[tracing::instrument(skip_all, fields(descriptors = descriptors.len()))]
    pub fn render_all(
        &mut self,
        descriptors: &[VisualizationDescriptor],
        tree: &Value,
        target: &mut RenderTarget,
    ) {
        self.clear_all(target);
        if descriptors.is_empty() {
            return;
        }

        for descriptor in descriptors {
            if !descriptor.enabled {
                continue;
            }
            let Some(renderer) = self.renderers.get_mut(&descriptor.kind) else {
                tracing::warn!(
                    descriptor = %descriptor.id,
                    kind = %descriptor.kind,
                    "no renderer registered, skipping"
                );
                continue;
            };
            match renderer.render(descriptor, tree) {
                Ok(rendered) => {
                    target.append(rendered.node);
                    self.active.push(ActiveVisualization {
                        descriptor_id: descriptor.id.clone(),
                        renderer_kind: descriptor.kind.clone(),
                        instance: rendered.instance,
                    });
                }
                Err(err) => {
                    let err = err.with_descriptor(&descriptor.id);
                    tracing::warn!(error = %err, "renderer failed, skipping");
                }
            }
        }
    }

    /// Destroys every active visualization and detaches its output. The
    /// active set always mirrors the target's children, so detaching them all
    /// is a target clear.
    pub fn clear_all(&mut self, target: &mut RenderTarget) {
        for viz in self.active.drain(..) {
            if let Some(instance) = viz.instance.as_deref() {
                instance.destroy();
            }
            tracing::debug!(
                descriptor = %viz.descriptor_id,
                kind = %viz.renderer_kind,
                "visualization torn down"
            );
        }
        target.clear();
    }
}
