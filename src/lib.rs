#![forbid(unsafe_code)]

pub mod anim;
pub mod error;
pub mod layout;
pub mod manager;
pub mod model;
pub mod node;
pub mod path;
pub mod render_anim;
pub mod render_cli;
pub mod render_panels;
pub mod timer;

pub use anim::{AnimationController, AnimationPhase, AnimationState, TICK_MS};
pub use error::{VizletError, VizletResult};
pub use layout::{EditorIntegration, LayoutComposer};
pub use manager::{Instance, Rendered, Renderer, VisualizationManager};
pub use model::{
    AnimationConfig, AnimationPreset, CliConfig, LayoutKind, PanelConfig, PanelKind,
    ResultSection, SectionKind, VisualizationDescriptor, WebConfig,
};
pub use node::{RenderNode, RenderTarget, escape_text};
pub use path::{PATH_PREFIX, Resolved, resolve, resolve_display, substitute};
pub use render_anim::AnimationRenderer;
pub use render_cli::CliRenderer;
pub use render_panels::PanelRenderer;
pub use timer::{CancellationToken, TimerHandle};
