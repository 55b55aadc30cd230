use std::sync::{Arc, Mutex};

use crate::{
    error::{VizletError, VizletResult},
    model::{AnimationConfig, AnimationPreset},
    node::RenderNode,
    timer::TimerHandle,
};

/// Tick cadence the controller expects from its external driver.
pub const TICK_MS: u64 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationPhase {
    Idle,
    Playing,
    Paused,
}

/// Snapshot of one controller's state.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AnimationState {
    pub phase: AnimationPhase,
    pub step_count: u64,
    pub speed_factor: f64,
    /// Continuous looping transition position in [0, 1).
    pub progress: f64,
}

struct Inner {
    phase: AnimationPhase,
    step_count: u64,
    speed_factor: f64,
    progress: f64,
}

/// Per-instance state machine for one rendered animation visualization.
///
/// `idle → playing ⇄ paused`; `reset` returns to `idle` from any phase. The
/// looping transition only advances while `playing`, on ticks delivered
/// through the controller's [`TimerHandle`].
pub struct AnimationController {
    preset: AnimationPreset,
    base_duration_ms: u64,
    inner: Arc<Mutex<Inner>>,
    timer: TimerHandle,
}

impl AnimationController {
    pub fn new(config: &AnimationConfig) -> VizletResult<Self> {
        config.validate()?;

        let inner = Arc::new(Mutex::new(Inner {
            phase: if config.auto_play {
                AnimationPhase::Playing
            } else {
                AnimationPhase::Idle
            },
            step_count: 0,
            speed_factor: config.speed,
            progress: 0.0,
        }));

        let tick_inner = Arc::clone(&inner);
        let base = config.duration_ms;
        let timer = TimerHandle::new(
            TICK_MS,
            Box::new(move || {
                let Ok(mut s) = tick_inner.lock() else {
                    return;
                };
                if s.phase != AnimationPhase::Playing {
                    return;
                }
                // Rate is re-read every tick, so a speed change rescales the
                // remaining motion without moving the current position.
                let effective_ms = base as f64 / s.speed_factor;
                s.progress = (s.progress + TICK_MS as f64 / effective_ms) % 1.0;
            }),
        );

        Ok(Self {
            preset: config.preset,
            base_duration_ms: config.duration_ms,
            inner,
            timer,
        })
    }

    pub fn preset(&self) -> AnimationPreset {
        self.preset
    }

    /// The handle the host's scheduler drives (and cancels).
    pub fn timer(&self) -> &TimerHandle {
        &self.timer
    }

    pub fn state(&self) -> AnimationState {
        let Ok(s) = self.inner.lock() else {
            return AnimationState {
                phase: AnimationPhase::Idle,
                step_count: 0,
                speed_factor: 1.0,
                progress: 0.0,
            };
        };
        AnimationState {
            phase: s.phase,
            step_count: s.step_count,
            speed_factor: s.speed_factor,
            progress: s.progress,
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.state().phase
    }

    /// No-op when already playing.
    pub fn play(&self) {
        if let Ok(mut s) = self.inner.lock() {
            s.phase = AnimationPhase::Playing;
        }
    }

    /// No-op unless currently playing.
    pub fn pause(&self) {
        if let Ok(mut s) = self.inner.lock()
            && s.phase == AnimationPhase::Playing
        {
            s.phase = AnimationPhase::Paused;
        }
    }

    /// Advances the coarse step counter regardless of phase.
    pub fn step(&self) {
        if let Ok(mut s) = self.inner.lock() {
            s.step_count += 1;
        }
    }

    /// Coarse visual indicator, deliberately decoupled from the continuous
    /// transition.
    pub fn progress_indicator(&self) -> u64 {
        (self.state().step_count * 10) % 100
    }

    /// Rescales the effective duration to `base / factor` going forward. The
    /// transition's current position is preserved.
    pub fn set_speed(&self, factor: f64) -> VizletResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(VizletError::validation(
                "speed factor must be finite and > 0",
            ));
        }
        if let Ok(mut s) = self.inner.lock() {
            s.speed_factor = factor;
        }
        Ok(())
    }

    pub fn effective_duration_ms(&self) -> f64 {
        self.base_duration_ms as f64 / self.state().speed_factor
    }

    /// Back to `idle` with the step counter and transition position zeroed.
    pub fn reset(&self) {
        if let Ok(mut s) = self.inner.lock() {
            s.phase = AnimationPhase::Idle;
            s.step_count = 0;
            s.progress = 0.0;
        }
    }

    /// Cancels the timer; after this returns no tick can touch the controller
    /// again. Safe to call multiple times.
    pub fn destroy(&self) {
        self.timer.cancel();
    }

    /// Builds the static preset graphic plus its control strip.
    pub fn render_node(&self, descriptor_id: &str) -> RenderNode {
        let graphic = match self.preset {
            AnimationPreset::DataFlow => data_flow_graphic(),
            AnimationPreset::StateMachine => state_machine_graphic(),
            AnimationPreset::Tree => tree_graphic(),
        };

        RenderNode::element("div")
            .class("viz-animation")
            .attr("data-viz-id", descriptor_id)
            .attr("data-preset", self.preset.tag())
            .attr("data-duration-ms", format!("{:.0}", self.effective_duration_ms()))
            .child(graphic)
            .child(control_strip())
    }
}

fn control_strip() -> RenderNode {
    RenderNode::element("div").class("anim-controls").children([
        RenderNode::element("button").class("anim-play").text("Play"),
        RenderNode::element("button").class("anim-pause").text("Pause"),
        RenderNode::element("button").class("anim-step").text("Step"),
        RenderNode::element("button").class("anim-reset").text("Reset"),
    ])
}

fn svg_root() -> RenderNode {
    RenderNode::element("svg").attr("viewBox", "0 0 400 200")
}

fn data_flow_graphic() -> RenderNode {
    svg_root().class("preset-data-flow").children([
        stage_box("source", "20", "80", "Input"),
        stage_box("process", "160", "80", "Process"),
        stage_box("sink", "300", "80", "Output"),
        edge("100", "110", "160", "110"),
        edge("240", "110", "300", "110"),
        RenderNode::element("circle")
            .class("flow-packet")
            .attr("r", "6")
            .attr("cy", "110"),
    ])
}

fn state_machine_graphic() -> RenderNode {
    svg_root().class("preset-state-machine").children([
        state_circle("idle", "70", "100"),
        state_circle("running", "200", "100"),
        state_circle("done", "330", "100"),
        edge("100", "100", "170", "100"),
        edge("230", "100", "300", "100"),
    ])
}

fn tree_graphic() -> RenderNode {
    svg_root().class("preset-tree").children([
        tree_node("root", "200", "30"),
        tree_node("left", "110", "100"),
        tree_node("right", "290", "100"),
        tree_node("left-left", "60", "170"),
        tree_node("left-right", "160", "170"),
        tree_node("right-left", "240", "170"),
        tree_node("right-right", "340", "170"),
        edge("200", "30", "110", "100"),
        edge("200", "30", "290", "100"),
        edge("110", "100", "60", "170"),
        edge("110", "100", "160", "170"),
        edge("290", "100", "240", "170"),
        edge("290", "100", "340", "170"),
    ])
}

fn stage_box(name: &str, x: &str, y: &str, label: &str) -> RenderNode {
    RenderNode::element("g")
        .class("flow-stage")
        .attr("data-stage", name)
        .child(
            RenderNode::element("rect")
                .attr("x", x)
                .attr("y", y)
                .attr("width", "80")
                .attr("height", "60"),
        )
        .child(RenderNode::element("text").text(label))
}

fn state_circle(name: &str, cx: &str, cy: &str) -> RenderNode {
    RenderNode::element("g")
        .class("state-node")
        .attr("data-state", name)
        .child(
            RenderNode::element("circle")
                .attr("cx", cx)
                .attr("cy", cy)
                .attr("r", "30"),
        )
        .child(RenderNode::element("text").text(name))
}

fn tree_node(name: &str, cx: &str, cy: &str) -> RenderNode {
    RenderNode::element("circle")
        .class("tree-node")
        .attr("data-node", name)
        .attr("cx", cx)
        .attr("cy", cy)
        .attr("r", "16")
}

fn edge(x1: &str, y1: &str, x2: &str, y2: &str) -> RenderNode {
    RenderNode::element("line")
        .class("edge")
        .attr("x1", x1)
        .attr("y1", y1)
        .attr("x2", x2)
        .attr("y2", y2)
}
