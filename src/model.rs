use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{VizletError, VizletResult};

/// One declarative visualization request. Produced by workshop content,
/// consumed once per grading result.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VisualizationDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Raw per-renderer config; interpreted by whichever renderer the `type`
    /// tag selects.
    #[serde(default)]
    pub config: Value,
}

impl VisualizationDescriptor {
    pub fn validate(&self) -> VizletResult<()> {
        if self.id.trim().is_empty() {
            return Err(VizletError::validation("descriptor id must be non-empty"));
        }
        if self.kind.trim().is_empty() {
            return Err(VizletError::validation(format!(
                "descriptor '{}' has an empty type tag",
                self.id
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutKind {
    SplitHorizontal,
    SplitVertical,
    Tabbed,
}

impl LayoutKind {
    pub fn tag(self) -> &'static str {
        match self {
            Self::SplitHorizontal => "layout-split-horizontal",
            Self::SplitVertical => "layout-split-vertical",
            Self::Tabbed => "layout-tabbed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelKind {
    Code,
    CodeEditor,
    Results,
    Dashboard,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PanelConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PanelKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Vec<ResultSection>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    Table,
    KeyValue,
    List,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ResultSection {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    /// Either an `execution.`-prefixed path or a literal.
    pub data: String,
}

/// Config for the `web` renderer: a panel layout over the result tree.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_layout")]
    pub layout: LayoutKind,
    #[serde(default)]
    pub panels: Vec<PanelConfig>,
}

impl WebConfig {
    pub fn from_value(config: &Value) -> VizletResult<Self> {
        Ok(serde_json::from_value(config.clone())?)
    }

    pub fn validate(&self) -> VizletResult<()> {
        for panel in &self.panels {
            if panel.id.trim().is_empty() {
                return Err(VizletError::validation("panel id must be non-empty"));
            }
            for section in &panel.sections {
                if section.data.trim().is_empty() {
                    return Err(VizletError::validation(format!(
                        "panel '{}' has a section with an empty data path",
                        panel.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Config for the `cli` renderer: a text template plus placeholder paths.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CliConfig {
    pub template: String,
    #[serde(default)]
    pub placeholders: BTreeMap<String, String>,
}

impl CliConfig {
    pub fn from_value(config: &Value) -> VizletResult<Self> {
        Ok(serde_json::from_value(config.clone())?)
    }

    pub fn validate(&self) -> VizletResult<()> {
        if self.template.is_empty() {
            return Err(VizletError::validation("cli template must be non-empty"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationPreset {
    DataFlow,
    StateMachine,
    Tree,
}

impl AnimationPreset {
    pub fn tag(self) -> &'static str {
        match self {
            Self::DataFlow => "data-flow",
            Self::StateMachine => "state-machine",
            Self::Tree => "tree",
        }
    }
}

/// Config for the `animation` renderer.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_preset")]
    pub preset: AnimationPreset,
    /// Base transition duration in milliseconds.
    #[serde(default = "default_duration_ms", rename = "duration")]
    pub duration_ms: u64,
    #[serde(default = "default_true", rename = "autoPlay")]
    pub auto_play: bool,
    #[serde(default = "default_speed")]
    pub speed: f64,
}

impl AnimationConfig {
    pub fn from_value(config: &Value) -> VizletResult<Self> {
        Ok(serde_json::from_value(config.clone())?)
    }

    pub fn validate(&self) -> VizletResult<()> {
        if self.duration_ms == 0 {
            return Err(VizletError::validation("animation duration must be > 0"));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(VizletError::validation(
                "animation speed must be finite and > 0",
            ));
        }
        Ok(())
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            duration_ms: default_duration_ms(),
            auto_play: true,
            speed: default_speed(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_layout() -> LayoutKind {
    LayoutKind::SplitHorizontal
}

fn default_preset() -> AnimationPreset {
    AnimationPreset::DataFlow
}

fn default_duration_ms() -> u64 {
    2000
}

fn default_speed() -> f64 {
    1.0
}
