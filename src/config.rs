//! TOML configuration for diagrams and animations.
//!
//! Every section and key is optional; missing values fall back to the built-in defaults and
//! unknown keys are rejected.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::core::{Fps, Rgb8};
use crate::foundation::error::{FamflowError, FamflowResult};
use crate::layout::adapter::LayoutParams;
use crate::layout::request::LayoutHints;
use crate::layout::solver::GraphvizSolver;
use crate::timeline::builder::TimelineParams;

/// File looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Root configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Colors and sizes.
    pub style: StyleConfig,
    /// Animation timing.
    pub animation: AnimationConfig,
    /// Layout solver settings.
    pub layout: LayoutConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// `[style]` section.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// `[style.colors]`.
    pub colors: ColorsConfig,
    /// `[style.dimensions]`.
    pub dimensions: DimensionsConfig,
}

/// `[style.colors]`: RGB triples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorsConfig {
    /// Canvas background.
    pub background: Rgb8,
    /// Box fill for men.
    pub male_fill: Rgb8,
    /// Box fill for women.
    pub female_fill: Rgb8,
    /// Box border for men.
    pub male_border: Rgb8,
    /// Box border for women.
    pub female_border: Rgb8,
    /// Spouse line.
    pub marriage_line: Rgb8,
    /// Parent to child line.
    pub child_line: Rgb8,
    /// Name text.
    pub text: Rgb8,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            background: Rgb8::new(245, 240, 232),
            male_fill: Rgb8::new(193, 216, 236),
            female_fill: Rgb8::new(253, 239, 242),
            male_border: Rgb8::new(46, 79, 111),
            female_border: Rgb8::new(142, 53, 74),
            marriage_line: Rgb8::new(197, 61, 67),
            child_line: Rgb8::new(89, 88, 87),
            text: Rgb8::new(43, 43, 43),
        }
    }
}

/// `[style.dimensions]`: pixel sizes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DimensionsConfig {
    /// Pixels per solver unit (inch).
    pub dpi: f64,
    /// Empty border around the diagram.
    pub padding: f64,
    /// Spouse line width.
    pub line_width_marriage: f64,
    /// Parent to child line width.
    pub line_width_child: f64,
    /// Box border width.
    pub border_width: f64,
    /// Box corner radius.
    pub corner_radius: f64,
    /// Name font size.
    pub font_size_name: f64,
    /// Box width multiplier applied after layout.
    pub node_width_scale: f64,
    /// Font file used for names; without one, names are not drawn.
    pub font_path: Option<PathBuf>,
}

impl Default for DimensionsConfig {
    fn default() -> Self {
        Self {
            dpi: 432.0,
            padding: 240.0,
            line_width_marriage: 18.0,
            line_width_child: 12.0,
            border_width: 10.0,
            corner_radius: 48.0,
            font_size_name: 90.0,
            node_width_scale: 1.0,
            font_path: None,
        }
    }
}

/// `[animation]`: timing in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Output frame rate.
    pub fps: u32,
    /// Length of each line-drawing step.
    pub line_duration: f64,
    /// Hold after every step.
    pub pause_duration: f64,
    /// Hold on the complete picture.
    pub final_pause: f64,
    /// Time per generation in the crossfade animation.
    pub scene_duration: f64,
    /// Crossfade length.
    pub fade_duration: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 24,
            line_duration: 0.5,
            pause_duration: 0.3,
            final_pause: 2.0,
            scene_duration: 2.0,
            fade_duration: 1.0,
        }
    }
}

/// `[layout]`: Graphviz settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Layout program name or path.
    pub program: String,
    /// Horizontal node gap (inches).
    pub nodesep: f64,
    /// Vertical rank gap (inches).
    pub ranksep: f64,
    /// Label font size hint (points).
    pub font_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            program: "dot".to_string(),
            nodesep: 0.8,
            ranksep: 1.0,
            font_size: 11.0,
        }
    }
}

/// `[logging]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> FamflowResult<Self> {
        let cfg: Self = toml::from_str(s).map_err(|e| FamflowError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: &Path) -> FamflowResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_toml_str(&s)
    }

    /// Check numeric ranges.
    pub fn validate(&self) -> FamflowResult<()> {
        let d = &self.style.dimensions;
        let a = &self.animation;
        if a.fps == 0 {
            return Err(FamflowError::validation("animation.fps must be > 0"));
        }
        if !d.dpi.is_finite() || d.dpi <= 0.0 {
            return Err(FamflowError::validation(format!(
                "style.dimensions.dpi must be finite and > 0, got {}",
                d.dpi
            )));
        }
        if !d.node_width_scale.is_finite() || d.node_width_scale <= 0.0 {
            return Err(FamflowError::validation(format!(
                "style.dimensions.node_width_scale must be finite and > 0, got {}",
                d.node_width_scale
            )));
        }
        for (name, v) in [
            ("style.dimensions.padding", d.padding),
            ("style.dimensions.line_width_marriage", d.line_width_marriage),
            ("style.dimensions.line_width_child", d.line_width_child),
            ("style.dimensions.border_width", d.border_width),
            ("style.dimensions.corner_radius", d.corner_radius),
            ("style.dimensions.font_size_name", d.font_size_name),
            ("animation.line_duration", a.line_duration),
            ("animation.pause_duration", a.pause_duration),
            ("animation.final_pause", a.final_pause),
            ("animation.scene_duration", a.scene_duration),
            ("animation.fade_duration", a.fade_duration),
            ("layout.nodesep", self.layout.nodesep),
            ("layout.ranksep", self.layout.ranksep),
            ("layout.font_size", self.layout.font_size),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(FamflowError::validation(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        if self.layout.program.trim().is_empty() {
            return Err(FamflowError::validation("layout.program must be non-empty"));
        }
        Ok(())
    }

    /// Output frame rate.
    pub fn fps(&self) -> FamflowResult<Fps> {
        Fps::new(self.animation.fps, 1)
    }

    /// Adapter parameters derived from `[layout]` and `[style.dimensions]`.
    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            hints: LayoutHints {
                nodesep: self.layout.nodesep,
                ranksep: self.layout.ranksep,
                font_size: self.layout.font_size,
            },
            pixels_per_unit: self.style.dimensions.dpi,
            node_width_scale: self.style.dimensions.node_width_scale,
        }
    }

    /// Timeline builder parameters derived from `[animation]`.
    pub fn timeline_params(&self) -> TimelineParams {
        TimelineParams {
            line_duration: self.animation.line_duration,
            pause_duration: self.animation.pause_duration,
            final_pause: self.animation.final_pause,
        }
    }

    /// Graphviz solver for `[layout] program`.
    pub fn solver(&self) -> GraphvizSolver {
        GraphvizSolver::new(self.layout.program.clone())
    }
}

/// Load configuration from `path`, else `./config.toml` when present, else defaults.
pub fn load_config(path: Option<&Path>) -> FamflowResult<AppConfig> {
    match path {
        Some(p) => AppConfig::from_path(p),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                tracing::debug!(path = %fallback.display(), "using config from working directory");
                AppConfig::from_path(fallback)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
