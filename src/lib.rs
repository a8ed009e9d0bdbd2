//! famflow turns a family record into diagrams and reveal animations.
//!
//! The pipeline:
//!
//! - Load a [`FamilyGraph`] and resolve its generations with [`resolve_generations`]
//! - Order people into reveal scenes with [`schedule_scenes`]
//! - Lay the family out through a [`LayoutSolver`] (Graphviz by default) into a [`GraphLayout`]
//! - Turn scenes into a [`Timeline`] and sample it with [`Timeline::state_at`]
//! - Draw frames with a [`FrameDrawer`] and stream them into a [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod encode;
mod family;
mod foundation;
mod layout;
mod render;
mod schedule;
mod timeline;

pub use crate::foundation::core::{
    Canvas, Fps, FrameIndex, Point, Rect, Rgb8, Vec2,
};
pub use crate::foundation::error::{FamflowError, FamflowResult};

pub use crate::config::{
    AnimationConfig, AppConfig, ColorsConfig, DEFAULT_CONFIG_FILE, DimensionsConfig,
    LayoutConfig, LoggingConfig, StyleConfig, load_config,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::family::generation::{GenerationMap, resolve_generations};
pub use crate::family::model::{CoupleKey, FamilyGraph, Person, PersonId, Sex};
pub use crate::layout::adapter::{LayoutParams, compute_full_layout, compute_layout};
pub use crate::layout::graph::{EdgeLayout, GraphLayout, NodeGeometry, NodeKey};
pub use crate::layout::merge::merge_marriage_edges;
pub use crate::layout::request::{EdgeKind, LayoutHints, LayoutRequest, RequestEdge, RequestNode};
pub use crate::layout::solver::{
    GraphvizSolver, LayoutSolver, RawEdge, RawLayout, RawNode, parse_plain,
};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::cpu::CpuPainter;
pub use crate::render::frame::{FrameDrawer, LineStyle};
pub use crate::render::painter::Painter;
pub use crate::render::pipeline::{
    FlowAnimation, GenerationReveal, RenderStats, RenderThreading, load_font,
    render_flow, render_flow_frame, render_generation_reveal, render_still,
};
pub use crate::schedule::scene::{SceneList, SchedulePolicy, schedule_scenes};
pub use crate::timeline::action::{AnimAction, EdgeId, Timeline};
pub use crate::timeline::builder::{TimelineParams, build_timeline};
pub use crate::timeline::reconstruct::{EdgeProgress, FrameState, interpolate_along_path};
