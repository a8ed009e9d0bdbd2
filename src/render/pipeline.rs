use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::config::{AppConfig, DimensionsConfig};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::family::generation::{GenerationMap, resolve_generations};
use crate::family::model::{FamilyGraph, PersonId};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{FamflowError, FamflowResult};
use crate::layout::adapter::{compute_full_layout, compute_layout};
use crate::layout::graph::GraphLayout;
use crate::layout::solver::LayoutSolver;
use crate::render::backend::FrameRGBA;
use crate::render::cpu::CpuPainter;
use crate::render::frame::FrameDrawer;
use crate::schedule::scene::{SceneList, SchedulePolicy, schedule_scenes};
use crate::timeline::action::Timeline;
use crate::timeline::builder::build_timeline;

#[derive(Clone, Debug)]
/// Threading and chunking controls for multi-frame rendering.
pub struct RenderThreading {
    /// Enable parallel rendering when `true`.
    pub parallel: bool,
    /// Chunk size in frames for batched scheduling.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Aggregated rendering counters.
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames rasterized from scratch (the rest were composited).
    pub frames_rendered: u64,
}

/// Read the configured name font, if any.
///
/// A missing `font_path` is not an error: names are simply left out.
pub fn load_font(dims: &DimensionsConfig) -> FamflowResult<Option<Arc<Vec<u8>>>> {
    let Some(path) = dims.font_path.as_ref() else {
        tracing::warn!("no font_path configured; person names will not be drawn");
        return Ok(None);
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
    Ok(Some(Arc::new(bytes)))
}

/// Lay out the whole family and draw it once.
#[tracing::instrument(skip_all, fields(people = graph.len()))]
pub fn render_still(
    graph: &FamilyGraph,
    solver: &dyn LayoutSolver,
    config: &AppConfig,
) -> FamflowResult<FrameRGBA> {
    config.validate()?;
    let generations = resolve_generations(graph);
    let layout = compute_full_layout(graph, &generations, solver, &config.layout_params())?;
    let font = load_font(&config.style.dimensions)?;
    let drawer = FrameDrawer::new(graph, &layout, &config.style)?;
    let mut painter = CpuPainter::new(drawer.canvas(), font)?;
    drawer.draw_full(&mut painter)
}

/// Everything needed to draw any instant of the line-drawing animation.
///
/// Built once; frames can then be requested in any order and from several threads.
pub struct FlowAnimation<'a> {
    graph: &'a FamilyGraph,
    config: &'a AppConfig,
    scenes: SceneList,
    layout: GraphLayout,
    timeline: Timeline,
    font: Option<Arc<Vec<u8>>>,
}

impl<'a> FlowAnimation<'a> {
    /// Resolve generations, schedule scenes, lay out the full family and build the timeline.
    #[tracing::instrument(skip(graph, solver, config), fields(people = graph.len()))]
    pub fn prepare(
        graph: &'a FamilyGraph,
        solver: &dyn LayoutSolver,
        config: &'a AppConfig,
        policy: SchedulePolicy,
    ) -> FamflowResult<Self> {
        config.validate()?;
        let generations = resolve_generations(graph);
        let scenes = schedule_scenes(graph, &generations, policy);
        let layout = compute_full_layout(graph, &generations, solver, &config.layout_params())?;
        let timeline = build_timeline(graph, &scenes, &layout, &config.timeline_params())?;
        let font = load_font(&config.style.dimensions)?;
        tracing::info!(
            scenes = scenes.len(),
            edges = timeline.edges().len(),
            duration = timeline.total_duration(),
            "flow animation prepared"
        );
        Ok(Self {
            graph,
            config,
            scenes,
            layout,
            timeline,
            font,
        })
    }

    /// Reveal order.
    pub fn scenes(&self) -> &SceneList {
        &self.scenes
    }

    /// Full-family pixel layout.
    pub fn layout(&self) -> &GraphLayout {
        &self.layout
    }

    /// Timed actions.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Animation length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.timeline.total_duration()
    }

    /// Output frame rate.
    pub fn fps(&self) -> FamflowResult<Fps> {
        self.config.fps()
    }

    /// `ceil(duration × fps)`.
    pub fn frame_count(&self) -> FamflowResult<u64> {
        Ok(self.fps()?.secs_to_frames_ceil(self.duration_secs()))
    }

    fn drawer(&self) -> FamflowResult<FrameDrawer<'_>> {
        FrameDrawer::new(self.graph, &self.layout, &self.config.style)
    }

    /// Pixel size of every frame.
    pub fn canvas(&self) -> FamflowResult<Canvas> {
        Ok(self.drawer()?.canvas())
    }

    /// Draw the instant `t` seconds into the animation.
    pub fn render_frame_at(&self, t: f64) -> FamflowResult<FrameRGBA> {
        let drawer = self.drawer()?;
        let mut painter = CpuPainter::new(drawer.canvas(), self.font.clone())?;
        drawer.draw_state(&mut painter, &self.timeline.state_at(t))
    }
}

/// Draw a single frame of the flow animation at `t` seconds.
pub fn render_flow_frame(anim: &FlowAnimation<'_>, t: f64) -> FamflowResult<FrameRGBA> {
    if !t.is_finite() || t < 0.0 {
        return Err(FamflowError::validation(format!(
            "frame time must be finite and >= 0, got {t}"
        )));
    }
    anim.render_frame_at(t)
}

/// Render every frame of the flow animation into `sink`, in increasing frame order.
#[tracing::instrument(skip_all, fields(parallel = threading.parallel))]
pub fn render_flow(
    anim: &FlowAnimation<'_>,
    sink: &mut dyn FrameSink,
    threading: &RenderThreading,
) -> FamflowResult<RenderStats> {
    let fps = anim.fps()?;
    let total = anim.frame_count()?;
    let drawer = anim.drawer()?;
    let canvas = drawer.canvas();
    let chunk_size = normalized_chunk_size(threading.chunk_size);

    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps,
    })?;
    let mut stats = RenderStats::default();

    if !threading.parallel {
        let mut painter = CpuPainter::new(canvas, anim.font.clone())?;
        for f in 0..total {
            let state = anim.timeline.state_at(fps.frame_time_secs(FrameIndex(f)));
            let frame = drawer.draw_state(&mut painter, &state)?;
            sink.push_frame(FrameIndex(f), &frame)?;
            stats.frames_total += 1;
            stats.frames_rendered += 1;
        }
        sink.end()?;
        tracing::info!(frames = stats.frames_total, "flow animation rendered");
        return Ok(stats);
    }

    let pool = build_thread_pool(threading.threads)?;
    let mut chunk_start = 0u64;
    while chunk_start < total {
        let chunk_end = (chunk_start + chunk_size).min(total);
        let indices: Vec<u64> = (chunk_start..chunk_end).collect();
        let rendered = pool.install(|| {
            indices
                .par_iter()
                .map_init(
                    || CpuPainter::new(canvas, anim.font.clone()),
                    |painter, f| -> FamflowResult<FrameRGBA> {
                        let painter = painter
                            .as_mut()
                            .map_err(|e| FamflowError::evaluation(e.to_string()))?;
                        let state = anim.timeline.state_at(fps.frame_time_secs(FrameIndex(*f)));
                        drawer.draw_state(painter, &state)
                    },
                )
                .collect::<Vec<_>>()
        });
        for (f, frame) in (chunk_start..chunk_end).zip(rendered) {
            sink.push_frame(FrameIndex(f), &frame?)?;
            stats.frames_total += 1;
            stats.frames_rendered += 1;
        }
        chunk_start = chunk_end;
    }

    sink.end()?;
    tracing::info!(frames = stats.frames_total, "flow animation rendered");
    Ok(stats)
}

/// Per-generation stills, each revealed with a crossfade.
///
/// Still `g` shows everyone at depth `<= g` with its own layout, centered on the largest
/// canvas. Still `i` starts fading in at `i × scene_duration` and is fully shown
/// `fade_duration` later; the video lasts `n × scene_duration + fade_duration`.
pub struct GenerationReveal {
    stills: Vec<FrameRGBA>,
    background: [u8; 3],
    scene_duration: f64,
    fade_duration: f64,
}

impl GenerationReveal {
    /// Lay out and draw one still per generation prefix.
    #[tracing::instrument(skip_all, fields(people = graph.len()))]
    pub fn prepare(
        graph: &FamilyGraph,
        solver: &dyn LayoutSolver,
        config: &AppConfig,
    ) -> FamflowResult<Self> {
        config.validate()?;
        if graph.is_empty() {
            return Err(FamflowError::validation("cannot animate an empty family"));
        }
        let generations = resolve_generations(graph);
        let params = config.layout_params();
        let font = load_font(&config.style.dimensions)?;

        let mut stills = Vec::new();
        for depth in 0..=generations.max_depth() {
            let visible = prefix(&generations, depth);
            let layout = compute_layout(graph, &generations, &visible, solver, &params)?;
            let drawer = FrameDrawer::new(graph, &layout, &config.style)?;
            let mut painter = CpuPainter::new(drawer.canvas(), font.clone())?;
            stills.push(drawer.draw_full(&mut painter)?);
            tracing::debug!(depth, people = visible.len(), "generation still drawn");
        }

        let bg = config.style.colors.background;
        let background = [bg.r, bg.g, bg.b];
        let width = stills.iter().map(|s| s.width).max().unwrap_or(2);
        let height = stills.iter().map(|s| s.height).max().unwrap_or(2);
        let stills = stills
            .into_iter()
            .map(|s| {
                let mut canvas = FrameRGBA::solid(width, height, background);
                canvas.blit(&s, (width - s.width) / 2, (height - s.height) / 2);
                canvas
            })
            .collect();

        Ok(Self {
            stills,
            background,
            scene_duration: config.animation.scene_duration,
            fade_duration: config.animation.fade_duration,
        })
    }

    /// Centered stills, shallowest generation first.
    pub fn stills(&self) -> &[FrameRGBA] {
        &self.stills
    }

    /// Common canvas of every still.
    pub fn canvas(&self) -> Canvas {
        self.stills.first().map_or(
            Canvas {
                width: 2,
                height: 2,
            },
            |s| Canvas {
                width: s.width,
                height: s.height,
            },
        )
    }

    /// `n × scene_duration + fade_duration`.
    pub fn duration_secs(&self) -> f64 {
        self.stills.len() as f64 * self.scene_duration + self.fade_duration
    }

    fn opacity(&self, i: usize, t: f64) -> f64 {
        let start = i as f64 * self.scene_duration;
        if t < start {
            0.0
        } else if self.fade_duration <= 0.0 {
            1.0
        } else {
            ((t - start) / self.fade_duration).min(1.0)
        }
    }

    /// Composite the instant `t` seconds in.
    pub fn frame_at(&self, t: f64) -> FamflowResult<FrameRGBA> {
        let canvas = self.canvas();
        let shown: Vec<(usize, f64)> = (0..self.stills.len())
            .map(|i| (i, self.opacity(i, t)))
            .filter(|(_, a)| *a > 0.0)
            .collect();
        let base_from = shown.iter().rposition(|(_, a)| *a >= 1.0);

        let mut out = match base_from {
            Some(k) => self.stills[shown[k].0].clone(),
            None => FrameRGBA::solid(canvas.width, canvas.height, self.background),
        };
        let rest = base_from.map_or(0, |k| k + 1);
        for &(i, a) in &shown[rest..] {
            out = out.blend(&self.stills[i], a)?;
        }
        Ok(out)
    }
}

fn prefix(generations: &GenerationMap, depth: u32) -> BTreeSet<PersonId> {
    generations
        .iter()
        .filter(|(_, d)| *d <= depth)
        .map(|(id, _)| id)
        .collect()
}

/// Render the per-generation crossfade animation into `sink`.
#[tracing::instrument(skip_all, fields(people = graph.len()))]
pub fn render_generation_reveal(
    graph: &FamilyGraph,
    solver: &dyn LayoutSolver,
    config: &AppConfig,
    sink: &mut dyn FrameSink,
) -> FamflowResult<RenderStats> {
    let reveal = GenerationReveal::prepare(graph, solver, config)?;
    let fps = config.fps()?;
    let total = fps.secs_to_frames_ceil(reveal.duration_secs());
    let canvas = reveal.canvas();

    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps,
    })?;
    let mut stats = RenderStats {
        frames_total: 0,
        frames_rendered: reveal.stills().len() as u64,
    };
    for f in 0..total {
        let frame = reveal.frame_at(fps.frame_time_secs(FrameIndex(f)))?;
        sink.push_frame(FrameIndex(f), &frame)?;
        stats.frames_total += 1;
    }
    sink.end()?;
    tracing::info!(
        frames = stats.frames_total,
        generations = reveal.stills().len(),
        "generation reveal rendered"
    );
    Ok(stats)
}

fn build_thread_pool(threads: Option<usize>) -> FamflowResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FamflowError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FamflowError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
