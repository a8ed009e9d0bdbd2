use std::io::Write as _;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::foundation::core::Point;
use crate::foundation::error::{FamflowError, FamflowResult};
use crate::layout::graph::NodeKey;
use crate::layout::request::{LayoutHints, LayoutRequest};

/// Solver output in its native unit (inches for Graphviz) with y growing upward.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawLayout {
    /// Scale factor reported by the solver; coordinates already include it.
    pub scale: f64,
    /// Drawing width.
    pub width: f64,
    /// Drawing height.
    pub height: f64,
    /// Laid out nodes.
    pub nodes: Vec<RawNode>,
    /// Routed edges.
    pub edges: Vec<RawEdge>,
}

/// One node of a [`RawLayout`].
#[derive(Clone, Debug, PartialEq)]
pub struct RawNode {
    /// Node key.
    pub key: NodeKey,
    /// Center x.
    pub x: f64,
    /// Center y (upward axis).
    pub y: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
}

/// One edge of a [`RawLayout`].
#[derive(Clone, Debug, PartialEq)]
pub struct RawEdge {
    /// Tail node.
    pub tail: NodeKey,
    /// Head node.
    pub head: NodeKey,
    /// Control points (upward axis).
    pub points: Vec<Point>,
}

/// External graph layout engine.
pub trait LayoutSolver: Send + Sync {
    /// Lay out `request`. Any failure is fatal for the render.
    fn solve(&self, request: &LayoutRequest, hints: &LayoutHints) -> FamflowResult<RawLayout>;
}

/// Graphviz-backed solver: runs `<program> -Tplain` on a temporary DOT file.
#[derive(Clone, Debug)]
pub struct GraphvizSolver {
    program: String,
}

impl Default for GraphvizSolver {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl GraphvizSolver {
    /// Use the Graphviz layout `program` (usually `dot`) found on `PATH`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Program name this solver invokes.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Return `true` when the program can be invoked.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-V")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Let Graphviz draw `request` itself in `format` (`png`, `svg`, ...) to `out`.
    pub fn render_to_file(
        &self,
        request: &LayoutRequest,
        hints: &LayoutHints,
        format: &str,
        out: &Path,
    ) -> FamflowResult<()> {
        crate::encode::ffmpeg::ensure_parent_dir(out)?;
        let out_arg = format!("-o{}", out.display());
        self.run(request, hints, &[&format!("-T{format}"), &out_arg])?;
        Ok(())
    }

    fn run(
        &self,
        request: &LayoutRequest,
        hints: &LayoutHints,
        args: &[&str],
    ) -> FamflowResult<Vec<u8>> {
        // Removed when dropped, on success and failure alike.
        let mut file = tempfile::Builder::new()
            .prefix("famflow-")
            .suffix(".gv")
            .tempfile()
            .map_err(|e| FamflowError::layout(format!("failed to create DOT file: {e}")))?;
        file.write_all(request.to_dot(hints).as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| FamflowError::layout(format!("failed to write DOT file: {e}")))?;

        tracing::debug!(program = %self.program, ?args, dot = %file.path().display(), "running layout solver");
        let output = Command::new(&self.program)
            .args(args)
            .arg(file.path())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                FamflowError::layout(format!(
                    "failed to spawn '{}' (is Graphviz installed and on PATH?): {e}",
                    self.program
                ))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FamflowError::layout(format!(
                "'{}' exited with status {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}

impl LayoutSolver for GraphvizSolver {
    #[tracing::instrument(skip(self, request, hints), fields(nodes = request.nodes.len(), edges = request.edges.len()))]
    fn solve(&self, request: &LayoutRequest, hints: &LayoutHints) -> FamflowResult<RawLayout> {
        let stdout = self.run(request, hints, &["-Tplain"])?;
        let text = String::from_utf8(stdout)
            .map_err(|e| FamflowError::layout(format!("solver output is not UTF-8: {e}")))?;
        parse_plain(&text)
    }
}

/// Parse Graphviz `plain` output.
///
/// Recognised lines: `graph scale w h`, `node name x y w h ...`,
/// `edge tail head n x1 y1 .. xn yn ...`, and `stop`. Anything after `stop` is ignored.
pub fn parse_plain(text: &str) -> FamflowResult<RawLayout> {
    let mut layout: Option<RawLayout> = None;

    for (lineno, line) in text.lines().enumerate() {
        let parts = split_plain_line(line);
        let Some(kind) = parts.first() else {
            continue;
        };
        let at = |what: &str| format!("line {}: {what}", lineno + 1);

        match kind.as_str() {
            "graph" => {
                if parts.len() < 4 {
                    return Err(FamflowError::layout(at("truncated graph line")));
                }
                layout = Some(RawLayout {
                    scale: number(&parts[1], lineno)?,
                    width: number(&parts[2], lineno)?,
                    height: number(&parts[3], lineno)?,
                    ..RawLayout::default()
                });
            }
            "node" => {
                let Some(l) = layout.as_mut() else {
                    return Err(FamflowError::layout(at("node before graph header")));
                };
                if parts.len() < 6 {
                    return Err(FamflowError::layout(at("truncated node line")));
                }
                l.nodes.push(RawNode {
                    key: parts[1].parse()?,
                    x: number(&parts[2], lineno)?,
                    y: number(&parts[3], lineno)?,
                    width: number(&parts[4], lineno)?,
                    height: number(&parts[5], lineno)?,
                });
            }
            "edge" => {
                let Some(l) = layout.as_mut() else {
                    return Err(FamflowError::layout(at("edge before graph header")));
                };
                if parts.len() < 4 {
                    return Err(FamflowError::layout(at("truncated edge line")));
                }
                let n: usize = parts[3]
                    .parse()
                    .map_err(|_| FamflowError::layout(at("bad edge point count")))?;
                if parts.len() < 4 + 2 * n {
                    return Err(FamflowError::layout(at(&format!(
                        "edge declares {n} points but carries fewer"
                    ))));
                }
                let points = (0..n)
                    .map(|i| -> FamflowResult<Point> {
                        Ok(Point::new(
                            number(&parts[4 + 2 * i], lineno)?,
                            number(&parts[5 + 2 * i], lineno)?,
                        ))
                    })
                    .collect::<FamflowResult<Vec<_>>>()?;
                l.edges.push(RawEdge {
                    tail: parts[1].parse()?,
                    head: parts[2].parse()?,
                    points,
                });
            }
            "stop" => break,
            other => {
                tracing::trace!(kind = other, "skipping plain output line");
            }
        }
    }

    layout.ok_or_else(|| FamflowError::layout("solver output has no graph header"))
}

fn number(s: &str, lineno: usize) -> FamflowResult<f64> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FamflowError::layout(format!("line {}: bad number '{s}'", lineno + 1)))
}

/// Whitespace split that keeps double-quoted fields (labels) intact.
fn split_plain_line(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    for c in line.chars() {
        if in_quotes {
            cur.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
        } else if c.is_whitespace() {
            if !cur.is_empty() {
                out.push(std::mem::take(&mut cur));
            }
        } else {
            if c == '"' {
                in_quotes = true;
            }
            cur.push(c);
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/layout/solver.rs"]
mod tests;
