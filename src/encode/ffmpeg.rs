use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, Rgb8};
use crate::foundation::error::{FamflowError, FamflowResult};
use crate::render::backend::FrameRGBA;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Color that transparent pixels are flattened onto.
    pub background: Rgb8,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Rgb8::new(0, 0, 0),
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw `rgb24` frames to its stdin.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> FamflowResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(FamflowError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(FamflowError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(FamflowError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(FamflowError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(FamflowError::evaluation(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if self.opts.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args([
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);
        tracing::debug!(out = %self.opts.out_path.display(), width = cfg.width, height = cfg.height, "spawning ffmpeg");

        let mut child = cmd.spawn().map_err(|e| {
            FamflowError::evaluation(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| FamflowError::evaluation("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| FamflowError::evaluation("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 3];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> FamflowResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| FamflowError::evaluation("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(FamflowError::evaluation(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(FamflowError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        flatten_to_rgb24(&mut self.scratch, frame, self.opts.background)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(FamflowError::evaluation("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            FamflowError::evaluation(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> FamflowResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| FamflowError::evaluation("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            FamflowError::evaluation(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| FamflowError::evaluation("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| FamflowError::evaluation(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(FamflowError::evaluation(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        tracing::info!(out = %self.opts.out_path.display(), frames = self.last_idx.map_or(0, |i| i.0 + 1), "video encoded");
        self.cfg = None;
        Ok(())
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // rawvideo input takes its rate from `-r` before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// Drop alpha from an RGBA8 frame, compositing premultiplied pixels over `bg`.
fn flatten_to_rgb24(dst: &mut [u8], frame: &FrameRGBA, bg: Rgb8) -> FamflowResult<()> {
    let px = dst.len() / 3;
    if dst.len() % 3 != 0 || frame.data.len() != px * 4 {
        return Err(FamflowError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }

    let bg = [u32::from(bg.r), u32::from(bg.g), u32::from(bg.b)];
    for (d, s) in dst.chunks_exact_mut(3).zip(frame.data.chunks_exact(4)) {
        let a = u32::from(s[3]);
        if a == 255 {
            d.copy_from_slice(&s[..3]);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let src = if frame.premultiplied {
                u32::from(s[c])
            } else {
                mul_div255(u32::from(s[c]), a)
            };
            d[c] = (src + mul_div255(bg[c], inv)).min(255) as u8;
        }
    }
    Ok(())
}

fn mul_div255(x: u32, y: u32) -> u32 {
    let t = x * y + 128;
    (t + (t >> 8)) >> 8
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> FamflowResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
