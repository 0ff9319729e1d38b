use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// Schedule another frame.
    Continue,
    /// The loop was cancelled; nothing was drawn.
    Stopped,
}

/// Frame bookkeeping for the per-frame task. The host keeps asking for
/// frames for as long as `begin_frame` hands one out.
pub struct RenderLoop {
    token: CancellationToken,
    frame_count: u64,

    fps: f32,
    fps_frames: u32,
    fps_timer: Instant,
}

impl RenderLoop {
    pub fn new(token: CancellationToken) -> Self {
        let now = Instant::now();
        Self {
            token,
            frame_count: 0,
            fps: 0.0,
            fps_frames: 0,
            fps_timer: now,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Hands out the next frame index, or `None` once cancelled.
    pub fn begin_frame(&mut self) -> Option<u64> {
        if self.token.is_cancelled() {
            return None;
        }

        let now = Instant::now();

        self.fps_frames += 1;
        let elapsed = self.fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.fps_frames as f32 / elapsed;
            self.fps_frames = 0;
            self.fps_timer = now;
        }

        let index = self.frame_count;
        self.frame_count += 1;
        Some(index)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}
