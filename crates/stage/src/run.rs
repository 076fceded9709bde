use crate::Stage;
use std::io::Write;
use std::time::Duration;
use tweetstage_render::{DebugTextRenderer, RenderView, Renderer};

/// Owns the stage once startup is done and ticks it every frame.
pub trait RunLoop {
    type Error;

    fn run(self, stage: Stage) -> Result<(), Self::Error>;
}

/// Windowless loop on a fixed time step, dumping frames as text.
///
/// Simulated time advances by `1 / fps` per frame. With `realtime` set the
/// loop also sleeps that long, otherwise it runs as fast as it can.
#[derive(Debug)]
pub struct HeadlessLoop<W> {
    /// Stop after this many frames; `None` runs until the process exits.
    pub frames: Option<u64>,
    pub fps: f64,
    /// Write a frame dump every `report_every` frames; 0 disables dumps.
    pub report_every: u64,
    pub realtime: bool,
    out: W,
}

impl<W: Write> HeadlessLoop<W> {
    pub fn new(out: W) -> Self {
        Self {
            frames: None,
            fps: 60.0,
            report_every: 60,
            realtime: false,
            out,
        }
    }

    pub fn frames(mut self, frames: u64) -> Self {
        self.frames = Some(frames);
        self
    }

    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn report_every(mut self, frames: u64) -> Self {
        self.report_every = frames;
        self
    }

    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn dt(&self) -> f64 {
        if self.fps.is_finite() && self.fps > 0.0 {
            1.0 / self.fps
        } else {
            0.0
        }
    }

    /// Like [`RunLoop::run`], but hands the writer back afterwards.
    pub fn run_to_end(mut self, mut stage: Stage) -> std::io::Result<W> {
        let dt = self.dt();
        let renderer = DebugTextRenderer::new();
        tracing::info!(frames = ?self.frames, fps = self.fps, "headless loop started");

        let mut frame = 0u64;
        while self.frames.is_none_or(|limit| frame < limit) {
            stage.tick(dt);
            frame += 1;

            let last = self.frames == Some(frame);
            if self.report_every > 0 && (frame % self.report_every == 0 || last) {
                let view = RenderView::from_scene(stage.scene());
                writeln!(self.out, "--- frame {frame} t={:.3}s", stage.tasks().clock())?;
                self.out
                    .write_all(renderer.render(stage.scene(), &view).as_bytes())?;
            }
            if self.realtime && dt > 0.0 {
                std::thread::sleep(Duration::from_secs_f64(dt));
            }
        }

        self.out.flush()?;
        tracing::info!(frames = frame, "headless loop finished");
        Ok(self.out)
    }
}

impl<W: Write> RunLoop for HeadlessLoop<W> {
    type Error = std::io::Error;

    fn run(self, stage: Stage) -> Result<(), Self::Error> {
        self.run_to_end(stage).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tweetstage_assets::ModelLoader;

    fn stage() -> Stage {
        Stage::new(ModelLoader::new("unused")).unwrap()
    }

    #[test]
    fn runs_the_requested_number_of_frames() {
        let out = HeadlessLoop::new(Vec::new())
            .frames(5)
            .fps(10.0)
            .report_every(2)
            .run_to_end(stage())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let dumps: Vec<&str> = text.lines().filter(|l| l.starts_with("--- frame")).collect();
        assert_eq!(dumps, vec!["--- frame 2 t=0.200s", "--- frame 4 t=0.400s", "--- frame 5 t=0.500s"]);
        assert!(text.contains("=== Scene (nodes=2, overlays=0) ==="));
    }

    #[test]
    fn silent_when_reports_disabled() {
        let out = HeadlessLoop::new(Vec::new())
            .frames(3)
            .report_every(0)
            .run_to_end(stage())
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn bad_fps_freezes_time() {
        let looper = HeadlessLoop::new(Vec::new()).fps(0.0);
        assert_eq!(looper.dt(), 0.0);
        let looper = HeadlessLoop::new(Vec::new()).fps(f64::NAN);
        assert_eq!(looper.dt(), 0.0);
    }

    #[test]
    fn orchestrator_hands_over_the_stage() {
        let orch = crate::Orchestrator::new(stage(), crate::StageConfig::default());
        let looper = HeadlessLoop::new(std::io::sink()).frames(1);
        orch.run(looper).unwrap();
    }
}
