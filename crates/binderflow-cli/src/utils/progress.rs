use binderflow::engine::progress::{Progress, ProgressCallback};
use binderflow::engine::state::JobStage;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 100;

/// Console rendering of workflow progress: a spinner while a phase runs, a bar while
/// fan-out submits one job per design, and a line per lifecycle stage change.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(None, target).with_style(spinner_style());
        pb.finish_and_clear();
        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = self.pb.clone();
        Box::new(move |event: Progress| match pb.lock() {
            Ok(pb) => apply(&pb, event),
            Err(_) => warn!("Progress display lock was poisoned; dropping update."),
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn apply(pb: &ProgressBar, event: Progress) {
    match event {
        Progress::PhaseStart { name } => {
            pb.reset();
            pb.set_length(0);
            pb.set_style(spinner_style());
            pb.set_message(name);
            pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
        }
        Progress::PhaseFinish => {
            pb.disable_steady_tick();
            pb.finish_and_clear();
        }
        Progress::TaskStart { total_steps } => {
            pb.disable_steady_tick();
            pb.reset();
            pb.set_style(bar_style());
            pb.set_length(total_steps);
        }
        Progress::TaskIncrement => pb.inc(1),
        Progress::TaskFinish => {
            if let Some(len) = pb.length() {
                pb.set_position(len);
            }
        }
        Progress::StageChanged { job_name, stage } => {
            let line = format!("{} {}: {}", stage_marker(stage), job_name, stage);
            if pb.is_finished() {
                pb.set_message(line);
            } else {
                pb.println(line);
            }
        }
        Progress::Message(msg) => pb.println(format!("  {}", msg)),
    }
}

fn stage_marker(stage: JobStage) -> &'static str {
    match stage {
        JobStage::Completed => "✓",
        JobStage::Failed | JobStage::Cancelled => "✗",
        JobStage::Unknown => "?",
        _ => "·",
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg} [{bar:30.green/white}] {pos}/{len} jobs")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}
