use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::gitlab::DetailObserver;

/// Progress indication for the two-phase run-time report: list, then fetch
/// each pipeline's details.
pub struct DetailProgress {
    pb: ProgressBar,
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn counted(count: usize) -> ProgressBar {
    let pb = ProgressBar::new(count as u64);
    pb.set_draw_target(ProgressDrawTarget::stderr());
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:30}] {pos}/{len}")
    {
        pb.set_style(style);
    }
    pb.set_message("Phase 2/2: Fetching pipeline details");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

impl DetailProgress {
    /// Phase 1: listing pipelines of a project
    pub fn start(project_id: u64) -> Self {
        Self {
            pb: spinner(format!(
                "Phase 1/2: Fetching pipelines of project {project_id}..."
            )),
        }
    }

    /// Hidden bar, for JSON output
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }
}

impl DetailObserver for DetailProgress {
    fn listed(&mut self, count: usize) {
        self.pb
            .finish_with_message(format!("✓ Phase 1/2: Fetched {count} pipelines"));
        self.pb = if self.pb.is_hidden() {
            ProgressBar::hidden()
        } else {
            counted(count)
        };
    }

    fn fetched(&mut self) {
        self.pb.inc(1);
    }

    fn finished(&mut self, timed: usize) {
        self.pb.finish_with_message(format!(
            "✓ Phase 2/2: {timed} pipelines have run times"
        ));
    }
}

impl Drop for DetailProgress {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.abandon();
        }
    }
}
