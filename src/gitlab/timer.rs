use std::time::Instant;

use log::{debug, info};

/// Logs how long a scope took when it is dropped.
///
/// Requests are reported at `debug`, whole operations at `info`.
pub struct ScopedTimer {
    label: String,
    started: Instant,
    operation: bool,
}

impl ScopedTimer {
    pub fn request(label: impl Into<String>) -> Self {
        Self::start(label.into(), false)
    }

    pub fn operation(label: impl Into<String>) -> Self {
        Self::start(label.into(), true)
    }

    fn start(label: String, operation: bool) -> Self {
        Self {
            label,
            started: Instant::now(),
            operation,
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed().as_secs_f64();
        if self.operation {
            info!("Task '{}' completed in {elapsed:.2}s", self.label);
        } else {
            debug!("{} took {elapsed:.3}s", self.label);
        }
    }
}
