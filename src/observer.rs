//! Observer hooks for solver runs
//!
//! Observers decouple training loops from reporting. Solvers emit coarse
//! progress events plus the rare anomaly events (skipped states, aborted
//! episodes) that callers may want to surface.

use indicatif::{ProgressBar, ProgressStyle};

use crate::{Result, tictactoe::BoardState};

/// Receives notifications during a solver run. All methods default to no-ops.
pub trait TrainingObserver {
    /// Called once before work starts; `total` is the number of units
    /// (episodes for Q-learning, zero when unknown up front).
    fn on_training_start(&mut self, _total: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each completed unit of work
    fn on_progress(&mut self, _completed: usize) -> Result<()> {
        Ok(())
    }

    /// Called when a sweep skips a state it cannot evaluate
    fn on_state_skipped(&mut self, _state: &BoardState, _reason: &str) -> Result<()> {
        Ok(())
    }

    /// Called when a simulated episode stops early due to a failure
    fn on_episode_aborted(&mut self, _episode: usize, _reason: &str) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Progress bar observer - shows training progress on stderr
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self { progress_bar: None }
    }

    fn report(&self, message: String) {
        match &self.progress_bar {
            Some(pb) => pb.println(message),
            None => eprintln!("{message}"),
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingObserver for ProgressObserver {
    fn on_training_start(&mut self, total: usize) -> Result<()> {
        if total == 0 {
            return Ok(());
        }
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_progress(&mut self, completed: usize) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(completed as u64);
        }
        Ok(())
    }

    fn on_state_skipped(&mut self, state: &BoardState, reason: &str) -> Result<()> {
        self.report(format!(
            "Warning: skipped state '{}' during sweep: {reason}",
            state.encode()
        ));
        Ok(())
    }

    fn on_episode_aborted(&mut self, episode: usize, reason: &str) -> Result<()> {
        self.report(format!("Warning: episode {episode} aborted: {reason}"));
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish();
        }
        Ok(())
    }
}
