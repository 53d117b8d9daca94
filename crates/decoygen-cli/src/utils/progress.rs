use decoygen::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Renders pipeline progress events as an indicatif spinner/bar on stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: ProgressBar,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0)
            .with_style(Self::spinner_style())
            .with_message("Initializing...");
        bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        bar.disable_steady_tick();
        bar.finish_and_clear();

        Self { bar }
    }

    /// A callback suitable for `ProgressReporter::with_callback`. The
    /// returned closure shares this handler's progress bar.
    pub fn callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();

        Box::new(move |progress: Progress| match progress {
            Progress::PhaseStart { name } => {
                bar.reset();
                bar.set_length(0);
                bar.set_style(Self::spinner_style());
                bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                bar.set_message(name.to_string());
            }
            Progress::PhaseFinish => {
                bar.disable_steady_tick();
                bar.finish_with_message("✓ Done");
            }
            Progress::TaskStart { total_steps } => {
                bar.disable_steady_tick();
                bar.reset();
                bar.set_length(total_steps);
                bar.set_position(0);
                bar.set_style(Self::bar_style());
                bar.set_message("Writing decoys");
            }
            Progress::TaskIncrement => {
                bar.inc(1);
            }
            Progress::TaskFinish => {
                if bar.position() < bar.length().unwrap_or(0) {
                    bar.set_position(bar.length().unwrap_or(0));
                }
                bar.finish();
            }
            Progress::Message(msg) => {
                if !bar.is_finished() {
                    bar.println(format!("  {}", msg));
                } else {
                    bar.set_message(msg);
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<16} [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("Failed to create bar style template")
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
