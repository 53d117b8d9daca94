/// Events emitted by the decoy generation pipeline.
#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards pipeline events to an optional callback.
///
/// The default reporter swallows everything, so library callers pay nothing
/// unless they ask for feedback. The convenience methods keep workflow code
/// free of enum construction noise.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    pub fn start_phase(&self, name: &'static str) {
        self.report(Progress::PhaseStart { name });
    }

    pub fn finish_phase(&self) {
        self.report(Progress::PhaseFinish);
    }

    pub fn start_task(&self, total_steps: u64) {
        self.report(Progress::TaskStart { total_steps });
    }

    pub fn advance(&self) {
        self.report(Progress::TaskIncrement);
    }

    pub fn finish_task(&self) {
        self.report(Progress::TaskFinish);
    }

    pub fn message(&self, text: impl Into<String>) {
        self.report(Progress::Message(text.into()));
    }
}
