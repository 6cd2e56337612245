/// Events a workflow emits while it runs.
///
/// A run is a sequence of named phases. The sampling phase additionally
/// announces how many steps it will take, reports them as they complete and
/// publishes the energy at every report interval.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    StepsStart { total: u64 },
    StepsDone { steps: u64 },
    StepsFinish,

    /// Total energy after `step` production steps.
    Energy { step: usize, energy: f64 },
    /// A condition the user should see even with logging turned down.
    Warning(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    /// A reporter that drops every event.
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

    /// Reports `steps` completed steps, skipping empty chunks.
    pub fn steps_done(&self, steps: usize) {
        if steps > 0 {
            self.report(Progress::StepsDone {
                steps: steps as u64,
            });
        }
    }
}
