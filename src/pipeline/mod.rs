//! Mutation Pipeline
//!
//! Ordered transform steps applied to a candidate record before validation.
//! Steps receive the previous step's output by value and return the next
//! record, so the caller's record is never touched.
//!
//! Either every step runs and the composed result is returned, or, when a
//! step fails under suppression, the untouched copy is returned. There is no
//! partial application.

mod errors;

pub use errors::{PipelineError, PipelineResult};

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::{BoxError, Fields};

/// One transform step
pub type Step = Arc<dyn Fn(Fields) -> Result<Fields, BoxError> + Send + Sync>;

/// Wraps a closure as a [`Step`]
pub fn step<F>(f: F) -> Step
where
    F: Fn(Fields) -> Result<Fields, BoxError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Runs `steps` in order over a copy of `record`.
///
/// # Errors
///
/// Returns `PipelineError::StepFailure` if a step fails and
/// `suppress_errors` is false. With suppression on, the failure is logged
/// and the unmodified copy is returned instead.
pub fn apply<'a, I>(record: &Fields, steps: I, suppress_errors: bool) -> PipelineResult<Fields>
where
    I: IntoIterator<Item = &'a Step>,
{
    let mut applied = record.clone();

    for (index, step) in steps.into_iter().enumerate() {
        match step(applied) {
            Ok(next) => applied = next,
            Err(e) => {
                if !suppress_errors {
                    return Err(PipelineError::StepFailure {
                        index,
                        message: e.to_string(),
                    });
                }
                warn!(
                    event = "PIPELINE_STEP_FAILED",
                    index,
                    error = %e,
                    "step failed, using the original record"
                );
                return Ok(record.clone());
            }
        }
    }

    Ok(applied)
}

/// The table's own ordered list of steps
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step to the end of the pipeline
    pub fn with_step<F>(mut self, f: F) -> Self
    where
        F: Fn(Fields) -> Result<Fields, BoxError> + Send + Sync + 'static,
    {
        self.steps.push(Arc::new(f));
        self
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Runs the pipeline's steps followed by `extra`
    pub fn run(&self, record: &Fields, extra: &[Step], suppress_errors: bool) -> PipelineResult<Fields> {
        apply(record, self.steps.iter().chain(extra), suppress_errors)
    }

    /// Get the number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("steps", &self.steps.len()).finish()
    }
}
