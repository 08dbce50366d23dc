//! Step-by-step record of a run, turned into an OpsRun at the audit boundary.

use chrono::{DateTime, Utc};

use opsgate_core::models::{OpsRun, RunStatus, StepDetail, StepName, StepRecord};
use opsgate_core::OpsgateResult;

/// A step executed away from the timeline, e.g. on a rayon worker.
pub struct TimedStep<T> {
    name: StepName,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    result: OpsgateResult<(T, StepDetail)>,
}

/// Run `f` and capture its timing. Attach with [`RunTimeline::absorb`].
pub fn timed<T>(name: StepName, f: impl FnOnce() -> OpsgateResult<(T, StepDetail)>) -> TimedStep<T> {
    let started_at = Utc::now();
    let result = f();
    TimedStep {
        name,
        started_at,
        completed_at: Utc::now(),
        result,
    }
}

pub struct RunTimeline {
    run_id: String,
    workflow: &'static str,
    ref_id: Option<String>,
    ref_type: Option<&'static str>,
    started_at: DateTime<Utc>,
    steps: Vec<StepRecord>,
}

impl RunTimeline {
    pub fn new(workflow: &'static str, ref_type: &'static str) -> Self {
        let started_at = Utc::now();
        Self {
            run_id: OpsRun::new_run_id(started_at),
            workflow,
            ref_id: None,
            ref_type: Some(ref_type),
            started_at,
            steps: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn workflow(&self) -> &'static str {
        self.workflow
    }

    /// The entity this run acted on.
    pub fn set_ref(&mut self, ref_id: impl Into<String>) {
        self.ref_id = Some(ref_id.into());
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Run one step in place.
    pub fn step<T>(
        &mut self,
        name: StepName,
        f: impl FnOnce() -> OpsgateResult<(T, StepDetail)>,
    ) -> OpsgateResult<T> {
        self.absorb(timed(name, f))
    }

    /// Append a step run elsewhere. A failed step keeps no `completed_at`.
    pub fn absorb<T>(&mut self, step: TimedStep<T>) -> OpsgateResult<T> {
        match step.result {
            Ok((value, detail)) => {
                self.steps.push(StepRecord {
                    name: step.name,
                    started_at: step.started_at,
                    completed_at: Some(step.completed_at),
                    detail: Some(detail),
                    error: None,
                });
                Ok(value)
            }
            Err(e) => {
                self.steps.push(StepRecord {
                    name: step.name,
                    started_at: step.started_at,
                    completed_at: None,
                    detail: None,
                    error: Some(e.to_string()),
                });
                Err(e)
            }
        }
    }

    pub fn finish(self) -> OpsRun {
        self.into_run(RunStatus::Completed, None)
    }

    pub fn fail(self, reason: impl Into<String>) -> OpsRun {
        self.into_run(RunStatus::Failed, Some(reason.into()))
    }

    fn into_run(self, status: RunStatus, error: Option<String>) -> OpsRun {
        let completed_at = Utc::now();
        OpsRun {
            run_id: self.run_id,
            workflow: self.workflow.to_string(),
            ref_id: self.ref_id,
            ref_type: self.ref_type.map(str::to_string),
            status,
            started_at: self.started_at,
            completed_at,
            duration_ms: (completed_at - self.started_at).num_milliseconds(),
            steps: self.steps,
            error,
        }
    }
}
