//! Per-stage status, current step and overall status.

use serde::Serialize;

use crate::core::vocabulary::ERROR_MARKER;
use crate::core::{
    pipeline_stages, OverallStatus, StageDefinition, StageId, StageStatus, StepEvent,
};

/// Derived state of one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageProgress {
    /// The stage id.
    pub id: StageId,
    /// Derived status.
    pub status: StageStatus,
    /// Number of events matching the stage.
    pub matched: usize,
    /// The most recent event matching the stage.
    pub latest_event: Option<StepEvent>,
}

/// Derived state of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineProgress {
    /// One entry per stage, in pipeline order.
    pub stages: Vec<StageProgress>,
    /// Index of the stage to focus, if any.
    pub current_step: Option<usize>,
    /// Aggregate status.
    pub overall: OverallStatus,
}

impl PipelineProgress {
    /// Returns the progress of a stage.
    #[must_use]
    pub fn stage(&self, id: StageId) -> Option<&StageProgress> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Returns the status of a stage, `Pending` if unknown.
    #[must_use]
    pub fn status_of(&self, id: StageId) -> StageStatus {
        self.stage(id).map_or(StageStatus::Pending, |s| s.status)
    }

    /// Returns the id of the focused stage, if any.
    #[must_use]
    pub fn current_stage(&self) -> Option<StageId> {
        self.current_step
            .and_then(|i| self.stages.get(i))
            .map(|s| s.id)
    }

    /// Returns the number of completed stages.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|s| s.status == StageStatus::Completed)
            .count()
    }
}

/// Derives stage statuses from a step event log by label matching.
#[derive(Debug, Clone)]
pub struct StageStatusDeriver {
    stages: &'static [StageDefinition],
}

impl Default for StageStatusDeriver {
    fn default() -> Self {
        Self::new(pipeline_stages())
    }
}

impl StageStatusDeriver {
    /// Creates a deriver over a stage table.
    #[must_use]
    pub fn new(stages: &'static [StageDefinition]) -> Self {
        Self { stages }
    }

    /// Returns the stage table.
    #[must_use]
    pub fn stages(&self) -> &'static [StageDefinition] {
        self.stages
    }

    /// Derives the status of a single stage.
    ///
    /// Error wins over completion, completion over activity. Stages are
    /// evaluated independently, so an event may count toward several.
    #[must_use]
    pub fn stage_status(&self, stage: &StageDefinition, events: &[StepEvent]) -> StageStatus {
        let mut matched = events.iter().filter(|e| stage.matches(&e.label)).peekable();
        if matched.peek().is_none() {
            return StageStatus::Pending;
        }

        let mut completed = false;
        for event in matched {
            if event.label_contains(ERROR_MARKER) || event.has_error_status() {
                return StageStatus::Error;
            }
            completed |= stage.is_completion(&event.label);
        }

        if completed {
            StageStatus::Completed
        } else {
            StageStatus::Active
        }
    }

    /// Derives the progress of a whole run.
    #[must_use]
    pub fn derive(&self, events: &[StepEvent], in_flight: bool) -> PipelineProgress {
        let stages: Vec<StageProgress> = self
            .stages
            .iter()
            .map(|stage| {
                let matching: Vec<&StepEvent> =
                    events.iter().filter(|e| stage.matches(&e.label)).collect();
                StageProgress {
                    id: stage.id,
                    status: self.stage_status(stage, events),
                    matched: matching.len(),
                    latest_event: matching.last().map(|e| (*e).clone()),
                }
            })
            .collect();

        let statuses: Vec<StageStatus> = stages.iter().map(|s| s.status).collect();
        PipelineProgress {
            current_step: current_step(&statuses, in_flight),
            overall: overall_status(&statuses, in_flight),
            stages,
        }
    }
}

/// Selects the stage to focus.
///
/// The first active stage wins. Otherwise the stage before the first pending
/// one (the last attempted), clamped to the first. With no pending stage the
/// last completed one is chosen. Failing all of that, the first stage while a
/// run is in flight, else none.
#[must_use]
pub fn current_step(statuses: &[StageStatus], in_flight: bool) -> Option<usize> {
    for (i, status) in statuses.iter().enumerate() {
        match status {
            StageStatus::Active => return Some(i),
            StageStatus::Pending => return Some(i.saturating_sub(1)),
            _ => {}
        }
    }

    if let Some(i) = statuses.iter().rposition(|s| *s == StageStatus::Completed) {
        return Some(i);
    }

    in_flight.then_some(0)
}

/// Aggregates stage statuses into the run status.
#[must_use]
pub fn overall_status(statuses: &[StageStatus], in_flight: bool) -> OverallStatus {
    if statuses.contains(&StageStatus::Error) {
        OverallStatus::Error
    } else if !statuses.is_empty() && statuses.iter().all(|s| *s == StageStatus::Completed) {
        OverallStatus::Completed
    } else if in_flight {
        OverallStatus::InProgress
    } else {
        OverallStatus::Idle
    }
}
