//! Per-session coordinator state.

use super::artifacts::{Artifact, FinalOutput, PlanAdjustment, ProgressReport, ProjectPlan};
use super::phase::{CoordinatorPhase, PhaseMachine, PhaseTransitionError};
use crate::agent::archetype::CoordinatorArchetype;
use serde::{Deserialize, Serialize};

/// Artifacts a coordinator has produced so far, plus its phase machine.
///
/// The plan is written once by PLANNING and afterwards only changed through
/// [`record_adjustment`](Self::record_adjustment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorRecord {
    pub name: String,
    pub archetype: CoordinatorArchetype,
    phases: PhaseMachine,
    plan: Option<Artifact<ProjectPlan>>,
    progress_reports: Vec<Artifact<ProgressReport>>,
    adjustments: Vec<Artifact<PlanAdjustment>>,
    summary: Option<Artifact<String>>,
    final_output: Option<FinalOutput>,
}

impl CoordinatorRecord {
    pub fn new(name: impl Into<String>, archetype: CoordinatorArchetype, total_rounds: usize) -> Self {
        Self {
            name: name.into(),
            archetype,
            phases: PhaseMachine::new(total_rounds),
            plan: None,
            progress_reports: Vec::new(),
            adjustments: Vec::new(),
            summary: None,
            final_output: None,
        }
    }

    pub fn enter(
        &mut self,
        phase: CoordinatorPhase,
        round: Option<usize>,
    ) -> Result<(), PhaseTransitionError> {
        self.phases.advance(phase, round)
    }

    pub fn phases(&self) -> &PhaseMachine {
        &self.phases
    }

    pub fn set_plan(&mut self, plan: Artifact<ProjectPlan>) {
        if self.plan.is_none() {
            self.plan = Some(plan);
        }
    }

    pub fn record_report(&mut self, report: Artifact<ProgressReport>) {
        self.progress_reports.push(report);
    }

    /// Store the adjustment and apply it to a parsed plan. Returns the number
    /// of plan changes applied.
    pub fn record_adjustment(&mut self, adjustment: Artifact<PlanAdjustment>) -> usize {
        let applied = match (adjustment.value(), self.plan.as_mut().and_then(Artifact::value_mut)) {
            (Some(adjustment), Some(plan)) => plan.apply(adjustment),
            _ => 0,
        };
        self.adjustments.push(adjustment);
        applied
    }

    pub fn set_summary(&mut self, summary: Artifact<String>) {
        self.summary = Some(summary);
    }

    /// Compose the final output from everything recorded so far.
    pub fn compose_final(&mut self, decision: Artifact<String>) -> &FinalOutput {
        let summary = self.summary.clone().unwrap_or(Artifact::Unavailable {
            operation: "summarize".to_string(),
            cause: "no summary was produced".to_string(),
        });
        let output = FinalOutput::compose(
            self.plan.clone(),
            self.progress_reports.clone(),
            self.adjustments.clone(),
            summary,
            decision,
        );
        self.final_output.insert(output)
    }

    pub fn attach_final_response(&mut self, response: String) {
        if let Some(output) = self.final_output.as_mut() {
            output.final_response = Some(response);
        }
    }

    pub fn plan(&self) -> Option<&Artifact<ProjectPlan>> {
        self.plan.as_ref()
    }

    pub fn progress_reports(&self) -> &[Artifact<ProgressReport>] {
        &self.progress_reports
    }

    pub fn adjustments(&self) -> &[Artifact<PlanAdjustment>] {
        &self.adjustments
    }

    pub fn latest_report(&self) -> Option<&Artifact<ProgressReport>> {
        self.progress_reports.last()
    }

    pub fn latest_adjustment(&self) -> Option<&Artifact<PlanAdjustment>> {
        self.adjustments.last()
    }

    pub fn summary(&self) -> Option<&Artifact<String>> {
        self.summary.as_ref()
    }

    pub fn final_output(&self) -> Option<&FinalOutput> {
        self.final_output.as_ref()
    }

    /// Plan and latest adjustment as context for participants.
    pub fn digest(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(plan) = self.plan.as_ref().and_then(Artifact::value) {
            parts.push(plan.digest());
        }
        if let Some(report) = self.latest_report().and_then(Artifact::value) {
            parts.push(report.digest());
        }
        if let Some(adjustment) = self.latest_adjustment().and_then(Artifact::value)
            && !adjustment.is_empty()
        {
            parts.push(adjustment.digest());
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}
