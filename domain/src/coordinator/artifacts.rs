//! Coordinator artifacts.
//!
//! Field names follow the JSON the coordinator is asked to produce, so the
//! validated payload deserializes directly. List fields accept either plain
//! strings or small objects; objects are flattened to `key: value; ...` text.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A structured artifact slot: validated, degraded to raw text, or missing
/// because the inference call itself failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Artifact<T> {
    Parsed {
        value: T,
        repair_cycles: usize,
    },
    Unparsed {
        raw: String,
        issues: Vec<String>,
        repair_cycles: usize,
    },
    Unavailable {
        operation: String,
        cause: String,
    },
}

impl<T> Artifact<T> {
    pub fn parsed(value: T) -> Self {
        Artifact::Parsed {
            value,
            repair_cycles: 0,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Artifact::Parsed { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match self {
            Artifact::Parsed { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, Artifact::Parsed { .. })
    }

    pub fn repair_cycles(&self) -> usize {
        match self {
            Artifact::Parsed { repair_cycles, .. } | Artifact::Unparsed { repair_cycles, .. } => {
                *repair_cycles
            }
            Artifact::Unavailable { .. } => 0,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Artifact::Parsed { .. } => "parsed",
            Artifact::Unparsed { .. } => "unparsed",
            Artifact::Unavailable { .. } => "unavailable",
        }
    }
}

impl Artifact<String> {
    /// Text of a text artifact, or a bracketed note when it is degraded.
    pub fn text(&self) -> String {
        match self {
            Artifact::Parsed { value, .. } => value.clone(),
            Artifact::Unparsed { raw, .. } => raw.clone(),
            Artifact::Unavailable { operation, cause } => {
                format!("[{operation} unavailable: {cause}]")
            }
        }
    }
}

// ==================== ProjectPlan ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPlan {
    pub project_name: String,
    #[serde(deserialize_with = "lenient_strings")]
    pub objectives: Vec<String>,
    pub timeline: Timeline,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub risk_management: RiskManagement,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: String,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub due_date: String,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default, deserialize_with = "lenient_strings")]
    pub required_skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub tools: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskManagement {
    #[serde(default)]
    pub potential_risks: Vec<Risk>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub impact: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mitigation: String,
}

impl ProjectPlan {
    /// Compact multi-line summary for turn context.
    pub fn digest(&self) -> String {
        let mut lines = vec![format!("Project: {}", self.project_name)];
        if !self.objectives.is_empty() {
            lines.push("Objectives:".to_string());
            lines.extend(self.objectives.iter().map(|o| format!("- {o}")));
        }
        if !self.timeline.milestones.is_empty() {
            lines.push("Milestones:".to_string());
            lines.extend(self.timeline.milestones.iter().map(|m| {
                if m.due_date.is_empty() {
                    format!("- {}", m.name)
                } else {
                    format!("- {} (due {})", m.name, m.due_date)
                }
            }));
        }
        lines.join("\n")
    }

    /// Apply an adjustment, replacing only the fields it names.
    ///
    /// Changes whose `original` cannot be found are added as new entries.
    /// Returns the number of changes applied.
    pub fn apply(&mut self, adjustment: &PlanAdjustment) -> usize {
        let mut applied = 0;

        for change in &adjustment.modified_objectives {
            if change.modified.is_empty() {
                continue;
            }
            replace_or_push(&mut self.objectives, &change.original, &change.modified);
            applied += 1;
        }

        for change in &adjustment.timeline_adjustments {
            if change.new_date.is_empty() {
                continue;
            }
            match self
                .timeline
                .milestones
                .iter_mut()
                .find(|m| m.name.eq_ignore_ascii_case(&change.milestone))
            {
                Some(milestone) => milestone.due_date = change.new_date.clone(),
                None if change.milestone.eq_ignore_ascii_case("end_date")
                    || change.milestone.eq_ignore_ascii_case("end date") =>
                {
                    self.timeline.end_date = change.new_date.clone();
                }
                None => self.timeline.milestones.push(Milestone {
                    name: change.milestone.clone(),
                    description: change.reason.clone(),
                    due_date: change.new_date.clone(),
                    dependencies: Vec::new(),
                }),
            }
            applied += 1;
        }

        for change in &adjustment.resource_adjustments {
            if change.modified.is_empty() {
                continue;
            }
            let list = match change.kind.to_lowercase().as_str() {
                "tool" | "tools" => &mut self.resources.tools,
                "constraint" | "constraints" => &mut self.resources.constraints,
                _ => &mut self.resources.required_skills,
            };
            replace_or_push(list, &change.original, &change.modified);
            applied += 1;
        }

        for change in &adjustment.risk_adjustments {
            if change.modified_risk.is_empty() {
                continue;
            }
            let risks = &mut self.risk_management.potential_risks;
            match risks
                .iter_mut()
                .find(|r| !change.original_risk.is_empty() && r.description == change.original_risk)
            {
                Some(risk) => risk.description = change.modified_risk.clone(),
                None => risks.push(Risk {
                    description: change.modified_risk.clone(),
                    impact: String::new(),
                    mitigation: change.reason.clone(),
                }),
            }
            applied += 1;
        }

        applied
    }
}

fn replace_or_push(list: &mut Vec<String>, original: &str, modified: &str) {
    match list
        .iter_mut()
        .find(|item| !original.is_empty() && item.as_str() == original)
    {
        Some(item) => *item = modified.to_string(),
        None => list.push(modified.to_string()),
    }
}

// ==================== ProgressReport ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    #[serde(deserialize_with = "lenient_usize")]
    pub round: usize,
    #[serde(deserialize_with = "lenient_usize")]
    pub total_rounds: usize,
    pub completion_percentage: f64,
    pub objectives_status: Map<String, Value>,
    pub timeline_status: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub key_points: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub next_steps: Vec<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub risks_and_mitigations: Vec<String>,
}

impl ProgressReport {
    pub fn digest(&self) -> String {
        let mut lines = vec![format!(
            "Progress after round {} of {}: {:.0}% complete",
            self.round, self.total_rounds, self.completion_percentage
        )];
        lines.extend(self.next_steps.iter().take(3).map(|s| format!("Next: {s}")));
        lines.join("\n")
    }
}

// ==================== PlanAdjustment ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanAdjustment {
    pub modified_objectives: Vec<ObjectiveChange>,
    pub timeline_adjustments: Vec<TimelineChange>,
    pub resource_adjustments: Vec<ResourceChange>,
    pub risk_adjustments: Vec<RiskChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveChange {
    #[serde(default, deserialize_with = "lenient_string")]
    pub original: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub modified: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineChange {
    #[serde(default, deserialize_with = "lenient_string")]
    pub milestone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub original_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub new_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub original: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub modified: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskChange {
    #[serde(default, deserialize_with = "lenient_string")]
    pub original_risk: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub modified_risk: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reason: String,
}

impl PlanAdjustment {
    pub fn change_count(&self) -> usize {
        self.modified_objectives.len()
            + self.timeline_adjustments.len()
            + self.resource_adjustments.len()
            + self.risk_adjustments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }

    pub fn digest(&self) -> String {
        let mut lines = vec![format!("Plan adjustments ({} changes)", self.change_count())];
        lines.extend(
            self.modified_objectives
                .iter()
                .map(|c| format!("Objective now: {}", c.modified)),
        );
        lines.extend(
            self.timeline_adjustments
                .iter()
                .map(|c| format!("{} moved to {}", c.milestone, c.new_date)),
        );
        lines.join("\n")
    }
}

// ==================== FinalOutput ====================

/// Everything the coordinator produced, composed after DECIDING.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalOutput {
    pub summary: Artifact<String>,
    pub decision: Artifact<String>,
    /// Text tying the plan, every report and every adjustment together.
    pub synthesis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_response: Option<String>,
    pub plan: Option<Artifact<ProjectPlan>>,
    pub progress_reports: Vec<Artifact<ProgressReport>>,
    pub adjustments: Vec<Artifact<PlanAdjustment>>,
}

impl FinalOutput {
    pub fn compose(
        plan: Option<Artifact<ProjectPlan>>,
        progress_reports: Vec<Artifact<ProgressReport>>,
        adjustments: Vec<Artifact<PlanAdjustment>>,
        summary: Artifact<String>,
        decision: Artifact<String>,
    ) -> Self {
        let synthesis = synthesize(plan.as_ref(), &progress_reports, &adjustments, &summary, &decision);
        Self {
            summary,
            decision,
            synthesis,
            final_response: None,
            plan,
            progress_reports,
            adjustments,
        }
    }
}

fn synthesize(
    plan: Option<&Artifact<ProjectPlan>>,
    reports: &[Artifact<ProgressReport>],
    adjustments: &[Artifact<PlanAdjustment>],
    summary: &Artifact<String>,
    decision: &Artifact<String>,
) -> String {
    let mut out = String::new();

    match plan {
        Some(Artifact::Parsed { value, .. }) => {
            out.push_str("## Plan\n");
            out.push_str(&value.digest());
            out.push('\n');
        }
        Some(other) => out.push_str(&format!("## Plan\n(plan {})\n", other.status())),
        None => {}
    }

    if !reports.is_empty() {
        out.push_str("\n## Progress\n");
        for (i, report) in reports.iter().enumerate() {
            match report.value() {
                Some(r) => out.push_str(&format!(
                    "- Round {}: {:.0}% complete, {} key points\n",
                    r.round,
                    r.completion_percentage,
                    r.key_points.len()
                )),
                None => out.push_str(&format!("- Report {}: {}\n", i + 1, report.status())),
            }
        }
    }

    if !adjustments.is_empty() {
        out.push_str("\n## Adjustments\n");
        for (i, adjustment) in adjustments.iter().enumerate() {
            match adjustment.value() {
                Some(a) => out.push_str(&format!("- Adjustment {}: {} changes\n", i + 1, a.change_count())),
                None => out.push_str(&format!("- Adjustment {}: {}\n", i + 1, adjustment.status())),
            }
        }
    }

    out.push_str("\n## Summary\n");
    out.push_str(summary.text().trim());
    out.push_str("\n\n## Decision\n");
    out.push_str(decision.text().trim());
    out.push('\n');
    out
}

// ==================== lenient serde helpers ====================

fn flatten(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Object(map) => Some(
            map.into_iter()
                .filter_map(|(k, v)| flatten(v).map(|v| format!("{k}: {v}")))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(flatten)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(flatten(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(flatten).collect(),
        other => flatten(other).into_iter().collect(),
    })
}

fn lenient_usize<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let n = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| *n >= 0.0)
        .map(|n| n.round() as usize)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a round number, got {value}")))
}
