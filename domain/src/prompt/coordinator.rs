//! Prompts for the coordinator phases.
//!
//! Structured phases ask for a bare JSON object; the parser tolerates
//! fences and prose anyway, so the instructions stay short.

use crate::agent::entities::Agent;
use crate::core::topic::Topic;
use crate::discussion::ledger::render_turns;
use crate::discussion::turn::Turn;

const PLAN_SHAPE: &str = r#"{
  "project_name": "Name of the project",
  "objectives": ["First objective", "Second objective"],
  "timeline": {
    "start_date": "YYYY-MM-DD",
    "end_date": "YYYY-MM-DD",
    "milestones": [
      {"name": "Milestone", "description": "What it covers", "due_date": "YYYY-MM-DD", "dependencies": []}
    ]
  },
  "resources": {"required_skills": [], "tools": [], "constraints": []},
  "risk_management": {
    "potential_risks": [{"description": "Risk", "impact": "Impact", "mitigation": "Mitigation"}]
  }
}"#;

const PROGRESS_SHAPE: &str = r#"{
  "round": 1,
  "total_rounds": 3,
  "completion_percentage": 33.0,
  "objectives_status": {"objective text": "not started | in progress | done"},
  "timeline_status": {"on_track": true, "delayed_milestones": []},
  "key_points": [{"point": "Key point", "source": "Participant", "significance": "Why it matters"}],
  "next_steps": [{"action": "Next action", "priority": "high", "assigned_to": "Participant"}],
  "risks_and_mitigations": [{"risk": "Risk", "mitigation": "Mitigation"}]
}"#;

const ADJUSTMENT_SHAPE: &str = r#"{
  "modified_objectives": [{"original": "Objective", "modified": "New objective", "reason": "Why"}],
  "timeline_adjustments": [{"milestone": "Milestone name", "original_date": "YYYY-MM-DD", "new_date": "YYYY-MM-DD", "reason": "Why"}],
  "resource_adjustments": [{"type": "skill | tool | constraint", "original": "Old", "modified": "New", "reason": "Why"}],
  "risk_adjustments": [{"original_risk": "Old risk", "modified_risk": "New risk", "reason": "Why"}]
}"#;

const JSON_ONLY: &str = "Respond with ONLY the JSON object: no explanation before or after it.";

/// Templates for each coordinator phase
pub struct CoordinatorPrompt;

impl CoordinatorPrompt {
    /// PLANNING: break the topic into a project plan.
    pub fn plan(coordinator: &Agent, topic: &Topic, participants: &[String], total_rounds: usize) -> String {
        format!(
            r#"{preamble}
Before the discussion starts, break the following request into a project plan
that the participants ({participants}) will work through over {total_rounds} rounds.

Request: {topic}

Use this JSON structure:
{PLAN_SHAPE}

{JSON_ONLY}"#,
            preamble = Self::preamble(coordinator),
            participants = participants.join(", "),
        )
    }

    /// TRACKING: assess progress after a round.
    pub fn progress(
        coordinator: &Agent,
        topic: &Topic,
        plan_digest: Option<&str>,
        round_turns: &[Turn],
        completed_rounds: usize,
        total_rounds: usize,
    ) -> String {
        let expected = completed_rounds as f64 / total_rounds as f64 * 100.0;
        format!(
            r#"{preamble}
Round {completed_rounds} of {total_rounds} has just finished.

Request: {topic}

Current plan:
{plan}

What was said this round:
{turns}

Report progress against the plan. A purely time-based estimate would be {expected:.0}%;
adjust it to reflect what was actually achieved. Use round = {completed_rounds} and
total_rounds = {total_rounds}.

Use this JSON structure:
{PROGRESS_SHAPE}

{JSON_ONLY}"#,
            preamble = Self::preamble(coordinator),
            plan = plan_digest.unwrap_or("(no structured plan is available)"),
            turns = Self::transcript_or_placeholder(round_turns),
        )
    }

    /// ADJUSTING: propose changes to the plan given the latest report.
    pub fn adjust(coordinator: &Agent, plan_json: Option<&str>, report_digest: Option<&str>) -> String {
        format!(
            r#"{preamble}
Review the current plan against the latest progress report and propose adjustments.
Leave a list empty when nothing in that area needs to change.

Current plan:
{plan}

Progress report:
{report}

Use this JSON structure:
{ADJUSTMENT_SHAPE}

{JSON_ONLY}"#,
            preamble = Self::preamble(coordinator),
            plan = plan_json.unwrap_or("(no structured plan is available)"),
            report = report_digest.unwrap_or("(no structured report is available)"),
        )
    }

    /// SUMMARIZING: summary of the whole discussion.
    pub fn summarize(coordinator: &Agent, topic: &Topic, transcript: &[Turn]) -> String {
        format!(
            r#"{preamble}
Review the following discussion about "{topic}" and provide a comprehensive summary.

{turns}

Your summary should:
1. Highlight the main points discussed
2. Identify key insights and conclusions
3. Note areas of agreement and disagreement
4. Suggest potential next steps

Summary:"#,
            preamble = Self::preamble(coordinator),
            turns = Self::transcript_or_placeholder(transcript),
        )
    }

    /// DECIDING: final assessment.
    pub fn decide(coordinator: &Agent, topic: &Topic, transcript: &[Turn], summary: &str) -> String {
        format!(
            r#"{preamble}
The discussion about "{topic}" is over. Provide your final decision and assessment.

Discussion:
{turns}

Your summary:
{summary}

Your assessment should:
1. State the decision or recommendation the group reached
2. Identify the most valuable contributions
3. Assess whether the discussion achieved its goals
4. Name what remains open

Assessment:"#,
            preamble = Self::preamble(coordinator),
            turns = Self::transcript_or_placeholder(transcript),
        )
    }

    /// Final answer to the original request, written after DECIDING.
    pub fn final_response(coordinator: &Agent, topic: &Topic, transcript: &[Turn], decision: &str) -> String {
        format!(
            r#"{preamble}
Generate the final output that directly addresses the original request.

Original request: {topic}

The discussion that took place:
{turns}

The decision reached:
{decision}

Your response should:
1. Directly address all aspects of the original request
2. Incorporate relevant insights from the discussion
3. Provide practical and actionable information
4. Be well-organized and easy to understand

Final output:"#,
            preamble = Self::preamble(coordinator),
            turns = Self::transcript_or_placeholder(transcript),
        )
    }

    fn preamble(coordinator: &Agent) -> String {
        let archetype = coordinator
            .archetype()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "facilitator".to_string());
        format!(
            "You are {}, the {archetype} coordinating this discussion.\n{}\n",
            coordinator.name(),
            coordinator.base_prompt().trim()
        )
    }

    fn transcript_or_placeholder(turns: &[Turn]) -> String {
        if turns.is_empty() {
            "(no contributions were recorded)".to_string()
        } else {
            render_turns(turns)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::archetype::CoordinatorArchetype;
    use crate::core::model::Model;

    fn chair() -> Agent {
        Agent::coordinator("Chair", CoordinatorArchetype::Strategist, None, Model::default())
    }

    fn topic() -> Topic {
        Topic::try_new("Open a bakery").unwrap()
    }

    #[test]
    fn test_plan_prompt_lists_required_keys() {
        let prompt = CoordinatorPrompt::plan(&chair(), &topic(), &["Ada".into(), "Bo".into()], 3);
        assert!(prompt.contains("\"project_name\""));
        assert!(prompt.contains("\"timeline\""));
        assert!(prompt.contains("(Ada, Bo)"));
        assert!(prompt.contains("over 3 rounds"));
        assert!(prompt.contains("the strategist coordinating"));
    }

    #[test]
    fn test_progress_prompt_carries_round_numbers() {
        let prompt = CoordinatorPrompt::progress(
            &chair(),
            &topic(),
            Some("Project: Bakery"),
            &[Turn::new("Ada", "Flour prices are up.", 0)],
            1,
            3,
        );
        assert!(prompt.contains("Round 1 of 3 has just finished."));
        assert!(prompt.contains("would be 33%"));
        assert!(prompt.contains("Ada: Flour prices are up."));
        assert!(prompt.contains("Project: Bakery"));
    }

    #[test]
    fn test_adjust_prompt_without_plan() {
        let prompt = CoordinatorPrompt::adjust(&chair(), None, None);
        assert!(prompt.contains("(no structured plan is available)"));
        assert!(prompt.contains("\"risk_adjustments\""));
    }

    #[test]
    fn test_summary_prompt_with_empty_transcript() {
        let prompt = CoordinatorPrompt::summarize(&chair(), &topic(), &[]);
        assert!(prompt.contains("(no contributions were recorded)"));
    }
}
