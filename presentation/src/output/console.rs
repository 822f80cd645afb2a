//! Console output formatter for discussion sessions

use colored::Colorize;
use taskforce_domain::{
    Artifact, FinalOutput, Model, ProgressReport, ProjectPlan, SessionSnapshot, SessionStatus,
    TaskForce, Turn, TurnPlaceholder,
};

/// Formats session snapshots for console display
pub struct ConsoleFormatter;

/// One line of the rendered transcript.
enum Entry<'a> {
    Turn(&'a Turn),
    Missing(&'a TurnPlaceholder),
}

impl ConsoleFormatter {
    /// Header, full transcript and everything the coordinator produced.
    pub fn format(snapshot: &SessionSnapshot) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Task Force Discussion"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Topic:".cyan().bold(), snapshot.topic));
        output.push_str(&Self::status_line(snapshot));
        output.push('\n');

        let mut round = None;
        for entry in Self::interleave(snapshot) {
            let entry_round = match entry {
                Entry::Turn(turn) => turn.round,
                Entry::Missing(placeholder) => placeholder.round,
            };
            if round != Some(entry_round) {
                output.push_str(&Self::section_header(&format!(
                    "Round {}/{}",
                    entry_round + 1,
                    snapshot.total_rounds
                )));
                round = Some(entry_round);
            }
            match entry {
                Entry::Turn(turn) => output.push_str(&Self::turn(turn)),
                Entry::Missing(placeholder) => {
                    output.push_str(&format!("\n{}\n", placeholder.describe().red()));
                }
            }
        }

        output.push_str(&Self::format_report(snapshot));
        output.push_str(&Self::footer());
        output
    }

    /// Coordinator output and run status, without the transcript.
    ///
    /// Used after a live run, where the turns have already been printed.
    pub fn format_report(snapshot: &SessionSnapshot) -> String {
        let mut output = String::new();

        if let Some(final_output) = &snapshot.final_output {
            output.push_str(&Self::final_sections(snapshot, final_output));
        } else if let Some(plan) = &snapshot.plan {
            // Cancelled before deciding: show what exists.
            output.push_str(&Self::section_header("Project Plan"));
            output.push_str(&Self::plan(plan));
            if let Some(report) = &snapshot.latest_report {
                output.push_str(&Self::section_header("Latest Progress Report"));
                output.push_str(&Self::report(report));
            }
        }

        if snapshot.status == SessionStatus::Cancelled {
            output.push_str(&format!(
                "\n{} after {} of {} round(s)\n",
                "Discussion cancelled".yellow().bold(),
                snapshot.current_round,
                snapshot.total_rounds
            ));
        }
        output
    }

    /// Only the coordinator's final answer and decision.
    pub fn format_final(snapshot: &SessionSnapshot) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n\n", "=== Task Force Conclusion ===".cyan().bold()));
        output.push_str(&format!("{} {}\n\n", "Topic:".bold(), snapshot.topic));

        match &snapshot.final_output {
            Some(final_output) => {
                if let Some(response) = &final_output.final_response {
                    output.push_str(response.trim());
                    output.push_str("\n\n");
                }
                output.push_str(&format!("{}\n", "Decision:".green().bold()));
                output.push_str(final_output.decision.text().trim());
                output.push('\n');
            }
            None => {
                // No coordinator: the last round is the closest thing to a conclusion.
                let last_round = snapshot.transcript.iter().map(|t| t.round).max();
                for turn in snapshot
                    .transcript
                    .iter()
                    .filter(|t| Some(t.round) == last_round)
                {
                    output.push_str(&Self::turn(turn));
                }
            }
        }

        if snapshot.status == SessionStatus::Cancelled {
            output.push_str(&format!("\n{}\n", "(discussion was cancelled)".yellow()));
        }
        output
    }

    /// Format as JSON
    pub fn format_json(snapshot: &SessionSnapshot) -> String {
        serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_team(team: &TaskForce) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Task force:".cyan().bold()));
        for agent in team.agents() {
            let marker = if agent.is_coordinator() {
                format!(
                    " [coordinator: {}]",
                    agent.archetype().unwrap_or_default().as_str()
                ).magenta().to_string()
            } else {
                String::new()
            };
            output.push_str(&format!(
                "  {} ({}) on {}{}\n",
                agent.name().bold(),
                agent.role(),
                agent.model(),
                marker
            ));
        }
        output
    }

    pub fn format_models(models: &[Model]) -> String {
        let mut output = format!("{}\n", "Available models:".cyan().bold());
        for model in models {
            output.push_str(&format!("  {}\n", model));
        }
        output
    }

    /// Turns in order with placeholders at the position they failed.
    fn interleave(snapshot: &SessionSnapshot) -> Vec<Entry<'_>> {
        let mut entries = Vec::with_capacity(snapshot.transcript.len() + snapshot.placeholders.len());
        let mut placeholders = snapshot.placeholders.iter().peekable();
        for (index, turn) in snapshot.transcript.iter().enumerate() {
            while let Some(p) = placeholders.next_if(|p| p.position <= index) {
                entries.push(Entry::Missing(p));
            }
            entries.push(Entry::Turn(turn));
        }
        entries.extend(placeholders.map(Entry::Missing));
        entries
    }

    fn final_sections(snapshot: &SessionSnapshot, final_output: &FinalOutput) -> String {
        let mut output = String::new();
        let coordinator = snapshot.coordinator.as_deref().unwrap_or("Coordinator");

        if let Some(plan) = &final_output.plan {
            output.push_str(&Self::section_header("Project Plan"));
            output.push_str(&Self::plan(plan));
        }

        for (index, report) in final_output.progress_reports.iter().enumerate() {
            output.push_str(&Self::section_header(&format!(
                "Progress Report {}",
                index + 1
            )));
            output.push_str(&Self::report(report));
        }

        for (index, adjustment) in final_output.adjustments.iter().enumerate() {
            output.push_str(&Self::section_header(&format!(
                "Plan Adjustment {}",
                index + 1
            )));
            let body = match adjustment {
                Artifact::Parsed { value, .. } if value.is_empty() => "No changes.".to_string(),
                Artifact::Parsed { value, .. } => value.digest(),
                other => Self::degraded(other),
            };
            output.push_str(&format!("\n{}\n", body));
        }

        output.push_str(&Self::section_header("Summary"));
        output.push_str(&format!(
            "\n{}\n\n{}\n",
            coordinator.yellow().bold(),
            final_output.summary.text().trim()
        ));

        output.push_str(&Self::section_header("Decision"));
        output.push_str(&format!("\n{}\n", final_output.decision.text().trim()));

        if let Some(response) = &final_output.final_response {
            output.push_str(&Self::section_header("Final Response"));
            output.push_str(&format!("\n{}\n", response.trim()));
        }
        output
    }

    fn plan(plan: &Artifact<ProjectPlan>) -> String {
        match plan {
            Artifact::Parsed { value, .. } => format!("\n{}\n", value.digest()),
            other => format!("\n{}\n", Self::degraded(other)),
        }
    }

    fn report(report: &Artifact<ProgressReport>) -> String {
        match report {
            Artifact::Parsed { value, .. } => {
                let mut out = format!(
                    "\n{} {:.0}% complete (round {}/{})\n",
                    "Progress:".bold(),
                    value.completion_percentage,
                    value.round,
                    value.total_rounds
                );
                if !value.key_points.is_empty() {
                    out.push_str(&format!("{}\n", "Key Points:".cyan().bold()));
                    for point in &value.key_points {
                        out.push_str(&format!("  * {}\n", point));
                    }
                }
                if !value.next_steps.is_empty() {
                    out.push_str(&format!("{}\n", "Next Steps:".green().bold()));
                    for step in &value.next_steps {
                        out.push_str(&format!("  * {}\n", step));
                    }
                }
                out
            }
            other => format!("\n{}\n", Self::degraded(other)),
        }
    }

    fn degraded<T>(artifact: &Artifact<T>) -> String {
        match artifact {
            Artifact::Parsed { .. } => String::new(),
            Artifact::Unparsed { raw, .. } => {
                format!("{}\n{}", "(unstructured reply)".yellow(), raw.trim())
            }
            Artifact::Unavailable { operation, cause } => {
                format!("[{operation} unavailable: {cause}]").red().to_string()
            }
        }
    }

    fn turn(turn: &Turn) -> String {
        format!(
            "\n{}\n{}\n",
            format!("── {} ──", turn.speaker).yellow().bold(),
            turn.text.trim()
        )
    }

    fn status_line(snapshot: &SessionSnapshot) -> String {
        let coordinator = match &snapshot.coordinator {
            Some(name) => format!(", coordinated by {}", name),
            None => String::new(),
        };
        format!(
            "{} {} ({}/{} rounds{})\n",
            "Status:".cyan().bold(),
            snapshot.status,
            snapshot.current_round,
            snapshot.total_rounds,
            coordinator
        )
    }

    fn header(title: &str) -> String {
        let line = "═".repeat(60);
        format!(
            "{}\n{}\n{}",
            line.cyan(),
            format!("  {}", title).cyan().bold(),
            line.cyan()
        )
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("━━━ {} ━━━", title).blue().bold())
    }

    fn footer() -> String {
        format!("\n{}\n", "═".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            topic: "Community garden".to_string(),
            total_rounds: 2,
            current_round: 2,
            status: SessionStatus::Completed,
            transcript: vec![
                Turn::new("Ada", "Start with raised beds.", 0),
                Turn::new("Cy", "Agreed.", 1),
            ],
            placeholders: vec![TurnPlaceholder {
                speaker: "Bo".to_string(),
                round: 0,
                position: 1,
                operation: "respond".to_string(),
                cause: "connection failed".to_string(),
            }],
            coordinator: None,
            plan: None,
            latest_report: None,
            latest_adjustment: None,
            final_output: None,
        }
    }

    #[test]
    fn test_placeholders_are_interleaved() {
        let snapshot = snapshot();
        let entries = ConsoleFormatter::interleave(&snapshot);
        let speakers: Vec<&str> = entries
            .iter()
            .map(|e| match e {
                Entry::Turn(t) => t.speaker.as_str(),
                Entry::Missing(p) => p.speaker.as_str(),
            })
            .collect();
        assert_eq!(speakers, vec!["Ada", "Bo", "Cy"]);
    }

    #[test]
    fn test_full_output_lists_rounds_and_failures() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&snapshot());
        assert!(text.contains("Round 1/2"));
        assert!(text.contains("Round 2/2"));
        assert!(text.contains("[Bo did not contribute in round 1: respond failed: connection failed]"));
        assert!(text.find("raised beds").unwrap() < text.find("Agreed.").unwrap());
    }

    #[test]
    fn test_final_without_coordinator_shows_last_round() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_final(&snapshot());
        assert!(text.contains("Agreed."));
        assert!(!text.contains("raised beds"));
    }

    #[test]
    fn test_cancelled_report() {
        colored::control::set_override(false);
        let mut snapshot = snapshot();
        snapshot.status = SessionStatus::Cancelled;
        snapshot.current_round = 1;
        let text = ConsoleFormatter::format_report(&snapshot);
        assert!(text.contains("Discussion cancelled after 1 of 2 round(s)"));
    }

    #[test]
    fn test_json_is_snapshot() {
        let json = ConsoleFormatter::format_json(&snapshot());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "COMPLETED");
        assert_eq!(value["transcript"][1]["speaker"], "Cy");
    }
}
