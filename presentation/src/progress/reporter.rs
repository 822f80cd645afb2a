//! Progress reporting for discussion runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;
use taskforce_application::{GatewayError, ProgressNotifier};
use taskforce_domain::{
    CoordinatorPhase, KnowledgeNote, SchemaIssue, SessionSnapshot, Turn, TurnPlaceholder,
};

/// Prints the discussion as it happens, with a spinner while waiting.
///
/// Streamed turns are printed chunk by chunk; the speaker of the last stream
/// is remembered so the appended turn is not printed a second time.
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    streaming: Mutex<Option<String>>,
    show_thinking: bool,
    live_transcript: bool,
    animate: bool,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            streaming: Mutex::new(None),
            show_thinking: false,
            live_transcript: true,
            animate: true,
        }
    }

    pub fn with_thinking(mut self, show: bool) -> Self {
        self.show_thinking = show;
        self
    }

    /// When false only phases and failures are shown; turns are left for
    /// the final output.
    pub fn with_live_transcript(mut self, live: bool) -> Self {
        self.live_transcript = live;
        self
    }

    /// Disable the spinner, e.g. when stderr is not a terminal.
    pub fn with_animation(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start_spinner(&self, message: String) {
        if !self.animate {
            return;
        }
        let mut slot = lock(&self.spinner);
        if let Some(previous) = slot.take() {
            previous.finish_and_clear();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        *slot = Some(pb);
    }

    fn stop_spinner(&self) {
        if let Some(pb) = lock(&self.spinner).take() {
            pb.finish_and_clear();
        }
    }

    fn phase_display_name(phase: CoordinatorPhase) -> &'static str {
        match phase {
            CoordinatorPhase::Planning => "drafting the project plan",
            CoordinatorPhase::Tracking => "tracking progress",
            CoordinatorPhase::Adjusting => "adjusting the plan",
            CoordinatorPhase::Summarizing => "summarizing the discussion",
            CoordinatorPhase::Deciding => "deciding",
            CoordinatorPhase::Done => "done",
        }
    }

    fn print_turn(&self, speaker: &str, text: &str) {
        println!("\n{}\n{}", format!("── {} ──", speaker).yellow().bold(), text.trim());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ProgressNotifier for ProgressReporter {
    fn on_session_start(&self, snapshot: &SessionSnapshot) {
        println!("{} {}", "Topic:".cyan().bold(), snapshot.topic);
        if let Some(coordinator) = &snapshot.coordinator {
            println!("{} {}", "Coordinator:".cyan().bold(), coordinator);
        }
    }

    fn on_round_start(&self, round: usize, total_rounds: usize) {
        self.stop_spinner();
        println!(
            "\n{}",
            format!("━━━ Round {}/{} ━━━", round + 1, total_rounds).blue().bold()
        );
        self.start_spinner("waiting for the first speaker...".to_string());
    }

    fn on_thinking(&self, agent: &str, thinking: &str) {
        if !self.show_thinking {
            return;
        }
        self.stop_spinner();
        println!(
            "\n{}\n{}",
            format!("({} thinks)", agent).dimmed().italic(),
            thinking.trim().dimmed()
        );
    }

    fn on_knowledge(&self, agent: &str, note: &KnowledgeNote) {
        self.stop_spinner();
        println!(
            "{} {} looked up {}",
            "i".cyan(),
            agent,
            note.term.bold()
        );
    }

    fn on_retry(&self, agent: &str, operation: &str, attempt: u32, error: &GatewayError) {
        self.stop_spinner();
        eprintln!(
            "{} {} {} failed ({}); retrying, attempt {}",
            "!".yellow(),
            agent,
            operation,
            error,
            attempt + 1
        );
    }

    fn on_stream_start(&self, agent: &str) {
        self.stop_spinner();
        *lock(&self.streaming) = Some(agent.to_string());
        if self.live_transcript {
            println!("\n{}", format!("── {} ──", agent).yellow().bold());
        }
    }

    fn on_stream_chunk(&self, _agent: &str, chunk: &str) {
        if self.live_transcript {
            print!("{}", chunk);
            let _ = std::io::stdout().flush();
        }
    }

    fn on_stream_restart(&self, agent: &str, attempt: u32) {
        if self.live_transcript {
            println!(
                "\n{}",
                format!("[stream interrupted, {} restarts (attempt {})]", agent, attempt).yellow()
            );
        }
    }

    fn on_stream_end(&self, _agent: &str) {
        if self.live_transcript {
            println!();
        }
    }

    fn on_turn_appended(&self, turn: &Turn) {
        self.stop_spinner();
        let streamed = lock(&self.streaming)
            .take_if(|speaker| *speaker == turn.speaker)
            .is_some();
        if self.live_transcript && !streamed {
            self.print_turn(&turn.speaker, &turn.text);
        }
        self.start_spinner("waiting for the next speaker...".to_string());
    }

    fn on_turn_failed(&self, placeholder: &TurnPlaceholder) {
        self.stop_spinner();
        lock(&self.streaming).take();
        println!("\n{}", placeholder.describe().red());
    }

    fn on_coordinator_phase_start(&self, phase: CoordinatorPhase, _round: Option<usize>) {
        if phase == CoordinatorPhase::Done {
            return;
        }
        self.start_spinner(format!("Coordinator is {}...", Self::phase_display_name(phase)));
    }

    fn on_coordinator_phase_complete(
        &self,
        phase: CoordinatorPhase,
        _round: Option<usize>,
        degraded: bool,
    ) {
        self.stop_spinner();
        if degraded {
            println!("{} {} (unstructured)", "~".yellow(), phase.as_str());
        } else {
            println!("{} {}", "v".green(), phase.as_str());
        }
    }

    fn on_repair_cycle(&self, schema: &str, cycle: usize, issues: &[SchemaIssue]) {
        if let Some(pb) = lock(&self.spinner).as_ref() {
            pb.set_message(format!(
                "Repairing {} reply (cycle {}, {} issue(s))...",
                schema,
                cycle,
                issues.len()
            ));
        }
    }

    fn on_round_complete(&self, _snapshot: &SessionSnapshot) {
        self.stop_spinner();
    }

    fn on_cancel_requested(&self) {
        self.stop_spinner();
        eprintln!("\n{}", "Cancellation requested; stopping after the current step.".yellow());
    }

    fn on_session_finished(&self, _snapshot: &SessionSnapshot) {
        self.stop_spinner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streamed_turn_is_not_repeated() {
        let reporter = ProgressReporter::new()
            .with_animation(false)
            .with_live_transcript(false);
        reporter.on_stream_start("Ada");
        assert_eq!(lock(&reporter.streaming).as_deref(), Some("Ada"));

        reporter.on_turn_appended(&Turn::new("Ada", "Hello", 0));
        assert!(lock(&reporter.streaming).is_none());
    }

    #[test]
    fn test_other_speaker_keeps_stream_marker() {
        let reporter = ProgressReporter::new()
            .with_animation(false)
            .with_live_transcript(false);
        reporter.on_stream_start("Ada");
        reporter.on_turn_appended(&Turn::new("Bo", "Hi", 0));
        assert_eq!(lock(&reporter.streaming).as_deref(), Some("Ada"));
    }

    #[test]
    fn test_no_spinner_without_animation() {
        let reporter = ProgressReporter::new().with_animation(false);
        reporter.on_coordinator_phase_start(CoordinatorPhase::Planning, None);
        assert!(lock(&reporter.spinner).is_none());
    }

    #[test]
    fn test_phase_names_cover_every_phase() {
        for phase in [
            CoordinatorPhase::Planning,
            CoordinatorPhase::Tracking,
            CoordinatorPhase::Adjusting,
            CoordinatorPhase::Summarizing,
            CoordinatorPhase::Deciding,
        ] {
            assert!(!ProgressReporter::phase_display_name(phase).is_empty());
        }
    }
}
