//! Prompts for participant turns.

use crate::agent::entities::Agent;
use crate::core::topic::Topic;
use crate::discussion::context::TurnContext;
use crate::discussion::ledger::render_turns;

/// Templates for think/respond turns
pub struct DiscussionPrompt;

impl DiscussionPrompt {
    /// Private reasoning before a response.
    pub fn think(agent: &Agent, topic: &Topic, ctx: &TurnContext) -> String {
        let mut prompt = Self::preamble(agent);
        prompt.push_str(
            "\nYou are thinking privately before speaking. Nobody else will read these notes.\n\n",
        );
        prompt.push_str(&Self::situation(topic, ctx));
        if !ctx.own_history.is_empty() {
            prompt.push_str("\n\nYour earlier contributions:\n");
            prompt.push_str(&render_turns(&ctx.own_history));
        }
        prompt.push_str(
            r#"

Think step by step:
1. What are the key aspects of this topic?
2. What unique perspective can you bring based on your role?
3. What questions or concerns should be addressed?
4. How can you move the discussion forward?

If a fact from an encyclopedia would help, write a line of the form
WIKI_LOOKUP: "term"
and the summary will be provided before you answer.

Your thinking process:"#,
        );
        prompt
    }

    /// The public turn.
    pub fn respond(agent: &Agent, topic: &Topic, ctx: &TurnContext, thinking: Option<&str>) -> String {
        let mut prompt = Self::preamble(agent);
        prompt.push_str(
            "\nYou are participating in a discussion. Contribute meaningfully based on your role and expertise.\n\n",
        );
        prompt.push_str(&Self::situation(topic, ctx));

        if let Some(note) = &ctx.knowledge {
            prompt.push_str(&format!(
                "\n\nReference material on \"{}\":\n{}",
                note.term, note.summary
            ));
        }
        if let Some(thinking) = thinking.filter(|t| !t.trim().is_empty()) {
            prompt.push_str("\n\nYour private notes:\n");
            prompt.push_str(thinking.trim());
        }

        prompt.push_str(
            r#"

Provide a clear and focused response that:
1. Addresses the topic directly
2. Brings your unique perspective
3. Responds to what others have said
4. Maintains a professional and constructive tone

Speak as yourself; do not prefix the answer with your name.

Your response:"#,
        );
        prompt
    }

    fn preamble(agent: &Agent) -> String {
        format!(
            "You are {}, taking part in a discussion as {}.\n{}\n",
            agent.name(),
            agent.role(),
            agent.base_prompt().trim()
        )
    }

    fn situation(topic: &Topic, ctx: &TurnContext) -> String {
        let mut text = format!(
            "Topic: {}\nRound {} of {}",
            topic,
            ctx.display_round(),
            ctx.total_rounds
        );
        if !ctx.participants.is_empty() {
            text.push_str(&format!("\nParticipants: {}", ctx.participants.join(", ")));
        }
        if let Some(digest) = &ctx.coordinator_digest {
            text.push_str("\n\nCoordinator's current plan:\n");
            text.push_str(digest);
        }
        if ctx.recent_transcript.is_empty() {
            text.push_str("\n\nNobody has spoken yet.");
        } else {
            text.push_str("\n\nRecent discussion:\n");
            text.push_str(&render_turns(&ctx.recent_transcript));
        }
        text
    }
}
