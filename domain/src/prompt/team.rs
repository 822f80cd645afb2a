//! Prompt for composing a team from a scenario.

/// Template for team generation
pub struct TeamPrompt;

impl TeamPrompt {
    pub fn compose(scenario: &str) -> String {
        format!(
            r#"You are a team composition expert. Create a specialized team of AI agents to handle this scenario:

"{scenario}"

Return a JSON array of agent objects. Each agent has:
1. "name": a creative, professional name
2. "role": a clear role description
3. "prompt": detailed instructions and personality for the agent

The team should be diverse and complementary, with each agent bringing unique expertise.
Create between 3 and 7 agents. One agent must be the coordinator or facilitator, and
its role must say so.

[
  {{"name": "string", "role": "string", "prompt": "string"}}
]

Respond ONLY with the JSON array, no additional text."#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_embeds_scenario() {
        let prompt = TeamPrompt::compose("Plan a hackathon");
        assert!(prompt.contains("\"Plan a hackathon\""));
        assert!(prompt.contains("{\"name\": \"string\""));
    }
}
