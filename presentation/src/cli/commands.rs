//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// What to print once the discussion is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Live transcript followed by the coordinator's report
    Full,
    /// Only the coordinator's final output
    Final,
    /// The session snapshot as JSON
    Json,
}

/// CLI arguments for taskforce
#[derive(Parser, Debug)]
#[command(name = "taskforce")]
#[command(author, version, about = "Multi-agent discussions on a local Ollama server")]
#[command(long_about = r#"
taskforce runs a round-based discussion between role-playing agents served by
a local Ollama instance.

Each round every participant thinks privately, optionally looks a term up on
Wikipedia, and then responds. When the team has a coordinator it drafts a
project plan first, tracks progress and adjusts the plan between rounds, and
finally summarizes the discussion and decides.

Configuration files are loaded from (lowest to highest priority):
1. ~/.config/taskforce/config.toml   Global config
2. ./taskforce.toml                  Project-level config
3. --config <path>                   Explicit config file
4. TASKFORCE_* environment variables (e.g. TASKFORCE_OLLAMA__URL)

Example:
  taskforce "How should we plan a community garden?"
  taskforce --generate-team "Plan a product launch" --save-team data/launch.json "Launch plan"
  taskforce --team data/launch.json --rounds 5 --output final "Launch plan"
"#)]
pub struct Cli {
    /// The topic to discuss
    pub topic: Option<String>,

    /// Number of discussion rounds
    #[arg(short, long, value_name = "N")]
    pub rounds: Option<usize>,

    /// Team definition file (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub team: Option<PathBuf>,

    /// Ask the model to compose a team for this scenario
    #[arg(long, value_name = "SCENARIO")]
    pub generate_team: Option<String>,

    /// Write the team used for this run to FILE
    #[arg(long, value_name = "FILE")]
    pub save_team: Option<PathBuf>,

    /// Designate this agent as the coordinator
    #[arg(long, value_name = "NAME", conflicts_with = "no_coordinator")]
    pub coordinator: Option<String>,

    /// Run without a coordinator
    #[arg(long)]
    pub no_coordinator: bool,

    /// Default model for agents without one
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Print each agent's private thinking
    #[arg(long)]
    pub show_thinking: bool,

    /// Wait for complete responses instead of streaming them
    #[arg(long)]
    pub no_stream: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, conflicts_with = "config")]
    pub no_config: bool,

    /// List the models installed on the Ollama server and exit
    #[arg(long)]
    pub list_models: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "taskforce",
            "Plan a garden",
            "--rounds",
            "2",
            "--team",
            "team.json",
            "--coordinator",
            "Ada",
            "--no-stream",
            "--output",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.topic.as_deref(), Some("Plan a garden"));
        assert_eq!(cli.rounds, Some(2));
        assert_eq!(cli.team, Some(PathBuf::from("team.json")));
        assert_eq!(cli.coordinator.as_deref(), Some("Ada"));
        assert!(cli.no_stream);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_coordinator_flags_conflict() {
        let result =
            Cli::try_parse_from(["taskforce", "x", "--coordinator", "Ada", "--no-coordinator"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["taskforce", "--list-models"]).unwrap();
        assert!(cli.topic.is_none());
        assert!(cli.list_models);
        assert_eq!(cli.output, OutputFormat::Full);
        assert!(!cli.show_thinking);
    }
}
