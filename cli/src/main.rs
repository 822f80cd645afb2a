//! CLI entrypoint for taskforce
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use taskforce_application::{
    DiscussionParams, GenerateTeamUseCase, LlmGateway, NoProgress, ProgressNotifier,
    RunDiscussionUseCase, TeamRepository,
};
use taskforce_domain::{CoordinatorArchetype, DiscussionSession, Model, SessionStatus, TaskForce, Topic};
use taskforce_infrastructure::{
    ConfigLoader, FileConfig, JsonTeamRepository, JsonlConversationLogger, OllamaGateway,
    WikipediaLookup,
};
use taskforce_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    // Keeps the file writer alive until exit.
    let log_guard = init_logging(cli.verbose, config.logging.file.as_deref())?;
    info!("Starting taskforce");

    check_config(&config)?;

    // === Dependency Injection ===
    let gateway = Arc::new(
        OllamaGateway::new(&config.ollama.url).with_fallback_models(vec![config.default_model()]),
    );

    if cli.list_models {
        let models = gateway.available_models().await?;
        print!("{}", ConsoleFormatter::format_models(&models));
        return Ok(());
    }

    let mut params = config.to_discussion_params();
    if let Some(rounds) = cli.rounds {
        params = params.with_rounds(rounds);
    }
    if cli.no_stream {
        params = params.with_streaming(false);
    }
    let default_model = cli
        .model
        .as_deref()
        .map(Model::new)
        .unwrap_or_else(|| config.default_model());

    let cancellation = CancellationToken::new();
    spawn_ctrl_c_handler(cancellation.clone());

    let progress: Box<dyn ProgressNotifier> = match cli.output {
        OutputFormat::Json => Box::new(NoProgress),
        format => Box::new(
            ProgressReporter::new()
                .with_thinking(cli.show_thinking || config.discussion.show_thinking)
                .with_live_transcript(format == OutputFormat::Full)
                .with_animation(std::io::stderr().is_terminal()),
        ),
    };

    let topic = cli.topic.as_deref().and_then(Topic::try_new);

    let team = load_team(
        &cli,
        &config,
        gateway.clone(),
        &params,
        &default_model,
        &cancellation,
        progress.as_ref(),
    )
    .await?;

    if let Some(path) = &cli.save_team {
        JsonTeamRepository::new(path).save(&team.to_records())?;
        eprintln!("Team saved to {}", path.display());
    }

    let Some(topic) = topic else {
        if cli.generate_team.is_some() && cli.save_team.is_some() {
            return Ok(());
        }
        bail!("A topic is required. Example: taskforce \"How should we plan a community garden?\"");
    };

    let team = match (&cli.coordinator, cli.no_coordinator) {
        (_, true) => team.without_coordinator(),
        (Some(name), false) => {
            team.designate_coordinator(name, CoordinatorArchetype::infer(topic.content()))?
        }
        (None, false) => team,
    };

    if cli.output == OutputFormat::Full {
        println!("{}", ConsoleFormatter::format_team(&team));
    }

    let mut session = DiscussionSession::new(topic, params.rounds)?;

    let mut use_case = RunDiscussionUseCase::new(gateway, params)
        .with_cancellation(cancellation.clone());
    if config.wikipedia.enabled {
        use_case = use_case.with_knowledge(Arc::new(
            WikipediaLookup::new(&config.wikipedia.language)
                .with_user_agent(&config.wikipedia.user_agent)
                .with_timeout(Duration::from_secs(config.wikipedia.timeout_secs))
                .with_max_summary_chars(config.wikipedia.max_summary_chars),
        ));
    }
    if let Some(path) = &config.logging.conversation_log
        && let Some(logger) = JsonlConversationLogger::new(path)
    {
        use_case = use_case.with_logger(Arc::new(logger));
    }

    let status = use_case
        .execute(&mut session, &team, progress.as_ref())
        .await?;
    info!("Discussion finished with status {}", status);

    let snapshot = session.snapshot();
    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format_report(&snapshot),
        OutputFormat::Final => ConsoleFormatter::format_final(&snapshot),
        OutputFormat::Json => ConsoleFormatter::format_json(&snapshot),
    };
    println!("{}", output);

    if status == SessionStatus::Cancelled {
        drop(log_guard);
        std::process::exit(130);
    }
    Ok(())
}

/// Stderr logging filtered by `-v` (or `RUST_LOG`), plus an optional log file.
fn init_logging(verbose: u8, file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) if verbose == 0 => EnvFilter::from_default_env(),
        _ => match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"), // -vvv or more
        },
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let path = PathBuf::from(path);
            let directory = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&directory)
                .with_context(|| format!("cannot create log directory {}", directory.display()))?;
            let file_name = path
                .file_name()
                .with_context(|| format!("log file path {} has no file name", path.display()))?;
            let appender = tracing_appender::rolling::never(&directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Print every issue; abort when any of them is an error.
fn check_config(config: &FileConfig) -> Result<()> {
    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            eprintln!("{}", issue);
        } else {
            warn!("{}", issue.message);
        }
    }
    let errors = issues.iter().filter(|i| i.is_error()).count();
    if errors > 0 {
        bail!("configuration has {} error(s)", errors);
    }
    Ok(())
}

fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
            // A second Ctrl-C exits without waiting for the current call.
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        }
    });
}

/// Generated (`--generate-team`) or loaded from the team file.
async fn load_team(
    cli: &Cli,
    config: &FileConfig,
    gateway: Arc<dyn LlmGateway>,
    params: &DiscussionParams,
    default_model: &Model,
    cancellation: &CancellationToken,
    progress: &dyn ProgressNotifier,
) -> Result<TaskForce> {
    let records = match &cli.generate_team {
        Some(scenario) => {
            eprintln!("Generating a team for: {}", scenario);
            GenerateTeamUseCase::new(gateway, params.clone(), default_model.clone())
                .with_cancellation(cancellation.clone())
                .execute(scenario, progress)
                .await?
        }
        None => {
            let path = cli
                .team
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.team.file));
            let repository = JsonTeamRepository::new(&path);
            if !repository.exists() {
                bail!(
                    "No team file at {}. Create one or run with --generate-team \"<scenario>\".",
                    path.display()
                );
            }
            repository.load()?
        }
    };

    Ok(TaskForce::from_records(records, default_model)?)
}
