use std::{path::PathBuf, str::FromStr, time::Duration};

use anyhow::Context;
use apalis::{layers::sentry::SentryLayer, prelude::*};
use apalis_cron::{CronStream, Tick};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use cron::Schedule;
use digest_datastore::{Channel, DataStore, PgDataStore};
use digest_pulse::{
    anthropic::AnthropicClient,
    digest::{deliver_pending_digest, smtp::DEFAULT_SMTP_HOST, SmtpMailer, SmtpSettings},
    tracing::init_tracing_subscriber,
    transcript::TranscriptSource,
    yt::client::YouTubeClient,
    ProcessorConfig, VideoProcessor, VideoProcessorBuilder,
};
use tokio_util::sync::CancellationToken;

type Processor = VideoProcessor<PgDataStore, YouTubeClient, TranscriptSource, AnthropicClient>;

#[derive(Parser)]
#[command(
    name = "digest-pulse",
    about = "Summarizes new YouTube uploads and emails a digest"
)]
struct Cli {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY")]
    youtube_key: String,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY")]
    anthropic_key: String,

    /// RapidAPI key for transcripts; without it summaries use video descriptions
    #[arg(long, env = "RAPIDAPI_KEY")]
    rapidapi_key: Option<String>,

    /// Claude model used for summaries
    #[arg(long, env = "CLAUDE_MODEL")]
    model: Option<String>,

    /// File holding a summary prompt with {title} and {transcript} placeholders
    #[arg(long, env = "SUMMARY_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    #[arg(long, env = "SMTP_HOST", default_value = DEFAULT_SMTP_HOST)]
    smtp_host: String,

    #[arg(long, env = "SMTP_PORT", default_value = "587")]
    smtp_port: u16,

    /// SMTP username, also the sender address
    #[arg(long, env = "SMTP_USERNAME")]
    smtp_username: Option<String>,

    #[arg(long, env = "SMTP_PASSWORD")]
    smtp_password: Option<String>,

    /// Digest recipient, defaults to the SMTP username
    #[arg(long, env = "DIGEST_RECIPIENT")]
    recipient: Option<String>,

    #[arg(long, env = "EMAIL_SUBJECT_TEMPLATE", default_value = "YouTube Summary - {date}")]
    subject_template: String,

    /// IANA timezone the digest date is rendered in
    #[arg(long, env = "DIGEST_TIMEZONE", default_value = "UTC")]
    timezone: String,

    /// Channels processed concurrently
    #[arg(long, env = "MAX_CONCURRENT_CHANNELS", default_value = "3")]
    max_concurrent_channels: usize,

    /// Most recent videos fetched per channel per run
    #[arg(long, env = "MAX_VIDEOS_PER_CHANNEL", default_value = "1")]
    max_videos_per_channel: usize,

    /// Transcript request timeout in seconds
    #[arg(long, env = "TRANSCRIPT_TIMEOUT_SECS", default_value = "30")]
    transcript_timeout: u64,

    /// Transcript characters kept before truncation
    #[arg(long, env = "MAX_TRANSCRIPT_LENGTH", default_value = "15000")]
    max_transcript_length: usize,

    /// Human readable logs instead of bunyan JSON
    #[arg(long, env = "PRETTY_LOGS")]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process new videos once, then send the digest
    Run,
    /// Start the cron scheduler
    Cron {
        /// Cron schedule expression
        #[arg(long, env = "CRON_SCHEDULE", default_value = "0 0 */6 * * *")]
        schedule: String,
    },
    /// Send pending summaries without processing new videos
    Digest,
    /// Print pending summary statistics as JSON
    Stats,
    /// Send a sample digest to check the SMTP settings
    TestEmail,
    /// Manage monitored channels
    Channels {
        #[command(subcommand)]
        command: ChannelsCommand,
    },
}

#[derive(Subcommand)]
enum ChannelsCommand {
    List,
    Add {
        /// YouTube channel id
        id: String,
        name: String,
        #[arg(long)]
        handle: Option<String>,
    },
}

#[derive(Clone)]
struct Config {
    db_url: String,
    youtube_key: String,
    anthropic_key: String,
    rapidapi_key: Option<String>,
    model: Option<String>,
    prompt_template: Option<String>,
    smtp: Option<SmtpSettings>,
    processor: ProcessorConfig,
    cancel: CancellationToken,
}

impl Config {
    fn from_cli(cli: &Cli, cancel: CancellationToken) -> anyhow::Result<Self> {
        let prompt_template = cli
            .prompt_file
            .as_ref()
            .map(|path| {
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read prompt file {}", path.display()))
            })
            .transpose()?;

        let timezone = Tz::from_str(&cli.timezone)
            .map_err(|e| anyhow::anyhow!("Invalid timezone {}: {e}", cli.timezone))?;

        let smtp = match (&cli.smtp_username, &cli.smtp_password) {
            (Some(username), Some(password)) => Some(SmtpSettings {
                host: cli.smtp_host.clone(),
                port: cli.smtp_port,
                username: username.clone(),
                password: password.clone(),
                recipient: cli.recipient.clone(),
                subject_template: cli.subject_template.clone(),
                timezone,
            }),
            _ => None,
        };

        Ok(Self {
            db_url: cli.database_url.clone(),
            youtube_key: cli.youtube_key.clone(),
            anthropic_key: cli.anthropic_key.clone(),
            rapidapi_key: cli.rapidapi_key.clone(),
            model: cli.model.clone(),
            prompt_template,
            smtp,
            processor: ProcessorConfig {
                max_concurrent_channels: cli.max_concurrent_channels,
                max_videos_per_channel: cli.max_videos_per_channel,
                transcript_timeout: Duration::from_secs(cli.transcript_timeout),
                max_transcript_length: cli.max_transcript_length,
            },
            cancel,
        })
    }

    fn mailer(&self) -> anyhow::Result<Option<SmtpMailer>> {
        self.smtp
            .clone()
            .map(SmtpMailer::new)
            .transpose()
            .context("Failed to configure SMTP mailer")
    }
}

async fn build_processor(config: &Config) -> anyhow::Result<Processor> {
    let store = PgDataStore::init(&config.db_url).await?;

    let mut summarizer = AnthropicClient::new(&config.anthropic_key)?;
    if let Some(model) = &config.model {
        summarizer = summarizer.with_model(model);
    }
    if let Some(template) = &config.prompt_template {
        summarizer = summarizer.with_prompt_template(template);
    }

    let processor = VideoProcessorBuilder::new()
        .store(store)
        .discoverer(YouTubeClient::new(&config.youtube_key)?)
        .transcripts(TranscriptSource::from_api_key(config.rapidapi_key.clone())?)
        .summarizer(summarizer)
        .config(config.processor.clone())
        .build()?;

    Ok(processor)
}

async fn send_digest(config: &Config, processor: &Processor) -> anyhow::Result<()> {
    let Some(mailer) = config.mailer()? else {
        tracing::warn!("SMTP credentials not configured, skipping email digest");
        return Ok(());
    };

    let outcome = deliver_pending_digest(processor, &mailer).await?;
    tracing::info!(?outcome, "Digest step finished");
    Ok(())
}

async fn run_pipeline(config: &Config) -> anyhow::Result<()> {
    let processor = build_processor(config).await?;

    let report = processor.process_new_videos(&config.cancel).await?;
    tracing::info!(?report, "Video processing finished");

    if config.cancel.is_cancelled() {
        tracing::info!("Run cancelled, skipping email digest");
        return Ok(());
    }

    send_digest(config, &processor).await
}

async fn handle_tick(_tick: Tick, config: Data<Config>) -> anyhow::Result<()> {
    tracing::info!(
        max_concurrent_channels = config.processor.max_concurrent_channels,
        "Running scheduled pipeline..."
    );
    run_pipeline(&config).await
}

/// Resolves once the run token is cancelled, stopping the cron worker
async fn wait_for_shutdown(cancel: CancellationToken) -> std::io::Result<()> {
    cancel.cancelled().await;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some("production".into()),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber(cli.pretty)?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl-C, cancelling");
                cancel.cancel();
            }
        }
    });

    let config = Config::from_cli(&cli, cancel)?;

    match cli.command {
        Command::Run => {
            tracing::info!("Running pipeline once...");
            run_pipeline(&config).await?;
        }
        Command::Cron { schedule } => {
            tracing::info!(%schedule, "Starting cron scheduler...");
            let schedule = Schedule::from_str(&schedule)?;

            let shutdown = wait_for_shutdown(config.cancel.clone());
            let worker = WorkerBuilder::new("digest-pulse-cron")
                .backend(CronStream::new(schedule))
                .layer(SentryLayer::new())
                .data(config)
                .build(handle_tick);

            worker.run_until(shutdown).await?;
            tracing::info!("Cron scheduler stopped");
        }
        Command::Digest => {
            let processor = build_processor(&config).await?;
            send_digest(&config, &processor).await?;
        }
        Command::Stats => {
            let processor = build_processor(&config).await?;
            let stats = processor.summary_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::TestEmail => {
            let mailer = config
                .mailer()?
                .context("SMTP_USERNAME and SMTP_PASSWORD are required to send a test email")?;
            mailer.send_test_email().await?;
            tracing::info!("Test email sent");
        }
        Command::Channels { command } => {
            let store = PgDataStore::init(&config.db_url).await?;
            match command {
                ChannelsCommand::List => {
                    for channel in store.list_channels().await? {
                        match channel.handle {
                            Some(handle) => println!("{}\t{}\t{handle}", channel.id, channel.name),
                            None => println!("{}\t{}", channel.id, channel.name),
                        }
                    }
                }
                ChannelsCommand::Add { id, name, handle } => {
                    let mut channel = Channel::new(id, name);
                    if let Some(handle) = handle {
                        channel = channel.with_handle(handle);
                    }
                    store.add_channel(&channel).await?;
                    tracing::info!(channel_id = %channel.id, "Channel added");
                }
            }
        }
    }

    Ok(())
}
