mod cli;
mod config;
mod logging;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use pinorama_client::{parse_line, BulkQueue, PinoramaClient};
use pinorama_server::ServerConfig;

use cli::{Cli, Command, IngestArgs, PresetsArgs, ServeArgs, StudioArgs};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());

    let result = match cli.command {
        Command::Serve(args) => {
            logging::init_stderr(&level)?;
            run_serve(args, config.server).await
        }
        Command::Studio(args) => {
            let _guard = logging::init_file(&level, &config.log_dir())?;
            run_studio(args, &config).await
        }
        Command::Ingest(args) => {
            logging::init_stderr(&level)?;
            run_ingest(args, &config).await
        }
        Command::Presets(args) => run_presets(args),
    };

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_serve(args: ServeArgs, mut server: ServerConfig) -> Result<()> {
    args.apply(&mut server);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            pinorama_server::shutdown_signal().await;
            shutdown.cancel();
        }
    });

    pinorama_server::serve(server, shutdown)
        .await
        .context("Server failed")
}

async fn run_studio(args: StudioArgs, config: &Config) -> Result<()> {
    let env_lang = std::env::var("LANG").ok();
    let options = args.studio_options(&config.studio, env_lang.as_deref());

    let mut client_options = args.connect.client_options(&config.client);
    // Interactive use: report an unreachable server quickly
    if config.client.max_retries.is_none() {
        client_options.max_retries = 1;
    }
    let client = PinoramaClient::new(client_options).context("Failed to create client")?;

    pinorama_studio::run(client, options)
        .await
        .context("Studio terminated unexpectedly")
}

async fn run_ingest(args: IngestArgs, config: &Config) -> Result<()> {
    let queue_options = args.queue_options();
    let pipe = args.pipe;
    let file = args.file.clone();
    let client = PinoramaClient::new(args.connect.client_options(&config.client))
        .context("Failed to create client")?;
    tracing::info!(url = %client.url(), "Ingesting logs");

    let queue = BulkQueue::spawn(client, queue_options);
    let read = match file {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            push_lines(BufReader::new(file), &queue, pipe).await
        }
        None => push_lines(BufReader::new(tokio::io::stdin()), &queue, pipe).await,
    };

    let stats = queue.close().await;
    tracing::info!(
        sent = stats.sent_records,
        batches = stats.sent_batches,
        failed = stats.failed_records,
        "Ingestion finished"
    );
    let skipped = read?;
    if skipped > 0 {
        tracing::warn!(lines = skipped, "Skipped blank lines");
    }

    if stats.failed_records > 0 {
        anyhow::bail!(
            "{} of {} records could not be sent",
            stats.failed_records,
            stats.failed_records + stats.sent_records
        );
    }
    Ok(())
}

/// Queue every line of `reader`, returning the number of lines skipped
async fn push_lines<R>(reader: R, queue: &BulkQueue, pipe: bool) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut skipped = 0;
    let mut stdout = std::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if pipe {
            writeln!(stdout, "{}", line).context("Failed to write to stdout")?;
        }
        match parse_line(&line, chrono::Utc::now().timestamp_millis()) {
            Some(record) => queue.push(record)?,
            None => skipped += 1,
        }
    }
    Ok(skipped)
}

fn run_presets(args: PresetsArgs) -> Result<()> {
    let preset = match (args.file, args.name) {
        (Some(path), _) => pinorama_presets::load_file(&path)?,
        (None, Some(name)) => pinorama_presets::find(&name)?,
        (None, None) => {
            for preset in pinorama_presets::builtin()? {
                println!("{:<10} {}", preset.name, preset.description);
            }
            return Ok(());
        }
    };

    let json = serde_json::to_string_pretty(&preset.introspection)?;
    println!("{}", json);
    Ok(())
}
