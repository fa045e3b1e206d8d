// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use the_ragwood::boundary::ChannelBoundary;
use the_ragwood::config::{load_and_validate_config, validate_config, Config, Runtime, RuntimeBuilder};
use the_ragwood::errors::ConfigError;
use the_ragwood::observability::init_tracing;
use the_ragwood::protocol::{Notification, SourceMetadata};

const USAGE: &str = "Usage: the-ragwood [--config <file>] <document>... [--ask <question>]...
       Without --ask, questions are read from stdin until EOF or 'exit'.
Example: the-ragwood demos/refund-policy.md --ask \"When are refunds issued?\"";

#[derive(Debug, Default, PartialEq)]
struct Cli {
    config: Option<PathBuf>,
    documents: Vec<PathBuf>,
    questions: Vec<String>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> anyhow::Result<Cli> {
    let mut cli = Cli::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a file path")?;
                cli.config = Some(PathBuf::from(path));
            }
            "--ask" | "-a" => {
                let question = args.next().context("--ask needs a question")?;
                cli.questions.push(question);
            }
            flag if flag.starts_with('-') => bail!("unknown option '{}'", flag),
            document => cli.documents.push(PathBuf::from(document)),
        }
    }

    Ok(cli)
}

fn load(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("loading {}", path.display())),
        None => {
            let mut config = Config::default();
            config.apply_api_key_from(|name| env::var(name).ok());
            validate_config(&config).map_err(ConfigError::Invalid)?;
            Ok(config)
        }
    }
}

/// Each retrieved chunk under a header naming its file, separated by rules.
fn format_sources(chunks: &[String], metadata: &[SourceMetadata]) -> String {
    let mut out = String::new();
    for (idx, chunk) in chunks.iter().enumerate() {
        let file_name = metadata
            .get(idx)
            .map(|m| m.file_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown File");
        let offset = metadata
            .get(idx)
            .and_then(|m| m.start_index)
            .map(|o| format!(" (offset {})", o))
            .unwrap_or_default();

        out.push_str(&format!("  Chunk {} from {}{}:\n", idx + 1, file_name, offset));
        for line in chunk.lines() {
            out.push_str(&format!("    {}\n", line));
        }
        out.push_str("  ---\n");
    }
    out
}

/// Print whatever the coordinator has delivered so far.
fn print_notifications(receiver: &mut UnboundedReceiver<Notification>) {
    while let Ok(notification) = receiver.try_recv() {
        match notification {
            Notification::StatusUpdate { status, .. } => println!("⏳ {}", status),
            Notification::FinalResponse {
                answer,
                source_chunks,
                source_metadata,
                ..
            } => {
                println!("\n💬 {}\n", answer);
                if !source_chunks.is_empty() {
                    println!("Source context:");
                    print!("{}", format_sources(&source_chunks, &source_metadata));
                }
            }
            Notification::ErrorMessage { error, context, .. } => {
                eprintln!("❌ {} ({})", error, context)
            }
        }
    }
}

async fn interactive(
    runtime: &Runtime,
    receiver: &mut UnboundedReceiver<Notification>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Ask a question (or 'exit'):");

    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }
        if question.is_empty() {
            continue;
        }
        runtime.submit_query(question).await;
        print_notifications(receiver);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");

    let cli = parse_args(env::args().skip(1)).map_err(|e| {
        eprintln!("{}", USAGE);
        e
    })?;
    let config = load(&cli)?;

    let (boundary, mut receiver) = ChannelBoundary::new();
    let runtime = RuntimeBuilder::from_config(&config)
        .build(Arc::new(boundary))
        .await?;

    println!("📚 The RAGwood");
    println!("══════════════");

    for document in &cli.documents {
        println!("\nUploading {}", document.display());
        runtime.submit_upload(document).await;
        print_notifications(&mut receiver);
    }
    runtime.prune_uploads().await;
    println!("\nIndexed chunks: {}", runtime.indexed_chunks().await);

    if cli.questions.is_empty() {
        interactive(&runtime, &mut receiver).await?;
    } else {
        for question in &cli.questions {
            println!("\n❓ {}", question);
            runtime.submit_query(question).await;
            print_notifications(&mut receiver);
        }
    }

    Ok(())
}
