//! lkgpt CLI - ask a question, hear the answer sentence by sentence.
//!
//! With a prompt argument, answers it once. Without one, reads prompts from
//! stdin line by line and keeps the conversation history between answers.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use lkgpt::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Stream a chat completion one sentence per line
#[derive(Parser)]
#[command(name = "lkgpt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Language code the assistant answers in
    #[arg(short, long, env = "LKGPT_LANGUAGE", default_value = CompletionConfig::DEFAULT_LANGUAGE)]
    language: String,

    /// Model to use
    #[arg(short, long, env = "LKGPT_MODEL", default_value = CompletionConfig::DEFAULT_MODEL)]
    model: String,

    /// Name the assistant introduces itself with
    #[arg(long, env = "LKGPT_ASSISTANT_NAME", default_value = CompletionConfig::DEFAULT_ASSISTANT_NAME)]
    assistant_name: String,

    /// JSON file with prior conversation: `[{"name": ..., "transcript": ...}]`
    #[arg(long)]
    history: Option<PathBuf>,

    /// Speaker name recorded for your prompts
    #[arg(short, long, default_value = "User")]
    name: String,

    /// Prompt to answer; omit to read prompts from stdin
    prompt: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lkgpt={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let config = CompletionConfig::new(cli.language)
        .with_model(cli.model)
        .with_assistant_name(cli.assistant_name);
    let assistant = config.assistant_name.clone();

    let client = OpenAI::from_env().map_err(|e| Error::config(e.to_string()))?;
    let completion = ChatCompletion::new(client, config);

    let mut history = match &cli.history {
        Some(path) => load_history(path).await?,
        None => Vec::new(),
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling completion");
            on_interrupt.cancel();
        }
    });

    if let Some(prompt) = cli.prompt {
        answer(&completion, &cancel, &history, &prompt).await?;
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}: ", cli.name);
        std::io::stdout().flush()?;

        let line = tokio::select! {
            () = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(prompt) = line else { break };
        let prompt = prompt.trim();
        if prompt.is_empty() {
            continue;
        }

        let reply = answer(&completion, &cancel, &history, prompt).await?;
        history.push(Sentence::new(&cli.name, prompt));
        history.push(Sentence::new(&assistant, reply));
    }

    println!();
    Ok(())
}

/// Answer one prompt, printing each sentence as soon as it is complete.
///
/// Returns the full answer so it can be added to the history.
async fn answer(
    completion: &ChatCompletion,
    cancel: &CancellationToken,
    history: &[Sentence],
    prompt: &str,
) -> Result<String> {
    let mut stream = completion.complete(cancel, history, prompt).await?;
    let mut reply = String::new();

    let outcome = loop {
        match stream.next_sentence().await {
            Ok(sentence) => {
                let sentence = sentence.trim();
                println!("{sentence}");
                if !reply.is_empty() {
                    reply.push(' ');
                }
                reply.push_str(sentence);
            }
            Err(err) if err.is_exhausted() => break Ok(reply),
            Err(err) => break Err(err),
        }
    };
    stream.close();

    outcome
}

/// Read a JSON array of sentences.
async fn load_history(path: &Path) -> Result<Vec<Sentence>> {
    let content = tokio::fs::read_to_string(path).await?;
    let history: Vec<Sentence> = serde_json::from_str(&content)?;
    tracing::debug!(path = %path.display(), sentences = history.len(), "loaded history");
    Ok(history)
}
