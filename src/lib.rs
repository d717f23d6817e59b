pub mod chat;
pub mod cli;
pub mod config;
pub mod extract;
pub mod http;
pub mod llm;
pub mod trace;
pub mod workspace;

use anyhow::{Result, anyhow, bail};
use chat::{ApplyOutcome, ChatSession, ChatSettings, apply_reply};
use cli::{AppState, CliArgs, run_repl};
use config::AppConfig;
use http::{HttpClient, HttpDebugConfig};
use llm::gemini::GeminiProvider;
use std::env;
use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};
use trace::{SessionTrace, TraceKind};
use workspace::{FileStore, starter_workspace};

pub async fn run(args: CliArgs) -> Result<()> {
    let config = AppConfig::load_with_path(args.config.as_deref())?;
    let session_id = generate_session_id();
    let trace = SessionTrace::create(&session_id)?;
    trace.record(
        TraceKind::Session,
        &format!(
            "model {} config {}",
            config.gemini_model,
            config.config_path.display()
        ),
    );

    if let Some(prompt) = args.prompt.as_deref() {
        let http = HttpClient::new(
            reqwest::Client::new(),
            HttpDebugConfig::from_verbose(args.verbose),
        )
        .with_trace(trace.clone());
        let output = run_prompt_once(&config, http, &trace, prompt, args.empty).await?;
        print!("{output}");
        return Ok(());
    }

    // The TUI owns the terminal, so HTTP debug output only goes to the trace.
    let http = HttpClient::new(reqwest::Client::new(), HttpDebugConfig::disabled())
        .with_trace(trace.clone());
    let store = starter_workspace(args.empty)
        .map_err(|err| anyhow!("Failed to create starter workspace: {err}"))?;
    let color = env::var_os("NO_COLOR").is_none();
    let mut state = AppState::new(&config, store, http, trace, color);

    run_repl(&mut state).await
}

/// Sends one message, applies the reply to a new workspace and renders the
/// result in the same `FILE:` format the assistant uses.
pub async fn run_prompt_once(
    config: &AppConfig,
    http: HttpClient,
    trace: &SessionTrace,
    prompt: &str,
    empty: bool,
) -> Result<String> {
    let provider = GeminiProvider::new(
        http,
        config.gemini_api_key.clone(),
        config.gemini_base_url.clone(),
        config.generation,
    )
    .map_err(|err| anyhow!("Failed to start assistant: {err}"))?;
    let mut store = starter_workspace(empty)?;
    let mut session = ChatSession::new(ChatSettings {
        model: config.gemini_model.clone(),
        system_prompt: config.system_prompt.clone(),
    });

    trace.record(TraceKind::ChatIn, prompt);
    let reply = match session.send(&provider, prompt).await {
        Ok(reply) => reply,
        Err(err) => {
            trace.record(TraceKind::ChatErr, &err.to_string());
            bail!("Assistant request failed: {err}");
        }
    };
    trace.record(TraceKind::ChatOut, &reply);

    let outcome = apply_reply(&mut store, &reply, config.activation);
    if let ApplyOutcome::Files { names, .. } = &outcome {
        trace.record(TraceKind::Files, &format!("updated {}", names.join(", ")));
    }

    Ok(render_workspace(outcome.message(), &store))
}

pub fn render_workspace(message: &str, store: &FileStore) -> String {
    let mut out = String::new();
    if !message.is_empty() {
        let _ = writeln!(out, "{message}\n");
    }
    for file in store.list_files() {
        let _ = writeln!(
            out,
            "FILE: {}\n```{}\n{}\n```\n",
            file.name, file.language, file.content
        );
    }

    let mut out = out.trim_end().to_string();
    out.push('\n');
    out
}

fn generate_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis());
    format!("{millis:x}-{:x}", std::process::id())
}
