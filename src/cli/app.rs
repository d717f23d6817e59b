use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::chat::{ActivationPolicy, ApplyOutcome, ChatSession, ChatSettings, apply_reply};
use crate::cli::commands::{Command, FileTarget, HELP_TEXT, is_command_line, parse_command};
use crate::cli::editor::{EditAction, EditorCursor};
use crate::cli::theme::Theme;
use crate::cli::timeline::{AssistantTurnState, OutputKind, Timeline};
use crate::config::{AppConfig, GenerationConfig};
use crate::http::HttpClient;
use crate::llm::gemini::GeminiProvider;
use crate::trace::{SessionTrace, TraceKind};
use crate::workspace::{FileId, FileStore};

pub(crate) const MISSING_KEY_MESSAGE: &str = "Assistant unavailable: missing GEMINI_API_KEY. Set it in your shell, .env or config file, or use /key <api-key>.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Chat,
    Editor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    Continue,
    Quit,
    Submit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Submission {
    Handled,
    Quit,
    Prompt(PendingPrompt),
}

/// A chat message shown as in flight, waiting for `complete_prompt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingPrompt {
    turn_index: usize,
    text: String,
}

pub struct AppState {
    pub(crate) store: FileStore,
    pub(crate) session: ChatSession,
    pub(crate) llm: Option<GeminiProvider>,
    http: HttpClient,
    base_url: String,
    generation: GenerationConfig,
    policy: ActivationPolicy,
    pub(crate) trace: SessionTrace,
    pub(crate) theme: Theme,
    pub(crate) focus: Focus,
    pub(crate) input: String,
    pub(crate) timeline: Timeline,
    pub(crate) cursor: EditorCursor,
    pub(crate) busy: bool,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        store: FileStore,
        http: HttpClient,
        trace: SessionTrace,
        color: bool,
    ) -> Self {
        let llm = GeminiProvider::new(
            http.clone(),
            config.gemini_api_key.clone(),
            config.gemini_base_url.clone(),
            config.generation,
        )
        .ok();

        Self {
            store,
            session: ChatSession::new(ChatSettings {
                model: config.gemini_model.clone(),
                system_prompt: config.system_prompt.clone(),
            }),
            llm,
            http,
            base_url: config.gemini_base_url.clone(),
            generation: config.generation,
            policy: config.activation,
            trace,
            theme: Theme::from_config(color, &config.theme),
            focus: Focus::Chat,
            input: String::new(),
            timeline: Timeline::new(),
            cursor: EditorCursor::default(),
            busy: false,
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Continue;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c' | 'd') => return KeyOutcome::Quit,
                KeyCode::Char('n') => self.select_relative(1),
                KeyCode::Char('p') => self.select_relative(-1),
                _ => {}
            }
            return KeyOutcome::Continue;
        }

        match self.focus {
            Focus::Chat => self.handle_chat_key(key),
            Focus::Editor => {
                self.handle_editor_key(key);
                KeyOutcome::Continue
            }
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Tab => {
                self.focus = Focus::Editor;
                self.cursor.clamp(self.store.code());
            }
            KeyCode::Enter => {
                if self.busy || self.input.trim().is_empty() {
                    return KeyOutcome::Continue;
                }
                return KeyOutcome::Submit(std::mem::take(&mut self.input));
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Esc => self.input.clear(),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::ALT) => {
                self.input.push(ch);
            }
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let action = match key.code {
            KeyCode::Esc => {
                self.focus = Focus::Chat;
                return;
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::ALT) => {
                EditAction::Insert(ch)
            }
            KeyCode::Tab => EditAction::Indent,
            KeyCode::Enter => EditAction::Newline,
            KeyCode::Backspace => EditAction::Backspace,
            KeyCode::Delete => EditAction::Delete,
            KeyCode::Left => EditAction::Left,
            KeyCode::Right => EditAction::Right,
            KeyCode::Up => EditAction::Up,
            KeyCode::Down => EditAction::Down,
            KeyCode::Home => EditAction::Home,
            KeyCode::End => EditAction::End,
            _ => return,
        };

        if let Some(next) = self.cursor.apply(self.store.code(), action) {
            self.store.set_code(&next);
        }
    }

    fn select_relative(&mut self, delta: isize) {
        let len = self.store.len();
        if len == 0 {
            return;
        }

        let current = self
            .store
            .active_id()
            .and_then(|id| self.store.position_of(id))
            .unwrap_or(0);
        let next = (current as isize + delta).rem_euclid(len as isize) as usize;
        if let Some(id) = self.store.id_at(next) {
            self.activate(id);
        }
    }

    fn activate(&mut self, id: FileId) {
        if self.store.set_active_file(id) {
            self.cursor.reset();
        }
    }

    /// Runs a command right away, or records a chat message as in flight.
    pub(crate) fn submit_line(&mut self, line: &str) -> Submission {
        let line = line.trim();
        if line.is_empty() {
            return Submission::Handled;
        }

        if is_command_line(line) {
            let shown = redact_command(line);
            self.trace.record(TraceKind::Command, &shown);
            self.timeline.push_user_command(&shown);
            return match parse_command(line) {
                Ok(Command::Quit) => Submission::Quit,
                Ok(command) => {
                    self.run_command(command);
                    Submission::Handled
                }
                Err(err) => {
                    self.timeline
                        .push_output(OutputKind::SystemError, err.message());
                    Submission::Handled
                }
            };
        }

        self.busy = true;
        let turn_index = self.timeline.push_assistant_turn(line.to_string());
        Submission::Prompt(PendingPrompt {
            turn_index,
            text: line.to_string(),
        })
    }

    pub(crate) async fn complete_prompt(&mut self, pending: PendingPrompt) {
        self.trace.record(TraceKind::ChatIn, &pending.text);

        let state = match &self.llm {
            None => {
                self.trace.record(TraceKind::ChatErr, MISSING_KEY_MESSAGE);
                AssistantTurnState::Failed(MISSING_KEY_MESSAGE.to_string())
            }
            Some(provider) => match self.session.send(provider, &pending.text).await {
                Ok(reply) => {
                    self.trace.record(TraceKind::ChatOut, &reply);
                    let outcome = apply_reply(&mut self.store, &reply, self.policy);
                    self.cursor.clamp(self.store.code());
                    let note = self.describe_outcome(&outcome);
                    if !note.is_empty() {
                        self.trace.record(TraceKind::Files, &note);
                    }
                    AssistantTurnState::Completed {
                        message: outcome.message().to_string(),
                        note,
                    }
                }
                Err(err) => {
                    let message = format!("Assistant request failed: {err}");
                    self.trace.record(TraceKind::ChatErr, &message);
                    AssistantTurnState::Failed(message)
                }
            },
        };

        if let Some(turn) = self.timeline.assistant_turn_mut(pending.turn_index) {
            turn.state = state;
        }
        self.busy = false;
    }

    fn describe_outcome(&self, outcome: &ApplyOutcome) -> String {
        match outcome {
            ApplyOutcome::Files { names, .. } => {
                let active = self
                    .store
                    .active_file()
                    .map_or(String::new(), |file| format!(" (editing {})", file.name));
                format!("updated {}{active}", names.join(", "))
            }
            ApplyOutcome::Code { .. } => match self.store.active_file() {
                Some(file) => format!("replaced the code of {}", file.name),
                None => "replaced the editor buffer".to_string(),
            },
            ApplyOutcome::Nothing { .. } => String::new(),
        }
    }

    fn run_command(&mut self, command: Command) {
        match command {
            Command::Help => self.info(HELP_TEXT),
            Command::Files => {
                let listing = self.files_listing();
                self.info(&listing);
            }
            Command::Open(target) => match self.resolve_target(&target) {
                Some(id) => {
                    self.activate(id);
                    self.info(&format!("opened {}", self.active_name()));
                }
                None => self.lookup_miss(&target),
            },
            Command::New { name } => {
                if self.store.find_by_name(&name).is_some() {
                    self.error(&format!("file '{}' already exists", name.trim()));
                    return;
                }
                match self.store.add_or_update_file(&name, "", "") {
                    Ok(id) => {
                        self.activate(id);
                        let message = format!("created {}", self.active_name());
                        self.trace.record(TraceKind::Files, &message);
                        self.info(&message);
                    }
                    Err(err) => self.error(&err.to_string()),
                }
            }
            Command::Remove(target) => {
                let id = match &target {
                    Some(target) => self.resolve_target(target),
                    None => self.store.active_id(),
                };
                let Some(id) = id else {
                    match &target {
                        Some(target) => self.lookup_miss(target),
                        None => self.error("no active file"),
                    }
                    return;
                };
                if let Some(removed) = self.store.remove_file(id) {
                    self.cursor.clamp(self.store.code());
                    let message = format!("removed {}", removed.name);
                    self.trace.record(TraceKind::Files, &message);
                    self.info(&message);
                }
            }
            Command::Clear => {
                self.session.clear();
                self.timeline.clear();
                self.info("Chat history cleared.");
            }
            Command::Model(None) => {
                let message = format!("model: {}", self.session.settings().model);
                self.info(&message);
            }
            Command::Model(Some(model)) => {
                if self.session.set_model(&model) {
                    self.info(&format!("model set to {}", model.trim()));
                } else {
                    self.error("usage: /model [name]");
                }
            }
            Command::System(None) => {
                let prompt = &self.session.settings().system_prompt;
                let message = if prompt.is_empty() {
                    "system prompt: (empty)".to_string()
                } else {
                    format!("system prompt: {prompt}")
                };
                self.info(&message);
            }
            Command::System(Some(prompt)) => {
                self.session.set_system_prompt(&prompt);
                self.info("system prompt updated");
            }
            Command::Key { key } => {
                match GeminiProvider::new(
                    self.http.clone(),
                    Some(key),
                    self.base_url.clone(),
                    self.generation,
                ) {
                    Ok(provider) => {
                        self.llm = Some(provider);
                        self.info("API key updated");
                    }
                    Err(err) => self.error(&err.to_string()),
                }
            }
            Command::Trace => {
                let message = format!("trace: {}", self.trace.file_path().display());
                self.info(&message);
            }
            Command::Quit => {}
        }
    }

    fn resolve_target(&self, target: &FileTarget) -> Option<FileId> {
        match target {
            FileTarget::Position(position) => self.store.id_at(position - 1),
            FileTarget::Name(name) => self.store.find_by_name(name).map(|file| file.id),
        }
    }

    fn lookup_miss(&mut self, target: &FileTarget) {
        let message = match target {
            FileTarget::Position(position) => format!("no file at position {position}"),
            FileTarget::Name(name) => format!("no file named '{name}'"),
        };
        self.trace.record(TraceKind::Command, &message);
        self.error(&message);
    }

    fn files_listing(&self) -> String {
        if self.store.is_empty() {
            return "No files. Ask the assistant for some, or use /new <name>.".to_string();
        }

        let active = self.store.active_id();
        self.store
            .list_files()
            .iter()
            .enumerate()
            .map(|(idx, file)| {
                let marker = if Some(file.id) == active { '*' } else { ' ' };
                let language = if file.language.is_empty() {
                    "text"
                } else {
                    &file.language
                };
                format!("{}. {marker} {} ({language})", idx + 1, file.name)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn active_name(&self) -> String {
        self.store
            .active_file()
            .map_or_else(String::new, |file| file.name.clone())
    }

    fn info(&mut self, text: &str) {
        self.timeline.push_output(OutputKind::SystemInfo, text);
    }

    fn error(&mut self, text: &str) {
        self.timeline.push_output(OutputKind::SystemError, text);
    }
}

fn redact_command(line: &str) -> String {
    let is_key_command = line
        .split_whitespace()
        .next()
        .is_some_and(|name| name.eq_ignore_ascii_case("/key"));
    if is_key_command && line.split_whitespace().nth(1).is_some() {
        "/key ***REDACTED***".to_string()
    } else {
        line.to_string()
    }
}
