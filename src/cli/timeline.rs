use crate::cli::theme::Theme;
use crate::config::ThemeToken;
use ratatui::text::{Line, Span};

pub(crate) const WELCOME_TEXT: &str =
    "Welcome to codepad. Describe what to build; Tab switches to the editor, /help lists commands.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputKind {
    SystemInfo,
    SystemError,
}

#[derive(Debug, Clone)]
pub(crate) enum TimelineEntry {
    UserCommand(String),
    OutputLine { kind: OutputKind, text: String },
    AssistantTurn(AssistantTurn),
}

#[derive(Debug, Clone)]
pub(crate) struct AssistantTurn {
    pub(crate) prompt: String,
    pub(crate) state: AssistantTurnState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AssistantTurnState {
    InFlight,
    /// The reply's prose plus a note on what it did to the workspace.
    Completed { message: String, note: String },
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_output(&mut self, kind: OutputKind, text: &str) {
        for line in split_output_lines(text) {
            self.entries.push(TimelineEntry::OutputLine {
                kind,
                text: line.to_string(),
            });
        }
    }

    pub(crate) fn push_user_command(&mut self, text: &str) {
        self.entries
            .push(TimelineEntry::UserCommand(text.trim().to_string()));
    }

    pub(crate) fn push_assistant_turn(&mut self, prompt: String) -> usize {
        let index = self.entries.len();
        self.entries.push(TimelineEntry::AssistantTurn(AssistantTurn {
            prompt,
            state: AssistantTurnState::InFlight,
        }));
        index
    }

    pub(crate) fn assistant_turn_mut(&mut self, index: usize) -> Option<&mut AssistantTurn> {
        match self.entries.get_mut(index) {
            Some(TimelineEntry::AssistantTurn(turn)) => Some(turn),
            _ => None,
        }
    }

    pub(crate) fn render_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        if self.entries.is_empty() {
            return vec![Line::from(Span::styled(
                WELCOME_TEXT,
                theme.style(ThemeToken::SystemInfo),
            ))];
        }

        let mut lines = Vec::new();
        for entry in &self.entries {
            widget_for_entry(entry).render(theme, &mut lines);
        }

        lines
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

trait TimelineWidget {
    fn render(&self, theme: &Theme, lines: &mut Vec<Line<'static>>);
}

struct CommandInputWidget<'a> {
    text: &'a str,
}

impl TimelineWidget for CommandInputWidget<'_> {
    fn render(&self, theme: &Theme, lines: &mut Vec<Line<'static>>) {
        lines.push(prompt_line(theme, self.text));
    }
}

struct OutputLineWidget<'a> {
    kind: OutputKind,
    text: &'a str,
}

impl TimelineWidget for OutputLineWidget<'_> {
    fn render(&self, theme: &Theme, lines: &mut Vec<Line<'static>>) {
        lines.push(Line::from(Span::styled(
            self.text.to_string(),
            theme.style(output_token_for(self.kind)),
        )));
    }
}

struct AssistantTurnWidget<'a> {
    turn: &'a AssistantTurn,
}

impl TimelineWidget for AssistantTurnWidget<'_> {
    fn render(&self, theme: &Theme, lines: &mut Vec<Line<'static>>) {
        for (idx, prompt_text) in split_output_lines(&self.turn.prompt).into_iter().enumerate() {
            if idx == 0 {
                lines.push(prompt_line(theme, prompt_text));
            } else {
                lines.push(Line::from(Span::styled(
                    format!("{PROMPT_PADDING}{prompt_text}"),
                    theme.style(ThemeToken::UserInput),
                )));
            }
        }

        match &self.turn.state {
            AssistantTurnState::InFlight => {
                lines.push(Line::from(Span::styled(
                    "  Thinking...",
                    theme.style(ThemeToken::AssistantWaiting),
                )));
            }
            AssistantTurnState::Completed { message, note } => {
                push_styled(lines, message, theme.style(ThemeToken::AssistantText));
                push_styled(lines, note, theme.style(ThemeToken::SystemInfo));
            }
            AssistantTurnState::Failed(message) => {
                push_styled(lines, message, theme.style(ThemeToken::SystemError));
            }
        }
        lines.push(Line::from(""));
    }
}

const PROMPT: &str = "you> ";
const PROMPT_PADDING: &str = "     ";

fn prompt_line(theme: &Theme, text: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(PROMPT, theme.style(ThemeToken::ChatPrompt)),
        Span::styled(text.to_string(), theme.style(ThemeToken::UserInput)),
    ])
}

fn push_styled(lines: &mut Vec<Line<'static>>, text: &str, style: ratatui::style::Style) {
    for line in split_output_lines(text) {
        lines.push(Line::from(Span::styled(line.to_string(), style)));
    }
}

fn widget_for_entry(entry: &TimelineEntry) -> Box<dyn TimelineWidget + '_> {
    match entry {
        TimelineEntry::UserCommand(text) => Box::new(CommandInputWidget { text }),
        TimelineEntry::OutputLine { kind, text } => {
            Box::new(OutputLineWidget { kind: *kind, text })
        }
        TimelineEntry::AssistantTurn(turn) => Box::new(AssistantTurnWidget { turn }),
    }
}

/// Hard-wraps rendered lines to `width` columns, keeping span styles.
pub(crate) fn wrap_lines(lines: Vec<Line<'static>>, width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut wrapped = Vec::with_capacity(lines.len());

    for line in lines {
        let mut current: Vec<Span<'static>> = Vec::new();
        let mut used = 0;
        for span in line.spans {
            let mut chunk = String::new();
            for ch in span.content.chars() {
                if used == width {
                    if !chunk.is_empty() {
                        current.push(Span::styled(std::mem::take(&mut chunk), span.style));
                    }
                    wrapped.push(Line::from(std::mem::take(&mut current)));
                    used = 0;
                }
                chunk.push(ch);
                used += 1;
            }
            if !chunk.is_empty() {
                current.push(Span::styled(chunk, span.style));
            }
        }
        wrapped.push(Line::from(current));
    }

    wrapped
}

fn split_output_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }

    text.lines().collect()
}

fn output_token_for(kind: OutputKind) -> ThemeToken {
    match kind {
        OutputKind::SystemInfo => ThemeToken::SystemInfo,
        OutputKind::SystemError => ThemeToken::SystemError,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AssistantTurnState, OutputKind, Timeline, WELCOME_TEXT, split_output_lines, wrap_lines,
    };
    use crate::cli::theme::Theme;
    use ratatui::text::Line;

    fn text_lines(lines: Vec<Line<'static>>) -> Vec<String> {
        lines.into_iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn split_lines_works() {
        assert_eq!(split_output_lines("a\nb\n"), vec!["a", "b"]);
        assert!(split_output_lines("").is_empty());
    }

    #[test]
    fn empty_timeline_renders_welcome_message() {
        let lines = text_lines(Timeline::new().render_lines(&Theme::new(false)));
        assert_eq!(lines, vec![WELCOME_TEXT.to_string()]);
    }

    #[test]
    fn inflight_turn_shows_thinking_line() {
        let mut timeline = Timeline::new();
        timeline.push_assistant_turn("make a button".to_string());

        let lines = text_lines(timeline.render_lines(&Theme::new(false)));
        assert_eq!(lines, vec!["you> make a button", "  Thinking...", ""]);
    }

    #[test]
    fn completed_turn_replaces_thinking_with_message_and_note() {
        let mut timeline = Timeline::new();
        let idx = timeline.push_assistant_turn("make a button".to_string());
        timeline
            .assistant_turn_mut(idx)
            .expect("assistant turn index should exist")
            .state = AssistantTurnState::Completed {
            message: "Here it is.\nEnjoy.".to_string(),
            note: "updated Button.tsx".to_string(),
        };

        let lines = text_lines(timeline.render_lines(&Theme::new(false)));
        assert_eq!(
            lines,
            vec![
                "you> make a button",
                "Here it is.",
                "Enjoy.",
                "updated Button.tsx",
                ""
            ]
        );
    }

    #[test]
    fn failed_turn_renders_error() {
        let mut timeline = Timeline::new();
        let idx = timeline.push_assistant_turn("hi".to_string());
        timeline
            .assistant_turn_mut(idx)
            .expect("assistant turn index should exist")
            .state = AssistantTurnState::Failed("Assistant request failed: boom".to_string());

        let lines = text_lines(timeline.render_lines(&Theme::new(false)));
        assert!(lines.iter().any(|line| line == "Assistant request failed: boom"));
        assert!(!lines.iter().any(|line| line.contains("Thinking")));
    }

    #[test]
    fn assistant_turn_mut_rejects_other_entries() {
        let mut timeline = Timeline::new();
        timeline.push_output(OutputKind::SystemInfo, "info");
        assert!(timeline.assistant_turn_mut(0).is_none());
        assert!(timeline.assistant_turn_mut(7).is_none());
    }

    #[test]
    fn mixed_entries_render_in_order() {
        let mut timeline = Timeline::new();
        timeline.push_user_command("/files");
        timeline.push_output(OutputKind::SystemInfo, "1. * App.tsx\n2.   styles.css");
        timeline.push_output(OutputKind::SystemError, "unknown command '/x'. Try /help");

        let lines = text_lines(timeline.render_lines(&Theme::new(false)));
        assert_eq!(
            lines,
            vec![
                "you> /files",
                "1. * App.tsx",
                "2.   styles.css",
                "unknown command '/x'. Try /help"
            ]
        );

        timeline.clear();
        let lines = text_lines(timeline.render_lines(&Theme::new(false)));
        assert_eq!(lines, vec![WELCOME_TEXT.to_string()]);
    }

    #[test]
    fn multiline_prompt_is_indented_under_prompt_marker() {
        let mut timeline = Timeline::new();
        timeline.push_assistant_turn("first\nsecond".to_string());

        let lines = text_lines(timeline.render_lines(&Theme::new(false)));
        assert_eq!(lines[0], "you> first");
        assert_eq!(lines[1], "     second");
    }

    #[test]
    fn wrap_lines_splits_long_lines_across_spans() {
        let mut timeline = Timeline::new();
        timeline.push_user_command("abcdefgh");
        let wrapped = text_lines(wrap_lines(timeline.render_lines(&Theme::new(false)), 6));

        assert_eq!(wrapped, vec!["you> a", "bcdefg", "h"]);
    }

    #[test]
    fn wrap_lines_keeps_empty_lines() {
        let wrapped = text_lines(wrap_lines(vec![Line::from(""), Line::from("ab")], 4));
        assert_eq!(wrapped, vec!["", "ab"]);
    }
}
