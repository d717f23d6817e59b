use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::cli::app::{AppState, Focus};
use crate::cli::timeline::wrap_lines;
use crate::config::ThemeToken;

const FILE_LIST_WIDTH: u16 = 26;
const LINE_NUMBER_WIDTH: u16 = 5;
const INPUT_PROMPT: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Regions {
    pub(crate) status: Rect,
    pub(crate) files: Rect,
    pub(crate) code: Rect,
    pub(crate) timeline: Rect,
    pub(crate) input: Rect,
}

pub(crate) fn compute_regions(area: Rect) -> Regions {
    let [status, main, input] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(4),
        Constraint::Length(3),
    ])
    .areas(area);
    let [files, right] =
        Layout::horizontal([Constraint::Length(FILE_LIST_WIDTH), Constraint::Min(10)])
            .areas(main);
    let [code, timeline] =
        Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(right);

    Regions {
        status,
        files,
        code,
        timeline,
        input,
    }
}

pub(crate) fn draw(frame: &mut Frame<'_>, state: &AppState) {
    let regions = compute_regions(frame.area());

    draw_status(frame, state, regions.status);
    draw_files(frame, state, regions.files);
    draw_code(frame, state, regions.code);
    draw_timeline(frame, state, regions.timeline);
    draw_input(frame, state, regions.input);
}

pub(crate) fn status_text(state: &AppState) -> String {
    let file = match state.store.active_file() {
        Some(file) => format!(
            "{} Ln {}, Col {}",
            file.name,
            state.cursor.line + 1,
            state.cursor.col + 1
        ),
        None => "no file".to_string(),
    };
    let focus = match state.focus {
        Focus::Chat => "chat",
        Focus::Editor => "editor",
    };
    let mut text = format!(
        " codepad | {} | {file} | {focus}",
        state.session.settings().model
    );
    if state.llm.is_none() {
        text.push_str(" | no API key");
    }
    if state.busy {
        text.push_str(" | waiting for the assistant...");
    }
    text
}

fn draw_status(frame: &mut Frame<'_>, state: &AppState, area: Rect) {
    let style = state.theme.style(ThemeToken::Status);
    frame.render_widget(Paragraph::new(status_text(state)).style(style), area);
}

fn panel(state: &AppState, title: String, focused: bool) -> Block<'static> {
    let block = Block::bordered().title(title);
    if focused {
        block.border_style(state.theme.style(ThemeToken::FocusBorder))
    } else {
        block
    }
}

fn draw_files(frame: &mut Frame<'_>, state: &AppState, area: Rect) {
    let active = state.store.active_id();
    let lines = state
        .store
        .list_files()
        .into_iter()
        .enumerate()
        .map(|(idx, file)| {
            let token = if Some(file.id) == active {
                ThemeToken::FileActive
            } else {
                ThemeToken::FileInactive
            };
            Line::from(Span::styled(
                format!("{} {}", idx + 1, file.name),
                state.theme.style(token),
            ))
        })
        .collect::<Vec<_>>();

    let block = panel(state, " Files ".to_string(), false);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_code(frame: &mut Frame<'_>, state: &AppState, area: Rect) {
    let title = match state.store.active_file() {
        Some(file) if file.language.is_empty() => format!(" {} ", file.name),
        Some(file) => format!(" {} [{}] ", file.name, file.language),
        None => " (no file) ".to_string(),
    };
    let focused = state.focus == Focus::Editor;
    let block = panel(state, title, focused);
    let inner = block.inner(area);

    let visible = usize::from(inner.height.max(1));
    let offset = state.cursor.line.saturating_sub(visible - 1);
    let number_style = state.theme.style(ThemeToken::LineNumber);
    let code_style = state.theme.style(ThemeToken::CodeText);
    let lines = state
        .store
        .code()
        .split('\n')
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(idx, text)| {
            Line::from(vec![
                Span::styled(
                    format!("{:>width$} ", idx + 1, width = usize::from(LINE_NUMBER_WIDTH - 1)),
                    number_style,
                ),
                Span::styled(text.to_string(), code_style),
            ])
        })
        .collect::<Vec<_>>();

    frame.render_widget(Paragraph::new(lines).block(block), area);

    if focused {
        let col = u16::try_from(state.cursor.col).unwrap_or(u16::MAX);
        let row = u16::try_from(state.cursor.line - offset).unwrap_or(u16::MAX);
        let x = inner
            .x
            .saturating_add(LINE_NUMBER_WIDTH)
            .saturating_add(col)
            .min(inner.right().saturating_sub(1));
        let y = inner.y.saturating_add(row).min(inner.bottom().saturating_sub(1));
        frame.set_cursor_position((x, y));
    }
}

fn draw_timeline(frame: &mut Frame<'_>, state: &AppState, area: Rect) {
    let block = panel(state, " Assistant ".to_string(), false);
    let inner = block.inner(area);

    let lines = wrap_lines(state.timeline.render_lines(&state.theme), inner.width);
    let skip = lines.len().saturating_sub(usize::from(inner.height));
    let visible = lines.into_iter().skip(skip).collect::<Vec<_>>();

    frame.render_widget(Paragraph::new(visible).block(block), area);
}

fn draw_input(frame: &mut Frame<'_>, state: &AppState, area: Rect) {
    let title = if state.busy {
        " Waiting for the assistant... "
    } else {
        " Ask the assistant "
    };
    let focused = state.focus == Focus::Chat;
    let block = panel(state, title.to_string(), focused);
    let inner = block.inner(area);

    // Keep the tail of long input visible.
    let width = usize::from(inner.width).saturating_sub(INPUT_PROMPT.len() + 1);
    let chars = state.input.chars().count();
    let shown = state
        .input
        .chars()
        .skip(chars.saturating_sub(width))
        .collect::<String>();
    let line = Line::from(vec![
        Span::styled(INPUT_PROMPT, state.theme.style(ThemeToken::ChatPrompt)),
        Span::styled(shown.clone(), state.theme.style(ThemeToken::UserInput)),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);

    if focused && !state.busy {
        let used = u16::try_from(INPUT_PROMPT.len() + shown.chars().count()).unwrap_or(u16::MAX);
        let x = inner
            .x
            .saturating_add(used)
            .min(inner.right().saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }
}
