use crate::config::{
    HexColor, StyleOverride, ThemeConfig as UserThemeConfig, ThemeModifier, ThemePreset, ThemeToken,
};
use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Theme {
    enabled: bool,
    styles: HashMap<ThemeToken, Style>,
}

impl Theme {
    #[cfg(test)]
    pub fn new(enabled: bool) -> Self {
        Self::from_config(enabled, &UserThemeConfig::default())
    }

    pub fn from_config(enabled: bool, config: &UserThemeConfig) -> Self {
        let mut styles = ThemeToken::all()
            .iter()
            .map(|token| (*token, preset_style(config.preset, *token)))
            .collect::<HashMap<_, _>>();
        for (token, override_style) in &config.styles {
            let base = styles.get(token).copied().unwrap_or_default();
            styles.insert(*token, merge_style(base, override_style));
        }

        Self { enabled, styles }
    }

    pub fn style(&self, token: ThemeToken) -> Style {
        if !self.enabled {
            return disabled_style(token);
        }

        self.styles.get(&token).copied().unwrap_or_default()
    }
}

fn preset_style(preset: ThemePreset, token: ThemeToken) -> Style {
    let palette = match preset {
        ThemePreset::Default => &DARK,
        ThemePreset::Light => &LIGHT,
        ThemePreset::HighContrast => &HIGH_CONTRAST,
    };

    match token {
        ThemeToken::Status => Style::default().fg(palette.muted).bg(palette.panel),
        ThemeToken::FileActive => Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        ThemeToken::FileInactive => Style::default().fg(palette.text),
        ThemeToken::LineNumber => Style::default().fg(palette.muted),
        ThemeToken::CodeText => Style::default().fg(palette.code),
        ThemeToken::ChatPrompt => Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
        ThemeToken::UserInput => Style::default().fg(palette.text),
        ThemeToken::AssistantText => Style::default().fg(palette.assistant),
        ThemeToken::AssistantWaiting => Style::default()
            .fg(palette.assistant)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ThemeToken::SystemInfo => Style::default().fg(palette.muted),
        ThemeToken::SystemError => Style::default()
            .fg(palette.error)
            .add_modifier(Modifier::BOLD),
        ThemeToken::FocusBorder => Style::default().fg(palette.accent),
    }
}

struct Palette {
    text: Color,
    code: Color,
    muted: Color,
    panel: Color,
    accent: Color,
    assistant: Color,
    error: Color,
}

const DARK: Palette = Palette {
    text: Color::White,
    code: Color::Rgb(192, 202, 245),
    muted: Color::Rgb(86, 95, 137),
    panel: Color::Rgb(22, 22, 30),
    accent: Color::Rgb(122, 162, 247),
    assistant: Color::Rgb(158, 206, 106),
    error: Color::Rgb(247, 118, 142),
};

const LIGHT: Palette = Palette {
    text: Color::Rgb(36, 41, 47),
    code: Color::Rgb(9, 105, 218),
    muted: Color::Rgb(80, 90, 110),
    panel: Color::Rgb(246, 248, 250),
    accent: Color::Rgb(31, 111, 235),
    assistant: Color::Rgb(5, 80, 40),
    error: Color::Rgb(176, 0, 32),
};

const HIGH_CONTRAST: Palette = Palette {
    text: Color::Rgb(255, 255, 255),
    code: Color::Rgb(135, 206, 250),
    muted: Color::Rgb(220, 220, 220),
    panel: Color::Rgb(0, 0, 0),
    accent: Color::Rgb(255, 215, 0),
    assistant: Color::Rgb(0, 255, 127),
    error: Color::Rgb(255, 64, 64),
};

fn disabled_style(token: ThemeToken) -> Style {
    match token {
        ThemeToken::ChatPrompt | ThemeToken::FileActive => {
            Style::default().add_modifier(Modifier::BOLD)
        }
        _ => Style::default(),
    }
}

fn merge_style(base: Style, override_style: &StyleOverride) -> Style {
    let mut merged = base;

    if let Some(fg) = override_style.fg {
        merged = merged.fg(color_from_hex(fg));
    }

    if let Some(bg) = override_style.bg {
        merged = merged.bg(color_from_hex(bg));
    }

    if let Some(modifiers) = &override_style.modifiers {
        let modifier = modifiers
            .iter()
            .fold(Modifier::empty(), |acc, modifier| {
                acc | modifier_to_ratatui(*modifier)
            });
        merged = merged
            .remove_modifier(Modifier::all())
            .add_modifier(modifier);
    }

    merged
}

fn color_from_hex(color: HexColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

fn modifier_to_ratatui(modifier: ThemeModifier) -> Modifier {
    match modifier {
        ThemeModifier::Bold => Modifier::BOLD,
        ThemeModifier::Dim => Modifier::DIM,
        ThemeModifier::Italic => Modifier::ITALIC,
        ThemeModifier::Underlined => Modifier::UNDERLINED,
        ThemeModifier::Reversed => Modifier::REVERSED,
    }
}
