/// Indentation inserted by Tab in the code pane.
pub(crate) const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EditAction {
    Insert(char),
    Indent,
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

/// Caret inside the code buffer. `col` counts chars, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct EditorCursor {
    pub(crate) line: usize,
    pub(crate) col: usize,
}

impl EditorCursor {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Keeps the cursor inside `text` after the buffer changed underneath it.
    pub(crate) fn clamp(&mut self, text: &str) {
        let lines = split_lines(text);
        self.line = self.line.min(lines.len() - 1);
        self.col = self.col.min(char_len(lines[self.line]));
    }

    /// Applies `action` to `text`. Returns the new buffer when the text
    /// changed, `None` for pure cursor moves and no-op edits.
    pub(crate) fn apply(&mut self, text: &str, action: EditAction) -> Option<String> {
        self.clamp(text);
        let mut lines = split_lines(text)
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let last = lines.len() - 1;
        let current_len = char_len(&lines[self.line]);

        match action {
            EditAction::Insert(ch) => {
                let at = byte_index(&lines[self.line], self.col);
                lines[self.line].insert(at, ch);
                self.col += 1;
            }
            EditAction::Indent => {
                let at = byte_index(&lines[self.line], self.col);
                lines[self.line].insert_str(at, INDENT);
                self.col += char_len(INDENT);
            }
            EditAction::Newline => {
                let at = byte_index(&lines[self.line], self.col);
                let tail = lines[self.line].split_off(at);
                lines.insert(self.line + 1, tail);
                self.line += 1;
                self.col = 0;
            }
            EditAction::Backspace => {
                if self.col > 0 {
                    let at = byte_index(&lines[self.line], self.col - 1);
                    lines[self.line].remove(at);
                    self.col -= 1;
                } else if self.line > 0 {
                    let removed = lines.remove(self.line);
                    self.line -= 1;
                    self.col = char_len(&lines[self.line]);
                    lines[self.line].push_str(&removed);
                } else {
                    return None;
                }
            }
            EditAction::Delete => {
                if self.col < current_len {
                    let at = byte_index(&lines[self.line], self.col);
                    lines[self.line].remove(at);
                } else if self.line < last {
                    let next = lines.remove(self.line + 1);
                    lines[self.line].push_str(&next);
                } else {
                    return None;
                }
            }
            EditAction::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.line > 0 {
                    self.line -= 1;
                    self.col = char_len(&lines[self.line]);
                }
                return None;
            }
            EditAction::Right => {
                if self.col < current_len {
                    self.col += 1;
                } else if self.line < last {
                    self.line += 1;
                    self.col = 0;
                }
                return None;
            }
            EditAction::Up => {
                self.line = self.line.saturating_sub(1);
                self.col = self.col.min(char_len(&lines[self.line]));
                return None;
            }
            EditAction::Down => {
                self.line = (self.line + 1).min(last);
                self.col = self.col.min(char_len(&lines[self.line]));
                return None;
            }
            EditAction::Home => {
                self.col = 0;
                return None;
            }
            EditAction::End => {
                self.col = current_len;
                return None;
            }
        }

        Some(lines.join("\n"))
    }
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map_or(line.len(), |(idx, _)| idx)
}
