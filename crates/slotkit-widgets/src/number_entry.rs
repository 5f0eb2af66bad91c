#![forbid(unsafe_code)]

//! Inline number entry overlay.
//!
//! A single-line text field opened over a strength value. It starts with the
//! current value formatted to two decimals and fully selected, so typing
//! replaces it. Enter and focus loss commit, Escape cancels. Commit parses
//! the text; anything that is not a finite number commits nothing.
//!
//! Editing covers what a number needs: select-all, typing, Backspace and
//! Delete, Left and Right. The caret moves by grapheme cluster.

use slotkit_core::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use slotkit_core::geometry::Rect;
use unicode_segmentation::UnicodeSegmentation;

use crate::canvas::{Canvas, TextAlign};
use crate::theme::Theme;

/// Result of feeding an event to the entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryOutcome {
    /// Still editing. `changed` is true when the text or caret moved.
    Pending { changed: bool },
    /// Close and apply the parsed value, if the text parsed.
    Commit(Option<f32>),
    /// Close without applying.
    Cancel,
}

/// Text field state for the overlay.
#[derive(Debug, Clone, Default)]
pub struct NumberEntry {
    text: String,
    /// Caret as a byte offset into `text`, always on a grapheme boundary.
    caret: usize,
    all_selected: bool,
}

impl NumberEntry {
    /// Entry pre-filled with `initial` to two decimals, all selected.
    pub fn new(initial: f32) -> Self {
        let text = format!("{initial:.2}");
        Self {
            caret: text.len(),
            text,
            all_selected: true,
        }
    }

    /// Current text.
    pub fn value(&self) -> &str {
        &self.text
    }

    /// Caret position as a byte offset into [`Self::value`].
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Whether the whole text is selected, so typing replaces it.
    pub fn is_all_selected(&self) -> bool {
        self.all_selected
    }

    /// Parse the text as a strength, ignoring surrounding whitespace.
    pub fn parse(&self) -> Option<f32> {
        self.text.trim().parse::<f32>().ok().filter(|v| v.is_finite())
    }

    /// Feed an event.
    pub fn handle_event(&mut self, event: &Event) -> EntryOutcome {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            Event::Focus(false) => EntryOutcome::Commit(self.parse()),
            _ => EntryOutcome::Pending { changed: false },
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> EntryOutcome {
        let changed = match key.code {
            KeyCode::Enter => return EntryOutcome::Commit(self.parse()),
            KeyCode::Escape => return EntryOutcome::Cancel,
            KeyCode::Char('a') if key.ctrl() => {
                self.all_selected = true;
                self.caret = self.text.len();
                true
            }
            KeyCode::Char(c) if !key.ctrl() && !c.is_control() => {
                self.clear_if_selected();
                self.text.insert(self.caret, c);
                self.caret += c.len_utf8();
                true
            }
            KeyCode::Backspace => {
                if !self.clear_if_selected() {
                    let prev = self.prev_boundary();
                    self.text.drain(prev..self.caret);
                    self.caret = prev;
                }
                true
            }
            KeyCode::Delete => {
                if !self.clear_if_selected() {
                    let next = self.next_boundary();
                    self.text.drain(self.caret..next);
                }
                true
            }
            KeyCode::Left => {
                self.caret = if std::mem::take(&mut self.all_selected) {
                    0
                } else {
                    self.prev_boundary()
                };
                true
            }
            KeyCode::Right => {
                self.caret = if std::mem::take(&mut self.all_selected) {
                    self.text.len()
                } else {
                    self.next_boundary()
                };
                true
            }
            _ => false,
        };
        EntryOutcome::Pending { changed }
    }

    /// Paint the field into `area`.
    pub fn draw(&self, area: Rect, canvas: &mut dyn Canvas, theme: &Theme) {
        canvas.fill_round_rect(area, 3.0, theme.overlay_background);
        canvas.stroke_round_rect(area, 3.0, theme.overlay_outline, 1.0);
        let text_x = area.x + 4.0;
        canvas.fill_text(&self.text, text_x, area.center_y(), TextAlign::Left, theme.text);

        let before = &self.text[..self.caret];
        let caret_x = text_x + canvas.measure_text(before);
        let caret = Rect::new(caret_x, area.y + 3.0, 1.0, area.height - 6.0);
        canvas.fill_round_rect(caret, 0.0, theme.text);
    }

    // --- Editing helpers ---

    /// Drop the text if it is all selected. Returns whether it was.
    fn clear_if_selected(&mut self) -> bool {
        if !std::mem::take(&mut self.all_selected) {
            return false;
        }
        self.text.clear();
        self.caret = 0;
        true
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.caret]
            .grapheme_indices(true)
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.caret..]
            .graphemes(true)
            .next()
            .map_or(self.caret, |g| self.caret + g.len())
    }
}
