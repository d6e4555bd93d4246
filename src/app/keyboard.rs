use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::App;
use crate::definitions::{FocusArea, TRANSCRIPT_PAGE};

impl App {
    /// The main entry point for handling keyboard events.
    ///
    /// Global shortcuts win; everything else goes to the focused area.
    pub async fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.handle_global_shortcuts(key) {
            return;
        }

        match self.focus {
            FocusArea::Sidebar => self.handle_sidebar_key(key),
            FocusArea::Composer => self.handle_composer_key(key).await,
        }
    }

    /// Returns `true` if a shortcut was handled.
    fn handle_global_shortcuts(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('n'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.new_conversation();
            }
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) => {
                self.focus = self.focus.toggle();
            }
            (KeyCode::PageUp, _) => {
                self.transcript_scroll = self.transcript_scroll.saturating_add(TRANSCRIPT_PAGE);
            }
            (KeyCode::PageDown, _) => {
                self.transcript_scroll = self.transcript_scroll.saturating_sub(TRANSCRIPT_PAGE);
            }
            _ => return false,
        }
        true
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_sidebar_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_sidebar_selection(1),
            KeyCode::Home => self.sidebar_selected = 0,
            KeyCode::End => self.move_sidebar_selection(isize::MAX / 2),
            KeyCode::Enter => self.activate_sidebar_selection(),
            KeyCode::Esc => self.focus = FocusArea::Composer,
            _ => {}
        }
    }

    async fn handle_composer_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                self.composer.insert_newline();
            }
            KeyCode::Enter => self.submit_composer().await,
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.composer.insert_char(ch);
            }
            KeyCode::Backspace => self.composer.backspace(),
            KeyCode::Delete => self.composer.delete(),
            KeyCode::Left => self.composer.move_left(),
            KeyCode::Right => self.composer.move_right(),
            KeyCode::Home => self.composer.move_to_line_start(),
            KeyCode::End => self.composer.move_to_line_end(),
            KeyCode::Up => {
                self.composer.history_previous();
            }
            KeyCode::Down => {
                self.composer.history_next();
            }
            KeyCode::Esc => self.composer.clear(),
            _ => {}
        }
    }
}
