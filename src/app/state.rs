//! Defines the core state structures for the console.
//!
//! `App` holds everything the event loop owns: the agent list, the
//! conversation store, the chat bridge and the composer. `ChatComposer` is the
//! multi-line message input with its own send history.

use std::path::PathBuf;
use std::time::Duration;

use unicode_width::UnicodeWidthChar;

use crate::agent::{AgentDescriptor, ChatBridge, DirectoryLoader};
use crate::config::ConfigResolver;
use crate::conversation::ConversationStore;
use crate::definitions::FocusArea;

/// The main application state.
///
/// This struct is the single source of truth for the console. It is owned by
/// the event loop; background work reports back through channels drained in
/// `on_tick`.
pub struct App {
    // --- Core State ---
    /// Flag to indicate if the application should quit.
    pub should_quit: bool,
    /// The currently focused UI area.
    pub focus: FocusArea,
    /// Agents reported by the backend, in backend order.
    pub agents: Vec<AgentDescriptor>,
    /// Set once the first non-empty agent list has seeded the store.
    pub agents_initialized: bool,
    /// Conversation history per agent and the active selection.
    pub conversations: ConversationStore,
    /// The message input.
    pub composer: ChatComposer,

    // --- UI State ---
    /// Index into [`App::sidebar_items`].
    pub sidebar_selected: usize,
    /// Lines scrolled up from the bottom of the transcript.
    pub transcript_scroll: u16,
    /// The message currently displayed in the status bar.
    pub status_message: String,

    // --- Environment ---
    pub workspace_root: PathBuf,
    /// agent-core base URL, without trailing slash.
    pub backend_url: String,
    pub config: ConfigResolver,
    pub(crate) tick_rate: Duration,

    // --- Background Work ---
    pub(crate) bridge: ChatBridge,
    /// Pending agent directory fetch; dropped (and thereby cancelled) once it
    /// delivers or the app shuts down.
    pub(crate) directory_loader: Option<DirectoryLoader>,
}

/// One selectable row of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarItem {
    NewChat,
    Agent(usize),
    Conversation {
        agent_index: usize,
        conversation_id: String,
    },
}

/// State for the message composer.
///
/// Manages the text buffer, cursor position, and sent-message history.
#[derive(Clone, Default)]
pub struct ChatComposer {
    buffer: String,
    cursor: usize,
    history: Vec<String>,
    history_index: Option<usize>,
}

impl ChatComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Inserts a character at the current cursor position.
    pub fn insert_char(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        self.reset_history_navigation();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        if let Some((idx, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.buffer.drain(idx..self.cursor);
            self.cursor = idx;
            self.reset_history_navigation();
        }
    }

    /// Deletes the character at the cursor.
    pub fn delete(&mut self) {
        if let Some((_, ch)) = self.buffer[self.cursor..].char_indices().next() {
            let end = self.cursor + ch.len_utf8();
            self.buffer.drain(self.cursor..end);
            self.reset_history_navigation();
        }
    }

    pub fn move_left(&mut self) {
        if let Some((idx, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn move_right(&mut self) {
        if let Some((_, ch)) = self.buffer[self.cursor..].char_indices().next() {
            self.cursor += ch.len_utf8();
        }
    }

    /// Moves the cursor to the start of the current line.
    pub fn move_to_line_start(&mut self) {
        self.cursor = self.buffer[..self.cursor]
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);
    }

    /// Moves the cursor to the end of the current line.
    pub fn move_to_line_end(&mut self) {
        self.cursor = self.buffer[self.cursor..]
            .find('\n')
            .map(|pos| self.cursor + pos)
            .unwrap_or(self.buffer.len());
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.reset_history_navigation();
    }

    /// Takes the content of the buffer, adds it to history, and clears the buffer.
    pub fn take(&mut self) -> String {
        let content = std::mem::take(&mut self.buffer);
        if !content.trim().is_empty() && self.history.last() != Some(&content) {
            self.history.push(content.clone());
        }
        self.cursor = 0;
        self.reset_history_navigation();
        content
    }

    /// Navigates to the previous entry in the sent history.
    pub fn history_previous(&mut self) -> bool {
        if self.history.is_empty() {
            return false;
        }
        let target = match self.history_index {
            Some(idx) => idx.saturating_sub(1),
            None => self.history.len() - 1,
        };
        self.load_history(target)
    }

    /// Navigates to the next entry; past the newest entry the buffer empties.
    pub fn history_next(&mut self) -> bool {
        match self.history_index {
            Some(idx) if idx + 1 < self.history.len() => self.load_history(idx + 1),
            Some(_) => {
                self.history_index = None;
                self.buffer.clear();
                self.cursor = 0;
                true
            }
            None => false,
        }
    }

    fn load_history(&mut self, index: usize) -> bool {
        let Some(entry) = self.history.get(index) else {
            return false;
        };
        self.buffer = entry.clone();
        self.cursor = self.buffer.len();
        self.history_index = Some(index);
        true
    }

    fn reset_history_navigation(&mut self) {
        self.history_index = None;
    }

    /// Calculates the (col, row) position of the cursor inside a box of `width` cells.
    pub fn cursor_display_position(&self, width: usize) -> (u16, u16) {
        if width == 0 {
            return (0, 0);
        }
        let mut col = 0usize;
        let mut row = 0usize;
        for ch in self.buffer[..self.cursor].chars() {
            if ch == '\n' {
                row += 1;
                col = 0;
                continue;
            }
            let char_width = UnicodeWidthChar::width(ch).unwrap_or(1).max(1);
            if col + char_width > width {
                row += 1;
                col = 0;
            }
            col += char_width;
            if col >= width {
                row += 1;
                col = 0;
            }
        }
        (col as u16, row as u16)
    }
}
