//! Reference state engine: one hour, four todos, a history of sessions.
//!
//! Time comes in as a parameter (`now_ms`) so the engine itself never reads
//! the clock; callers pass `chrono::Utc::now().timestamp_millis()`.

use std::fmt::Write as _;

use crate::protocol::{Action, RpcRequest, WireNote, WireSnapshot, WireTodo};
use crate::state::{InputMode, ModalKind, TODO_SLOTS, Todo};

/// Length of one session in seconds.
pub const SESSION_SECS: u64 = 3600;

/// Longest todo text accepted by `edit_char`.
pub const MAX_TODO_LEN: usize = 50;

/// Puts rendered markdown somewhere the user can paste it from.
pub type CopyFn = Box<dyn FnMut(&str) -> Result<(), String> + Send>;

/// `m:ss`, minutes unpadded.
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn system_clipboard() -> CopyFn {
    Box::new(|text: &str| {
        arboard::Clipboard::new()
            .and_then(|mut cb| cb.set_text(text))
            .map_err(|e| e.to_string())
    })
}

#[derive(Debug, Clone)]
struct ArchivedNote {
    todos: Vec<Todo>,
    time_spent: u64,
    completion_number: u64,
}

pub struct Engine {
    todos: [Todo; TODO_SLOTS],
    time_left: u64,
    is_running: bool,
    /// Wall-clock millis at which the running timer reaches zero.
    target_ms: Option<i64>,
    notes: Vec<ArchivedNote>,
    mode: InputMode,
    selected: usize,
    history_index: Option<usize>,
    status_message: Option<String>,
    sound_pending: bool,
    show_history: bool,
    copy: CopyFn,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_clipboard(system_clipboard())
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clipboard(copy: CopyFn) -> Self {
        Engine {
            todos: Default::default(),
            time_left: SESSION_SECS,
            is_running: false,
            target_ms: None,
            notes: Vec::new(),
            mode: InputMode::Normal,
            selected: 0,
            history_index: None,
            status_message: None,
            sound_pending: false,
            show_history: true,
            copy,
        }
    }

    /// Serve one request and return the resulting state.
    pub fn handle(&mut self, request: &RpcRequest, now_ms: i64) -> WireSnapshot {
        match request {
            RpcRequest::GetState => {}
            RpcRequest::Tick => self.tick(now_ms),
            RpcRequest::Action { name, payload } => {
                match Action::from_wire(name, payload.as_deref()) {
                    Some(action) => self.apply(action, now_ms),
                    None => tracing::debug!(name = %name, "ignoring unknown action"),
                }
            }
        }
        self.snapshot()
    }

    pub fn apply(&mut self, action: Action, now_ms: i64) {
        if !matches!(action, Action::CopyMarkdown | Action::ClearSound) {
            self.status_message = None;
        }

        match action {
            Action::ToggleTimer => self.toggle_timer(now_ms),
            Action::ResetTimer => self.reset_timer(),
            Action::MoveDown => self.selected = (self.selected + 1).min(TODO_SLOTS - 1),
            Action::MoveUp => self.selected = self.selected.saturating_sub(1),
            Action::StartEditing => self.mode = InputMode::Editing(self.selected),
            Action::StopEditing => {
                if let InputMode::Editing(_) = self.mode {
                    self.mode = InputMode::Normal;
                }
            }
            Action::EditChar(c) => {
                if let InputMode::Editing(slot) = self.mode
                    && self.todos[slot].text.chars().count() < MAX_TODO_LEN
                {
                    self.todos[slot].text.push(c);
                }
            }
            Action::EditBackspace => {
                if let InputMode::Editing(slot) = self.mode {
                    self.todos[slot].text.pop();
                }
            }
            Action::ToggleTodo => self.toggle_todo(),
            Action::RemoveTodo => {
                let todo = &mut self.todos[self.selected];
                todo.text.clear();
                todo.completed = false;
            }
            Action::CompleteSession => {
                if self.todos.iter().any(|t| !t.is_empty()) {
                    self.open_modal(ModalKind::CompleteSession);
                }
            }
            Action::ClearNotes => {
                if !self.notes.is_empty() {
                    self.open_modal(ModalKind::ClearNotes);
                }
            }
            Action::NewSession => self.open_modal(ModalKind::NewSession),
            Action::ShowHelp => self.open_modal(ModalKind::Help),
            Action::ConfirmModal => self.confirm_modal(),
            Action::DismissModal => {
                if let InputMode::Modal(_) = self.mode {
                    self.mode = InputMode::Normal;
                }
            }
            Action::PrevHistory => self.prev_history(),
            Action::NextHistory => self.next_history(),
            Action::ToggleHistory => self.show_history = !self.show_history,
            Action::CopyMarkdown => self.copy_markdown(),
            Action::ClearSound => self.sound_pending = false,
        }
    }

    /// Advance a running timer to `now_ms`; stops and chimes at zero.
    pub fn tick(&mut self, now_ms: i64) {
        if !self.is_running {
            return;
        }
        let Some(target) = self.target_ms else {
            return;
        };
        let remaining_ms = target - now_ms;
        if remaining_ms > 0 {
            // Round up so a partial second still shows as one.
            self.time_left = (remaining_ms as u64).div_ceil(1000);
        } else {
            self.time_left = 0;
            self.is_running = false;
            self.target_ms = None;
            self.sound_pending = true;
        }
    }

    fn toggle_timer(&mut self, now_ms: i64) {
        if self.is_running {
            self.is_running = false;
            self.target_ms = None;
        } else if self.time_left > 0 {
            self.is_running = true;
            self.target_ms = Some(now_ms + self.time_left as i64 * 1000);
        }
    }

    fn reset_timer(&mut self) {
        self.time_left = SESSION_SECS;
        self.is_running = false;
        self.target_ms = None;
    }

    fn toggle_todo(&mut self) {
        let todo = &mut self.todos[self.selected];
        if todo.is_empty() {
            return;
        }
        todo.completed = !todo.completed;
        if todo.completed {
            self.sound_pending = true;
        }
    }

    fn open_modal(&mut self, kind: ModalKind) {
        self.mode = InputMode::Modal(kind);
    }

    fn confirm_modal(&mut self) {
        let InputMode::Modal(kind) = self.mode else {
            return;
        };
        match kind {
            ModalKind::CompleteSession => self.archive_session(),
            ModalKind::ClearNotes => {
                self.notes.clear();
                self.history_index = None;
            }
            ModalKind::NewSession => {
                self.start_fresh();
                self.notes.clear();
                self.history_index = None;
            }
            ModalKind::Help => {}
        }
        self.mode = InputMode::Normal;
    }

    fn archive_session(&mut self) {
        let note = ArchivedNote {
            todos: self.todos.to_vec(),
            time_spent: SESSION_SECS - self.time_left,
            completion_number: self.notes.len() as u64 + 1,
        };
        self.notes.push(note);
        self.history_index = Some(self.notes.len() - 1);
        self.start_fresh();
    }

    fn start_fresh(&mut self) {
        self.todos = Default::default();
        self.reset_timer();
        self.selected = 0;
    }

    fn next_history(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        self.history_index = match self.history_index {
            Some(i) => Some((i + 1).min(self.notes.len() - 1)),
            None => Some(0),
        };
    }

    fn prev_history(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        self.history_index = match self.history_index {
            Some(i) => Some(i.saturating_sub(1)),
            None => Some(self.notes.len() - 1),
        };
    }

    fn copy_markdown(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        let md = self.build_markdown();
        self.status_message = Some(match (self.copy)(&md) {
            Ok(()) => "Copied to clipboard!".to_string(),
            Err(e) => {
                tracing::warn!("clipboard copy failed: {e}");
                format!("Clipboard error: {e}")
            }
        });
    }

    /// Every archived session as a markdown checklist.
    pub fn build_markdown(&self) -> String {
        let mut md = String::from("# One Good Hour\n\n");
        for note in &self.notes {
            let _ = writeln!(md, "## Session {}", note.completion_number);
            let _ = writeln!(md, "Time spent: {}\n", format_time(note.time_spent));
            for todo in note.todos.iter().filter(|t| !t.is_empty()) {
                let check = if todo.completed { "x" } else { " " };
                let _ = writeln!(md, "- [{check}] {}", todo.text);
            }
            md.push('\n');
        }
        md
    }

    pub fn snapshot(&self) -> WireSnapshot {
        let progress = (1.0 - self.time_left as f64 / SESSION_SECS as f64).clamp(0.0, 1.0);
        WireSnapshot {
            time_left: self.time_left,
            is_running: self.is_running,
            progress,
            timer_display: format_time(self.time_left),
            todos: self.todos.iter().map(wire_todo).collect(),
            selected_todo: self.selected,
            input_mode: self.mode.wire_tag(),
            editing_index: match self.mode {
                InputMode::Editing(slot) => Some(slot),
                _ => None,
            },
            modal: match self.mode {
                InputMode::Modal(kind) => Some(kind.as_str().to_string()),
                _ => None,
            },
            completed_notes: self
                .notes
                .iter()
                .map(|n| WireNote {
                    todos: n.todos.iter().map(wire_todo).collect(),
                    time_spent: format_time(n.time_spent),
                    completion_number: n.completion_number,
                })
                .collect(),
            history_index: self.history_index,
            history_total: self.notes.len(),
            status_message: self.status_message.clone(),
            sound_pending: self.sound_pending,
            show_history: self.show_history,
        }
    }
}

fn wire_todo(todo: &Todo) -> WireTodo {
    WireTodo {
        text: todo.text.clone(),
        completed: todo.completed,
    }
}
