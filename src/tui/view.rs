//! Pure projection of client state onto what the frame shows.
//!
//! `project` has no side effects and reads nothing but its arguments, so
//! the same snapshot always yields an equal `Screen`. Drawing lives in
//! `ui.rs` and only ever looks at a `Screen`.

use ratatui::style::Color;

use super::keymap::{HelpEntry, KeyMap};
use super::theme::{PRESETS, ThemeEngine};
use crate::state::{ModalKind, StateSnapshot, Todo};
use crate::sync::LinkStatus;

/// Hints shown when the backend has no status message.
pub const DEFAULT_HINTS: &str = "[x] Check  [c] Complete  [N] New  [t] Themes  [?] Help";

#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub disconnected: bool,
    pub timer: TimerView,
    pub todos: Vec<TodoRow>,
    pub hint: HintBar,
    pub history: HistoryPanel,
    pub modal: Option<ModalView>,
    pub picker: Option<ThemePicker>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Running,
    Done,
    Paused,
}

impl TimerStatus {
    pub fn label(self) -> &'static str {
        match self {
            TimerStatus::Running => "▶ Running",
            TimerStatus::Done => "✓ Done",
            TimerStatus::Paused => "⏸ Paused",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimerView {
    pub ratio: f64,
    pub percent: u16,
    /// `"<display> · <pct>%"`
    pub label: String,
    pub status: TimerStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoText {
    /// Empty slot, not being edited.
    Placeholder,
    /// Being edited; drawn with a trailing cursor.
    Editing(String),
    Done(String),
    Open(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    pub number: usize,
    pub selected: bool,
    pub checked: bool,
    pub text: TodoText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintBar {
    Status(String),
    Defaults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryPanel {
    Hidden,
    Empty,
    Note {
        /// 1-based.
        position: usize,
        total: usize,
        todos: Vec<Todo>,
        time_spent: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalBody {
    Help(Vec<HelpEntry>),
    Confirm(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub title: &'static str,
    pub body: ModalBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeOption {
    pub name: &'static str,
    pub highlighted: bool,
    pub active: bool,
    pub swatches: [Color; 3],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePicker {
    pub options: Vec<ThemeOption>,
}

pub fn project(
    snapshot: &StateSnapshot,
    themes: &ThemeEngine,
    keymap: &KeyMap,
    link: LinkStatus,
) -> Screen {
    Screen {
        disconnected: matches!(link, LinkStatus::Disconnected { .. }),
        timer: timer_view(snapshot),
        todos: todo_rows(snapshot),
        hint: match &snapshot.status_message {
            Some(msg) => HintBar::Status(msg.clone()),
            None => HintBar::Defaults,
        },
        history: history_panel(snapshot),
        modal: snapshot.modal().map(|kind| modal_view(kind, keymap)),
        picker: theme_picker(themes),
    }
}

fn timer_view(snapshot: &StateSnapshot) -> TimerView {
    let timer = &snapshot.timer;
    let percent = (timer.progress * 100.0).round() as u16;
    let status = if timer.is_running {
        TimerStatus::Running
    } else if timer.time_left == 0 {
        TimerStatus::Done
    } else {
        TimerStatus::Paused
    };
    TimerView {
        ratio: timer.progress,
        percent,
        label: format!("{} · {percent}%", timer.display),
        status,
    }
}

fn todo_rows(snapshot: &StateSnapshot) -> Vec<TodoRow> {
    let editing = snapshot.editing_index();
    snapshot
        .todos
        .iter()
        .enumerate()
        .map(|(i, todo)| {
            let text = if editing == Some(i) {
                TodoText::Editing(todo.text.clone())
            } else if todo.is_empty() {
                TodoText::Placeholder
            } else if todo.completed {
                TodoText::Done(todo.text.clone())
            } else {
                TodoText::Open(todo.text.clone())
            };
            TodoRow {
                number: i + 1,
                selected: i == snapshot.selected_todo,
                checked: todo.completed,
                text,
            }
        })
        .collect()
}

fn history_panel(snapshot: &StateSnapshot) -> HistoryPanel {
    if !snapshot.show_history {
        return HistoryPanel::Hidden;
    }
    let index = snapshot.history_index.unwrap_or(0);
    let Some(note) = snapshot.completed_notes.get(index) else {
        return HistoryPanel::Empty;
    };
    let total = if snapshot.history_total == 0 {
        snapshot.completed_notes.len()
    } else {
        snapshot.history_total
    };
    HistoryPanel::Note {
        position: index + 1,
        total,
        todos: note.todos.iter().filter(|t| !t.is_empty()).cloned().collect(),
        time_spent: note.time_spent.clone(),
    }
}

fn modal_view(kind: ModalKind, keymap: &KeyMap) -> ModalView {
    let (title, body) = match kind {
        ModalKind::Help => ("Shortcuts", ModalBody::Help(keymap.help_entries())),
        ModalKind::CompleteSession => (
            "Complete Session",
            ModalBody::Confirm("Complete this session and save to history?"),
        ),
        ModalKind::ClearNotes => (
            "Clear History",
            ModalBody::Confirm("Clear all completed sessions?"),
        ),
        ModalKind::NewSession => (
            "New Session",
            ModalBody::Confirm("Start fresh? This clears all tasks and history."),
        ),
    };
    ModalView { title, body }
}

fn theme_picker(themes: &ThemeEngine) -> Option<ThemePicker> {
    let highlighted = themes.highlighted()?;
    let options = PRESETS
        .iter()
        .enumerate()
        .map(|(i, preset)| ThemeOption {
            name: preset.name,
            highlighted: i == highlighted,
            active: i == themes.active(),
            swatches: preset.swatches,
        })
        .collect();
    Some(ThemePicker { options })
}
