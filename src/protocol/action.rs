use std::fmt;

// ── Actions ──────────────────────────────────────────────────────────

/// Every semantic action the backend understands.
///
/// The client builds these from key presses; backends rebuild them from
/// the `(name, payload)` pair that travels over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Timer
    ToggleTimer,
    ResetTimer,

    // Todo list
    MoveDown,
    MoveUp,
    StartEditing,
    ToggleTodo,
    RemoveTodo,

    // Session and history
    CompleteSession,
    PrevHistory,
    NextHistory,
    CopyMarkdown,
    ClearNotes,
    NewSession,
    ShowHelp,
    ToggleHistory,

    // Editing
    StopEditing,
    EditBackspace,
    EditChar(char),

    // Modal
    ConfirmModal,
    DismissModal,

    // Notification
    ClearSound,
}

impl Action {
    /// Every wire name, in declaration order.
    pub const NAMES: &[&str] = &[
        "toggle_timer",
        "reset_timer",
        "move_down",
        "move_up",
        "start_editing",
        "toggle_todo",
        "remove_todo",
        "complete_session",
        "prev_history",
        "next_history",
        "copy_markdown",
        "clear_notes",
        "new_session",
        "show_help",
        "toggle_history",
        "stop_editing",
        "edit_backspace",
        "edit_char",
        "confirm_modal",
        "dismiss_modal",
        "clear_sound",
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::ToggleTimer => "toggle_timer",
            Action::ResetTimer => "reset_timer",
            Action::MoveDown => "move_down",
            Action::MoveUp => "move_up",
            Action::StartEditing => "start_editing",
            Action::ToggleTodo => "toggle_todo",
            Action::RemoveTodo => "remove_todo",
            Action::CompleteSession => "complete_session",
            Action::PrevHistory => "prev_history",
            Action::NextHistory => "next_history",
            Action::CopyMarkdown => "copy_markdown",
            Action::ClearNotes => "clear_notes",
            Action::NewSession => "new_session",
            Action::ShowHelp => "show_help",
            Action::ToggleHistory => "toggle_history",
            Action::StopEditing => "stop_editing",
            Action::EditBackspace => "edit_backspace",
            Action::EditChar(_) => "edit_char",
            Action::ConfirmModal => "confirm_modal",
            Action::DismissModal => "dismiss_modal",
            Action::ClearSound => "clear_sound",
        }
    }

    pub fn payload(self) -> Option<String> {
        match self {
            Action::EditChar(c) => Some(c.to_string()),
            _ => None,
        }
    }

    /// Rebuild an action from its wire form.
    ///
    /// `edit_char` needs a non-empty payload and keeps only its first
    /// character. Unknown names yield `None`.
    pub fn from_wire(name: &str, payload: Option<&str>) -> Option<Self> {
        let action = match name {
            "toggle_timer" => Action::ToggleTimer,
            "reset_timer" => Action::ResetTimer,
            "move_down" => Action::MoveDown,
            "move_up" => Action::MoveUp,
            "start_editing" => Action::StartEditing,
            "toggle_todo" => Action::ToggleTodo,
            "remove_todo" => Action::RemoveTodo,
            "complete_session" => Action::CompleteSession,
            "prev_history" => Action::PrevHistory,
            "next_history" => Action::NextHistory,
            "copy_markdown" => Action::CopyMarkdown,
            "clear_notes" => Action::ClearNotes,
            "new_session" => Action::NewSession,
            "show_help" => Action::ShowHelp,
            "toggle_history" => Action::ToggleHistory,
            "stop_editing" => Action::StopEditing,
            "edit_backspace" => Action::EditBackspace,
            "edit_char" => Action::EditChar(payload?.chars().next()?),
            "confirm_modal" => Action::ConfirmModal,
            "dismiss_modal" => Action::DismissModal,
            "clear_sound" => Action::ClearSound,
            _ => return None,
        };
        Some(action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::EditChar(c) => write!(f, "edit_char({c:?})"),
            other => f.write_str(other.name()),
        }
    }
}
