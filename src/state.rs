//! Typed, validated view of the backend's state.
//!
//! `WireSnapshot` is what arrives; `StateSnapshot` is what the rest of the
//! client reads. Conversion happens once, here, and rejects anything that
//! breaks the state invariants instead of guessing.

use crate::error::SnapshotError;
use crate::protocol::{WireNote, WireSnapshot, WireTodo};

/// Number of todo slots in every session.
pub const TODO_SLOTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Help,
    CompleteSession,
    ClearNotes,
    NewSession,
}

impl ModalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModalKind::Help => "help",
            ModalKind::CompleteSession => "complete_session",
            ModalKind::ClearNotes => "clear_notes",
            ModalKind::NewSession => "new_session",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "help" => Some(ModalKind::Help),
            "complete_session" => Some(ModalKind::CompleteSession),
            "clear_notes" => Some(ModalKind::ClearNotes),
            "new_session" => Some(ModalKind::NewSession),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing(usize),
    Modal(ModalKind),
}

impl InputMode {
    /// The `input_mode` string as it appears on the wire.
    pub fn wire_tag(self) -> String {
        match self {
            InputMode::Normal => "normal".to_string(),
            InputMode::Editing(slot) => format!("editing:{slot}"),
            InputMode::Modal(_) => "modal".to_string(),
        }
    }

    fn decode(mode: &str, modal: Option<&str>) -> Result<Self, SnapshotError> {
        let kind = modal.map(|m| {
            ModalKind::parse(m).ok_or_else(|| SnapshotError::UnknownModalKind(m.to_string()))
        });
        match mode {
            "normal" => match modal {
                Some(m) => Err(SnapshotError::UnexpectedModal(m.to_string())),
                None => Ok(InputMode::Normal),
            },
            "modal" => match kind {
                Some(kind) => Ok(InputMode::Modal(kind?)),
                None => Err(SnapshotError::MissingModalKind),
            },
            other => {
                let slot = other
                    .strip_prefix("editing:")
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| SnapshotError::UnknownMode(other.to_string()))?;
                if let Some(m) = modal {
                    return Err(SnapshotError::UnexpectedModal(m.to_string()));
                }
                if slot >= TODO_SLOTS {
                    return Err(SnapshotError::EditingOutOfRange(slot));
                }
                Ok(InputMode::Editing(slot))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Todo {
    pub text: String,
    pub completed: bool,
}

impl Todo {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<WireTodo> for Todo {
    fn from(t: WireTodo) -> Self {
        Todo {
            text: t.text,
            completed: t.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimerState {
    pub time_left: u64,
    /// Fraction of the hour already spent, in `[0, 1]`.
    pub progress: f64,
    pub is_running: bool,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryNote {
    pub todos: Vec<Todo>,
    pub time_spent: String,
    pub completion_number: u64,
}

impl From<WireNote> for HistoryNote {
    fn from(n: WireNote) -> Self {
        HistoryNote {
            todos: n.todos.into_iter().map(Todo::from).collect(),
            time_spent: n.time_spent,
            completion_number: n.completion_number,
        }
    }
}

/// The backend's state as last applied by the client. Never mutated locally.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub input_mode: InputMode,
    pub timer: TimerState,
    pub todos: [Todo; TODO_SLOTS],
    pub selected_todo: usize,
    pub status_message: Option<String>,
    pub show_history: bool,
    pub completed_notes: Vec<HistoryNote>,
    pub history_index: Option<usize>,
    pub history_total: usize,
    pub sound_pending: bool,
}

impl StateSnapshot {
    pub fn editing_index(&self) -> Option<usize> {
        match self.input_mode {
            InputMode::Editing(slot) => Some(slot),
            _ => None,
        }
    }

    pub fn modal(&self) -> Option<ModalKind> {
        match self.input_mode {
            InputMode::Modal(kind) => Some(kind),
            _ => None,
        }
    }
}

impl TryFrom<WireSnapshot> for StateSnapshot {
    type Error = SnapshotError;

    fn try_from(wire: WireSnapshot) -> Result<Self, Self::Error> {
        let input_mode = InputMode::decode(&wire.input_mode, wire.modal.as_deref())?;

        let mode_slot = match input_mode {
            InputMode::Editing(slot) => Some(slot),
            _ => None,
        };
        if mode_slot != wire.editing_index {
            return Err(SnapshotError::EditingMismatch {
                mode: mode_slot,
                reported: wire.editing_index,
            });
        }

        let count = wire.todos.len();
        let todos: [Todo; TODO_SLOTS] = wire
            .todos
            .into_iter()
            .map(Todo::from)
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| SnapshotError::TodoCount(count))?;

        if wire.selected_todo >= TODO_SLOTS {
            return Err(SnapshotError::SelectionOutOfRange(wire.selected_todo));
        }

        if !wire.progress.is_finite() || !(0.0..=1.0).contains(&wire.progress) {
            return Err(SnapshotError::ProgressOutOfRange(wire.progress));
        }

        let len = wire.completed_notes.len();
        let history_index = match wire.history_index {
            Some(index) if len > 0 && index >= len => {
                return Err(SnapshotError::HistoryOutOfRange { index, len });
            }
            // Nothing to point at; an index into an empty history is noise.
            Some(_) if len == 0 => None,
            other => other,
        };

        Ok(StateSnapshot {
            input_mode,
            timer: TimerState {
                time_left: wire.time_left,
                progress: wire.progress,
                is_running: wire.is_running,
                display: wire.timer_display,
            },
            todos,
            selected_todo: wire.selected_todo,
            status_message: wire.status_message,
            show_history: wire.show_history,
            completed_notes: wire.completed_notes.into_iter().map(HistoryNote::from).collect(),
            history_index,
            history_total: wire.history_total,
            sound_pending: wire.sound_pending,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A fresh session: full hour, four empty slots, normal mode.
    pub fn wire() -> WireSnapshot {
        WireSnapshot {
            time_left: 3600,
            is_running: false,
            progress: 0.0,
            timer_display: "60:00".to_string(),
            todos: vec![WireTodo::default(); TODO_SLOTS],
            selected_todo: 0,
            input_mode: "normal".to_string(),
            editing_index: None,
            modal: None,
            completed_notes: Vec::new(),
            history_index: None,
            history_total: 0,
            status_message: None,
            sound_pending: false,
            show_history: true,
        }
    }

    pub fn note(n: u64, texts: &[&str]) -> WireNote {
        WireNote {
            todos: texts
                .iter()
                .map(|t| WireTodo {
                    text: (*t).to_string(),
                    completed: true,
                })
                .collect(),
            time_spent: "20:00".to_string(),
            completion_number: n,
        }
    }

    pub fn snapshot() -> StateSnapshot {
        StateSnapshot::try_from(wire()).expect("fixture is valid")
    }

    pub fn snapshot_from(wire: WireSnapshot) -> StateSnapshot {
        StateSnapshot::try_from(wire).expect("fixture is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{note, wire};
    use super::*;

    #[test]
    fn decodes_a_fresh_session() {
        let snap = StateSnapshot::try_from(wire()).unwrap();
        assert_eq!(snap.input_mode, InputMode::Normal);
        assert_eq!(snap.editing_index(), None);
        assert_eq!(snap.modal(), None);
        assert_eq!(snap.timer.display, "60:00");
        assert!(snap.todos.iter().all(Todo::is_empty));
    }

    #[test]
    fn decodes_editing_mode() {
        let mut w = wire();
        w.input_mode = "editing:2".into();
        w.editing_index = Some(2);
        let snap = StateSnapshot::try_from(w).unwrap();
        assert_eq!(snap.input_mode, InputMode::Editing(2));
        assert_eq!(snap.editing_index(), Some(2));
    }

    #[test]
    fn decodes_every_modal_kind() {
        for kind in [
            ModalKind::Help,
            ModalKind::CompleteSession,
            ModalKind::ClearNotes,
            ModalKind::NewSession,
        ] {
            let mut w = wire();
            w.input_mode = "modal".into();
            w.modal = Some(kind.as_str().into());
            let snap = StateSnapshot::try_from(w).unwrap();
            assert_eq!(snap.modal(), Some(kind));
        }
    }

    #[test]
    fn wire_tag_matches_decoder() {
        assert_eq!(InputMode::Normal.wire_tag(), "normal");
        assert_eq!(InputMode::Editing(3).wire_tag(), "editing:3");
        assert_eq!(InputMode::Modal(ModalKind::Help).wire_tag(), "modal");
    }

    #[test]
    fn rejects_unknown_mode() {
        for bad in ["insert", "editing:", "editing:x", ""] {
            let mut w = wire();
            w.input_mode = bad.into();
            assert_eq!(
                StateSnapshot::try_from(w),
                Err(SnapshotError::UnknownMode(bad.into()))
            );
        }
    }

    #[test]
    fn rejects_modal_without_kind() {
        let mut w = wire();
        w.input_mode = "modal".into();
        assert_eq!(
            StateSnapshot::try_from(w),
            Err(SnapshotError::MissingModalKind)
        );
    }

    #[test]
    fn rejects_unknown_modal_kind() {
        let mut w = wire();
        w.input_mode = "modal".into();
        w.modal = Some("settings".into());
        assert_eq!(
            StateSnapshot::try_from(w),
            Err(SnapshotError::UnknownModalKind("settings".into()))
        );
    }

    #[test]
    fn rejects_modal_kind_outside_modal_mode() {
        let mut w = wire();
        w.modal = Some("help".into());
        assert_eq!(
            StateSnapshot::try_from(w),
            Err(SnapshotError::UnexpectedModal("help".into()))
        );
    }

    #[test]
    fn rejects_editing_slot_out_of_range() {
        let mut w = wire();
        w.input_mode = "editing:4".into();
        w.editing_index = Some(4);
        assert_eq!(
            StateSnapshot::try_from(w),
            Err(SnapshotError::EditingOutOfRange(4))
        );
    }

    #[test]
    fn rejects_editing_index_disagreement() {
        let mut w = wire();
        w.input_mode = "editing:1".into();
        w.editing_index = Some(2);
        assert_eq!(
            StateSnapshot::try_from(w),
            Err(SnapshotError::EditingMismatch {
                mode: Some(1),
                reported: Some(2)
            })
        );

        let mut w = wire();
        w.editing_index = Some(0);
        assert_eq!(
            StateSnapshot::try_from(w),
            Err(SnapshotError::EditingMismatch {
                mode: None,
                reported: Some(0)
            })
        );
    }

    #[test]
    fn rejects_wrong_todo_count() {
        let mut w = wire();
        w.todos.pop();
        assert_eq!(StateSnapshot::try_from(w), Err(SnapshotError::TodoCount(3)));
    }

    #[test]
    fn rejects_selection_out_of_range() {
        let mut w = wire();
        w.selected_todo = 4;
        assert_eq!(
            StateSnapshot::try_from(w),
            Err(SnapshotError::SelectionOutOfRange(4))
        );
    }

    #[test]
    fn rejects_bad_progress() {
        for bad in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let mut w = wire();
            w.progress = bad;
            assert!(matches!(
                StateSnapshot::try_from(w),
                Err(SnapshotError::ProgressOutOfRange(_))
            ));
        }
    }

    #[test]
    fn history_index_bounds() {
        let mut w = wire();
        w.completed_notes = vec![note(1, &["a"]), note(2, &["b"])];
        w.history_total = 2;
        w.history_index = Some(1);
        assert_eq!(StateSnapshot::try_from(w.clone()).unwrap().history_index, Some(1));

        w.history_index = Some(2);
        assert_eq!(
            StateSnapshot::try_from(w),
            Err(SnapshotError::HistoryOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn history_index_into_empty_history_is_dropped() {
        let mut w = wire();
        w.history_index = Some(5);
        assert_eq!(StateSnapshot::try_from(w).unwrap().history_index, None);
    }
}
