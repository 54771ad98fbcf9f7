use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTodo {
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireNote {
    pub todos: Vec<WireTodo>,
    /// Already formatted, e.g. `"20:00"`.
    pub time_spent: String,
    #[serde(default)]
    pub completion_number: u64,
}

/// The flat state object every backend call returns.
///
/// This is the untrusted form: `input_mode` is still a string
/// (`"normal"`, `"editing:N"`, `"modal"`) and nothing has been range
/// checked. Decode it with `StateSnapshot::try_from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSnapshot {
    pub time_left: u64,
    pub is_running: bool,
    pub progress: f64,
    pub timer_display: String,
    pub todos: Vec<WireTodo>,
    pub selected_todo: usize,
    pub input_mode: String,
    #[serde(default)]
    pub editing_index: Option<usize>,
    #[serde(default)]
    pub modal: Option<String>,
    #[serde(default)]
    pub completed_notes: Vec<WireNote>,
    #[serde(default)]
    pub history_index: Option<usize>,
    #[serde(default)]
    pub history_total: usize,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub sound_pending: bool,
    #[serde(default = "default_true")]
    pub show_history: bool,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_take_defaults() {
        let json = r#"{
            "time_left": 3600,
            "is_running": false,
            "progress": 0.0,
            "timer_display": "60:00",
            "todos": [],
            "selected_todo": 0,
            "input_mode": "normal"
        }"#;
        let wire: WireSnapshot = serde_json::from_str(json).unwrap();
        assert!(wire.show_history);
        assert!(!wire.sound_pending);
        assert!(wire.completed_notes.is_empty());
        assert_eq!(wire.history_index, None);
        assert_eq!(wire.modal, None);
    }

    #[test]
    fn note_without_completion_number_defaults_to_zero() {
        let note: WireNote =
            serde_json::from_str(r#"{"todos":[{"text":"a","completed":true}],"time_spent":"1:00"}"#)
                .unwrap();
        assert_eq!(note.completion_number, 0);
        assert!(note.todos[0].completed);
    }
}
