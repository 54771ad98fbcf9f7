use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::theme::ThemeCommand;
use crate::protocol::Action;
use crate::state::InputMode;

// ── Intents ──────────────────────────────────────────────────────────

/// What a key press asks for. At most one per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Ship an action to the backend.
    Backend(Action),
    /// Open the theme picker. Local only.
    OpenThemes,
    /// Drive the open theme picker. Local only.
    Theme(ThemeCommand),
    Quit,
}

/// Everything the dispatcher needs to know about the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeContext {
    /// The theme picker is open; it wins over every backend mode.
    pub overlay_open: bool,
    /// Backend input mode, or `None` before the first snapshot arrives.
    pub mode: Option<InputMode>,
}

// ── Keybinding ───────────────────────────────────────────────────────

/// A single key → intent mapping with metadata for the help modal.
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
    pub intent: Intent,
    /// Human-readable key label shown in help (e.g. `"j/↓"`). Empty for
    /// bindings already covered by another row.
    pub label: &'static str,
    pub description: &'static str,
}

/// A single row in the help modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpEntry {
    pub label: &'static str,
    pub description: &'static str,
}

// ── KeyMap ────────────────────────────────────────────────────────────

/// Declarative registry of every key binding, one table per mode.
pub struct KeyMap {
    pub normal: Vec<KeyBinding>,
    pub editing: Vec<KeyBinding>,
    pub modal: Vec<KeyBinding>,
    pub themes: Vec<KeyBinding>,
}

impl KeyMap {
    pub fn default_keymap() -> Self {
        Self {
            normal: default_normal_bindings(),
            editing: default_editing_bindings(),
            modal: default_modal_bindings(),
            themes: default_theme_bindings(),
        }
    }

    /// Map one key event to at most one intent.
    ///
    /// Only presses count. Shift is ignored for character keys, so `D` and
    /// `?` match however the terminal reports them.
    pub fn dispatch(&self, ctx: ModeContext, key: &KeyEvent) -> Option<Intent> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        let modifiers = match key.code {
            KeyCode::Char(_) => key.modifiers.difference(KeyModifiers::SHIFT),
            _ => key.modifiers,
        };

        if ctx.overlay_open {
            return lookup(&self.themes, key.code, modifiers);
        }

        match ctx.mode {
            None => lookup(&self.normal, key.code, modifiers).filter(|i| *i == Intent::Quit),
            Some(InputMode::Normal) => lookup(&self.normal, key.code, modifiers),
            Some(InputMode::Modal(_)) => lookup(&self.modal, key.code, modifiers),
            Some(InputMode::Editing(_)) => {
                lookup(&self.editing, key.code, modifiers).or_else(|| match key.code {
                    KeyCode::Char(c)
                        if !c.is_control()
                            && !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                    {
                        Some(Intent::Backend(Action::EditChar(c)))
                    }
                    _ => None,
                })
            }
        }
    }

    /// Shortcut rows for the help modal, generated from the normal table.
    pub fn help_entries(&self) -> Vec<HelpEntry> {
        let mut entries: Vec<HelpEntry> = Vec::new();
        for kb in &self.normal {
            if !kb.label.is_empty() && !entries.iter().any(|e| e.label == kb.label) {
                entries.push(HelpEntry {
                    label: kb.label,
                    description: kb.description,
                });
            }
        }
        entries
    }
}

// ── Lookup helper ────────────────────────────────────────────────────

fn lookup(bindings: &[KeyBinding], code: KeyCode, modifiers: KeyModifiers) -> Option<Intent> {
    bindings
        .iter()
        .find(|kb| kb.code == code && kb.modifiers == modifiers)
        .map(|kb| kb.intent)
}

fn bind(
    code: KeyCode,
    intent: Intent,
    label: &'static str,
    description: &'static str,
) -> KeyBinding {
    KeyBinding {
        code,
        modifiers: KeyModifiers::NONE,
        intent,
        label,
        description,
    }
}

// ── Default bindings ─────────────────────────────────────────────────

#[allow(clippy::enum_glob_use)]
fn default_normal_bindings() -> Vec<KeyBinding> {
    use Action::*;
    use Intent::Backend;

    vec![
        // ── Timer ────────────────────────────────────────────────
        bind(KeyCode::Char(' '), Backend(ToggleTimer), "Space", "Play/Pause timer"),
        bind(KeyCode::Char('r'), Backend(ResetTimer), "r", "Reset timer"),
        // ── Todos ────────────────────────────────────────────────
        bind(KeyCode::Char('j'), Backend(MoveDown), "j/↓", "Move down"),
        bind(KeyCode::Down, Backend(MoveDown), "", ""),
        bind(KeyCode::Char('k'), Backend(MoveUp), "k/↑", "Move up"),
        bind(KeyCode::Up, Backend(MoveUp), "", ""),
        bind(KeyCode::Enter, Backend(StartEditing), "Enter", "Edit task"),
        bind(KeyCode::Char('x'), Backend(ToggleTodo), "x", "Check off task"),
        bind(KeyCode::Char('d'), Backend(RemoveTodo), "d", "Clear task"),
        // ── Session and history ──────────────────────────────────
        bind(KeyCode::Char('c'), Backend(CompleteSession), "c", "Complete session"),
        bind(KeyCode::Char('h'), Backend(PrevHistory), "h/←", "Prev history"),
        bind(KeyCode::Left, Backend(PrevHistory), "", ""),
        bind(KeyCode::Char('l'), Backend(NextHistory), "l/→", "Next history"),
        bind(KeyCode::Right, Backend(NextHistory), "", ""),
        bind(KeyCode::Char('y'), Backend(CopyMarkdown), "y", "Copy markdown"),
        bind(KeyCode::Char('D'), Backend(ClearNotes), "D", "Clear history"),
        bind(KeyCode::Char('N'), Backend(NewSession), "N", "New session"),
        bind(KeyCode::Char('H'), Backend(ToggleHistory), "H", "Show/hide history"),
        // ── Local ────────────────────────────────────────────────
        bind(KeyCode::Char('t'), Intent::OpenThemes, "t", "Themes"),
        bind(KeyCode::Char('?'), Backend(ShowHelp), "?", "This help"),
        bind(KeyCode::Char('q'), Intent::Quit, "q", "Quit"),
        KeyBinding {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            intent: Intent::Quit,
            label: "",
            description: "",
        },
    ]
}

fn default_editing_bindings() -> Vec<KeyBinding> {
    let stop = Intent::Backend(Action::StopEditing);
    vec![
        bind(KeyCode::Enter, stop, "Enter", "Done editing"),
        bind(KeyCode::Esc, stop, "Esc", "Done editing"),
        bind(
            KeyCode::Backspace,
            Intent::Backend(Action::EditBackspace),
            "Backspace",
            "Delete character",
        ),
    ]
}

fn default_modal_bindings() -> Vec<KeyBinding> {
    let confirm = Intent::Backend(Action::ConfirmModal);
    let dismiss = Intent::Backend(Action::DismissModal);
    vec![
        bind(KeyCode::Char('y'), confirm, "y", "Yes"),
        bind(KeyCode::Enter, confirm, "", ""),
        bind(KeyCode::Char('n'), dismiss, "n", "No"),
        bind(KeyCode::Esc, dismiss, "Esc", "Close"),
    ]
}

fn default_theme_bindings() -> Vec<KeyBinding> {
    use ThemeCommand::{Apply, Close, Next, Prev};
    vec![
        bind(KeyCode::Char('j'), Intent::Theme(Next), "j/↓", "Next theme"),
        bind(KeyCode::Down, Intent::Theme(Next), "", ""),
        bind(KeyCode::Char('k'), Intent::Theme(Prev), "k/↑", "Previous theme"),
        bind(KeyCode::Up, Intent::Theme(Prev), "", ""),
        bind(KeyCode::Enter, Intent::Theme(Apply), "Enter", "Apply"),
        bind(KeyCode::Esc, Intent::Theme(Close), "Esc/t", "Close"),
        bind(KeyCode::Char('t'), Intent::Theme(Close), "", ""),
    ]
}

// ── Tests ────────────────────────────────────────────────────────────
