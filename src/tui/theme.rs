use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

use crate::config::Prefs;

// ── Colour roles ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Bg,
    Bright,
    Normal,
    Dim,
    Faint,
    SelectionBg,
    BarBg,
    LabelText,
    GradientStart,
    GradientMid,
    GradientEnd,
    TasksBorder,
    HistoryBorder,
}

impl ColorRole {
    pub const ALL: [ColorRole; 13] = [
        ColorRole::Bg,
        ColorRole::Bright,
        ColorRole::Normal,
        ColorRole::Dim,
        ColorRole::Faint,
        ColorRole::SelectionBg,
        ColorRole::BarBg,
        ColorRole::LabelText,
        ColorRole::GradientStart,
        ColorRole::GradientMid,
        ColorRole::GradientEnd,
        ColorRole::TasksBorder,
        ColorRole::HistoryBorder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorRole::Bg => "bg",
            ColorRole::Bright => "bright",
            ColorRole::Normal => "normal",
            ColorRole::Dim => "dim",
            ColorRole::Faint => "faint",
            ColorRole::SelectionBg => "selection-bg",
            ColorRole::BarBg => "bar-bg",
            ColorRole::LabelText => "label-text",
            ColorRole::GradientStart => "gradient-start",
            ColorRole::GradientMid => "gradient-mid",
            ColorRole::GradientEnd => "gradient-end",
            ColorRole::TasksBorder => "tasks-border",
            ColorRole::HistoryBorder => "history-border",
        }
    }
}

/// Every colour the renderer uses, one per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub bright: Color,
    pub normal: Color,
    pub dim: Color,
    pub faint: Color,
    pub selection_bg: Color,
    pub bar_bg: Color,
    pub label_text: Color,
    pub gradient_start: Color,
    pub gradient_mid: Color,
    pub gradient_end: Color,
    pub tasks_border: Color,
    pub history_border: Color,
}

impl Palette {
    #[cfg(test)]
    fn role(&self, role: ColorRole) -> Color {
        match role {
            ColorRole::Bg => self.bg,
            ColorRole::Bright => self.bright,
            ColorRole::Normal => self.normal,
            ColorRole::Dim => self.dim,
            ColorRole::Faint => self.faint,
            ColorRole::SelectionBg => self.selection_bg,
            ColorRole::BarBg => self.bar_bg,
            ColorRole::LabelText => self.label_text,
            ColorRole::GradientStart => self.gradient_start,
            ColorRole::GradientMid => self.gradient_mid,
            ColorRole::GradientEnd => self.gradient_end,
            ColorRole::TasksBorder => self.tasks_border,
            ColorRole::HistoryBorder => self.history_border,
        }
    }

    fn role_mut(&mut self, role: ColorRole) -> &mut Color {
        match role {
            ColorRole::Bg => &mut self.bg,
            ColorRole::Bright => &mut self.bright,
            ColorRole::Normal => &mut self.normal,
            ColorRole::Dim => &mut self.dim,
            ColorRole::Faint => &mut self.faint,
            ColorRole::SelectionBg => &mut self.selection_bg,
            ColorRole::BarBg => &mut self.bar_bg,
            ColorRole::LabelText => &mut self.label_text,
            ColorRole::GradientStart => &mut self.gradient_start,
            ColorRole::GradientMid => &mut self.gradient_mid,
            ColorRole::GradientEnd => &mut self.gradient_end,
            ColorRole::TasksBorder => &mut self.tasks_border,
            ColorRole::HistoryBorder => &mut self.history_border,
        }
    }

    /// Colour at `pos` (0..=1) along start → mid → end.
    pub fn gradient(&self, pos: f64) -> Color {
        let pos = pos.clamp(0.0, 1.0);
        if pos <= 0.5 {
            lerp(self.gradient_start, self.gradient_mid, pos * 2.0)
        } else {
            lerp(self.gradient_mid, self.gradient_end, (pos - 0.5) * 2.0)
        }
    }

    /// Base style: normal text on the background.
    pub fn base(&self) -> Style {
        Style::default().fg(self.normal).bg(self.bg)
    }

    pub fn bright_style(&self) -> Style {
        Style::default().fg(self.bright).add_modifier(Modifier::BOLD)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn faint_style(&self) -> Style {
        Style::default().fg(self.faint)
    }

    /// Style for the selected row.
    pub fn selection_style(&self) -> Style {
        Style::default().fg(self.bright).bg(self.selection_bg)
    }
}

/// Blend two RGB colours; anything else snaps to the nearer end.
fn lerp(from: Color, to: Color, t: f64) -> Color {
    match (from, to) {
        (Color::Rgb(r1, g1, b1), Color::Rgb(r2, g2, b2)) => {
            let mix =
                |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
            Color::Rgb(mix(r1, r2), mix(g1, g2), mix(b1, b2))
        }
        _ if t < 0.5 => from,
        _ => to,
    }
}

// ── Presets ───────────────────────────────────────────────────────────

pub struct Preset {
    pub id: &'static str,
    pub name: &'static str,
    pub swatches: [Color; 3],
    pub palette: Palette,
}

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

pub static PRESETS: [Preset; 4] = [
    Preset {
        id: "ember",
        name: "Ember",
        swatches: [hex(0xffa000), hex(0xc87800), hex(0x784600)],
        palette: Palette {
            bg: hex(0x0a0500),
            bright: hex(0xffa000),
            normal: hex(0xc87800),
            dim: hex(0x784600),
            faint: hex(0x462800),
            selection_bg: hex(0x281600),
            bar_bg: hex(0x1e1000),
            label_text: hex(0x140a00),
            gradient_start: hex(0xffb400),
            gradient_mid: hex(0xc86400),
            gradient_end: hex(0x8c3200),
            tasks_border: hex(0xc87800),
            history_border: hex(0xc87800),
        },
    },
    Preset {
        id: "catppuccin",
        name: "Catppuccin",
        swatches: [hex(0xf38ba8), hex(0x74c7ec), hex(0xcba6f7)],
        palette: Palette {
            bg: hex(0x11111b),
            bright: hex(0xf38ba8),
            normal: hex(0xcdd6f4),
            dim: hex(0xa6adc8),
            faint: hex(0x45475a),
            selection_bg: hex(0x313244),
            bar_bg: hex(0x181825),
            label_text: hex(0x11111b),
            gradient_start: hex(0xf38ba8),
            gradient_mid: hex(0x89b4fa),
            gradient_end: hex(0x94e2d5),
            tasks_border: hex(0x74c7ec),
            history_border: hex(0xcba6f7),
        },
    },
    Preset {
        id: "solarized",
        name: "Solarized",
        swatches: [hex(0x268bd2), hex(0x2aa198), hex(0x859900)],
        palette: Palette {
            bg: hex(0x002b36),
            bright: hex(0x268bd2),
            normal: hex(0x839496),
            dim: hex(0x586e75),
            faint: hex(0x073642),
            selection_bg: hex(0x073642),
            bar_bg: hex(0x001e26),
            label_text: hex(0x002b36),
            gradient_start: hex(0x268bd2),
            gradient_mid: hex(0x2aa198),
            gradient_end: hex(0x859900),
            tasks_border: hex(0x2aa198),
            history_border: hex(0x6c71c4),
        },
    },
    Preset {
        id: "gruvbox",
        name: "Gruvbox",
        swatches: [hex(0xfe8019), hex(0xfabd2f), hex(0xb8bb26)],
        palette: Palette {
            bg: hex(0x1d2021),
            bright: hex(0xfe8019),
            normal: hex(0xebdbb2),
            dim: hex(0xa89984),
            faint: hex(0x504945),
            selection_bg: hex(0x3c3836),
            bar_bg: hex(0x282828),
            label_text: hex(0x1d2021),
            gradient_start: hex(0xfb4934),
            gradient_mid: hex(0xfe8019),
            gradient_end: hex(0xfabd2f),
            tasks_border: hex(0x83a598),
            history_border: hex(0xd3869b),
        },
    },
];

pub fn preset_index(id: &str) -> Option<usize> {
    PRESETS.iter().position(|p| p.id == id)
}

// ── Config deserialization ────────────────────────────────────────────

/// `[theme]` section of `config.toml`: the preset to start with plus
/// optional per-role overrides that apply on top of every preset.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct ThemeConfig {
    pub default: Option<String>,

    pub bg: Option<String>,
    pub bright: Option<String>,
    pub normal: Option<String>,
    pub dim: Option<String>,
    pub faint: Option<String>,
    pub selection_bg: Option<String>,
    pub bar_bg: Option<String>,
    pub label_text: Option<String>,
    pub gradient_start: Option<String>,
    pub gradient_mid: Option<String>,
    pub gradient_end: Option<String>,
    pub tasks_border: Option<String>,
    pub history_border: Option<String>,
}

/// Parse a colour string into a ratatui `Color`.
///
/// Supports named colours (`"cyan"`, `"red"`, `"dark_gray"`, etc.),
/// `"#rrggbb"` and `"rgb(R,G,B)"` syntax.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(digits) = s.strip_prefix('#') {
        if digits.len() != 6 {
            return None;
        }
        return u32::from_str_radix(digits, 16).ok().map(hex);
    }

    if let Some(inner) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        let parts: Vec<&str> = inner.split(',').collect();
        if parts.len() == 3 {
            let r = parts[0].trim().parse::<u8>().ok()?;
            let g = parts[1].trim().parse::<u8>().ok()?;
            let b = parts[2].trim().parse::<u8>().ok()?;
            return Some(Color::Rgb(r, g, b));
        }
        return None;
    }

    // Named colours (case-insensitive, with underscore tolerance)
    let lower = s.to_lowercase().replace('-', "_");
    match lower.as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "white" => Some(Color::White),
        _ => None,
    }
}

impl ThemeConfig {
    fn override_for(&self, role: ColorRole) -> Option<&String> {
        match role {
            ColorRole::Bg => self.bg.as_ref(),
            ColorRole::Bright => self.bright.as_ref(),
            ColorRole::Normal => self.normal.as_ref(),
            ColorRole::Dim => self.dim.as_ref(),
            ColorRole::Faint => self.faint.as_ref(),
            ColorRole::SelectionBg => self.selection_bg.as_ref(),
            ColorRole::BarBg => self.bar_bg.as_ref(),
            ColorRole::LabelText => self.label_text.as_ref(),
            ColorRole::GradientStart => self.gradient_start.as_ref(),
            ColorRole::GradientMid => self.gradient_mid.as_ref(),
            ColorRole::GradientEnd => self.gradient_end.as_ref(),
            ColorRole::TasksBorder => self.tasks_border.as_ref(),
            ColorRole::HistoryBorder => self.history_border.as_ref(),
        }
    }

    /// The preset's palette with every parseable override applied.
    /// Unparseable values are logged and skipped.
    pub fn build(&self, preset: &Preset) -> Palette {
        let mut palette = preset.palette;
        for role in ColorRole::ALL {
            let Some(raw) = self.override_for(role) else {
                continue;
            };
            match parse_color(raw) {
                Some(color) => *palette.role_mut(role) = color,
                None => tracing::warn!(
                    role = role.as_str(),
                    value = %raw,
                    "ignoring unparseable colour"
                ),
            }
        }
        palette
    }
}

// ── Theme engine ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeCommand {
    Next,
    Prev,
    Apply,
    Close,
}

/// Active preset, the picker overlay, and the palette derived from both.
///
/// Entirely local: nothing here talks to the backend.
pub struct ThemeEngine {
    active: usize,
    highlighted: Option<usize>,
    palette: Palette,
    config: ThemeConfig,
    prefs: Option<Prefs>,
}

impl ThemeEngine {
    /// Start from the persisted preset, else the configured default, else
    /// the first preset.
    pub fn new(config: ThemeConfig, prefs: Option<Prefs>) -> Self {
        let persisted = prefs.as_ref().and_then(Prefs::load_theme);
        let active = resolve(persisted.as_deref(), "persisted")
            .or_else(|| resolve(config.default.as_deref(), "configured default"))
            .unwrap_or(0);
        let palette = config.build(&PRESETS[active]);
        ThemeEngine {
            active,
            highlighted: None,
            palette,
            config,
            prefs,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_preset(&self) -> &'static Preset {
        &PRESETS[self.active]
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn is_open(&self) -> bool {
        self.highlighted.is_some()
    }

    pub fn open(&mut self) {
        self.highlighted = Some(self.active);
    }

    pub fn close(&mut self) {
        self.highlighted = None;
    }

    /// Move the highlight one step, wrapping at either end.
    pub fn move_highlight(&mut self, forward: bool) {
        let Some(current) = self.highlighted else {
            return;
        };
        let len = PRESETS.len();
        self.highlighted = Some(if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        });
    }

    /// Make `index` the active preset and persist it.
    ///
    /// The palette changes even when persisting fails; the error is only
    /// about surviving a restart.
    pub fn apply(&mut self, index: usize) -> anyhow::Result<()> {
        let Some(preset) = PRESETS.get(index) else {
            anyhow::bail!("no theme preset at index {index}");
        };
        self.active = index;
        self.palette = self.config.build(preset);
        if let Some(prefs) = &self.prefs {
            prefs.save_theme(preset.id)?;
        }
        Ok(())
    }

    pub fn handle(&mut self, command: ThemeCommand) {
        match command {
            ThemeCommand::Next => self.move_highlight(true),
            ThemeCommand::Prev => self.move_highlight(false),
            ThemeCommand::Apply => {
                if let Some(index) = self.highlighted
                    && let Err(e) = self.apply(index)
                {
                    tracing::warn!("failed to persist theme: {e:#}");
                }
            }
            ThemeCommand::Close => self.close(),
        }
    }
}

fn resolve(id: Option<&str>, source: &str) -> Option<usize> {
    let id = id?;
    let index = preset_index(id);
    if index.is_none() {
        tracing::warn!(id, source, "unknown theme id");
    }
    index
}
