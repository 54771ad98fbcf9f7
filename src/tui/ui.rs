use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::sync::LinkStatus;

use super::gradient_bar::GradientBar;
use super::theme::Palette;
use super::view::{
    DEFAULT_HINTS, HintBar, HistoryPanel, ModalBody, ModalView, Screen, ThemePicker, TimerView,
    TodoRow, TodoText,
};

const TITLE: &str = "ONE GOOD HOUR";

/// Draw one frame. Before the first snapshot there is no `Screen`, only a
/// splash that says whether the backend has answered yet.
pub fn draw(frame: &mut Frame, screen: Option<&Screen>, link: LinkStatus, palette: &Palette) {
    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base()), area);

    let Some(screen) = screen else {
        draw_splash(frame, link, palette, area);
        return;
    };

    let history_height = if screen.history == HistoryPanel::Hidden {
        Constraint::Min(0)
    } else {
        Constraint::Min(8)
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(6),
            Constraint::Length(3),
            history_height,
        ])
        .split(area);

    draw_title(frame, screen.disconnected, palette, chunks[0]);
    draw_timer(frame, &screen.timer, palette, chunks[1]);
    draw_todos(frame, &screen.todos, palette, chunks[2]);
    draw_action_bar(frame, &screen.hint, palette, chunks[3]);
    draw_history(frame, &screen.history, palette, chunks[4]);

    if let Some(modal) = &screen.modal {
        draw_modal(frame, modal, palette);
    }
    if let Some(picker) = &screen.picker {
        draw_theme_picker(frame, picker, palette);
    }
}

fn draw_splash(frame: &mut Frame, link: LinkStatus, palette: &Palette, area: Rect) {
    let status = match link {
        LinkStatus::Disconnected { .. } => "Backend unreachable, retrying…",
        LinkStatus::Connecting | LinkStatus::Connected => "Connecting…",
    };
    let text = vec![
        Line::from(Span::styled(TITLE, palette.bright_style())),
        Line::from(""),
        Line::from(Span::styled(status, palette.dim_style())),
        Line::from(Span::styled("[q] Quit", palette.faint_style())),
    ];
    let rect = centered_rect_fixed(area.width, text.len() as u16, area);
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), rect);
}

fn draw_title(frame: &mut Frame, disconnected: bool, palette: &Palette, area: Rect) {
    let mut spans = vec![Span::styled(TITLE, palette.bright_style())];
    if disconnected {
        spans.push(Span::styled("  · disconnected", palette.dim_style()));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn draw_timer(frame: &mut Frame, timer: &TimerView, palette: &Palette, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    frame.render_widget(
        GradientBar {
            ratio: timer.ratio,
            label: &timer.label,
            palette,
        },
        rows[0],
    );

    let hint = Line::from(vec![
        Span::styled(timer.status.label(), palette.bright_style()),
        Span::styled("  [Space] Play/Pause  [r] Reset", palette.faint_style()),
    ]);
    frame.render_widget(Paragraph::new(hint).alignment(Alignment::Center), rows[1]);
}

fn draw_todos(frame: &mut Frame, todos: &[TodoRow], palette: &Palette, area: Rect) {
    let block = Block::default()
        .title(" Tasks ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.tasks_border));

    let lines: Vec<Line> = todos.iter().map(|row| todo_line(row, palette)).collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn todo_line<'a>(row: &'a TodoRow, palette: &Palette) -> Line<'a> {
    let selector = if row.selected { "▸ " } else { "  " };
    let checkbox = if row.checked { "[x] " } else { "[ ] " };
    let number = format!("{}. ", row.number);

    let mut spans = vec![
        Span::styled(selector, palette.bright_style()),
        Span::styled(checkbox, palette.dim_style()),
        Span::styled(number, palette.dim_style()),
    ];
    match &row.text {
        TodoText::Placeholder => spans.push(Span::styled("(empty)", palette.faint_style())),
        TodoText::Editing(text) => {
            spans.push(Span::styled(text.as_str(), Style::default().fg(palette.bright)));
            spans.push(Span::styled("▎", palette.bright_style()));
        }
        TodoText::Done(text) => spans.push(Span::styled(
            text.as_str(),
            palette.dim_style().add_modifier(Modifier::CROSSED_OUT),
        )),
        TodoText::Open(text) => {
            spans.push(Span::styled(text.as_str(), Style::default().fg(palette.normal)));
        }
    }

    let line = Line::from(spans);
    if row.selected {
        line.style(Style::default().bg(palette.selection_bg))
    } else {
        line
    }
}

fn draw_action_bar(frame: &mut Frame, hint: &HintBar, palette: &Palette, area: Rect) {
    let block = Block::default()
        .borders(Borders::TOP | Borders::BOTTOM)
        .border_style(palette.faint_style());

    let text = match hint {
        HintBar::Status(msg) => Span::styled(msg.as_str(), palette.bright_style()),
        HintBar::Defaults => Span::styled(DEFAULT_HINTS, palette.dim_style()),
    };
    frame.render_widget(
        Paragraph::new(Line::from(text))
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn draw_history(frame: &mut Frame, history: &HistoryPanel, palette: &Palette, area: Rect) {
    let (position, total, todos, time_spent) = match history {
        HistoryPanel::Hidden => return,
        HistoryPanel::Empty => {
            let block = history_block(palette);
            let text = Paragraph::new(Span::styled(
                "No completed sessions yet. Complete a session with [c].",
                palette.faint_style(),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
            frame.render_widget(text, area);
            return;
        }
        HistoryPanel::Note {
            position,
            total,
            todos,
            time_spent,
        } => (position, total, todos, time_spent),
    };

    let block = history_block(palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let header = Line::from(vec![
        Span::styled("[←/h] ", palette.faint_style()),
        Span::styled(format!("Session {position} of {total}"), palette.bright_style()),
        Span::styled(" [→/l]", palette.faint_style()),
    ]);
    frame.render_widget(Paragraph::new(header).alignment(Alignment::Center), rows[0]);

    let lines: Vec<Line> = todos
        .iter()
        .map(|todo| {
            let (mark, style) = if todo.completed {
                ("[x] ", palette.dim_style().add_modifier(Modifier::CROSSED_OUT))
            } else {
                ("[ ] ", Style::default().fg(palette.normal))
            };
            Line::from(vec![
                Span::styled(format!("  {mark}"), palette.dim_style()),
                Span::styled(todo.text.as_str(), style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), rows[1]);

    let footer = Line::from(vec![
        Span::styled(format!("Time: {time_spent}"), palette.dim_style()),
        Span::styled("  [y] Copy  [D] Clear", palette.faint_style()),
    ]);
    frame.render_widget(Paragraph::new(footer).alignment(Alignment::Center), rows[2]);
}

fn history_block(palette: &Palette) -> Block<'static> {
    Block::default()
        .title(" History ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.history_border))
}

fn draw_modal(frame: &mut Frame, modal: &ModalView, palette: &Palette) {
    let area = frame.area();
    let block = Block::default()
        .title(format!(" {} ", modal.title))
        .borders(Borders::ALL)
        .border_style(palette.bright_style())
        .style(palette.base());

    match &modal.body {
        ModalBody::Confirm(sentence) => {
            let rect = centered_rect_fixed(40, 7, area);
            frame.render_widget(Clear, rect);
            let text = vec![
                Line::from(Span::styled(*sentence, Style::default().fg(palette.normal))),
                Line::from(""),
                Line::from(Span::styled("[y] Yes  [n] No", palette.dim_style())),
            ];
            frame.render_widget(
                Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(block),
                rect,
            );
        }
        ModalBody::Help(entries) => {
            let width = (area.width / 10 * 6).max(44);
            let rect = centered_rect_fixed(width, entries.len() as u16 + 4, area);
            frame.render_widget(Clear, rect);
            let mut lines: Vec<Line> = entries
                .iter()
                .map(|entry| {
                    Line::from(vec![
                        Span::styled(format!("  {:<12}", entry.label), palette.bright_style()),
                        Span::styled(entry.description, Style::default().fg(palette.normal)),
                    ])
                })
                .collect();
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("  [Esc] Close", palette.faint_style())));
            frame.render_widget(Paragraph::new(lines).block(block), rect);
        }
    }
}

fn draw_theme_picker(frame: &mut Frame, picker: &ThemePicker, palette: &Palette) {
    let area = frame.area();
    let rect = centered_rect_fixed(38, picker.options.len() as u16 + 4, area);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .title(" Themes ")
        .borders(Borders::ALL)
        .border_style(palette.bright_style())
        .style(palette.base());

    let mut lines: Vec<Line> = picker
        .options
        .iter()
        .map(|option| {
            let (selector, style) = if option.highlighted {
                ("▸ ", palette.selection_style())
            } else {
                ("  ", Style::default().fg(palette.normal))
            };
            let mut spans = vec![
                Span::styled(selector, style),
                Span::styled(format!("{:<12}", option.name), style),
            ];
            for swatch in option.swatches {
                spans.push(Span::styled("██", Style::default().fg(swatch)));
                spans.push(Span::raw(" "));
            }
            if option.active {
                spans.push(Span::styled("✓", palette.bright_style()));
            }
            Line::from(spans)
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[j/k] Move  [Enter] Apply  [Esc] Close",
        palette.faint_style(),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), rect);
}

/// A `width` × `height` rect centred in `area`, shrunk to fit.
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;

    use super::*;
    use crate::state::StateSnapshot;
    use crate::state::fixtures::{self, note, snapshot_from, wire};
    use crate::tui::keymap::KeyMap;
    use crate::tui::theme::{PRESETS, ThemeConfig, ThemeEngine};
    use crate::tui::view::project;

    fn buffer_to_string(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                if let Some(cell) = buffer.cell((x, y)) {
                    out.push_str(cell.symbol());
                }
            }
            out.push('\n');
        }
        out
    }

    fn render(screen: Option<&Screen>, link: LinkStatus) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 30)).unwrap();
        let palette = PRESETS[0].palette;
        terminal
            .draw(|frame| draw(frame, screen, link, &palette))
            .unwrap();
        buffer_to_string(terminal.backend().buffer())
    }

    fn render_snapshot(snapshot: &StateSnapshot, themes: &ThemeEngine) -> String {
        let screen = project(snapshot, themes, &KeyMap::default_keymap(), LinkStatus::Connected);
        render(Some(&screen), LinkStatus::Connected)
    }

    fn themes() -> ThemeEngine {
        ThemeEngine::new(ThemeConfig::default(), None)
    }

    #[test]
    fn splash_before_first_snapshot() {
        let text = render(None, LinkStatus::Connecting);
        assert!(text.contains(TITLE));
        assert!(text.contains("Connecting"));

        let text = render(None, LinkStatus::Disconnected { failures: 3 });
        assert!(text.contains("Backend unreachable"));
    }

    #[test]
    fn fresh_session_layout() {
        let text = render_snapshot(&fixtures::snapshot(), &themes());
        assert!(text.contains(TITLE));
        assert!(!text.contains("disconnected"));
        assert!(text.contains("60:00 · 0%"));
        assert!(text.contains("Paused"));
        assert!(text.contains("[Space] Play/Pause  [r] Reset"));
        assert!(text.contains(" Tasks "));
        assert!(text.contains("▸ [ ] 1. (empty)"));
        assert!(text.contains("[ ] 4. (empty)"));
        assert!(text.contains(DEFAULT_HINTS));
        assert!(text.contains("No completed sessions yet"));
        assert!(!text.contains("[←/h]"));
        assert!(!text.contains("Session 0 of"));
        assert!(!text.contains("Time:"));
    }

    #[test]
    fn disconnected_flag_in_title() {
        let screen = project(
            &fixtures::snapshot(),
            &themes(),
            &KeyMap::default_keymap(),
            LinkStatus::Disconnected { failures: 3 },
        );
        let text = render(Some(&screen), LinkStatus::Disconnected { failures: 3 });
        assert!(text.contains("disconnected"));
        assert!(text.contains(" Tasks "));
    }

    #[test]
    fn todos_and_editing_cursor() {
        let mut w = wire();
        w.todos[0].text = "write intro".into();
        w.todos[0].completed = true;
        w.todos[1].text = "draf".into();
        w.input_mode = "editing:1".into();
        w.editing_index = Some(1);
        w.selected_todo = 1;
        let text = render_snapshot(&snapshot_from(w), &themes());
        assert!(text.contains("  [x] 1. write intro"));
        assert!(text.contains("▸ [ ] 2. draf▎"));
    }

    #[test]
    fn status_message_replaces_hints() {
        let mut w = wire();
        w.status_message = Some("Copied to clipboard!".into());
        let text = render_snapshot(&snapshot_from(w), &themes());
        assert!(text.contains("Copied to clipboard!"));
        assert!(!text.contains(DEFAULT_HINTS));
    }

    #[test]
    fn history_note_is_drawn() {
        let mut w = wire();
        w.completed_notes = vec![note(1, &["alpha"]), note(2, &["beta", "gamma"])];
        w.history_total = 2;
        w.history_index = Some(1);
        let text = render_snapshot(&snapshot_from(w), &themes());
        assert!(text.contains("[←/h] Session 2 of 2 [→/l]"));
        assert!(text.contains("[x] beta"));
        assert!(text.contains("[x] gamma"));
        assert!(!text.contains("alpha"));
        assert!(text.contains("Time: 20:00  [y] Copy  [D] Clear"));
    }

    #[test]
    fn completed_history_todos_are_struck_through() {
        let mut w = wire();
        let mut last = note(1, &["shipped", "pending"]);
        last.todos[1].completed = false;
        w.completed_notes = vec![last];
        w.history_total = 1;
        w.history_index = Some(0);
        let snapshot = snapshot_from(w);
        let screen = project(
            &snapshot,
            &themes(),
            &KeyMap::default_keymap(),
            LinkStatus::Connected,
        );

        let mut terminal = Terminal::new(TestBackend::new(70, 30)).unwrap();
        let palette = PRESETS[0].palette;
        terminal
            .draw(|frame| draw(frame, Some(&screen), LinkStatus::Connected, &palette))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let text = buffer_to_string(buffer);

        let modifier_of = |word: &str| {
            let (y, line) = text
                .lines()
                .enumerate()
                .find(|(_, line)| line.contains(word))
                .unwrap();
            let x = line[..line.find(word).unwrap()].chars().count();
            buffer[(x as u16, y as u16)].modifier
        };
        assert!(text.contains("[x] shipped"));
        assert!(text.contains("[ ] pending"));
        assert!(modifier_of("shipped").contains(Modifier::CROSSED_OUT));
        assert!(!modifier_of("pending").contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn help_modal_fits_very_wide_terminal() {
        let mut w = wire();
        w.input_mode = "modal".into();
        w.modal = Some("help".into());
        let screen = project(
            &snapshot_from(w),
            &themes(),
            &KeyMap::default_keymap(),
            LinkStatus::Connected,
        );
        let mut terminal = Terminal::new(TestBackend::new(1100, 30)).unwrap();
        let palette = PRESETS[0].palette;
        terminal
            .draw(|frame| draw(frame, Some(&screen), LinkStatus::Connected, &palette))
            .unwrap();
        let text = buffer_to_string(terminal.backend().buffer());
        assert!(text.contains(" Shortcuts "));
        assert!(text.contains("[Esc] Close"));
    }

    #[test]
    fn hidden_history_draws_no_panel() {
        let mut w = wire();
        w.show_history = false;
        let text = render_snapshot(&snapshot_from(w), &themes());
        assert!(!text.contains(" History "));
        assert!(!text.contains("No completed sessions yet"));
    }

    #[test]
    fn confirm_modal_overlays_screen() {
        let mut w = wire();
        w.input_mode = "modal".into();
        w.modal = Some("clear_notes".into());
        let text = render_snapshot(&snapshot_from(w), &themes());
        assert!(text.contains(" Clear History "));
        assert!(text.contains("Clear all completed sessions?"));
        assert!(text.contains("[y] Yes  [n] No"));
    }

    #[test]
    fn help_modal_lists_shortcuts() {
        let mut w = wire();
        w.input_mode = "modal".into();
        w.modal = Some("help".into());
        let text = render_snapshot(&snapshot_from(w), &themes());
        assert!(text.contains(" Shortcuts "));
        assert!(text.contains("Play/Pause timer"));
        assert!(text.contains("[Esc] Close"));
    }

    #[test]
    fn theme_picker_marks_active_and_highlight() {
        let mut engine = themes();
        engine.open();
        engine.move_highlight(true);
        let text = render_snapshot(&fixtures::snapshot(), &engine);
        assert!(text.contains(" Themes "));
        assert!(text.contains("▸ Catppuccin"));
        assert!(text.contains("  Ember"));
        assert!(text.contains("✓"));
        assert!(text.contains("[Enter] Apply"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();
        let palette = PRESETS[1].palette;
        let mut engine = themes();
        engine.open();
        let mut w = wire();
        w.input_mode = "modal".into();
        w.modal = Some("help".into());
        let screen = project(
            &snapshot_from(w),
            &engine,
            &KeyMap::default_keymap(),
            LinkStatus::Connected,
        );
        terminal
            .draw(|frame| draw(frame, Some(&screen), LinkStatus::Connected, &palette))
            .unwrap();
    }
}
