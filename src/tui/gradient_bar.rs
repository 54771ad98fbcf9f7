use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::Widget;

use super::theme::Palette;

/// One-row progress bar filled with the palette gradient, label centred on top.
pub struct GradientBar<'a> {
    pub ratio: f64,
    pub label: &'a str,
    pub palette: &'a Palette,
}

impl Widget for GradientBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                buf[(x, y)].set_symbol(" ").set_bg(self.palette.bar_bg);
            }
        }

        let position = |x: u16| -> f64 {
            if area.width <= 1 {
                0.0
            } else {
                f64::from(x) / f64::from(area.width - 1)
            }
        };

        let filled = (self.ratio.clamp(0.0, 1.0) * f64::from(area.width)).round() as u16;
        let y = area.top();

        for x in 0..filled {
            buf[(area.left() + x, y)]
                .set_symbol(symbols::block::FULL)
                .set_fg(self.palette.gradient(position(x)));
        }

        let label_width = self.label.chars().count() as u16;
        let label_start = area.width.saturating_sub(label_width) / 2;
        buf.set_span(area.left() + label_start, y, &Span::raw(self.label), area.width);

        // Dark text over the fill, light text over the empty track.
        for i in 0..label_width {
            let offset = label_start + i;
            if offset >= area.width {
                break;
            }
            let cell = &mut buf[(area.left() + offset, y)];
            if offset < filled {
                cell.set_fg(self.palette.label_text)
                    .set_bg(self.palette.gradient(position(offset)));
            } else {
                cell.set_fg(self.palette.normal).set_bg(self.palette.bar_bg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::*;
    use crate::tui::theme::PRESETS;

    fn render(ratio: f64, label: &str, width: u16) -> Buffer {
        let area = Rect::new(0, 0, width, 1);
        let mut buf = Buffer::empty(area);
        let palette = PRESETS[0].palette;
        GradientBar {
            ratio,
            label,
            palette: &palette,
        }
        .render(area, &mut buf);
        buf
    }

    fn row(buf: &Buffer) -> String {
        (0..buf.area.width).map(|x| buf[(x, 0)].symbol().to_string()).collect()
    }

    #[test]
    fn empty_bar_shows_centred_label_on_track() {
        let buf = render(0.0, "60:00 · 0%", 20);
        assert_eq!(row(&buf), "     60:00 · 0%     ");
        let palette = PRESETS[0].palette;
        assert_eq!(buf[(0, 0)].bg, palette.bar_bg);
        assert_eq!(buf[(5, 0)].fg, palette.normal);
    }

    #[test]
    fn full_bar_uses_gradient_and_dark_label() {
        let buf = render(1.0, "0:00", 10);
        let palette = PRESETS[0].palette;
        assert_eq!(buf[(0, 0)].symbol(), symbols::block::FULL);
        assert_eq!(buf[(0, 0)].fg, palette.gradient_start);
        assert_eq!(buf[(9, 0)].fg, palette.gradient_end);
        assert_eq!(buf[(3, 0)].symbol(), "0");
        assert_eq!(buf[(3, 0)].fg, palette.label_text);
    }

    #[test]
    fn half_bar_fills_left_half() {
        let buf = render(0.5, "", 10);
        assert_eq!(buf[(4, 0)].symbol(), symbols::block::FULL);
        assert_eq!(buf[(5, 0)].symbol(), " ");
        assert_ne!(buf[(4, 0)].fg, Color::Reset);
    }

    #[test]
    fn zero_width_is_a_no_op() {
        let buf = render(0.7, "label", 0);
        assert_eq!(buf.area.width, 0);
    }
}
