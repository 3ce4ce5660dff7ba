use ratatui::style::Color;

use crate::model::UiConfig;

use super::app::MessageKind;

/// Colors handed to the render step. Built once from config, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub selection_bg: Color,
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x16, 0x1B, 0x22),
            text: Color::Rgb(0xC9, 0xD1, 0xD9),
            text_bright: Color::Rgb(0xF0, 0xF6, 0xFC),
            highlight: Color::Rgb(0x58, 0xC4, 0xDC),
            dim: Color::Rgb(0x6E, 0x76, 0x81),
            red: Color::Rgb(0xF8, 0x51, 0x49),
            yellow: Color::Rgb(0xE3, 0xB3, 0x41),
            green: Color::Rgb(0x56, 0xD3, 0x64),
            selection_bg: Color::Rgb(0x26, 0x3B, 0x50),
            border: Color::Rgb(0x30, 0x36, 0x3D),
        }
    }
}

impl Theme {
    /// Default theme with `[ui.colors]` overrides applied. Unknown slot
    /// names and values that are not `#RRGGBB` are skipped.
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();
        for (slot, value) in &ui.colors {
            match (theme.slot_mut(slot), parse_hex_color(value)) {
                (Some(target), Some(color)) => *target = color,
                _ => log::debug!("ignoring color override {} = {:?}", slot, value),
            }
        }
        theme
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Color> {
        let slot = match name {
            "background" => &mut self.background,
            "text" => &mut self.text,
            "text_bright" => &mut self.text_bright,
            "highlight" => &mut self.highlight,
            "dim" => &mut self.dim,
            "red" => &mut self.red,
            "yellow" => &mut self.yellow,
            "green" => &mut self.green,
            "selection_bg" => &mut self.selection_bg,
            "border" => &mut self.border,
            _ => return None,
        };
        Some(slot)
    }

    /// Header color for column `index` of `count`: the last column reads as
    /// finished, the ones in between as in progress.
    pub fn column_color(&self, index: usize, count: usize) -> Color {
        if count > 1 && index + 1 == count {
            self.green
        } else if index > 0 {
            self.highlight
        } else {
            self.text_bright
        }
    }

    pub fn message_color(&self, kind: MessageKind) -> Color {
        match kind {
            MessageKind::Info => self.green,
            MessageKind::Warning => self.yellow,
            MessageKind::Error => self.red,
        }
    }
}

/// `#RRGGBB` → `Color::Rgb`
fn parse_hex_color(value: &str) -> Option<Color> {
    let digits = value.strip_prefix('#')?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let rgb = u32::from_str_radix(digits, 16).ok()?;
    Some(Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#F85149"), Some(Color::Rgb(0xF8, 0x51, 0x49)));
        assert_eq!(parse_hex_color("#00ff7f"), Some(Color::Rgb(0x00, 0xFF, 0x7F)));
        assert_eq!(parse_hex_color("F85149"), None);
        assert_eq!(parse_hex_color("#F851"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
        assert_eq!(parse_hex_color("#+12345"), None);
        assert_eq!(parse_hex_color("#é1234"), None);
    }

    #[test]
    fn test_from_config_overrides() {
        let mut ui = UiConfig::default();
        ui.colors.insert("background".into(), "#000000".into());
        ui.colors.insert("border".into(), "#112233".into());
        ui.colors.insert("sparkle".into(), "#445566".into());
        ui.colors.insert("text".into(), "purple".into());

        let theme = Theme::from_config(&ui);
        assert_eq!(theme.background, Color::Rgb(0, 0, 0));
        assert_eq!(theme.border, Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.text, Theme::default().text);
    }

    #[test]
    fn test_column_color() {
        let theme = Theme::default();
        assert_eq!(theme.column_color(0, 3), theme.text_bright);
        assert_eq!(theme.column_color(1, 3), theme.highlight);
        assert_eq!(theme.column_color(2, 3), theme.green);
        assert_eq!(theme.column_color(0, 1), theme.text_bright);
    }

    #[test]
    fn test_message_color() {
        let theme = Theme::default();
        assert_eq!(theme.message_color(MessageKind::Error), theme.red);
        assert_eq!(theme.message_color(MessageKind::Warning), theme.yellow);
    }
}
