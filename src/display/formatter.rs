//! Markdown terminal formatting using termimad

use termimad::crossterm::style::{Attribute, Color};
use termimad::{gray, MadSkin};

use crate::display::terminal::ColorMode;

/// Print an offer summary, styled when the terminal supports it
pub fn print_markdown(markdown: &str) {
    match ColorMode::detect() {
        ColorMode::Styled => offer_skin().print_text(markdown),
        ColorMode::Plain => println!("{}", markdown),
    }
}

/// Skin for offer summaries: headers in cyan, tables readable on dark backgrounds
fn offer_skin() -> MadSkin {
    let mut skin = MadSkin::default();

    skin.headers[0].set_fg(Color::Cyan);
    skin.headers[0].add_attr(Attribute::Bold);
    skin.headers[1].set_fg(Color::Blue);
    skin.headers[1].add_attr(Attribute::Bold);

    skin.table.set_fg(Color::White);

    skin.inline_code.set_fg(Color::Yellow);
    skin.inline_code.set_bg(gray(3));
    skin.bold.set_fg(Color::Green);

    skin
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_print_markdown_plain_fallback() {
        std::env::set_var("NO_COLOR", "1");
        print_markdown("# Offer\n\n| a | b |\n|---|---|\n| 1 | 2 |");
        std::env::remove_var("NO_COLOR");
    }

    #[test]
    fn test_offer_skin_renders_table() {
        let skin = offer_skin();
        let rendered = skin
            .term_text("| Interval | MW |\n|---|---|\n| 202407020000 | 125.00 |")
            .to_string();
        assert!(rendered.contains("202407020000"));
    }
}
