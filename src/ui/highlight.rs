use std::path::Path;

use ratatui::{
    style::Style,
    text::{Line, Span},
};
use syntect::{
    easy::HighlightLines,
    highlighting::{Theme, ThemeSet},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

use super::theme::to_color;

const THEME_NAME: &str = "base16-ocean.dark";

pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new() -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme: themes.remove(THEME_NAME).unwrap_or_default(),
        }
    }

    /// Highlights the first `limit` lines of `text`, picking the grammar from
    /// the file extension. Lines that fail to highlight are kept unstyled.
    pub fn highlight(&self, path: &Path, text: &str, limit: usize) -> Vec<Line<'static>> {
        let syntax = self.syntax_for(path);
        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        LinesWithEndings::from(text)
            .take(limit)
            .map(|line| match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => Line::from(
                    ranges
                        .into_iter()
                        .map(|(style, piece)| {
                            Span::styled(
                                trim_newline(piece).to_string(),
                                Style::default().fg(to_color(style.foreground)),
                            )
                        })
                        .collect::<Vec<_>>(),
                ),
                Err(_) => Line::from(trim_newline(line).to_string()),
            })
            .collect()
    }

    fn syntax_for(&self, path: &Path) -> &SyntaxReference {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        let extension = match extension {
            "mjs" | "cjs" | "jsx" | "ts" | "tsx" | "mts" | "cts" => "js",
            other => other,
        };
        self.syntax_set
            .find_syntax_by_extension(extension)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn trim_newline(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}
