use std::collections::VecDeque;

pub const DEFAULT_SCROLLBACK: usize = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Normal,
    Command,
    Success,
    Warn,
    Error,
}

impl LineStyle {
    pub fn marker(self) -> &'static str {
        match self {
            LineStyle::Success => "✓",
            LineStyle::Error => "✗",
            LineStyle::Warn => "!",
            LineStyle::Command => "$",
            LineStyle::Normal => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub style: LineStyle,
    pub text: String,
}

/// Styled scrollback shown in the terminal pane. Oldest lines go first once
/// `capacity` is reached.
#[derive(Debug, Clone)]
pub struct TerminalLog {
    lines: VecDeque<TerminalLine>,
    capacity: usize,
}

impl TerminalLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, style: LineStyle, text: impl Into<String>) {
        let text = text.into();
        for line in text.split('\n') {
            if self.lines.len() == self.capacity {
                self.lines.pop_front();
            }
            self.lines.push_back(TerminalLine {
                style,
                text: line.to_string(),
            });
        }
    }

    pub fn normal(&mut self, text: impl Into<String>) {
        self.push(LineStyle::Normal, text);
    }

    pub fn command(&mut self, text: impl Into<String>) {
        self.push(LineStyle::Command, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(LineStyle::Success, text);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.push(LineStyle::Warn, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(LineStyle::Error, text);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &TerminalLine> + ExactSizeIterator {
        self.lines.iter()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&TerminalLine> {
        self.lines.back()
    }
}

impl Default for TerminalLog {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLLBACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_drops_oldest_line_at_capacity() {
        let mut log = TerminalLog::new(2);

        log.normal("one");
        log.normal("two");
        log.error("three");

        let texts: Vec<&str> = log.lines().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);
        assert_eq!(log.last().unwrap().style, LineStyle::Error);
    }

    #[test]
    fn push_splits_multiline_text() {
        let mut log = TerminalLog::default();

        log.success("done\nnext");

        assert_eq!(log.len(), 2);
        assert!(log.lines().all(|line| line.style == LineStyle::Success));
    }

    #[test]
    fn clear_empties_log() {
        let mut log = TerminalLog::default();
        log.command("npm install");

        log.clear();

        assert!(log.is_empty());
    }

    #[test]
    fn markers_match_styles() {
        assert_eq!(LineStyle::Success.marker(), "✓");
        assert_eq!(LineStyle::Error.marker(), "✗");
        assert_eq!(LineStyle::Command.marker(), "$");
        assert_eq!(LineStyle::Normal.marker(), "");
    }
}
