//! Modal UI state: the extended-command prompt and the message log.

/// Commands the prompt understands, in autocomplete order.
pub const COMMANDS: [&str; 7] = [
    "descend", "explore", "help", "pickup", "rest", "search", "wait",
];

/// The extended-command prompt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandPrompt {
    open: bool,
    text: String,
}

impl CommandPrompt {
    /// Open with an empty buffer.
    pub fn open(&mut self) {
        self.open = true;
        self.text.clear();
    }

    /// Close, returning the typed text.
    pub fn close(&mut self) -> String {
        self.open = false;
        std::mem::take(&mut self.text)
    }

    #[allow(missing_docs)]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Current buffer.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Append typed text. Ignored while closed.
    pub fn input(&mut self, s: &str) {
        if self.open {
            self.text.push_str(s);
        }
    }

    /// Delete the last character.
    pub fn backspace(&mut self) {
        if self.open {
            self.text.pop();
        }
    }

    /// Complete the buffer to the longest prefix shared by every command
    /// it is a prefix of.
    pub fn autocomplete(&mut self) {
        if !self.open {
            return;
        }
        let typed = self.text.trim().to_ascii_lowercase();
        let mut matches = COMMANDS.iter().filter(|c| c.starts_with(typed.as_str()));
        let Some(first) = matches.next() else {
            return;
        };
        let mut common: &str = first;
        for m in matches {
            let n = common
                .bytes()
                .zip(m.bytes())
                .take_while(|(a, b)| a == b)
                .count();
            common = &common[..n];
        }
        if common.len() >= typed.len() {
            self.text = common.to_string();
        }
    }
}

/// Scrollback of game messages with an optional search filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageLog {
    lines: Vec<String>,
    open: bool,
    search_mode: bool,
    search: String,
}

impl MessageLog {
    /// Append a message.
    pub fn push(&mut self, msg: impl Into<String>) {
        self.lines.push(msg.into());
    }

    /// Every message, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// Drop all messages.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Open the history view.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the history view, leaving search mode.
    pub fn close(&mut self) {
        self.open = false;
        self.search_mode = false;
    }

    #[allow(missing_docs)]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[allow(missing_docs)]
    pub fn is_search_mode(&self) -> bool {
        self.search_mode
    }

    /// Current search filter.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Flip search mode. Ignored while closed.
    pub fn toggle_search_mode(&mut self) {
        if self.open {
            self.search_mode = !self.search_mode;
        }
    }

    /// Append to the search filter. Only accepted in search mode.
    pub fn search_input(&mut self, s: &str) {
        if self.open && self.search_mode {
            self.search.push_str(s);
        }
    }

    /// Delete the last search character.
    pub fn search_backspace(&mut self) {
        if self.open && self.search_mode {
            self.search.pop();
        }
    }

    /// Empty the search filter.
    pub fn clear_search(&mut self) {
        if self.open {
            self.search.clear();
        }
    }

    /// Messages matching the filter (case-insensitive substring).
    pub fn filtered(&self) -> impl Iterator<Item = &str> + '_ {
        let needle = self.search.to_lowercase();
        self.lines
            .iter()
            .map(String::as_str)
            .filter(move |l| needle.is_empty() || l.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_edits_only_while_open() {
        let mut p = CommandPrompt::default();
        p.input("x");
        assert_eq!(p.text(), "");
        p.open();
        p.input("wai");
        p.input("tt");
        p.backspace();
        assert_eq!(p.close(), "wait");
        assert!(!p.is_open());
    }

    #[test]
    fn autocomplete_extends_to_common_prefix() {
        let mut p = CommandPrompt::default();
        p.open();
        p.input("s");
        p.autocomplete();
        assert_eq!(p.text(), "search");

        p.open();
        p.input("re");
        p.autocomplete();
        assert_eq!(p.text(), "rest");

        p.open();
        p.input("zz");
        p.autocomplete();
        assert_eq!(p.text(), "zz");

        p.open();
        p.autocomplete();
        assert_eq!(p.text(), "");
    }

    #[test]
    fn log_search_filters() {
        let mut log = MessageLog::default();
        log.push("You hit the rat.");
        log.push("The bat bites you.");
        log.open();
        log.search_input("ignored");
        assert_eq!(log.search(), "");
        log.toggle_search_mode();
        log.search_input("RAT");
        assert_eq!(log.filtered().collect::<Vec<_>>(), ["You hit the rat."]);
        log.search_backspace();
        assert_eq!(log.search(), "RA");
        log.clear_search();
        assert_eq!(log.filtered().count(), 2);
        log.close();
        assert!(!log.is_search_mode());
    }
}
