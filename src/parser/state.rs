use std::ops::Range;

use regex::Regex;

use super::DefinitionError;

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Cursor over a single definition line.
///
/// Any caller may save `pos()`, attempt a production, and restore the saved
/// position on failure; rewinding is just an index assignment. The `errors`
/// list is the append-only side channel for diagnostics that only become
/// relevant if the parse fails later (e.g. a greedy template-argument attempt
/// that was rolled back).
#[derive(Debug, Clone)]
pub struct ParseState<'a> {
    definition: &'a str,
    pos: usize,
    last_match: Option<Range<usize>>,
    pub errors: Vec<DefinitionError>,
}

impl<'a> ParseState<'a> {
    pub fn new(definition: &'a str) -> Self {
        Self {
            definition: definition.trim(),
            pos: 0,
            last_match: None,
            errors: vec![],
        }
    }

    /// The full (trimmed) input.
    pub fn definition(&self) -> &'a str {
        self.definition
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.definition.len()
    }

    pub fn current_char(&self) -> Option<char> {
        self.definition[self.pos..].chars().next()
    }

    /// The remaining input from the cursor on.
    pub fn rest(&self) -> &'a str {
        &self.definition[self.pos..]
    }

    pub fn skip_ws(&mut self) {
        while let Some(c) = self.current_char() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Skip `s` exactly if it is next; advances only on a match.
    pub fn skip_string(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    pub fn skip_string_and_ws(&mut self, s: &str) -> bool {
        if self.skip_string(s) {
            self.skip_ws();
            true
        } else {
            false
        }
    }

    /// Skip `word` only if it sits on word boundaries, i.e. it is not a
    /// prefix or suffix of a longer identifier.
    pub fn skip_word(&mut self, word: &str) -> bool {
        let Some(first) = word.chars().next() else {
            return false;
        };
        let last = word.chars().next_back().unwrap_or(first);
        if !self.rest().starts_with(word) {
            return false;
        }
        if let Some(prev) = self.definition[..self.pos].chars().next_back() {
            if is_word_char(prev) && is_word_char(first) {
                return false;
            }
        }
        if let Some(next) = self.definition[self.pos + word.len()..].chars().next() {
            if is_word_char(last) && is_word_char(next) {
                return false;
            }
        }
        self.pos += word.len();
        true
    }

    pub fn skip_word_and_ws(&mut self, word: &str) -> bool {
        if self.skip_word(word) {
            self.skip_ws();
            true
        } else {
            false
        }
    }

    /// Peek whether `word` is next without consuming it.
    pub fn peek_word(&mut self, word: &str) -> bool {
        let pos = self.pos;
        let res = self.skip_word(word);
        self.pos = pos;
        res
    }

    /// Match an anchored recognizer at the cursor; records the match and
    /// advances past it on success.
    pub fn match_re(&mut self, re: &Regex) -> bool {
        match re.find(self.rest()) {
            Some(m) => {
                debug_assert_eq!(m.start(), 0, "token recognizers must be anchored");
                self.last_match = Some(self.pos..self.pos + m.end());
                self.pos += m.end();
                true
            }
            None => false,
        }
    }

    /// The text of the most recent successful [`Self::match_re`].
    pub fn matched_text(&self) -> &'a str {
        match &self.last_match {
            Some(range) => &self.definition[range.clone()],
            None => "",
        }
    }

    pub fn add_error(&mut self, error: DefinitionError) {
        self.errors.push(error);
    }
}
