//! Recursive-descent parser for C++ declarations, names, types and
//! expressions as they appear in documentation directives.
//!
//! The parser works directly on a character buffer with unbounded rewind:
//! speculative parsing is the primary control-flow device. Every alternative
//! site saves the cursor, tries a production and restores the cursor on
//! failure; when all alternatives fail, the site raises a single
//! [`DefinitionError`] naming each alternative that was tried.

use std::error::Error;
use std::fmt::{self, Display};

use crate::config::Config;

pub mod ast;

mod attributes;
mod declaration;
mod expression;
mod literals;
mod name;
mod state;
mod template;
mod tokens;
mod types;

pub use self::declaration::{ExprOrType, XrefObject};
pub use self::state::ParseState;

pub type Result<T> = std::result::Result<T, DefinitionError>;

/// A parse failure, possibly composed of the failures of several attempted
/// alternatives. Leaves carry a rendered message including the error
/// position; inner nodes carry a header and labeled children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionError {
    pub header: String,
    pub children: Vec<(String, DefinitionError)>,
}

impl DefinitionError {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            children: vec![],
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        if !self.header.is_empty() {
            for line in self.header.lines() {
                writeln!(f, "{pad}{line}")?;
            }
        }
        if let [(_label, child)] = self.children.as_slice() {
            // A single alternative reads better unlabeled.
            return child.fmt_indented(f, indent);
        }
        for (label, child) in &self.children {
            if label.is_empty() {
                child.fmt_indented(f, indent)?;
            } else {
                writeln!(f, "{pad}{label}:")?;
                child.fmt_indented(f, indent + 1)?;
            }
        }
        Ok(())
    }
}

impl Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl Error for DefinitionError {}

/// Modes threaded through the declarator layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParamMode {
    Type,
    Function,
    OperatorCast,
    New,
}

/// How much of a declarator-id is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NamedMode {
    No,
    /// A name may be present, e.g. function parameters of function objects.
    Maybe,
    /// A single unqualified identifier, e.g. a named function parameter.
    Single,
    Yes,
}

/// The kind of entity the surrounding declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outer {
    Type,
    Member,
    Function,
    TemplateParam,
    /// The return type of a conversion operator; it must not take the
    /// parameter list that follows it.
    OperatorCast,
}

/// Parser for one definition line.
pub struct DefinitionParser<'a> {
    pub(crate) state: ParseState<'a>,
    pub(crate) config: &'a Config,
    warning_sink: Box<dyn FnMut(&str) + 'a>,
}

impl<'a> DefinitionParser<'a> {
    pub fn new(definition: &'a str, config: &'a Config) -> Self {
        Self {
            state: ParseState::new(definition),
            config,
            warning_sink: Box::new(|msg| log::warn!("{msg}")),
        }
    }

    /// Replace the default `log`-based warning sink.
    pub fn with_warning_sink(mut self, sink: impl FnMut(&str) + 'a) -> Self {
        self.warning_sink = Box::new(sink);
        self
    }

    // Cursor primitives, delegated to the rewind substrate.

    pub(crate) fn pos(&self) -> usize {
        self.state.pos()
    }

    pub(crate) fn set_pos(&mut self, pos: usize) {
        self.state.set_pos(pos);
    }

    pub(crate) fn eof(&self) -> bool {
        self.state.eof()
    }

    pub(crate) fn current_char(&self) -> Option<char> {
        self.state.current_char()
    }

    pub(crate) fn skip_ws(&mut self) {
        self.state.skip_ws();
    }

    pub(crate) fn skip_string(&mut self, s: &str) -> bool {
        self.state.skip_string(s)
    }

    pub(crate) fn skip_string_and_ws(&mut self, s: &str) -> bool {
        self.state.skip_string_and_ws(s)
    }

    pub(crate) fn skip_word(&mut self, word: &str) -> bool {
        self.state.skip_word(word)
    }

    pub(crate) fn skip_word_and_ws(&mut self, word: &str) -> bool {
        self.state.skip_word_and_ws(word)
    }

    pub(crate) fn match_re(&mut self, re: &regex::Regex) -> bool {
        self.state.match_re(re)
    }

    pub(crate) fn matched_text(&self) -> &'a str {
        self.state.matched_text()
    }

    /// Route a warning to the configured sink. Warnings are never fatal.
    pub(crate) fn warn(&mut self, msg: &str) {
        (self.warning_sink)(msg);
    }

    /// Raise a parse error at the current position. The error is always
    /// recoverable: the caller decides whether to rewind or propagate. Any
    /// pending side-channel errors are attached as additional branches.
    pub(crate) fn fail<T>(&mut self, msg: &str) -> Result<T> {
        let mut indicator = String::with_capacity(self.pos() + 1);
        for _ in 0..self.pos() {
            indicator.push('-');
        }
        indicator.push('^');
        let main = DefinitionError::new(format!(
            "Invalid C++ declaration: {} [error at {}]\n  {}\n  {}",
            msg,
            self.pos(),
            self.state.definition(),
            indicator
        ));
        if self.state.errors.is_empty() {
            return Err(main);
        }
        let mut errors = vec![("Main error".to_string(), main)];
        for err in self.state.errors.drain(..) {
            errors.push(("Potential other error".to_string(), err));
        }
        Err(Self::make_multi_error(errors, ""))
    }

    /// Combine the failures of several attempted alternatives into one
    /// error. This is the sole diagnostics mechanism: whenever alternatives
    /// exist, each is recorded with a short label naming it.
    pub(crate) fn make_multi_error(
        errors: Vec<(String, DefinitionError)>,
        header: &str,
    ) -> DefinitionError {
        let mut errors = errors;
        if errors.len() == 1 && header.is_empty() {
            if let Some((_label, error)) = errors.pop() {
                return error;
            }
        }
        DefinitionError {
            header: header.to_string(),
            children: errors,
        }
    }

    /// Require that the whole input has been consumed, optionally tolerating
    /// one trailing `;`.
    pub fn assert_end(&mut self, allow_semicolon: bool) -> Result<()> {
        self.skip_ws();
        if allow_semicolon && !self.eof() && self.state.rest() == ";" {
            self.set_pos(self.pos() + 1);
            self.skip_ws();
        }
        if !self.eof() {
            return self.fail("Expected end of definition.");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser<'a>(input: &'a str, config: &'a Config) -> DefinitionParser<'a> {
        DefinitionParser::new(input, config)
    }

    #[test]
    fn test_fail_renders_position() {
        let config = Config::default();
        let mut p = parser("int x", &config);
        p.skip_word_and_ws("int");
        let err = p.fail::<()>("boom").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("boom [error at 4]"), "{text}");
        assert!(text.contains("int x"), "{text}");
        assert!(text.contains("----^"), "{text}");
    }

    #[test]
    fn test_fail_drains_side_errors() {
        let config = Config::default();
        let mut p = parser("x", &config);
        p.state.add_error(DefinitionError::new("greedy attempt failed"));
        let err = p.fail::<()>("boom").unwrap_err();
        assert_eq!(err.children.len(), 2);
        assert_eq!(err.children[0].0, "Main error");
        assert_eq!(err.children[1].0, "Potential other error");
        assert!(p.state.errors.is_empty());
    }

    #[test]
    fn test_multi_error_single_flattens() {
        let leaf = DefinitionError::new("inner");
        let combined =
            DefinitionParser::make_multi_error(vec![("If type".into(), leaf.clone())], "");
        assert_eq!(combined, leaf);
    }

    #[test]
    fn test_multi_error_display_labels_alternatives() {
        let e = DefinitionParser::make_multi_error(
            vec![
                ("If type".into(), DefinitionError::new("no type here")),
                ("If expression".into(), DefinitionError::new("no expr here")),
            ],
            "Error in template argument list.",
        );
        let text = e.to_string();
        assert!(text.contains("Error in template argument list."));
        assert!(text.contains("If type:"));
        assert!(text.contains("  no type here"));
        assert!(text.contains("If expression:"));
    }

    #[test]
    fn test_assert_end_tolerates_semicolon() {
        let config = Config::default();
        let mut p = parser("int;", &config);
        p.skip_word("int");
        assert!(p.assert_end(true).is_ok());

        let mut p = parser("int;", &config);
        p.skip_word("int");
        assert!(p.assert_end(false).is_err());
    }

    #[test]
    fn test_warning_sink_is_injectable() {
        use std::cell::RefCell;
        let config = Config::default();
        let warnings = RefCell::new(vec![]);
        {
            let mut p = parser("x", &config)
                .with_warning_sink(|msg| warnings.borrow_mut().push(msg.to_string()));
            p.warn("careful");
        }
        assert_eq!(*warnings.borrow(), vec!["careful".to_string()]);
    }
}
