/// Configuration consumed by [`crate::parser::DefinitionParser`].
///
/// Mirrors what the surrounding documentation tool exposes: two allowlists of
/// identifiers that should be treated as attributes, and a switch for the
/// lossy fallback expression scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Identifiers treated as attributes without an argument list.
    pub id_attributes: Vec<String>,
    /// Identifiers treated as attributes with a balanced parenthesized argument.
    pub paren_attributes: Vec<String>,
    /// Whether a failed strict expression parse may fall back to a
    /// balanced-bracket scan (emitting a warning) instead of failing.
    pub allow_fallback_expression_parsing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            id_attributes: vec![],
            paren_attributes: vec![],
            allow_fallback_expression_parsing: true,
        }
    }
}
