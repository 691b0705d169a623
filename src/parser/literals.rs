use super::ast::{CharLiteral, Expression, Identifier};
use super::tokens::{
    BINARY_LITERAL_RE, CHAR_LITERAL_RE, FLOAT_LITERAL_RE, FLOAT_LITERAL_SUFFIX_RE,
    HEX_LITERAL_RE, INTEGERS_LITERAL_SUFFIX_RE, INTEGER_LITERAL_RE, OCTAL_LITERAL_RE,
    UDL_IDENTIFIER_RE,
};
use super::{DefinitionParser, Result};

/// Decode one C++ character-literal body (a single character or a single
/// escape sequence, as guaranteed by the recognizer).
fn decode_char(data: &str) -> Option<char> {
    let mut chars = data.chars();
    let first = chars.next()?;
    if first != '\\' {
        return Some(first);
    }
    let escape = chars.next()?;
    match escape {
        '\'' => Some('\''),
        '"' => Some('"'),
        '?' => Some('?'),
        '\\' => Some('\\'),
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        'f' => Some('\x0C'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\x0B'),
        '0'..='7' => {
            let mut value = escape.to_digit(8)?;
            for c in chars {
                value = value * 8 + c.to_digit(8)?;
            }
            char::from_u32(value)
        }
        'x' | 'u' | 'U' => {
            let mut value = 0u32;
            for c in chars {
                value = value.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
            }
            char::from_u32(value)
        }
        _ => None,
    }
}

impl<'a> DefinitionParser<'a> {
    /// A string literal, returned with its surrounding quotes.
    pub(crate) fn parse_string_literal(&mut self) -> Result<Option<String>> {
        if self.current_char() != Some('"') {
            return Ok(None);
        }
        let start_pos = self.pos();
        self.set_pos(start_pos + 1);
        let mut escape = false;
        loop {
            let Some(c) = self.current_char() else {
                return self.fail("Unexpected end inside string.");
            };
            if c == '"' && !escape {
                self.set_pos(self.pos() + 1);
                break;
            }
            escape = c == '\\' && !escape;
            self.set_pos(self.pos() + c.len_utf8());
        }
        Ok(Some(
            self.state.definition()[start_pos..self.pos()].to_string(),
        ))
    }

    /// Wrap a literal followed directly by an identifier as a user-defined
    /// literal. Keywords are accepted as suffixes, as compilers do.
    fn wrap_udl(&mut self, literal: Expression) -> Expression {
        if !self.match_re(&UDL_IDENTIFIER_RE) {
            return literal;
        }
        Expression::UserDefinedLiteral {
            literal: Box::new(literal),
            suffix: Identifier(self.matched_text().to_string()),
        }
    }

    /// Try the literal alternatives in order: keyword literals, float,
    /// integer (binary, hex, decimal, octal), string, char.
    pub(crate) fn parse_literal(&mut self) -> Result<Option<Expression>> {
        self.skip_ws();
        if self.skip_word("nullptr") {
            return Ok(Some(Expression::PointerLiteral));
        }
        if self.skip_word("true") {
            return Ok(Some(Expression::BooleanLiteral(true)));
        }
        if self.skip_word("false") {
            return Ok(Some(Expression::BooleanLiteral(false)));
        }
        let pos = self.pos();
        if self.match_re(&FLOAT_LITERAL_RE) {
            let has_suffix = self.match_re(&FLOAT_LITERAL_SUFFIX_RE);
            let lit =
                Expression::NumberLiteral(self.state.definition()[pos..self.pos()].to_string());
            if has_suffix {
                return Ok(Some(lit));
            }
            return Ok(Some(self.wrap_udl(lit)));
        }
        for re in [
            &*BINARY_LITERAL_RE,
            &*HEX_LITERAL_RE,
            &*INTEGER_LITERAL_RE,
            &*OCTAL_LITERAL_RE,
        ] {
            if self.match_re(re) {
                let has_suffix = self.match_re(&INTEGERS_LITERAL_SUFFIX_RE);
                let lit = Expression::NumberLiteral(
                    self.state.definition()[pos..self.pos()].to_string(),
                );
                if has_suffix {
                    return Ok(Some(lit));
                }
                return Ok(Some(self.wrap_udl(lit)));
            }
        }
        if let Some(string) = self.parse_string_literal()? {
            return Ok(Some(self.wrap_udl(Expression::StringLiteral(string))));
        }
        if let Some(caps) = CHAR_LITERAL_RE.captures(self.state.rest()) {
            let prefix = caps.get(1).map(|m| m.as_str().to_string());
            let data = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
            let whole_len = caps.get(0).map_or(0, |m| m.end());
            self.set_pos(self.pos() + whole_len);
            let Some(value) = decode_char(&data) else {
                return self.fail("Can not handle character literal.");
            };
            let lit = Expression::CharLiteral(CharLiteral {
                prefix,
                data,
                value,
            });
            return Ok(Some(self.wrap_udl(lit)));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;

    use super::super::DefinitionParser;
    use super::*;

    fn literal(input: &str) -> Option<Expression> {
        let config = Config::default();
        let result = DefinitionParser::new(input, &config).parse_literal();
        result.unwrap()
    }

    #[test]
    fn test_keyword_literals() {
        assert_eq!(literal("nullptr"), Some(Expression::PointerLiteral));
        assert_eq!(literal("true"), Some(Expression::BooleanLiteral(true)));
        assert_eq!(literal("falsehood"), None);
    }

    #[test]
    fn test_number_literals() {
        assert_eq!(
            literal("0b1010'1010"),
            Some(Expression::NumberLiteral("0b1010'1010".into()))
        );
        assert_eq!(literal("0xFFul"), Some(Expression::NumberLiteral("0xFFul".into())));
        assert_eq!(literal("1.5e3"), Some(Expression::NumberLiteral("1.5e3".into())));
        assert_eq!(literal("1.5f"), Some(Expression::NumberLiteral("1.5f".into())));
        assert_eq!(literal("0"), Some(Expression::NumberLiteral("0".into())));
    }

    #[test]
    fn test_user_defined_literals() {
        let lit = literal("1.5_km").unwrap();
        assert_eq!(
            lit,
            Expression::UserDefinedLiteral {
                literal: Box::new(Expression::NumberLiteral("1.5".into())),
                suffix: Identifier("_km".into()),
            }
        );
        assert_eq!(lit.to_string(), "1.5_km");
        // a recognized language suffix is not a UDL
        assert_eq!(literal("10u"), Some(Expression::NumberLiteral("10u".into())));
    }

    #[test]
    fn test_string_literal_keeps_quotes() {
        let lit = literal("\"a \\\"b\\\" c\"").unwrap();
        assert_eq!(lit, Expression::StringLiteral("\"a \\\"b\\\" c\"".into()));
    }

    #[test]
    fn test_char_literals() {
        let Some(Expression::CharLiteral(lit)) = literal("u8'\\n'") else {
            panic!("expected char literal");
        };
        assert_eq!(lit.prefix.as_deref(), Some("u8"));
        assert_eq!(lit.value, '\n');
        assert_eq!(lit.to_string(), "u8'\\n'");

        // multi-character literals are not char literals at all
        assert_eq!(literal("'ab'"), None);
    }

    #[test]
    fn test_char_escapes_decode() {
        assert_eq!(decode_char("a"), Some('a'));
        assert_eq!(decode_char("\\x41"), Some('A'));
        assert_eq!(decode_char("\\101"), Some('A'));
        assert_eq!(decode_char("\\u00e9"), Some('é'));
        // lone surrogates are not decodable
        assert_eq!(decode_char("\\ud800"), None);
    }

    #[test]
    fn test_undecodable_char_literal_fails() {
        let config = Config::default();
        let mut p = DefinitionParser::new("'\\ud800'", &config);
        assert!(p.parse_literal().is_err());
    }
}
