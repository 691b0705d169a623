use super::ast::{Attribute, AttributeList};
use super::{DefinitionParser, Result};

impl<'a> DefinitionParser<'a> {
    /// Consume a balanced token sequence up to (excluding) a character from
    /// `end` at bracket depth 0.
    pub(crate) fn parse_balanced_token_seq(&mut self, end: &[char]) -> Result<String> {
        let start_pos = self.pos();
        let mut symbols: Vec<char> = vec![];
        while let Some(c) = self.current_char() {
            if symbols.is_empty() && end.contains(&c) {
                break;
            }
            match c {
                '(' => symbols.push(')'),
                '[' => symbols.push(']'),
                '{' => symbols.push('}'),
                ')' | ']' | '}' => {
                    if symbols.last() == Some(&c) {
                        symbols.pop();
                    } else {
                        return self.fail("Unbalanced token sequence in attribute.");
                    }
                }
                _ => {}
            }
            self.set_pos(self.pos() + c.len_utf8());
        }
        if self.eof() {
            return self.fail(&format!(
                "Could not find end of balanced token sequence starting at {start_pos}."
            ));
        }
        Ok(self.state.definition()[start_pos..self.pos()].to_string())
    }

    /// Try one attribute: `[[...]]`, `__attribute__((...))`, or one of the
    /// configured identifier/paren attributes.
    pub(crate) fn parse_attribute(&mut self) -> Result<Option<Attribute>> {
        self.skip_ws();

        let start_pos = self.pos();
        if self.skip_string_and_ws("[") {
            if !self.skip_string("[") {
                self.set_pos(start_pos);
            } else {
                let arg = self.parse_balanced_token_seq(&[']'])?;
                if !self.skip_string_and_ws("]") {
                    return self.fail("Expected ']' in end of attribute.");
                }
                if !self.skip_string("]") {
                    return self.fail("Expected ']' in end of attribute after [[...]");
                }
                return Ok(Some(Attribute::Cpp(arg)));
            }
        }

        if self.skip_word_and_ws("__attribute__") {
            if !self.skip_string_and_ws("(") {
                return self.fail("Expected '(' after '__attribute__'.");
            }
            if !self.skip_string_and_ws("(") {
                return self.fail("Expected '(' after '__attribute__('.");
            }
            let arg = self.parse_balanced_token_seq(&[')'])?;
            if !self.skip_string_and_ws(")") {
                return self.fail("Expected ')' after '__attribute__((...'.");
            }
            if !self.skip_string(")") {
                return self.fail("Expected ')' to end '__attribute__'.");
            }
            return Ok(Some(Attribute::Gnu(arg)));
        }

        let config = self.config;
        for id in &config.id_attributes {
            if self.skip_word_and_ws(id) {
                return Ok(Some(Attribute::Id(id.clone())));
            }
        }
        for id in &config.paren_attributes {
            if !self.skip_string_and_ws(id) {
                continue;
            }
            if !self.skip_string("(") {
                return self.fail("Expected '(' after user-defined paren-attribute.");
            }
            let arg = self.parse_balanced_token_seq(&[')'])?;
            if !self.skip_string(")") {
                return self.fail("Expected ')' to end user-defined paren-attribute.");
            }
            return Ok(Some(Attribute::Paren {
                id: id.clone(),
                arg: format!("({arg})"),
            }));
        }
        Ok(None)
    }

    pub(crate) fn parse_attribute_list(&mut self) -> Result<AttributeList> {
        let mut attrs = vec![];
        while let Some(attr) = self.parse_attribute()? {
            attrs.push(attr);
        }
        Ok(AttributeList(attrs))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;

    use super::super::DefinitionParser;
    use super::*;

    fn parse(input: &str, config: &Config) -> Option<Attribute> {
        DefinitionParser::new(input, config)
            .parse_attribute()
            .unwrap()
    }

    #[test]
    fn test_cpp_attribute() {
        let config = Config::default();
        let attr = parse("[[nodiscard]] int", &config).unwrap();
        assert_eq!(attr, Attribute::Cpp("nodiscard".into()));
    }

    #[test]
    fn test_cpp_attribute_balanced() {
        let config = Config::default();
        let attr = parse("[[deprecated(\"x[0]\")]]", &config).unwrap();
        assert_eq!(attr.to_string(), "[[deprecated(\"x[0]\")]]");
    }

    #[test]
    fn test_single_bracket_is_not_an_attribute() {
        let config = Config::default();
        let mut p = DefinitionParser::new("[3]", &config);
        assert_eq!(p.parse_attribute().unwrap(), None);
        assert_eq!(p.pos(), 0);
    }

    #[test]
    fn test_gnu_attribute() {
        let config = Config::default();
        let attr = parse("__attribute__((aligned(4), packed))", &config).unwrap();
        assert_eq!(attr, Attribute::Gnu("aligned(4), packed".into()));
    }

    #[test]
    fn test_configured_attributes() {
        let config = Config {
            id_attributes: vec!["MY_NORETURN".into()],
            paren_attributes: vec!["MY_ALIGN".into()],
            ..Config::default()
        };
        assert_eq!(
            parse("MY_NORETURN void f()", &config).unwrap(),
            Attribute::Id("MY_NORETURN".into())
        );
        assert_eq!(
            parse("MY_ALIGN(16) struct S", &config).unwrap(),
            Attribute::Paren {
                id: "MY_ALIGN".into(),
                arg: "(16)".into()
            }
        );
    }

    #[test]
    fn test_attribute_list() {
        let config = Config::default();
        let mut p = DefinitionParser::new("[[a]] [[b]] x", &config);
        let attrs = p.parse_attribute_list().unwrap();
        assert_eq!(attrs.0.len(), 2);
        assert_eq!(attrs.to_string(), "[[a]] [[b]]");
    }
}
