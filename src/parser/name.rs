use super::ast::{
    IdentOrOp, Identifier, NestedName, NestedNameElement, Operator, TemplateArg, TemplateArgs,
};
use super::tokens::{is_keyword, IDENTIFIER_RE, OPERATOR_RE};
use super::{DefinitionError, DefinitionParser, NamedMode, Result};

impl<'a> DefinitionParser<'a> {
    /// The name after the `operator` keyword: a built-in operator token,
    /// `new`/`delete` (with optional `[]`), a literal operator, or a
    /// type-conversion operator.
    pub(crate) fn parse_operator(&mut self) -> Result<Operator> {
        self.skip_ws();
        if self.match_re(&OPERATOR_RE) {
            let matched = self.matched_text();
            // "[ ]" and "( )" normalize to their canonical spelling
            let op = match matched.chars().next() {
                Some('[') => "[]".to_string(),
                Some('(') => "()".to_string(),
                _ => matched.to_string(),
            };
            return Ok(Operator::BuiltIn(op));
        }

        for base in ["new", "delete"] {
            if !self.skip_word(base) {
                continue;
            }
            self.skip_ws();
            let mut op = base.to_string();
            if self.skip_string("[") {
                self.skip_ws();
                if !self.skip_string("]") {
                    return self.fail(&format!("Expected \"]\" after \"operator {base}[\""));
                }
                op.push_str("[]");
            }
            return Ok(Operator::BuiltIn(op));
        }

        if self.skip_string("\"\"") {
            self.skip_ws();
            if !self.match_re(&IDENTIFIER_RE) {
                return self.fail("Expected user-defined literal suffix.");
            }
            let identifier = Identifier(self.matched_text().to_string());
            return Ok(Operator::Literal(identifier));
        }

        // a cast operator definition, eat another type
        let ty = self.parse_type(NamedMode::No, Some(super::Outer::OperatorCast))?;
        Ok(Operator::Cast(Box::new(ty)))
    }

    /// The `... | > | ,` tail after one template argument. Returns
    /// `(parsed_comma, parsed_end, pack_expansion)`.
    fn parse_template_arg_tail(&mut self) -> Result<(bool, bool, bool)> {
        self.skip_ws();
        if self.skip_string_and_ws("...") {
            if !self.skip_string(">") {
                return self.fail("Expected \">\" after \"...\" in template argument list.");
            }
            Ok((false, true, true))
        } else if self.skip_string(">") {
            Ok((false, true, false))
        } else if self.skip_string_and_ws(",") {
            Ok((true, false, false))
        } else {
            self.fail("Expected \"...>\", \">\" or \",\" in template argument list.")
        }
    }

    fn parse_template_arg_as_type(&mut self) -> Result<(TemplateArg, bool, bool, bool)> {
        let ty = self.parse_type(NamedMode::No, None)?;
        let (comma, end, pack) = self.parse_template_arg_tail()?;
        Ok((TemplateArg::Type(ty), comma, end, pack))
    }

    fn parse_template_arg_as_expr(&mut self) -> Result<(TemplateArg, bool, bool, bool)> {
        let value = self.parse_constant_expression(true)?;
        let (comma, end, pack) = self.parse_template_arg_tail()?;
        Ok((TemplateArg::Constant(value), comma, end, pack))
    }

    /// A template argument list including the `<` and `>`. Each argument is
    /// speculatively parsed as a type first, then re-parsed as a constant
    /// expression (with `>` protected) when that fails.
    pub(crate) fn parse_template_argument_list(&mut self) -> Result<Option<TemplateArgs>> {
        self.skip_ws();
        if !self.skip_string_and_ws("<") {
            return Ok(None);
        }
        if self.skip_string(">") {
            return Ok(Some(TemplateArgs {
                args: vec![],
                pack_expansion: false,
            }));
        }
        let mut prev_errors: Vec<(String, DefinitionError)> = vec![];
        let mut args = vec![];
        let mut pack_expansion = false;
        loop {
            let pos = self.pos();
            let (arg, parsed_comma, parsed_end, pack) = match self.parse_template_arg_as_type() {
                Ok(parsed) => parsed,
                Err(e_type) => {
                    prev_errors.push(("If type argument".to_string(), e_type));
                    self.set_pos(pos);
                    match self.parse_template_arg_as_expr() {
                        Ok(parsed) => parsed,
                        Err(e_expr) => {
                            self.set_pos(pos);
                            prev_errors.push(("If non-type argument".to_string(), e_expr));
                            return Err(Self::make_multi_error(
                                prev_errors,
                                "Error in parsing template argument list.",
                            ));
                        }
                    }
                }
            };
            args.push(arg);
            if pack {
                pack_expansion = true;
            }
            if parsed_end {
                break;
            }
            debug_assert!(parsed_comma);
        }
        Ok(Some(TemplateArgs {
            args,
            pack_expansion,
        }))
    }

    pub(crate) fn parse_nested_name(&mut self) -> Result<NestedName> {
        self.parse_nested_name_impl(false)
    }

    /// With `member_pointer` the name is the class part of a pointer to
    /// member: every segment must be followed by `::`, and the name ends
    /// where no identifier follows (at the `*`).
    pub(crate) fn parse_nested_name_impl(&mut self, member_pointer: bool) -> Result<NestedName> {
        let mut names: Vec<NestedNameElement> = vec![];
        let mut templates: Vec<bool> = vec![];

        self.skip_ws();
        let rooted = self.skip_string("::");
        loop {
            self.skip_ws();
            let template = if names.is_empty() {
                false
            } else {
                self.skip_word_and_ws("template")
            };
            templates.push(template);
            let ident_or_op = if self.skip_word_and_ws("operator") {
                IdentOrOp::Op(self.parse_operator()?)
            } else {
                if !self.match_re(&IDENTIFIER_RE) {
                    if member_pointer && !names.is_empty() {
                        templates.pop();
                        break;
                    }
                    return self.fail("Expected identifier in nested name.");
                }
                let identifier = self.matched_text();
                if is_keyword(identifier) {
                    return self.fail(&format!(
                        "Expected identifier in nested name, got keyword: {identifier}"
                    ));
                }
                IdentOrOp::Ident(Identifier(identifier.to_string()))
            };
            // Try greedily for template arguments; a failing `<` may instead
            // be a less-than in the surrounding expression, so the attempt
            // is rolled back and its error kept on the side channel.
            let pos = self.pos();
            let template_args = match self.parse_template_argument_list() {
                Ok(args) => args,
                Err(err) => {
                    self.set_pos(pos);
                    self.state.add_error(err);
                    None
                }
            };
            names.push(NestedNameElement {
                ident_or_op,
                template_args,
            });

            self.skip_ws();
            if !self.skip_string("::") {
                if member_pointer {
                    return self.fail("Expected '::' in pointer to member (function).");
                }
                break;
            }
        }
        Ok(NestedName {
            names,
            templates,
            rooted,
        })
    }
}
