use super::ast::{
    BinOpExpr, Expression, Identifier, NestedName, ObjectType, RequiresClause,
    TemplateDeclarationPrefix, TemplateIntroduction, TemplateIntroductionParameter, TemplateItem,
    TemplateKeyParamPackIdDefault, TemplateParam, TemplateParams, TypeParamKey,
};
use super::tokens::{is_keyword, IDENTIFIER_RE};
use super::{DefinitionError, DefinitionParser, NamedMode, Result};

impl<'a> DefinitionParser<'a> {
    /// `typename|class ...[opt] identifier[opt] = default[opt]`, shared by
    /// type parameters and template template parameters.
    fn parse_template_key_param(
        &mut self,
        has_nested_params: bool,
    ) -> Result<TemplateKeyParamPackIdDefault> {
        self.skip_ws();
        let key = if self.skip_word_and_ws("typename") {
            TypeParamKey::Typename
        } else if self.skip_word_and_ws("class") {
            TypeParamKey::Class
        } else if has_nested_params {
            return self
                .fail("Expected 'typename' or 'class' after template template parameter list.");
        } else {
            return self
                .fail("Expected 'typename' or 'class' in the beginning of template type parameter.");
        };
        self.skip_ws();
        let parameter_pack = self.skip_string("...");
        self.skip_ws();
        let identifier = if self.match_re(&IDENTIFIER_RE) {
            Some(Identifier(self.matched_text().to_string()))
        } else {
            None
        };
        self.skip_ws();
        let default = if !parameter_pack && self.skip_string("=") {
            Some(self.parse_type(NamedMode::No, None)?)
        } else {
            if !matches!(self.current_char(), Some(',') | Some('>')) {
                return self.fail("Expected \",\" or \">\" after (template) type parameter.");
            }
            None
        };
        Ok(TemplateKeyParamPackIdDefault {
            key,
            identifier,
            parameter_pack,
            default,
        })
    }

    pub(crate) fn parse_template_parameter(&mut self) -> Result<TemplateParam> {
        self.skip_ws();
        let nested_params = if self.skip_word("template") {
            // a template template parameter
            Some(self.parse_template_parameter_list()?)
        } else {
            None
        };

        let pos = self.pos();
        match self.parse_template_key_param(nested_params.is_some()) {
            Ok(data) => {
                if let Some(nested_params) = nested_params {
                    Ok(TemplateParam::TemplateType {
                        nested_params: Box::new(nested_params),
                        data,
                    })
                } else {
                    Ok(TemplateParam::Type(data))
                }
            }
            Err(e_type) => {
                if nested_params.is_some() {
                    return Err(e_type);
                }
                self.set_pos(pos);
                let non_type = (|| -> Result<TemplateParam> {
                    let param = self.parse_template_param_with_init()?;
                    self.skip_ws();
                    let parameter_pack = self.skip_string("...");
                    Ok(TemplateParam::NonType {
                        param,
                        parameter_pack,
                    })
                })();
                match non_type {
                    Ok(param) => Ok(param),
                    Err(e_non_type) => {
                        self.set_pos(pos);
                        Err(Self::make_multi_error(
                            vec![
                                (
                                    "If unconstrained type parameter or template type parameter"
                                        .to_string(),
                                    e_type,
                                ),
                                (
                                    "If constrained type parameter or non-type parameter"
                                        .to_string(),
                                    e_non_type,
                                ),
                            ],
                            "Error when parsing template parameter.",
                        ))
                    }
                }
            }
        }
    }

    /// `<` parameter-list `>`, assuming `template` was just consumed.
    pub(crate) fn parse_template_parameter_list(&mut self) -> Result<TemplateParams> {
        let mut params = vec![];
        self.skip_ws();
        if !self.skip_string("<") {
            return self.fail("Expected '<' after 'template'");
        }
        loop {
            let pos = self.pos();
            let mut param_error = None;
            match self.parse_template_parameter() {
                Ok(param) => params.push(param),
                Err(e) => {
                    self.set_pos(pos);
                    param_error = Some(e);
                }
            }
            self.skip_ws();
            if self.skip_string(">") {
                let requires_clause = self.parse_requires_clause()?;
                return Ok(TemplateParams {
                    params,
                    requires_clause,
                });
            }
            if self.skip_string(",") {
                continue;
            }
            let mut errors: Vec<(String, DefinitionError)> = vec![];
            if let Some(err) = param_error {
                errors.push(("If parameter".to_string(), err));
            }
            if let Err(e) = self.fail::<()>("Expected \",\" or \">\".") {
                errors.push(("If no parameter".to_string(), e));
            }
            log::debug!("template parameter list errors: {errors:?}");
            return Err(Self::make_multi_error(
                errors,
                "Error in template parameter list.",
            ));
        }
    }

    /// A template introduction, `Concept{P1, ...P2}`. Non-destructive: when
    /// no introduction starts here, the cursor is left untouched.
    pub(crate) fn parse_template_introduction(&mut self) -> Result<Option<TemplateIntroduction>> {
        let pos = self.pos();
        let concept = match self.parse_nested_name() {
            Ok(name) => name,
            Err(_) => {
                self.set_pos(pos);
                return Ok(None);
            }
        };
        self.skip_ws();
        if !self.skip_string("{") {
            self.set_pos(pos);
            return Ok(None);
        }

        // now it surely is a template introduction
        let mut params = vec![];
        loop {
            self.skip_ws();
            let parameter_pack = self.skip_string("...");
            self.skip_ws();
            if !self.match_re(&IDENTIFIER_RE) {
                return self.fail("Expected identifier in template introduction list.");
            }
            let text = self.matched_text();
            if is_keyword(text) {
                return self.fail(&format!(
                    "Expected identifier in template introduction list, got keyword: {text}"
                ));
            }
            params.push(TemplateIntroductionParameter {
                identifier: Identifier(text.to_string()),
                parameter_pack,
            });

            self.skip_ws();
            if self.skip_string("}") {
                break;
            }
            if self.skip_string(",") {
                continue;
            }
            return self.fail("Error in template introduction list. Expected \",\", or \"}\".");
        }
        Ok(Some(TemplateIntroduction { concept, params }))
    }

    /// `requires` constraint-logical-or-expression, built from primary
    /// expressions joined by `&&`/`and` and `||`/`or`.
    pub(crate) fn parse_requires_clause(&mut self) -> Result<Option<RequiresClause>> {
        self.skip_ws();
        if !self.skip_word("requires") {
            return Ok(None);
        }

        fn parse_and_expr(p: &mut DefinitionParser<'_>) -> Result<Expression> {
            let mut exprs = vec![p.parse_primary_expression()?];
            let mut ops: Vec<String> = vec![];
            loop {
                p.skip_ws();
                if p.skip_string("&&") {
                    ops.push("&&".to_string());
                } else if p.skip_word("and") {
                    ops.push("and".to_string());
                } else {
                    break;
                }
                exprs.push(p.parse_primary_expression()?);
            }
            if ops.is_empty() {
                Ok(exprs.swap_remove(0))
            } else {
                Ok(Expression::BinOp(BinOpExpr { exprs, ops }))
            }
        }

        let mut exprs = vec![parse_and_expr(self)?];
        let mut ops: Vec<String> = vec![];
        loop {
            self.skip_ws();
            if self.skip_string("||") {
                ops.push("||".to_string());
            } else if self.skip_word("or") {
                ops.push("or".to_string());
            } else {
                break;
            }
            exprs.push(parse_and_expr(self)?);
        }
        let expr = if ops.is_empty() {
            exprs.swap_remove(0)
        } else {
            Expression::BinOp(BinOpExpr { exprs, ops })
        };
        Ok(Some(RequiresClause { expr }))
    }

    /// The sequence of template parameter lists and introductions before a
    /// declaration. For members, a failing parameter list after `template`
    /// yields the member-instantiation sentinel instead of an error.
    pub(crate) fn parse_template_declaration_prefix(
        &mut self,
        object_type: Option<ObjectType>,
    ) -> Result<Option<TemplateDeclarationPrefix>> {
        let mut templates: Vec<TemplateItem> = vec![];
        loop {
            self.skip_ws();
            let pos = self.pos();
            let item = if self.skip_word("template") {
                let list = match self.parse_template_parameter_list() {
                    Ok(list) => list,
                    Err(e) => {
                        if object_type == Some(ObjectType::Member) && templates.is_empty() {
                            return Ok(Some(TemplateDeclarationPrefix { templates: None }));
                        }
                        return Err(e);
                    }
                };
                if object_type == Some(ObjectType::Concept) && list.requires_clause.is_some() {
                    return self.fail("requires-clause not allowed for concept");
                }
                TemplateItem::Params(list)
            } else {
                match self.parse_template_introduction()? {
                    Some(intro) => TemplateItem::Introduction(intro),
                    None => break,
                }
            };
            if object_type == Some(ObjectType::Concept) && !templates.is_empty() {
                self.set_pos(pos);
                return self.fail("More than 1 template parameter list for concept.");
            }
            templates.push(item);
        }
        if templates.is_empty() {
            if object_type == Some(ObjectType::Concept) {
                return self.fail("Missing template parameter list for concept.");
            }
            return Ok(None);
        }
        Ok(Some(TemplateDeclarationPrefix {
            templates: Some(templates),
        }))
    }

    /// Compare the declared template parameter lists to the argument lists
    /// embedded in the name; prepend empty parameter lists for
    /// full-specialization shorthand, warning unless shorthand is allowed.
    pub(crate) fn check_template_consistency(
        &mut self,
        nested_name: Option<&NestedName>,
        template_prefix: Option<TemplateDeclarationPrefix>,
        full_spec_shorthand: bool,
        is_member: bool,
    ) -> Result<Option<TemplateDeclarationPrefix>> {
        let num_args = nested_name.map_or(0, NestedName::num_templates);
        let mut is_member_instantiation = false;
        let num_params = match &template_prefix {
            None => 0,
            Some(prefix) => {
                if is_member && prefix.templates.is_none() {
                    is_member_instantiation = true;
                    0
                } else {
                    prefix.num_params()
                }
            }
        };
        if num_args + 1 < num_params {
            return self.fail(&format!(
                "Too few template argument lists compared to parameter lists. \
                 Argument lists: {num_args}, Parameter lists: {num_params}."
            ));
        }
        if num_args > num_params {
            let num_extra = num_args - num_params;
            if !full_spec_shorthand && !is_member_instantiation {
                let mut msg = format!(
                    "Too many template argument lists compared to parameter lists. \
                     Argument lists: {num_args}, Parameter lists: {num_params}, \
                     Extra empty parameters lists prepended: {num_extra}. Declaration:\n\t"
                );
                if let Some(prefix) = &template_prefix {
                    msg.push_str(&format!("{prefix}\n\t"));
                }
                if let Some(name) = nested_name {
                    msg.push_str(&name.to_string());
                }
                self.warn(&msg);
            }
            let mut new_templates: Vec<TemplateItem> = (0..num_extra)
                .map(|_| {
                    TemplateItem::Params(TemplateParams {
                        params: vec![],
                        requires_clause: None,
                    })
                })
                .collect();
            if let Some(prefix) = template_prefix {
                if !is_member_instantiation {
                    if let Some(old) = prefix.templates {
                        new_templates.extend(old);
                    }
                }
            }
            return Ok(Some(TemplateDeclarationPrefix {
                templates: Some(new_templates),
            }));
        }
        Ok(template_prefix)
    }
}
