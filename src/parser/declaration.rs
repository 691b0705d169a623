use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::ast::{
    BaseClass, Class, Concept, Declaration, DeclarationInner, DirectiveType, Enum, EnumScoped,
    Enumerator, Expression, Initializer, Namespace, ObjectType, Type, Union, Visibility,
};
use super::tokens::VISIBILITY_RE;
use super::{DefinitionError, DefinitionParser, NamedMode, Outer, Result};

/// Result of [`DefinitionParser::parse_expression`]: a plain expression, or
/// a type when only the type-id branch parses cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExprOrType {
    Expr(Expression),
    Type(Type),
}

impl Display for ExprOrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprOrType::Expr(e) => e.fmt(f),
            ExprOrType::Type(t) => t.fmt(f),
        }
    }
}

/// Result of [`DefinitionParser::parse_xref_object`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum XrefObject {
    Namespace(Namespace),
    Declaration(Box<Declaration>),
}

impl Display for XrefObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XrefObject::Namespace(ns) => ns.fmt(f),
            XrefObject::Declaration(decl) => decl.fmt(f),
        }
    }
}

impl<'a> DefinitionParser<'a> {
    fn parse_visibility(&mut self) -> Option<Visibility> {
        if !self.match_re(&VISIBILITY_RE) {
            return None;
        }
        Some(match self.matched_text() {
            "public" => Visibility::Public,
            "protected" => Visibility::Protected,
            _ => Visibility::Private,
        })
    }

    pub(crate) fn parse_class(&mut self) -> Result<Class> {
        let attrs = self.parse_attribute_list()?;
        self.skip_ws();
        // the class-key may be repeated from the directive
        if !self.skip_word_and_ws("class") {
            self.skip_word_and_ws("struct");
        }
        let name = self.parse_nested_name()?;
        self.skip_ws();
        let final_ = self.skip_word_and_ws("final");
        let mut bases = vec![];
        self.skip_ws();
        if self.skip_string(":") {
            loop {
                self.skip_ws();
                let mut virtual_ = self.skip_word_and_ws("virtual");
                let visibility = self.parse_visibility();
                if visibility.is_some() {
                    self.skip_ws();
                }
                if !virtual_ && self.skip_word_and_ws("virtual") {
                    virtual_ = true;
                }
                let base_name = self.parse_nested_name()?;
                self.skip_ws();
                let pack = self.skip_string("...");
                bases.push(BaseClass {
                    name: base_name,
                    visibility,
                    virtual_,
                    pack,
                });
                self.skip_ws();
                if self.skip_string(",") {
                    continue;
                }
                break;
            }
        }
        Ok(Class {
            name,
            final_,
            bases,
            attrs,
        })
    }

    pub(crate) fn parse_union(&mut self) -> Result<Union> {
        let attrs = self.parse_attribute_list()?;
        let name = self.parse_nested_name()?;
        Ok(Union { name, attrs })
    }

    pub(crate) fn parse_enum(&mut self) -> Result<Enum> {
        // scoped-ness is decided by the directive, not parsed here
        let attrs = self.parse_attribute_list()?;
        let name = self.parse_nested_name()?;
        self.skip_ws();
        let underlying_type = if self.skip_string(":") {
            Some(self.parse_type(NamedMode::No, None)?)
        } else {
            None
        };
        Ok(Enum {
            name,
            scoped: None,
            underlying_type,
            attrs,
        })
    }

    pub(crate) fn parse_enumerator(&mut self) -> Result<Enumerator> {
        let name = self.parse_nested_name()?;
        let attrs = self.parse_attribute_list()?;
        self.skip_ws();
        let mut init = None;
        if self.skip_string("=") {
            self.skip_ws();
            let value =
                self.parse_expression_fallback(&[], |p| p.parse_constant_expression(false), true)?;
            init = Some(Initializer {
                value,
                has_assign: true,
            });
        }
        Ok(Enumerator { name, init, attrs })
    }

    pub(crate) fn parse_concept(&mut self) -> Result<Concept> {
        let name = self.parse_nested_name()?;
        self.skip_ws();
        let initializer = self.parse_initializer(Some(Outer::Member), true)?;
        Ok(Concept { name, initializer })
    }

    /// Parse one declaration of the given object kind, written under the
    /// given directive.
    pub fn parse_declaration(
        &mut self,
        object_type: ObjectType,
        directive_type: DirectiveType,
    ) -> Result<Declaration> {
        let mut trailing_requires_clause = None;

        self.skip_ws();
        let visibility = self.parse_visibility();

        let template_prefix = if matches!(
            object_type,
            ObjectType::Type
                | ObjectType::Concept
                | ObjectType::Member
                | ObjectType::Function
                | ObjectType::Class
                | ObjectType::Union
        ) {
            self.parse_template_declaration_prefix(Some(object_type))?
        } else {
            None
        };

        let declaration = match object_type {
            ObjectType::Type => {
                let mut prev_errors: Vec<(String, DefinitionError)> = vec![];
                let pos = self.pos();
                let mut parsed = None;
                if template_prefix.is_none() {
                    match self.parse_type(NamedMode::Yes, Some(Outer::Type)) {
                        Ok(ty) => parsed = Some(DeclarationInner::Type(ty)),
                        Err(e) => {
                            prev_errors.push(("If typedef-like declaration".to_string(), e));
                            self.set_pos(pos);
                        }
                    }
                }
                match parsed {
                    Some(inner) => inner,
                    None => match self.parse_type_using() {
                        Ok(alias) => DeclarationInner::TypeUsing(alias),
                        Err(e) => {
                            self.set_pos(pos);
                            prev_errors.push(("If type alias or template alias".to_string(), e));
                            return Err(Self::make_multi_error(
                                prev_errors,
                                "Error in type declaration.",
                            ));
                        }
                    },
                }
            }
            ObjectType::Concept => DeclarationInner::Concept(self.parse_concept()?),
            ObjectType::Member => DeclarationInner::Member(
                self.parse_type_with_init(NamedMode::Yes, Some(Outer::Member))?,
            ),
            ObjectType::Function => {
                let ty = self.parse_type(NamedMode::Yes, Some(Outer::Function))?;
                trailing_requires_clause = self.parse_requires_clause()?;
                DeclarationInner::Function(ty)
            }
            ObjectType::Class => DeclarationInner::Class(self.parse_class()?),
            ObjectType::Union => DeclarationInner::Union(self.parse_union()?),
            ObjectType::Enum => {
                let mut parsed = self.parse_enum()?;
                parsed.scoped = match directive_type {
                    DirectiveType::EnumStruct => Some(EnumScoped::Struct),
                    DirectiveType::EnumClass => Some(EnumScoped::Class),
                    _ => None,
                };
                DeclarationInner::Enum(parsed)
            }
            ObjectType::Enumerator => DeclarationInner::Enumerator(self.parse_enumerator()?),
        };

        let template_prefix = self.check_template_consistency(
            declaration.name(),
            template_prefix,
            false,
            object_type == ObjectType::Member,
        )?;
        self.skip_ws();
        let semicolon = self.skip_string(";");
        Ok(Declaration {
            object_type,
            directive_type,
            visibility,
            template_prefix,
            declaration,
            trailing_requires_clause,
            semicolon,
        })
    }

    pub fn parse_namespace_object(&mut self) -> Result<Namespace> {
        let template_prefix = self.parse_template_declaration_prefix(None)?;
        let name = self.parse_nested_name()?;
        let template_prefix =
            self.check_template_consistency(Some(&name), template_prefix, false, false)?;
        Ok(Namespace {
            name,
            template_prefix,
        })
    }

    /// Parse a cross-reference target: first as a namespace-style shorthand
    /// (allowing full-specialization shorthand and discarding a trailing
    /// `()`), then as a full function declaration. The flag reports which
    /// alternative won.
    pub fn parse_xref_object(&mut self) -> Result<(XrefObject, bool)> {
        let pos = self.pos();
        let shorthand = (|| -> Result<Namespace> {
            let template_prefix = self.parse_template_declaration_prefix(None)?;
            let name = self.parse_nested_name()?;
            self.skip_ws();
            self.skip_string("()");
            self.assert_end(false)?;
            let template_prefix =
                self.check_template_consistency(Some(&name), template_prefix, true, false)?;
            Ok(Namespace {
                name,
                template_prefix,
            })
        })();
        match shorthand {
            Ok(ns) => Ok((XrefObject::Namespace(ns), true)),
            Err(e_shorthand) => {
                self.set_pos(pos);
                let full = (|| -> Result<Declaration> {
                    let decl =
                        self.parse_declaration(ObjectType::Function, DirectiveType::Function)?;
                    self.skip_ws();
                    self.skip_string("()");
                    self.assert_end(false)?;
                    Ok(decl)
                })();
                match full {
                    Ok(decl) => Ok((XrefObject::Declaration(Box::new(decl)), false)),
                    Err(e_full) => Err(Self::make_multi_error(
                        vec![
                            ("If shorthand ref".to_string(), e_shorthand),
                            ("If full function ref".to_string(), e_full),
                        ],
                        "Error in cross-reference.",
                    )),
                }
            }
        }
    }

    /// Parse the whole input as an expression, or as a type-id when the
    /// expression branch fails. The expression branch wins ties by order.
    pub fn parse_expression(&mut self) -> Result<ExprOrType> {
        let pos = self.pos();
        let as_expr = (|| -> Result<Expression> {
            let expr = self.parse_comma_expression()?;
            self.skip_ws();
            self.assert_end(false)?;
            Ok(expr)
        })();
        match as_expr {
            Ok(expr) => Ok(ExprOrType::Expr(expr)),
            Err(e_expr) => {
                self.set_pos(pos);
                let as_type = (|| -> Result<Type> {
                    let ty = self.parse_type(NamedMode::No, None)?;
                    self.skip_ws();
                    self.assert_end(false)?;
                    Ok(ty)
                })();
                match as_type {
                    Ok(ty) => Ok(ExprOrType::Type(ty)),
                    Err(e_type) => Err(Self::make_multi_error(
                        vec![
                            ("If expression".to_string(), e_expr),
                            ("If type".to_string(), e_type),
                        ],
                        "Error when parsing (type) expression.",
                    )),
                }
            }
        }
    }
}
