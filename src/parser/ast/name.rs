use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::{Expression, Type};

/// A single identifier, including destructor names (`~Foo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier(pub String);

impl Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An `operator` name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// A built-in operator token, e.g. `operator+` or `operator new[]`.
    BuiltIn(String),
    /// A type-conversion operator, e.g. `operator bool`.
    Cast(Box<Type>),
    /// A literal operator, e.g. `operator""_km`.
    Literal(Identifier),
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::BuiltIn(op) => {
                if op.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
                    write!(f, "operator {op}")
                } else {
                    write!(f, "operator{op}")
                }
            }
            Operator::Cast(typ) => write!(f, "operator {typ}"),
            Operator::Literal(ident) => write!(f, "operator\"\"{ident}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentOrOp {
    Ident(Identifier),
    Op(Operator),
}

impl Display for IdentOrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentOrOp::Ident(ident) => ident.fmt(f),
            IdentOrOp::Op(op) => op.fmt(f),
        }
    }
}

/// One template argument: a type-id or a constant expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateArg {
    Type(Type),
    Constant(Expression),
}

impl Display for TemplateArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateArg::Type(t) => t.fmt(f),
            TemplateArg::Constant(e) => e.fmt(f),
        }
    }
}

/// A template argument list, `<` and `>` included. When `pack_expansion` is
/// set, the final argument is expanded with `...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateArgs {
    pub args: Vec<TemplateArg>,
    pub pack_expansion: bool,
}

impl Display for TemplateArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            arg.fmt(f)?;
        }
        if self.pack_expansion {
            f.write_str("...")?;
        }
        f.write_str(">")
    }
}

/// One segment of a nested name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedNameElement {
    pub ident_or_op: IdentOrOp,
    pub template_args: Option<TemplateArgs>,
}

impl Display for NestedNameElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ident_or_op.fmt(f)?;
        if let Some(args) = &self.template_args {
            args.fmt(f)?;
        }
        Ok(())
    }
}

/// A `::`-separated name with an optional leading `::` and a per-segment
/// `template` disambiguator flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedName {
    pub names: Vec<NestedNameElement>,
    pub templates: Vec<bool>,
    pub rooted: bool,
}

impl NestedName {
    /// The number of template argument lists carried by the segments.
    pub fn num_templates(&self) -> usize {
        self.names
            .iter()
            .filter(|n| n.template_args.is_some())
            .count()
    }
}

impl Display for NestedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rooted {
            f.write_str("::")?;
        }
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                f.write_str("::")?;
            }
            if self.templates.get(i).copied().unwrap_or(false) {
                f.write_str("template ")?;
            }
            name.fmt(f)?;
        }
        Ok(())
    }
}
