use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::{Identifier, NestedName, Type};

/// A character literal with its decoded code point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharLiteral {
    pub prefix: Option<String>,
    /// The raw character data between the quotes, escapes unexpanded.
    pub data: String,
    pub value: char,
}

impl Display for CharLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            f.write_str(prefix)?;
        }
        write!(f, "'{}'", self.data)
    }
}

/// A fold expression; exactly one side of the `...` is absent for unary
/// folds, both are present for binary folds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldExpr {
    pub left: Option<Box<Expression>>,
    pub op: String,
    pub right: Option<Box<Expression>>,
}

impl Display for FoldExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        if let Some(left) = &self.left {
            write!(f, "{left} {} ", self.op)?;
        }
        f.write_str("...")?;
        if let Some(right) = &self.right {
            write!(f, " {} {right}", self.op)?;
        }
        f.write_str(")")
    }
}

/// A chain of operands at one binary precedence level, e.g. `a + b - c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinOpExpr {
    pub exprs: Vec<Expression>,
    pub ops: Vec<String>,
}

impl Display for BinOpExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.exprs[0].fmt(f)?;
        for (op, expr) in self.ops.iter().zip(self.exprs.iter().skip(1)) {
            write!(f, " {op} {expr}")?;
        }
        Ok(())
    }
}

/// `(` expression-list `)`, as used in calls and initializers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParenExprList(pub Vec<Expression>);

impl Display for ParenExprList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, expr) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            expr.fmt(f)?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracedInitList {
    pub exprs: Vec<Expression>,
    pub trailing_comma: bool,
}

impl Display for BracedInitList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, expr) in self.exprs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            expr.fmt(f)?;
        }
        if self.trailing_comma {
            f.write_str(",")?;
        }
        f.write_str("}")
    }
}

/// Arguments of a call-like postfix or a new-initializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArgs {
    Paren(ParenExprList),
    Braced(BracedInitList),
}

impl Display for CallArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallArgs::Paren(list) => list.fmt(f),
            CallArgs::Braced(list) => list.fmt(f),
        }
    }
}

/// What a postfix expression starts from: a plain expression or a
/// simple-type/typename specifier used as a functional-style cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostfixPrefix {
    Expr(Box<Expression>),
    Type(Box<Type>),
}

impl Display for PostfixPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostfixPrefix::Expr(e) => e.fmt(f),
            PostfixPrefix::Type(t) => t.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostfixOp {
    Array(Box<Expression>),
    Call(CallArgs),
    Member(NestedName),
    MemberOfPointer(NestedName),
    Inc,
    Dec,
}

impl Display for PostfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostfixOp::Array(expr) => write!(f, "[{expr}]"),
            PostfixOp::Call(args) => args.fmt(f),
            PostfixOp::Member(name) => write!(f, ".{name}"),
            PostfixOp::MemberOfPointer(name) => write!(f, "->{name}"),
            PostfixOp::Inc => f.write_str("++"),
            PostfixOp::Dec => f.write_str("--"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostfixExpr {
    pub prefix: PostfixPrefix,
    pub ops: Vec<PostfixOp>,
}

impl Display for PostfixExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.prefix.fmt(f)?;
        for op in &self.ops {
            op.fmt(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastKind {
    Dynamic,
    Static,
    Reinterpret,
    Const,
}

impl CastKind {
    pub fn keyword(self) -> &'static str {
        match self {
            CastKind::Dynamic => "dynamic_cast",
            CastKind::Static => "static_cast",
            CastKind::Reinterpret => "reinterpret_cast",
            CastKind::Const => "const_cast",
        }
    }
}

impl Display for CastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpr {
    pub rooted: bool,
    /// Whether the type was written as a new-type-id (without parentheses).
    pub is_new_type_id: bool,
    pub type_id: Box<Type>,
    pub init: Option<CallArgs>,
}

impl Display for NewExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rooted {
            f.write_str("::")?;
        }
        write!(f, "new {}", self.type_id)?;
        if let Some(init) = &self.init {
            init.fmt(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expression {
    /// A number literal, digits and suffix exactly as written.
    NumberLiteral(String),
    /// A string literal, raw bytes including the quotes.
    StringLiteral(String),
    CharLiteral(CharLiteral),
    BooleanLiteral(bool),
    /// `nullptr`
    PointerLiteral,
    ThisLiteral,
    UserDefinedLiteral {
        literal: Box<Expression>,
        suffix: Identifier,
    },
    Id(NestedName),
    Paren(Box<Expression>),
    BracedInitList(BracedInitList),
    Fold(FoldExpr),
    Unary {
        op: String,
        expr: Box<Expression>,
    },
    Cast {
        type_id: Box<Type>,
        expr: Box<Expression>,
    },
    BinOp(BinOpExpr),
    Conditional {
        condition: Box<Expression>,
        then_expr: Box<Expression>,
        else_expr: Box<Expression>,
    },
    Assignment {
        lhs: Box<Expression>,
        op: String,
        rhs: Box<Expression>,
    },
    Comma(Vec<Expression>),
    Postfix(PostfixExpr),
    SizeofExpr(Box<Expression>),
    SizeofType(Box<Type>),
    SizeofParamPack(Identifier),
    Alignof(Box<Type>),
    NoexceptExpr(Box<Expression>),
    TypeIdType(Box<Type>),
    TypeIdExpr(Box<Expression>),
    ExplicitCast {
        kind: CastKind,
        type_id: Box<Type>,
        expr: Box<Expression>,
    },
    New(NewExpr),
    Delete {
        rooted: bool,
        array: bool,
        expr: Box<Expression>,
    },
    PackExpansion(Box<Expression>),
    /// Raw text recovered by the fallback scanner.
    Fallback(String),
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::NumberLiteral(text) => f.write_str(text),
            Expression::StringLiteral(text) => f.write_str(text),
            Expression::CharLiteral(lit) => lit.fmt(f),
            Expression::BooleanLiteral(true) => f.write_str("true"),
            Expression::BooleanLiteral(false) => f.write_str("false"),
            Expression::PointerLiteral => f.write_str("nullptr"),
            Expression::ThisLiteral => f.write_str("this"),
            Expression::UserDefinedLiteral { literal, suffix } => {
                write!(f, "{literal}{suffix}")
            }
            Expression::Id(name) => name.fmt(f),
            Expression::Paren(expr) => write!(f, "({expr})"),
            Expression::BracedInitList(list) => list.fmt(f),
            Expression::Fold(fold) => fold.fmt(f),
            Expression::Unary { op, expr } => {
                if op.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
                    write!(f, "{op} {expr}")
                } else {
                    write!(f, "{op}{expr}")
                }
            }
            Expression::Cast { type_id, expr } => write!(f, "({type_id}){expr}"),
            Expression::BinOp(chain) => chain.fmt(f),
            Expression::Conditional {
                condition,
                then_expr,
                else_expr,
            } => write!(f, "{condition} ? {then_expr} : {else_expr}"),
            Expression::Assignment { lhs, op, rhs } => write!(f, "{lhs} {op} {rhs}"),
            Expression::Comma(exprs) => {
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    expr.fmt(f)?;
                }
                Ok(())
            }
            Expression::Postfix(postfix) => postfix.fmt(f),
            Expression::SizeofExpr(expr) => write!(f, "sizeof {expr}"),
            Expression::SizeofType(type_id) => write!(f, "sizeof({type_id})"),
            Expression::SizeofParamPack(ident) => write!(f, "sizeof...({ident})"),
            Expression::Alignof(type_id) => write!(f, "alignof({type_id})"),
            Expression::NoexceptExpr(expr) => write!(f, "noexcept({expr})"),
            Expression::TypeIdType(type_id) => write!(f, "typeid({type_id})"),
            Expression::TypeIdExpr(expr) => write!(f, "typeid({expr})"),
            Expression::ExplicitCast {
                kind,
                type_id,
                expr,
            } => write!(f, "{kind}<{type_id}>({expr})"),
            Expression::New(new) => new.fmt(f),
            Expression::Delete {
                rooted,
                array,
                expr,
            } => {
                if *rooted {
                    f.write_str("::")?;
                }
                if *array {
                    write!(f, "delete[] {expr}")
                } else {
                    write!(f, "delete {expr}")
                }
            }
            Expression::PackExpansion(expr) => write!(f, "{expr}..."),
            Expression::Fallback(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Expression {
        Expression::Id(NestedName {
            names: vec![super::super::NestedNameElement {
                ident_or_op: super::super::IdentOrOp::Ident(Identifier(name.into())),
                template_args: None,
            }],
            templates: vec![false],
            rooted: false,
        })
    }

    #[test]
    fn test_display_binop_chain() {
        let chain = Expression::BinOp(BinOpExpr {
            exprs: vec![id("a"), id("b"), id("c")],
            ops: vec!["+".into(), "-".into()],
        });
        assert_eq!(chain.to_string(), "a + b - c");
    }

    #[test]
    fn test_display_folds() {
        let unary_right = FoldExpr {
            left: Some(Box::new(id("pack"))),
            op: "+".into(),
            right: None,
        };
        assert_eq!(unary_right.to_string(), "(pack + ...)");
        let binary = FoldExpr {
            left: Some(Box::new(id("a"))),
            op: "+".into(),
            right: Some(Box::new(id("b"))),
        };
        assert_eq!(binary.to_string(), "(a + ... + b)");
    }

    #[test]
    fn test_display_braced_init_list_trailing_comma() {
        let list = BracedInitList {
            exprs: vec![id("a"), id("b")],
            trailing_comma: true,
        };
        assert_eq!(list.to_string(), "{a, b,}");
    }

    #[test]
    fn test_display_word_unary_op() {
        let e = Expression::Unary {
            op: "not".into(),
            expr: Box::new(id("ok")),
        };
        assert_eq!(e.to_string(), "not ok");
        let e = Expression::Unary {
            op: "!".into(),
            expr: Box::new(id("ok")),
        };
        assert_eq!(e.to_string(), "!ok");
    }

    #[test]
    fn test_display_delete_and_udl() {
        let del = Expression::Delete {
            rooted: true,
            array: true,
            expr: Box::new(id("p")),
        };
        assert_eq!(del.to_string(), "::delete[] p");
        let udl = Expression::UserDefinedLiteral {
            literal: Box::new(Expression::NumberLiteral("1.5".into())),
            suffix: Identifier("_km".into()),
        };
        assert_eq!(udl.to_string(), "1.5_km");
    }
}
