use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::{AttributeList, Expression, NestedName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageClass {
    Static,
    Extern,
    Mutable,
    Register,
}

impl Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageClass::Static => "static",
            StorageClass::Extern => "extern",
            StorageClass::Mutable => "mutable",
            StorageClass::Register => "register",
        })
    }
}

/// An `explicit` specifier, optionally conditional: `explicit(expr)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitSpec {
    pub expr: Option<Expression>,
}

impl Display for ExplicitSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("explicit")?;
        if let Some(expr) = &self.expr {
            write!(f, "({expr})")?;
        }
        Ok(())
    }
}

/// The permutable simple decl-specifiers surrounding a type specifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclSpecsSimple {
    pub storage: Option<StorageClass>,
    pub thread_local: bool,
    pub inline: bool,
    pub virtual_: bool,
    pub explicit_spec: Option<ExplicitSpec>,
    pub consteval: bool,
    pub constexpr_: bool,
    pub constinit: bool,
    pub volatile: bool,
    pub const_: bool,
    pub friend: bool,
    pub attrs: AttributeList,
}

impl DeclSpecsSimple {
    pub fn is_empty(&self) -> bool {
        self == &DeclSpecsSimple::default()
    }
}

impl Display for DeclSpecsSimple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut word = |f: &mut fmt::Formatter<'_>, s: &str| -> fmt::Result {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            f.write_str(s)
        };
        if let Some(storage) = self.storage {
            word(f, &storage.to_string())?;
        }
        if self.thread_local {
            word(f, "thread_local")?;
        }
        if self.inline {
            word(f, "inline")?;
        }
        if self.friend {
            word(f, "friend")?;
        }
        if self.virtual_ {
            word(f, "virtual")?;
        }
        if let Some(explicit_spec) = &self.explicit_spec {
            word(f, &explicit_spec.to_string())?;
        }
        if self.consteval {
            word(f, "consteval")?;
        }
        if self.constexpr_ {
            word(f, "constexpr")?;
        }
        if self.constinit {
            word(f, "constinit")?;
        }
        if self.volatile {
            word(f, "volatile")?;
        }
        if self.const_ {
            word(f, "const")?;
        }
        if !self.attrs.is_empty() {
            word(f, &self.attrs.to_string())?;
        }
        Ok(())
    }
}

/// Keyword prefix of an elaborated type specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeSpecPrefix {
    Class,
    Struct,
    Enum,
    Union,
    Typename,
}

impl Display for TypeSpecPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeSpecPrefix::Class => "class",
            TypeSpecPrefix::Struct => "struct",
            TypeSpecPrefix::Enum => "enum",
            TypeSpecPrefix::Union => "union",
            TypeSpecPrefix::Typename => "typename",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placeholder {
    Auto,
    DecltypeAuto,
}

impl Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Placeholder::Auto => "auto",
            Placeholder::DecltypeAuto => "decltype(auto)",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrailingTypeSpec {
    /// A fundamental type. `names` is the token sequence as written,
    /// `canonical` the normalized `[modifier, signedness, width.., base]`
    /// ordering used for identifier generation.
    Fundamental {
        names: Vec<String>,
        canonical: Vec<String>,
    },
    Decltype(Expression),
    DecltypeAuto,
    Name {
        prefix: Option<TypeSpecPrefix>,
        name: NestedName,
        placeholder: Option<Placeholder>,
    },
}

impl Display for TrailingTypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrailingTypeSpec::Fundamental { names, .. } => f.write_str(&names.join(" ")),
            TrailingTypeSpec::Decltype(expr) => write!(f, "decltype({expr})"),
            TrailingTypeSpec::DecltypeAuto => f.write_str("decltype(auto)"),
            TrailingTypeSpec::Name {
                prefix,
                name,
                placeholder,
            } => {
                if let Some(prefix) = prefix {
                    write!(f, "{prefix} ")?;
                }
                name.fmt(f)?;
                if let Some(placeholder) = placeholder {
                    write!(f, " {placeholder}")?;
                }
                Ok(())
            }
        }
    }
}

/// The full decl-specifier block: simple specifiers on the left, the
/// optional trailing type specifier, and simple specifiers on the right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclSpecs {
    pub left: DeclSpecsSimple,
    pub trailing: Option<TrailingTypeSpec>,
    pub right: Option<DeclSpecsSimple>,
}

impl Display for DeclSpecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut part = |f: &mut fmt::Formatter<'_>, s: String| -> fmt::Result {
            if s.is_empty() {
                return Ok(());
            }
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            f.write_str(&s)
        };
        part(f, self.left.to_string())?;
        if let Some(trailing) = &self.trailing {
            part(f, trailing.to_string())?;
        }
        if let Some(right) = &self.right {
            part(f, right.to_string())?;
        }
        Ok(())
    }
}

/// One array suffix of a declarator; the size may have been recovered by the
/// fallback scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayOp {
    pub size: Option<Expression>,
}

impl Display for ArrayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.size {
            Some(size) => write!(f, "[{size}]"),
            None => f.write_str("[]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefQual {
    LValue,
    RValue,
}

impl Display for RefQual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RefQual::LValue => "&",
            RefQual::RValue => "&&",
        })
    }
}

/// `noexcept`, optionally with a constant expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoexceptSpec {
    pub expr: Option<Expression>,
}

impl Display for NoexceptSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("noexcept")?;
        if let Some(expr) = &self.expr {
            write!(f, "({expr})")?;
        }
        Ok(())
    }
}

/// The `= 0 | default | delete` tail of a function declarator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamInitializer {
    Pure,
    Default,
    Delete,
}

impl Display for ParamInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamInitializer::Pure => "0",
            ParamInitializer::Default => "default",
            ParamInitializer::Delete => "delete",
        })
    }
}

/// One function parameter: a typed (possibly defaulted) parameter, or the
/// C-style trailing ellipsis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionParameter {
    pub arg: Option<TypeWithInit>,
    pub ellipsis: bool,
}

impl Display for FunctionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ellipsis {
            f.write_str("...")
        } else if let Some(arg) = &self.arg {
            arg.fmt(f)
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParametersAndQualifiers {
    pub args: Vec<FunctionParameter>,
    pub const_: bool,
    pub volatile: bool,
    pub ref_qual: Option<RefQual>,
    pub exception_spec: Option<NoexceptSpec>,
    pub trailing_return: Option<Box<Type>>,
    pub override_: bool,
    pub final_: bool,
    pub attrs: AttributeList,
    pub initializer: Option<ParamInitializer>,
}

impl Display for ParametersAndQualifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            arg.fmt(f)?;
        }
        f.write_str(")")?;
        if self.const_ {
            f.write_str(" const")?;
        }
        if self.volatile {
            f.write_str(" volatile")?;
        }
        if let Some(ref_qual) = self.ref_qual {
            write!(f, " {ref_qual}")?;
        }
        if let Some(spec) = &self.exception_spec {
            write!(f, " {spec}")?;
        }
        if let Some(ret) = &self.trailing_return {
            write!(f, " -> {ret}")?;
        }
        if self.override_ {
            f.write_str(" override")?;
        }
        if self.final_ {
            f.write_str(" final")?;
        }
        if !self.attrs.is_empty() {
            write!(f, " {}", self.attrs)?;
        }
        if let Some(init) = self.initializer {
            write!(f, " = {init}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Declarator {
    Ptr {
        volatile: bool,
        const_: bool,
        attrs: AttributeList,
        next: Box<Declarator>,
    },
    Ref {
        attrs: AttributeList,
        next: Box<Declarator>,
    },
    ParamPack {
        next: Box<Declarator>,
    },
    /// `( ptr-declarator )` followed by the outer declarator part, as in
    /// function pointers.
    Paren {
        inner: Box<Declarator>,
        next: Box<Declarator>,
    },
    MemPtr {
        class_name: NestedName,
        const_: bool,
        volatile: bool,
        next: Box<Declarator>,
    },
    NameParamQual {
        decl_id: Option<NestedName>,
        array_ops: Vec<ArrayOp>,
        param_qual: Option<ParametersAndQualifiers>,
    },
    NameBitField {
        decl_id: Option<NestedName>,
        size: Expression,
    },
}

impl Declarator {
    /// The innermost declarator-id, if any.
    pub fn name(&self) -> Option<&NestedName> {
        match self {
            Declarator::Ptr { next, .. }
            | Declarator::Ref { next, .. }
            | Declarator::ParamPack { next }
            | Declarator::MemPtr { next, .. } => next.name(),
            Declarator::Paren { inner, .. } => inner.name(),
            Declarator::NameParamQual { decl_id, .. }
            | Declarator::NameBitField { decl_id, .. } => decl_id.as_ref(),
        }
    }

    /// Whether the rendered declarator starts with a token that needs a
    /// separating space after the decl-specifiers.
    pub fn require_space_after_decl_specs(&self) -> bool {
        match self {
            Declarator::Ptr { next, .. } | Declarator::Ref { next, .. } => {
                next.require_space_after_decl_specs()
            }
            Declarator::ParamPack { .. } => false,
            Declarator::Paren { .. } | Declarator::MemPtr { .. } => true,
            Declarator::NameParamQual { decl_id, .. } => decl_id.is_some(),
            Declarator::NameBitField { .. } => true,
        }
    }

    fn renders_empty(&self) -> bool {
        matches!(
            self,
            Declarator::NameParamQual {
                decl_id: None,
                array_ops,
                param_qual: None,
            } if array_ops.is_empty()
        )
    }
}

impl Display for Declarator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declarator::Ptr {
                volatile,
                const_,
                attrs,
                next,
            } => {
                f.write_str("*")?;
                let mut spaced = false;
                if *volatile {
                    f.write_str("volatile")?;
                    spaced = true;
                }
                if *const_ {
                    if spaced {
                        f.write_str(" ")?;
                    }
                    f.write_str("const")?;
                    spaced = true;
                }
                if !attrs.is_empty() {
                    if spaced {
                        f.write_str(" ")?;
                    }
                    attrs.fmt(f)?;
                    spaced = true;
                }
                if spaced && !next.renders_empty() {
                    f.write_str(" ")?;
                }
                next.fmt(f)
            }
            Declarator::Ref { attrs, next } => {
                f.write_str("&")?;
                if !attrs.is_empty() {
                    attrs.fmt(f)?;
                    if !next.renders_empty() {
                        f.write_str(" ")?;
                    }
                }
                next.fmt(f)
            }
            Declarator::ParamPack { next } => {
                f.write_str("...")?;
                next.fmt(f)
            }
            Declarator::Paren { inner, next } => {
                write!(f, "({inner})")?;
                next.fmt(f)
            }
            Declarator::MemPtr {
                class_name,
                const_,
                volatile,
                next,
            } => {
                write!(f, "{class_name}::*")?;
                let mut spaced = false;
                if *volatile {
                    f.write_str("volatile")?;
                    spaced = true;
                }
                if *const_ {
                    if spaced {
                        f.write_str(" ")?;
                    }
                    f.write_str("const")?;
                    spaced = true;
                }
                if spaced && !next.renders_empty() {
                    f.write_str(" ")?;
                }
                next.fmt(f)
            }
            Declarator::NameParamQual {
                decl_id,
                array_ops,
                param_qual,
            } => {
                if let Some(decl_id) = decl_id {
                    decl_id.fmt(f)?;
                }
                for op in array_ops {
                    op.fmt(f)?;
                }
                if let Some(param_qual) = param_qual {
                    param_qual.fmt(f)?;
                }
                Ok(())
            }
            Declarator::NameBitField { decl_id, size } => {
                if let Some(decl_id) = decl_id {
                    decl_id.fmt(f)?;
                }
                write!(f, " : {size}")
            }
        }
    }
}

/// A full type: decl-specifiers plus a declarator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Type {
    pub decl_specs: DeclSpecs,
    pub decl: Declarator,
}

impl Type {
    pub fn name(&self) -> Option<&NestedName> {
        self.decl.name()
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let specs = self.decl_specs.to_string();
        let decl = self.decl.to_string();
        if specs.is_empty() {
            f.write_str(&decl)
        } else if decl.is_empty() {
            f.write_str(&specs)
        } else if self.decl.require_space_after_decl_specs() {
            write!(f, "{specs} {decl}")
        } else {
            write!(f, "{specs}{decl}")
        }
    }
}

/// A brace-or-equal initializer. Renders with its leading space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initializer {
    pub value: Expression,
    pub has_assign: bool,
}

impl Display for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_assign {
            write!(f, " = {}", self.value)
        } else {
            write!(f, " {}", self.value)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeWithInit {
    pub ty: Type,
    pub init: Option<Initializer>,
}

impl TypeWithInit {
    pub fn name(&self) -> Option<&NestedName> {
        self.ty.name()
    }
}

impl Display for TypeWithInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ty.fmt(f)?;
        if let Some(init) = &self.init {
            init.fmt(f)?;
        }
        Ok(())
    }
}

/// A type alias: `name` or `name = type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeUsing {
    pub name: NestedName,
    pub ty: Option<Type>,
}

impl Display for TypeUsing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)?;
        if let Some(ty) = &self.ty {
            write!(f, " = {ty}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{IdentOrOp, Identifier, NestedNameElement};
    use super::*;

    fn name(s: &str) -> NestedName {
        NestedName {
            names: vec![NestedNameElement {
                ident_or_op: IdentOrOp::Ident(Identifier(s.into())),
                template_args: None,
            }],
            templates: vec![false],
            rooted: false,
        }
    }

    fn fundamental(words: &[&str]) -> DeclSpecs {
        DeclSpecs {
            left: DeclSpecsSimple::default(),
            trailing: Some(TrailingTypeSpec::Fundamental {
                names: words.iter().map(|s| s.to_string()).collect(),
                canonical: words.iter().map(|s| s.to_string()).collect(),
            }),
            right: Some(DeclSpecsSimple::default()),
        }
    }

    fn named_declarator(s: &str) -> Declarator {
        Declarator::NameParamQual {
            decl_id: Some(name(s)),
            array_ops: vec![],
            param_qual: None,
        }
    }

    #[test]
    fn test_display_pointer_spacing() {
        let unnamed = Type {
            decl_specs: fundamental(&["int"]),
            decl: Declarator::Ptr {
                volatile: false,
                const_: false,
                attrs: AttributeList::default(),
                next: Box::new(Declarator::NameParamQual {
                    decl_id: None,
                    array_ops: vec![],
                    param_qual: None,
                }),
            },
        };
        assert_eq!(unnamed.to_string(), "int*");

        let named = Type {
            decl_specs: fundamental(&["int"]),
            decl: Declarator::Ptr {
                volatile: false,
                const_: true,
                attrs: AttributeList::default(),
                next: Box::new(named_declarator("p")),
            },
        };
        assert_eq!(named.to_string(), "int *const p");
    }

    #[test]
    fn test_display_decl_specs_simple() {
        let specs = DeclSpecsSimple {
            storage: Some(StorageClass::Static),
            constexpr_: true,
            const_: true,
            ..DeclSpecsSimple::default()
        };
        assert_eq!(specs.to_string(), "static constexpr const");
        assert!(!specs.is_empty());
        assert!(DeclSpecsSimple::default().is_empty());
    }

    #[test]
    fn test_display_parameters_and_qualifiers() {
        let pq = ParametersAndQualifiers {
            args: vec![],
            const_: true,
            volatile: false,
            ref_qual: Some(RefQual::RValue),
            exception_spec: Some(NoexceptSpec { expr: None }),
            trailing_return: None,
            override_: true,
            final_: false,
            attrs: AttributeList::default(),
            initializer: Some(ParamInitializer::Pure),
        };
        assert_eq!(pq.to_string(), "() const && noexcept override = 0");
    }

    #[test]
    fn test_display_bit_field() {
        let decl = Declarator::NameBitField {
            decl_id: Some(name("flags")),
            size: Expression::NumberLiteral("3".into()),
        };
        assert_eq!(decl.to_string(), "flags : 3");
    }

    #[test]
    fn test_name_recurses_through_wrappers() {
        let decl = Declarator::Ptr {
            volatile: false,
            const_: false,
            attrs: AttributeList::default(),
            next: Box::new(named_declarator("argv")),
        };
        assert_eq!(decl.name().unwrap().to_string(), "argv");
    }
}
