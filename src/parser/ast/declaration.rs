use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    AttributeList, Initializer, NestedName, RequiresClause, TemplateDeclarationPrefix, Type,
    TypeUsing, TypeWithInit,
};

/// The kind of entity a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectType {
    Class,
    Union,
    Function,
    Member,
    Type,
    Concept,
    Enum,
    Enumerator,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Class => "class",
            ObjectType::Union => "union",
            ObjectType::Function => "function",
            ObjectType::Member => "member",
            ObjectType::Type => "type",
            ObjectType::Concept => "concept",
            ObjectType::Enum => "enum",
            ObjectType::Enumerator => "enumerator",
        }
    }
}

impl Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(ObjectType::Class),
            "union" => Ok(ObjectType::Union),
            "function" => Ok(ObjectType::Function),
            "member" => Ok(ObjectType::Member),
            "type" => Ok(ObjectType::Type),
            "concept" => Ok(ObjectType::Concept),
            "enum" => Ok(ObjectType::Enum),
            "enumerator" => Ok(ObjectType::Enumerator),
            _ => Err(format!("unknown object type: {s}")),
        }
    }
}

/// The directive a declaration was written under. Mostly a display concern,
/// but `enum-struct`/`enum-class` decide the scoped-ness of an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectiveType {
    Class,
    Struct,
    Union,
    Function,
    Member,
    Var,
    Type,
    Concept,
    Enum,
    EnumStruct,
    EnumClass,
    Enumerator,
}

impl DirectiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveType::Class => "class",
            DirectiveType::Struct => "struct",
            DirectiveType::Union => "union",
            DirectiveType::Function => "function",
            DirectiveType::Member => "member",
            DirectiveType::Var => "var",
            DirectiveType::Type => "type",
            DirectiveType::Concept => "concept",
            DirectiveType::Enum => "enum",
            DirectiveType::EnumStruct => "enum-struct",
            DirectiveType::EnumClass => "enum-class",
            DirectiveType::Enumerator => "enumerator",
        }
    }
}

impl Display for DirectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirectiveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(DirectiveType::Class),
            "struct" => Ok(DirectiveType::Struct),
            "union" => Ok(DirectiveType::Union),
            "function" => Ok(DirectiveType::Function),
            "member" => Ok(DirectiveType::Member),
            "var" => Ok(DirectiveType::Var),
            "type" => Ok(DirectiveType::Type),
            "concept" => Ok(DirectiveType::Concept),
            "enum" => Ok(DirectiveType::Enum),
            "enum-struct" => Ok(DirectiveType::EnumStruct),
            "enum-class" => Ok(DirectiveType::EnumClass),
            "enumerator" => Ok(DirectiveType::Enumerator),
            _ => Err(format!("unknown directive type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        })
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "protected" => Ok(Visibility::Protected),
            "private" => Ok(Visibility::Private),
            _ => Err(format!("unknown visibility: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseClass {
    pub name: NestedName,
    pub visibility: Option<Visibility>,
    pub virtual_: bool,
    pub pack: bool,
}

impl Display for BaseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(visibility) = self.visibility {
            write!(f, "{visibility} ")?;
        }
        if self.virtual_ {
            f.write_str("virtual ")?;
        }
        self.name.fmt(f)?;
        if self.pack {
            f.write_str("...")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub name: NestedName,
    pub final_: bool,
    pub bases: Vec<BaseClass>,
    pub attrs: AttributeList,
}

impl Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.attrs.is_empty() {
            write!(f, "{} ", self.attrs)?;
        }
        self.name.fmt(f)?;
        if self.final_ {
            f.write_str(" final")?;
        }
        for (i, base) in self.bases.iter().enumerate() {
            f.write_str(if i == 0 { " : " } else { ", " })?;
            base.fmt(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Union {
    pub name: NestedName,
    pub attrs: AttributeList,
}

impl Display for Union {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.attrs.is_empty() {
            write!(f, "{} ", self.attrs)?;
        }
        self.name.fmt(f)
    }
}

/// The scoped-ness of an enum, derived from the directive it was written
/// under. Not part of the rendered declaration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnumScoped {
    Struct,
    Class,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enum {
    pub name: NestedName,
    pub scoped: Option<EnumScoped>,
    pub underlying_type: Option<Type>,
    pub attrs: AttributeList,
}

impl Display for Enum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.attrs.is_empty() {
            write!(f, "{} ", self.attrs)?;
        }
        self.name.fmt(f)?;
        if let Some(underlying) = &self.underlying_type {
            write!(f, " : {underlying}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: NestedName,
    pub init: Option<Initializer>,
    pub attrs: AttributeList,
}

impl Display for Enumerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)?;
        if !self.attrs.is_empty() {
            write!(f, " {}", self.attrs)?;
        }
        if let Some(init) = &self.init {
            init.fmt(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub name: NestedName,
    pub initializer: Option<Initializer>,
}

impl Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)?;
        if let Some(initializer) = &self.initializer {
            initializer.fmt(f)?;
        }
        Ok(())
    }
}

/// The object-kind-specific payload of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationInner {
    Type(Type),
    TypeUsing(TypeUsing),
    Concept(Concept),
    Member(TypeWithInit),
    Function(Type),
    Class(Class),
    Union(Union),
    Enum(Enum),
    Enumerator(Enumerator),
}

impl DeclarationInner {
    /// The declared name, used for the template-prefix consistency check.
    pub fn name(&self) -> Option<&NestedName> {
        match self {
            DeclarationInner::Type(ty) | DeclarationInner::Function(ty) => ty.name(),
            DeclarationInner::TypeUsing(alias) => Some(&alias.name),
            DeclarationInner::Concept(concept) => Some(&concept.name),
            DeclarationInner::Member(twi) => twi.name(),
            DeclarationInner::Class(class) => Some(&class.name),
            DeclarationInner::Union(union) => Some(&union.name),
            DeclarationInner::Enum(e) => Some(&e.name),
            DeclarationInner::Enumerator(e) => Some(&e.name),
        }
    }
}

impl Display for DeclarationInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationInner::Type(ty) | DeclarationInner::Function(ty) => ty.fmt(f),
            DeclarationInner::TypeUsing(alias) => alias.fmt(f),
            DeclarationInner::Concept(concept) => concept.fmt(f),
            DeclarationInner::Member(twi) => twi.fmt(f),
            DeclarationInner::Class(class) => class.fmt(f),
            DeclarationInner::Union(union) => union.fmt(f),
            DeclarationInner::Enum(e) => e.fmt(f),
            DeclarationInner::Enumerator(e) => e.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub object_type: ObjectType,
    pub directive_type: DirectiveType,
    pub visibility: Option<Visibility>,
    pub template_prefix: Option<TemplateDeclarationPrefix>,
    pub declaration: DeclarationInner,
    pub trailing_requires_clause: Option<RequiresClause>,
    pub semicolon: bool,
}

impl Declaration {
    pub fn name(&self) -> Option<&NestedName> {
        self.declaration.name()
    }
}

impl Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(visibility) = self.visibility {
            write!(f, "{visibility} ")?;
        }
        if let Some(prefix) = &self.template_prefix {
            let rendered = prefix.to_string();
            if !rendered.is_empty() {
                write!(f, "{rendered} ")?;
            }
        }
        self.declaration.fmt(f)?;
        if let Some(clause) = &self.trailing_requires_clause {
            write!(f, " {clause}")?;
        }
        if self.semicolon {
            f.write_str(";")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: NestedName,
    pub template_prefix: Option<TemplateDeclarationPrefix>,
}

impl Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.template_prefix {
            let rendered = prefix.to_string();
            if !rendered.is_empty() {
                write!(f, "{rendered} ")?;
            }
        }
        self.name.fmt(f)
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

    #[test]
    fn test_object_type_round_trip() {
        for s in [
            "class",
            "union",
            "function",
            "member",
            "type",
            "concept",
            "enum",
            "enumerator",
        ] {
            assert_eq!(s.parse::<ObjectType>().unwrap().as_str(), s);
        }
        assert!("namespace".parse::<ObjectType>().is_err());
    }

    #[test]
    fn test_directive_type_round_trip() {
        for s in ["struct", "var", "enum-class", "enum-struct"] {
            assert_eq!(s.parse::<DirectiveType>().unwrap().as_str(), s);
        }
        assert!("members".parse::<DirectiveType>().is_err());
    }

    #[test]
    fn test_display_class_with_bases() {
        let class = Class {
            name: name("Derived"),
            final_: true,
            bases: vec![
                BaseClass {
                    name: name("A"),
                    visibility: Some(Visibility::Public),
                    virtual_: false,
                    pack: false,
                },
                BaseClass {
                    name: name("B"),
                    visibility: None,
                    virtual_: true,
                    pack: true,
                },
            ],
            attrs: AttributeList::default(),
        };
        assert_eq!(class.to_string(), "Derived final : public A, virtual B...");
    }
}
