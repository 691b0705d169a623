use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::{Expression, Identifier, NestedName, Type, TypeWithInit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeParamKey {
    Typename,
    Class,
}

impl Display for TypeParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeParamKey::Typename => "typename",
            TypeParamKey::Class => "class",
        })
    }
}

/// The common tail of type and template-template parameters:
/// `typename|class ...[opt] identifier[opt] = default[opt]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateKeyParamPackIdDefault {
    pub key: TypeParamKey,
    pub identifier: Option<Identifier>,
    pub parameter_pack: bool,
    pub default: Option<Type>,
}

impl Display for TemplateKeyParamPackIdDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt(f)?;
        if self.parameter_pack {
            f.write_str("...")?;
        }
        if let Some(identifier) = &self.identifier {
            write!(f, " {identifier}")?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// A constrained type parameter with a type default, e.g. `C T = int&`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstrainedTypeWithInit {
    pub ty: Type,
    pub type_init: Type,
}

impl Display for ConstrainedTypeWithInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.ty, self.type_init)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NonTypeParam {
    TypeWithInit(TypeWithInit),
    Constrained(ConstrainedTypeWithInit),
}

impl Display for NonTypeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonTypeParam::TypeWithInit(twi) => twi.fmt(f),
            NonTypeParam::Constrained(c) => c.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateParam {
    Type(TemplateKeyParamPackIdDefault),
    TemplateType {
        nested_params: Box<TemplateParams>,
        data: TemplateKeyParamPackIdDefault,
    },
    NonType {
        param: NonTypeParam,
        parameter_pack: bool,
    },
}

impl Display for TemplateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateParam::Type(data) => data.fmt(f),
            TemplateParam::TemplateType {
                nested_params,
                data,
            } => write!(f, "{nested_params} {data}"),
            TemplateParam::NonType {
                param,
                parameter_pack,
            } => {
                param.fmt(f)?;
                if *parameter_pack {
                    f.write_str("...")?;
                }
                Ok(())
            }
        }
    }
}

/// A `template<...>` parameter list with an optional requires-clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParams {
    pub params: Vec<TemplateParam>,
    pub requires_clause: Option<RequiresClause>,
}

impl Display for TemplateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("template<")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            param.fmt(f)?;
        }
        f.write_str(">")?;
        if let Some(clause) = &self.requires_clause {
            write!(f, " {clause}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateIntroductionParameter {
    pub identifier: Identifier,
    pub parameter_pack: bool,
}

impl Display for TemplateIntroductionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parameter_pack {
            f.write_str("...")?;
        }
        self.identifier.fmt(f)
    }
}

/// A template introduction, e.g. `Sortable{T, ...Rest}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateIntroduction {
    pub concept: NestedName,
    pub params: Vec<TemplateIntroductionParameter>,
}

impl Display for TemplateIntroduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.concept.fmt(f)?;
        f.write_str("{")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            param.fmt(f)?;
        }
        f.write_str("}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateItem {
    Params(TemplateParams),
    Introduction(TemplateIntroduction),
}

impl Display for TemplateItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateItem::Params(params) => params.fmt(f),
            TemplateItem::Introduction(intro) => intro.fmt(f),
        }
    }
}

/// The ordered template parameter lists and introductions in front of a
/// declaration. `templates == None` is the sentinel for a member
/// instantiation (a member whose outer templates are already concrete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDeclarationPrefix {
    pub templates: Option<Vec<TemplateItem>>,
}

impl TemplateDeclarationPrefix {
    pub fn num_params(&self) -> usize {
        self.templates.as_ref().map_or(0, Vec::len)
    }
}

impl Display for TemplateDeclarationPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(templates) = &self.templates {
            for (i, item) in templates.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                item.fmt(f)?;
            }
        }
        Ok(())
    }
}

/// A requires-clause: `requires` over `&&`/`||`-joined primary expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiresClause {
    pub expr: Expression,
}

impl Display for RequiresClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "requires {}", self.expr)
    }
}
