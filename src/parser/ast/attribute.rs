use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// One attribute as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attribute {
    /// C++11 style: `[[` balanced-token-seq `]]`.
    Cpp(String),
    /// GNU style: `__attribute__((` balanced-token-seq `))`.
    Gnu(String),
    /// A configured identifier attribute.
    Id(String),
    /// A configured identifier attribute with a parenthesized argument; the
    /// argument is stored with its parentheses.
    Paren { id: String, arg: String },
}

impl Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Cpp(arg) => write!(f, "[[{arg}]]"),
            Attribute::Gnu(arg) => write!(f, "__attribute__(({arg}))"),
            Attribute::Id(id) => f.write_str(id),
            Attribute::Paren { id, arg } => write!(f, "{id}{arg}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeList(pub Vec<Attribute>);

impl AttributeList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for AttributeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            attr.fmt(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let attrs = AttributeList(vec![
            Attribute::Cpp("noreturn".into()),
            Attribute::Paren {
                id: "aligned".into(),
                arg: "(8)".into(),
            },
        ]);
        assert_eq!(attrs.to_string(), "[[noreturn]] aligned(8)");
        assert!(!attrs.is_empty());
        assert!(AttributeList::default().is_empty());
    }
}
