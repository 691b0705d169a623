//! The AST produced by the parser.
//!
//! Every node family is a closed set of variants, constructed bottom-up
//! during parsing and never mutated afterwards. Each node renders itself
//! back to canonical source text through `Display`; that rendering is stable
//! under re-parsing.

mod attribute;
mod declaration;
mod expression;
mod name;
mod template;
mod types;

pub use self::attribute::*;
pub use self::declaration::*;
pub use self::expression::*;
pub use self::name::*;
pub use self::template::*;
pub use self::types::*;
