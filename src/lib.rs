pub mod config;
pub mod parser;

pub use self::config::Config;
pub use self::parser::{DefinitionError, DefinitionParser};
