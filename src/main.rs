use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::Colorize;
use cppdecl::parser::ast::{DirectiveType, ObjectType};
use cppdecl::{Config, DefinitionParser};

/// Parse a C++ declaration, expression or cross-reference target and print
/// the resulting AST.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// The definition to parse, e.g. "int main(int argc, char *argv[])"
    input: String,

    /// Object kind: class, union, function, member, type, concept, enum,
    /// enumerator
    #[arg(short, long, default_value = "function")]
    object_type: String,

    /// Directive kind; defaults to the object kind
    #[arg(short, long)]
    directive_type: Option<String>,

    /// Parse as an expression (or type-id) instead of a declaration
    #[arg(long)]
    expression: bool,

    /// Parse as a namespace object
    #[arg(long)]
    namespace: bool,

    /// Parse as a cross-reference target
    #[arg(long)]
    xref: bool,

    /// Print the AST as JSON instead of the re-rendered declaration
    #[arg(long)]
    json: bool,

    /// Identifiers to treat as attributes
    #[arg(long = "id-attribute")]
    id_attributes: Vec<String>,

    /// Identifiers to treat as attributes with a parenthesized argument
    #[arg(long = "paren-attribute")]
    paren_attributes: Vec<String>,

    /// Disable the fallback expression scanner
    #[arg(long)]
    no_fallback: bool,
}

fn run(cli: &Cli) -> Result<(String, String)> {
    let config = Config {
        id_attributes: cli.id_attributes.clone(),
        paren_attributes: cli.paren_attributes.clone(),
        allow_fallback_expression_parsing: !cli.no_fallback,
    };
    let mut parser = DefinitionParser::new(&cli.input, &config);

    if cli.expression {
        let parsed = parser.parse_expression()?;
        return Ok((parsed.to_string(), serde_json::to_string_pretty(&parsed)?));
    }
    if cli.namespace {
        let parsed = parser.parse_namespace_object()?;
        parser.assert_end(false)?;
        return Ok((parsed.to_string(), serde_json::to_string_pretty(&parsed)?));
    }
    if cli.xref {
        let (parsed, _shorthand) = parser.parse_xref_object()?;
        return Ok((parsed.to_string(), serde_json::to_string_pretty(&parsed)?));
    }

    let object_type: ObjectType = cli
        .object_type
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let directive = cli
        .directive_type
        .clone()
        .unwrap_or_else(|| cli.object_type.clone());
    let directive_type: DirectiveType = directive.parse().map_err(|e: String| anyhow!(e))?;
    let parsed = parser.parse_declaration(object_type, directive_type)?;
    parser.assert_end(true)?;
    Ok((parsed.to_string(), serde_json::to_string_pretty(&parsed)?))
}

fn main() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .context("could not set up logging")?;

    let cli = Cli::parse();
    match run(&cli) {
        Ok((rendered, json)) => {
            if cli.json {
                println!("{json}");
            } else {
                println!("{rendered}");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
