//! Round-trip and stability properties: the rendered form of every accepted
//! parse re-parses to an equal AST, and the JSON serialization is stable.

use std::cell::RefCell;

use cppdecl::parser::ast::{Declaration, DirectiveType, ObjectType};
use cppdecl::parser::ExprOrType;
use cppdecl::{Config, DefinitionParser};

fn parse(input: &str, object: ObjectType, directive: DirectiveType) -> Declaration {
    let config = Config::default();
    let mut parser = DefinitionParser::new(input, &config);
    let decl = parser
        .parse_declaration(object, directive)
        .unwrap_or_else(|e| panic!("parse error for {input:?}:\n{e}"));
    parser.assert_end(true).expect("trailing input");
    decl
}

fn assert_declaration_round_trip(input: &str, object: &str, directive: &str) {
    let object: ObjectType = object.parse().unwrap();
    let directive: DirectiveType = directive.parse().unwrap();
    let first = parse(input, object, directive);
    let printed = first.to_string();
    let second = parse(&printed, object, directive);
    assert_eq!(
        first, second,
        "printing is not stable for {input:?} (printed as {printed:?})"
    );
}

#[test]
fn test_declaration_round_trips() {
    for (input, object, directive) in [
        ("int main(int argc, char *argv[])", "function", "function"),
        ("decltype(auto) f() -> int", "function", "function"),
        (
            "template<typename T, int N = 42> class Array final : public Base<T>",
            "class",
            "class",
        ),
        ("template<> struct S<int>", "class", "struct"),
        ("void operator\"\"_km(long double value)", "function", "function"),
        ("operator bool() const", "function", "function"),
        ("virtual void f() const && noexcept override = 0", "function", "function"),
        ("static constexpr int limit = 42", "member", "var"),
        ("unsigned flags : 3", "member", "member"),
        ("int buf[N][4]", "member", "var"),
        ("int C::*p", "member", "var"),
        ("void (*callback)(int, double)", "member", "var"),
        ("Map = std::map<int, double>", "type", "type"),
        ("int IntAlias", "type", "type"),
        ("Value", "union", "union"),
        ("Color : unsigned char", "enum", "enum-class"),
        ("Red = 1 << 0", "enumerator", "enumerator"),
        (
            "template<typename... Args> void log(const char* fmt, Args&&... args)",
            "function",
            "function",
        ),
        (
            "template<typename T> void sort(T& c) requires Sortable<T>",
            "function",
            "function",
        ),
        ("explicit Wrapper(int v) noexcept", "function", "function"),
        ("auto size() const -> std::size_t", "function", "function"),
    ] {
        assert_declaration_round_trip(input, object, directive);
    }
}

#[test]
fn test_expression_round_trips() {
    let config = Config::default();
    for input in [
        "a + b * c - d",
        "a and b or c",
        "(pack + ...)",
        "(... * pack)",
        "(a << ... << b)",
        "cond ? t : f",
        "arr[i]->field.next++",
        "f({1, {2, 3},}, x...)",
        "sizeof(long long)",
        "alignof(int)",
        "typeid(x + 1)",
        "reinterpret_cast<void*>(p)",
        "::new Node{1, 2}",
        "delete[] buffer",
        "noexcept(g())",
        "~mask",
        "\"text\"_fmt",
        "L'x'",
        "0x1F'FFull",
    ] {
        let first = match DefinitionParser::new(input, &config).parse_expression() {
            Ok(ExprOrType::Expr(e)) => e,
            Ok(ExprOrType::Type(t)) => panic!("{input:?} parsed as type: {t}"),
            Err(e) => panic!("parse error for {input:?}:\n{e}"),
        };
        let printed = first.to_string();
        let second = match DefinitionParser::new(&printed, &config).parse_expression() {
            Ok(ExprOrType::Expr(e)) => e,
            other => panic!("reparse of {printed:?} changed shape: {other:?}"),
        };
        assert_eq!(first, second, "printing is not stable for {input:?}");
    }
}

#[test]
fn test_type_round_trips() {
    let config = Config::default();
    for input in [
        "int*",
        "const char*",
        "int&&",
        "std::vector<int>",
        "void (*)(int)",
        "unsigned long long",
        "decltype(a + b)",
    ] {
        let first = match DefinitionParser::new(input, &config).parse_expression() {
            Ok(ExprOrType::Type(t)) => t,
            Ok(ExprOrType::Expr(e)) => panic!("{input:?} parsed as expression: {e}"),
            Err(e) => panic!("parse error for {input:?}:\n{e}"),
        };
        let printed = first.to_string();
        let second = match DefinitionParser::new(&printed, &config).parse_expression() {
            Ok(ExprOrType::Type(t)) => t,
            other => panic!("reparse of {printed:?} changed shape: {other:?}"),
        };
        assert_eq!(first, second, "printing is not stable for {input:?}");
    }
}

#[test]
fn test_fundamental_type_permutations_share_canonical_form() {
    let config = Config::default();
    let mut canonicals = vec![];
    for input in [
        "unsigned long long int x",
        "long long unsigned int x",
        "int long unsigned long x",
    ] {
        let mut parser = DefinitionParser::new(input, &config);
        let decl = parser
            .parse_declaration("member".parse().unwrap(), "var".parse().unwrap())
            .expect("parse failed");
        let json = serde_json::to_value(&decl).expect("serialize failed");
        let canonical = json
            .pointer("/declaration/Member/ty/decl_specs/trailing/Fundamental/canonical")
            .expect("canonical sequence missing")
            .clone();
        canonicals.push(canonical);
    }
    assert_eq!(canonicals[0], canonicals[1]);
    assert_eq!(canonicals[0], canonicals[2]);
}

#[test]
fn test_json_serialization_is_stable() {
    let decl = parse(
        "template<typename T> void sort(T& c) requires Sortable<T>",
        ObjectType::Function,
        DirectiveType::Function,
    );
    let json = serde_json::to_string(&decl).expect("serialize failed");
    let back: Declaration = serde_json::from_str(&json).expect("deserialize failed");
    assert_eq!(decl, back);
}

#[test]
fn test_fallback_in_array_size_warns_once() {
    let config = Config::default();
    let warnings = RefCell::new(vec![]);
    let mut parser = DefinitionParser::new("int buf[!@#]", &config)
        .with_warning_sink(|msg| warnings.borrow_mut().push(msg.to_string()));
    let decl = parser
        .parse_declaration(ObjectType::Member, DirectiveType::Var)
        .expect("parse failed");
    assert_eq!(warnings.borrow().len(), 1);
    assert!(warnings.borrow()[0].contains("fallback"));
    assert_eq!(decl.to_string(), "int buf[!@#]");
}

#[test]
fn test_fallback_disabled_fails_instead() {
    let config = Config {
        allow_fallback_expression_parsing: false,
        ..Config::default()
    };
    let mut parser = DefinitionParser::new("int buf[!@#]", &config);
    assert!(parser
        .parse_declaration(ObjectType::Member, DirectiveType::Var)
        .is_err());
}

#[test]
fn test_error_tree_names_all_alternatives() {
    let config = Config::default();
    let err = DefinitionParser::new("template<typename T> +", &config)
        .parse_declaration(ObjectType::Type, DirectiveType::Type)
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("Error in type declaration."), "{text}");
    assert!(text.contains("Invalid C++ declaration"), "{text}");

    let err = DefinitionParser::new("int + 3", &config)
        .parse_declaration(ObjectType::Type, DirectiveType::Type)
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("If typedef-like declaration:"), "{text}");
    assert!(text.contains("If type alias or template alias:"), "{text}");
}

#[test]
fn test_configured_attributes_end_to_end() {
    let config = Config {
        id_attributes: vec!["MY_API".into()],
        paren_attributes: vec!["MY_ALIGN".into()],
        ..Config::default()
    };
    let mut parser = DefinitionParser::new("MY_API MY_ALIGN(8) int x", &config);
    let decl = parser
        .parse_declaration(ObjectType::Member, DirectiveType::Var)
        .expect("parse failed");
    assert_eq!(decl.to_string(), "MY_API MY_ALIGN(8) int x");
}
