//! Precompiled token recognizers and keyword/operator tables.
//!
//! Every recognizer is anchored with `^` and compiled once; the parser
//! matches them at the cursor through [`super::state::ParseState::match_re`].

use once_cell::sync::Lazy;
use regex::Regex;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid token recognizer")
}

/// Identifiers, with an optional leading `~` for destructor names.
pub static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| re(r"^~?[a-zA-Z_][a-zA-Z0-9_]*\b"));

/// Suffix identifier of a user-defined literal. No leading word boundary:
/// it attaches directly to the literal before it.
pub static UDL_IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| re(r"^[a-zA-Z_][a-zA-Z0-9_]*\b"));

pub static VISIBILITY_RE: Lazy<Regex> = Lazy::new(|| re(r"^(public|protected|private)\b"));

// Integer literals, one recognizer per base, all with digit separators.
pub static BINARY_LITERAL_RE: Lazy<Regex> = Lazy::new(|| re(r"^0[bB][01]+(?:'[01]+)*"));
pub static HEX_LITERAL_RE: Lazy<Regex> =
    Lazy::new(|| re(r"^0[xX][0-9a-fA-F]+(?:'[0-9a-fA-F]+)*"));
pub static INTEGER_LITERAL_RE: Lazy<Regex> = Lazy::new(|| re(r"^[1-9][0-9]*(?:'[0-9]+)*"));
pub static OCTAL_LITERAL_RE: Lazy<Regex> = Lazy::new(|| re(r"^0[0-7]*(?:'[0-7]+)*"));

/// Unsigned and/or (long) long, in either order, at least one of them.
pub static INTEGERS_LITERAL_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| re(r"^(?:[uU](?:l{1,2}|L{1,2})?|(?:l{1,2}|L{1,2})[uU]?)\b"));

pub static FLOAT_LITERAL_RE: Lazy<Regex> = Lazy::new(|| {
    re(concat!(
        r"^[+-]?(?:",
        // decimal
        r"[0-9]+(?:'[0-9]+)*[eE][+-]?[0-9]+(?:'[0-9]+)*",
        r"|(?:[0-9]+(?:'[0-9]+)*)?\.[0-9]+(?:'[0-9]+)*(?:[eE][+-]?[0-9]+(?:'[0-9]+)*)?",
        r"|[0-9]+(?:'[0-9]+)*\.(?:[eE][+-]?[0-9]+(?:'[0-9]+)*)?",
        // hex
        r"|0[xX][0-9a-fA-F]+(?:'[0-9a-fA-F]+)*[pP][+-]?[0-9]+(?:'[0-9]+)*",
        r"|0[xX](?:[0-9a-fA-F]+(?:'[0-9a-fA-F]+)*)?\.[0-9a-fA-F]+(?:'[0-9a-fA-F]+)*(?:[pP][+-]?[0-9]+(?:'[0-9]+)*)?",
        r"|0[xX][0-9a-fA-F]+(?:'[0-9a-fA-F]+)*\.(?:[pP][+-]?[0-9]+(?:'[0-9]+)*)?",
        r")"
    ))
});

pub static FLOAT_LITERAL_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| re(r"^[fFlL]\b"));

/// Character literal: optional encoding prefix, then exactly one character
/// or escape sequence between single quotes. Group 1 is the prefix, group 2
/// the raw character data.
pub static CHAR_LITERAL_RE: Lazy<Regex> = Lazy::new(|| {
    re(concat!(
        r"^((?:u8)|u|U|L)?",
        r"'([^\\']|\\(?:['",
        "\"",
        r"?\\abfnrtv]|[0-7]{1,3}|x[0-9a-fA-F]{2}|u[0-9a-fA-F]{4}|U[0-9a-fA-F]{8}))'"
    ))
});

/// A whole quoted string or char literal, used by the fallback scanner.
pub static STRING_RE: Lazy<Regex> = Lazy::new(|| {
    re(concat!(
        r#"^[LuU8]*(?:"[^"\\]*(?:\\.[^"\\]*)*""#,
        r"|'[^'\\]*(?:\\.[^'\\]*)*')"
    ))
});

/// Overloadable operator tokens, longest alternatives first.
pub static OPERATOR_RE: Lazy<Regex> = Lazy::new(|| {
    re(concat!(
        r"^(?:\[\s*\]|\(\s*\)",
        r"|\+\+|--",
        r"|->\*|->|,",
        r"|(?:<<|>>)=?|&&|\|\|",
        r"|<=>",
        r"|[!<>=/*%+|&^~-]=?",
        r"|\b(?:and_eq|and|bitand|bitor|compl|not_eq|not|or_eq|or|xor_eq|xor)\b",
        r")"
    ))
});

/// Operators valid inside a fold expression.
pub static FOLD_OPERATOR_RE: Lazy<Regex> = Lazy::new(|| {
    re(concat!(
        r"^(?:->\*|\.\*|,",
        r"|(?:<<|>>)=?|&&|\|\|",
        r"|!=",
        r"|[<>=+\-*/%^&|]=?",
        r")"
    ))
});

/// Fundamental type specifier tokens, longest alternatives first.
pub static SIMPLE_TYPE_SPECIFIERS_RE: Lazy<Regex> = Lazy::new(|| {
    re(concat!(
        r"^(?:",
        r"auto|void|bool",
        r"|signed|unsigned",
        r"|short|long",
        r"|char8_t|char16_t|char32_t|char|wchar_t",
        r"|int",
        r"|__int64|__int128",
        r"|float|double",
        r"|__float80|_Float64x|__float128|_Float128",
        r"|_Complex|_Imaginary",
        r")\b"
    ))
});

/// Binary operator table, one row per precedence level, lowest first.
/// Word-spelled operators are matched with word boundaries.
pub const EXPRESSION_BIN_OPS: &[&[&str]] = &[
    &["||", "or"],
    &["&&", "and"],
    &["|", "bitor"],
    &["^", "xor"],
    &["&", "bitand"],
    &["==", "!=", "not_eq"],
    &["<=>", "<=", ">=", "<", ">"],
    &["<<", ">>"],
    &["+", "-"],
    &["*", "/", "%"],
    &[".*", "->*"],
];

pub const EXPRESSION_UNARY_OPS: &[&str] =
    &["++", "--", "*", "&", "+", "-", "!", "not", "~", "compl"];

pub const EXPRESSION_ASSIGNMENT_OPS: &[&str] = &[
    "=", "*=", "/=", "%=", "+=", "-=", ">>=", "<<=", "&=", "and_eq", "^=", "xor_eq", "|=",
    "or_eq",
];

/// `true` if `op` is spelled as a word and must be matched with `skip_word`.
pub fn is_word_op(op: &str) -> bool {
    op.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

pub const EXPLICIT_CAST_KEYWORDS: &[&str] = &[
    "dynamic_cast",
    "static_cast",
    "reinterpret_cast",
    "const_cast",
];

/// Reserved words, sorted for binary search.
pub const KEYWORDS: &[&str] = &[
    "alignas",
    "alignof",
    "and",
    "and_eq",
    "asm",
    "auto",
    "bitand",
    "bitor",
    "bool",
    "break",
    "case",
    "catch",
    "char",
    "char16_t",
    "char32_t",
    "char8_t",
    "class",
    "co_await",
    "co_return",
    "co_yield",
    "compl",
    "concept",
    "const",
    "const_cast",
    "consteval",
    "constexpr",
    "constinit",
    "continue",
    "decltype",
    "default",
    "delete",
    "do",
    "double",
    "dynamic_cast",
    "else",
    "enum",
    "explicit",
    "export",
    "extern",
    "false",
    "float",
    "for",
    "friend",
    "goto",
    "if",
    "inline",
    "int",
    "long",
    "mutable",
    "namespace",
    "new",
    "noexcept",
    "not",
    "not_eq",
    "nullptr",
    "operator",
    "or",
    "or_eq",
    "private",
    "protected",
    "public",
    "register",
    "reinterpret_cast",
    "requires",
    "return",
    "short",
    "signed",
    "sizeof",
    "static",
    "static_assert",
    "static_cast",
    "struct",
    "switch",
    "template",
    "this",
    "thread_local",
    "throw",
    "true",
    "try",
    "typedef",
    "typeid",
    "typename",
    "union",
    "unsigned",
    "using",
    "virtual",
    "void",
    "volatile",
    "wchar_t",
    "while",
    "xor",
    "xor_eq",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.binary_search(&word).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_sorted() {
        let mut sorted = KEYWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, KEYWORDS);
        assert!(is_keyword("operator"));
        assert!(!is_keyword("main"));
    }

    #[test]
    fn test_identifier_re() {
        assert_eq!(IDENTIFIER_RE.find("foo::bar").unwrap().as_str(), "foo");
        assert_eq!(IDENTIFIER_RE.find("~Foo()").unwrap().as_str(), "~Foo");
        assert!(IDENTIFIER_RE.find("42abc").is_none());
    }

    #[test]
    fn test_integer_suffix_re() {
        for s in ["u", "ul", "ull", "LLu", "lU", "ll"] {
            assert!(INTEGERS_LITERAL_SUFFIX_RE.is_match(s), "{s}");
        }
        // an lL mix is not a valid suffix
        assert!(!INTEGERS_LITERAL_SUFFIX_RE.is_match("lL"));
        // followed by an identifier character it is a UDL suffix instead
        assert!(!INTEGERS_LITERAL_SUFFIX_RE.is_match("u_km"));
    }

    #[test]
    fn test_float_re() {
        for s in ["1.5", "1.", ".5", "1e10", "1.5e-3", "0x1fp3", "0x.8p1"] {
            assert!(FLOAT_LITERAL_RE.is_match(s), "{s}");
        }
        assert!(FLOAT_LITERAL_RE.find("42").is_none());
    }

    #[test]
    fn test_char_literal_groups() {
        let caps = CHAR_LITERAL_RE.captures("u8'\\n' rest").unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "u8");
        assert_eq!(caps.get(2).unwrap().as_str(), "\\n");
        assert!(CHAR_LITERAL_RE.captures("'ab'").is_none());
    }

    #[test]
    fn test_operator_re_prefers_longest() {
        assert_eq!(OPERATOR_RE.find("<<=1").unwrap().as_str(), "<<=");
        assert_eq!(OPERATOR_RE.find("<=>").unwrap().as_str(), "<=>");
        assert_eq!(OPERATOR_RE.find("->*x").unwrap().as_str(), "->*");
        assert_eq!(OPERATOR_RE.find("[ ]").unwrap().as_str(), "[ ]");
    }

    #[test]
    fn test_simple_type_specifiers_re() {
        assert_eq!(
            SIMPLE_TYPE_SPECIFIERS_RE.find("char8_t x").unwrap().as_str(),
            "char8_t"
        );
        assert_eq!(SIMPLE_TYPE_SPECIFIERS_RE.find("charlie"), None);
    }
}
