use cppdecl::parser::ast::*;
use cppdecl::parser::{ExprOrType, XrefObject};
use cppdecl::{Config, DefinitionParser};

fn declaration(input: &str, object: &str, directive: &str) -> Declaration {
    let config = Config::default();
    let mut parser = DefinitionParser::new(input, &config);
    let decl = parser
        .parse_declaration(object.parse().unwrap(), directive.parse().unwrap())
        .unwrap_or_else(|e| panic!("parse error for {input:?}:\n{e}"));
    parser.assert_end(true).expect("trailing input");
    decl
}

fn expression(input: &str) -> Expression {
    let config = Config::default();
    let result = DefinitionParser::new(input, &config).parse_expression();
    match result {
        Ok(ExprOrType::Expr(e)) => e,
        Ok(ExprOrType::Type(t)) => panic!("{input:?} parsed as type: {t}"),
        Err(e) => panic!("parse error for {input:?}:\n{e}"),
    }
}

#[test]
fn test_main_signature() {
    let decl = declaration("int main(int argc, char *argv[])", "function", "function");
    let DeclarationInner::Function(ty) = &decl.declaration else {
        panic!("expected function declaration");
    };
    assert!(matches!(
        ty.decl_specs.trailing,
        Some(TrailingTypeSpec::Fundamental { ref names, .. }) if names == &["int".to_string()]
    ));
    assert_eq!(ty.name().unwrap().to_string(), "main");

    let Declarator::NameParamQual { param_qual, .. } = &ty.decl else {
        panic!("expected plain declarator");
    };
    let params = &param_qual.as_ref().unwrap().args;
    assert_eq!(params.len(), 2);

    // second parameter: char *argv[]
    let argv = params[1].arg.as_ref().unwrap();
    let Declarator::Ptr { next, .. } = &argv.ty.decl else {
        panic!("expected pointer declarator for argv");
    };
    let Declarator::NameParamQual {
        decl_id,
        array_ops,
        ..
    } = next.as_ref()
    else {
        panic!("expected name declarator for argv");
    };
    assert_eq!(decl_id.as_ref().unwrap().to_string(), "argv");
    assert_eq!(array_ops.len(), 1);
    assert!(array_ops[0].size.is_none());

    assert_eq!(decl.to_string(), "int main(int argc, char *argv[])");
}

#[test]
fn test_template_class_with_bases() {
    let decl = declaration(
        "template<typename T, int N = 42> class Array final : public Base<T>",
        "class",
        "class",
    );
    let prefix = decl.template_prefix.as_ref().unwrap();
    let templates = prefix.templates.as_ref().unwrap();
    assert_eq!(templates.len(), 1);
    let TemplateItem::Params(params) = &templates[0] else {
        panic!("expected parameter list");
    };
    assert_eq!(params.params.len(), 2);
    assert!(matches!(&params.params[0], TemplateParam::Type(data)
        if data.key == TypeParamKey::Typename && data.identifier.as_ref().unwrap().0 == "T"));
    let TemplateParam::NonType { param, .. } = &params.params[1] else {
        panic!("expected non-type parameter");
    };
    assert_eq!(param.to_string(), "int N = 42");

    let DeclarationInner::Class(class) = &decl.declaration else {
        panic!("expected class");
    };
    assert_eq!(class.name.to_string(), "Array");
    assert!(class.final_);
    assert_eq!(class.bases.len(), 1);
    let base = &class.bases[0];
    assert_eq!(base.visibility, Some(Visibility::Public));
    assert!(!base.virtual_);
    assert!(!base.pack);
    assert_eq!(base.name.to_string(), "Base<T>");
}

#[test]
fn test_literal_operator_function() {
    let decl = declaration(
        "void operator\"\"_km(long double value)",
        "function",
        "function",
    );
    let DeclarationInner::Function(ty) = &decl.declaration else {
        panic!("expected function");
    };
    let name = ty.name().unwrap();
    let IdentOrOp::Op(Operator::Literal(suffix)) = &name.names[0].ident_or_op else {
        panic!("expected literal operator, got {name}");
    };
    assert_eq!(suffix.0, "_km");
}

#[test]
fn test_literal_operator_xref() {
    let config = Config::default();
    let mut parser = DefinitionParser::new("operator\"\"_km", &config);
    let (obj, shorthand) = parser.parse_xref_object().expect("parse failed");
    assert!(shorthand);
    assert_eq!(obj.to_string(), "operator\"\"_km");
}

#[test]
fn test_binary_fold_expression() {
    let Expression::Fold(fold) = expression("(a + ... + b)") else {
        panic!("expected fold expression");
    };
    assert_eq!(fold.op, "+");
    assert_eq!(fold.left.unwrap().to_string(), "a");
    assert_eq!(fold.right.unwrap().to_string(), "b");
}

#[test]
fn test_decltype_auto_trailing_return() {
    let decl = declaration("decltype(auto) f() -> int", "function", "function");
    let DeclarationInner::Function(ty) = &decl.declaration else {
        panic!("expected function");
    };
    assert!(matches!(
        ty.decl_specs.trailing,
        Some(TrailingTypeSpec::DecltypeAuto)
    ));
    let Declarator::NameParamQual {
        decl_id,
        param_qual,
        ..
    } = &ty.decl
    else {
        panic!("expected plain declarator");
    };
    assert_eq!(decl_id.as_ref().unwrap().to_string(), "f");
    let pq = param_qual.as_ref().unwrap();
    assert!(pq.args.is_empty());
    assert_eq!(pq.trailing_return.as_ref().unwrap().to_string(), "int");
    assert_eq!(decl.to_string(), "decltype(auto) f() -> int");
}

#[test]
fn test_full_specialization() {
    let decl = declaration("template<> struct S<int>", "class", "struct");
    let prefix = decl.template_prefix.as_ref().unwrap();
    let templates = prefix.templates.as_ref().unwrap();
    assert_eq!(templates.len(), 1);
    let TemplateItem::Params(params) = &templates[0] else {
        panic!("expected parameter list");
    };
    assert!(params.params.is_empty());

    let name = decl.name().unwrap();
    assert_eq!(name.num_templates(), 1);
    assert_eq!(name.to_string(), "S<int>");
}

#[test]
fn test_member_pointer_member() {
    let decl = declaration("int C::*p", "member", "var");
    let DeclarationInner::Member(member) = &decl.declaration else {
        panic!("expected member");
    };
    assert!(matches!(member.ty.decl, Declarator::MemPtr { .. }));
    assert_eq!(decl.to_string(), "int C::*p");
}

#[test]
fn test_function_qualifiers() {
    let decl = declaration(
        "virtual void f() const && noexcept(true) override final = 0",
        "function",
        "function",
    );
    let DeclarationInner::Function(ty) = &decl.declaration else {
        panic!("expected function");
    };
    assert!(ty.decl_specs.left.virtual_);
    let Declarator::NameParamQual { param_qual, .. } = &ty.decl else {
        panic!("expected plain declarator");
    };
    let pq = param_qual.as_ref().unwrap();
    assert!(pq.const_);
    assert_eq!(pq.ref_qual, Some(RefQual::RValue));
    assert!(pq.exception_spec.as_ref().unwrap().expr.is_some());
    assert!(pq.override_);
    assert!(pq.final_);
    assert_eq!(pq.initializer, Some(ParamInitializer::Pure));
}

#[test]
fn test_constructor_has_no_return_type() {
    let decl = declaration("MyClass(int value)", "function", "function");
    let DeclarationInner::Function(ty) = &decl.declaration else {
        panic!("expected function");
    };
    assert!(ty.decl_specs.trailing.is_none());
    assert_eq!(ty.name().unwrap().to_string(), "MyClass");
}

#[test]
fn test_destructor() {
    let decl = declaration("~MyClass()", "function", "function");
    let DeclarationInner::Function(ty) = &decl.declaration else {
        panic!("expected function");
    };
    assert_eq!(ty.name().unwrap().to_string(), "~MyClass");
}

#[test]
fn test_conversion_operator() {
    let decl = declaration("operator bool() const", "function", "function");
    let DeclarationInner::Function(ty) = &decl.declaration else {
        panic!("expected function");
    };
    let name = ty.name().unwrap();
    assert!(matches!(
        &name.names[0].ident_or_op,
        IdentOrOp::Op(Operator::Cast(_))
    ));
}

#[test]
fn test_template_args_protect_greater_than() {
    let config = Config::default();
    let mut parser = DefinitionParser::new("Array<N + 1>", &config);
    let (obj, shorthand) = parser.parse_xref_object().expect("parse failed");
    assert!(shorthand);
    let XrefObject::Namespace(ns) = obj else {
        panic!("expected namespace-style xref");
    };
    let args = ns.name.names[0].template_args.as_ref().unwrap();
    assert_eq!(args.args.len(), 1);
    assert!(matches!(
        &args.args[0],
        TemplateArg::Constant(Expression::BinOp(chain)) if chain.ops == ["+"]
    ));
}

#[test]
fn test_sizeof_param_pack_requires_identifier() {
    let config = Config::default();
    assert!(DefinitionParser::new("sizeof...(std::x)", &config)
        .parse_expression()
        .is_err());
}

#[test]
fn test_concept_declaration_shape() {
    let decl = declaration(
        "template<typename T> Addable = requires(T a) { a + a; }",
        "concept",
        "concept",
    );
    let DeclarationInner::Concept(concept) = &decl.declaration else {
        panic!("expected concept");
    };
    assert_eq!(concept.name.to_string(), "Addable");
    assert!(concept.initializer.is_some());
}
