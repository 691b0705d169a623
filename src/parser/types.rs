use super::ast::{
    ArrayOp, AttributeList, ConstrainedTypeWithInit, Declarator, DeclSpecs, DeclSpecsSimple,
    ExplicitSpec, Expression, FunctionParameter, IdentOrOp, Identifier, Initializer,
    NestedName, NestedNameElement, NoexceptSpec, NonTypeParam, ParamInitializer,
    ParametersAndQualifiers, Placeholder, RefQual, StorageClass, TrailingTypeSpec, Type,
    TypeSpecPrefix, TypeUsing, TypeWithInit,
};
use super::tokens::{IDENTIFIER_RE, SIMPLE_TYPE_SPECIFIERS_RE};
use super::{DefinitionParser, NamedMode, Outer, ParamMode, Result};

impl<'a> DefinitionParser<'a> {
    /// Sweep fundamental type specifier tokens in any order, validate the
    /// combination, and produce both the raw and the canonical sequence.
    pub(crate) fn parse_simple_type_specifiers(&mut self) -> Result<Option<TrailingTypeSpec>> {
        let mut modifier: Option<&str> = None;
        let mut signedness: Option<&str> = None;
        let mut width: Vec<&str> = vec![];
        let mut typ: Option<&str> = None;
        let mut names: Vec<String> = vec![];

        self.skip_ws();
        while self.match_re(&SIMPLE_TYPE_SPECIFIERS_RE) {
            let t = self.matched_text();
            names.push(t.to_string());
            match t {
                "auto" | "void" | "bool" | "char" | "wchar_t" | "char8_t" | "char16_t"
                | "char32_t" | "int" | "__int64" | "__int128" | "float" | "double"
                | "__float80" | "_Float64x" | "__float128" | "_Float128" => {
                    if let Some(prev) = typ {
                        return self.fail(&format!("Can not have both {t} and {prev}."));
                    }
                    typ = Some(t);
                }
                "signed" | "unsigned" => {
                    if let Some(prev) = signedness {
                        return self.fail(&format!("Can not have both {t} and {prev}."));
                    }
                    signedness = Some(t);
                }
                "short" => {
                    if !width.is_empty() {
                        return self.fail(&format!("Can not have both {t} and {}.", width[0]));
                    }
                    width.push(t);
                }
                "long" => {
                    if !width.is_empty() && width[0] != "long" {
                        return self.fail(&format!("Can not have both {t} and {}.", width[0]));
                    }
                    if width.len() == 2 {
                        return self.fail("Can not have more than two longs.");
                    }
                    width.push(t);
                }
                "_Imaginary" | "_Complex" => {
                    if let Some(prev) = modifier {
                        return self.fail(&format!("Can not have both {t} and {prev}."));
                    }
                    modifier = Some(t);
                }
                _ => {}
            }
            self.skip_ws();
        }
        if names.is_empty() {
            return Ok(None);
        }

        match typ {
            Some(
                t @ ("auto" | "void" | "bool" | "wchar_t" | "char8_t" | "char16_t" | "char32_t"
                | "__float80" | "_Float64x" | "__float128" | "_Float128"),
            ) => {
                if let Some(modifier) = modifier {
                    return self.fail(&format!("Can not have both {t} and {modifier}."));
                }
                if let Some(signedness) = signedness {
                    return self.fail(&format!("Can not have both {t} and {signedness}."));
                }
                if !width.is_empty() {
                    return self.fail(&format!("Can not have both {t} and {}.", width.join(" ")));
                }
            }
            Some(t @ "char") => {
                if let Some(modifier) = modifier {
                    return self.fail(&format!("Can not have both {t} and {modifier}."));
                }
                if !width.is_empty() {
                    return self.fail(&format!("Can not have both {t} and {}.", width.join(" ")));
                }
            }
            Some(t @ "int") => {
                if let Some(modifier) = modifier {
                    return self.fail(&format!("Can not have both {t} and {modifier}."));
                }
            }
            Some(t @ ("__int64" | "__int128")) => {
                if let Some(modifier) = modifier {
                    return self.fail(&format!("Can not have both {t} and {modifier}."));
                }
                if !width.is_empty() {
                    return self.fail(&format!("Can not have both {t} and {}.", width.join(" ")));
                }
            }
            Some(t @ "float") => {
                if let Some(signedness) = signedness {
                    return self.fail(&format!("Can not have both {t} and {signedness}."));
                }
                if !width.is_empty() {
                    return self.fail(&format!("Can not have both {t} and {}.", width.join(" ")));
                }
            }
            Some(t @ "double") => {
                if let Some(signedness) = signedness {
                    return self.fail(&format!("Can not have both {t} and {signedness}."));
                }
                if width.len() > 1 || width.first().is_some_and(|w| *w != "long") {
                    return self.fail(&format!("Can not have both {t} and {}.", width.join(" ")));
                }
            }
            None => {
                if let Some(modifier) = modifier {
                    return self
                        .fail(&format!("Can not have {modifier} without a floating point type."));
                }
            }
            Some(_) => {}
        }

        let mut canonical: Vec<String> = vec![];
        if let Some(modifier) = modifier {
            canonical.push(modifier.to_string());
        }
        if let Some(signedness) = signedness {
            canonical.push(signedness.to_string());
        }
        canonical.extend(width.iter().map(|w| w.to_string()));
        if let Some(typ) = typ {
            canonical.push(typ.to_string());
        }
        Ok(Some(TrailingTypeSpec::Fundamental { names, canonical }))
    }

    /// Fundamental types, `decltype(...)`, `decltype(auto)`, or an
    /// elaborated name with an optional placeholder.
    pub(crate) fn parse_trailing_type_spec(&mut self) -> Result<TrailingTypeSpec> {
        self.skip_ws();
        if let Some(fundamental) = self.parse_simple_type_specifiers()? {
            return Ok(fundamental);
        }

        self.skip_ws();
        if self.skip_word_and_ws("decltype") {
            if !self.skip_string_and_ws("(") {
                return self.fail("Expected '(' after 'decltype'.");
            }
            if self.skip_word_and_ws("auto") {
                if !self.skip_string(")") {
                    return self.fail("Expected ')' after 'decltype(auto'.");
                }
                return Ok(TrailingTypeSpec::DecltypeAuto);
            }
            let expr = self.parse_comma_expression()?;
            self.skip_ws();
            if !self.skip_string(")") {
                return self.fail("Expected ')' after 'decltype(<expr>'.");
            }
            return Ok(TrailingTypeSpec::Decltype(expr));
        }

        let mut prefix = None;
        self.skip_ws();
        for (keyword, value) in [
            ("class", TypeSpecPrefix::Class),
            ("struct", TypeSpecPrefix::Struct),
            ("enum", TypeSpecPrefix::Enum),
            ("union", TypeSpecPrefix::Union),
            ("typename", TypeSpecPrefix::Typename),
        ] {
            if self.skip_word_and_ws(keyword) {
                prefix = Some(value);
                break;
            }
        }
        let name = self.parse_nested_name()?;
        self.skip_ws();
        let mut placeholder = None;
        if self.skip_word("auto") {
            placeholder = Some(Placeholder::Auto);
        } else if self.skip_word_and_ws("decltype") {
            if !self.skip_string_and_ws("(") {
                return self.fail("Expected '(' after 'decltype' in placeholder type specifier.");
            }
            if !self.skip_word_and_ws("auto") {
                return self.fail("Expected 'auto' after 'decltype(' in placeholder type specifier.");
            }
            if !self.skip_string_and_ws(")") {
                return self
                    .fail("Expected ')' after 'decltype(auto' in placeholder type specifier.");
            }
            placeholder = Some(Placeholder::DecltypeAuto);
        }
        Ok(TrailingTypeSpec::Name {
            prefix,
            name,
            placeholder,
        })
    }

    pub(crate) fn parse_parameters_and_qualifiers(
        &mut self,
        param_mode: ParamMode,
    ) -> Result<Option<ParametersAndQualifiers>> {
        if param_mode == ParamMode::New {
            return Ok(None);
        }
        self.skip_ws();
        if !self.skip_string("(") {
            if param_mode == ParamMode::Function {
                return self.fail("Expecting \"(\" in parameters-and-qualifiers.");
            }
            return Ok(None);
        }
        let mut args = vec![];
        self.skip_ws();
        if !self.skip_string(")") {
            loop {
                self.skip_ws();
                if self.skip_string("...") {
                    args.push(FunctionParameter {
                        arg: None,
                        ellipsis: true,
                    });
                    self.skip_ws();
                    if !self.skip_string(")") {
                        return self
                            .fail("Expected \")\" after \"...\" in parameters-and-qualifiers.");
                    }
                    break;
                }
                // function arguments can always be named, even in function
                // pointers and similar
                let arg = self.parse_type_with_init(NamedMode::Single, None)?;
                args.push(FunctionParameter {
                    arg: Some(arg),
                    ellipsis: false,
                });

                self.skip_ws();
                if self.skip_string(",") {
                    continue;
                }
                if self.skip_string(")") {
                    break;
                }
                let got = self
                    .current_char()
                    .map_or("EOF".to_string(), String::from);
                return self.fail(&format!(
                    "Expecting \",\" or \")\" in parameters-and-qualifiers, got \"{got}\"."
                ));
            }
        }

        self.skip_ws();
        let mut const_ = self.skip_word_and_ws("const");
        let volatile = self.skip_word_and_ws("volatile");
        if !const_ {
            // they can be permuted
            const_ = self.skip_word_and_ws("const");
        }

        let mut ref_qual = None;
        if self.skip_string("&&") {
            ref_qual = Some(RefQual::RValue);
        }
        if ref_qual.is_none() && self.skip_string("&") {
            ref_qual = Some(RefQual::LValue);
        }

        let mut exception_spec = None;
        self.skip_ws();
        if self.skip_word("noexcept") {
            if self.skip_string_and_ws("(") {
                let expr = self.parse_constant_expression(false)?;
                self.skip_ws();
                if !self.skip_string(")") {
                    return self.fail("Expecting ')' to end 'noexcept'.");
                }
                exception_spec = Some(NoexceptSpec { expr: Some(expr) });
            } else {
                exception_spec = Some(NoexceptSpec { expr: None });
            }
        }

        self.skip_ws();
        let trailing_return = if self.skip_string("->") {
            Some(Box::new(self.parse_type(NamedMode::No, None)?))
        } else {
            None
        };

        self.skip_ws();
        let mut override_ = self.skip_word_and_ws("override");
        let final_ = self.skip_word_and_ws("final");
        if !override_ {
            // they can be permuted
            override_ = self.skip_word_and_ws("override");
        }

        let attrs = self.parse_attribute_list()?;

        self.skip_ws();
        let mut initializer = None;
        // a function pointer initializer must not be swallowed here
        if param_mode == ParamMode::Function && self.skip_string("=") {
            self.skip_ws();
            initializer = if self.skip_word_and_ws("0") {
                Some(ParamInitializer::Pure)
            } else if self.skip_word_and_ws("delete") {
                Some(ParamInitializer::Delete)
            } else if self.skip_word_and_ws("default") {
                Some(ParamInitializer::Default)
            } else {
                return self.fail("Expected \"0\", \"delete\" or \"default\" in initializer-specifier.");
            };
        }

        Ok(Some(ParametersAndQualifiers {
            args,
            const_,
            volatile,
            ref_qual,
            exception_spec,
            trailing_return,
            override_,
            final_,
            attrs,
            initializer,
        }))
    }

    /// Any permutation of the simple decl-specifiers valid in the `outer`
    /// context, plus attributes.
    pub(crate) fn parse_decl_specs_simple(
        &mut self,
        outer: Option<Outer>,
        typed: bool,
    ) -> Result<DeclSpecsSimple> {
        let mut specs = DeclSpecsSimple::default();
        let member_or_function = matches!(outer, Some(Outer::Member) | Some(Outer::Function));
        loop {
            self.skip_ws();
            if !specs.const_ && typed && self.skip_word("const") {
                specs.const_ = true;
                continue;
            }
            if !specs.volatile && typed && self.skip_word("volatile") {
                specs.volatile = true;
                continue;
            }
            if specs.storage.is_none() {
                if member_or_function {
                    if self.skip_word("static") {
                        specs.storage = Some(StorageClass::Static);
                        continue;
                    }
                    if self.skip_word("extern") {
                        specs.storage = Some(StorageClass::Extern);
                        continue;
                    }
                }
                if outer == Some(Outer::Member) && self.skip_word("mutable") {
                    specs.storage = Some(StorageClass::Mutable);
                    continue;
                }
                if self.skip_word("register") {
                    specs.storage = Some(StorageClass::Register);
                    continue;
                }
            }
            if !specs.inline && member_or_function && self.skip_word("inline") {
                specs.inline = true;
                continue;
            }
            if !specs.constexpr_ && member_or_function && self.skip_word("constexpr") {
                specs.constexpr_ = true;
                continue;
            }
            if outer == Some(Outer::Member) {
                if !specs.constinit && self.skip_word("constinit") {
                    specs.constinit = true;
                    continue;
                }
                if !specs.thread_local && self.skip_word("thread_local") {
                    specs.thread_local = true;
                    continue;
                }
            }
            if outer == Some(Outer::Function) {
                if !specs.consteval && self.skip_word("consteval") {
                    specs.consteval = true;
                    continue;
                }
                if !specs.friend && self.skip_word("friend") {
                    specs.friend = true;
                    continue;
                }
                if !specs.virtual_ && self.skip_word("virtual") {
                    specs.virtual_ = true;
                    continue;
                }
                if specs.explicit_spec.is_none() && self.skip_word_and_ws("explicit") {
                    let mut expr = None;
                    if self.skip_string("(") {
                        let e = self.parse_constant_expression(false)?;
                        self.skip_ws();
                        if !self.skip_string(")") {
                            return self.fail("Expected ')' to end explicit specifier.");
                        }
                        expr = Some(e);
                    }
                    specs.explicit_spec = Some(ExplicitSpec { expr });
                    continue;
                }
            }
            if let Some(attr) = self.parse_attribute()? {
                specs.attrs.0.push(attr);
                continue;
            }
            break;
        }
        Ok(specs)
    }

    pub(crate) fn parse_decl_specs(
        &mut self,
        outer: Option<Outer>,
        typed: bool,
    ) -> Result<DeclSpecs> {
        let left = self.parse_decl_specs_simple(outer, typed)?;
        if !typed {
            return Ok(DeclSpecs {
                left,
                trailing: None,
                right: None,
            });
        }
        let trailing = self.parse_trailing_type_spec()?;
        let right = self.parse_decl_specs_simple(outer, typed)?;
        Ok(DeclSpecs {
            left,
            trailing: Some(trailing),
            right: Some(right),
        })
    }

    /// The declarator-id with its array, parameter and bit-field suffixes.
    fn parse_declarator_name_suffix(
        &mut self,
        named: NamedMode,
        param_mode: ParamMode,
        typed: bool,
    ) -> Result<Declarator> {
        let decl_id = match named {
            NamedMode::Maybe => {
                let pos = self.pos();
                match self.parse_nested_name() {
                    Ok(name) => Some(name),
                    Err(_) => {
                        self.set_pos(pos);
                        None
                    }
                }
            }
            NamedMode::Single => {
                if self.match_re(&IDENTIFIER_RE) {
                    let identifier = Identifier(self.matched_text().to_string());
                    let element = NestedNameElement {
                        ident_or_op: IdentOrOp::Ident(identifier),
                        template_args: None,
                    };
                    let decl_id = NestedName {
                        names: vec![element],
                        templates: vec![false],
                        rooted: false,
                    };
                    // a qualified name here would start a member pointer
                    self.skip_ws();
                    if self.current_char() == Some(':') {
                        return self.fail("Unexpected ':' after identifier.");
                    }
                    Some(decl_id)
                } else {
                    None
                }
            }
            NamedMode::Yes => Some(self.parse_nested_name()?),
            NamedMode::No => None,
        };

        let mut array_ops = vec![];
        loop {
            self.skip_ws();
            if typed && self.skip_string("[") {
                self.skip_ws();
                if self.skip_string("]") {
                    array_ops.push(ArrayOp { size: None });
                    continue;
                }
                let value =
                    self.parse_expression_fallback(&[']'], |p| p.parse_comma_expression(), true)?;
                if !self.skip_string("]") {
                    return self.fail("Expected ']' in end of array operator.");
                }
                array_ops.push(ArrayOp { size: Some(value) });
                continue;
            }
            break;
        }

        let param_qual = self.parse_parameters_and_qualifiers(param_mode)?;
        if param_qual.is_none()
            && array_ops.is_empty()
            && named != NamedMode::No
            && param_mode == ParamMode::Type
            && typed
        {
            // perhaps a bit-field
            self.skip_ws();
            if self.skip_string(":") {
                let size = self.parse_constant_expression(false)?;
                return Ok(Declarator::NameBitField { decl_id, size });
            }
        }
        Ok(Declarator::NameParamQual {
            decl_id,
            array_ops,
            param_qual,
        })
    }

    /// The declarator layer: pointers, references, packs, parenthesized
    /// declarators, pointers to member, and finally the name suffix.
    /// `typed == false` skips everything that belongs to a return type.
    pub(crate) fn parse_declarator(
        &mut self,
        named: NamedMode,
        param_mode: ParamMode,
        typed: bool,
    ) -> Result<Declarator> {
        let mut prev_errors: Vec<(String, super::DefinitionError)> = vec![];
        self.skip_ws();

        if typed && self.skip_string("*") {
            self.skip_ws();
            let mut volatile = false;
            let mut const_ = false;
            let mut attrs = vec![];
            loop {
                if !volatile && self.skip_word_and_ws("volatile") {
                    volatile = true;
                    continue;
                }
                if !const_ && self.skip_word_and_ws("const") {
                    const_ = true;
                    continue;
                }
                if let Some(attr) = self.parse_attribute()? {
                    attrs.push(attr);
                    continue;
                }
                break;
            }
            let next = self.parse_declarator(named, param_mode, typed)?;
            return Ok(Declarator::Ptr {
                volatile,
                const_,
                attrs: AttributeList(attrs),
                next: Box::new(next),
            });
        }
        if typed && self.skip_string("&") {
            let attrs = self.parse_attribute_list()?;
            let next = self.parse_declarator(named, param_mode, typed)?;
            return Ok(Declarator::Ref {
                attrs,
                next: Box::new(next),
            });
        }
        if typed && self.skip_string("...") {
            let next = self.parse_declarator(named, param_mode, false)?;
            return Ok(Declarator::ParamPack {
                next: Box::new(next),
            });
        }
        if typed && self.current_char() == Some('(') {
            if param_mode == ParamMode::OperatorCast {
                // cast operators returning function pointers are not
                // supported; produce the empty declarator stub instead
                return Ok(Declarator::NameParamQual {
                    decl_id: None,
                    array_ops: vec![],
                    param_qual: None,
                });
            }
            // maybe this is the beginning of params and quals, try that
            // first, otherwise assume it's "( ptr-declarator )"
            let pos = self.pos();
            match self.parse_declarator_name_suffix(named, param_mode, typed) {
                Ok(res) => return Ok(res),
                Err(e_param_qual) => {
                    prev_errors.push((
                        "If declarator-id with parameters-and-qualifiers".to_string(),
                        e_param_qual,
                    ));
                    self.set_pos(pos);
                    let paren = (|| -> Result<Declarator> {
                        self.skip_string("(");
                        let inner = self.parse_declarator(named, param_mode, typed)?;
                        if !self.skip_string(")") {
                            return self.fail("Expected ')' in \"( ptr-declarator )\"");
                        }
                        let next = self.parse_declarator(NamedMode::No, ParamMode::Type, typed)?;
                        Ok(Declarator::Paren {
                            inner: Box::new(inner),
                            next: Box::new(next),
                        })
                    })();
                    match paren {
                        Ok(res) => return Ok(res),
                        Err(e_no_ptr_paren) => {
                            self.set_pos(pos);
                            prev_errors
                                .push(("If parenthesis in noptr-declarator".to_string(), e_no_ptr_paren));
                            return Err(Self::make_multi_error(prev_errors, "Error in declarator"));
                        }
                    }
                }
            }
        }
        if typed {
            // pointer to member
            let pos = self.pos();
            let head = (|| -> Result<NestedName> {
                let name = self.parse_nested_name_impl(true)?;
                self.skip_ws();
                if !self.skip_string("*") {
                    return self.fail("Expected '*' in pointer to member declarator.");
                }
                self.skip_ws();
                Ok(name)
            })();
            match head {
                Err(e) => {
                    self.set_pos(pos);
                    prev_errors.push(("If pointer to member declarator".to_string(), e));
                }
                Ok(class_name) => {
                    let mut volatile = false;
                    let mut const_ = false;
                    loop {
                        if !volatile && self.skip_word_and_ws("volatile") {
                            volatile = true;
                            continue;
                        }
                        if !const_ && self.skip_word_and_ws("const") {
                            const_ = true;
                            continue;
                        }
                        break;
                    }
                    let next = self.parse_declarator(named, param_mode, typed)?;
                    return Ok(Declarator::MemPtr {
                        class_name,
                        const_,
                        volatile,
                        next: Box::new(next),
                    });
                }
            }
        }
        let pos = self.pos();
        match self.parse_declarator_name_suffix(named, param_mode, typed) {
            Ok(res) => {
                // heuristic for error messages when a '<' follows a nested
                // name but was not a template argument list
                if self.current_char() == Some('<') && !prev_errors.is_empty() {
                    let err = Self::make_multi_error(std::mem::take(&mut prev_errors), "");
                    self.state.add_error(err);
                }
                Ok(res)
            }
            Err(e) => {
                self.set_pos(pos);
                prev_errors.push(("If declarator-id".to_string(), e));
                Err(Self::make_multi_error(
                    prev_errors,
                    "Error in declarator or parameters-and-qualifiers",
                ))
            }
        }
    }

    /// A brace-or-equal initializer; the expression side goes through the
    /// fallback scanner with an end set depending on the context.
    pub(crate) fn parse_initializer(
        &mut self,
        outer: Option<Outer>,
        allow_fallback: bool,
    ) -> Result<Option<Initializer>> {
        self.skip_ws();
        if outer == Some(Outer::Member) {
            if let Some(braced) = self.parse_braced_init_list()? {
                return Ok(Some(Initializer {
                    value: Expression::BracedInitList(braced),
                    has_assign: false,
                }));
            }
        }
        if !self.skip_string("=") {
            return Ok(None);
        }
        if let Some(braced) = self.parse_braced_init_list()? {
            return Ok(Some(Initializer {
                value: Expression::BracedInitList(braced),
                has_assign: true,
            }));
        }
        let fallback_end: &[char] = match outer {
            Some(Outer::Member) => &[],
            Some(Outer::TemplateParam) => &[',', '>'],
            None => &[',', ')'], // function parameter
            _ => return self.fail("Internal error, initializer for this context not implemented."),
        };
        let in_template = outer == Some(Outer::TemplateParam);
        let value = self.parse_expression_fallback(
            fallback_end,
            |p| p.parse_assignment_expression(in_template),
            allow_fallback,
        )?;
        Ok(Some(Initializer {
            value,
            has_assign: true,
        }))
    }

    /// A type with outer `type`/`function` first tries to parse without a
    /// return type (conversion operators, constructors, plain names); only
    /// when that attempt cannot consume the whole input is the typed form
    /// parsed.
    pub(crate) fn parse_type(&mut self, named: NamedMode, outer: Option<Outer>) -> Result<Type> {
        match outer {
            Some(outer_kind @ (Outer::Type | Outer::Function)) => {
                let start_pos = self.pos();
                let mut prev_errors = vec![];
                match self.parse_type_untyped(outer_kind) {
                    Ok(ty) => Ok(ty),
                    Err(e_untyped) => {
                        let desc = if outer_kind == Outer::Type {
                            "If just a name"
                        } else {
                            "If the function has no return type"
                        };
                        prev_errors.push((desc.to_string(), e_untyped));
                        self.set_pos(start_pos);
                        let typed = (|| -> Result<Type> {
                            let decl_specs = self.parse_decl_specs(Some(outer_kind), true)?;
                            let param_mode = if outer_kind == Outer::Function {
                                ParamMode::Function
                            } else {
                                ParamMode::Type
                            };
                            let decl = self.parse_declarator(NamedMode::Yes, param_mode, true)?;
                            Ok(Type { decl_specs, decl })
                        })();
                        match typed {
                            Ok(ty) => Ok(ty),
                            Err(e_typed) => {
                                self.set_pos(start_pos);
                                let (desc, header) = if outer_kind == Outer::Type {
                                    (
                                        "If typedef-like declaration",
                                        "Type must be either just a name or a typedef-like declaration.",
                                    )
                                } else {
                                    (
                                        "If the function has a return type",
                                        "Error when parsing function declaration.",
                                    )
                                };
                                prev_errors.push((desc.to_string(), e_typed));
                                Err(Self::make_multi_error(prev_errors, header))
                            }
                        }
                    }
                }
            }
            _ => {
                let mut named = named;
                let mut param_mode = ParamMode::Type;
                let mut specs_outer = outer;
                match outer {
                    Some(Outer::Member) => named = NamedMode::Yes,
                    Some(Outer::OperatorCast) => {
                        param_mode = ParamMode::OperatorCast;
                        specs_outer = None;
                    }
                    Some(Outer::TemplateParam) => named = NamedMode::Single,
                    _ => {}
                }
                let decl_specs = self.parse_decl_specs(specs_outer, true)?;
                let decl = self.parse_declarator(named, param_mode, true)?;
                Ok(Type { decl_specs, decl })
            }
        }
    }

    /// The untyped attempt for `type`/`function` outers; must reach the end
    /// of the input (a trailing requires-clause excepted for functions).
    fn parse_type_untyped(&mut self, outer: Outer) -> Result<Type> {
        let decl_specs = self.parse_decl_specs(Some(outer), false)?;
        let param_mode = if outer == Outer::Function {
            ParamMode::Function
        } else {
            ParamMode::Type
        };
        let decl = self.parse_declarator(NamedMode::Yes, param_mode, false)?;
        let mut must_end = true;
        if outer == Outer::Function {
            self.skip_ws();
            if self.state.peek_word("requires") {
                must_end = false;
            }
        }
        if must_end {
            self.assert_end(true)?;
        }
        Ok(Type { decl_specs, decl })
    }

    pub(crate) fn parse_type_with_init(
        &mut self,
        named: NamedMode,
        outer: Option<Outer>,
    ) -> Result<TypeWithInit> {
        let ty = self.parse_type(named, outer)?;
        let init = self.parse_initializer(outer, true)?;
        Ok(TypeWithInit { ty, init })
    }

    /// A non-type template parameter, or a constrained type parameter with a
    /// type default (`C T = int&`).
    pub(crate) fn parse_template_param_with_init(&mut self) -> Result<NonTypeParam> {
        let ty = self.parse_type(NamedMode::Maybe, Some(Outer::TemplateParam))?;
        let pos = self.pos();
        let mut e_expr = None;
        match self.parse_initializer(Some(Outer::TemplateParam), false) {
            Ok(None) => {
                return Ok(NonTypeParam::TypeWithInit(TypeWithInit { ty, init: None }));
            }
            Ok(Some(init)) => {
                // the expression must have consumed everything up to the
                // next ',' or '>', otherwise pretend it did not happen
                self.skip_ws();
                if matches!(self.current_char(), Some(',') | Some('>')) {
                    return Ok(NonTypeParam::TypeWithInit(TypeWithInit {
                        ty,
                        init: Some(init),
                    }));
                }
                self.set_pos(pos);
            }
            Err(e) => {
                self.set_pos(pos);
                e_expr = Some(e);
            }
        }
        if !self.skip_string("=") {
            return Ok(NonTypeParam::TypeWithInit(TypeWithInit { ty, init: None }));
        }
        match self.parse_type(NamedMode::No, None) {
            Ok(type_init) => Ok(NonTypeParam::Constrained(ConstrainedTypeWithInit {
                ty,
                type_init,
            })),
            Err(e_type) => match e_expr {
                None => Err(e_type),
                Some(e_expr) => Err(Self::make_multi_error(
                    vec![
                        (
                            "If default template argument is an expression".to_string(),
                            e_expr,
                        ),
                        ("If default template argument is a type".to_string(), e_type),
                    ],
                    "Error in non-type template parameter or constrained template parameter.",
                )),
            },
        }
    }

    pub(crate) fn parse_type_using(&mut self) -> Result<TypeUsing> {
        let name = self.parse_nested_name()?;
        self.skip_ws();
        if !self.skip_string("=") {
            return Ok(TypeUsing { name, ty: None });
        }
        let ty = self.parse_type(NamedMode::No, None)?;
        Ok(TypeUsing { name, ty: Some(ty) })
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;

    use super::super::DefinitionParser;
    use super::*;

    fn type_id(input: &str) -> Type {
        let config = Config::default();
        let mut p = DefinitionParser::new(input, &config);
        let ty = p.parse_type(NamedMode::No, None).expect("parse failed");
        p.assert_end(false).expect("trailing input");
        ty
    }

    fn fundamental(input: &str) -> (Vec<String>, Vec<String>) {
        let config = Config::default();
        let spec = DefinitionParser::new(input, &config)
            .parse_simple_type_specifiers()
            .unwrap()
            .unwrap();
        let TrailingTypeSpec::Fundamental { names, canonical } = spec else {
            panic!("expected fundamental type");
        };
        (names, canonical)
    }

    #[test]
    fn test_fundamental_canonicalization() {
        let (names, canonical) = fundamental("long unsigned int");
        assert_eq!(names, vec!["long", "unsigned", "int"]);
        assert_eq!(canonical, vec!["unsigned", "long", "int"]);
    }

    #[test]
    fn test_fundamental_canonical_is_permutation_invariant() {
        let (_, a) = fundamental("unsigned long long int");
        let (_, b) = fundamental("long int unsigned long");
        let (_, c) = fundamental("int long long unsigned");
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, vec!["unsigned", "long", "long", "int"]);
    }

    #[test]
    fn test_fundamental_complex_modifier() {
        let (_, canonical) = fundamental("double _Complex");
        assert_eq!(canonical, vec!["_Complex", "double"]);
    }

    #[test]
    fn test_fundamental_invalid_combinations() {
        let config = Config::default();
        for input in [
            "float signed",
            "char long",
            "double long long",
            "short long",
            "unsigned signed",
            "_Complex",
            "bool unsigned",
            "void short",
        ] {
            let result =
                DefinitionParser::new(input, &config).parse_simple_type_specifiers();
            assert!(result.is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn test_pointer_and_reference_declarators() {
        assert!(matches!(type_id("int*").decl, Declarator::Ptr { .. }));
        assert!(matches!(type_id("int&").decl, Declarator::Ref { .. }));
        let Declarator::Ptr { const_, next, .. } = type_id("int *const*").decl else {
            panic!("expected pointer");
        };
        assert!(const_);
        assert!(matches!(*next, Declarator::Ptr { .. }));
    }

    #[test]
    fn test_function_pointer_declarator() {
        let ty = type_id("void (*)(int)");
        assert_eq!(ty.to_string(), "void (*)(int)");
        let Declarator::Paren { inner, next } = ty.decl else {
            panic!("expected paren declarator");
        };
        assert!(matches!(*inner, Declarator::Ptr { .. }));
        let Declarator::NameParamQual { param_qual, .. } = *next else {
            panic!("expected name-param-qual");
        };
        assert_eq!(param_qual.unwrap().args.len(), 1);
    }

    #[test]
    fn test_member_pointer_declarator() {
        let ty = type_id("int C::*");
        let Declarator::MemPtr { class_name, .. } = &ty.decl else {
            panic!("expected member pointer, got {ty:?}");
        };
        assert_eq!(class_name.to_string(), "C");
        assert_eq!(ty.to_string(), "int C::*");
    }

    #[test]
    fn test_array_declarator_sizes() {
        let config = Config::default();
        let mut p = DefinitionParser::new("int buf[N + 1][]", &config);
        let ty = p
            .parse_type(NamedMode::Yes, Some(Outer::Member))
            .expect("parse failed");
        let Declarator::NameParamQual { array_ops, .. } = &ty.decl else {
            panic!("expected name declarator");
        };
        assert_eq!(array_ops.len(), 2);
        assert!(array_ops[0].size.is_some());
        assert!(array_ops[1].size.is_none());
    }

    #[test]
    fn test_trailing_type_spec_variants() {
        assert!(matches!(
            type_id("decltype(a + b)").decl_specs.trailing,
            Some(TrailingTypeSpec::Decltype(_))
        ));
        assert!(matches!(
            type_id("decltype(auto)").decl_specs.trailing,
            Some(TrailingTypeSpec::DecltypeAuto)
        ));
        let ty = type_id("typename T::value_type");
        let Some(TrailingTypeSpec::Name { prefix, .. }) = &ty.decl_specs.trailing else {
            panic!("expected elaborated name");
        };
        assert_eq!(*prefix, Some(TypeSpecPrefix::Typename));
        assert_eq!(ty.to_string(), "typename T::value_type");
    }

    #[test]
    fn test_parameters_and_qualifiers_full() {
        let config = Config::default();
        let mut p = DefinitionParser::new(
            "(int a, double b = 1.0) const volatile && noexcept -> bool",
            &config,
        );
        let pq = p
            .parse_parameters_and_qualifiers(ParamMode::Type)
            .unwrap()
            .unwrap();
        assert_eq!(pq.args.len(), 2);
        assert!(pq.const_);
        assert!(pq.volatile);
        assert_eq!(pq.ref_qual, Some(RefQual::RValue));
        assert!(pq.exception_spec.is_some());
        assert_eq!(pq.trailing_return.unwrap().to_string(), "bool");
        let init = pq.args[1].arg.as_ref().unwrap().init.as_ref().unwrap();
        assert_eq!(init.value.to_string(), "1.0");
    }

    #[test]
    fn test_ellipsis_parameter_must_be_last() {
        let config = Config::default();
        let mut p = DefinitionParser::new("(int a, ...)", &config);
        let pq = p
            .parse_parameters_and_qualifiers(ParamMode::Type)
            .unwrap()
            .unwrap();
        assert!(pq.args[1].ellipsis);

        let mut p = DefinitionParser::new("(..., int a)", &config);
        assert!(p.parse_parameters_and_qualifiers(ParamMode::Type).is_err());
    }

    #[test]
    fn test_parameter_name_must_be_unqualified() {
        let config = Config::default();
        let mut p = DefinitionParser::new("(int a::b)", &config);
        assert!(p.parse_parameters_and_qualifiers(ParamMode::Type).is_err());
    }

    #[test]
    fn test_bit_field_declarator() {
        let config = Config::default();
        let mut p = DefinitionParser::new("unsigned flags : 3", &config);
        let ty = p
            .parse_type(NamedMode::Yes, Some(Outer::Member))
            .expect("parse failed");
        assert!(matches!(ty.decl, Declarator::NameBitField { .. }));
        assert_eq!(ty.to_string(), "unsigned flags : 3");
    }

    #[test]
    fn test_decl_specs_restrictions() {
        let config = Config::default();
        // `mutable` is for members only; in a plain type it stays unparsed
        let mut p = DefinitionParser::new("mutable int", &config);
        let specs = p.parse_decl_specs_simple(None, true).unwrap();
        assert_eq!(specs.storage, None);

        let mut p = DefinitionParser::new("mutable int x", &config);
        let ty = p
            .parse_type(NamedMode::Yes, Some(Outer::Member))
            .expect("parse failed");
        assert_eq!(ty.decl_specs.left.storage, Some(StorageClass::Mutable));
    }

    #[test]
    fn test_decl_specs_permutation() {
        let config = Config::default();
        let mut p = DefinitionParser::new("const static inline int f()", &config);
        let ty = p
            .parse_type(NamedMode::Yes, Some(Outer::Function))
            .expect("parse failed");
        let left = &ty.decl_specs.left;
        assert!(left.const_);
        assert!(left.inline);
        assert_eq!(left.storage, Some(StorageClass::Static));
    }

    #[test]
    fn test_type_using() {
        let config = Config::default();
        let mut p = DefinitionParser::new("Alias = std::vector<int>", &config);
        let alias = p.parse_type_using().expect("parse failed");
        assert_eq!(alias.to_string(), "Alias = std::vector<int>");
    }
}
