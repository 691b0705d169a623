use super::ast::{
    BinOpExpr, BracedInitList, CallArgs, CastKind, Expression, FoldExpr, Identifier, NewExpr,
    ParenExprList, PostfixExpr, PostfixOp, PostfixPrefix, Type,
};
use super::tokens::{
    is_word_op, EXPRESSION_ASSIGNMENT_OPS, EXPRESSION_BIN_OPS, EXPRESSION_UNARY_OPS,
    FOLD_OPERATOR_RE, IDENTIFIER_RE, STRING_RE,
};
use super::{DefinitionParser, NamedMode, Outer, ParamMode, Result};

impl<'a> DefinitionParser<'a> {
    /// Parse `(...)` as a fold expression or a parenthesized expression.
    /// Returns `None` when the input does not start with `(`.
    pub(crate) fn parse_fold_or_paren_expression(&mut self) -> Result<Option<Expression>> {
        if self.current_char() != Some('(') {
            return Ok(None);
        }
        self.set_pos(self.pos() + 1);
        self.skip_ws();
        if self.skip_string_and_ws("...") {
            // ( ... fold-operator cast-expression )
            if !self.match_re(&FOLD_OPERATOR_RE) {
                return self.fail("Expected fold operator after '...' in fold expression.");
            }
            let op = self.matched_text().to_string();
            let right = self.parse_cast_expression()?;
            self.skip_ws();
            if !self.skip_string(")") {
                return self.fail("Expected ')' in end of fold expression.");
            }
            return Ok(Some(Expression::Fold(FoldExpr {
                left: None,
                op,
                right: Some(Box::new(right)),
            })));
        }
        // try a unary right fold or a binary fold first
        let pos = self.pos();
        match self.parse_fold_head() {
            Ok((left, op)) => {
                // now it definitely is a fold expression
                self.skip_ws();
                if self.skip_string(")") {
                    return Ok(Some(Expression::Fold(FoldExpr {
                        left: Some(Box::new(left)),
                        op,
                        right: None,
                    })));
                }
                if !self.match_re(&FOLD_OPERATOR_RE) {
                    return self
                        .fail("Expected fold operator or ')' after '...' in fold expression.");
                }
                if op != self.matched_text() {
                    let other = self.matched_text();
                    return self.fail(&format!(
                        "Operators are different in binary fold: '{op}' and '{other}'."
                    ));
                }
                let right = self.parse_cast_expression()?;
                self.skip_ws();
                if !self.skip_string(")") {
                    return self.fail("Expected ')' to end binary fold expression.");
                }
                Ok(Some(Expression::Fold(FoldExpr {
                    left: Some(Box::new(left)),
                    op,
                    right: Some(Box::new(right)),
                })))
            }
            Err(e_fold) => {
                // fall back to a plain parenthesized expression
                self.set_pos(pos);
                let paren = self.parse_comma_expression().and_then(|res| {
                    self.skip_ws();
                    if !self.skip_string(")") {
                        return self.fail("Expected ')' in end of parenthesized expression.");
                    }
                    Ok(res)
                });
                match paren {
                    Ok(res) => Ok(Some(Expression::Paren(Box::new(res)))),
                    Err(e_expr) => Err(Self::make_multi_error(
                        vec![
                            ("If fold expression".to_string(), e_fold),
                            ("If parenthesized expression".to_string(), e_expr),
                        ],
                        "Error in fold expression or parenthesized expression.",
                    )),
                }
            }
        }
    }

    /// `cast-expression fold-operator ...` — the committing part of a left
    /// operand fold.
    fn parse_fold_head(&mut self) -> Result<(Expression, String)> {
        self.skip_ws();
        let left = self.parse_cast_expression()?;
        self.skip_ws();
        if !self.match_re(&FOLD_OPERATOR_RE) {
            return self.fail("Expected fold operator after left expression in fold expression.");
        }
        let op = self.matched_text().to_string();
        self.skip_ws();
        if !self.skip_string_and_ws("...") {
            return self.fail("Expected '...' after fold operator in fold expression.");
        }
        Ok((left, op))
    }

    pub(crate) fn parse_primary_expression(&mut self) -> Result<Expression> {
        // literal, "this", fold-or-paren expression, id-expression.
        // Lambda expressions are not supported.
        self.skip_ws();
        if let Some(res) = self.parse_literal()? {
            return Ok(res);
        }
        self.skip_ws();
        if self.skip_word("this") {
            return Ok(Expression::ThisLiteral);
        }
        if let Some(res) = self.parse_fold_or_paren_expression()? {
            return Ok(res);
        }
        let name = self.parse_nested_name()?;
        Ok(Expression::Id(name))
    }

    /// `open` initializer-list `close`, each clause optionally followed by a
    /// pack expansion `...`. Returns the expressions and the trailing-comma
    /// flag, or `None` when `open` is not next.
    fn parse_initializer_list(
        &mut self,
        name: &str,
        open: &str,
        close: &str,
    ) -> Result<Option<(Vec<Expression>, bool)>> {
        self.skip_ws();
        if !self.skip_string_and_ws(open) {
            return Ok(None);
        }
        if self.skip_string(close) {
            return Ok(Some((vec![], false)));
        }
        let mut exprs = vec![];
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            let expr = self.parse_initializer_clause()?;
            self.skip_ws();
            if self.skip_string("...") {
                exprs.push(Expression::PackExpansion(Box::new(expr)));
            } else {
                exprs.push(expr);
            }
            self.skip_ws();
            if self.skip_string(close) {
                break;
            }
            if !self.skip_string_and_ws(",") {
                return self.fail(&format!("Error in {name}, expected ',' or '{close}'."));
            }
            if close == "}" && self.current_char() == Some('}') {
                self.set_pos(self.pos() + 1);
                trailing_comma = true;
                break;
            }
        }
        Ok(Some((exprs, trailing_comma)))
    }

    pub(crate) fn parse_paren_expression_list(&mut self) -> Result<Option<ParenExprList>> {
        // relaxed to also allow empty parens, which some cases need
        let list = self.parse_initializer_list("parenthesized expression-list", "(", ")")?;
        Ok(list.map(|(exprs, _)| ParenExprList(exprs)))
    }

    pub(crate) fn parse_braced_init_list(&mut self) -> Result<Option<BracedInitList>> {
        let list = self.parse_initializer_list("braced-init-list", "{", "}")?;
        Ok(list.map(|(exprs, trailing_comma)| BracedInitList {
            exprs,
            trailing_comma,
        }))
    }

    pub(crate) fn parse_initializer_clause(&mut self) -> Result<Expression> {
        if let Some(braced) = self.parse_braced_init_list()? {
            return Ok(Expression::BracedInitList(braced));
        }
        self.parse_assignment_expression(false)
    }

    pub(crate) fn parse_expression_list_or_braced_init_list(
        &mut self,
    ) -> Result<Option<CallArgs>> {
        if let Some(paren) = self.parse_paren_expression_list()? {
            return Ok(Some(CallArgs::Paren(paren)));
        }
        Ok(self.parse_braced_init_list()?.map(CallArgs::Braced))
    }

    fn parse_typeid_expression(&mut self) -> Result<Expression> {
        if !self.skip_string_and_ws("(") {
            return self.fail("Expected '(' after 'typeid'.");
        }
        let pos = self.pos();
        let as_type = self.parse_type(NamedMode::No, None).and_then(|ty| {
            if !self.skip_string(")") {
                return self.fail("Expected ')' to end 'typeid' of type.");
            }
            Ok(Expression::TypeIdType(Box::new(ty)))
        });
        match as_type {
            Ok(expr) => Ok(expr),
            Err(e_type) => {
                self.set_pos(pos);
                let as_expr = self
                    .parse_expression_fallback(&[')'], |p| p.parse_comma_expression(), true)
                    .and_then(|expr| {
                        if !self.skip_string(")") {
                            return self.fail("Expected ')' to end 'typeid' of expression.");
                        }
                        Ok(Expression::TypeIdExpr(Box::new(expr)))
                    });
                match as_expr {
                    Ok(expr) => Ok(expr),
                    Err(e_expr) => {
                        self.set_pos(pos);
                        Err(Self::make_multi_error(
                            vec![
                                ("If type".to_string(), e_type),
                                ("If expression".to_string(), e_expr),
                            ],
                            "Error in 'typeid(...)'. Expected type or expression.",
                        ))
                    }
                }
            }
        }
    }

    pub(crate) fn parse_postfix_expression(&mut self) -> Result<Expression> {
        self.skip_ws();

        let mut cast = None;
        for (keyword, kind) in [
            ("dynamic_cast", CastKind::Dynamic),
            ("static_cast", CastKind::Static),
            ("reinterpret_cast", CastKind::Reinterpret),
            ("const_cast", CastKind::Const),
        ] {
            if self.skip_word_and_ws(keyword) {
                cast = Some(kind);
                break;
            }
        }

        let prefix = if let Some(kind) = cast {
            if !self.skip_string("<") {
                return self.fail(&format!("Expected '<' after '{kind}'."));
            }
            let ty = self.parse_type(NamedMode::No, None)?;
            self.skip_ws();
            if !self.skip_string_and_ws(">") {
                return self.fail(&format!("Expected '>' after type in '{kind}'."));
            }
            if !self.skip_string("(") {
                return self.fail(&format!("Expected '(' in '{kind}'."));
            }
            let expr =
                self.parse_expression_fallback(&[')'], |p| p.parse_comma_expression(), true)?;
            self.skip_ws();
            if !self.skip_string(")") {
                return self.fail(&format!("Expected ')' to end '{kind}'."));
            }
            PostfixPrefix::Expr(Box::new(Expression::ExplicitCast {
                kind,
                type_id: Box::new(ty),
                expr: Box::new(expr),
            }))
        } else if self.skip_word_and_ws("typeid") {
            PostfixPrefix::Expr(Box::new(self.parse_typeid_expression()?))
        } else {
            // a primary expression, or a type for a functional-style cast
            let pos = self.pos();
            match self.parse_primary_expression() {
                Ok(expr) => PostfixPrefix::Expr(Box::new(expr)),
                Err(e_outer) => {
                    self.set_pos(pos);
                    let as_type = self
                        .parse_type(NamedMode::No, Some(Outer::OperatorCast))
                        .and_then(|ty| {
                            self.skip_ws();
                            if !matches!(self.current_char(), Some('(') | Some('{')) {
                                return self
                                    .fail("Expecting '(' or '{' after type in cast expression.");
                            }
                            Ok(ty)
                        });
                    match as_type {
                        Ok(ty) => PostfixPrefix::Type(Box::new(ty)),
                        Err(e_inner) => {
                            self.set_pos(pos);
                            return Err(Self::make_multi_error(
                                vec![
                                    ("If primary expression".to_string(), e_outer),
                                    ("If type".to_string(), e_inner),
                                ],
                                "Error in postfix expression, expected primary expression or type.",
                            ));
                        }
                    }
                }
            }
        };
        let prefix_is_expr = matches!(prefix, PostfixPrefix::Expr(_));

        let mut ops: Vec<PostfixOp> = vec![];
        loop {
            self.skip_ws();
            if prefix_is_expr {
                if self.skip_string_and_ws("[") {
                    let expr = self.parse_comma_expression()?;
                    self.skip_ws();
                    if !self.skip_string("]") {
                        return self.fail("Expected ']' in end of postfix expression.");
                    }
                    ops.push(PostfixOp::Array(Box::new(expr)));
                    continue;
                }
                let pos = self.pos();
                if self.skip_string(".") {
                    if self.skip_string("*") || self.skip_string("..") {
                        // don't steal the dot of `.*` or `...`
                        self.set_pos(pos);
                    } else {
                        let name = self.parse_nested_name()?;
                        ops.push(PostfixOp::Member(name));
                        continue;
                    }
                }
                let pos = self.pos();
                if self.skip_string("->") {
                    if self.skip_string("*") {
                        // don't steal the arrow of `->*`
                        self.set_pos(pos);
                    } else {
                        let name = self.parse_nested_name()?;
                        ops.push(PostfixOp::MemberOfPointer(name));
                        continue;
                    }
                }
                if self.skip_string("++") {
                    ops.push(PostfixOp::Inc);
                    continue;
                }
                if self.skip_string("--") {
                    ops.push(PostfixOp::Dec);
                    continue;
                }
            }
            if let Some(args) = self.parse_expression_list_or_braced_init_list()? {
                ops.push(PostfixOp::Call(args));
                continue;
            }
            break;
        }
        match (ops.is_empty(), prefix) {
            (true, PostfixPrefix::Expr(expr)) => Ok(*expr),
            (_, prefix) => Ok(Expression::Postfix(PostfixExpr { prefix, ops })),
        }
    }

    pub(crate) fn parse_unary_expression(&mut self) -> Result<Expression> {
        self.skip_ws();
        for &op in EXPRESSION_UNARY_OPS {
            let matched = if is_word_op(op) {
                self.skip_word(op)
            } else {
                self.skip_string(op)
            };
            if matched {
                let expr = self.parse_cast_expression()?;
                return Ok(Expression::Unary {
                    op: op.to_string(),
                    expr: Box::new(expr),
                });
            }
        }
        if self.skip_word_and_ws("sizeof") {
            if self.skip_string_and_ws("...") {
                if !self.skip_string_and_ws("(") {
                    return self.fail("Expecting '(' after 'sizeof...'.");
                }
                if !self.match_re(&IDENTIFIER_RE) {
                    return self.fail("Expecting identifier for 'sizeof...'.");
                }
                let ident = Identifier(self.matched_text().to_string());
                self.skip_ws();
                if !self.skip_string(")") {
                    return self.fail("Expecting ')' to end 'sizeof...'.");
                }
                return Ok(Expression::SizeofParamPack(ident));
            }
            if self.skip_string_and_ws("(") {
                let ty = self.parse_type(NamedMode::No, None)?;
                self.skip_ws();
                if !self.skip_string(")") {
                    return self.fail("Expecting ')' to end 'sizeof'.");
                }
                return Ok(Expression::SizeofType(Box::new(ty)));
            }
            let expr = self.parse_unary_expression()?;
            return Ok(Expression::SizeofExpr(Box::new(expr)));
        }
        if self.skip_word_and_ws("alignof") {
            if !self.skip_string_and_ws("(") {
                return self.fail("Expecting '(' after 'alignof'.");
            }
            let ty = self.parse_type(NamedMode::No, None)?;
            self.skip_ws();
            if !self.skip_string(")") {
                return self.fail("Expecting ')' to end 'alignof'.");
            }
            return Ok(Expression::Alignof(Box::new(ty)));
        }
        if self.skip_word_and_ws("noexcept") {
            if !self.skip_string_and_ws("(") {
                return self.fail("Expecting '(' after 'noexcept'.");
            }
            let expr = self.parse_comma_expression()?;
            self.skip_ws();
            if !self.skip_string(")") {
                return self.fail("Expecting ')' to end 'noexcept'.");
            }
            return Ok(Expression::NoexceptExpr(Box::new(expr)));
        }
        // new-expression
        let pos = self.pos();
        let rooted = self.skip_string("::");
        self.skip_ws();
        if self.skip_word_and_ws("new") {
            // new-placement[opt] new-type-id new-initializer[opt]
            // new-placement[opt] ( type-id ) new-initializer[opt]
            if self.skip_string_and_ws("(") {
                return self.fail(
                    "Sorry, neither new-placement nor parenthesised type-id \
                     in new-expression is supported yet.",
                );
            }
            let decl_specs = self.parse_decl_specs(None, true)?;
            let decl = self.parse_declarator(NamedMode::No, ParamMode::New, true)?;
            let init = self.parse_expression_list_or_braced_init_list()?;
            return Ok(Expression::New(NewExpr {
                rooted,
                is_new_type_id: true,
                type_id: Box::new(Type { decl_specs, decl }),
                init,
            }));
        }
        self.set_pos(pos);
        // delete-expression
        let pos = self.pos();
        let rooted = self.skip_string("::");
        self.skip_ws();
        if self.skip_word_and_ws("delete") {
            let array = self.skip_string_and_ws("[");
            if array && !self.skip_string_and_ws("]") {
                return self.fail("Expected ']' in array delete-expression.");
            }
            let expr = self.parse_cast_expression()?;
            return Ok(Expression::Delete {
                rooted,
                array,
                expr: Box::new(expr),
            });
        }
        self.set_pos(pos);
        self.parse_postfix_expression()
    }

    pub(crate) fn parse_cast_expression(&mut self) -> Result<Expression> {
        // unary-expression | "(" type-id ")" cast-expression
        let pos = self.pos();
        self.skip_ws();
        if !self.skip_string("(") {
            return self.parse_unary_expression();
        }
        let as_cast = self.parse_type(NamedMode::No, None).and_then(|ty| {
            if !self.skip_string(")") {
                return self.fail("Expected ')' in cast expression.");
            }
            let expr = self.parse_cast_expression()?;
            Ok(Expression::Cast {
                type_id: Box::new(ty),
                expr: Box::new(expr),
            })
        });
        match as_cast {
            Ok(expr) => Ok(expr),
            Err(e_cast) => {
                self.set_pos(pos);
                match self.parse_unary_expression() {
                    Ok(expr) => Ok(expr),
                    Err(e_unary) => Err(Self::make_multi_error(
                        vec![
                            ("If type cast expression".to_string(), e_cast),
                            ("If unary expression".to_string(), e_unary),
                        ],
                        "Error in cast expression.",
                    )),
                }
            }
        }
    }

    /// One level of the binary precedence ladder; `op_id` indexes the
    /// operator table, the innermost level parses cast-expressions.
    fn parse_bin_op_expr(&mut self, op_id: usize, in_template: bool) -> Result<Expression> {
        let parse_operand = |p: &mut Self| -> Result<Expression> {
            if op_id + 1 == EXPRESSION_BIN_OPS.len() {
                p.parse_cast_expression()
            } else {
                p.parse_bin_op_expr(op_id + 1, in_template)
            }
        };
        let mut exprs = vec![parse_operand(self)?];
        let mut ops: Vec<String> = vec![];
        loop {
            self.skip_ws();
            if in_template && self.current_char() == Some('>') {
                break;
            }
            let pos = self.pos();
            let mut one_more = false;
            for &op in EXPRESSION_BIN_OPS[op_id] {
                let matched = if is_word_op(op) {
                    self.skip_word(op)
                } else {
                    self.skip_string(op)
                };
                if !matched {
                    continue;
                }
                if op == "&" && self.current_char() == Some('&') {
                    // don't split the && token; && has lower precedence, so
                    // this level is done
                    self.set_pos(pos);
                    break;
                }
                match parse_operand(self) {
                    Ok(expr) => {
                        exprs.push(expr);
                        ops.push(op.to_string());
                        one_more = true;
                        break;
                    }
                    Err(_) => {
                        self.set_pos(pos);
                    }
                }
            }
            if !one_more {
                break;
            }
        }
        if ops.is_empty() {
            Ok(exprs.swap_remove(0))
        } else {
            Ok(Expression::BinOp(BinOpExpr { exprs, ops }))
        }
    }

    pub(crate) fn parse_logical_or_expression(&mut self, in_template: bool) -> Result<Expression> {
        self.parse_bin_op_expr(0, in_template)
    }

    /// `? expression : assignment-expression`, or `None` when there is no `?`.
    fn parse_conditional_expression_tail(
        &mut self,
        in_template: bool,
    ) -> Result<Option<(Expression, Expression)>> {
        self.skip_ws();
        if !self.skip_string("?") {
            return Ok(None);
        }
        let then_expr = self.parse_comma_expression()?;
        self.skip_ws();
        if !self.skip_string(":") {
            return self.fail("Expected \":\" after then-expression in conditional expression.");
        }
        let else_expr = self.parse_assignment_expression(in_template)?;
        Ok(Some((then_expr, else_expr)))
    }

    pub(crate) fn parse_assignment_expression(&mut self, in_template: bool) -> Result<Expression> {
        let left = self.parse_logical_or_expression(in_template)?;
        if let Some((then_expr, else_expr)) = self.parse_conditional_expression_tail(in_template)?
        {
            return Ok(Expression::Conditional {
                condition: Box::new(left),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            });
        }
        for &op in EXPRESSION_ASSIGNMENT_OPS {
            let matched = if is_word_op(op) {
                self.skip_word(op)
            } else {
                self.skip_string(op)
            };
            if matched {
                let rhs = self.parse_initializer_clause()?;
                return Ok(Expression::Assignment {
                    lhs: Box::new(left),
                    op: op.to_string(),
                    rhs: Box::new(rhs),
                });
            }
        }
        Ok(left)
    }

    pub(crate) fn parse_constant_expression(&mut self, in_template: bool) -> Result<Expression> {
        let or_expr = self.parse_logical_or_expression(in_template)?;
        if let Some((then_expr, else_expr)) = self.parse_conditional_expression_tail(in_template)?
        {
            return Ok(Expression::Conditional {
                condition: Box::new(or_expr),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            });
        }
        Ok(or_expr)
    }

    /// The comma level, lowest in the ladder.
    pub(crate) fn parse_comma_expression(&mut self) -> Result<Expression> {
        let mut exprs = vec![self.parse_assignment_expression(false)?];
        loop {
            self.skip_ws();
            if !self.skip_string(",") {
                break;
            }
            exprs.push(self.parse_assignment_expression(false)?);
        }
        if exprs.len() == 1 {
            Ok(exprs.swap_remove(0))
        } else {
            Ok(Expression::Comma(exprs))
        }
    }

    /// First try `parser`; on failure (when allowed) warn and scan the
    /// longest balanced-bracket run up to a character from `end` at depth 0,
    /// storing the raw text. Note that `<`/`>` count as a bracket pair here,
    /// which is lossy for `operator<` or `<<` inside the scanned region.
    pub(crate) fn parse_expression_fallback<F>(
        &mut self,
        end: &[char],
        parser: F,
        allow: bool,
    ) -> Result<Expression>
    where
        F: FnOnce(&mut Self) -> Result<Expression>,
    {
        let prev_pos = self.pos();
        match parser(self) {
            Ok(expr) => return Ok(expr),
            Err(e) => {
                // some places (e.g. template parameters) must not use the
                // fallback, and it can be disabled globally
                if !allow || !self.config.allow_fallback_expression_parsing {
                    return Err(e);
                }
                self.warn(&format!(
                    "Parsing of expression failed. Using fallback parser. Error was:\n{e}"
                ));
                self.set_pos(prev_pos);
            }
        }
        self.skip_ws();
        let start_pos = self.pos();
        let value = if self.match_re(&STRING_RE) {
            self.matched_text().to_string()
        } else {
            let mut symbols: Vec<char> = vec![];
            while let Some(c) = self.current_char() {
                if symbols.is_empty() && end.contains(&c) {
                    break;
                }
                match c {
                    '(' => symbols.push(')'),
                    '{' => symbols.push('}'),
                    '[' => symbols.push(']'),
                    '<' => symbols.push('>'),
                    _ => {
                        if symbols.last() == Some(&c) {
                            symbols.pop();
                        }
                    }
                }
                self.set_pos(self.pos() + c.len_utf8());
            }
            if !end.is_empty() && self.eof() {
                return self.fail(&format!(
                    "Could not find end of expression starting at {start_pos}."
                ));
            }
            self.state.definition()[start_pos..self.pos()].trim().to_string()
        };
        Ok(Expression::Fallback(value))
    }
}
