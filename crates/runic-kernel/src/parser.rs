//! Parser for runic source code.
//!
//! Recursive descent with one token of lookahead over the
//! newline-stripped token stream. Statement dispatch is a keyword switch;
//! expressions use the usual precedence ladder (or → and → comparison →
//! additive → multiplicative → unary → primary).
//!
//! The parser is total: malformed input degrades to a partial AST and the
//! problems are recorded as [`ParseIssue`]s instead of being raised. A
//! block whose terminator keyword (`ENDIF`, `ENDFOR`, `ENDWHILE`,
//! `ENDDEF`) is missing simply ends at end-of-stream. Whether issues
//! abort the run is the router's decision via [`ParseMode`]: permissive
//! mode preserves this tolerant behavior, strict mode turns any recorded
//! issue into a parse error.
//!
//! `IDENT.IDENT(...)` parses as a capability call, distinguished from a
//! plain function call by the dot. This is the single most important
//! parse-time decision: it is what the capability classifier keys on.

use std::fmt;

use crate::ast::{BinaryOp, Expr, ForLoop, FuncDef, IfStmt, Program, Stmt, UnaryOp, Value, WhileLoop};
use crate::lexer::{tokenize_full, Keyword, Op, Punct, Token, TokenKind};

/// How lex/parse issues are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Skip invalid characters, tolerate missing block terminators,
    /// degrade malformed statements to a partial AST.
    #[default]
    Permissive,
    /// Any recorded lex or parse issue fails the run with a parse error.
    Strict,
}

/// A problem found while parsing. Fatal only in strict mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseIssue {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}, column {}", self.message, self.line, self.column)
    }
}

/// Parse source text permissively, discarding issue records.
pub fn parse(source: &str) -> Program {
    parse_full(source).0
}

/// Parse source text, returning the (possibly partial) program together
/// with every lex and parse issue encountered.
pub fn parse_full(source: &str) -> (Program, Vec<ParseIssue>) {
    let (tokens, lex_issues) = tokenize_full(source);
    // The grammar is newline-insensitive; statement boundaries come from
    // keyword structure, not line breaks.
    let tokens: Vec<Token> = tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Newline)
        .collect();

    let mut issues: Vec<ParseIssue> = lex_issues
        .iter()
        .map(|i| ParseIssue {
            message: format!("invalid character {:?}", i.text),
            line: i.line,
            column: i.column,
        })
        .collect();

    let mut parser = Parser { tokens, pos: 0, issues: Vec::new() };
    let program = parser.parse_program();
    issues.extend(parser.issues);
    (program, issues)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    issues: Vec<ParseIssue>,
}

impl Parser {
    fn parse_program(&mut self) -> Program {
        let statements = self.parse_statements(&[]);
        Program { statements }
    }

    /// Parse statements until end-of-stream or one of `stop` keywords.
    /// The stop keyword itself is left for the caller to consume.
    fn parse_statements(&mut self, stop: &[Keyword]) -> Vec<Stmt> {
        let mut statements = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::End => break,
                TokenKind::Keyword(kw) if stop.contains(&kw) => break,
                _ => {}
            }
            let before = self.pos;
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            // A statement that consumed nothing would loop forever; skip
            // the offending token and keep going.
            if self.pos == before {
                self.issue_here(format!("unexpected token {:?}", self.peek().text));
                self.advance();
            }
        }
        statements
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.peek().kind {
            TokenKind::Keyword(Keyword::Set) => self.parse_set(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::Def) => self.parse_def(),
            TokenKind::Keyword(Keyword::Print) => {
                self.advance();
                Some(Stmt::Print(self.parse_expr()))
            }
            TokenKind::Keyword(Keyword::Return) => {
                self.advance();
                let value = if self.at_expr_start() {
                    Some(self.parse_expr())
                } else {
                    None
                };
                Some(Stmt::Return(value))
            }
            TokenKind::Keyword(Keyword::State) => self.parse_state(),
            // Stray block terminators are recovered by the statement
            // loop; everything else falls through to an expression
            // statement (capability calls, bare calls).
            TokenKind::Keyword(
                Keyword::EndIf
                | Keyword::EndFor
                | Keyword::EndWhile
                | Keyword::EndDef
                | Keyword::Else,
            ) => None,
            _ => Some(Stmt::Expr(self.parse_expr())),
        }
    }

    fn parse_set(&mut self) -> Option<Stmt> {
        self.advance(); // SET
        let name = self.expect_identifier("variable name after SET")?;
        self.expect_op(Op::Assign, "`=` after variable name");
        Some(Stmt::Set { name, value: self.parse_expr() })
    }

    fn parse_if(&mut self) -> Option<Stmt> {
        self.advance(); // IF
        let condition = self.parse_expr();
        let then_branch = self.parse_statements(&[Keyword::Else, Keyword::EndIf]);
        let else_branch = if self.eat_keyword(Keyword::Else) {
            Some(self.parse_statements(&[Keyword::EndIf]))
        } else {
            None
        };
        self.expect_terminator(Keyword::EndIf);
        Some(Stmt::If(IfStmt { condition, then_branch, else_branch }))
    }

    fn parse_for(&mut self) -> Option<Stmt> {
        self.advance(); // FOR
        let variable = self.expect_identifier("loop variable after FOR")?;
        self.expect_keyword(Keyword::In, "`IN` after loop variable");
        let iterable = self.parse_expr();
        let body = self.parse_statements(&[Keyword::EndFor]);
        self.expect_terminator(Keyword::EndFor);
        Some(Stmt::For(ForLoop { variable, iterable, body }))
    }

    fn parse_while(&mut self) -> Option<Stmt> {
        self.advance(); // WHILE
        let condition = self.parse_expr();
        let body = self.parse_statements(&[Keyword::EndWhile]);
        self.expect_terminator(Keyword::EndWhile);
        Some(Stmt::While(WhileLoop { condition, body }))
    }

    fn parse_def(&mut self) -> Option<Stmt> {
        self.advance(); // DEF
        let name = self.expect_identifier("function name after DEF")?;
        let mut params = Vec::new();
        if self.eat_punct(Punct::LParen) {
            while let TokenKind::Identifier = self.peek().kind {
                params.push(self.advance().text);
                if !self.eat_punct(Punct::Comma) {
                    break;
                }
            }
            self.expect_punct(Punct::RParen, "`)` after parameter list");
        } else {
            self.issue_here("expected `(` after function name".to_string());
        }
        let body = self.parse_statements(&[Keyword::EndDef]);
        self.expect_terminator(Keyword::EndDef);
        Some(Stmt::Def(FuncDef { name, params, body }))
    }

    fn parse_state(&mut self) -> Option<Stmt> {
        // STATE SET path = expr is a statement; STATE GET path is an
        // expression and falls through to expression parsing so it can
        // appear anywhere an expression can.
        if self.peek_ahead(1).kind == TokenKind::Keyword(Keyword::Set) {
            self.advance(); // STATE
            self.advance(); // SET
            let path = self.parse_dotted_path("state path after STATE SET")?;
            self.expect_op(Op::Assign, "`=` after state path");
            return Some(Stmt::StateSet { path, value: self.parse_expr() });
        }
        Some(Stmt::Expr(self.parse_expr()))
    }

    // ── Expressions ──────────────────────────────────────────────────

    fn parse_expr(&mut self) -> Expr {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Expr {
        let mut left = self.parse_and();
        while self.eat_keyword(Keyword::Or) {
            let right = self.parse_and();
            left = Expr::Binary { left: Box::new(left), op: BinaryOp::Or, right: Box::new(right) };
        }
        left
    }

    fn parse_and(&mut self) -> Expr {
        let mut left = self.parse_comparison();
        while self.eat_keyword(Keyword::And) {
            let right = self.parse_comparison();
            left = Expr::Binary { left: Box::new(left), op: BinaryOp::And, right: Box::new(right) };
        }
        left
    }

    fn parse_comparison(&mut self) -> Expr {
        let mut left = self.parse_additive();
        loop {
            let op = match self.peek().kind {
                TokenKind::Operator(Op::Eq) => BinaryOp::Eq,
                TokenKind::Operator(Op::NotEq) => BinaryOp::NotEq,
                TokenKind::Operator(Op::Lt) => BinaryOp::Lt,
                TokenKind::Operator(Op::Gt) => BinaryOp::Gt,
                TokenKind::Operator(Op::LtEq) => BinaryOp::LtEq,
                TokenKind::Operator(Op::GtEq) => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive();
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right) };
        }
        left
    }

    fn parse_additive(&mut self) -> Expr {
        let mut left = self.parse_multiplicative();
        loop {
            let op = match self.peek().kind {
                TokenKind::Operator(Op::Plus) => BinaryOp::Add,
                TokenKind::Operator(Op::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative();
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right) };
        }
        left
    }

    fn parse_multiplicative(&mut self) -> Expr {
        let mut left = self.parse_unary();
        loop {
            let op = match self.peek().kind {
                TokenKind::Operator(Op::Star) => BinaryOp::Mul,
                TokenKind::Operator(Op::Slash) => BinaryOp::Div,
                TokenKind::Operator(Op::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary();
            left = Expr::Binary { left: Box::new(left), op, right: Box::new(right) };
        }
        left
    }

    fn parse_unary(&mut self) -> Expr {
        match self.peek().kind {
            TokenKind::Operator(Op::Minus) => {
                self.advance();
                Expr::Unary { op: UnaryOp::Neg, operand: Box::new(self.parse_unary()) }
            }
            TokenKind::Keyword(Keyword::Not) => {
                self.advance();
                Expr::Unary { op: UnaryOp::Not, operand: Box::new(self.parse_unary()) }
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Expr {
        match self.peek().kind {
            TokenKind::Number => {
                let token = self.advance();
                Expr::Literal(parse_number(&token.text))
            }
            TokenKind::String => {
                let token = self.advance();
                Expr::Literal(Value::Str(token.text))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Expr::Literal(Value::Bool(true))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Expr::Literal(Value::Bool(false))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Expr::Literal(Value::Null)
            }
            TokenKind::Punct(Punct::LParen) => {
                self.advance();
                let expr = self.parse_expr();
                self.expect_punct(Punct::RParen, "`)` to close parenthesized expression");
                expr
            }
            TokenKind::Punct(Punct::LBracket) => self.parse_list(),
            TokenKind::Keyword(Keyword::State) => {
                self.advance();
                self.expect_keyword(Keyword::Get, "`GET` after STATE in an expression");
                let path = self
                    .parse_dotted_path("state path after STATE GET")
                    .unwrap_or_default();
                Expr::StateGet { path }
            }
            TokenKind::Identifier => self.parse_identifier_expr(),
            _ => {
                self.issue_here(format!("expected expression, found {:?}", self.peek().text));
                if self.peek().kind != TokenKind::End {
                    self.advance();
                }
                Expr::Literal(Value::Null)
            }
        }
    }

    fn parse_list(&mut self) -> Expr {
        self.advance(); // [
        let mut items = Vec::new();
        if !self.check_punct(Punct::RBracket) {
            loop {
                items.push(self.parse_expr());
                if !self.eat_punct(Punct::Comma) {
                    break;
                }
            }
        }
        self.expect_punct(Punct::RBracket, "`]` to close list literal");
        Expr::List(items)
    }

    /// Identifier-led expression: variable reference, function call, or
    /// — when a dot joins two identifiers ahead of an argument list — a
    /// capability call.
    fn parse_identifier_expr(&mut self) -> Expr {
        let name = self.advance().text;

        if self.check_punct(Punct::Dot) {
            if self.peek_ahead(1).kind == TokenKind::Identifier
                && self.peek_ahead(2).kind == TokenKind::Punct(Punct::LParen)
            {
                self.advance(); // .
                let operation = self.advance().text;
                let args = self.parse_args();
                return Expr::Capability {
                    namespace: name.to_uppercase(),
                    operation: operation.to_uppercase(),
                    args,
                };
            }
            self.issue_here(format!(
                "expected capability call `{}.OPERATION(...)` after `.`",
                name
            ));
            self.advance(); // consume the dot and degrade to a variable ref
            return Expr::Var(name);
        }

        if self.check_punct(Punct::LParen) {
            let args = self.parse_args();
            return Expr::Call { name, args };
        }

        Expr::Var(name)
    }

    fn parse_args(&mut self) -> Vec<Expr> {
        self.advance(); // (
        let mut args = Vec::new();
        if !self.check_punct(Punct::RParen) {
            loop {
                args.push(self.parse_expr());
                if !self.eat_punct(Punct::Comma) {
                    break;
                }
            }
        }
        self.expect_punct(Punct::RParen, "`)` to close argument list");
        args
    }

    /// `a.b.c` — dotted identifier path, returned as a single string.
    fn parse_dotted_path(&mut self, what: &str) -> Option<String> {
        let mut path = self.expect_identifier(what)?;
        while self.check_punct(Punct::Dot) && self.peek_ahead(1).kind == TokenKind::Identifier {
            self.advance(); // .
            path.push('.');
            path.push_str(&self.advance().text);
        }
        Some(path)
    }

    // ── Token helpers ────────────────────────────────────────────────

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_ahead(&self, n: usize) -> &Token {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check_punct(&self, punct: Punct) -> bool {
        self.peek().kind == TokenKind::Punct(punct)
    }

    fn eat_punct(&mut self, punct: Punct) -> bool {
        if self.check_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.peek().kind == TokenKind::Keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Option<String> {
        if self.peek().kind == TokenKind::Identifier {
            Some(self.advance().text)
        } else {
            self.issue_here(format!("expected {what}"));
            None
        }
    }

    fn expect_op(&mut self, op: Op, what: &str) {
        if self.peek().kind == TokenKind::Operator(op) {
            self.advance();
        } else {
            self.issue_here(format!("expected {what}"));
        }
    }

    fn expect_punct(&mut self, punct: Punct, what: &str) {
        if !self.eat_punct(punct) {
            self.issue_here(format!("expected {what}"));
        }
    }

    fn expect_keyword(&mut self, kw: Keyword, what: &str) {
        if !self.eat_keyword(kw) {
            self.issue_here(format!("expected {what}"));
        }
    }

    /// Consume a block terminator, tolerating its absence at
    /// end-of-stream (permissive-termination policy).
    fn expect_terminator(&mut self, kw: Keyword) {
        if !self.eat_keyword(kw) {
            self.issue_here(format!("missing `{}`", kw.as_str()));
        }
    }

    fn at_expr_start(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Number
                | TokenKind::String
                | TokenKind::Identifier
                | TokenKind::Keyword(
                    Keyword::True | Keyword::False | Keyword::Null | Keyword::Not | Keyword::State
                )
                | TokenKind::Punct(Punct::LParen | Punct::LBracket)
                | TokenKind::Operator(Op::Minus)
        )
    }

    fn issue_here(&mut self, message: String) {
        let (line, column) = {
            let token = self.peek();
            (token.line, token.column)
        };
        self.issues.push(ParseIssue { message, line, column });
    }
}

fn parse_number(text: &str) -> Value {
    if text.contains('.') {
        Value::Float(text.parse().unwrap_or(0.0))
    } else {
        // Integers too large for i64 degrade to float rather than error.
        match text.parse::<i64>() {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Float(text.parse().unwrap_or(0.0)),
        }
    }
}
