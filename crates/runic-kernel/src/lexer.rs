//! Lexer for runic source code.
//!
//! Converts source text into a flat token stream using the logos lexer
//! generator. The lexer is total: it always terminates and never fails.
//! Lexically invalid characters are skipped rather than erroring
//! (permissive-lexer policy); each skip is recorded as a [`LexIssue`] so
//! strict parse mode can reject the script instead.
//!
//! # Token Categories
//!
//! - **Keywords**: `SET`, `IF`, `FOR`, `WHILE`, `DEF`, `PRINT`, `RETURN`,
//!   `STATE`, block terminators, and the logical/literal words. Keyword
//!   matching is case-insensitive by normalization: `set`, `Set`, and
//!   `SET` all produce the same canonical uppercase keyword token.
//! - **Literals**: single- or double-quoted strings with backslash
//!   escapes, decimal numbers (integer and fractional, no exponent form)
//! - **Operators**: `==` `!=` `<=` `>=` `<` `>` `=` `+` `-` `*` `/` `%`
//!   (multi-character operators match before single-character ones)
//! - **Punctuation**: `(` `)` `[` `]` `,` `.`
//! - **Newlines**: emitted as explicit tokens, discarded before parsing
//!   (the grammar is newline-insensitive)
//!
//! Line comments run from `#` to end of line.

use logos::Logos;
use std::fmt;

/// A lexed token: classification, normalized text, and source position.
///
/// `text` holds the canonical form: uppercase for keywords, unescaped
/// content (without quotes) for strings, raw source text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    Number,
    String,
    Operator(Op),
    Punct(Punct),
    Newline,
    /// End-of-stream marker, always the final token.
    End,
}

/// The fixed keyword set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Set,
    If,
    Else,
    EndIf,
    For,
    In,
    EndFor,
    While,
    EndWhile,
    Def,
    EndDef,
    Print,
    Return,
    State,
    Get,
    And,
    Or,
    Not,
    True,
    False,
    Null,
}

impl Keyword {
    /// Canonical uppercase spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Set => "SET",
            Keyword::If => "IF",
            Keyword::Else => "ELSE",
            Keyword::EndIf => "ENDIF",
            Keyword::For => "FOR",
            Keyword::In => "IN",
            Keyword::EndFor => "ENDFOR",
            Keyword::While => "WHILE",
            Keyword::EndWhile => "ENDWHILE",
            Keyword::Def => "DEF",
            Keyword::EndDef => "ENDDEF",
            Keyword::Print => "PRINT",
            Keyword::Return => "RETURN",
            Keyword::State => "STATE",
            Keyword::Get => "GET",
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Not => "NOT",
            Keyword::True => "TRUE",
            Keyword::False => "FALSE",
            Keyword::Null => "NULL",
        }
    }
}

/// Operator tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Assign,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

/// Punctuation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
}

/// A character the lexer skipped because no token matched it.
#[derive(Debug, Clone, PartialEq)]
pub struct LexIssue {
    pub text: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for LexIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid character {:?} at line {}, column {}",
            self.text, self.line, self.column
        )
    }
}

/// Raw logos token set. Mapped to the public [`Token`] by the driver.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"#[^\n]*")]
enum RawToken {
    #[token("\n")]
    Newline,

    #[token("set", ignore(ascii_case))]
    KwSet,
    #[token("if", ignore(ascii_case))]
    KwIf,
    #[token("else", ignore(ascii_case))]
    KwElse,
    #[token("endif", ignore(ascii_case))]
    KwEndIf,
    #[token("for", ignore(ascii_case))]
    KwFor,
    #[token("in", ignore(ascii_case))]
    KwIn,
    #[token("endfor", ignore(ascii_case))]
    KwEndFor,
    #[token("while", ignore(ascii_case))]
    KwWhile,
    #[token("endwhile", ignore(ascii_case))]
    KwEndWhile,
    #[token("def", ignore(ascii_case))]
    KwDef,
    #[token("enddef", ignore(ascii_case))]
    KwEndDef,
    #[token("print", ignore(ascii_case))]
    KwPrint,
    #[token("return", ignore(ascii_case))]
    KwReturn,
    #[token("state", ignore(ascii_case))]
    KwState,
    #[token("get", ignore(ascii_case))]
    KwGet,
    #[token("and", ignore(ascii_case))]
    KwAnd,
    #[token("or", ignore(ascii_case))]
    KwOr,
    #[token("not", ignore(ascii_case))]
    KwNot,
    #[token("true", ignore(ascii_case))]
    KwTrue,
    #[token("false", ignore(ascii_case))]
    KwFalse,
    #[token("null", ignore(ascii_case))]
    KwNull,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    DoubleQuoted,
    #[regex(r"'([^'\\\n]|\\.)*'")]
    SingleQuoted,

    // Multi-character operators are listed before their single-character
    // prefixes; logos picks the longest match, so `==` never lexes as
    // `=`, `=`.
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
}

/// Tokenize source text. Total and permissive: invalid characters are
/// dropped from the stream. The final token is always [`TokenKind::End`].
pub fn tokenize(source: &str) -> Vec<Token> {
    tokenize_full(source).0
}

/// Tokenize, also returning the characters that were skipped.
///
/// Strict parse mode treats a non-empty issue list as a parse error;
/// permissive mode ignores it.
pub fn tokenize_full(source: &str) -> (Vec<Token>, Vec<LexIssue>) {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut issues = Vec::new();

    let mut lexer = RawToken::lexer(source);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = index.position(span.start);
        let slice = lexer.slice();
        match result {
            Ok(raw) => tokens.push(Token {
                kind: raw_kind(&raw),
                text: token_text(&raw, slice),
                line,
                column,
            }),
            Err(()) => issues.push(LexIssue {
                text: slice.to_string(),
                line,
                column,
            }),
        }
    }

    let (line, column) = index.position(source.len());
    tokens.push(Token {
        kind: TokenKind::End,
        text: String::new(),
        line,
        column,
    });

    (tokens, issues)
}

fn raw_kind(raw: &RawToken) -> TokenKind {
    match raw {
        RawToken::Newline => TokenKind::Newline,
        RawToken::KwSet => TokenKind::Keyword(Keyword::Set),
        RawToken::KwIf => TokenKind::Keyword(Keyword::If),
        RawToken::KwElse => TokenKind::Keyword(Keyword::Else),
        RawToken::KwEndIf => TokenKind::Keyword(Keyword::EndIf),
        RawToken::KwFor => TokenKind::Keyword(Keyword::For),
        RawToken::KwIn => TokenKind::Keyword(Keyword::In),
        RawToken::KwEndFor => TokenKind::Keyword(Keyword::EndFor),
        RawToken::KwWhile => TokenKind::Keyword(Keyword::While),
        RawToken::KwEndWhile => TokenKind::Keyword(Keyword::EndWhile),
        RawToken::KwDef => TokenKind::Keyword(Keyword::Def),
        RawToken::KwEndDef => TokenKind::Keyword(Keyword::EndDef),
        RawToken::KwPrint => TokenKind::Keyword(Keyword::Print),
        RawToken::KwReturn => TokenKind::Keyword(Keyword::Return),
        RawToken::KwState => TokenKind::Keyword(Keyword::State),
        RawToken::KwGet => TokenKind::Keyword(Keyword::Get),
        RawToken::KwAnd => TokenKind::Keyword(Keyword::And),
        RawToken::KwOr => TokenKind::Keyword(Keyword::Or),
        RawToken::KwNot => TokenKind::Keyword(Keyword::Not),
        RawToken::KwTrue => TokenKind::Keyword(Keyword::True),
        RawToken::KwFalse => TokenKind::Keyword(Keyword::False),
        RawToken::KwNull => TokenKind::Keyword(Keyword::Null),
        RawToken::Ident => TokenKind::Identifier,
        RawToken::Number => TokenKind::Number,
        RawToken::DoubleQuoted | RawToken::SingleQuoted => TokenKind::String,
        RawToken::EqEq => TokenKind::Operator(Op::Eq),
        RawToken::NotEq => TokenKind::Operator(Op::NotEq),
        RawToken::LtEq => TokenKind::Operator(Op::LtEq),
        RawToken::GtEq => TokenKind::Operator(Op::GtEq),
        RawToken::Lt => TokenKind::Operator(Op::Lt),
        RawToken::Gt => TokenKind::Operator(Op::Gt),
        RawToken::Assign => TokenKind::Operator(Op::Assign),
        RawToken::Plus => TokenKind::Operator(Op::Plus),
        RawToken::Minus => TokenKind::Operator(Op::Minus),
        RawToken::Star => TokenKind::Operator(Op::Star),
        RawToken::Slash => TokenKind::Operator(Op::Slash),
        RawToken::Percent => TokenKind::Operator(Op::Percent),
        RawToken::LParen => TokenKind::Punct(Punct::LParen),
        RawToken::RParen => TokenKind::Punct(Punct::RParen),
        RawToken::LBracket => TokenKind::Punct(Punct::LBracket),
        RawToken::RBracket => TokenKind::Punct(Punct::RBracket),
        RawToken::Comma => TokenKind::Punct(Punct::Comma),
        RawToken::Dot => TokenKind::Punct(Punct::Dot),
    }
}

/// Normalized token text: keywords fold to uppercase, strings are
/// unescaped and unquoted, everything else keeps its source slice.
fn token_text(raw: &RawToken, slice: &str) -> String {
    match raw_kind(raw) {
        TokenKind::Keyword(kw) => kw.as_str().to_string(),
        TokenKind::String => unescape(&slice[1..slice.len() - 1]),
        _ => slice.to_string(),
    }
}

/// Process backslash escapes inside a string literal body.
///
/// Recognizes `\n`, `\t`, `\r`, `\\`, `\"`, `\'`; an unrecognized escape
/// keeps the escaped character as-is.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Byte-offset → (line, column) mapping, both 1-based.
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    fn position(&self, offset: usize) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = offset - self.line_starts[line];
        (line as u32 + 1, column as u32 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_source_yields_end() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::End);
    }

    #[test]
    fn keywords_case_fold_to_uppercase() {
        for spelling in ["set", "Set", "SET", "sEt"] {
            let tokens = tokenize(spelling);
            assert_eq!(tokens[0].kind, TokenKind::Keyword(Keyword::Set));
            assert_eq!(tokens[0].text, "SET");
        }
    }

    #[test]
    fn keyword_prefix_is_an_identifier() {
        // `settings` must not lex as SET + tings.
        let tokens = tokenize("settings forward");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "settings");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].text, "forward");
    }

    #[test]
    fn multi_char_operators_win() {
        let tokens = tokenize("x == 1");
        assert_eq!(tokens[1].kind, TokenKind::Operator(Op::Eq));
        let tokens = tokenize("x = 1");
        assert_eq!(tokens[1].kind, TokenKind::Operator(Op::Assign));
        let tokens = tokenize("x <= 1");
        assert_eq!(tokens[1].kind, TokenKind::Operator(Op::LtEq));
    }

    #[test]
    fn numbers_integer_and_fractional() {
        let tokens = tokenize("42 3.25");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "42");
        assert_eq!(tokens[1].kind, TokenKind::Number);
        assert_eq!(tokens[1].text, "3.25");
    }

    #[test]
    fn strings_both_quote_styles() {
        let tokens = tokenize(r#""hello" 'world'"#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].text, "world");
    }

    #[test]
    fn string_escapes() {
        let tokens = tokenize(r#""a\nb\t\"c\"""#);
        assert_eq!(tokens[0].text, "a\nb\t\"c\"");
    }

    #[test]
    fn comments_run_to_end_of_line() {
        let tokens = tokenize("set x = 1 # the answer\nprint x");
        let kws: Vec<_> = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Keyword(_)))
            .map(|t| t.text.clone())
            .collect();
        assert_eq!(kws, vec!["SET", "PRINT"]);
    }

    #[test]
    fn newlines_are_explicit_tokens() {
        assert!(kinds("a\nb").contains(&TokenKind::Newline));
    }

    #[test]
    fn invalid_characters_are_skipped_not_fatal() {
        let (tokens, issues) = tokenize_full("set x @ = $ 1");
        assert_eq!(issues.len(), 2);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Set),
                TokenKind::Identifier,
                TokenKind::Operator(Op::Assign),
                TokenKind::Number,
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn positions_are_one_based() {
        let tokens = tokenize("set x\nprint x");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[0].text.as_str()), "SET");
        let print = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Keyword(Keyword::Print))
            .unwrap();
        assert_eq!((print.line, print.column), (2, 1));
    }

    #[test]
    fn dotted_call_shape() {
        let kinds = kinds("FILE.READ(\"a.txt\")");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Punct(Punct::Dot),
                TokenKind::Identifier,
                TokenKind::Punct(Punct::LParen),
                TokenKind::String,
                TokenKind::Punct(Punct::RParen),
                TokenKind::End,
            ]
        );
    }
}
