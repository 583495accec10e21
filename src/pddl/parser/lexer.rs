use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::{Error, Position};
use TokenKind::*;
use KeywordToken::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
    pub len: usize,
}

impl Span {
    pub fn new(line: usize, col: usize, len: usize) -> Self {
        Span { line, col, len }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeywordToken {
    Domain,
    Requirements,
    Types,
    Objects,
    Init,
    Goal,
    Predicates,
    Action,
    Parameters,
    Precondition,
    Effect,
    And,
    Not,
    Or,
    Imply,
    Exists,
    Forall,
    When,
    Either,
}

impl fmt::Display for KeywordToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Domain => "domain",
            Requirements => "requirements",
            Types => "types",
            Objects => "objects",
            Init => "init",
            Goal => "goal",
            Predicates => "predicates",
            Action => "action",
            Parameters => "parameters",
            Precondition => "precondition",
            Effect => "effect",
            And => "and",
            Not => "not",
            Or => "or",
            Imply => "imply",
            Exists => "exists",
            Forall => "forall",
            When => "when",
            Either => "either",
        };
        write!(f, "{}", word)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind<'a> {
    OpenParenthesis,
    CloseParenthesis,
    Colon,
    QuestionMark,
    Minus,
    Equals,
    Keyword(KeywordToken),
    Identifier(&'a str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    pub span: Span,
    pub kind: TokenKind<'a>,
}

/// Tokenizer for PDDL text. Section keywords (`requirements`, `init`, ...) are only recognised
/// right after a `:`, so they stay usable as ordinary names elsewhere. `define`, `domain` and
/// `problem` in the header are identifiers; the parser matches them by name.
pub struct Lexer<'a> {
    text: &'a str,
    it: Peekable<CharIndices<'a>>,
    line: usize, // current source line, used for error reporting by Tokens
    col: usize, // current source column, used for error reporting by Tokens
    after_colon: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            it: text.char_indices().peekable(),
            line: 1,
            col: 1,
            after_colon: false,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let after_colon = std::mem::replace(&mut self.after_colon, false);
        let (offset, c) = loop {
            match self.next_char()? {
                (_, c) if c.is_whitespace() => self.col += 1,
                next => break next,
            }
        };
        let new_token = match c {
            ':' => { self.after_colon = true; Ok(Token { span: Span::new(self.line, self.col, 1), kind: Colon }) },
            '(' => Ok(Token { span: Span::new(self.line, self.col, 1), kind: OpenParenthesis }),
            ')' => Ok(Token { span: Span::new(self.line, self.col, 1), kind: CloseParenthesis }),
            '?' => Ok(Token { span: Span::new(self.line, self.col, 1), kind: QuestionMark }),
            '-' => Ok(Token { span: Span::new(self.line, self.col, 1), kind: Minus }),
            '=' => Ok(Token { span: Span::new(self.line, self.col, 1), kind: Equals }),
            c if c.is_alphanumeric() || c == '_' => Ok(self.identifier(offset, after_colon)),
            _ => Err(Error::new(Position::Span(Span::new(self.line, self.col, 1)), "Unexpected character.")),
        };
        match &new_token {
            Ok(t) => self.col += t.span.len,
            Err(_) => self.col += 1,
        }
        Some(new_token)
    }
}

impl<'a> Lexer<'a> {
    /// Next significant character, skipping newlines and `;` comments.
    fn next_char(&mut self) -> Option<(usize, char)> {
        loop {
            match self.it.next()? {
                (_, '\n') => { self.col = 1; self.line += 1; },
                (_, ';') => while self.it.next_if(|(_, c)| *c != '\n').is_some() {},
                c => return Some(c),
            }
        }
    }

    fn identifier(&mut self, offset: usize, after_colon: bool) -> Token<'a> {
        let mut len = 1;
        while self.it.next_if(|(_, c)| c.is_alphanumeric() || *c == '_' || *c == '-').is_some() { len += 1; }
        let slice = match self.it.peek() {
            Some((identifier_end, _)) => &self.text[offset..*identifier_end],
            None => &self.text[offset..],
        };
        let kind = match (after_colon, slice.to_ascii_lowercase().as_str()) {
            (true, "domain") => Keyword(Domain),
            (true, "requirements") => Keyword(Requirements),
            (true, "types") => Keyword(Types),
            (true, "objects") => Keyword(Objects),
            (true, "init") => Keyword(Init),
            (true, "goal") => Keyword(Goal),
            (true, "predicates") => Keyword(Predicates),
            (true, "action") => Keyword(Action),
            (true, "parameters") => Keyword(Parameters),
            (true, "precondition") => Keyword(Precondition),
            (true, "effect") => Keyword(Effect),
            (false, "and") => Keyword(And),
            (false, "not") => Keyword(Not),
            (false, "or") => Keyword(Or),
            (false, "imply") => Keyword(Imply),
            (false, "exists") => Keyword(Exists),
            (false, "forall") => Keyword(Forall),
            (false, "when") => Keyword(When),
            (false, "either") => Keyword(Either),
            _ => Identifier(slice),
        };
        Token { span: Span::new(self.line, self.col, len), kind }
    }
}
