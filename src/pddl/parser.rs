pub mod lexer;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use enumset::{enum_set, EnumSet};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::PlanningError;
use super::action::{Action, Parameter};
use super::domain::{Domain, Requirement};
use super::expression::{Atom, Formula, Term};
use super::predicate::Predicate;
use super::problem::{Problem, TypedObject};
use lexer::{KeywordToken, Lexer, Span, Token, TokenKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    Span(Span),
    EOF,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Span(span) => write!(f, "line:{} col:{}", span.line, span.col),
            Position::EOF => write!(f, "end of input"),
        }
    }
}

/// Positional reader error. `unsupported` is set when the text is well formed but uses a
/// construct outside the STRIPS fragment.
#[derive(Error, Clone, Debug, PartialEq)]
#[error("{pos} {message}")]
pub struct Error {
    pub pos: Position,
    pub message: String,
    pub unsupported: Option<PlanningError>,
}

impl Error {
    pub fn new(pos: Position, message: &str) -> Self {
        Error { pos, message: String::from(message), unsupported: None }
    }

    fn unsupported(span: Span, construct: String) -> Self {
        let cause = PlanningError::UnsupportedFormula(construct);
        Error { pos: Position::Span(span), message: cause.to_string(), unsupported: Some(cause) }
    }
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("failed to read '{}': {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("{}: {error}", path.display())]
    Parse { path: PathBuf, error: Error },
}

#[derive(Debug)]
pub enum Definition {
    Domain(Domain),
    Problem(Problem),
}

/// Requirements the planner honours; anything else is parsed but only warned about.
pub const SUPPORTED_REQUIREMENTS: EnumSet<Requirement> =
    enum_set!(Requirement::Strips | Requirement::Typing | Requirement::NegativePreconditions);

/// Parses the STRIPS subset of PDDL: typed objects, `and`/`not` formulas and literal effects.
pub struct Parser<'a> {
    lexer: std::iter::Peekable<Lexer<'a>>,
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Definition, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lexer.peek()?;
        Some(self.root())
    }
}

const EXPECTED_IDENTIFIER: &str = "Expected identifier.";
const EXPECTED_COLON: &str = "Expected ':'.";
const EXPECTED_OPEN_PARENTHESIS: &str = "Expected '('.";
const EXPECTED_CLOSE_PARENTHESIS: &str = "Expected matched ')'.";

macro_rules! expect {
    ($input:expr, {$($p:pat $(if $g:expr)? => $b:expr$(,)?)+}, $err:expr) => {
        match $input {
            $($p $(if $g)? => $b,)+
            Some(Ok(Token{span,..})) => Err(Error::new(Position::Span(span), $err)),
            Some(Err(e)) => Err(e),
            None => Err(Error::new(Position::EOF, $err)),
        }
    };
}

impl<'a> Parser<'a> {
    pub fn new(code: &'a str) -> Self {
        let lexer = Lexer::new(code).peekable();
        Self { lexer }
    }

    fn identifier(&mut self) -> Result<&'a str, Error> {
        use TokenKind::Identifier;
        expect!(self.lexer.next(), {Some(Ok(Token{kind:Identifier(s),..})) => Ok(s)}, EXPECTED_IDENTIFIER)
    }

    fn close(&mut self) -> Result<(), Error> {
        use TokenKind::CloseParenthesis;
        expect!(self.lexer.next(), {Some(Ok(Token{kind:CloseParenthesis,..})) => Ok(())}, EXPECTED_CLOSE_PARENTHESIS)
    }

    fn open(&mut self) -> Result<(), Error> {
        use TokenKind::OpenParenthesis;
        expect!(self.lexer.next(), {Some(Ok(Token{kind:OpenParenthesis,..})) => Ok(())}, EXPECTED_OPEN_PARENTHESIS)
    }

    fn peek_is(&mut self, kind: TokenKind) -> bool {
        matches!(self.lexer.peek(), Some(Ok(Token{kind: k,..})) if *k == kind)
    }

    fn root(&mut self) -> Result<Definition, Error> {
        use TokenKind::Identifier;

        self.open()?;
        expect!(self.lexer.next(), {
            Some(Ok(Token{kind:Identifier(s),..})) if s.eq_ignore_ascii_case("define") => Ok(()),
        }, "Expected 'define'.")?;
        self.open()?;
        let body = expect!(self.lexer.next(), {
            Some(Ok(Token{kind:Identifier(s),..})) if s.eq_ignore_ascii_case("domain") => self.domain().map(Definition::Domain),
            Some(Ok(Token{kind:Identifier(s),..})) if s.eq_ignore_ascii_case("problem") => self.problem().map(Definition::Problem),
        }, "Expected 'domain' or 'problem'.")?;
        self.close()?;
        Ok(body)
    }

    fn domain(&mut self) -> Result<Domain, Error> {
        use TokenKind::{Keyword, Colon, OpenParenthesis};
        use KeywordToken::{Requirements, Types, Predicates};
        let name = self.identifier()?;
        self.close()?;
        let mut domain = Domain::new(name, Vec::new(), Vec::new());
        while self.lexer.next_if(|r| matches!(r, Ok(Token{kind:OpenParenthesis,..}))).is_some() {
            expect!(self.lexer.next(), {Some(Ok(Token{kind:Colon,..})) => Ok(())}, EXPECTED_COLON)?;
            expect!(self.lexer.next(), {
                Some(Ok(Token{kind:Keyword(Requirements),..})) => Ok(domain.requirements = self.requirements()?),
                // Types are compared by exact name, so the hierarchy itself is not kept.
                Some(Ok(Token{kind:Keyword(Types),..})) => self.typed_list(false).map(|types| debug!("Domain {} declares {} types.", name, types.len())),
                Some(Ok(Token{kind:Keyword(Predicates),..})) => Ok(domain.predicates = self.predicates()?),
                Some(Ok(Token{kind:Keyword(KeywordToken::Action),..})) => Ok(domain.actions.push(self.action()?)),
            }, "Expected :requirements, :types, :predicates, or :action.")?;
            self.close()?;
        }
        Ok(domain)
    }

    fn problem(&mut self) -> Result<Problem, Error> {
        use TokenKind::{Keyword, Colon, OpenParenthesis};
        use KeywordToken::{Domain, Requirements, Objects, Init, Goal};
        let name = self.identifier()?;
        self.close()?;
        let mut domain = "";
        let mut objects = Vec::new();
        let mut init = Vec::new();
        let mut goal = None;
        while self.lexer.next_if(|r| matches!(r, Ok(Token{kind:OpenParenthesis,..}))).is_some() {
            expect!(self.lexer.next(), {Some(Ok(Token{kind:Colon,..})) => Ok(())}, EXPECTED_COLON)?;
            expect!(self.lexer.next(), {
                Some(Ok(Token{kind:Keyword(Domain),..})) => Ok(domain = self.identifier()?),
                Some(Ok(Token{kind:Keyword(Requirements),..})) => self.requirements().map(|_| ()),
                Some(Ok(Token{kind:Keyword(Objects),..})) => Ok(objects = self.typed_list(false)?
                    .into_iter()
                    .map(|(name, kind)| TypedObject { name: name.to_string(), kind: kind.map(String::from) })
                    .collect()),
                Some(Ok(Token{kind:Keyword(Init),..})) => Ok(init = self.facts()?),
                Some(Ok(Token{kind:Keyword(Goal),..})) => Ok(goal = Some(self.formula()?)),
            }, "Expected :domain, :requirements, :objects, :init, or :goal.")?;
            self.close()?;
        }
        let goal = goal.ok_or_else(|| Error::new(Position::EOF, "Problem has no :goal."))?;
        Ok(Problem::new(name, domain, objects, init, goal))
    }

    fn requirements(&mut self) -> Result<EnumSet<Requirement>, Error> {
        use TokenKind::{Colon, Identifier};
        let mut r = EnumSet::empty();
        while self.lexer.next_if(|t| matches!(t, Ok(Token{kind:Colon,..}))).is_some() {
            expect!(self.lexer.next(), {
                Some(Ok(Token{span, kind:Identifier(s)})) => match Requirement::from_name(s) {
                    Some(requirement) => Ok(r.insert(requirement)),
                    None => Err(Error::new(Position::Span(span), "Unknown requirement.")),
                },
            }, "Expected requirement.")?;
        }
        Ok(r)
    }

    fn predicates(&mut self) -> Result<Vec<Predicate>, Error> {
        use TokenKind::OpenParenthesis;
        let mut predicates = Vec::new();
        while self.lexer.next_if(|t| matches!(t, Ok(Token{kind:OpenParenthesis,..}))).is_some() {
            let name = self.identifier()?;
            let parameters = self.parameters()?;
            predicates.push(Predicate::new(name, parameters));
            self.close()?;
        }
        Ok(predicates)
    }

    fn parameters(&mut self) -> Result<Vec<Parameter>, Error> {
        Ok(self.typed_list(true)?
            .into_iter()
            .map(|(name, kind)| Parameter { name: name.to_string(), kind: kind.map(String::from) })
            .collect())
    }

    /// `a b - t c` style list, of `?`-variables when `variables` is set. Names after the last
    /// `- type` are untyped.
    fn typed_list(&mut self, variables: bool) -> Result<Vec<(&'a str, Option<&'a str>)>, Error> {
        use TokenKind::{Minus, QuestionMark, Identifier, OpenParenthesis, Keyword};
        let mut result = Vec::new();
        let mut pending = Vec::new();
        loop {
            if variables && self.lexer.next_if(|t| matches!(t, Ok(Token{kind:QuestionMark,..}))).is_some() {
                pending.push(self.identifier()?);
            } else if let Some(Ok(Token{kind:Identifier(s),..})) = self.lexer.next_if(|t| !variables && matches!(t, Ok(Token{kind:Identifier(_),..}))) {
                pending.push(s);
            } else if self.lexer.next_if(|t| matches!(t, Ok(Token{kind:Minus,..}))).is_some() {
                let kind = expect!(self.lexer.next(), {
                    Some(Ok(Token{kind:Identifier(s),..})) => Ok(s),
                    Some(Ok(Token{span, kind:OpenParenthesis})) => match self.lexer.peek() {
                        Some(Ok(Token{kind:Keyword(KeywordToken::Either),..})) => Err(Error::new(Position::Span(span), "Either types are not supported.")),
                        _ => Err(Error::new(Position::Span(span), EXPECTED_IDENTIFIER)),
                    },
                }, "Expected type name after '-'.")?;
                result.extend(pending.drain(..).map(|name| (name, Some(kind))));
            } else {
                break;
            }
        }
        result.extend(pending.into_iter().map(|name| (name, None)));
        Ok(result)
    }

    fn action(&mut self) -> Result<Action, Error> {
        use TokenKind::{Keyword, Colon};
        use KeywordToken::{Parameters, Precondition, Effect};
        let name = self.identifier()?;
        let mut parameters = Vec::new();
        let mut precondition = Formula::And(Vec::new());
        let mut effect = Formula::And(Vec::new());
        while self.lexer.next_if(|t| matches!(t, Ok(Token{kind:Colon,..}))).is_some() {
            expect!(self.lexer.next(), {
                Some(Ok(Token{kind:Keyword(Parameters),..})) => {
                    self.open()?;
                    parameters = self.parameters()?;
                    self.close()
                },
                Some(Ok(Token{kind:Keyword(Precondition),..})) => Ok(precondition = self.formula()?),
                Some(Ok(Token{kind:Keyword(Effect),..})) => Ok(effect = self.formula()?),
            }, "Expected :parameters, :precondition, or :effect.")?;
        }
        Ok(Action::new(name, parameters, precondition, effect))
    }

    /// Contents of `:init`, a list of atoms.
    fn facts(&mut self) -> Result<Vec<Atom>, Error> {
        use TokenKind::{Identifier, OpenParenthesis};
        let mut facts = Vec::new();
        while self.lexer.next_if(|t| matches!(t, Ok(Token{kind:OpenParenthesis,..}))).is_some() {
            let name = expect!(self.lexer.next(), {Some(Ok(Token{kind:Identifier(s),..})) => Ok(s)}, "Expected fact.")?;
            facts.push(self.atom(name)?.grounded());
            self.close()?;
        }
        Ok(facts)
    }

    fn atom(&mut self, name: &str) -> Result<Atom, Error> {
        use TokenKind::{Identifier, QuestionMark};
        let mut terms = Vec::new();
        loop {
            if self.lexer.next_if(|t| matches!(t, Ok(Token{kind:QuestionMark,..}))).is_some() {
                terms.push(Term::variable(self.identifier()?));
            } else if let Some(Ok(Token{kind:Identifier(s),..})) = self.lexer.next_if(|t| matches!(t, Ok(Token{kind:Identifier(_),..}))) {
                terms.push(Term::constant(s));
            } else {
                break;
            }
        }
        Ok(Atom::new(name, terms))
    }

    fn and(&mut self) -> Result<Formula, Error> {
        use TokenKind::OpenParenthesis;
        let mut group = Vec::new();
        while self.peek_is(OpenParenthesis) {
            group.push(self.formula()?)
        }
        Ok(Formula::And(group))
    }

    fn formula(&mut self) -> Result<Formula, Error> {
        use TokenKind::{Keyword, Identifier, CloseParenthesis, Equals};
        use KeywordToken::{And, Not, Or, Imply, Exists, Forall, When};
        self.open()?;
        if self.lexer.next_if(|t| matches!(t, Ok(Token{kind:CloseParenthesis,..}))).is_some() {
            return Ok(Formula::And(Vec::new()));
        }
        let result = expect!(self.lexer.next(), {
            Some(Ok(Token{kind:Keyword(And),..})) => self.and(),
            Some(Ok(Token{kind:Keyword(Not),..})) => self.formula().map(Formula::not),
            Some(Ok(Token{kind:Identifier(s),..})) => self.atom(s).map(Formula::Atom),
            Some(Ok(Token{span, kind:Keyword(k @ (Or | Imply | Exists | Forall | When))})) => Err(Error::unsupported(span, format!("({} ...)", k))),
            Some(Ok(Token{span, kind:Equals})) => Err(Error::unsupported(span, String::from("(= ...)"))),
        }, "Expected expression.")?;
        self.close()?;
        Ok(result)
    }
}

pub fn parse_domain(code: &str) -> Result<Domain, Error> {
    match Parser::new(code).next() {
        Some(Ok(Definition::Domain(domain))) => Ok(domain),
        Some(Ok(Definition::Problem(problem))) => Err(Error::new(Position::Span(Span::new(1, 1, 1)),
            &format!("Expected a domain definition, found problem {}.", problem.name))),
        Some(Err(e)) => Err(e),
        None => Err(Error::new(Position::EOF, "Expected a domain definition.")),
    }
}

pub fn parse_problem(code: &str) -> Result<Problem, Error> {
    match Parser::new(code).next() {
        Some(Ok(Definition::Problem(problem))) => Ok(problem),
        Some(Ok(Definition::Domain(domain))) => Err(Error::new(Position::Span(Span::new(1, 1, 1)),
            &format!("Expected a problem definition, found domain {}.", domain.name))),
        Some(Err(e)) => Err(e),
        None => Err(Error::new(Position::EOF, "Expected a problem definition.")),
    }
}

pub fn read_domain<P: AsRef<Path>>(path: P) -> Result<Domain, ReadError> {
    let path = path.as_ref();
    debug!("Reading domain file '{}'...", path.display());
    let code = fs::read_to_string(path).map_err(|source| ReadError::Io { path: path.to_path_buf(), source })?;
    let domain = parse_domain(&code).map_err(|error| ReadError::Parse { path: path.to_path_buf(), error })?;
    let ignored = domain.requirements - SUPPORTED_REQUIREMENTS;
    if !ignored.is_empty() {
        warn!("Domain {} declares requirements {:?} that the planner does not support.", domain.name, ignored);
    }
    Ok(domain)
}

pub fn read_problem<P: AsRef<Path>>(path: P) -> Result<Problem, ReadError> {
    let path = path.as_ref();
    debug!("Reading problem file '{}'...", path.display());
    let code = fs::read_to_string(path).map_err(|source| ReadError::Io { path: path.to_path_buf(), source })?;
    parse_problem(&code).map_err(|error| ReadError::Parse { path: path.to_path_buf(), error })
}
