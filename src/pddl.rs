pub mod action;
pub mod domain;
pub mod expression;
pub mod parser;
pub mod predicate;
pub mod problem;

mod utils;

pub use action::{Action, Parameter};
pub use domain::{Domain, Requirement};
pub use expression::{Atom, Formula, Term};
pub use parser::{parse_domain, parse_problem, read_domain, read_problem, ReadError};
pub use predicate::Predicate;
pub use problem::{Problem, TypedObject};
