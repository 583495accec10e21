use thiserror::Error;

/// Fatal configuration errors in a domain or problem. They abort a planning run and are never
/// reported as "no plan".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    #[error("unsupported formula `{0}`: only atoms, `and` and `not` are allowed")]
    UnsupportedFormula(String),

    #[error("malformed effect `{effect}`: {reason}")]
    MalformedEffect { effect: String, reason: &'static str },

    #[error("goal references undeclared predicate `{name}/{arity}`")]
    UndeclaredPredicate { name: String, arity: usize },
}

pub type Result<T> = std::result::Result<T, PlanningError>;
