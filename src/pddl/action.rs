use std::fmt;
use super::expression::Formula;
use super::utils::build_var_string;

/// Typed placeholder of an action or predicate. `kind` is `None` for untyped parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    pub kind: Option<String>,
}

impl Parameter {
    pub fn new(name: &str, kind: &str) -> Self {
        Parameter { name: name.trim_start_matches('?').to_string(), kind: Some(kind.to_string()) }
    }

    pub fn untyped(name: &str) -> Self {
        Parameter { name: name.trim_start_matches('?').to_string(), kind: None }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "?{} - {}", self.name, kind),
            None => write!(f, "?{}", self.name),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub precondition: Formula,
    pub effect: Formula,
}

impl Action {
    pub fn new(name: &str, parameters: Vec<Parameter>, precondition: Formula, effect: Formula) -> Self {
        Action { name: name.to_string(), parameters, precondition, effect }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(:action {} :parameters ({}) :precondition {} :effect {})",
            self.name, build_var_string(&self.parameters), self.precondition, self.effect)
    }
}
