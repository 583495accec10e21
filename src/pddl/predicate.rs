use std::fmt;
use super::action::Parameter;
use super::utils::build_var_string;

/// Predicate declaration from a domain's `:predicates` section.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub name: String,
    pub parameters: Vec<Parameter>,
}

impl Predicate {
    pub fn new(name: &str, parameters: Vec<Parameter>) -> Predicate {
        Predicate {
            name: name.to_string(),
            parameters,
        }
    }

    /// Declaration with `arity` untyped parameters named `x0`, `x1`, ...
    pub fn untyped(name: &str, arity: usize) -> Predicate {
        Predicate::new(name, (0..arity).map(|i| Parameter::untyped(&format!("x{}", i))).collect())
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.parameters.is_empty() {
            write!(f, "({})", self.name)
        } else {
            write!(f, "({} {})", self.name, build_var_string(&self.parameters))
        }
    }
}
