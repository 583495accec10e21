use std::fmt;
use super::expression::{Atom, Formula};

/// Object of a problem. `kind` is `None` for untyped objects.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypedObject {
    pub name: String,
    pub kind: Option<String>,
}

impl TypedObject {
    pub fn new(name: &str, kind: &str) -> Self {
        TypedObject { name: name.to_string(), kind: Some(kind.to_string()) }
    }

    pub fn untyped(name: &str) -> Self {
        TypedObject { name: name.to_string(), kind: None }
    }
}

impl fmt::Display for TypedObject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            Some(kind) => write!(f, "{} - {}", self.name, kind),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug)]
pub struct Problem {
    pub name: String,
    pub domain: String,
    pub objects: Vec<TypedObject>,
    pub init: Vec<Atom>,
    pub goal: Formula,
}

impl Problem {
    pub fn new(name: &str, domain: &str, objects: Vec<TypedObject>, init: Vec<Atom>, goal: Formula) -> Self {
        Problem { name: name.to_string(), domain: domain.to_string(), objects, init, goal }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let objects = self.objects.iter().fold(String::new(), |acc,item| acc + " " + &item.to_string());
        let init = self.init.iter().fold(String::new(), |acc,item| acc + " " + &item.to_string());
        write!(f, "(define (problem {})\n(:domain {})\n(:objects{})\n(:init{})\n(:goal {})\n)",
            self.name, self.domain, objects, init, self.goal)
    }
}
