use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Argument of an atom. Equality, ordering and hashing look at the bare name only, so
/// `?x` written as a variable and `x` written as a constant are the same term.
#[derive(Clone, Debug)]
pub enum Term {
    Variable(String),
    Constant(String),
}

impl Term {
    pub fn variable(name: &str) -> Self {
        Term::Variable(bare_name(name).to_string())
    }

    pub fn constant(name: &str) -> Self {
        Term::Constant(bare_name(name).to_string())
    }

    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Term::Variable(name) | Term::Constant(name) => name,
        }
    }

    #[inline]
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }
}

fn bare_name(name: &str) -> &str {
    name.strip_prefix('?').unwrap_or(name)
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}
impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state)
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "?{}", name),
            Term::Constant(name) => write!(f, "{}", name),
        }
    }
}

/// A predicate applied to an ordered list of terms.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom {
    pub name: String,
    pub terms: Vec<Term>,
}

impl Atom {
    pub fn new(name: &str, terms: Vec<Term>) -> Self {
        Atom { name: name.to_string(), terms }
    }

    /// Shorthand for an atom over constants, e.g. `Atom::ground("at", &["n1"])`.
    pub fn ground(name: &str, objects: &[&str]) -> Self {
        Atom::new(name, objects.iter().map(|o| Term::constant(o)).collect())
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    pub fn is_ground(&self) -> bool {
        !self.terms.iter().any(Term::is_variable)
    }

    /// Same atom with every variable turned into a constant of the same name.
    pub fn grounded(&self) -> Atom {
        Atom {
            name: self.name.clone(),
            terms: self.terms.iter().map(|t| Term::Constant(t.name().to_string())).collect(),
        }
    }

    /// Name, arity and term-by-term bare names agree.
    pub fn matches(&self, other: &Atom) -> bool {
        self.name == other.name
            && self.arity() == other.arity()
            && self.terms.iter().zip(&other.terms).all(|(l, r)| l.name() == r.name())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}", self.name)?;
        for term in &self.terms {
            write!(f, " {}", term)?;
        }
        write!(f, ")")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Formula {
    Atom(Atom),
    And(Vec<Formula>),
    Not(Box<Formula>),
}

#[macro_export]
macro_rules! expNot {
    ( $e: expr ) => {
        $crate::pddl::expression::Formula::Not(Box::new($e.clone().into()))
    };
}

#[macro_export]
macro_rules! expAnd {
    ( $($e: expr), * ) => {
        {
            #[allow(unused_mut)]
            let mut temp_vec: Vec<$crate::pddl::expression::Formula> = Vec::new();
            $(
                temp_vec.push($e.clone().into());
            )*
            $crate::pddl::expression::Formula::And(temp_vec)
        }
    };
}

impl From<Atom> for Formula {
    fn from(atom: Atom) -> Self {
        Formula::Atom(atom)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Formula::And(v) => {
                write!(f, "(and")?;
                v.iter().try_for_each(|item| write!(f, " {}", item))?;
                write!(f, ")")
            }
            Formula::Not(item) => write!(f, "(not {})", item),
            Formula::Atom(atom) => write!(f, "{}", atom),
        }
    }
}

impl Formula {
    /// Conjunction of the given formulas.
    pub fn and<I: IntoIterator<Item = Formula>>(operands: I) -> Self {
        Formula::And(operands.into_iter().collect())
    }

    pub fn not(operand: Formula) -> Self {
        Formula::Not(Box::new(operand))
    }

    /// Bare names of every variable occurring in the formula.
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut variable_set = BTreeSet::new();
        fn rec_count<'f>(e: &'f Formula, set: &mut BTreeSet<&'f str>) {
            match e {
                Formula::And(v) => v.iter().for_each(|e| rec_count(e, set)),
                Formula::Not(e) => rec_count(e, set),
                Formula::Atom(atom) => set.extend(atom.terms.iter().filter(|t| t.is_variable()).map(Term::name)),
            }
        }
        rec_count(self, &mut variable_set);
        variable_set
    }

    /// Every atom occurring in the formula, positive or negated, in order of appearance.
    pub fn atoms(&self) -> Vec<&Atom> {
        let mut atoms = Vec::new();
        fn rec_collect<'f>(e: &'f Formula, out: &mut Vec<&'f Atom>) {
            match e {
                Formula::And(v) => v.iter().for_each(|e| rec_collect(e, out)),
                Formula::Not(e) => rec_collect(e, out),
                Formula::Atom(atom) => out.push(atom),
            }
        }
        rec_collect(self, &mut atoms);
        atoms
    }
}
