use std::collections::BTreeSet;
use std::fmt;

use crate::pddl::expression::{Atom, Formula};

use super::binder::Binding;
use super::evaluator::Evaluatable;

/// One grounded action application of a plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub action: String,
    pub binding: Binding,
}

impl Step {
    pub fn new(action: &str, binding: Binding) -> Self {
        Step { action: action.to_string(), binding }
    }

    /// Bound objects in parameter declaration order.
    pub fn arguments(&self) -> impl Iterator<Item = &str> {
        self.binding.values().map(String::as_str)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}", self.action)?;
        for object in self.arguments() {
            write!(f, " {}", object)?;
        }
        write!(f, ")")
    }
}

pub type Plan = Vec<Step>;

/// Set of ground facts plus the steps that led to it. Identity is the fact set alone, so two
/// paths reaching the same world compare equal.
#[derive(Clone, Debug)]
pub struct State {
    world: BTreeSet<Atom>,
    pub plan: Plan,
}

impl std::hash::Hash for State {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.world.hash(state);
    }
}

impl std::cmp::PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.world == other.world
    }
}
impl std::cmp::Eq for State { }

impl State {
    pub fn new<I: IntoIterator<Item = Atom>>(atoms: I) -> Self {
        Self::with_plan(atoms, Plan::new())
    }

    /// Facts given with variable terms are stored as constants of the same name.
    pub fn with_plan<I: IntoIterator<Item = Atom>>(atoms: I, plan: Plan) -> Self {
        State {
            world: atoms.into_iter().map(|atom| atom.grounded()).collect(),
            plan,
        }
    }

    /// Successor sharing this state's plan prefix.
    pub(crate) fn successor(&self, world: BTreeSet<Atom>) -> Self {
        debug_assert!(world.iter().all(Atom::is_ground));
        State { world, plan: self.plan.clone() }
    }

    #[inline]
    pub fn world(&self) -> &BTreeSet<Atom> {
        &self.world
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.world.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    /// Whether a fact matching `atom` is true in this state.
    #[inline]
    pub fn contains(&self, atom: &Atom) -> bool {
        self.world.contains(atom)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.world.iter()
    }

    pub fn satisfies(&self, goal: &Formula) -> bool {
        goal.holds(self)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, atom) in self.world.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", atom)?;
        }
        write!(f, "}}")
    }
}
