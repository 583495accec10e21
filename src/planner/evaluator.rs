use std::collections::BTreeSet;

use crate::error::{PlanningError, Result};
use crate::pddl::expression::{Atom, Formula};

use super::state::State;

pub trait Evaluatable {
    /// Whether `self` is true in `state`. Expects a grounded formula.
    fn holds(&self, state: &State) -> bool;
}

impl Evaluatable for Atom {
    fn holds(&self, state: &State) -> bool {
        state.contains(self)
    }
}

impl Evaluatable for Formula {
    fn holds(&self, state: &State) -> bool {
        match self {
            Formula::And(operands) => operands.iter().all(|op| op.holds(state)),
            Formula::Not(operand) => !operand.holds(state),
            Formula::Atom(atom) => atom.holds(state),
        }
    }
}

pub fn holds(formula: &Formula, state: &State) -> bool {
    formula.holds(state)
}

/// Successor of `state` under a grounded effect. Positive literals are added and negated atoms
/// removed; the successor starts with a copy of `state`'s plan.
pub fn apply(state: &State, effect: &Formula) -> Result<State> {
    let mut world = state.world().clone();
    match effect {
        Formula::And(operands) => {
            for literal in operands {
                apply_literal(&mut world, literal, effect)?;
            }
        }
        literal => apply_literal(&mut world, literal, effect)?,
    }
    Ok(state.successor(world))
}

fn apply_literal(world: &mut BTreeSet<Atom>, literal: &Formula, effect: &Formula) -> Result<()> {
    match literal {
        Formula::Atom(atom) => {
            world.insert(atom.grounded());
            Ok(())
        }
        Formula::Not(operand) => match operand.as_ref() {
            // Set order is the loose match rule, so at most one fact matches.
            Formula::Atom(atom) => {
                world.remove(atom);
                Ok(())
            }
            _ => Err(malformed(effect, "`not` must wrap an atom")),
        },
        Formula::And(_) => Err(malformed(effect, "nested `and` inside an effect")),
    }
}

/// Checks that `effect` is a literal or a conjunction of literals.
pub fn validate_effect(effect: &Formula) -> Result<()> {
    let check = |literal: &Formula| match literal {
        Formula::Atom(_) => Ok(()),
        Formula::Not(operand) if matches!(operand.as_ref(), Formula::Atom(_)) => Ok(()),
        Formula::Not(_) => Err(malformed(effect, "`not` must wrap an atom")),
        Formula::And(_) => Err(malformed(effect, "nested `and` inside an effect")),
    };
    match effect {
        Formula::And(operands) => operands.iter().try_for_each(check),
        literal => check(literal),
    }
}

fn malformed(effect: &Formula, reason: &'static str) -> PlanningError {
    PlanningError::MalformedEffect { effect: effect.to_string(), reason }
}
