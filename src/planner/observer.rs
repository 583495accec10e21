use tracing::{debug, info, trace, warn};

use crate::pddl::action::Action;

use super::binder::Binding;
use super::state::State;

/// Hook points of the depth-first search. Every method defaults to doing nothing.
pub trait SearchObserver {
    fn state_entered(&mut self, _state: &State, _depth: usize) {}
    fn goal_checked(&mut self, _state: &State, _satisfied: bool) {}
    fn binding_tried(&mut self, _action: &Action, _binding: &Binding, _applicable: bool) {}
    fn state_pruned(&mut self, _action: &Action, _binding: &Binding) {}
    fn backtracked(&mut self, _state: &State, _depth: usize) {}
    fn budget_exhausted(&mut self, _expanded: usize) {}
}

impl<O: SearchObserver + ?Sized> SearchObserver for &mut O {
    fn state_entered(&mut self, state: &State, depth: usize) { (**self).state_entered(state, depth) }
    fn goal_checked(&mut self, state: &State, satisfied: bool) { (**self).goal_checked(state, satisfied) }
    fn binding_tried(&mut self, action: &Action, binding: &Binding, applicable: bool) { (**self).binding_tried(action, binding, applicable) }
    fn state_pruned(&mut self, action: &Action, binding: &Binding) { (**self).state_pruned(action, binding) }
    fn backtracked(&mut self, state: &State, depth: usize) { (**self).backtracked(state, depth) }
    fn budget_exhausted(&mut self, expanded: usize) { (**self).budget_exhausted(expanded) }
}

pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Forwards search events to `tracing` under the `strips_planner::search` target.
#[derive(Default)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn state_entered(&mut self, state: &State, depth: usize) {
        debug!(target: "strips_planner::search", depth, atoms = state.len(), "entering state {}", state);
    }

    fn goal_checked(&mut self, state: &State, satisfied: bool) {
        if satisfied {
            info!(target: "strips_planner::search", steps = state.plan.len(), "goal reached");
        } else {
            trace!(target: "strips_planner::search", "goal not satisfied");
        }
    }

    fn binding_tried(&mut self, action: &Action, binding: &Binding, applicable: bool) {
        trace!(target: "strips_planner::search", action = %action.name, ?binding, applicable, "binding tried");
    }

    fn state_pruned(&mut self, action: &Action, binding: &Binding) {
        debug!(target: "strips_planner::search", action = %action.name, ?binding, "successor already visited, skipping");
    }

    fn backtracked(&mut self, state: &State, depth: usize) {
        debug!(target: "strips_planner::search", depth, atoms = state.len(), "no solution below this state, backtracking");
    }

    fn budget_exhausted(&mut self, expanded: usize) {
        warn!(target: "strips_planner::search", expanded, "expansion budget exhausted before the search space");
    }
}
