use std::collections::{BTreeSet, HashMap};

use crate::error::Result;
use crate::pddl::expression::Atom;

use super::binder::Binding;
use super::evaluator::Evaluatable;
use super::observer::SearchObserver;
use super::state::{State, Step};
use super::{Planner, SearchOutcome, SearchReport, SearchStats};

/// Expanded state with its place in the action/binding enumeration.
struct Frame {
    state: State,
    next_action: usize,
    bindings: std::vec::IntoIter<Binding>,
}

impl Frame {
    fn new(state: State) -> Self {
        Frame { state, next_action: 0, bindings: Vec::new().into_iter() }
    }
}

/// Depth-first search from `start` with an explicit frame stack. Successors are visited in
/// action order, then binding order, exactly as the recursive formulation would.
///
/// `visited` maps each expanded world to the shallowest depth it was entered at. Without a depth
/// limit any revisit is pruned. With one, a world reached again at a smaller depth is expanded
/// again.
pub(super) fn depth_first<O: SearchObserver>(planner: &Planner, start: State, mut observer: O) -> Result<SearchReport> {
    let actions = &planner.domain.actions;
    let goal = &planner.problem.goal;
    let limits = planner.limits;

    let mut stats = SearchStats::default();
    let mut visited: HashMap<BTreeSet<Atom>, usize> = HashMap::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut pending = Some(start);

    loop {
        if let Some(state) = pending.take() {
            let depth = state.plan.len();
            observer.state_entered(&state, depth);
            let satisfied = goal.holds(&state);
            observer.goal_checked(&state, satisfied);
            if satisfied {
                stats.visited = visited.len();
                return Ok(SearchReport { outcome: SearchOutcome::Solved(state.plan), stats });
            }
            if limits.max_expansions.map_or(false, |max| stats.expanded >= max) {
                observer.budget_exhausted(stats.expanded);
                stats.visited = visited.len();
                return Ok(SearchReport { outcome: SearchOutcome::BudgetExhausted, stats });
            }
            visited.insert(state.world().clone(), depth);
            stats.expanded += 1;
            stats.deepest = stats.deepest.max(depth);
            if limits.max_depth.map_or(false, |max| depth >= max) {
                stats.depth_cutoffs += 1;
                observer.backtracked(&state, depth);
                continue;
            }
            stack.push(Frame::new(state));
            continue;
        }

        let frame = match stack.last_mut() {
            Some(frame) => frame,
            None => break,
        };
        match frame.bindings.next() {
            Some(binding) => {
                let action = &actions[frame.next_action - 1];
                let mut successor = planner.apply_action(&frame.state, action, &binding)?;
                stats.generated += 1;
                let depth = frame.state.plan.len() + 1;
                let seen = visited.get(successor.world())
                    .map_or(false, |&at| limits.max_depth.is_none() || at <= depth);
                if seen {
                    stats.pruned += 1;
                    observer.state_pruned(action, &binding);
                    continue;
                }
                successor.plan.push(Step::new(&action.name, binding));
                pending = Some(successor);
            }
            None if frame.next_action < actions.len() => {
                let action = &actions[frame.next_action];
                frame.bindings = planner.applicable_bindings_observed(action, &frame.state, &mut observer).into_iter();
                frame.next_action += 1;
            }
            None => {
                if let Some(frame) = stack.pop() {
                    observer.backtracked(&frame.state, stack.len());
                }
            }
        }
    }

    stats.visited = visited.len();
    let outcome = if stats.depth_cutoffs > 0 { SearchOutcome::BudgetExhausted } else { SearchOutcome::Exhausted };
    Ok(SearchReport { outcome, stats })
}
