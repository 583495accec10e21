pub mod binder;
pub mod evaluator;
pub mod observer;
pub mod state;

mod search;

use tracing::{debug, info, warn};

use crate::error::{PlanningError, Result};
use crate::pddl::action::Action;
use crate::pddl::domain::Domain;
use crate::pddl::problem::Problem;

pub use binder::{enumerate_bindings, substitute, Binding};
pub use evaluator::{apply, holds, Evaluatable};
pub use observer::{NoopObserver, SearchObserver, TracingObserver};
pub use state::{Plan, State, Step};

/// Optional bounds on a search. The default is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Stop after this many states have been expanded.
    pub max_expansions: Option<usize>,
    /// Do not expand states whose plan is this long. A world first met deep in the search is
    /// expanded again when a shorter path reaches it.
    pub max_depth: Option<usize>,
}

impl SearchLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = Some(max);
        self
    }

    pub fn max_depth(mut self, max: usize) -> Self {
        self.max_depth = Some(max);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved(Plan),
    /// Every reachable state was explored without meeting the goal.
    Exhausted,
    /// A limit from [`SearchLimits`] stopped the search before it could finish.
    BudgetExhausted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub expanded: usize,
    pub generated: usize,
    pub pruned: usize,
    pub visited: usize,
    pub deepest: usize,
    pub depth_cutoffs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

impl SearchReport {
    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Solved(_))
    }

    /// The plan, or `None` for both kinds of failure.
    pub fn into_plan(self) -> Option<Plan> {
        match self.outcome {
            SearchOutcome::Solved(plan) => Some(plan),
            SearchOutcome::Exhausted | SearchOutcome::BudgetExhausted => None,
        }
    }
}

/// Depth-first STRIPS planner over a validated domain/problem pair.
pub struct Planner<'a> {
    domain: &'a Domain,
    problem: &'a Problem,
    limits: SearchLimits,
}

impl<'a> Planner<'a> {
    /// Fails on effects outside the literal fragment and on goals over undeclared predicates.
    pub fn new(domain: &'a Domain, problem: &'a Problem) -> Result<Self> {
        for action in &domain.actions {
            evaluator::validate_effect(&action.effect)?;
        }
        for atom in problem.goal.atoms() {
            match domain.predicate(&atom.name) {
                Some(predicate) if predicate.arity() == atom.arity() => (),
                _ => return Err(PlanningError::UndeclaredPredicate { name: atom.name.clone(), arity: atom.arity() }),
            }
        }
        if !problem.domain.is_empty() && problem.domain != domain.name {
            warn!("Problem {} is written for domain {}, planning it against {}.", problem.name, problem.domain, domain.name);
        }
        Ok(Planner { domain, problem, limits: SearchLimits::default() })
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn domain(&self) -> &Domain {
        self.domain
    }

    pub fn problem(&self) -> &Problem {
        self.problem
    }

    pub fn initial_state(&self) -> State {
        State::new(self.problem.init.iter().cloned())
    }

    /// Runs the search with `tracing` output and returns the first plan found.
    pub fn plan(&self) -> Result<Option<Plan>> {
        info!("Planning {} in domain {}: {} actions, {} objects, {} initial atoms.",
            self.problem.name, self.domain.name, self.domain.actions.len(), self.problem.objects.len(), self.problem.init.len());
        let report = self.search(TracingObserver)?;
        match &report.outcome {
            SearchOutcome::Solved(plan) => info!("Plan found with {} steps after expanding {} states.", plan.len(), report.stats.expanded),
            SearchOutcome::Exhausted => info!("Search space exhausted after expanding {} states, no plan exists.", report.stats.expanded),
            SearchOutcome::BudgetExhausted => warn!("Search stopped by its limits after expanding {} states.", report.stats.expanded),
        }
        Ok(report.into_plan())
    }

    pub fn search<O: SearchObserver>(&self, observer: O) -> Result<SearchReport> {
        self.search_from(self.initial_state(), observer)
    }

    /// Searches from an arbitrary `start` state. Its plan is kept as the prefix of any solution.
    pub fn search_from<O: SearchObserver>(&self, start: State, observer: O) -> Result<SearchReport> {
        search::depth_first(self, start, observer)
    }

    /// Bindings of `action` whose grounded precondition holds in `state`, in enumeration order.
    pub fn applicable_bindings(&self, action: &Action, state: &State) -> Vec<Binding> {
        self.applicable_bindings_observed(action, state, &mut NoopObserver)
    }

    pub(crate) fn applicable_bindings_observed<O: SearchObserver>(&self, action: &Action, state: &State, observer: &mut O) -> Vec<Binding> {
        let bindings: Vec<Binding> = enumerate_bindings(&action.parameters, &self.problem.objects)
            .into_iter()
            .filter(|binding| {
                let applicable = substitute(&action.precondition, binding).holds(state);
                observer.binding_tried(action, binding, applicable);
                applicable
            })
            .collect();
        if !bindings.is_empty() {
            debug!("Action {} has {} applicable bindings.", action.name, bindings.len());
        }
        bindings
    }

    pub fn apply_action(&self, state: &State, action: &Action, binding: &Binding) -> Result<State> {
        apply(state, &substitute(&action.effect, binding))
    }

    /// Replays `plan` from the initial state. `None` if a step names an unknown action or its
    /// precondition does not hold.
    pub fn execute(&self, plan: &[Step]) -> Result<Option<State>> {
        let mut state = self.initial_state();
        for step in plan {
            let action = match self.domain.action(&step.action) {
                Some(action) => action,
                None => return Ok(None),
            };
            if !substitute(&action.precondition, &step.binding).holds(&state) {
                return Ok(None);
            }
            let mut next = self.apply_action(&state, action, &step.binding)?;
            next.plan.push(step.clone());
            state = next;
        }
        Ok(Some(state))
    }
}

#[cfg(test)]
mod tests {
    use super::observer::tests::Recorder;
    use super::{Planner, SearchLimits, SearchOutcome, State, Step, TracingObserver};
    use crate::error::PlanningError;
    use crate::pddl::action::{Action, Parameter};
    use crate::pddl::domain::Domain;
    use crate::pddl::expression::{Atom, Formula, Term};
    use crate::pddl::predicate::Predicate;
    use crate::pddl::problem::{Problem, TypedObject};
    use crate::{expAnd, expNot};

    fn var(name: &str, terms: &[&str]) -> Formula {
        Formula::Atom(Atom::new(name, terms.iter().map(|t| Term::variable(t)).collect()))
    }

    fn fact(name: &str, objects: &[&str]) -> Atom {
        Atom::ground(name, objects)
    }

    fn tour_domain() -> Domain {
        let mv = Action::new(
            "move",
            vec![Parameter::untyped("from"), Parameter::untyped("to")],
            Formula::and(vec![var("at", &["from"]), var("connected", &["from", "to"])]),
            expAnd!(expNot!(var("at", &["from"])), var("at", &["to"]), var("visited", &["to"])),
        );
        Domain::new(
            "tour",
            vec![Predicate::untyped("at", 1), Predicate::untyped("connected", 2), Predicate::untyped("visited", 1)],
            vec![mv],
        )
    }

    fn tour_problem() -> Problem {
        Problem::new(
            "triangle",
            "tour",
            vec![TypedObject::untyped("n1"), TypedObject::untyped("n2"), TypedObject::untyped("n3")],
            vec![
                fact("at", &["n1"]),
                fact("connected", &["n1", "n2"]),
                fact("connected", &["n2", "n3"]),
                fact("connected", &["n3", "n1"]),
                fact("visited", &["n1"]),
            ],
            Formula::and(vec![
                fact("at", &["n1"]).into(),
                fact("visited", &["n1"]).into(),
                fact("visited", &["n2"]).into(),
                fact("visited", &["n3"]).into(),
            ]),
        )
    }

    fn render(plan: &[Step]) -> Vec<String> {
        plan.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tour() {
        let (domain, problem) = (tour_domain(), tour_problem());
        let planner = Planner::new(&domain, &problem).unwrap();
        let plan = planner.plan().unwrap().unwrap();
        assert_eq!(render(&plan), vec!["(move n1 n2)", "(move n2 n3)", "(move n3 n1)"]);
        assert_eq!(plan[0].binding["from"], "n1");
        assert_eq!(plan[0].binding["to"], "n2");
        let end = planner.execute(&plan).unwrap().unwrap();
        assert!(end.satisfies(&problem.goal));
    }

    #[test]
    fn test_deterministic() {
        let (domain, problem) = (tour_domain(), tour_problem());
        let first = Planner::new(&domain, &problem).unwrap().search(TracingObserver).unwrap();
        let second = Planner::new(&domain, &problem).unwrap().search(TracingObserver).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_applicable_bindings() {
        let (domain, problem) = (tour_domain(), tour_problem());
        let planner = Planner::new(&domain, &problem).unwrap();
        let mv = &domain.actions[0];
        let state = State::new(vec![fact("at", &["n1"]), fact("connected", &["n1", "n2"])]);
        let bindings = planner.applicable_bindings(mv, &state);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0]["from"], "n1");
        assert_eq!(bindings[0]["to"], "n2");
        let stranded = State::new(vec![fact("connected", &["n1", "n2"])]);
        assert!(planner.applicable_bindings(mv, &stranded).is_empty());
    }

    #[test]
    fn test_unreachable_from_start() {
        let (domain, problem) = (tour_domain(), tour_problem());
        let planner = Planner::new(&domain, &problem).unwrap();
        let start = State::new(vec![fact("at", &["n3"]), fact("visited", &["n3"])]);
        let report = planner.search_from(start, TracingObserver).unwrap();
        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert_eq!(report.stats.expanded, 1);
    }

    #[test]
    fn test_pruning_and_backtracking() {
        // n3 is unreachable. After n1 -> n2 -> n1, moving to n2 again reaches an expanded world.
        let domain = tour_domain();
        let problem = Problem::new(
            "dead-end",
            "tour",
            vec![TypedObject::untyped("n1"), TypedObject::untyped("n2"), TypedObject::untyped("n3")],
            vec![
                fact("at", &["n1"]),
                fact("connected", &["n1", "n2"]),
                fact("connected", &["n2", "n1"]),
                fact("visited", &["n1"]),
            ],
            fact("visited", &["n3"]).into(),
        );
        let planner = Planner::new(&domain, &problem).unwrap();
        let mut recorder = Recorder::default();
        let report = planner.search(&mut recorder).unwrap();
        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert_eq!(report.stats.expanded, 3);
        assert!(report.stats.pruned >= 1);
        assert_eq!(recorder.0.first().map(String::as_str), Some("enter 0 {(at n1) (connected n1 n2) (connected n2 n1) (visited n1)}"));
        assert!(recorder.0.iter().any(|e| e == "prune move"));
        assert_eq!(recorder.0.last().map(String::as_str), Some("back 0"));
    }

    #[test]
    fn test_limits() {
        let (domain, problem) = (tour_domain(), tour_problem());
        let planner = Planner::new(&domain, &problem).unwrap().with_limits(SearchLimits::unlimited().max_expansions(2));
        let mut recorder = Recorder::default();
        let report = planner.search(&mut recorder).unwrap();
        assert_eq!(report.outcome, SearchOutcome::BudgetExhausted);
        assert_eq!(report.stats.expanded, 2);
        assert!(recorder.0.contains(&"budget 2".to_string()));

        let planner = Planner::new(&domain, &problem).unwrap().with_limits(SearchLimits::unlimited().max_depth(2));
        let report = planner.search(TracingObserver).unwrap();
        assert_eq!(report.outcome, SearchOutcome::BudgetExhausted);
        assert!(report.into_plan().is_none());

        let planner = Planner::new(&domain, &problem).unwrap().with_limits(SearchLimits::unlimited().max_depth(3));
        assert!(planner.search(TracingObserver).unwrap().is_solved());
    }

    #[test]
    fn test_depth_limit_revisits_shallower_worlds() {
        // a -> b -> c hits the limit at c; the direct edge a -> c then reaches c one step earlier.
        let mv = Action::new(
            "move",
            vec![Parameter::untyped("from"), Parameter::untyped("to")],
            Formula::and(vec![var("at", &["from"]), var("connected", &["from", "to"])]),
            expAnd!(expNot!(var("at", &["from"])), var("at", &["to"])),
        );
        let domain = Domain::new("line", vec![Predicate::untyped("at", 1), Predicate::untyped("connected", 2)], vec![mv]);
        let problem = Problem::new(
            "shortcut",
            "line",
            ["a", "b", "c", "g"].iter().map(|o| TypedObject::untyped(o)).collect(),
            vec![
                fact("at", &["a"]),
                fact("connected", &["a", "b"]),
                fact("connected", &["b", "c"]),
                fact("connected", &["a", "c"]),
                fact("connected", &["c", "g"]),
            ],
            fact("at", &["g"]).into(),
        );
        let planner = Planner::new(&domain, &problem).unwrap().with_limits(SearchLimits::unlimited().max_depth(2));
        let report = planner.search(TracingObserver).unwrap();
        assert_eq!(report.stats.depth_cutoffs, 1);
        let plan = report.into_plan().unwrap();
        assert_eq!(render(&plan), vec!["(move a c)", "(move c g)"]);

        let unlimited = Planner::new(&domain, &problem).unwrap().plan().unwrap().unwrap();
        assert_eq!(render(&unlimited), vec!["(move a b)", "(move b c)", "(move c g)"]);
    }

    #[test]
    fn test_validation() {
        let mut domain = tour_domain();
        let problem = tour_problem();
        domain.actions[0].effect = Formula::not(Formula::not(var("at", &["from"])));
        assert!(matches!(Planner::new(&domain, &problem), Err(PlanningError::MalformedEffect { .. })));

        let domain = tour_domain();
        let mut problem = tour_problem();
        problem.goal = fact("at", &["n1", "n2"]).into();
        assert_eq!(Planner::new(&domain, &problem).err(),
            Some(PlanningError::UndeclaredPredicate { name: "at".to_string(), arity: 2 }));
        problem.goal = Formula::not(fact("flying", &[]).into());
        assert!(matches!(Planner::new(&domain, &problem), Err(PlanningError::UndeclaredPredicate { .. })));
    }

    #[test]
    fn test_execute_rejects_bad_plans() {
        let (domain, problem) = (tour_domain(), tour_problem());
        let planner = Planner::new(&domain, &problem).unwrap();
        let mut binding = super::Binding::new();
        binding.insert("from".to_string(), "n2".to_string());
        binding.insert("to".to_string(), "n3".to_string());
        assert_eq!(planner.execute(&[Step::new("move", binding.clone())]).unwrap(), None);
        assert_eq!(planner.execute(&[Step::new("fly", binding)]).unwrap(), None);
        assert_eq!(planner.execute(&[]).unwrap(), Some(planner.initial_state()));
    }
}
