use std::fmt;
use enumset::{EnumSet, EnumSetType};
use super::action::Action;
use super::predicate::Predicate;
use super::utils::build_var_string;

#[derive(EnumSetType, Debug)]
pub enum Requirement {
    Strips,
    Typing,
    NegativePreconditions,
    DisjunctivePreconditions,
    Equality,
    ExistentialPreconditions,
    UniversalPreconditions,
    QuantifiedPreconditions,
    ConditionalEffects,
    Fluents,
    ADL,
    DurativeActions,
    DerivedPredicates,
    TimedInitialLiterals,
    Preferences,
    Constraints,
    ActionCosts,
}

const REQUIREMENT_NAMES: [(&str, Requirement); 17] = [
    ("strips", Requirement::Strips),
    ("typing", Requirement::Typing),
    ("negative-preconditions", Requirement::NegativePreconditions),
    ("disjunctive-preconditions", Requirement::DisjunctivePreconditions),
    ("equality", Requirement::Equality),
    ("existential-preconditions", Requirement::ExistentialPreconditions),
    ("universal-preconditions", Requirement::UniversalPreconditions),
    ("quantified-preconditions", Requirement::QuantifiedPreconditions),
    ("conditional-effects", Requirement::ConditionalEffects),
    ("fluents", Requirement::Fluents),
    ("adl", Requirement::ADL),
    ("durative-actions", Requirement::DurativeActions),
    ("derived-predicates", Requirement::DerivedPredicates),
    ("timed-initial-literals", Requirement::TimedInitialLiterals),
    ("preferences", Requirement::Preferences),
    ("constraints", Requirement::Constraints),
    ("action-costs", Requirement::ActionCosts),
];

impl Requirement {
    /// Looks up a requirement flag by its PDDL name, without the leading `:`.
    pub fn from_name(name: &str) -> Option<Self> {
        REQUIREMENT_NAMES.iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, r)| *r)
    }

    pub fn name(self) -> &'static str {
        REQUIREMENT_NAMES.iter()
            .find(|(_, r)| *r == self)
            .map_or("", |(n, _)| *n)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, ":{}", self.name())
    }
}

pub struct Domain {
    pub name: String,
    pub requirements: EnumSet<Requirement>,
    pub predicates: Vec<Predicate>,
    pub actions: Vec<Action>,
}

impl Domain {
    pub fn new(name: &str, predicates: Vec<Predicate>, actions: Vec<Action>) -> Self {
        Domain { name: name.to_string(), requirements: EnumSet::empty(), predicates, actions }
    }

    pub fn predicate(&self, name: &str) -> Option<&Predicate> {
        self.predicates.iter().find(|p| p.name == name)
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain({}, {} predicates, {} actions)", self.name, self.predicates.len(), self.actions.len())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let predicates = self.predicates.iter().take(1).fold(String::new(), |acc,item| acc + &format!("{}", item));
        let predicates = self.predicates.iter().skip(1).fold(predicates, |acc,item| acc + " " + &format!("{}", item));
        let actions = self.actions.iter().take(1).fold(String::new(), |acc,item| acc + &format!("{}", item));
        let actions = self.actions.iter().skip(1).fold(actions, |acc,item| acc + "\n" + &format!("{}", item));
        write!(f, "(define (domain {})\n", self.name)?;
        if !self.requirements.is_empty() {
            let requirements: Vec<Requirement> = self.requirements.iter().collect();
            writeln!(f, " (:requirements {})", build_var_string(&requirements))?;
        }
        write!(f, " (:predicates {})\n{}\n)", predicates, actions)
    }
}

#[cfg(test)]
mod tests {
    use super::Requirement;

    #[test]
    fn test_requirement_names() {
        assert_eq!(Requirement::from_name("strips"), Some(Requirement::Strips));
        assert_eq!(Requirement::from_name("Negative-Preconditions"), Some(Requirement::NegativePreconditions));
        assert_eq!(Requirement::from_name("action-costs"), Some(Requirement::ActionCosts));
        assert_eq!(Requirement::from_name("teleportation"), None);
        assert_eq!(Requirement::ADL.to_string(), ":adl");
        assert_eq!(Requirement::from_name(Requirement::DerivedPredicates.name()), Some(Requirement::DerivedPredicates));
    }
}
