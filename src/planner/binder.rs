use indexmap::IndexMap;
use itertools::Itertools;

use crate::pddl::action::Parameter;
use crate::pddl::expression::{Atom, Formula, Term};
use crate::pddl::problem::TypedObject;

/// Parameter name to object name, iterated in parameter declaration order.
pub type Binding = IndexMap<String, String>;

/// Objects whose type tag is exactly the parameter's, in problem order.
pub fn candidates<'o>(parameter: &Parameter, objects: &'o [TypedObject]) -> Vec<&'o str> {
    objects.iter()
        .filter(|o| o.kind == parameter.kind)
        .map(|o| o.name.as_str())
        .collect()
}

/// Every type-consistent assignment of objects to `parameters`. The first parameter varies
/// slowest. No parameters gives exactly one empty binding.
pub fn enumerate_bindings(parameters: &[Parameter], objects: &[TypedObject]) -> Vec<Binding> {
    if parameters.is_empty() {
        return vec![Binding::new()];
    }
    let values: Vec<Vec<&str>> = parameters.iter().map(|p| candidates(p, objects)).collect();
    if values.iter().any(Vec::is_empty) {
        return Vec::new();
    }
    values.into_iter()
        .multi_cartesian_product()
        .map(|combination| parameters.iter()
            .zip(combination)
            .map(|(p, object)| (p.name.clone(), object.to_string()))
            .collect())
        .collect()
}

/// Rebuilds `formula` with bound variables replaced by their objects. Unbound variables become
/// constants of their own name.
pub fn substitute(formula: &Formula, binding: &Binding) -> Formula {
    match formula {
        Formula::And(operands) => Formula::And(operands.iter().map(|op| substitute(op, binding)).collect()),
        Formula::Not(operand) => Formula::Not(Box::new(substitute(operand, binding))),
        Formula::Atom(atom) => Formula::Atom(substitute_atom(atom, binding)),
    }
}

pub fn substitute_atom(atom: &Atom, binding: &Binding) -> Atom {
    let terms = atom.terms.iter().map(|term| match term {
        Term::Variable(name) => Term::Constant(binding.get(name).unwrap_or(name).clone()),
        constant @ Term::Constant(_) => constant.clone(),
    }).collect();
    Atom { name: atom.name.clone(), terms }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::{enumerate_bindings, substitute, Binding};
    use crate::pddl::action::Parameter;
    use crate::pddl::expression::{Atom, Formula, Term};
    use crate::pddl::problem::TypedObject;

    fn binding(pairs: &[(&str, &str)]) -> Binding {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_no_parameters() {
        let objects = vec![TypedObject::untyped("n1")];
        assert_eq!(enumerate_bindings(&[], &objects), vec![Binding::new()]);
        assert_eq!(enumerate_bindings(&[], &[]), vec![Binding::new()]);
    }

    #[test]
    fn test_cartesian_order() {
        let params = vec![Parameter::new("x", "node"), Parameter::new("y", "node")];
        let objects = vec![TypedObject::new("n1", "node"), TypedObject::new("n2", "node"), TypedObject::new("n3", "node")];
        let bindings = enumerate_bindings(&params, &objects);
        assert_eq!(bindings.len(), 9);
        let mut expected = Vec::new();
        for x in ["n1", "n2", "n3"] {
            for y in ["n1", "n2", "n3"] {
                expected.push(binding(&[("x", x), ("y", y)]));
            }
        }
        assert_eq!(bindings, expected);
        assert_eq!(bindings[1].keys().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn test_type_filter() {
        let params = vec![Parameter::new("v", "vertex"), Parameter::new("c", "count")];
        let objects = vec![
            TypedObject::new("v1", "vertex"),
            TypedObject::new("n0", "count"),
            TypedObject::new("v2", "vertex"),
            TypedObject::untyped("loose"),
        ];
        let bindings = enumerate_bindings(&params, &objects);
        assert_eq!(bindings, vec![binding(&[("v", "v1"), ("c", "n0")]), binding(&[("v", "v2"), ("c", "n0")])]);

        let untyped = vec![Parameter::untyped("x")];
        assert_eq!(enumerate_bindings(&untyped, &objects), vec![binding(&[("x", "loose")])]);
    }

    #[test]
    fn test_empty_candidates() {
        let params = vec![Parameter::new("x", "node"), Parameter::new("t", "truck")];
        let objects = vec![TypedObject::new("n1", "node")];
        assert!(enumerate_bindings(&params, &objects).is_empty());
    }

    #[test]
    fn test_substitute() {
        let pred = Formula::Atom(Atom::new("connected", vec![Term::variable("from"), Term::variable("to")]));
        let result = substitute(&pred, &binding(&[("from", "n1"), ("to", "n2")]));
        match &result {
            Formula::Atom(atom) => {
                assert_eq!(atom.name, "connected");
                assert!(atom.is_ground());
                assert_eq!(atom.terms.iter().map(Term::name).collect::<Vec<_>>(), vec!["n1", "n2"]);
            }
            other => panic!("Unexpected formula {}", other),
        }

        let not = Formula::not(Formula::Atom(Atom::new("at", vec![Term::variable("x"), Term::constant("home")])));
        assert_eq!(format!("{}", substitute(&not, &binding(&[("x", "n1")]))), "(not (at n1 home))");

        let conj = Formula::and(vec![
            Formula::Atom(Atom::new("at", vec![Term::variable("x")])),
            Formula::Atom(Atom::new("connected", vec![Term::variable("x"), Term::variable("y")])),
        ]);
        assert_eq!(format!("{}", substitute(&conj, &binding(&[("x", "n1"), ("y", "n2")]))), "(and (at n1) (connected n1 n2))");
    }

    #[test]
    fn test_substitute_unbound() {
        let pred = Formula::Atom(Atom::new("at", vec![Term::variable("who")]));
        let result = substitute(&pred, &Binding::new());
        assert_eq!(format!("{}", result), "(at who)");
        assert!(result.variables().is_empty());
    }

    proptest! {
        #[test]
        fn binding_count_is_product(sizes in proptest::collection::vec(0usize..4, 0..4)) {
            let mut params = Vec::new();
            let mut objects = Vec::new();
            for (i, size) in sizes.iter().enumerate() {
                let kind = format!("t{}", i);
                params.push(Parameter::new(&format!("p{}", i), &kind));
                for j in 0..*size {
                    objects.push(TypedObject::new(&format!("o{}_{}", i, j), &kind));
                }
            }
            let bindings = enumerate_bindings(&params, &objects);
            let expected: usize = sizes.iter().product();
            prop_assert_eq!(bindings.len(), expected);
            let distinct: HashSet<Vec<(String, String)>> = bindings.iter()
                .map(|b| b.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .collect();
            prop_assert_eq!(distinct.len(), expected);
        }
    }
}
