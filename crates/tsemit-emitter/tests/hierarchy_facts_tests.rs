//! Scoped enter/exit of hierarchy facts through `with_subtree`.

use tsemit_emitter::hierarchy_facts::{HierarchyFacts, HierarchyScoped, with_subtree};

struct Visitor {
    facts: HierarchyFacts,
    seen: Vec<HierarchyFacts>,
}

impl HierarchyScoped for Visitor {
    fn hierarchy_facts_mut(&mut self) -> &mut HierarchyFacts {
        &mut self.facts
    }
}

fn visitor(facts: HierarchyFacts) -> Visitor {
    Visitor { facts, seen: Vec::new() }
}

fn enter_function<R>(v: &mut Visitor, body: impl FnOnce(&mut Visitor) -> R) -> R {
    with_subtree(
        v,
        HierarchyFacts::FUNCTION_EXCLUDES,
        HierarchyFacts::FUNCTION_INCLUDES,
        HierarchyFacts::FUNCTION_SUBTREE_EXCLUDES,
        HierarchyFacts::NONE,
        body,
    )
}

fn enter_arrow<R>(v: &mut Visitor, body: impl FnOnce(&mut Visitor) -> R) -> R {
    with_subtree(
        v,
        HierarchyFacts::ARROW_FUNCTION_EXCLUDES,
        HierarchyFacts::ARROW_FUNCTION_INCLUDES,
        HierarchyFacts::ARROW_FUNCTION_SUBTREE_EXCLUDES,
        HierarchyFacts::NONE,
        body,
    )
}

#[test]
fn test_ancestor_facts_restored_after_nested_subtrees() {
    let start = HierarchyFacts::TOP_LEVEL | HierarchyFacts::ITERATION_STATEMENT;
    let mut v = visitor(start);
    enter_function(&mut v, |v| {
        v.seen.push(v.facts);
        enter_arrow(v, |v| v.seen.push(v.facts));
        v.seen.push(v.facts);
    });
    assert_eq!(v.facts, start);
    assert_eq!(v.seen[0], HierarchyFacts::FUNCTION | HierarchyFacts::TOP_LEVEL);
    assert!(v.seen[1].contains(HierarchyFacts::ARROW_FUNCTION));
    assert!(v.seen[1].contains(HierarchyFacts::FUNCTION));
    assert_eq!(v.seen[2], v.seen[0]);
}

#[test]
fn test_exit_runs_on_error_return() {
    let start = HierarchyFacts::TOP_LEVEL | HierarchyFacts::BLOCK;
    let mut v = visitor(start);
    let result: Result<(), String> = enter_function(&mut v, |v| {
        enter_arrow(v, |_| -> Result<(), String> { Err("bail".to_string()) })?;
        v.seen.push(v.facts);
        Ok(())
    });
    assert_eq!(result, Err("bail".to_string()));
    assert!(v.seen.is_empty());
    assert_eq!(v.facts, start);
}

#[test]
fn test_subtree_facts_fold_into_parent_until_function_boundary() {
    let mut v = visitor(HierarchyFacts::TOP_LEVEL);
    enter_function(&mut v, |v| {
        enter_arrow(v, |v| v.facts |= HierarchyFacts::CAPTURED_LEXICAL_THIS);
        // The arrow's capture is visible to the enclosing function.
        v.seen.push(v.facts);
    });
    assert!(v.seen[0].contains(HierarchyFacts::CAPTURED_LEXICAL_THIS));
    assert!(!v.facts.contains(HierarchyFacts::CAPTURED_LEXICAL_THIS));
    assert_eq!(v.facts, HierarchyFacts::TOP_LEVEL);
}

#[test]
fn test_plain_facts_value_is_its_own_owner() {
    let mut facts = HierarchyFacts::TOP_LEVEL;
    let inside = with_subtree(
        &mut facts,
        HierarchyFacts::BLOCK_EXCLUDES,
        HierarchyFacts::BLOCK_INCLUDES,
        HierarchyFacts::NONE,
        HierarchyFacts::NONE,
        |facts| *facts,
    );
    assert_eq!(inside, HierarchyFacts::BLOCK);
    assert_eq!(facts, HierarchyFacts::TOP_LEVEL);
}
