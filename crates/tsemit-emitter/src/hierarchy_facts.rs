//! Ancestor-scoped lexical context for the ES2015 lowering.
//!
//! `HierarchyFacts` records where the visitor currently is ("inside a
//! constructor", "inside an arrow function", "directly in a `for` head") and
//! what the subtree below has used ("a `new.target` reference", "a captured
//! `this`"). The low bits are ancestor facts, restored exactly when a subtree
//! is left; the high bits are subtree facts, folded back into the parent.
//!
//! Every structural visit goes through `with_subtree`, which runs the exit
//! step on every path out of the closure, including `?` early returns.

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct HierarchyFacts: u32 {
        const NONE = 0;

        // Ancestor facts
        const FUNCTION = 1 << 0;
        const ARROW_FUNCTION = 1 << 1;
        const ASYNC_FUNCTION_BODY = 1 << 2;
        const NON_STATIC_CLASS_ELEMENT = 1 << 3;
        const CAPTURES_THIS = 1 << 4;
        const EXPORTED_VARIABLE_STATEMENT = 1 << 5;
        const TOP_LEVEL = 1 << 6;
        const BLOCK = 1 << 7;
        const ITERATION_STATEMENT = 1 << 8;
        const ITERATION_STATEMENT_BLOCK = 1 << 9;
        const ITERATION_CONTAINER = 1 << 10;
        const FOR_STATEMENT = 1 << 11;
        const FOR_IN_OR_FOR_OF_STATEMENT = 1 << 12;
        const CONSTRUCTOR_WITH_CAPTURED_SUPER = 1 << 13;
        const COMPUTED_PROPERTY_NAME = 1 << 14;

        const ANCESTOR_FACTS_MASK = (1 << 15) - 1;

        // Subtree facts
        const NEW_TARGET = 1 << 15;
        const CAPTURED_LEXICAL_THIS = 1 << 16;
        const NEW_TARGET_IN_COMPUTED_PROPERTY_NAME = 1 << 17;

        const SUBTREE_FACTS_MASK = !Self::ANCESTOR_FACTS_MASK.bits();

        // Masks per structural kind
        const BLOCK_SCOPE_INCLUDES = 0;
        const BLOCK_SCOPE_EXCLUDES = Self::TOP_LEVEL.bits()
            | Self::BLOCK.bits()
            | Self::ITERATION_STATEMENT.bits()
            | Self::ITERATION_STATEMENT_BLOCK.bits()
            | Self::FOR_STATEMENT.bits()
            | Self::FOR_IN_OR_FOR_OF_STATEMENT.bits();

        const SOURCE_FILE_INCLUDES = Self::TOP_LEVEL.bits();
        const SOURCE_FILE_EXCLUDES = (Self::BLOCK_SCOPE_EXCLUDES.bits() & !Self::TOP_LEVEL.bits())
            | Self::ITERATION_CONTAINER.bits();

        const FUNCTION_INCLUDES = Self::FUNCTION.bits() | Self::TOP_LEVEL.bits();
        const FUNCTION_EXCLUDES = (Self::BLOCK_SCOPE_EXCLUDES.bits() & !Self::TOP_LEVEL.bits())
            | Self::ARROW_FUNCTION.bits()
            | Self::ASYNC_FUNCTION_BODY.bits()
            | Self::CAPTURES_THIS.bits()
            | Self::NON_STATIC_CLASS_ELEMENT.bits()
            | Self::CONSTRUCTOR_WITH_CAPTURED_SUPER.bits()
            | Self::ITERATION_CONTAINER.bits()
            | Self::COMPUTED_PROPERTY_NAME.bits();

        const ARROW_FUNCTION_INCLUDES = Self::ARROW_FUNCTION.bits() | Self::TOP_LEVEL.bits();
        const ARROW_FUNCTION_EXCLUDES = (Self::BLOCK_SCOPE_EXCLUDES.bits() & !Self::TOP_LEVEL.bits())
            | Self::CONSTRUCTOR_WITH_CAPTURED_SUPER.bits()
            | Self::COMPUTED_PROPERTY_NAME.bits();

        const CONSTRUCTOR_INCLUDES = Self::FUNCTION_INCLUDES.bits() | Self::NON_STATIC_CLASS_ELEMENT.bits();
        const CONSTRUCTOR_EXCLUDES = Self::FUNCTION_EXCLUDES.bits() & !Self::NON_STATIC_CLASS_ELEMENT.bits();

        const DO_OR_WHILE_STATEMENT_INCLUDES = Self::ITERATION_STATEMENT.bits() | Self::ITERATION_CONTAINER.bits();
        const DO_OR_WHILE_STATEMENT_EXCLUDES = 0;

        const FOR_STATEMENT_INCLUDES = Self::ITERATION_STATEMENT.bits()
            | Self::FOR_STATEMENT.bits()
            | Self::ITERATION_CONTAINER.bits();
        const FOR_STATEMENT_EXCLUDES = Self::BLOCK_SCOPE_EXCLUDES.bits() & !Self::FOR_STATEMENT.bits();

        const FOR_IN_OR_FOR_OF_STATEMENT_INCLUDES = Self::ITERATION_STATEMENT.bits()
            | Self::FOR_IN_OR_FOR_OF_STATEMENT.bits()
            | Self::ITERATION_CONTAINER.bits();
        const FOR_IN_OR_FOR_OF_STATEMENT_EXCLUDES = Self::BLOCK_SCOPE_EXCLUDES.bits()
            & !Self::FOR_IN_OR_FOR_OF_STATEMENT.bits();

        const BLOCK_INCLUDES = Self::BLOCK.bits();
        const BLOCK_EXCLUDES = Self::BLOCK_SCOPE_EXCLUDES.bits() & !Self::BLOCK.bits();

        const ITERATION_STATEMENT_BLOCK_INCLUDES = Self::ITERATION_STATEMENT_BLOCK.bits();
        const ITERATION_STATEMENT_BLOCK_EXCLUDES = Self::BLOCK_SCOPE_EXCLUDES.bits();

        const COMPUTED_PROPERTY_NAME_INCLUDES = Self::COMPUTED_PROPERTY_NAME.bits();
        const COMPUTED_PROPERTY_NAME_EXCLUDES = 0;

        // Subtree facts that do not escape a function
        const ARROW_FUNCTION_SUBTREE_EXCLUDES = 0;
        const FUNCTION_SUBTREE_EXCLUDES = Self::NEW_TARGET.bits()
            | Self::CAPTURED_LEXICAL_THIS.bits()
            | Self::NEW_TARGET_IN_COMPUTED_PROPERTY_NAME.bits();
    }
}

/// Owner of a current `HierarchyFacts` value.
pub trait HierarchyScoped {
    fn hierarchy_facts_mut(&mut self) -> &mut HierarchyFacts;
}

impl HierarchyScoped for HierarchyFacts {
    fn hierarchy_facts_mut(&mut self) -> &mut HierarchyFacts {
        self
    }
}

/// Enter a subtree: returns the facts to restore on exit.
///
/// `current = (current & !exclude | include) & ANCESTOR_FACTS_MASK`
pub fn enter_subtree(current: &mut HierarchyFacts, exclude: HierarchyFacts, include: HierarchyFacts) -> HierarchyFacts {
    let ancestor = *current;
    *current = ((*current - exclude) | include) & HierarchyFacts::ANCESTOR_FACTS_MASK;
    ancestor
}

/// Leave a subtree: restore the ancestor facts and fold the subtree facts
/// that survive `exclude`/`include` back in.
///
/// `current = (current & !exclude | include) & SUBTREE_FACTS_MASK | ancestor`
pub fn exit_subtree(
    current: &mut HierarchyFacts,
    ancestor: HierarchyFacts,
    exclude: HierarchyFacts,
    include: HierarchyFacts,
) {
    *current = (((*current - exclude) | include) & HierarchyFacts::SUBTREE_FACTS_MASK) | ancestor;
}

/// Run `visit` inside a subtree. The exit step runs whatever `visit` returns.
pub fn with_subtree<T, R>(
    owner: &mut T,
    exclude: HierarchyFacts,
    include: HierarchyFacts,
    subtree_exclude: HierarchyFacts,
    subtree_include: HierarchyFacts,
    visit: impl FnOnce(&mut T) -> R,
) -> R
where
    T: HierarchyScoped + ?Sized,
{
    let ancestor = enter_subtree(owner.hierarchy_facts_mut(), exclude, include);
    let result = visit(owner);
    exit_subtree(owner.hierarchy_facts_mut(), ancestor, subtree_exclude, subtree_include);
    result
}
