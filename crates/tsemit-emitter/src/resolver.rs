//! Semantic queries the emitter asks of the checker.
//!
//! The emitter never computes types or bindings itself. Everything it needs
//! to know about the checked program is answered by an `EmitResolver`:
//! alias usage for import elision, constant values for const enums, node
//! check flags for loop conversion and class aliasing, and the serialization
//! kind of type references for decorator metadata.
//!
//! Queries are keyed by parse-tree nodes. Callers map synthesized nodes back
//! with `resolver_key` before asking.

use bitflags::bitflags;
use rustc_hash::{FxHashMap, FxHashSet};
use tsemit_ast::{NodeArena, NodeIndex};

bitflags! {
    /// Binding facts the checker records on declarations, references and loops.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeCheckFlags: u32 {
        const NONE = 0;
        /// A function whose body needs `var _this = this;`.
        const CAPTURE_THIS = 1 << 0;
        const CAPTURE_ARGUMENTS = 1 << 1;
        /// A loop whose block-scoped bindings are captured by a closure in its body.
        const LOOP_WITH_CAPTURED_BLOCK_SCOPED_BINDING = 1 << 2;
        /// A block-scoped binding captured by a closure.
        const CAPTURED_BLOCK_SCOPED_BINDING = 1 << 3;
        /// A block-scoped binding declared inside a loop.
        const BLOCK_SCOPED_BINDING_IN_LOOP = 1 << 4;
        /// A loop binding assigned inside the loop body that must be copied back out.
        const NEEDS_LOOP_OUT_PARAMETER = 1 << 5;
        /// A class that refers to itself from inside its body.
        const CLASS_WITH_CONSTRUCTOR_REFERENCE = 1 << 6;
        /// A reference to a class from inside that class's body.
        const CONSTRUCTOR_REFERENCE_IN_CLASS = 1 << 7;
        const SUPER_INSTANCE = 1 << 8;
        const SUPER_STATIC = 1 << 9;
    }
}

/// Compile-time value of an enum member.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    Number(f64),
    String(String),
}

/// How a type reference is represented at runtime for `design:*` metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TypeReferenceSerializationKind {
    /// Unresolvable or unknown: serialized as `Object`.
    #[default]
    Unknown,
    /// A class or other value with a construct signature: serialized by name.
    TypeWithConstructSignatureAndValue,
    VoidNullableOrNeverType,
    NumberLikeType,
    BigIntLikeType,
    StringLikeType,
    BooleanType,
    ArrayLikeType,
    ESSymbolType,
    Promise,
    TypeWithCallSignature,
    ObjectType,
}

/// The checker, as seen from the emitter.
pub trait EmitResolver {
    /// An import alias that is referenced somewhere in the file.
    fn is_referenced_alias_declaration(&self, node: NodeIndex) -> bool;

    /// An import alias whose target has a value meaning.
    fn is_value_alias_declaration(&self, node: NodeIndex) -> bool;

    /// Value of an enum member, or of a property/element access to one.
    fn get_constant_value(&self, node: NodeIndex) -> Option<ConstantValue>;

    fn get_node_check_flags(&self, node: NodeIndex) -> NodeCheckFlags;

    /// For an identifier reference: the block-scoped declaration it refers to
    /// when that declaration's name collides with an outer binding.
    fn get_referenced_declaration_with_colliding_name(&self, node: NodeIndex) -> Option<NodeIndex>;

    /// A block-scoped declaration whose name must be renamed when lowered to `var`.
    fn is_declaration_with_colliding_name(&self, node: NodeIndex) -> bool;

    fn has_global_name(&self, name: &str) -> bool;

    fn get_type_reference_serialization_kind(&self, type_name: NodeIndex) -> TypeReferenceSerializationKind;

    /// For an identifier reference: the namespace or enum declaration that
    /// exports the referenced binding.
    fn get_referenced_export_container(&self, _node: NodeIndex) -> Option<NodeIndex> {
        None
    }

    /// For an identifier reference: the declaration it binds to.
    fn get_referenced_value_declaration(&self, _node: NodeIndex) -> Option<NodeIndex> {
        None
    }

    /// `arguments` resolves to a local binding rather than the implicit object.
    fn is_arguments_local_binding(&self, _node: NodeIndex) -> bool {
        false
    }

    /// The expression's type is an array or string (for-of can index it).
    fn is_array_like_expression(&self, _node: NodeIndex) -> bool {
        true
    }

    /// Type text for a declaration without an annotation (declaration emit).
    fn serialize_type_of_declaration(&self, _node: NodeIndex) -> Option<String> {
        None
    }

    fn is_declaration_visible(&self, _node: NodeIndex) -> bool {
        true
    }
}

/// Key for a resolver query: the parse-tree node, or the root of the
/// `original` chain for trees that were synthesized from the start.
pub fn resolver_key(arena: &NodeArena, mut node: NodeIndex) -> NodeIndex {
    while let Some(n) = arena.get(node) {
        if n.is_parse_tree_node() || n.original.is_none() {
            break;
        }
        node = n.original;
    }
    node
}

/// A resolver answering from tables filled in ahead of time.
///
/// Used by drivers that run the checker up front and by tests.
#[derive(Clone, Debug, Default)]
pub struct PrecomputedResolver {
    pub referenced_aliases: FxHashSet<NodeIndex>,
    pub value_aliases: FxHashSet<NodeIndex>,
    pub constant_values: FxHashMap<NodeIndex, ConstantValue>,
    pub check_flags: FxHashMap<NodeIndex, NodeCheckFlags>,
    pub colliding_references: FxHashMap<NodeIndex, NodeIndex>,
    pub colliding_declarations: FxHashSet<NodeIndex>,
    pub global_names: FxHashSet<String>,
    pub type_reference_kinds: FxHashMap<NodeIndex, TypeReferenceSerializationKind>,
    pub export_containers: FxHashMap<NodeIndex, NodeIndex>,
    pub value_declarations: FxHashMap<NodeIndex, NodeIndex>,
    pub local_arguments: FxHashSet<NodeIndex>,
    /// Expressions known not to be array-like. Everything else is.
    pub non_array_like: FxHashSet<NodeIndex>,
    pub declaration_types: FxHashMap<NodeIndex, String>,
    pub invisible_declarations: FxHashSet<NodeIndex>,
}

impl PrecomputedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_check_flags(&mut self, node: NodeIndex, flags: NodeCheckFlags) -> &mut Self {
        *self.check_flags.entry(node).or_default() |= flags;
        self
    }

    pub fn set_constant_value(&mut self, node: NodeIndex, value: ConstantValue) -> &mut Self {
        self.constant_values.insert(node, value);
        self
    }

    /// Mark an import alias as referenced (and therefore a value alias).
    pub fn mark_referenced_alias(&mut self, node: NodeIndex) -> &mut Self {
        self.referenced_aliases.insert(node);
        self.value_aliases.insert(node);
        self
    }
}

impl EmitResolver for PrecomputedResolver {
    fn is_referenced_alias_declaration(&self, node: NodeIndex) -> bool {
        self.referenced_aliases.contains(&node)
    }

    fn is_value_alias_declaration(&self, node: NodeIndex) -> bool {
        self.value_aliases.contains(&node)
    }

    fn get_constant_value(&self, node: NodeIndex) -> Option<ConstantValue> {
        self.constant_values.get(&node).cloned()
    }

    fn get_node_check_flags(&self, node: NodeIndex) -> NodeCheckFlags {
        self.check_flags.get(&node).copied().unwrap_or_default()
    }

    fn get_referenced_declaration_with_colliding_name(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.colliding_references.get(&node).copied()
    }

    fn is_declaration_with_colliding_name(&self, node: NodeIndex) -> bool {
        self.colliding_declarations.contains(&node)
    }

    fn has_global_name(&self, name: &str) -> bool {
        self.global_names.contains(name)
    }

    fn get_type_reference_serialization_kind(&self, type_name: NodeIndex) -> TypeReferenceSerializationKind {
        self.type_reference_kinds.get(&type_name).copied().unwrap_or_default()
    }

    fn get_referenced_export_container(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.export_containers.get(&node).copied()
    }

    fn get_referenced_value_declaration(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.value_declarations.get(&node).copied()
    }

    fn is_arguments_local_binding(&self, node: NodeIndex) -> bool {
        self.local_arguments.contains(&node)
    }

    fn is_array_like_expression(&self, node: NodeIndex) -> bool {
        !self.non_array_like.contains(&node)
    }

    fn serialize_type_of_declaration(&self, node: NodeIndex) -> Option<String> {
        self.declaration_types.get(&node).cloned()
    }

    fn is_declaration_visible(&self, node: NodeIndex) -> bool {
        !self.invisible_declarations.contains(&node)
    }
}

// =============================================================================
// Declaration visibility diagnostics
// =============================================================================

/// A declaration whose `.d.ts` text would name something not visible to consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityDiagnostic {
    /// Message template with `{0}` for the type name.
    pub message: String,
    pub code: u32,
    pub error_node: NodeIndex,
    pub type_name: Option<String>,
}

/// Computes visibility diagnostics while declaration text is being produced.
pub trait DeclarationDiagnosticsProvider {
    fn check_declaration(&self, arena: &NodeArena, node: NodeIndex) -> Option<VisibilityDiagnostic>;
}

/// Reports nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoVisibilityDiagnostics;

impl DeclarationDiagnosticsProvider for NoVisibilityDiagnostics {
    fn check_declaration(&self, _arena: &NodeArena, _node: NodeIndex) -> Option<VisibilityDiagnostic> {
        None
    }
}

impl<F> DeclarationDiagnosticsProvider for F
where
    F: Fn(&NodeArena, NodeIndex) -> Option<VisibilityDiagnostic>,
{
    fn check_declaration(&self, arena: &NodeArena, node: NodeIndex) -> Option<VisibilityDiagnostic> {
        self(arena, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_flags_accumulate() {
        let mut resolver = PrecomputedResolver::new();
        let node = NodeIndex(3);
        resolver
            .add_check_flags(node, NodeCheckFlags::CAPTURED_BLOCK_SCOPED_BINDING)
            .add_check_flags(node, NodeCheckFlags::NEEDS_LOOP_OUT_PARAMETER);
        let flags = resolver.get_node_check_flags(node);
        assert!(flags.contains(NodeCheckFlags::CAPTURED_BLOCK_SCOPED_BINDING | NodeCheckFlags::NEEDS_LOOP_OUT_PARAMETER));
        assert_eq!(resolver.get_node_check_flags(NodeIndex(4)), NodeCheckFlags::NONE);
    }

    #[test]
    fn test_referenced_alias_is_value_alias() {
        let mut resolver = PrecomputedResolver::new();
        resolver.mark_referenced_alias(NodeIndex(1));
        assert!(resolver.is_referenced_alias_declaration(NodeIndex(1)));
        assert!(resolver.is_value_alias_declaration(NodeIndex(1)));
        assert!(!resolver.is_referenced_alias_declaration(NodeIndex(2)));
    }

    #[test]
    fn test_resolver_key_prefers_parse_tree_node() {
        let mut arena = NodeArena::new();
        let synthesized = arena.create_identifier("x");
        assert_eq!(resolver_key(&arena, synthesized), synthesized);
        let clone = arena.get_synthesized_clone(synthesized).expect("clone");
        assert_eq!(resolver_key(&arena, clone), synthesized);
    }
}
