//! Flag sets carried by nodes.
//!
//! `TransformFlags` flow bottom-up (a node's flags include every child's),
//! `EmitFlags` are attached top-down by passes as printer directives.

use bitflags::bitflags;

bitflags! {
    /// Syntactic facts about a node that are not captured by its kind.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u32 {
        const NONE = 0;
        const LET = 1 << 0;
        const CONST = 1 << 1;
        /// Created by a transform rather than the parser.
        const SYNTHESIZED = 1 << 2;
        /// Body of `namespace A.B {}`: the inner `B` declaration.
        const NESTED_NAMESPACE = 1 << 3;
        /// `declare global { }`
        const GLOBAL_AUGMENTATION = 1 << 4;
        /// Source file contains top-level import/export.
        const EXTERNAL_MODULE = 1 << 5;

        const BLOCK_SCOPED = Self::LET.bits() | Self::CONST.bits();
    }
}

bitflags! {
    /// Modifier keywords present on a declaration.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u32 {
        const NONE = 0;
        const EXPORT = 1 << 0;
        /// `declare`
        const AMBIENT = 1 << 1;
        const PUBLIC = 1 << 2;
        const PRIVATE = 1 << 3;
        const PROTECTED = 1 << 4;
        const STATIC = 1 << 5;
        const READONLY = 1 << 6;
        const ABSTRACT = 1 << 7;
        const ASYNC = 1 << 8;
        const DEFAULT = 1 << 9;
        const CONST = 1 << 10;

        const ACCESSIBILITY_MODIFIER = Self::PUBLIC.bits() | Self::PRIVATE.bits() | Self::PROTECTED.bits();
        /// Constructor parameters with any of these become properties.
        const PARAMETER_PROPERTY_MODIFIER = Self::ACCESSIBILITY_MODIFIER.bits() | Self::READONLY.bits();
        const TYPESCRIPT_MODIFIER = Self::AMBIENT.bits()
            | Self::ACCESSIBILITY_MODIFIER.bits()
            | Self::READONLY.bits()
            | Self::ABSTRACT.bits()
            | Self::CONST.bits();
        const EXPORT_DEFAULT = Self::EXPORT.bits() | Self::DEFAULT.bits();
    }
}

bitflags! {
    /// Which lowering passes must visit a subtree.
    ///
    /// A node's flags are its own facts OR the flags of all its children.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TransformFlags: u32 {
        const NONE = 0;
        /// Type annotations, TypeScript-only declarations or modifiers.
        const CONTAINS_TYPESCRIPT = 1 << 0;
        /// Syntax introduced in ES2015.
        const CONTAINS_ES2015 = 1 << 1;
        const CONTAINS_DECORATORS = 1 << 2;
        const CONTAINS_PROPERTY_INITIALIZER = 1 << 3;
        const CONTAINS_PARAMETER_PROPERTY = 1 << 4;
        const CONTAINS_LEXICAL_THIS = 1 << 5;
        const CONTAINS_SUPER = 1 << 6;
        const CONTAINS_NEW_TARGET = 1 << 7;
        const CONTAINS_SPREAD = 1 << 8;
        const CONTAINS_OBJECT_REST_OR_SPREAD = 1 << 9;
        const CONTAINS_BINDING_PATTERN = 1 << 10;
        const CONTAINS_DEFAULT_VALUE_ASSIGNMENTS = 1 << 11;
        const CONTAINS_COMPUTED_PROPERTY_NAME = 1 << 12;
        const CONTAINS_BLOCK_SCOPED_BINDING = 1 << 13;
        const CONTAINS_TEMPLATE = 1 << 14;
        const CONTAINS_FOR_OF = 1 << 15;
        const CONTAINS_ARROW_FUNCTION = 1 << 16;
        const CONTAINS_CLASS = 1 << 17;
        /// Loops, labels, break/continue/return: anything a converted loop body must rewrite.
        const CONTAINS_HOISTED_DECLARATION_OR_COMPLETION = 1 << 18;

        /// Flags have been computed for this node.
        const HAS_COMPUTED_FLAGS = 1 << 31;
    }
}

impl TransformFlags {
    /// The flags without the bookkeeping bit.
    pub fn facts(self) -> TransformFlags {
        self - TransformFlags::HAS_COMPUTED_FLAGS
    }
}

bitflags! {
    /// Printer directives attached to a node by a pass.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EmitFlags: u32 {
        const NONE = 0;
        /// Print the node on one line.
        const SINGLE_LINE = 1 << 0;
        /// Ask the registered hooks before emitting this node.
        const ADVISE_ON_EMIT_NODE = 1 << 1;
        /// Never run substitution hooks on this node.
        const NO_SUBSTITUTION = 1 << 2;
        /// `this` inside this function refers to the captured `_this`.
        const CAPTURES_THIS = 1 << 3;
        const NO_LEADING_SOURCE_MAP = 1 << 4;
        const NO_TRAILING_SOURCE_MAP = 1 << 5;
        const NO_SOURCE_MAP = Self::NO_LEADING_SOURCE_MAP.bits() | Self::NO_TRAILING_SOURCE_MAP.bits();
        const NO_NESTED_SOURCE_MAPS = 1 << 6;
        const NO_LEADING_COMMENTS = 1 << 7;
        const NO_TRAILING_COMMENTS = 1 << 8;
        const NO_COMMENTS = Self::NO_LEADING_COMMENTS.bits() | Self::NO_TRAILING_COMMENTS.bits();
        const NO_NESTED_COMMENTS = 1 << 9;
        /// Identifier names a runtime helper (`__extends`, ...).
        const HELPER_NAME = 1 << 10;
        /// Identifier is the export name of a declaration.
        const EXPORT_NAME = 1 << 11;
        /// Identifier is the local name of a declaration.
        const LOCAL_NAME = 1 << 12;
        /// Identifier is the name used inside a class/namespace body.
        const INTERNAL_NAME = 1 << 13;
        const INDENTED = 1 << 14;
        const NO_INDENTATION = 1 << 15;
        /// Temporaries of this function are allocated in the enclosing scope.
        const REUSE_TEMP_VARIABLE_SCOPE = 1 << 16;
        /// Statement is a prologue added by a pass (`var _this = this;`).
        const CUSTOM_PROLOGUE = 1 << 17;
        /// Variable statement must not be hoisted by later passes.
        const NO_HOISTING = 1 << 18;
        const HAS_END_OF_DECLARATION_MARKER = 1 << 19;
        /// Do not escape non-ASCII characters in string literals.
        const NO_ASCII_ESCAPING = 1 << 20;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_property_modifiers() {
        assert!(ModifierFlags::PARAMETER_PROPERTY_MODIFIER.contains(ModifierFlags::READONLY));
        assert!(!ModifierFlags::PARAMETER_PROPERTY_MODIFIER.contains(ModifierFlags::STATIC));
        assert!(ModifierFlags::TYPESCRIPT_MODIFIER.contains(ModifierFlags::ABSTRACT));
    }

    #[test]
    fn facts_drop_bookkeeping_bit() {
        let flags = TransformFlags::CONTAINS_ES2015 | TransformFlags::HAS_COMPUTED_FLAGS;
        assert_eq!(flags.facts(), TransformFlags::CONTAINS_ES2015);
    }
}
