//! Per-node transform facts.
//!
//! A node's transform flags are the facts contributed by its own syntax
//! OR'ed with the flags of all of its children. Nothing is masked out at
//! function or class boundaries, so a node's flags are always a superset of
//! its children's flags and passes may visit more than strictly needed.

use crate::arena::NodeArena;
use crate::flags::{ModifierFlags, NodeFlags, TransformFlags};
use crate::node::{FunctionData, Node, NodeData};
use crate::syntax_kind::SyntaxKind;

type F = TransformFlags;

fn function_facts(f: &FunctionData) -> TransformFlags {
    let mut flags = F::NONE;
    if f.type_parameters.is_some() || f.return_type.is_some() || f.body.is_none() || f.question {
        flags |= F::CONTAINS_TYPESCRIPT;
    }
    if !f.decorators.is_empty() {
        flags |= F::CONTAINS_TYPESCRIPT | F::CONTAINS_DECORATORS;
    }
    flags
}

/// Facts contributed by the node itself, ignoring its children.
pub fn compute_own_transform_flags(arena: &NodeArena, node: &Node) -> TransformFlags {
    let mut flags = F::NONE;
    if node.modifiers.intersects(ModifierFlags::TYPESCRIPT_MODIFIER) {
        flags |= F::CONTAINS_TYPESCRIPT;
    }
    if node.kind().is_type_node() {
        flags |= F::CONTAINS_TYPESCRIPT;
    }

    flags |= match &node.data {
        NodeData::ThisKeyword => F::CONTAINS_LEXICAL_THIS,
        NodeData::SuperKeyword => F::CONTAINS_ES2015 | F::CONTAINS_SUPER,
        NodeData::MetaProperty { keyword, .. } if *keyword == SyntaxKind::NewKeyword => {
            F::CONTAINS_ES2015 | F::CONTAINS_NEW_TARGET
        }
        NodeData::ComputedPropertyName { .. } => F::CONTAINS_ES2015 | F::CONTAINS_COMPUTED_PROPERTY_NAME,
        NodeData::NoSubstitutionTemplateLiteral(_)
        | NodeData::TemplateHead(_)
        | NodeData::TemplateMiddle(_)
        | NodeData::TemplateTail(_)
        | NodeData::TemplateExpression { .. } => F::CONTAINS_ES2015 | F::CONTAINS_TEMPLATE,
        NodeData::TaggedTemplateExpression { type_arguments, .. } => {
            let mut f = F::CONTAINS_ES2015 | F::CONTAINS_TEMPLATE;
            if type_arguments.is_some() {
                f |= F::CONTAINS_TYPESCRIPT;
            }
            f
        }
        NodeData::SpreadElement { .. } => F::CONTAINS_ES2015 | F::CONTAINS_SPREAD,
        NodeData::SpreadAssignment { .. } => F::CONTAINS_OBJECT_REST_OR_SPREAD,
        NodeData::ObjectBindingPattern { elements } => {
            let has_rest = elements.iter().any(|e| {
                matches!(arena.get(e).map(|n| &n.data), Some(NodeData::BindingElement { dot_dot_dot: true, .. }))
            });
            let mut f = F::CONTAINS_ES2015 | F::CONTAINS_BINDING_PATTERN;
            if has_rest {
                f |= F::CONTAINS_OBJECT_REST_OR_SPREAD;
            }
            f
        }
        NodeData::ArrayBindingPattern { .. } => F::CONTAINS_ES2015 | F::CONTAINS_BINDING_PATTERN,
        NodeData::BindingElement { initializer, .. } => {
            if initializer.is_some() {
                F::CONTAINS_ES2015 | F::CONTAINS_DEFAULT_VALUE_ASSIGNMENTS
            } else {
                F::CONTAINS_ES2015
            }
        }
        NodeData::Parameter { decorators, dot_dot_dot, question, type_node, initializer, .. } => {
            let mut f = F::NONE;
            if node.modifiers.intersects(ModifierFlags::PARAMETER_PROPERTY_MODIFIER) {
                f |= F::CONTAINS_TYPESCRIPT | F::CONTAINS_PARAMETER_PROPERTY;
            }
            if !decorators.is_empty() {
                f |= F::CONTAINS_TYPESCRIPT | F::CONTAINS_DECORATORS;
            }
            if *question || type_node.is_some() {
                f |= F::CONTAINS_TYPESCRIPT;
            }
            if initializer.is_some() {
                f |= F::CONTAINS_ES2015 | F::CONTAINS_DEFAULT_VALUE_ASSIGNMENTS;
            }
            if *dot_dot_dot {
                f |= F::CONTAINS_ES2015;
            }
            f
        }
        NodeData::Decorator { .. } => F::CONTAINS_TYPESCRIPT | F::CONTAINS_DECORATORS,
        NodeData::PropertyDeclaration { decorators, initializer, .. } => {
            let mut f = F::CONTAINS_TYPESCRIPT;
            if initializer.is_some() {
                f |= F::CONTAINS_PROPERTY_INITIALIZER;
            }
            if !decorators.is_empty() {
                f |= F::CONTAINS_DECORATORS;
            }
            f
        }
        NodeData::PropertySignature { .. }
        | NodeData::MethodSignature { .. }
        | NodeData::IndexSignature { .. }
        | NodeData::InterfaceDeclaration { .. }
        | NodeData::TypeAliasDeclaration { .. }
        | NodeData::TypeParameter { .. }
        | NodeData::EnumDeclaration { .. }
        | NodeData::EnumMember { .. }
        | NodeData::ModuleDeclaration { .. }
        | NodeData::ModuleBlock { .. }
        | NodeData::ImportEqualsDeclaration { .. }
        | NodeData::TypeAssertionExpression { .. }
        | NodeData::AsExpression { .. }
        | NodeData::NonNullExpression { .. }
        | NodeData::ImportDeclaration { .. }
        | NodeData::ExportDeclaration { .. }
        | NodeData::ExportAssignment { .. } => F::CONTAINS_TYPESCRIPT,
        NodeData::HeritageClause { token, .. } => {
            if *token == SyntaxKind::ImplementsKeyword {
                F::CONTAINS_TYPESCRIPT
            } else {
                F::CONTAINS_ES2015
            }
        }
        NodeData::ExpressionWithTypeArguments { type_arguments, .. }
        | NodeData::CallExpression { type_arguments, .. } => {
            if type_arguments.is_some() { F::CONTAINS_TYPESCRIPT } else { F::NONE }
        }
        NodeData::NewExpression { type_arguments, .. } => {
            if type_arguments.is_some() { F::CONTAINS_TYPESCRIPT } else { F::NONE }
        }
        NodeData::ArrowFunction(f) => F::CONTAINS_ES2015 | F::CONTAINS_ARROW_FUNCTION | function_facts(f),
        NodeData::MethodDeclaration(f) => F::CONTAINS_ES2015 | function_facts(f),
        NodeData::Constructor(f)
        | NodeData::GetAccessor(f)
        | NodeData::SetAccessor(f)
        | NodeData::FunctionExpression(f) => function_facts(f),
        NodeData::FunctionDeclaration(f) => F::CONTAINS_HOISTED_DECLARATION_OR_COMPLETION | function_facts(f),
        NodeData::ClassDeclaration(c) | NodeData::ClassExpression(c) => {
            let mut f = F::CONTAINS_ES2015 | F::CONTAINS_CLASS;
            if !c.decorators.is_empty() {
                f |= F::CONTAINS_TYPESCRIPT | F::CONTAINS_DECORATORS;
            }
            if c.type_parameters.is_some() {
                f |= F::CONTAINS_TYPESCRIPT;
            }
            f
        }
        NodeData::VariableDeclarationList { .. } => {
            if node.flags.intersects(NodeFlags::BLOCK_SCOPED) {
                F::CONTAINS_ES2015 | F::CONTAINS_BLOCK_SCOPED_BINDING
            } else {
                F::CONTAINS_HOISTED_DECLARATION_OR_COMPLETION
            }
        }
        NodeData::VariableDeclaration { exclamation, type_node, .. } => {
            if *exclamation || type_node.is_some() { F::CONTAINS_TYPESCRIPT } else { F::NONE }
        }
        NodeData::ForOfStatement { .. } => F::CONTAINS_ES2015 | F::CONTAINS_FOR_OF,
        NodeData::ShorthandPropertyAssignment { .. } => F::CONTAINS_ES2015,
        NodeData::ReturnStatement { .. }
        | NodeData::BreakStatement { .. }
        | NodeData::ContinueStatement { .. }
        | NodeData::LabeledStatement { .. } => F::CONTAINS_HOISTED_DECLARATION_OR_COMPLETION,
        NodeData::BinaryExpression { left, operator, .. } => {
            let destructuring = *operator == SyntaxKind::EqualsToken
                && matches!(
                    arena.kind(*left),
                    Some(SyntaxKind::ObjectLiteralExpression | SyntaxKind::ArrayLiteralExpression)
                );
            if destructuring {
                F::CONTAINS_ES2015 | F::CONTAINS_BINDING_PATTERN
            } else {
                F::NONE
            }
        }
        NodeData::SourceFile(sf) if sf.is_declaration_file => F::CONTAINS_TYPESCRIPT,
        _ => F::NONE,
    };
    flags
}

