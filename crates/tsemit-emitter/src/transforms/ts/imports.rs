//! Import and export elision.
//!
//! An import binding that is never used as a value disappears, and an
//! import declaration with nothing left disappears with it. Side-effect
//! imports (`import "x";`) always stay.

use super::TypeScriptTransformer;
use crate::resolver::resolver_key;
use crate::transforms::visitor::{VisitResult, elided, single, visit_each_child};
use tracing::trace;
use tsemit_ast::{EmitFlags, NodeArena, NodeData, NodeFlags, NodeIndex, NodeList, SyntaxKind};
use tsemit_common::EmitResult;

impl TypeScriptTransformer<'_, '_> {
    pub(super) fn visit_import_declaration(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let NodeData::ImportDeclaration {
            import_clause,
            module_specifier,
        } = self.arena.data(node)?.clone()
        else {
            return Ok(single(node));
        };
        if import_clause.is_none() {
            return Ok(single(node));
        }
        let clause = self.visit_import_clause(import_clause)?;
        if clause.is_none() {
            trace!("eliding unused import declaration");
            return Ok(elided());
        }
        let data = NodeData::ImportDeclaration {
            import_clause: clause,
            module_specifier,
        };
        Ok(single(self.arena.update_node(node, data)))
    }

    fn visit_import_clause(&mut self, clause: NodeIndex) -> EmitResult<NodeIndex> {
        let NodeData::ImportClause { name, named_bindings } = self.arena.data(clause)?.clone() else {
            return Ok(clause);
        };
        let name = if name.is_some() && self.is_referenced(clause) {
            name
        } else {
            NodeIndex::NONE
        };
        let named_bindings = self.visit_named_import_bindings(named_bindings)?;
        if name.is_none() && named_bindings.is_none() {
            return Ok(NodeIndex::NONE);
        }
        Ok(self.arena.update_node(clause, NodeData::ImportClause { name, named_bindings }))
    }

    fn visit_named_import_bindings(&mut self, bindings: NodeIndex) -> EmitResult<NodeIndex> {
        if bindings.is_none() {
            return Ok(NodeIndex::NONE);
        }
        match self.arena.data(bindings)?.clone() {
            NodeData::NamespaceImport { .. } => Ok(if self.is_referenced(bindings) {
                bindings
            } else {
                NodeIndex::NONE
            }),
            NodeData::NamedImports { elements } => {
                let kept: Vec<NodeIndex> = elements.iter().filter(|&e| self.is_referenced(e)).collect();
                if kept.is_empty() {
                    return Ok(NodeIndex::NONE);
                }
                Ok(self.arena.update_node(
                    bindings,
                    NodeData::NamedImports {
                        elements: elements.with_nodes(kept),
                    },
                ))
            }
            _ => Ok(bindings),
        }
    }

    fn is_referenced(&self, node: NodeIndex) -> bool {
        self.context
            .resolver
            .is_referenced_alias_declaration(resolver_key(self.arena, node))
    }

    /// `import x = require("m")` stays when used; `import x = N.y` becomes
    /// `var x = N.y;` (or `N.x = N.y;` when exported from a namespace).
    pub(super) fn visit_import_equals_declaration(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let NodeData::ImportEqualsDeclaration { name, module_reference } = self.arena.data(node)?.clone() else {
            return Ok(single(node));
        };
        let referenced = self.is_referenced(node);
        if self.arena.is_kind(module_reference, SyntaxKind::ExternalModuleReference) {
            return Ok(if referenced { single(node) } else { elided() });
        }

        let at_script_top_level = !self.is_external_module
            && self.namespace_stack.is_empty()
            && self.arena.is_kind(self.arena.parent(node), SyntaxKind::SourceFile);
        if !referenced && !at_script_top_level {
            return Ok(elided());
        }

        let reference = entity_name_to_expression(self.arena, module_reference)?;
        self.arena
            .add_emit_flags(reference, EmitFlags::NO_COMMENTS | EmitFlags::NO_NESTED_COMMENTS);

        if self.is_namespace_export(node) {
            let target = self.namespace_member_name(name)?;
            let assignment = self.arena.create_assignment(target, reference);
            let statement = self.arena.create_expression_statement(assignment);
            return Ok(single(self.arena.set_original_and_range(statement, node)));
        }

        let local = self.arena.get_synthesized_clone(name)?;
        let declaration = self.arena.create_variable_declaration(local, reference);
        self.arena.set_original(declaration, node);
        let list = self.arena.create_variable_declaration_list(vec![declaration], NodeFlags::NONE);
        let modifiers = self.emitted_modifiers(node);
        let statement = self.arena.create_variable_statement_from_list(list, modifiers);
        Ok(single(self.arena.set_original_and_range(statement, node)))
    }

    /// `export { a, b }` keeps only value exports; `export *` always stays.
    pub(super) fn visit_export_declaration(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let NodeData::ExportDeclaration {
            export_clause,
            module_specifier,
        } = self.arena.data(node)?.clone()
        else {
            return Ok(single(node));
        };
        if export_clause.is_none() {
            return Ok(single(node));
        }
        let NodeData::NamedExports { elements } = self.arena.data(export_clause)?.clone() else {
            return Ok(single(node));
        };
        let kept: Vec<NodeIndex> = elements
            .iter()
            .filter(|&e| {
                self.context
                    .resolver
                    .is_value_alias_declaration(resolver_key(self.arena, e))
            })
            .collect();
        if kept.is_empty() {
            trace!("eliding export declaration with no value exports");
            return Ok(elided());
        }
        let clause = self.arena.update_node(
            export_clause,
            NodeData::NamedExports {
                elements: NodeList::with_range(kept, elements.pos, elements.end),
            },
        );
        let data = NodeData::ExportDeclaration {
            export_clause: clause,
            module_specifier,
        };
        Ok(single(self.arena.update_node(node, data)))
    }

    /// `export = T` or `export default T` naming a type only disappears.
    pub(super) fn visit_export_assignment(&mut self, node: NodeIndex) -> EmitResult<VisitResult> {
        let NodeData::ExportAssignment { expression, .. } = self.arena.data(node)?.clone() else {
            return Ok(single(node));
        };
        if self.arena.is_kind(expression, SyntaxKind::Identifier)
            && !self
                .context
                .resolver
                .is_value_alias_declaration(resolver_key(self.arena, node))
        {
            return Ok(elided());
        }
        Ok(single(visit_each_child(self, node)?))
    }
}

/// `A.B.C` as a property access chain of fresh identifiers.
pub(super) fn entity_name_to_expression(arena: &mut NodeArena, name: NodeIndex) -> EmitResult<NodeIndex> {
    match arena.data(name)?.clone() {
        NodeData::QualifiedName { left, right } => {
            let left = entity_name_to_expression(arena, left)?;
            let right = arena.get_synthesized_clone(right)?;
            let access = arena.create_property_access(left, right);
            Ok(arena.set_original_and_range(access, name))
        }
        _ => {
            let clone = arena.get_synthesized_clone(name)?;
            arena.set_text_range_from(clone, name);
            Ok(clone)
        }
    }
}
