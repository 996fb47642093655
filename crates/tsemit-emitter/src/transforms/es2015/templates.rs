//! Template literals to string concatenation, tagged templates to a call.

use super::Es2015Transformer;
use crate::helpers::{TEMPLATE_OBJECT_HELPER, create_helper_name};
use crate::transforms::visitor::visit_node;
use tsemit_ast::{NodeArena, NodeData, NodeIndex, TemplateText};
use tsemit_common::{EmitError, EmitResult};

impl Es2015Transformer<'_, '_> {
    pub(super) fn visit_no_substitution_template(&mut self, node: NodeIndex, cooked: &str) -> NodeIndex {
        let literal = self.arena.create_string_literal(cooked);
        self.arena.set_text_range_from(literal, node);
        literal
    }

    /// `` `a${b}c${d}` `` becomes `"a" + b + "c" + d`. An empty head is kept
    /// only when the first literal is empty too, so the result stays a string.
    pub(super) fn visit_template_expression(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let NodeData::TemplateExpression { head, template_spans } = self.arena.data(node)?.clone() else {
            return Ok(node);
        };
        let head_text = template_text(self.arena, head)?.cooked;
        let first_literal_empty = match template_spans.first() {
            Some(span) => template_text(self.arena, span_literal(self.arena, span)?)?.cooked.is_empty(),
            None => true,
        };

        let mut expressions = Vec::with_capacity(template_spans.len() * 2 + 1);
        if !head_text.is_empty() || first_literal_empty {
            expressions.push(self.arena.create_string_literal(&head_text));
        }
        for span in template_spans.iter() {
            let NodeData::TemplateSpan { expression, literal } = self.arena.data(span)?.clone() else {
                continue;
            };
            expressions.push(visit_node(self, expression)?);
            let text = template_text(self.arena, literal)?.cooked;
            if !text.is_empty() {
                expressions.push(self.arena.create_string_literal(&text));
            }
        }

        let mut pieces = expressions.into_iter();
        let Some(mut result) = pieces.next() else {
            return Ok(self.arena.create_string_literal(""));
        };
        for piece in pieces {
            result = self.arena.create_add(result, piece);
        }
        self.arena.set_text_range_from(result, node);
        Ok(result)
    }

    /// ``tag`a${b}c` `` becomes `tag(__makeTemplateObject(["a", "c"], ["a", "c"]), b)`.
    /// In a module the strings object is created once and cached in a
    /// file-level `templateObject_N`.
    pub(super) fn visit_tagged_template_expression(&mut self, node: NodeIndex) -> EmitResult<NodeIndex> {
        let NodeData::TaggedTemplateExpression { tag, template, .. } = self.arena.data(node)?.clone() else {
            return Ok(node);
        };
        let tag = visit_node(self, tag)?;
        let mut arguments = vec![NodeIndex::NONE];
        let mut cooked_strings = Vec::new();
        let mut raw_strings = Vec::new();

        match self.arena.data(template)?.clone() {
            NodeData::NoSubstitutionTemplateLiteral(text) => {
                cooked_strings.push(self.arena.create_string_literal(&text.cooked));
                raw_strings.push(self.create_raw_literal(template, &text));
            }
            NodeData::TemplateExpression { head, template_spans } => {
                let text = template_text(self.arena, head)?;
                cooked_strings.push(self.arena.create_string_literal(&text.cooked));
                raw_strings.push(self.create_raw_literal(head, &text));
                for span in template_spans.iter() {
                    let NodeData::TemplateSpan { expression, literal } = self.arena.data(span)?.clone() else {
                        continue;
                    };
                    let text = template_text(self.arena, literal)?;
                    cooked_strings.push(self.arena.create_string_literal(&text.cooked));
                    raw_strings.push(self.create_raw_literal(literal, &text));
                    arguments.push(visit_node(self, expression)?);
                }
            }
            other => {
                return Err(EmitError::UnexpectedNode {
                    kind: format!("{:?}", other.kind()),
                    pos: self.arena.range(template).pos,
                    context: "tagged template",
                });
            }
        }

        self.context.request_emit_helper(&TEMPLATE_OBJECT_HELPER);
        let helper = create_helper_name(self.arena, "__makeTemplateObject");
        let cooked = self.arena.create_array_literal(cooked_strings, false);
        let raw = self.arena.create_array_literal(raw_strings, false);
        let helper_call = self.arena.create_call(helper, vec![cooked, raw]);

        arguments[0] = if self.is_external_module {
            let temp = self.arena.create_unique_name("templateObject");
            self.tagged_template_declarations.push(temp);
            let assignment = self.arena.create_assignment(temp, helper_call);
            let assignment = self.arena.create_paren(assignment);
            self.arena.create_logical_or(temp, assignment)
        } else {
            helper_call
        };
        let call = self.arena.create_call(tag, arguments);
        Ok(self.arena.set_original_and_range(call, node))
    }

    fn create_raw_literal(&mut self, node: NodeIndex, text: &TemplateText) -> NodeIndex {
        let literal = self.arena.create_string_literal(&normalize_line_endings(&text.raw));
        self.arena.set_text_range_from(literal, node);
        literal
    }
}

fn template_text(arena: &NodeArena, node: NodeIndex) -> EmitResult<TemplateText> {
    match arena.data(node)? {
        NodeData::NoSubstitutionTemplateLiteral(text)
        | NodeData::TemplateHead(text)
        | NodeData::TemplateMiddle(text)
        | NodeData::TemplateTail(text) => Ok(text.clone()),
        other => Err(EmitError::UnexpectedNode {
            kind: format!("{:?}", other.kind()),
            pos: arena.range(node).pos,
            context: "template literal",
        }),
    }
}

fn span_literal(arena: &NodeArena, span: NodeIndex) -> EmitResult<NodeIndex> {
    match arena.data(span)? {
        NodeData::TemplateSpan { literal, .. } => Ok(*literal),
        _ => Err(EmitError::MissingChild {
            kind: "TemplateSpan".to_string(),
            child: "literal",
        }),
    }
}

/// Raw template text sees `\r\n` and `\r` as `\n`.
fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_line_endings_normalized() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(normalize_line_endings("\\n"), "\\n");
    }
}
