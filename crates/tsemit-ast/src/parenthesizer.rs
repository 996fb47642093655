//! Operator precedence and the parenthesization rules the factory applies
//! when it builds expressions from arbitrary operands.

use crate::arena::NodeArena;
use crate::node::{NodeData, NodeIndex, NodeList};
use crate::syntax_kind::SyntaxKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Comma = 0,
    Spread = 1,
    Yield = 2,
    Assignment = 3,
    Conditional = 4,
    LogicalOr = 5,
    LogicalAnd = 6,
    BitwiseOr = 7,
    BitwiseXor = 8,
    BitwiseAnd = 9,
    Equality = 10,
    Relational = 11,
    Shift = 12,
    Additive = 13,
    Multiplicative = 14,
    Exponentiation = 15,
    Unary = 16,
    Update = 17,
    LeftHandSide = 18,
    Member = 19,
    Primary = 20,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

pub fn binary_operator_precedence(operator: SyntaxKind) -> Precedence {
    use SyntaxKind::*;
    match operator {
        CommaToken => Precedence::Comma,
        op if op.is_assignment_operator() => Precedence::Assignment,
        QuestionQuestionToken => Precedence::Conditional,
        BarBarToken => Precedence::LogicalOr,
        AmpersandAmpersandToken => Precedence::LogicalAnd,
        BarToken => Precedence::BitwiseOr,
        CaretToken => Precedence::BitwiseXor,
        AmpersandToken => Precedence::BitwiseAnd,
        EqualsEqualsToken | ExclamationEqualsToken | EqualsEqualsEqualsToken | ExclamationEqualsEqualsToken => {
            Precedence::Equality
        }
        LessThanToken | GreaterThanToken | LessThanEqualsToken | GreaterThanEqualsToken | InstanceOfKeyword
        | InKeyword => Precedence::Relational,
        LessThanLessThanToken | GreaterThanGreaterThanToken | GreaterThanGreaterThanGreaterThanToken => {
            Precedence::Shift
        }
        PlusToken | MinusToken => Precedence::Additive,
        AsteriskToken | SlashToken | PercentToken => Precedence::Multiplicative,
        AsteriskAsteriskToken => Precedence::Exponentiation,
        _ => Precedence::Comma,
    }
}

fn binary_operator_associativity(operator: SyntaxKind) -> Associativity {
    if operator == SyntaxKind::AsteriskAsteriskToken || operator.is_assignment_operator() {
        Associativity::Right
    } else {
        Associativity::Left
    }
}

/// Operators for which `a op (b op c)` equals `(a op b) op c`.
fn operator_has_associative_property(operator: SyntaxKind) -> bool {
    matches!(
        operator,
        SyntaxKind::AsteriskToken | SyntaxKind::BarToken | SyntaxKind::AmpersandToken | SyntaxKind::CaretToken
    )
}

impl NodeArena {
    /// Look through `PartiallyEmittedExpression` wrappers.
    pub fn skip_partially_emitted(&self, mut index: NodeIndex) -> NodeIndex {
        while let Some(NodeData::PartiallyEmittedExpression { expression }) = self.get(index).map(|n| &n.data) {
            index = *expression;
        }
        index
    }

    /// Look through parentheses, assertions and partially emitted wrappers.
    pub fn skip_outer_expressions(&self, mut index: NodeIndex) -> NodeIndex {
        loop {
            match self.get(index).map(|n| &n.data) {
                Some(
                    NodeData::ParenthesizedExpression { expression }
                    | NodeData::PartiallyEmittedExpression { expression }
                    | NodeData::NonNullExpression { expression }
                    | NodeData::AsExpression { expression, .. }
                    | NodeData::TypeAssertionExpression { expression, .. },
                ) => index = *expression,
                _ => return index,
            }
        }
    }

    pub fn expression_precedence(&self, index: NodeIndex) -> Precedence {
        let index = self.skip_partially_emitted(index);
        let Some(node) = self.get(index) else {
            return Precedence::Primary;
        };
        match &node.data {
            NodeData::CommaListExpression { .. } => Precedence::Comma,
            NodeData::SpreadElement { .. } => Precedence::Spread,
            NodeData::ArrowFunction(_) => Precedence::Assignment,
            NodeData::ConditionalExpression { .. } => Precedence::Conditional,
            NodeData::BinaryExpression { operator, .. } => binary_operator_precedence(*operator),
            NodeData::PrefixUnaryExpression { .. }
            | NodeData::TypeOfExpression { .. }
            | NodeData::VoidExpression { .. }
            | NodeData::DeleteExpression { .. }
            | NodeData::TypeAssertionExpression { .. } => Precedence::Unary,
            NodeData::PostfixUnaryExpression { .. } => Precedence::Update,
            NodeData::AsExpression { .. } => Precedence::Relational,
            NodeData::CallExpression { .. } => Precedence::LeftHandSide,
            NodeData::NewExpression { arguments, .. } => {
                if arguments.is_some() {
                    Precedence::Member
                } else {
                    Precedence::LeftHandSide
                }
            }
            NodeData::TaggedTemplateExpression { .. }
            | NodeData::PropertyAccessExpression { .. }
            | NodeData::ElementAccessExpression { .. }
            | NodeData::NonNullExpression { .. }
            | NodeData::MetaProperty { .. } => Precedence::Member,
            _ => Precedence::Primary,
        }
    }

    fn expression_associativity(&self, index: NodeIndex) -> Associativity {
        let index = self.skip_partially_emitted(index);
        match self.get(index).map(|n| &n.data) {
            Some(NodeData::BinaryExpression { operator, .. }) => binary_operator_associativity(*operator),
            Some(NodeData::NewExpression { arguments: None, .. })
            | Some(NodeData::PrefixUnaryExpression { .. })
            | Some(NodeData::TypeOfExpression { .. })
            | Some(NodeData::VoidExpression { .. })
            | Some(NodeData::DeleteExpression { .. })
            | Some(NodeData::ConditionalExpression { .. })
            | Some(NodeData::ArrowFunction(_)) => Associativity::Right,
            _ => Associativity::Left,
        }
    }

    /// The leftmost sub-expression, the one printed first.
    pub fn leftmost_expression(&self, mut index: NodeIndex, stop_at_calls: bool) -> NodeIndex {
        loop {
            let Some(node) = self.get(index) else {
                return index;
            };
            index = match &node.data {
                NodeData::PostfixUnaryExpression { operand, .. } => *operand,
                NodeData::BinaryExpression { left, .. } => *left,
                NodeData::ConditionalExpression { condition, .. } => *condition,
                NodeData::TaggedTemplateExpression { tag, .. } => *tag,
                NodeData::CallExpression { expression, .. } => {
                    if stop_at_calls {
                        return index;
                    }
                    *expression
                }
                NodeData::AsExpression { expression, .. }
                | NodeData::ElementAccessExpression { expression, .. }
                | NodeData::PropertyAccessExpression { expression, .. }
                | NodeData::NonNullExpression { expression }
                | NodeData::PartiallyEmittedExpression { expression } => *expression,
                NodeData::CommaListExpression { elements } => match elements.first() {
                    Some(first) => first,
                    None => return index,
                },
                _ => return index,
            };
        }
    }

    fn is_comma_sequence(&self, index: NodeIndex) -> bool {
        matches!(
            self.get(self.skip_partially_emitted(index)).map(|n| &n.data),
            Some(NodeData::BinaryExpression { operator: SyntaxKind::CommaToken, .. } | NodeData::CommaListExpression { .. })
        )
    }

    fn is_left_hand_side(&self, index: NodeIndex) -> bool {
        self.kind(self.skip_partially_emitted(index))
            .is_some_and(SyntaxKind::is_left_hand_side_expression)
    }

    fn is_unary_expression(&self, index: NodeIndex) -> bool {
        match self.kind(self.skip_partially_emitted(index)) {
            Some(
                SyntaxKind::PrefixUnaryExpression
                | SyntaxKind::PostfixUnaryExpression
                | SyntaxKind::DeleteExpression
                | SyntaxKind::TypeOfExpression
                | SyntaxKind::VoidExpression
                | SyntaxKind::TypeAssertionExpression,
            ) => true,
            Some(kind) => kind.is_left_hand_side_expression(),
            None => false,
        }
    }

    fn wrap_in_parens(&mut self, expression: NodeIndex) -> NodeIndex {
        let paren = self.alloc_synthesized(
            NodeData::ParenthesizedExpression { expression },
            crate::flags::NodeFlags::NONE,
            crate::flags::ModifierFlags::NONE,
        );
        self.set_text_range_from(paren, expression);
        paren
    }

    /// `+` operands that are both string literals (or string-only `+` chains).
    fn literal_kind_of_plus_operand(&self, index: NodeIndex) -> Option<SyntaxKind> {
        let index = self.skip_partially_emitted(index);
        match self.get(index).map(|n| &n.data) {
            Some(NodeData::StringLiteral { .. }) => Some(SyntaxKind::StringLiteral),
            Some(NodeData::NumericLiteral { .. }) => Some(SyntaxKind::NumericLiteral),
            Some(NodeData::NoSubstitutionTemplateLiteral(_)) => Some(SyntaxKind::NoSubstitutionTemplateLiteral),
            Some(NodeData::BinaryExpression { left, operator: SyntaxKind::PlusToken, right }) => {
                let left = self.literal_kind_of_plus_operand(*left)?;
                let right = self.literal_kind_of_plus_operand(*right)?;
                (left == right).then_some(left)
            }
            _ => None,
        }
    }

    fn binary_operand_needs_parens(
        &self,
        operator: SyntaxKind,
        operand: NodeIndex,
        is_left: bool,
        left_operand: NodeIndex,
    ) -> bool {
        let operator_precedence = binary_operator_precedence(operator);
        let associativity = binary_operator_associativity(operator);
        let emitted = self.skip_partially_emitted(operand);
        if !is_left && self.is_kind(emitted, SyntaxKind::ArrowFunction) && operator_precedence > Precedence::Assignment {
            return true;
        }
        let operand_precedence = self.expression_precedence(emitted);
        match operand_precedence.cmp(&operator_precedence) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal if is_left => associativity == Associativity::Right,
            std::cmp::Ordering::Equal => {
                if let Some(NodeData::BinaryExpression { operator: inner, .. }) = self.get(emitted).map(|n| &n.data) {
                    if *inner == operator {
                        if operator_has_associative_property(operator) {
                            return false;
                        }
                        if operator == SyntaxKind::PlusToken {
                            let left_kind = self.literal_kind_of_plus_operand(left_operand);
                            if left_kind.is_some() && left_kind == self.literal_kind_of_plus_operand(emitted) {
                                return false;
                            }
                        }
                    }
                }
                self.expression_associativity(emitted) == Associativity::Left
            }
        }
    }

    pub fn parenthesize_binary_operand(
        &mut self,
        operator: SyntaxKind,
        operand: NodeIndex,
        is_left: bool,
        left_operand: NodeIndex,
    ) -> NodeIndex {
        if self.is_kind(self.skip_partially_emitted(operand), SyntaxKind::ParenthesizedExpression) {
            return operand;
        }
        if self.binary_operand_needs_parens(operator, operand, is_left, left_operand) {
            self.wrap_in_parens(operand)
        } else {
            operand
        }
    }

    pub fn parenthesize_for_conditional_head(&mut self, condition: NodeIndex) -> NodeIndex {
        if self.expression_precedence(condition) <= Precedence::Conditional {
            self.wrap_in_parens(condition)
        } else {
            condition
        }
    }

    pub fn parenthesize_conditional_branch(&mut self, branch: NodeIndex) -> NodeIndex {
        if self.is_comma_sequence(branch) {
            self.wrap_in_parens(branch)
        } else {
            branch
        }
    }

    /// Left side of `.`, `[`, `(` and tagged templates.
    pub fn parenthesize_for_access(&mut self, expression: NodeIndex) -> NodeIndex {
        let emitted = self.skip_partially_emitted(expression);
        let is_new_without_arguments =
            matches!(self.get(emitted).map(|n| &n.data), Some(NodeData::NewExpression { arguments: None, .. }));
        if self.is_left_hand_side(emitted) && !is_new_without_arguments {
            expression
        } else {
            self.wrap_in_parens(expression)
        }
    }

    pub fn parenthesize_for_new(&mut self, expression: NodeIndex) -> NodeIndex {
        let leftmost = self.leftmost_expression(expression, true);
        match self.get(leftmost).map(|n| &n.data) {
            Some(NodeData::CallExpression { .. }) => return self.wrap_in_parens(expression),
            Some(NodeData::NewExpression { arguments: None, .. }) => return self.wrap_in_parens(expression),
            _ => {}
        }
        self.parenthesize_for_access(expression)
    }

    pub fn parenthesize_prefix_operand(&mut self, operand: NodeIndex) -> NodeIndex {
        if self.is_unary_expression(operand) {
            operand
        } else {
            self.wrap_in_parens(operand)
        }
    }

    pub fn parenthesize_postfix_operand(&mut self, operand: NodeIndex) -> NodeIndex {
        if self.is_left_hand_side(operand) {
            operand
        } else {
            self.wrap_in_parens(operand)
        }
    }

    /// Elements of comma-separated lists must bind tighter than `,`.
    pub fn parenthesize_expression_for_list(&mut self, expression: NodeIndex) -> NodeIndex {
        if expression.is_none() || self.expression_precedence(expression) > Precedence::Comma {
            expression
        } else {
            self.wrap_in_parens(expression)
        }
    }

    pub fn parenthesize_list_elements(&mut self, list: NodeList) -> NodeList {
        let mut changed = false;
        let mut nodes = Vec::with_capacity(list.len());
        for element in list.iter() {
            let parenthesized = match self.kind(element) {
                Some(SyntaxKind::SpreadElement | SyntaxKind::OmittedExpression) => element,
                _ => self.parenthesize_expression_for_list(element),
            };
            changed |= parenthesized != element;
            nodes.push(parenthesized);
        }
        if changed { list.with_nodes(nodes) } else { list }
    }

    /// Statements must not start with `{` or `function`; IIFE callees get parentheses.
    pub fn parenthesize_expression_for_statement(&mut self, expression: NodeIndex) -> NodeIndex {
        let emitted = self.skip_partially_emitted(expression);
        if let Some(NodeData::CallExpression { expression: callee, type_arguments, arguments }) =
            self.get(emitted).map(|n| n.data.clone())
        {
            if matches!(
                self.kind(self.skip_partially_emitted(callee)),
                Some(SyntaxKind::FunctionExpression | SyntaxKind::ArrowFunction)
            ) {
                let callee = self.wrap_in_parens(callee);
                let call = self.alloc_synthesized(
                    NodeData::CallExpression { expression: callee, type_arguments, arguments },
                    crate::flags::NodeFlags::NONE,
                    crate::flags::ModifierFlags::NONE,
                );
                self.set_text_range_from(call, emitted);
                self.set_original(call, emitted);
                return call;
            }
        }
        match self.kind(self.leftmost_expression(emitted, false)) {
            Some(SyntaxKind::ObjectLiteralExpression | SyntaxKind::FunctionExpression) => {
                self.wrap_in_parens(expression)
            }
            _ => expression,
        }
    }

    /// Concise arrow bodies that start with `{` or contain `,`.
    pub fn parenthesize_concise_body(&mut self, body: NodeIndex) -> NodeIndex {
        if self.is_kind(body, SyntaxKind::Block) {
            return body;
        }
        if self.is_comma_sequence(body)
            || self.is_kind(self.leftmost_expression(body, false), SyntaxKind::ObjectLiteralExpression)
        {
            self.wrap_in_parens(body)
        } else {
            body
        }
    }

    /// Apply the operand rules for the given payload.
    pub(crate) fn parenthesize_children(&mut self, data: NodeData) -> NodeData {
        match data {
            NodeData::PropertyAccessExpression { expression, name } => NodeData::PropertyAccessExpression {
                expression: self.parenthesize_for_access(expression),
                name,
            },
            NodeData::ElementAccessExpression { expression, argument } => NodeData::ElementAccessExpression {
                expression: self.parenthesize_for_access(expression),
                argument,
            },
            NodeData::CallExpression { expression, type_arguments, arguments } => NodeData::CallExpression {
                expression: self.parenthesize_for_access(expression),
                type_arguments,
                arguments: self.parenthesize_list_elements(arguments),
            },
            NodeData::NewExpression { expression, type_arguments, arguments } => NodeData::NewExpression {
                expression: self.parenthesize_for_new(expression),
                type_arguments,
                arguments: arguments.map(|a| self.parenthesize_list_elements(a)),
            },
            NodeData::TaggedTemplateExpression { tag, type_arguments, template } => {
                NodeData::TaggedTemplateExpression {
                    tag: self.parenthesize_for_access(tag),
                    type_arguments,
                    template,
                }
            }
            NodeData::Decorator { expression } => NodeData::Decorator {
                expression: self.parenthesize_for_access(expression),
            },
            NodeData::ExpressionWithTypeArguments { expression, type_arguments } => {
                NodeData::ExpressionWithTypeArguments {
                    expression: self.parenthesize_for_access(expression),
                    type_arguments,
                }
            }
            NodeData::BinaryExpression { left, operator, right } => {
                let new_left = self.parenthesize_binary_operand(operator, left, true, NodeIndex::NONE);
                let new_right = self.parenthesize_binary_operand(operator, right, false, new_left);
                NodeData::BinaryExpression { left: new_left, operator, right: new_right }
            }
            NodeData::ConditionalExpression { condition, when_true, when_false } => NodeData::ConditionalExpression {
                condition: self.parenthesize_for_conditional_head(condition),
                when_true: self.parenthesize_conditional_branch(when_true),
                when_false: self.parenthesize_conditional_branch(when_false),
            },
            NodeData::PrefixUnaryExpression { operator, operand } => NodeData::PrefixUnaryExpression {
                operator,
                operand: self.parenthesize_prefix_operand(operand),
            },
            NodeData::PostfixUnaryExpression { operand, operator } => NodeData::PostfixUnaryExpression {
                operand: self.parenthesize_postfix_operand(operand),
                operator,
            },
            NodeData::TypeOfExpression { expression } => NodeData::TypeOfExpression {
                expression: self.parenthesize_prefix_operand(expression),
            },
            NodeData::VoidExpression { expression } => NodeData::VoidExpression {
                expression: self.parenthesize_prefix_operand(expression),
            },
            NodeData::DeleteExpression { expression } => NodeData::DeleteExpression {
                expression: self.parenthesize_prefix_operand(expression),
            },
            NodeData::SpreadElement { expression } => NodeData::SpreadElement {
                expression: self.parenthesize_expression_for_list(expression),
            },
            NodeData::ArrayLiteralExpression { elements, multi_line } => NodeData::ArrayLiteralExpression {
                elements: self.parenthesize_list_elements(elements),
                multi_line,
            },
            NodeData::PropertyAssignment { name, initializer } => NodeData::PropertyAssignment {
                name,
                initializer: self.parenthesize_expression_for_list(initializer),
            },
            NodeData::ShorthandPropertyAssignment { name, object_assignment_initializer } => {
                NodeData::ShorthandPropertyAssignment {
                    name,
                    object_assignment_initializer: self.parenthesize_expression_for_list(object_assignment_initializer),
                }
            }
            NodeData::VariableDeclaration { name, exclamation, type_node, initializer } => {
                NodeData::VariableDeclaration {
                    name,
                    exclamation,
                    type_node,
                    initializer: self.parenthesize_expression_for_list(initializer),
                }
            }
            NodeData::ExpressionStatement { expression } => NodeData::ExpressionStatement {
                expression: self.parenthesize_expression_for_statement(expression),
            },
            NodeData::ArrowFunction(mut f) => {
                f.body = self.parenthesize_concise_body(f.body);
                NodeData::ArrowFunction(f)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_precedence_order() {
        assert!(binary_operator_precedence(SyntaxKind::AsteriskToken) > binary_operator_precedence(SyntaxKind::PlusToken));
        assert!(binary_operator_precedence(SyntaxKind::BarBarToken) < binary_operator_precedence(SyntaxKind::AmpersandAmpersandToken));
        assert_eq!(binary_operator_precedence(SyntaxKind::PlusEqualsToken), Precedence::Assignment);
    }

    #[test]
    fn test_lower_precedence_right_operand_gets_parens() {
        let mut arena = NodeArena::new();
        let a = arena.create_identifier("a");
        let b = arena.create_identifier("b");
        let c = arena.create_identifier("c");
        let sum = arena.create_binary(b, SyntaxKind::PlusToken, c);
        let product = arena.create_binary(a, SyntaxKind::AsteriskToken, sum);
        let Some(NodeData::BinaryExpression { right, .. }) = arena.get(product).map(|n| n.data.clone()) else {
            panic!("expected binary");
        };
        assert!(arena.is_kind(right, SyntaxKind::ParenthesizedExpression));
    }

    #[test]
    fn test_left_associative_left_operand_is_bare() {
        let mut arena = NodeArena::new();
        let a = arena.create_identifier("a");
        let b = arena.create_identifier("b");
        let c = arena.create_identifier("c");
        let diff = arena.create_binary(a, SyntaxKind::MinusToken, b);
        let outer = arena.create_binary(diff, SyntaxKind::MinusToken, c);
        let Some(NodeData::BinaryExpression { left, .. }) = arena.get(outer).map(|n| n.data.clone()) else {
            panic!("expected binary");
        };
        assert_eq!(left, diff);
    }

    #[test]
    fn test_iife_callee_is_parenthesized_in_statement() {
        let mut arena = NodeArena::new();
        let body = arena.create_block(vec![], false);
        let func = arena.create_function_expression(NodeIndex::NONE, vec![], body);
        let call = arena.create_call(func, vec![]);
        let stmt = arena.create_expression_statement(call);
        let Some(NodeData::ExpressionStatement { expression }) = arena.get(stmt).map(|n| n.data.clone()) else {
            panic!("expected statement");
        };
        let Some(NodeData::CallExpression { expression: callee, .. }) = arena.get(expression).map(|n| n.data.clone())
        else {
            panic!("expected call");
        };
        assert!(arena.is_kind(callee, SyntaxKind::ParenthesizedExpression));
    }
}
