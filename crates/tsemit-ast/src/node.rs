//! Node storage types.
//!
//! Nodes live in a `NodeArena` and refer to each other by `NodeIndex`.
//! `NodeData` is a closed sum over every syntax kind; consumers match on it
//! exhaustively so that adding a kind is a compile error everywhere it
//! matters.

use crate::flags::{EmitFlags, ModifierFlags, NodeFlags, TransformFlags};
use crate::syntax_kind::SyntaxKind;
use bitflags::bitflags;
use std::sync::Arc;
use tsemit_common::{EmitResult, NO_POS};

/// Index of a node in its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        self.0 != u32::MAX
    }

}

impl Default for NodeIndex {
    fn default() -> Self {
        NodeIndex::NONE
    }
}

/// An ordered child list with the source range it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeList {
    pub nodes: Vec<NodeIndex>,
    pub pos: u32,
    pub end: u32,
    pub has_trailing_comma: bool,
}

impl Default for NodeList {
    fn default() -> Self {
        NodeList::new(Vec::new())
    }
}

impl NodeList {
    /// A synthesized list with no source range.
    pub fn new(nodes: Vec<NodeIndex>) -> Self {
        NodeList {
            nodes,
            pos: NO_POS,
            end: NO_POS,
            has_trailing_comma: false,
        }
    }

    pub fn with_range(nodes: Vec<NodeIndex>, pos: u32, end: u32) -> Self {
        NodeList {
            nodes,
            pos,
            end,
            has_trailing_comma: false,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }

    pub fn first(&self) -> Option<NodeIndex> {
        self.nodes.first().copied()
    }

    pub fn last(&self) -> Option<NodeIndex> {
        self.nodes.last().copied()
    }

    pub fn is_synthesized(&self) -> bool {
        self.pos == NO_POS
    }

    /// Same range and trailing comma, different elements.
    pub fn with_nodes(&self, nodes: Vec<NodeIndex>) -> NodeList {
        NodeList {
            nodes,
            pos: self.pos,
            end: self.end,
            has_trailing_comma: self.has_trailing_comma && !self.nodes.is_empty(),
        }
    }
}

impl From<Vec<NodeIndex>> for NodeList {
    fn from(nodes: Vec<NodeIndex>) -> Self {
        NodeList::new(nodes)
    }
}

// =============================================================================
// Generated identifiers
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeneratedIdentifierKind {
    /// `_a`, `_b`, ... temporaries.
    Auto,
    /// `_i` loop counters.
    Loop,
    /// A file-unique name derived from fixed base text (`_loop_1`, `_this`).
    Unique,
    /// A name derived from another node (`N_1` for a namespace parameter).
    Node,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct GeneratedIdentifierFlags: u8 {
        const NONE = 0;
        /// Nested scopes must not reuse this name.
        const RESERVED_IN_NESTED_SCOPES = 1 << 0;
        /// Try the base text itself before appending a counter.
        const OPTIMISTIC = 1 << 1;
        /// Uniqueness is only checked against file-level names.
        const FILE_LEVEL = 1 << 2;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AutoGenerate {
    pub kind: GeneratedIdentifierKind,
    pub id: u32,
    pub flags: GeneratedIdentifierFlags,
    /// Source node for `GeneratedIdentifierKind::Node`.
    pub node: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentifierData {
    /// Source text, or the base text of a `Unique` generated name.
    pub text: String,
    pub auto_generate: Option<AutoGenerate>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateText {
    pub cooked: String,
    pub raw: String,
}

// =============================================================================
// Shared payloads
// =============================================================================

/// Payload shared by every function-like kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FunctionData {
    pub decorators: NodeList,
    pub asterisk: bool,
    pub question: bool,
    pub name: NodeIndex,
    pub type_parameters: Option<NodeList>,
    pub parameters: NodeList,
    pub return_type: NodeIndex,
    /// Block, or an expression for concise arrow bodies; NONE for overloads.
    pub body: NodeIndex,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassData {
    pub decorators: NodeList,
    pub name: NodeIndex,
    pub type_parameters: Option<NodeList>,
    pub heritage_clauses: NodeList,
    pub members: NodeList,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFileData {
    pub file_name: String,
    pub text: Arc<str>,
    pub statements: NodeList,
    pub is_declaration_file: bool,
}

/// A node in the arena.
#[derive(Clone, Debug)]
pub struct Node {
    pub pos: u32,
    pub end: u32,
    pub flags: NodeFlags,
    pub modifiers: ModifierFlags,
    pub transform_flags: TransformFlags,
    pub emit_flags: EmitFlags,
    /// The node this one replaces. Lookup only, never ownership.
    pub original: NodeIndex,
    pub data: NodeData,
}

impl Node {
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind()
    }

    /// True when the node has no source range of its own.
    pub fn is_synthesized(&self) -> bool {
        self.pos == NO_POS
    }

    /// True for nodes produced by the parser rather than by a transform.
    pub fn is_parse_tree_node(&self) -> bool {
        !self.flags.contains(NodeFlags::SYNTHESIZED)
    }

    pub fn has_modifier(&self, flag: ModifierFlags) -> bool {
        self.modifiers.intersects(flag)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    // =========================================================================
    // Names and literals
    // =========================================================================
    Identifier(IdentifierData),
    NumericLiteral { text: String },
    StringLiteral { text: String, single_quote: bool },
    RegularExpressionLiteral { text: String },
    NoSubstitutionTemplateLiteral(TemplateText),
    TemplateHead(TemplateText),
    TemplateMiddle(TemplateText),
    TemplateTail(TemplateText),
    ThisKeyword,
    SuperKeyword,
    NullKeyword,
    TrueKeyword,
    FalseKeyword,
    QualifiedName { left: NodeIndex, right: NodeIndex },
    ComputedPropertyName { expression: NodeIndex },

    // =========================================================================
    // Signature elements and class members
    // =========================================================================
    TypeParameter { name: NodeIndex, constraint: NodeIndex, default: NodeIndex },
    Parameter {
        decorators: NodeList,
        dot_dot_dot: bool,
        name: NodeIndex,
        question: bool,
        type_node: NodeIndex,
        initializer: NodeIndex,
    },
    Decorator { expression: NodeIndex },
    PropertySignature { name: NodeIndex, question: bool, type_node: NodeIndex },
    PropertyDeclaration {
        decorators: NodeList,
        name: NodeIndex,
        question: bool,
        type_node: NodeIndex,
        initializer: NodeIndex,
    },
    MethodSignature {
        name: NodeIndex,
        question: bool,
        type_parameters: Option<NodeList>,
        parameters: NodeList,
        type_node: NodeIndex,
    },
    MethodDeclaration(FunctionData),
    Constructor(FunctionData),
    GetAccessor(FunctionData),
    SetAccessor(FunctionData),
    IndexSignature { parameters: NodeList, type_node: NodeIndex },
    SemicolonClassElement,

    // =========================================================================
    // Types
    // =========================================================================
    KeywordType { keyword: SyntaxKind },
    TypeReference { type_name: NodeIndex, type_arguments: Option<NodeList> },
    FunctionType {
        type_parameters: Option<NodeList>,
        parameters: NodeList,
        type_node: NodeIndex,
    },
    ConstructorType {
        type_parameters: Option<NodeList>,
        parameters: NodeList,
        type_node: NodeIndex,
    },
    TypeQuery { expr_name: NodeIndex },
    TypeLiteral { members: NodeList },
    ArrayType { element_type: NodeIndex },
    TupleType { element_types: NodeList },
    UnionType { types: NodeList },
    IntersectionType { types: NodeList },
    ParenthesizedType { type_node: NodeIndex },
    ThisType,
    TypeOperator { operator: SyntaxKind, type_node: NodeIndex },
    LiteralType { literal: NodeIndex },

    // =========================================================================
    // Binding patterns
    // =========================================================================
    ObjectBindingPattern { elements: NodeList },
    ArrayBindingPattern { elements: NodeList },
    BindingElement {
        dot_dot_dot: bool,
        property_name: NodeIndex,
        name: NodeIndex,
        initializer: NodeIndex,
    },

    // =========================================================================
    // Expressions
    // =========================================================================
    ArrayLiteralExpression { elements: NodeList, multi_line: bool },
    ObjectLiteralExpression { properties: NodeList, multi_line: bool },
    PropertyAccessExpression { expression: NodeIndex, name: NodeIndex },
    ElementAccessExpression { expression: NodeIndex, argument: NodeIndex },
    CallExpression {
        expression: NodeIndex,
        type_arguments: Option<NodeList>,
        arguments: NodeList,
    },
    NewExpression {
        expression: NodeIndex,
        type_arguments: Option<NodeList>,
        arguments: Option<NodeList>,
    },
    TaggedTemplateExpression {
        tag: NodeIndex,
        type_arguments: Option<NodeList>,
        template: NodeIndex,
    },
    TypeAssertionExpression { type_node: NodeIndex, expression: NodeIndex },
    ParenthesizedExpression { expression: NodeIndex },
    FunctionExpression(FunctionData),
    ArrowFunction(FunctionData),
    DeleteExpression { expression: NodeIndex },
    TypeOfExpression { expression: NodeIndex },
    VoidExpression { expression: NodeIndex },
    PrefixUnaryExpression { operator: SyntaxKind, operand: NodeIndex },
    PostfixUnaryExpression { operand: NodeIndex, operator: SyntaxKind },
    BinaryExpression { left: NodeIndex, operator: SyntaxKind, right: NodeIndex },
    ConditionalExpression {
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    },
    TemplateExpression { head: NodeIndex, template_spans: NodeList },
    SpreadElement { expression: NodeIndex },
    ClassExpression(ClassData),
    OmittedExpression,
    ExpressionWithTypeArguments { expression: NodeIndex, type_arguments: Option<NodeList> },
    AsExpression { expression: NodeIndex, type_node: NodeIndex },
    NonNullExpression { expression: NodeIndex },
    MetaProperty { keyword: SyntaxKind, name: NodeIndex },
    TemplateSpan { expression: NodeIndex, literal: NodeIndex },

    // =========================================================================
    // Statements
    // =========================================================================
    Block { statements: NodeList, multi_line: bool },
    EmptyStatement,
    VariableStatement { declaration_list: NodeIndex },
    ExpressionStatement { expression: NodeIndex },
    IfStatement {
        expression: NodeIndex,
        then_statement: NodeIndex,
        else_statement: NodeIndex,
    },
    DoStatement { statement: NodeIndex, expression: NodeIndex },
    WhileStatement { expression: NodeIndex, statement: NodeIndex },
    ForStatement {
        initializer: NodeIndex,
        condition: NodeIndex,
        incrementor: NodeIndex,
        statement: NodeIndex,
    },
    ForInStatement { initializer: NodeIndex, expression: NodeIndex, statement: NodeIndex },
    ForOfStatement { initializer: NodeIndex, expression: NodeIndex, statement: NodeIndex },
    ContinueStatement { label: NodeIndex },
    BreakStatement { label: NodeIndex },
    ReturnStatement { expression: NodeIndex },
    SwitchStatement { expression: NodeIndex, case_block: NodeIndex },
    LabeledStatement { label: NodeIndex, statement: NodeIndex },
    ThrowStatement { expression: NodeIndex },
    TryStatement {
        try_block: NodeIndex,
        catch_clause: NodeIndex,
        finally_block: NodeIndex,
    },
    DebuggerStatement,
    VariableDeclaration {
        name: NodeIndex,
        exclamation: bool,
        type_node: NodeIndex,
        initializer: NodeIndex,
    },
    VariableDeclarationList { declarations: NodeList },

    // =========================================================================
    // Declarations
    // =========================================================================
    FunctionDeclaration(FunctionData),
    ClassDeclaration(ClassData),
    InterfaceDeclaration {
        name: NodeIndex,
        type_parameters: Option<NodeList>,
        heritage_clauses: NodeList,
        members: NodeList,
    },
    TypeAliasDeclaration {
        name: NodeIndex,
        type_parameters: Option<NodeList>,
        type_node: NodeIndex,
    },
    EnumDeclaration { name: NodeIndex, members: NodeList },
    ModuleDeclaration { name: NodeIndex, body: NodeIndex },
    ModuleBlock { statements: NodeList },
    CaseBlock { clauses: NodeList },
    ImportEqualsDeclaration { name: NodeIndex, module_reference: NodeIndex },
    ImportDeclaration { import_clause: NodeIndex, module_specifier: NodeIndex },
    ImportClause { name: NodeIndex, named_bindings: NodeIndex },
    NamespaceImport { name: NodeIndex },
    NamedImports { elements: NodeList },
    ImportSpecifier { property_name: NodeIndex, name: NodeIndex },
    ExportAssignment { is_export_equals: bool, expression: NodeIndex },
    ExportDeclaration { export_clause: NodeIndex, module_specifier: NodeIndex },
    NamedExports { elements: NodeList },
    ExportSpecifier { property_name: NodeIndex, name: NodeIndex },
    ExternalModuleReference { expression: NodeIndex },

    // =========================================================================
    // Clauses and object literal members
    // =========================================================================
    CaseClause { expression: NodeIndex, statements: NodeList },
    DefaultClause { statements: NodeList },
    HeritageClause { token: SyntaxKind, types: NodeList },
    CatchClause { variable_declaration: NodeIndex, block: NodeIndex },
    PropertyAssignment { name: NodeIndex, initializer: NodeIndex },
    ShorthandPropertyAssignment { name: NodeIndex, object_assignment_initializer: NodeIndex },
    SpreadAssignment { expression: NodeIndex },
    EnumMember { name: NodeIndex, initializer: NodeIndex },

    // =========================================================================
    // Top level and synthesized-only nodes
    // =========================================================================
    SourceFile(SourceFileData),
    /// Placeholder that prints nothing but keeps comments/markers of `original`.
    NotEmittedStatement,
    /// Expression whose outer syntax (type assertion, parens) was removed.
    PartiallyEmittedExpression { expression: NodeIndex },
    /// Comma-joined expressions printed without nesting.
    CommaListExpression { elements: NodeList },
}

/// Rewrites the children of one node.
///
/// `node` covers single child slots (NONE must map to NONE), `statement`
/// covers embedded statements such as loop bodies (where several results
/// are lifted into a block by the implementor), `list` covers child arrays.
pub trait ChildMapper {
    fn node(&mut self, child: NodeIndex) -> EmitResult<NodeIndex>;
    fn statement(&mut self, child: NodeIndex) -> EmitResult<NodeIndex>;
    fn list(&mut self, list: NodeList) -> EmitResult<NodeList>;

    fn opt_list(&mut self, list: Option<NodeList>) -> EmitResult<Option<NodeList>> {
        list.map(|list| self.list(list)).transpose()
    }
}

fn map_function<M: ChildMapper + ?Sized>(m: &mut M, f: FunctionData) -> EmitResult<FunctionData> {
    Ok(FunctionData {
        decorators: m.list(f.decorators)?,
        asterisk: f.asterisk,
        question: f.question,
        name: m.node(f.name)?,
        type_parameters: m.opt_list(f.type_parameters)?,
        parameters: m.list(f.parameters)?,
        return_type: m.node(f.return_type)?,
        body: m.node(f.body)?,
    })
}

fn map_class<M: ChildMapper + ?Sized>(m: &mut M, c: ClassData) -> EmitResult<ClassData> {
    Ok(ClassData {
        decorators: m.list(c.decorators)?,
        name: m.node(c.name)?,
        type_parameters: m.opt_list(c.type_parameters)?,
        heritage_clauses: m.list(c.heritage_clauses)?,
        members: m.list(c.members)?,
    })
}

fn each_function(f: &FunctionData, visit: &mut dyn FnMut(NodeIndex)) {
    f.decorators.iter().for_each(&mut *visit);
    visit(f.name);
    if let Some(list) = &f.type_parameters {
        list.iter().for_each(&mut *visit);
    }
    f.parameters.iter().for_each(&mut *visit);
    visit(f.return_type);
    visit(f.body);
}

fn each_class(c: &ClassData, visit: &mut dyn FnMut(NodeIndex)) {
    c.decorators.iter().for_each(&mut *visit);
    visit(c.name);
    if let Some(list) = &c.type_parameters {
        list.iter().for_each(&mut *visit);
    }
    c.heritage_clauses.iter().for_each(&mut *visit);
    c.members.iter().for_each(&mut *visit);
}

fn each_opt(list: &Option<NodeList>, visit: &mut dyn FnMut(NodeIndex)) {
    if let Some(list) = list {
        list.iter().for_each(visit);
    }
}

impl NodeData {
    pub fn kind(&self) -> SyntaxKind {
        use NodeData as D;
        use SyntaxKind as K;
        match self {
            D::Identifier(_) => K::Identifier,
            D::NumericLiteral { .. } => K::NumericLiteral,
            D::StringLiteral { .. } => K::StringLiteral,
            D::RegularExpressionLiteral { .. } => K::RegularExpressionLiteral,
            D::NoSubstitutionTemplateLiteral(_) => K::NoSubstitutionTemplateLiteral,
            D::TemplateHead(_) => K::TemplateHead,
            D::TemplateMiddle(_) => K::TemplateMiddle,
            D::TemplateTail(_) => K::TemplateTail,
            D::ThisKeyword => K::ThisKeyword,
            D::SuperKeyword => K::SuperKeyword,
            D::NullKeyword => K::NullKeyword,
            D::TrueKeyword => K::TrueKeyword,
            D::FalseKeyword => K::FalseKeyword,
            D::QualifiedName { .. } => K::QualifiedName,
            D::ComputedPropertyName { .. } => K::ComputedPropertyName,
            D::TypeParameter { .. } => K::TypeParameter,
            D::Parameter { .. } => K::Parameter,
            D::Decorator { .. } => K::Decorator,
            D::PropertySignature { .. } => K::PropertySignature,
            D::PropertyDeclaration { .. } => K::PropertyDeclaration,
            D::MethodSignature { .. } => K::MethodSignature,
            D::MethodDeclaration(_) => K::MethodDeclaration,
            D::Constructor(_) => K::Constructor,
            D::GetAccessor(_) => K::GetAccessor,
            D::SetAccessor(_) => K::SetAccessor,
            D::IndexSignature { .. } => K::IndexSignature,
            D::SemicolonClassElement => K::SemicolonClassElement,
            D::KeywordType { .. } => K::KeywordType,
            D::TypeReference { .. } => K::TypeReference,
            D::FunctionType { .. } => K::FunctionType,
            D::ConstructorType { .. } => K::ConstructorType,
            D::TypeQuery { .. } => K::TypeQuery,
            D::TypeLiteral { .. } => K::TypeLiteral,
            D::ArrayType { .. } => K::ArrayType,
            D::TupleType { .. } => K::TupleType,
            D::UnionType { .. } => K::UnionType,
            D::IntersectionType { .. } => K::IntersectionType,
            D::ParenthesizedType { .. } => K::ParenthesizedType,
            D::ThisType => K::ThisType,
            D::TypeOperator { .. } => K::TypeOperator,
            D::LiteralType { .. } => K::LiteralType,
            D::ObjectBindingPattern { .. } => K::ObjectBindingPattern,
            D::ArrayBindingPattern { .. } => K::ArrayBindingPattern,
            D::BindingElement { .. } => K::BindingElement,
            D::ArrayLiteralExpression { .. } => K::ArrayLiteralExpression,
            D::ObjectLiteralExpression { .. } => K::ObjectLiteralExpression,
            D::PropertyAccessExpression { .. } => K::PropertyAccessExpression,
            D::ElementAccessExpression { .. } => K::ElementAccessExpression,
            D::CallExpression { .. } => K::CallExpression,
            D::NewExpression { .. } => K::NewExpression,
            D::TaggedTemplateExpression { .. } => K::TaggedTemplateExpression,
            D::TypeAssertionExpression { .. } => K::TypeAssertionExpression,
            D::ParenthesizedExpression { .. } => K::ParenthesizedExpression,
            D::FunctionExpression(_) => K::FunctionExpression,
            D::ArrowFunction(_) => K::ArrowFunction,
            D::DeleteExpression { .. } => K::DeleteExpression,
            D::TypeOfExpression { .. } => K::TypeOfExpression,
            D::VoidExpression { .. } => K::VoidExpression,
            D::PrefixUnaryExpression { .. } => K::PrefixUnaryExpression,
            D::PostfixUnaryExpression { .. } => K::PostfixUnaryExpression,
            D::BinaryExpression { .. } => K::BinaryExpression,
            D::ConditionalExpression { .. } => K::ConditionalExpression,
            D::TemplateExpression { .. } => K::TemplateExpression,
            D::SpreadElement { .. } => K::SpreadElement,
            D::ClassExpression(_) => K::ClassExpression,
            D::OmittedExpression => K::OmittedExpression,
            D::ExpressionWithTypeArguments { .. } => K::ExpressionWithTypeArguments,
            D::AsExpression { .. } => K::AsExpression,
            D::NonNullExpression { .. } => K::NonNullExpression,
            D::MetaProperty { .. } => K::MetaProperty,
            D::TemplateSpan { .. } => K::TemplateSpan,
            D::Block { .. } => K::Block,
            D::EmptyStatement => K::EmptyStatement,
            D::VariableStatement { .. } => K::VariableStatement,
            D::ExpressionStatement { .. } => K::ExpressionStatement,
            D::IfStatement { .. } => K::IfStatement,
            D::DoStatement { .. } => K::DoStatement,
            D::WhileStatement { .. } => K::WhileStatement,
            D::ForStatement { .. } => K::ForStatement,
            D::ForInStatement { .. } => K::ForInStatement,
            D::ForOfStatement { .. } => K::ForOfStatement,
            D::ContinueStatement { .. } => K::ContinueStatement,
            D::BreakStatement { .. } => K::BreakStatement,
            D::ReturnStatement { .. } => K::ReturnStatement,
            D::SwitchStatement { .. } => K::SwitchStatement,
            D::LabeledStatement { .. } => K::LabeledStatement,
            D::ThrowStatement { .. } => K::ThrowStatement,
            D::TryStatement { .. } => K::TryStatement,
            D::DebuggerStatement => K::DebuggerStatement,
            D::VariableDeclaration { .. } => K::VariableDeclaration,
            D::VariableDeclarationList { .. } => K::VariableDeclarationList,
            D::FunctionDeclaration(_) => K::FunctionDeclaration,
            D::ClassDeclaration(_) => K::ClassDeclaration,
            D::InterfaceDeclaration { .. } => K::InterfaceDeclaration,
            D::TypeAliasDeclaration { .. } => K::TypeAliasDeclaration,
            D::EnumDeclaration { .. } => K::EnumDeclaration,
            D::ModuleDeclaration { .. } => K::ModuleDeclaration,
            D::ModuleBlock { .. } => K::ModuleBlock,
            D::CaseBlock { .. } => K::CaseBlock,
            D::ImportEqualsDeclaration { .. } => K::ImportEqualsDeclaration,
            D::ImportDeclaration { .. } => K::ImportDeclaration,
            D::ImportClause { .. } => K::ImportClause,
            D::NamespaceImport { .. } => K::NamespaceImport,
            D::NamedImports { .. } => K::NamedImports,
            D::ImportSpecifier { .. } => K::ImportSpecifier,
            D::ExportAssignment { .. } => K::ExportAssignment,
            D::ExportDeclaration { .. } => K::ExportDeclaration,
            D::NamedExports { .. } => K::NamedExports,
            D::ExportSpecifier { .. } => K::ExportSpecifier,
            D::ExternalModuleReference { .. } => K::ExternalModuleReference,
            D::CaseClause { .. } => K::CaseClause,
            D::DefaultClause { .. } => K::DefaultClause,
            D::HeritageClause { .. } => K::HeritageClause,
            D::CatchClause { .. } => K::CatchClause,
            D::PropertyAssignment { .. } => K::PropertyAssignment,
            D::ShorthandPropertyAssignment { .. } => K::ShorthandPropertyAssignment,
            D::SpreadAssignment { .. } => K::SpreadAssignment,
            D::EnumMember { .. } => K::EnumMember,
            D::SourceFile(_) => K::SourceFile,
            D::NotEmittedStatement => K::NotEmittedStatement,
            D::PartiallyEmittedExpression { .. } => K::PartiallyEmittedExpression,
            D::CommaListExpression { .. } => K::CommaListExpression,
        }
    }

    /// Call `visit` for every child slot in source order. NONE slots are included.
    pub fn for_each_child(&self, visit: &mut dyn FnMut(NodeIndex)) {
        use NodeData as D;
        match self {
            D::Identifier(_)
            | D::NumericLiteral { .. }
            | D::StringLiteral { .. }
            | D::RegularExpressionLiteral { .. }
            | D::NoSubstitutionTemplateLiteral(_)
            | D::TemplateHead(_)
            | D::TemplateMiddle(_)
            | D::TemplateTail(_)
            | D::ThisKeyword
            | D::SuperKeyword
            | D::NullKeyword
            | D::TrueKeyword
            | D::FalseKeyword
            | D::SemicolonClassElement
            | D::KeywordType { .. }
            | D::ThisType
            | D::OmittedExpression
            | D::EmptyStatement
            | D::DebuggerStatement
            | D::NotEmittedStatement => {}
            D::QualifiedName { left, right } => {
                visit(*left);
                visit(*right);
            }
            D::ComputedPropertyName { expression }
            | D::Decorator { expression }
            | D::ParenthesizedExpression { expression }
            | D::DeleteExpression { expression }
            | D::TypeOfExpression { expression }
            | D::VoidExpression { expression }
            | D::SpreadElement { expression }
            | D::NonNullExpression { expression }
            | D::ExpressionStatement { expression }
            | D::ReturnStatement { expression }
            | D::ThrowStatement { expression }
            | D::ExternalModuleReference { expression }
            | D::SpreadAssignment { expression }
            | D::PartiallyEmittedExpression { expression }
            | D::ExportAssignment { expression, .. } => visit(*expression),
            D::TypeParameter { name, constraint, default } => {
                visit(*name);
                visit(*constraint);
                visit(*default);
            }
            D::Parameter { decorators, name, type_node, initializer, .. } => {
                decorators.iter().for_each(&mut *visit);
                visit(*name);
                visit(*type_node);
                visit(*initializer);
            }
            D::PropertySignature { name, type_node, .. } => {
                visit(*name);
                visit(*type_node);
            }
            D::PropertyDeclaration { decorators, name, type_node, initializer, .. } => {
                decorators.iter().for_each(&mut *visit);
                visit(*name);
                visit(*type_node);
                visit(*initializer);
            }
            D::MethodSignature { name, type_parameters, parameters, type_node, .. } => {
                visit(*name);
                each_opt(type_parameters, visit);
                parameters.iter().for_each(&mut *visit);
                visit(*type_node);
            }
            D::MethodDeclaration(f)
            | D::Constructor(f)
            | D::GetAccessor(f)
            | D::SetAccessor(f)
            | D::FunctionExpression(f)
            | D::ArrowFunction(f)
            | D::FunctionDeclaration(f) => each_function(f, visit),
            D::IndexSignature { parameters, type_node } => {
                parameters.iter().for_each(&mut *visit);
                visit(*type_node);
            }
            D::TypeReference { type_name, type_arguments } => {
                visit(*type_name);
                each_opt(type_arguments, visit);
            }
            D::FunctionType { type_parameters, parameters, type_node }
            | D::ConstructorType { type_parameters, parameters, type_node } => {
                each_opt(type_parameters, visit);
                parameters.iter().for_each(&mut *visit);
                visit(*type_node);
            }
            D::TypeQuery { expr_name } => visit(*expr_name),
            D::TypeLiteral { members } => members.iter().for_each(visit),
            D::ArrayType { element_type } => visit(*element_type),
            D::TupleType { element_types } => element_types.iter().for_each(visit),
            D::UnionType { types } | D::IntersectionType { types } => types.iter().for_each(visit),
            D::ParenthesizedType { type_node } | D::TypeOperator { type_node, .. } => visit(*type_node),
            D::LiteralType { literal } => visit(*literal),
            D::ObjectBindingPattern { elements }
            | D::ArrayBindingPattern { elements }
            | D::ArrayLiteralExpression { elements, .. }
            | D::CommaListExpression { elements }
            | D::NamedImports { elements }
            | D::NamedExports { elements } => elements.iter().for_each(visit),
            D::BindingElement { property_name, name, initializer, .. } => {
                visit(*property_name);
                visit(*name);
                visit(*initializer);
            }
            D::ObjectLiteralExpression { properties, .. } => properties.iter().for_each(visit),
            D::PropertyAccessExpression { expression, name } => {
                visit(*expression);
                visit(*name);
            }
            D::ElementAccessExpression { expression, argument } => {
                visit(*expression);
                visit(*argument);
            }
            D::CallExpression { expression, type_arguments, arguments } => {
                visit(*expression);
                each_opt(type_arguments, visit);
                arguments.iter().for_each(&mut *visit);
            }
            D::NewExpression { expression, type_arguments, arguments } => {
                visit(*expression);
                each_opt(type_arguments, visit);
                each_opt(arguments, visit);
            }
            D::TaggedTemplateExpression { tag, type_arguments, template } => {
                visit(*tag);
                each_opt(type_arguments, visit);
                visit(*template);
            }
            D::TypeAssertionExpression { type_node, expression } => {
                visit(*type_node);
                visit(*expression);
            }
            D::AsExpression { expression, type_node } => {
                visit(*expression);
                visit(*type_node);
            }
            D::PrefixUnaryExpression { operand, .. } | D::PostfixUnaryExpression { operand, .. } => {
                visit(*operand)
            }
            D::BinaryExpression { left, right, .. } => {
                visit(*left);
                visit(*right);
            }
            D::ConditionalExpression { condition, when_true, when_false } => {
                visit(*condition);
                visit(*when_true);
                visit(*when_false);
            }
            D::TemplateExpression { head, template_spans } => {
                visit(*head);
                template_spans.iter().for_each(visit);
            }
            D::ClassExpression(c) | D::ClassDeclaration(c) => each_class(c, visit),
            D::ExpressionWithTypeArguments { expression, type_arguments } => {
                visit(*expression);
                each_opt(type_arguments, visit);
            }
            D::MetaProperty { name, .. } => visit(*name),
            D::TemplateSpan { expression, literal } => {
                visit(*expression);
                visit(*literal);
            }
            D::Block { statements, .. }
            | D::ModuleBlock { statements }
            | D::DefaultClause { statements } => statements.iter().for_each(visit),
            D::VariableStatement { declaration_list } => visit(*declaration_list),
            D::IfStatement { expression, then_statement, else_statement } => {
                visit(*expression);
                visit(*then_statement);
                visit(*else_statement);
            }
            D::DoStatement { statement, expression } => {
                visit(*statement);
                visit(*expression);
            }
            D::WhileStatement { expression, statement } => {
                visit(*expression);
                visit(*statement);
            }
            D::ForStatement { initializer, condition, incrementor, statement } => {
                visit(*initializer);
                visit(*condition);
                visit(*incrementor);
                visit(*statement);
            }
            D::ForInStatement { initializer, expression, statement }
            | D::ForOfStatement { initializer, expression, statement } => {
                visit(*initializer);
                visit(*expression);
                visit(*statement);
            }
            D::ContinueStatement { label } | D::BreakStatement { label } => visit(*label),
            D::SwitchStatement { expression, case_block } => {
                visit(*expression);
                visit(*case_block);
            }
            D::LabeledStatement { label, statement } => {
                visit(*label);
                visit(*statement);
            }
            D::TryStatement { try_block, catch_clause, finally_block } => {
                visit(*try_block);
                visit(*catch_clause);
                visit(*finally_block);
            }
            D::VariableDeclaration { name, type_node, initializer, .. } => {
                visit(*name);
                visit(*type_node);
                visit(*initializer);
            }
            D::VariableDeclarationList { declarations } => declarations.iter().for_each(visit),
            D::InterfaceDeclaration { name, type_parameters, heritage_clauses, members } => {
                visit(*name);
                each_opt(type_parameters, visit);
                heritage_clauses.iter().for_each(&mut *visit);
                members.iter().for_each(&mut *visit);
            }
            D::TypeAliasDeclaration { name, type_parameters, type_node } => {
                visit(*name);
                each_opt(type_parameters, visit);
                visit(*type_node);
            }
            D::EnumDeclaration { name, members } => {
                visit(*name);
                members.iter().for_each(&mut *visit);
            }
            D::ModuleDeclaration { name, body } => {
                visit(*name);
                visit(*body);
            }
            D::CaseBlock { clauses } => clauses.iter().for_each(visit),
            D::ImportEqualsDeclaration { name, module_reference } => {
                visit(*name);
                visit(*module_reference);
            }
            D::ImportDeclaration { import_clause, module_specifier } => {
                visit(*import_clause);
                visit(*module_specifier);
            }
            D::ImportClause { name, named_bindings } => {
                visit(*name);
                visit(*named_bindings);
            }
            D::NamespaceImport { name } => visit(*name),
            D::ImportSpecifier { property_name, name } | D::ExportSpecifier { property_name, name } => {
                visit(*property_name);
                visit(*name);
            }
            D::ExportDeclaration { export_clause, module_specifier } => {
                visit(*export_clause);
                visit(*module_specifier);
            }
            D::CaseClause { expression, statements } => {
                visit(*expression);
                statements.iter().for_each(&mut *visit);
            }
            D::HeritageClause { types, .. } => types.iter().for_each(visit),
            D::CatchClause { variable_declaration, block } => {
                visit(*variable_declaration);
                visit(*block);
            }
            D::PropertyAssignment { name, initializer } => {
                visit(*name);
                visit(*initializer);
            }
            D::ShorthandPropertyAssignment { name, object_assignment_initializer } => {
                visit(*name);
                visit(*object_assignment_initializer);
            }
            D::EnumMember { name, initializer } => {
                visit(*name);
                visit(*initializer);
            }
            D::SourceFile(sf) => sf.statements.iter().for_each(visit),
        }
    }

    /// Present (non-NONE) children in source order.
    pub fn children(&self) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        self.for_each_child(&mut |child| {
            if child.is_some() {
                out.push(child);
            }
        });
        out
    }

    /// Rebuild this payload with every child passed through `m`.
    pub fn map_children<M: ChildMapper + ?Sized>(self, m: &mut M) -> EmitResult<NodeData> {
        use NodeData as D;
        Ok(match self {
            leaf @ (D::Identifier(_)
            | D::NumericLiteral { .. }
            | D::StringLiteral { .. }
            | D::RegularExpressionLiteral { .. }
            | D::NoSubstitutionTemplateLiteral(_)
            | D::TemplateHead(_)
            | D::TemplateMiddle(_)
            | D::TemplateTail(_)
            | D::ThisKeyword
            | D::SuperKeyword
            | D::NullKeyword
            | D::TrueKeyword
            | D::FalseKeyword
            | D::SemicolonClassElement
            | D::KeywordType { .. }
            | D::ThisType
            | D::OmittedExpression
            | D::EmptyStatement
            | D::DebuggerStatement
            | D::NotEmittedStatement) => leaf,
            D::QualifiedName { left, right } => D::QualifiedName { left: m.node(left)?, right: m.node(right)? },
            D::ComputedPropertyName { expression } => D::ComputedPropertyName { expression: m.node(expression)? },
            D::TypeParameter { name, constraint, default } => D::TypeParameter {
                name: m.node(name)?,
                constraint: m.node(constraint)?,
                default: m.node(default)?,
            },
            D::Parameter { decorators, dot_dot_dot, name, question, type_node, initializer } => D::Parameter {
                decorators: m.list(decorators)?,
                dot_dot_dot,
                name: m.node(name)?,
                question,
                type_node: m.node(type_node)?,
                initializer: m.node(initializer)?,
            },
            D::Decorator { expression } => D::Decorator { expression: m.node(expression)? },
            D::PropertySignature { name, question, type_node } => D::PropertySignature {
                name: m.node(name)?,
                question,
                type_node: m.node(type_node)?,
            },
            D::PropertyDeclaration { decorators, name, question, type_node, initializer } => D::PropertyDeclaration {
                decorators: m.list(decorators)?,
                name: m.node(name)?,
                question,
                type_node: m.node(type_node)?,
                initializer: m.node(initializer)?,
            },
            D::MethodSignature { name, question, type_parameters, parameters, type_node } => D::MethodSignature {
                name: m.node(name)?,
                question,
                type_parameters: m.opt_list(type_parameters)?,
                parameters: m.list(parameters)?,
                type_node: m.node(type_node)?,
            },
            D::MethodDeclaration(f) => D::MethodDeclaration(map_function(m, f)?),
            D::Constructor(f) => D::Constructor(map_function(m, f)?),
            D::GetAccessor(f) => D::GetAccessor(map_function(m, f)?),
            D::SetAccessor(f) => D::SetAccessor(map_function(m, f)?),
            D::IndexSignature { parameters, type_node } => D::IndexSignature {
                parameters: m.list(parameters)?,
                type_node: m.node(type_node)?,
            },
            D::TypeReference { type_name, type_arguments } => D::TypeReference {
                type_name: m.node(type_name)?,
                type_arguments: m.opt_list(type_arguments)?,
            },
            D::FunctionType { type_parameters, parameters, type_node } => D::FunctionType {
                type_parameters: m.opt_list(type_parameters)?,
                parameters: m.list(parameters)?,
                type_node: m.node(type_node)?,
            },
            D::ConstructorType { type_parameters, parameters, type_node } => D::ConstructorType {
                type_parameters: m.opt_list(type_parameters)?,
                parameters: m.list(parameters)?,
                type_node: m.node(type_node)?,
            },
            D::TypeQuery { expr_name } => D::TypeQuery { expr_name: m.node(expr_name)? },
            D::TypeLiteral { members } => D::TypeLiteral { members: m.list(members)? },
            D::ArrayType { element_type } => D::ArrayType { element_type: m.node(element_type)? },
            D::TupleType { element_types } => D::TupleType { element_types: m.list(element_types)? },
            D::UnionType { types } => D::UnionType { types: m.list(types)? },
            D::IntersectionType { types } => D::IntersectionType { types: m.list(types)? },
            D::ParenthesizedType { type_node } => D::ParenthesizedType { type_node: m.node(type_node)? },
            D::TypeOperator { operator, type_node } => D::TypeOperator { operator, type_node: m.node(type_node)? },
            D::LiteralType { literal } => D::LiteralType { literal: m.node(literal)? },
            D::ObjectBindingPattern { elements } => D::ObjectBindingPattern { elements: m.list(elements)? },
            D::ArrayBindingPattern { elements } => D::ArrayBindingPattern { elements: m.list(elements)? },
            D::BindingElement { dot_dot_dot, property_name, name, initializer } => D::BindingElement {
                dot_dot_dot,
                property_name: m.node(property_name)?,
                name: m.node(name)?,
                initializer: m.node(initializer)?,
            },
            D::ArrayLiteralExpression { elements, multi_line } => D::ArrayLiteralExpression {
                elements: m.list(elements)?,
                multi_line,
            },
            D::ObjectLiteralExpression { properties, multi_line } => D::ObjectLiteralExpression {
                properties: m.list(properties)?,
                multi_line,
            },
            D::PropertyAccessExpression { expression, name } => D::PropertyAccessExpression {
                expression: m.node(expression)?,
                name: m.node(name)?,
            },
            D::ElementAccessExpression { expression, argument } => D::ElementAccessExpression {
                expression: m.node(expression)?,
                argument: m.node(argument)?,
            },
            D::CallExpression { expression, type_arguments, arguments } => D::CallExpression {
                expression: m.node(expression)?,
                type_arguments: m.opt_list(type_arguments)?,
                arguments: m.list(arguments)?,
            },
            D::NewExpression { expression, type_arguments, arguments } => D::NewExpression {
                expression: m.node(expression)?,
                type_arguments: m.opt_list(type_arguments)?,
                arguments: m.opt_list(arguments)?,
            },
            D::TaggedTemplateExpression { tag, type_arguments, template } => D::TaggedTemplateExpression {
                tag: m.node(tag)?,
                type_arguments: m.opt_list(type_arguments)?,
                template: m.node(template)?,
            },
            D::TypeAssertionExpression { type_node, expression } => D::TypeAssertionExpression {
                type_node: m.node(type_node)?,
                expression: m.node(expression)?,
            },
            D::ParenthesizedExpression { expression } => D::ParenthesizedExpression { expression: m.node(expression)? },
            D::FunctionExpression(f) => D::FunctionExpression(map_function(m, f)?),
            D::ArrowFunction(f) => D::ArrowFunction(map_function(m, f)?),
            D::DeleteExpression { expression } => D::DeleteExpression { expression: m.node(expression)? },
            D::TypeOfExpression { expression } => D::TypeOfExpression { expression: m.node(expression)? },
            D::VoidExpression { expression } => D::VoidExpression { expression: m.node(expression)? },
            D::PrefixUnaryExpression { operator, operand } => D::PrefixUnaryExpression {
                operator,
                operand: m.node(operand)?,
            },
            D::PostfixUnaryExpression { operand, operator } => D::PostfixUnaryExpression {
                operand: m.node(operand)?,
                operator,
            },
            D::BinaryExpression { left, operator, right } => D::BinaryExpression {
                left: m.node(left)?,
                operator,
                right: m.node(right)?,
            },
            D::ConditionalExpression { condition, when_true, when_false } => D::ConditionalExpression {
                condition: m.node(condition)?,
                when_true: m.node(when_true)?,
                when_false: m.node(when_false)?,
            },
            D::TemplateExpression { head, template_spans } => D::TemplateExpression {
                head: m.node(head)?,
                template_spans: m.list(template_spans)?,
            },
            D::SpreadElement { expression } => D::SpreadElement { expression: m.node(expression)? },
            D::ClassExpression(c) => D::ClassExpression(map_class(m, c)?),
            D::ExpressionWithTypeArguments { expression, type_arguments } => D::ExpressionWithTypeArguments {
                expression: m.node(expression)?,
                type_arguments: m.opt_list(type_arguments)?,
            },
            D::AsExpression { expression, type_node } => D::AsExpression {
                expression: m.node(expression)?,
                type_node: m.node(type_node)?,
            },
            D::NonNullExpression { expression } => D::NonNullExpression { expression: m.node(expression)? },
            D::MetaProperty { keyword, name } => D::MetaProperty { keyword, name: m.node(name)? },
            D::TemplateSpan { expression, literal } => D::TemplateSpan {
                expression: m.node(expression)?,
                literal: m.node(literal)?,
            },
            D::Block { statements, multi_line } => D::Block { statements: m.list(statements)?, multi_line },
            D::VariableStatement { declaration_list } => D::VariableStatement {
                declaration_list: m.node(declaration_list)?,
            },
            D::ExpressionStatement { expression } => D::ExpressionStatement { expression: m.node(expression)? },
            D::IfStatement { expression, then_statement, else_statement } => D::IfStatement {
                expression: m.node(expression)?,
                then_statement: m.statement(then_statement)?,
                else_statement: m.statement(else_statement)?,
            },
            D::DoStatement { statement, expression } => D::DoStatement {
                statement: m.statement(statement)?,
                expression: m.node(expression)?,
            },
            D::WhileStatement { expression, statement } => D::WhileStatement {
                expression: m.node(expression)?,
                statement: m.statement(statement)?,
            },
            D::ForStatement { initializer, condition, incrementor, statement } => D::ForStatement {
                initializer: m.node(initializer)?,
                condition: m.node(condition)?,
                incrementor: m.node(incrementor)?,
                statement: m.statement(statement)?,
            },
            D::ForInStatement { initializer, expression, statement } => D::ForInStatement {
                initializer: m.node(initializer)?,
                expression: m.node(expression)?,
                statement: m.statement(statement)?,
            },
            D::ForOfStatement { initializer, expression, statement } => D::ForOfStatement {
                initializer: m.node(initializer)?,
                expression: m.node(expression)?,
                statement: m.statement(statement)?,
            },
            D::ContinueStatement { label } => D::ContinueStatement { label: m.node(label)? },
            D::BreakStatement { label } => D::BreakStatement { label: m.node(label)? },
            D::ReturnStatement { expression } => D::ReturnStatement { expression: m.node(expression)? },
            D::SwitchStatement { expression, case_block } => D::SwitchStatement {
                expression: m.node(expression)?,
                case_block: m.node(case_block)?,
            },
            D::LabeledStatement { label, statement } => D::LabeledStatement {
                label: m.node(label)?,
                statement: m.statement(statement)?,
            },
            D::ThrowStatement { expression } => D::ThrowStatement { expression: m.node(expression)? },
            D::TryStatement { try_block, catch_clause, finally_block } => D::TryStatement {
                try_block: m.node(try_block)?,
                catch_clause: m.node(catch_clause)?,
                finally_block: m.node(finally_block)?,
            },
            D::VariableDeclaration { name, exclamation, type_node, initializer } => D::VariableDeclaration {
                name: m.node(name)?,
                exclamation,
                type_node: m.node(type_node)?,
                initializer: m.node(initializer)?,
            },
            D::VariableDeclarationList { declarations } => D::VariableDeclarationList {
                declarations: m.list(declarations)?,
            },
            D::FunctionDeclaration(f) => D::FunctionDeclaration(map_function(m, f)?),
            D::ClassDeclaration(c) => D::ClassDeclaration(map_class(m, c)?),
            D::InterfaceDeclaration { name, type_parameters, heritage_clauses, members } => D::InterfaceDeclaration {
                name: m.node(name)?,
                type_parameters: m.opt_list(type_parameters)?,
                heritage_clauses: m.list(heritage_clauses)?,
                members: m.list(members)?,
            },
            D::TypeAliasDeclaration { name, type_parameters, type_node } => D::TypeAliasDeclaration {
                name: m.node(name)?,
                type_parameters: m.opt_list(type_parameters)?,
                type_node: m.node(type_node)?,
            },
            D::EnumDeclaration { name, members } => D::EnumDeclaration {
                name: m.node(name)?,
                members: m.list(members)?,
            },
            D::ModuleDeclaration { name, body } => D::ModuleDeclaration { name: m.node(name)?, body: m.node(body)? },
            D::ModuleBlock { statements } => D::ModuleBlock { statements: m.list(statements)? },
            D::CaseBlock { clauses } => D::CaseBlock { clauses: m.list(clauses)? },
            D::ImportEqualsDeclaration { name, module_reference } => D::ImportEqualsDeclaration {
                name: m.node(name)?,
                module_reference: m.node(module_reference)?,
            },
            D::ImportDeclaration { import_clause, module_specifier } => D::ImportDeclaration {
                import_clause: m.node(import_clause)?,
                module_specifier: m.node(module_specifier)?,
            },
            D::ImportClause { name, named_bindings } => D::ImportClause {
                name: m.node(name)?,
                named_bindings: m.node(named_bindings)?,
            },
            D::NamespaceImport { name } => D::NamespaceImport { name: m.node(name)? },
            D::NamedImports { elements } => D::NamedImports { elements: m.list(elements)? },
            D::ImportSpecifier { property_name, name } => D::ImportSpecifier {
                property_name: m.node(property_name)?,
                name: m.node(name)?,
            },
            D::ExportAssignment { is_export_equals, expression } => D::ExportAssignment {
                is_export_equals,
                expression: m.node(expression)?,
            },
            D::ExportDeclaration { export_clause, module_specifier } => D::ExportDeclaration {
                export_clause: m.node(export_clause)?,
                module_specifier: m.node(module_specifier)?,
            },
            D::NamedExports { elements } => D::NamedExports { elements: m.list(elements)? },
            D::ExportSpecifier { property_name, name } => D::ExportSpecifier {
                property_name: m.node(property_name)?,
                name: m.node(name)?,
            },
            D::ExternalModuleReference { expression } => D::ExternalModuleReference {
                expression: m.node(expression)?,
            },
            D::CaseClause { expression, statements } => D::CaseClause {
                expression: m.node(expression)?,
                statements: m.list(statements)?,
            },
            D::DefaultClause { statements } => D::DefaultClause { statements: m.list(statements)? },
            D::HeritageClause { token, types } => D::HeritageClause { token, types: m.list(types)? },
            D::CatchClause { variable_declaration, block } => D::CatchClause {
                variable_declaration: m.node(variable_declaration)?,
                block: m.node(block)?,
            },
            D::PropertyAssignment { name, initializer } => D::PropertyAssignment {
                name: m.node(name)?,
                initializer: m.node(initializer)?,
            },
            D::ShorthandPropertyAssignment { name, object_assignment_initializer } => D::ShorthandPropertyAssignment {
                name: m.node(name)?,
                object_assignment_initializer: m.node(object_assignment_initializer)?,
            },
            D::SpreadAssignment { expression } => D::SpreadAssignment { expression: m.node(expression)? },
            D::EnumMember { name, initializer } => D::EnumMember {
                name: m.node(name)?,
                initializer: m.node(initializer)?,
            },
            D::SourceFile(sf) => D::SourceFile(SourceFileData {
                statements: m.list(sf.statements)?,
                ..sf
            }),
            D::PartiallyEmittedExpression { expression } => D::PartiallyEmittedExpression {
                expression: m.node(expression)?,
            },
            D::CommaListExpression { elements } => D::CommaListExpression { elements: m.list(elements)? },
        })
    }

    /// Function payload for function-like kinds.
    pub fn as_function(&self) -> Option<&FunctionData> {
        match self {
            NodeData::MethodDeclaration(f)
            | NodeData::Constructor(f)
            | NodeData::GetAccessor(f)
            | NodeData::SetAccessor(f)
            | NodeData::FunctionExpression(f)
            | NodeData::ArrowFunction(f)
            | NodeData::FunctionDeclaration(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassData> {
        match self {
            NodeData::ClassDeclaration(c) | NodeData::ClassExpression(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&IdentifierData> {
        match self {
            NodeData::Identifier(id) => Some(id),
            _ => None,
        }
    }
}
