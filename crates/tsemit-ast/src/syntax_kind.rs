//! Payload-free kind tags for nodes, operator tokens and keywords.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntaxKind {
    // =========================================================================
    // Operator tokens
    // =========================================================================
    PlusToken,
    MinusToken,
    AsteriskToken,
    AsteriskAsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    GreaterThanGreaterThanGreaterThanToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsEqualsToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    ExclamationToken,
    TildeToken,
    AmpersandAmpersandToken,
    BarBarToken,
    QuestionQuestionToken,
    EqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    AsteriskAsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    LessThanLessThanEqualsToken,
    GreaterThanGreaterThanEqualsToken,
    GreaterThanGreaterThanGreaterThanEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,
    CommaToken,
    InKeyword,
    InstanceOfKeyword,

    // =========================================================================
    // Keywords used as tokens inside other nodes
    // =========================================================================
    ExtendsKeyword,
    ImplementsKeyword,
    NewKeyword,
    KeyOfKeyword,
    UniqueKeyword,
    ReadonlyKeyword,
    AnyKeyword,
    UnknownKeyword,
    NumberKeyword,
    BigIntKeyword,
    StringKeyword,
    BooleanKeyword,
    SymbolKeyword,
    VoidKeyword,
    UndefinedKeyword,
    NeverKeyword,
    ObjectKeyword,

    // =========================================================================
    // Names and literals
    // =========================================================================
    Identifier,
    NumericLiteral,
    StringLiteral,
    RegularExpressionLiteral,
    NoSubstitutionTemplateLiteral,
    TemplateHead,
    TemplateMiddle,
    TemplateTail,
    ThisKeyword,
    SuperKeyword,
    NullKeyword,
    TrueKeyword,
    FalseKeyword,
    QualifiedName,
    ComputedPropertyName,

    // =========================================================================
    // Signature elements and class members
    // =========================================================================
    TypeParameter,
    Parameter,
    Decorator,
    PropertySignature,
    PropertyDeclaration,
    MethodSignature,
    MethodDeclaration,
    Constructor,
    GetAccessor,
    SetAccessor,
    IndexSignature,
    SemicolonClassElement,

    // =========================================================================
    // Types
    // =========================================================================
    KeywordType,
    TypeReference,
    FunctionType,
    ConstructorType,
    TypeQuery,
    TypeLiteral,
    ArrayType,
    TupleType,
    UnionType,
    IntersectionType,
    ParenthesizedType,
    ThisType,
    TypeOperator,
    LiteralType,

    // =========================================================================
    // Binding patterns
    // =========================================================================
    ObjectBindingPattern,
    ArrayBindingPattern,
    BindingElement,

    // =========================================================================
    // Expressions
    // =========================================================================
    ArrayLiteralExpression,
    ObjectLiteralExpression,
    PropertyAccessExpression,
    ElementAccessExpression,
    CallExpression,
    NewExpression,
    TaggedTemplateExpression,
    TypeAssertionExpression,
    ParenthesizedExpression,
    FunctionExpression,
    ArrowFunction,
    DeleteExpression,
    TypeOfExpression,
    VoidExpression,
    PrefixUnaryExpression,
    PostfixUnaryExpression,
    BinaryExpression,
    ConditionalExpression,
    TemplateExpression,
    SpreadElement,
    ClassExpression,
    OmittedExpression,
    ExpressionWithTypeArguments,
    AsExpression,
    NonNullExpression,
    MetaProperty,
    TemplateSpan,

    // =========================================================================
    // Statements
    // =========================================================================
    Block,
    EmptyStatement,
    VariableStatement,
    ExpressionStatement,
    IfStatement,
    DoStatement,
    WhileStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    ContinueStatement,
    BreakStatement,
    ReturnStatement,
    SwitchStatement,
    LabeledStatement,
    ThrowStatement,
    TryStatement,
    DebuggerStatement,
    VariableDeclaration,
    VariableDeclarationList,

    // =========================================================================
    // Declarations
    // =========================================================================
    FunctionDeclaration,
    ClassDeclaration,
    InterfaceDeclaration,
    TypeAliasDeclaration,
    EnumDeclaration,
    ModuleDeclaration,
    ModuleBlock,
    CaseBlock,
    ImportEqualsDeclaration,
    ImportDeclaration,
    ImportClause,
    NamespaceImport,
    NamedImports,
    ImportSpecifier,
    ExportAssignment,
    ExportDeclaration,
    NamedExports,
    ExportSpecifier,
    ExternalModuleReference,

    // =========================================================================
    // Clauses and object literal members
    // =========================================================================
    CaseClause,
    DefaultClause,
    HeritageClause,
    CatchClause,
    PropertyAssignment,
    ShorthandPropertyAssignment,
    SpreadAssignment,
    EnumMember,

    // =========================================================================
    // Top level and synthesized-only nodes
    // =========================================================================
    SourceFile,
    NotEmittedStatement,
    PartiallyEmittedExpression,
    CommaListExpression,
}

impl SyntaxKind {
    /// Source text of an operator or keyword token.
    pub const fn token_text(self) -> Option<&'static str> {
        use SyntaxKind::*;
        Some(match self {
            PlusToken => "+",
            MinusToken => "-",
            AsteriskToken => "*",
            AsteriskAsteriskToken => "**",
            SlashToken => "/",
            PercentToken => "%",
            PlusPlusToken => "++",
            MinusMinusToken => "--",
            LessThanLessThanToken => "<<",
            GreaterThanGreaterThanToken => ">>",
            GreaterThanGreaterThanGreaterThanToken => ">>>",
            LessThanToken => "<",
            GreaterThanToken => ">",
            LessThanEqualsToken => "<=",
            GreaterThanEqualsToken => ">=",
            EqualsEqualsToken => "==",
            ExclamationEqualsToken => "!=",
            EqualsEqualsEqualsToken => "===",
            ExclamationEqualsEqualsToken => "!==",
            AmpersandToken => "&",
            BarToken => "|",
            CaretToken => "^",
            ExclamationToken => "!",
            TildeToken => "~",
            AmpersandAmpersandToken => "&&",
            BarBarToken => "||",
            QuestionQuestionToken => "??",
            EqualsToken => "=",
            PlusEqualsToken => "+=",
            MinusEqualsToken => "-=",
            AsteriskEqualsToken => "*=",
            AsteriskAsteriskEqualsToken => "**=",
            SlashEqualsToken => "/=",
            PercentEqualsToken => "%=",
            LessThanLessThanEqualsToken => "<<=",
            GreaterThanGreaterThanEqualsToken => ">>=",
            GreaterThanGreaterThanGreaterThanEqualsToken => ">>>=",
            AmpersandEqualsToken => "&=",
            BarEqualsToken => "|=",
            CaretEqualsToken => "^=",
            CommaToken => ",",
            InKeyword => "in",
            InstanceOfKeyword => "instanceof",
            ExtendsKeyword => "extends",
            ImplementsKeyword => "implements",
            NewKeyword => "new",
            KeyOfKeyword => "keyof",
            UniqueKeyword => "unique",
            ReadonlyKeyword => "readonly",
            AnyKeyword => "any",
            UnknownKeyword => "unknown",
            NumberKeyword => "number",
            BigIntKeyword => "bigint",
            StringKeyword => "string",
            BooleanKeyword => "boolean",
            SymbolKeyword => "symbol",
            VoidKeyword => "void",
            UndefinedKeyword => "undefined",
            NeverKeyword => "never",
            ObjectKeyword => "object",
            ThisKeyword => "this",
            SuperKeyword => "super",
            NullKeyword => "null",
            TrueKeyword => "true",
            FalseKeyword => "false",
            _ => return None,
        })
    }

    pub const fn is_assignment_operator(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            EqualsToken
                | PlusEqualsToken
                | MinusEqualsToken
                | AsteriskEqualsToken
                | AsteriskAsteriskEqualsToken
                | SlashEqualsToken
                | PercentEqualsToken
                | LessThanLessThanEqualsToken
                | GreaterThanGreaterThanEqualsToken
                | GreaterThanGreaterThanGreaterThanEqualsToken
                | AmpersandEqualsToken
                | BarEqualsToken
                | CaretEqualsToken
        )
    }

    pub const fn is_type_node(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            KeywordType
                | TypeReference
                | FunctionType
                | ConstructorType
                | TypeQuery
                | TypeLiteral
                | ArrayType
                | TupleType
                | UnionType
                | IntersectionType
                | ParenthesizedType
                | ThisType
                | TypeOperator
                | LiteralType
                | ExpressionWithTypeArguments
        )
    }

    pub const fn is_function_like(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            FunctionDeclaration
                | FunctionExpression
                | ArrowFunction
                | MethodDeclaration
                | Constructor
                | GetAccessor
                | SetAccessor
        )
    }

    pub const fn is_iteration_statement(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            ForStatement | ForInStatement | ForOfStatement | WhileStatement | DoStatement
        )
    }

    /// Expressions that can appear on the left of `.`/`(` without parentheses.
    pub const fn is_left_hand_side_expression(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            Identifier
                | NumericLiteral
                | StringLiteral
                | RegularExpressionLiteral
                | NoSubstitutionTemplateLiteral
                | TemplateExpression
                | ThisKeyword
                | SuperKeyword
                | NullKeyword
                | TrueKeyword
                | FalseKeyword
                | ArrayLiteralExpression
                | ObjectLiteralExpression
                | PropertyAccessExpression
                | ElementAccessExpression
                | CallExpression
                | NewExpression
                | TaggedTemplateExpression
                | ParenthesizedExpression
                | FunctionExpression
                | ClassExpression
                | MetaProperty
                | NonNullExpression
                | OmittedExpression
        )
    }
}
