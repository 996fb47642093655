//! Arena syntax tree for the tsemit emitter.
//!
//! This crate provides:
//! - `SyntaxKind` and the closed `NodeData` sum type over every node kind
//! - `NodeArena`, the index-addressed node store with an emit-data side table
//! - The node factory (`create_*`, `update_node`) with operand parenthesization
//! - Transform flag computation and child mapping used by the passes

pub mod syntax_kind;
pub use syntax_kind::SyntaxKind;

pub mod flags;
pub use flags::{EmitFlags, ModifierFlags, NodeFlags, TransformFlags};

pub mod node;
pub use node::{
    AutoGenerate, ChildMapper, ClassData, FunctionData, GeneratedIdentifierFlags, GeneratedIdentifierKind,
    IdentifierData, Node, NodeData, NodeIndex, NodeList, SourceFileData, TemplateText,
};

pub mod emit_node;
pub use emit_node::{EmitNode, SynthesizedComment, TextRange};

pub mod arena;
pub use arena::NodeArena;

pub mod factory;
pub use factory::format_js_number;

pub mod parenthesizer;
pub use parenthesizer::Precedence;

pub mod transform_flags;

pub mod utilities;
