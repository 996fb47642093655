//! Code generation for the tsemit TypeScript emitter.
//!
//! This crate provides:
//! - The transform context and the ordered emit hook chain
//! - The TypeScript-removal and ES2015-downlevel lowering passes
//! - The printer (comments, source maps, generated names, helpers)
//! - Declaration (`.d.ts`) output
//! - The emit driver that writes outputs through an `EmitHost`

pub mod helpers;
pub mod hierarchy_facts;
pub mod hooks;
pub mod resolver;
pub mod transform_context;

pub mod transforms;

pub mod printer;
pub use printer::{ListFormat, PrintOutput, Printer, print_file};

pub mod declarations;
pub use declarations::{DeclarationOutput, DeclarationTransformer};

pub mod emit;
pub use emit::{DiskHost, EmitHost, EmitOutput, InMemoryHost, OutputPaths, emit_files, get_output_paths};

pub use hooks::{EmitHint, EmitHook, EmitHooks, HookContext};
pub use resolver::{
    ConstantValue, DeclarationDiagnosticsProvider, EmitResolver, NoVisibilityDiagnostics, NodeCheckFlags,
    PrecomputedResolver, TypeReferenceSerializationKind, VisibilityDiagnostic,
};
pub use transform_context::{TransformContext, TransformOutput};
