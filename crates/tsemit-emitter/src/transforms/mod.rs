//! Lowering passes.
//!
//! A file goes through the TypeScript pass and then, for ES5 and ES3
//! targets, the ES2015 pass. Each pass returns a new root in the same arena
//! and may register hooks and request helpers on the shared
//! `TransformContext`.

pub mod es2015;
pub mod ts;
pub mod utilities;
pub mod visitor;

pub use es2015::Es2015Transformer;
pub use ts::TypeScriptTransformer;

use crate::transform_context::TransformContext;
use tracing::debug;
use tsemit_ast::{NodeArena, NodeIndex};
use tsemit_common::EmitResult;

/// Run every pass the options call for over one source file.
pub fn transform_source_file(
    arena: &mut NodeArena,
    context: &mut TransformContext<'_>,
    source_file: NodeIndex,
) -> EmitResult<NodeIndex> {
    let file_name = arena.source_file(source_file)?.file_name.clone();
    debug!(file = %file_name, target = context.options.target.as_str(), "transforming source file");

    let root = TypeScriptTransformer::new(arena, context).transform_source_file(source_file)?;
    context.assert_balanced("typescript pass")?;

    if !context.options.target.needs_es2015_lowering() {
        return Ok(root);
    }
    let root = Es2015Transformer::new(arena, context).transform_source_file(root)?;
    context.assert_balanced("es2015 pass")?;
    Ok(root)
}
