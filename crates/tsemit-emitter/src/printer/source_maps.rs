//! Source map positions.
//!
//! A mapping is recorded at the start and end of every node that has a real
//! source map range, plus at both ends of tokens and comments. Identifiers
//! that come straight from the parser also record their name.

use super::Printer;
use crate::hooks::EmitHint;
use std::path::{Component, Path, PathBuf};
use tsemit_ast::{EmitFlags, NodeData, NodeIndex, SyntaxKind};
use tsemit_common::source_map::SourceMapGenerator;
use tsemit_common::{EmitResult, NO_POS};

#[derive(Debug)]
pub(super) struct SourceMapState {
    pub(super) generator: SourceMapGenerator,
    /// Directory `sources` entries are made relative to.
    map_dir: PathBuf,
    source_index: u32,
    disabled: bool,
}

impl<'a> Printer<'a> {
    /// Start recording a source map for the output `file`, whose map is
    /// written into `map_dir`.
    pub fn enable_source_map(&mut self, file: impl Into<String>, map_dir: impl Into<PathBuf>) {
        let mut generator = SourceMapGenerator::new(file.into());
        if let Some(root) = &self.options.source_root {
            generator.set_source_root(root.clone());
        }
        self.source_map = Some(SourceMapState {
            generator,
            map_dir: map_dir.into(),
            source_index: 0,
            disabled: false,
        });
    }

    pub(super) fn add_source_map_source(&mut self, file_name: &str) {
        let inline_sources = self.options.inline_sources;
        let has_source_root = self.options.source_root.is_some();
        let content = inline_sources.then(|| self.source_text.to_string());
        let Some(state) = &mut self.source_map else {
            return;
        };
        // With a sourceRoot the consumer resolves sources against it.
        let path = if has_source_root {
            Path::new(file_name)
                .file_name()
                .map_or_else(|| file_name.to_string(), |name| name.to_string_lossy().into_owned())
        } else {
            relative_path(&state.map_dir, Path::new(file_name))
        };
        state.source_index = match content {
            Some(content) => state.generator.add_source_with_content(path, content),
            None => state.generator.add_source(path),
        };
    }

    pub(super) fn print_with_source_map(&mut self, hint: EmitHint, node: NodeIndex) -> EmitResult<()> {
        let active = self.source_map.as_ref().is_some_and(|state| !state.disabled);
        if !active || hint == EmitHint::SourceFile {
            return self.emit_node(hint, node);
        }

        let range = self.arena.source_map_range(node);
        let flags = self.arena.emit_flags(node);
        let is_emitted = self.arena.kind(node) != Some(SyntaxKind::NotEmittedStatement);

        if is_emitted && range.pos != NO_POS && !flags.contains(EmitFlags::NO_LEADING_SOURCE_MAP) {
            let pos = self.token_start(range.pos);
            match self.source_name_of(node) {
                Some(name) => self.emit_named_pos(pos, name),
                None => self.emit_pos(pos),
            }
        }

        let result = if flags.contains(EmitFlags::NO_NESTED_SOURCE_MAPS) {
            self.set_source_map_disabled(true);
            let result = self.emit_node(hint, node);
            self.set_source_map_disabled(false);
            result
        } else {
            self.emit_node(hint, node)
        };

        if is_emitted && range.end != NO_POS && !flags.contains(EmitFlags::NO_TRAILING_SOURCE_MAP) {
            self.emit_pos(range.end);
        }
        result
    }

    fn set_source_map_disabled(&mut self, disabled: bool) {
        if let Some(state) = &mut self.source_map {
            state.disabled = disabled;
        }
    }

    /// Name recorded for identifiers written as they appear in the source.
    fn source_name_of(&self, node: NodeIndex) -> Option<String> {
        let parsed = self.arena.get(node)?;
        if !parsed.is_parse_tree_node() {
            return None;
        }
        match &parsed.data {
            NodeData::Identifier(ident) if ident.auto_generate.is_none() => Some(ident.text.clone()),
            _ => None,
        }
    }

    /// Map the current output position to source position `pos`.
    pub(super) fn emit_pos(&mut self, pos: u32) {
        self.add_mapping(pos, None);
    }

    fn emit_named_pos(&mut self, pos: u32, name: String) {
        self.add_mapping(pos, Some(name));
    }

    fn add_mapping(&mut self, pos: u32, name: Option<String>) {
        if pos == NO_POS {
            return;
        }
        let original = self.line_map.line_and_column_of(&self.source_text, pos);
        let (line, column) = (self.writer.line(), self.writer.column());
        let Some(state) = &mut self.source_map else {
            return;
        };
        if state.disabled {
            return;
        }
        let name_index = name.map(|name| state.generator.add_name(name));
        state
            .generator
            .add_mapping(line, column, state.source_index, original.line, original.column, name_index);
    }
}

/// `target` relative to directory `from`, with `/` separators.
pub(crate) fn relative_path(from: &Path, target: &Path) -> String {
    let from: Vec<Component<'_>> = from.components().filter(|c| *c != Component::CurDir).collect();
    let to: Vec<Component<'_>> = target.components().filter(|c| *c != Component::CurDir).collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();
    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::relative_path;
    use std::path::Path;

    #[test]
    fn relative_path_walks_up_to_common_prefix() {
        assert_eq!(relative_path(Path::new("out/lib"), Path::new("src/a.ts")), "../../src/a.ts");
        assert_eq!(relative_path(Path::new("src"), Path::new("src/a.ts")), "a.ts");
        assert_eq!(relative_path(Path::new(""), Path::new("./a.ts")), "a.ts");
    }
}
