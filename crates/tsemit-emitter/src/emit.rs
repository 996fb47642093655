//! Emit driver.
//!
//! Runs the lowering passes over each source file, prints the result and
//! hands the output text to an `EmitHost`:
//!
//! - `<name>.js` plus `<name>.js.map` (or an inline map) when source maps are on
//! - `<name>.d.ts` plus `<name>.d.ts.map` for declaration output
//! - with `outFile`, every file goes into one bundle sharing a single buffer
//!
//! A file whose emit fails is reported in `EmitOutput::errors`; the other
//! files are still emitted.

use crate::declarations::DeclarationTransformer;
use crate::printer::{PrintOutput, Printer, relative_path};
use crate::resolver::{DeclarationDiagnosticsProvider, EmitResolver, VisibilityDiagnostic};
use crate::transform_context::{TransformContext, TransformOutput};
use crate::transforms::transform_source_file;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tsemit_ast::{NodeArena, NodeIndex};
use tsemit_common::diagnostics::format_message;
use tsemit_common::source_map::SourceMapGenerator;
use tsemit_common::{CompilerOptions, Diagnostic, EmitError, EmitResult, NO_POS, skip_trivia};

/// Where output text goes.
pub trait EmitHost {
    fn write_file(&mut self, path: &str, text: &str, source_files: &[NodeIndex]) -> std::io::Result<()>;
}

/// Keeps every output in memory, in write order.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    pub files: IndexMap<String, String>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

impl EmitHost for InMemoryHost {
    fn write_file(&mut self, path: &str, text: &str, _source_files: &[NodeIndex]) -> std::io::Result<()> {
        self.files.insert(path.to_string(), text.to_string());
        Ok(())
    }
}

/// Writes outputs below `root`, creating directories as needed.
#[derive(Debug)]
pub struct DiskHost {
    root: PathBuf,
}

impl DiskHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskHost { root: root.into() }
    }
}

impl EmitHost for DiskHost {
    fn write_file(&mut self, path: &str, text: &str, _source_files: &[NodeIndex]) -> std::io::Result<()> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(target, text)
    }
}

#[derive(Debug, Default)]
pub struct EmitOutput {
    /// Paths handed to the host, in write order.
    pub emitted_files: Vec<String>,
    /// Declaration visibility diagnostics. They never stop emission.
    pub diagnostics: Vec<Diagnostic>,
    /// Outputs that were abandoned, keyed by the source (or bundle) name.
    pub errors: Vec<(String, EmitError)>,
}

impl EmitOutput {
    pub fn emit_skipped(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Output file names for one source file (or for the `outFile` bundle).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub js: String,
    pub source_map: Option<String>,
    pub declaration: Option<String>,
    pub declaration_map: Option<String>,
}

impl OutputPaths {
    fn from_base(base: &str, options: &CompilerOptions) -> Self {
        let js = format!("{base}.js");
        let source_map = (options.source_map && !options.inline_source_map).then(|| format!("{js}.map"));
        let declaration = options.declaration.then(|| format!("{base}.d.ts"));
        let declaration_map = declaration
            .as_ref()
            .filter(|_| options.declaration_map)
            .map(|path| format!("{path}.map"));
        OutputPaths {
            js,
            source_map,
            declaration,
            declaration_map,
        }
    }
}

/// Output paths of `file_name`. With `outDir`, the file keeps its position
/// relative to `common_source_dir`.
pub fn get_output_paths(file_name: &str, options: &CompilerOptions, common_source_dir: &Path) -> OutputPaths {
    let base = remove_file_extension(file_name);
    let base = match &options.out_dir {
        Some(out_dir) => {
            let relative = relative_path(common_source_dir, Path::new(base));
            join_path(out_dir, &relative)
        }
        None => base.to_string(),
    };
    OutputPaths::from_base(&base, options)
}

/// Output paths of the `outFile` bundle.
pub fn get_bundle_output_paths(out_file: &str, options: &CompilerOptions) -> OutputPaths {
    OutputPaths::from_base(remove_file_extension(out_file), options)
}

fn remove_file_extension(file_name: &str) -> &str {
    [".d.ts", ".tsx", ".ts", ".jsx", ".js"]
        .iter()
        .find_map(|ext| file_name.strip_suffix(ext))
        .unwrap_or(file_name)
}

fn join_path(dir: &str, relative: &str) -> String {
    if dir.is_empty() {
        relative.to_string()
    } else {
        format!("{}/{relative}", dir.trim_end_matches('/'))
    }
}

fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn directory_of(path: &str) -> PathBuf {
    Path::new(path).parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Longest directory prefix shared by every file.
pub fn common_source_directory<'n>(file_names: impl IntoIterator<Item = &'n str>) -> PathBuf {
    let mut common: Option<PathBuf> = None;
    for name in file_names {
        let dir = directory_of(name);
        common = Some(match common {
            None => dir,
            Some(current) => current
                .components()
                .zip(dir.components())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect(),
        });
    }
    common.unwrap_or_default()
}

/// Transform, print and write every source file of a program.
pub fn emit_files(
    arena: &mut NodeArena,
    resolver: &dyn EmitResolver,
    diagnostics_provider: &dyn DeclarationDiagnosticsProvider,
    options: &CompilerOptions,
    source_files: &[NodeIndex],
    host: &mut dyn EmitHost,
) -> EmitOutput {
    let mut emitter = Emitter {
        arena,
        resolver,
        diagnostics_provider,
        options,
        host,
        output: EmitOutput::default(),
    };
    emitter.emit(source_files);
    emitter.output
}

struct Emitter<'e> {
    arena: &'e mut NodeArena,
    resolver: &'e dyn EmitResolver,
    diagnostics_provider: &'e dyn DeclarationDiagnosticsProvider,
    options: &'e CompilerOptions,
    host: &'e mut dyn EmitHost,
    output: EmitOutput,
}

impl<'e> Emitter<'e> {
    fn emit(&mut self, source_files: &[NodeIndex]) {
        let files: Vec<(NodeIndex, String)> = source_files
            .iter()
            .filter_map(|&file| {
                let sf = self.arena.source_file(file).ok()?;
                (!sf.is_declaration_file).then(|| (file, sf.file_name.clone()))
            })
            .collect();
        debug!(files = files.len(), out_file = ?self.options.out_file, "emitting program");

        if let Some(out_file) = self.options.out_file.clone() {
            let paths = get_bundle_output_paths(&out_file, self.options);
            let roots: Vec<NodeIndex> = files.iter().map(|(file, _)| *file).collect();
            if let Err(err) = self.emit_outputs(&roots, &paths) {
                warn!(bundle = %out_file, error = %err, "bundle emit failed");
                self.output.errors.push((out_file, err));
            }
            return;
        }

        let common_dir = common_source_directory(files.iter().map(|(_, name)| name.as_str()));
        for (file, file_name) in files {
            let paths = get_output_paths(&file_name, self.options, &common_dir);
            if let Err(err) = self.emit_outputs(&[file], &paths) {
                warn!(file = %file_name, error = %err, "emit failed");
                self.output.errors.push((file_name, err));
            }
        }
    }

    /// Declaration output first: it reads the parse tree, which the
    /// lowering passes may decorate with emit flags.
    fn emit_outputs(&mut self, files: &[NodeIndex], paths: &OutputPaths) -> EmitResult<()> {
        self.emit_declarations(files, paths)?;
        self.emit_js(files, paths)
    }

    fn emit_js(&mut self, files: &[NodeIndex], paths: &OutputPaths) -> EmitResult<()> {
        let mut transformed = Vec::with_capacity(files.len());
        for &file in files {
            let mut context = TransformContext::new(self.resolver, self.options);
            let root = transform_source_file(self.arena, &mut context, file)?;
            transformed.push((root, context.finish()?));
        }

        let PrintOutput { text, source_map } = {
            let mut printer = Printer::new(self.arena, self.resolver, self.options);
            if self.options.wants_source_map() {
                let map_dir = directory_of(paths.source_map.as_deref().unwrap_or(&paths.js));
                printer.enable_source_map(file_name_of(&paths.js), map_dir);
            }
            match transformed.len() {
                1 if self.options.out_file.is_none() => {
                    let (root, output) = transformed.remove(0);
                    printer.write_file(root, output)?;
                }
                _ => printer.write_bundle(transformed)?,
            }
            printer.finish()
        };
        let inline = self.options.inline_source_map;
        self.write_output(&paths.js, paths.source_map.as_deref(), text, source_map, inline, files)
    }

    fn emit_declarations(&mut self, files: &[NodeIndex], paths: &OutputPaths) -> EmitResult<()> {
        let Some(declaration_path) = paths.declaration.as_deref() else {
            return Ok(());
        };
        let mut roots = Vec::with_capacity(files.len());
        for &file in files {
            let declarations = DeclarationTransformer::new(self.arena, self.resolver, self.diagnostics_provider)
                .transform_source_file(file)?;
            self.record_diagnostics(file, declarations.diagnostics);
            roots.push((declarations.root, TransformOutput::default()));
        }

        let PrintOutput { text, source_map } = {
            let mut printer = Printer::new(self.arena, self.resolver, self.options);
            if let Some(map_path) = &paths.declaration_map {
                printer.enable_source_map(file_name_of(declaration_path), directory_of(map_path));
            }
            printer.write_bundle(roots)?;
            printer.finish()
        };
        self.write_output(declaration_path, paths.declaration_map.as_deref(), text, source_map, false, files)
    }

    /// Write `text` and its source map, linking the two with a
    /// `//# sourceMappingURL` trailer.
    fn write_output(
        &mut self,
        path: &str,
        map_path: Option<&str>,
        mut text: String,
        source_map: Option<SourceMapGenerator>,
        inline: bool,
        files: &[NodeIndex],
    ) -> EmitResult<()> {
        if let Some(map) = source_map {
            let trailer = if inline {
                Some(map.to_inline_comment())
            } else if let Some(map_path) = map_path {
                self.write(map_path, &map.to_json(), files)?;
                Some(format!("//# sourceMappingURL={}", self.source_mapping_url(map_path)))
            } else {
                None
            };
            if let Some(trailer) = trailer {
                let new_line = self.options.new_line.as_str();
                if !text.is_empty() && !text.ends_with(new_line) {
                    text.push_str(new_line);
                }
                text.push_str(&trailer);
            }
        }
        self.write(path, &text, files)
    }

    fn source_mapping_url(&self, map_path: &str) -> String {
        let name = file_name_of(map_path);
        match &self.options.map_root {
            Some(root) => join_path(root, name),
            None => name.to_string(),
        }
    }

    fn write(&mut self, path: &str, text: &str, files: &[NodeIndex]) -> EmitResult<()> {
        debug!(path, bytes = text.len(), "writing output");
        self.host.write_file(path, text, files).map_err(|err| EmitError::WriteFile {
            path: path.to_string(),
            message: err.to_string(),
        })?;
        self.output.emitted_files.push(path.to_string());
        Ok(())
    }

    fn record_diagnostics(&mut self, file: NodeIndex, diagnostics: Vec<VisibilityDiagnostic>) {
        let Ok(sf) = self.arena.source_file(file) else {
            return;
        };
        let (file_name, text) = (sf.file_name.clone(), sf.text.clone());
        for diagnostic in diagnostics {
            let range = self.arena.range(diagnostic.error_node);
            let (start, length) = if range.pos == NO_POS {
                (0, 0)
            } else {
                let start = skip_trivia(&text, range.pos);
                (start, range.end.saturating_sub(start))
            };
            let message = format_message(&diagnostic.message, &[diagnostic.type_name.as_deref().unwrap_or("")]);
            self.output
                .diagnostics
                .push(Diagnostic::error(file_name.clone(), start, length, message, diagnostic.code));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths_follow_options() {
        let options = CompilerOptions {
            source_map: true,
            declaration: true,
            declaration_map: true,
            ..CompilerOptions::default()
        };
        let paths = get_output_paths("src/app.ts", &options, Path::new("src"));
        assert_eq!(paths.js, "src/app.js");
        assert_eq!(paths.source_map.as_deref(), Some("src/app.js.map"));
        assert_eq!(paths.declaration.as_deref(), Some("src/app.d.ts"));
        assert_eq!(paths.declaration_map.as_deref(), Some("src/app.d.ts.map"));
    }

    #[test]
    fn test_out_dir_keeps_relative_layout() {
        let options = CompilerOptions {
            out_dir: Some("dist".to_string()),
            ..CompilerOptions::default()
        };
        let paths = get_output_paths("src/lib/util.tsx", &options, Path::new("src"));
        assert_eq!(paths.js, "dist/lib/util.js");
        assert_eq!(paths.source_map, None);
        assert_eq!(paths.declaration, None);
    }

    #[test]
    fn test_inline_source_map_has_no_map_file() {
        let options = CompilerOptions {
            source_map: true,
            inline_source_map: true,
            ..CompilerOptions::default()
        };
        let paths = get_bundle_output_paths("out/bundle.js", &options);
        assert_eq!(paths.js, "out/bundle.js");
        assert_eq!(paths.source_map, None);
    }

    #[test]
    fn test_common_source_directory() {
        let dir = common_source_directory(["src/a/x.ts", "src/b/y.ts", "src/a/z.ts"]);
        assert_eq!(dir, PathBuf::from("src"));
        assert_eq!(common_source_directory(["a.ts"]), PathBuf::new());
    }
}
