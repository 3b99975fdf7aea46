//! Parses Fusion sources, follows their includes and merges everything into
//! a single [MergedTree].
pub mod config;
pub mod dsl;
pub mod include;
pub mod merged_tree;
pub mod prototype;
mod visitor;

pub use crate::{
    config::BuildConfig,
    dsl::{DslError, DslRegistry, DslTranspiler},
    include::{FileSystemIncludeResolver, IncludeError, IncludeResolver},
    merged_tree::{MergedTree, Node, NodeMap},
    prototype::build_prototype_hierarchy,
};

use crate::visitor::TreeMergeVisitor;
use fusion_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
};
use fusion_types::Span;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::debug;

/// The key a DSL's output is assigned to when it is parsed on its own.
const DSL_VALUE_KEY: &str = "value";

/// Entry point for turning Fusion sources into a [MergedTree].
///
/// A parser holds no state between runs, every call starts from an empty tree.
pub struct FusionParser {
    config: BuildConfig,
    include_resolver: Arc<dyn IncludeResolver>,
    dsl_transpiler: Arc<dyn DslTranspiler>,
}

impl Default for FusionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FusionParser {
    pub fn new() -> Self {
        Self::with_config(BuildConfig::default())
    }

    /// A parser using the file system for includes, with globs matching
    /// `config.default_extension`, and no DSL registered.
    pub fn with_config(config: BuildConfig) -> Self {
        let include_resolver = FileSystemIncludeResolver::new(config.default_extension.clone());
        Self {
            config,
            include_resolver: Arc::new(include_resolver),
            dsl_transpiler: Arc::new(DslRegistry::default()),
        }
    }

    pub fn with_include_resolver(self, include_resolver: impl IncludeResolver + 'static) -> Self {
        Self {
            include_resolver: Arc::new(include_resolver),
            ..self
        }
    }

    pub fn with_dsl_transpiler(self, dsl_transpiler: impl DslTranspiler + 'static) -> Self {
        Self {
            dsl_transpiler: Arc::new(dsl_transpiler),
            ..self
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub(crate) fn include_resolver(&self) -> &dyn IncludeResolver {
        self.include_resolver.as_ref()
    }

    /// Parses `src` and everything it includes into a fresh tree.
    ///
    /// `path` is the file `src` was read from. Relative includes are resolved
    /// against it and it shows up in error positions.
    pub fn parse_from_source(
        &self,
        handler: &Handler,
        src: &str,
        path: Option<Arc<PathBuf>>,
    ) -> Result<MergedTree, ErrorEmitted> {
        let mut tree = MergedTree::default();
        self.parse_into(handler, &mut tree, src, path, vec![])?;
        if self.config.build_hierarchy {
            build_prototype_hierarchy(handler, &mut tree)?;
        }
        Ok(tree)
    }

    pub fn parse_from_file(
        &self,
        handler: &Handler,
        path: &Path,
    ) -> Result<MergedTree, ErrorEmitted> {
        let src = self.include_resolver.read_source(path).map_err(|err| {
            handler.emit_err(CompileError::ReadFile {
                file: path.to_path_buf(),
                message: err.to_string(),
                span: Span::dummy(),
            })
        })?;
        self.parse_from_source(handler, &src, Some(Arc::new(path.to_path_buf())))
    }

    /// Parses one source into `tree`, following its includes. Never builds
    /// the prototype hierarchy.
    pub(crate) fn parse_into(
        &self,
        handler: &Handler,
        tree: &mut MergedTree,
        src: &str,
        path: Option<Arc<PathBuf>>,
        include_chain: Vec<PathBuf>,
    ) -> Result<(), ErrorEmitted> {
        let file = fusion_parse::parse_file(handler, src, path.clone())?;
        TreeMergeVisitor::new(self, handler, tree, path, include_chain).visit_fusion_file(&file)
    }

    /// Transpiles a DSL expression and parses the result as the value of a
    /// throwaway assignment. Errors of that inner parse are reported against
    /// the DSL expression.
    pub(crate) fn transpile_dsl(
        &self,
        handler: &Handler,
        identifier: &str,
        code: &str,
        span: &Span,
        include_chain: Vec<PathBuf>,
    ) -> Result<Node, ErrorEmitted> {
        let fusion = self
            .dsl_transpiler
            .transpile(identifier, code)
            .map_err(|err| {
                handler.emit_err(CompileError::DslTranspilation {
                    identifier: identifier.to_string(),
                    message: err.to_string(),
                    span: span.clone(),
                })
            })?;
        debug!(identifier, "parsing dsl output");

        let inner_handler = Handler::default();
        let mut tree = MergedTree::default();
        let src = format!("{DSL_VALUE_KEY} = {fusion}");
        let res = self.parse_into(&inner_handler, &mut tree, &src, None, include_chain);

        let (errors, warnings) = inner_handler.consume();
        for warning in warnings {
            handler.emit_warn(warning);
        }
        if let Some(error) = errors.into_iter().next() {
            return Err(handler.emit_err(CompileError::InvalidDslOutput {
                identifier: identifier.to_string(),
                error: Box::new(error),
                span: span.clone(),
            }));
        }
        res?;
        Ok(tree.remove(DSL_VALUE_KEY).unwrap_or(Node::Null))
    }
}

/// Runs `run` with a fresh handler and turns its outcome into the first
/// reported error.
fn with_handler<T>(
    run: impl FnOnce(&Handler) -> Result<T, ErrorEmitted>,
) -> Result<T, CompileError> {
    let handler = <_>::default();
    let res = run(&handler);
    let (errors, _warnings) = handler.consume();
    match (res, errors.into_iter().next()) {
        (Ok(value), None) => Ok(value),
        (_, Some(error)) => Err(error),
        (Err(_), None) => unreachable!("`ErrorEmitted` is only handed out with an error"),
    }
}

/// Parses a standalone source with the default configuration.
pub fn parse(src: &str) -> Result<MergedTree, CompileError> {
    with_handler(|handler| FusionParser::new().parse_from_source(handler, src, None))
}

/// Parses the file at `path` with the default configuration.
pub fn parse_file(path: &Path) -> Result<MergedTree, CompileError> {
    with_handler(|handler| FusionParser::new().parse_from_file(handler, path))
}
