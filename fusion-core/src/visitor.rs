//! Folds parsed statements into a [MergedTree].
use crate::{
    merged_tree::{MergedTree, Node},
    FusionParser,
};
use fusion_ast::{
    AssignedObjectPath, Block, FusionFile, IncludeStatement, ObjectPath, ObjectStatement,
    Operation, PathSegment, PathValue, Statement, StatementList,
};
use fusion_error::{
    error::CompileError,
    handler::{ErrorEmitted, Handler},
    warning::CompileWarning,
};
use fusion_types::{
    constants::{
        is_reserved_key, META_KEY, PRIVATE_META_NAME, PROTOTYPES_KEY, PROTOTYPE_OBJECT_NAME_KEY,
    },
    Span, Spanned,
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, trace};

type VisitResult<T> = Result<T, ErrorEmitted>;

pub(crate) struct TreeMergeVisitor<'a> {
    parser: &'a FusionParser,
    handler: &'a Handler,
    tree: &'a mut MergedTree,
    file_path: Option<Arc<PathBuf>>,
    /// Files whose statements are being visited, outermost first. Ends with
    /// `file_path` when there is one.
    include_chain: Vec<PathBuf>,
    /// Absolute paths of the blocks currently open.
    current_object_path_stack: Vec<Vec<String>>,
    inside_prototype_declaration: bool,
    statement_span: Span,
}

impl<'a> TreeMergeVisitor<'a> {
    pub(crate) fn new(
        parser: &'a FusionParser,
        handler: &'a Handler,
        tree: &'a mut MergedTree,
        file_path: Option<Arc<PathBuf>>,
        mut include_chain: Vec<PathBuf>,
    ) -> Self {
        if let Some(file_path) = &file_path {
            include_chain.push(PathBuf::clone(file_path));
        }
        Self {
            parser,
            handler,
            tree,
            file_path,
            include_chain,
            current_object_path_stack: vec![],
            inside_prototype_declaration: false,
            statement_span: Span::dummy(),
        }
    }

    pub(crate) fn visit_fusion_file(&mut self, file: &FusionFile) -> VisitResult<()> {
        self.visit_statement_list(&file.statement_list)
    }

    fn visit_statement_list(&mut self, statement_list: &StatementList) -> VisitResult<()> {
        for statement in &statement_list.statements {
            self.visit_statement(statement)?;
        }
        Ok(())
    }

    fn visit_statement(&mut self, statement: &Statement) -> VisitResult<()> {
        match statement {
            Statement::Include(include) => self.visit_include_statement(include),
            Statement::Object(object) => self.visit_object_statement(object),
        }
    }

    fn visit_include_statement(&mut self, include: &IncludeStatement) -> VisitResult<()> {
        let resolver = self.parser.include_resolver();
        let current_file = self.file_path.as_deref().map(PathBuf::as_path);
        let files = resolver
            .resolve(&include.pattern, current_file)
            .map_err(|err| {
                self.handler.emit_err(CompileError::Include {
                    pattern: include.pattern.clone(),
                    message: err.to_string(),
                    span: include.span(),
                })
            })?;

        if files.is_empty() {
            self.handler.emit_warn(CompileWarning::IncludeMatchedNothing {
                pattern: include.pattern.clone(),
                span: include.span(),
            });
        }

        for file in files {
            if current_file.is_some_and(|current| resolver.is_same_file(current, &file)) {
                debug!(file = %file.display(), "skipping self include");
                continue;
            }
            if self.is_being_included(&file) {
                return Err(self.handler.emit_err(CompileError::IncludeCycle {
                    file,
                    span: include.span(),
                }));
            }
            let src = resolver.read_source(&file).map_err(|err| {
                self.handler.emit_err(CompileError::IncludeRead {
                    pattern: include.pattern.clone(),
                    file: file.clone(),
                    message: err.to_string(),
                    span: include.span(),
                })
            })?;

            debug!(file = %file.display(), pattern = %include.pattern, "including");
            self.parser.parse_into(
                self.handler,
                self.tree,
                &src,
                Some(Arc::new(file)),
                self.include_chain.clone(),
            )?;
        }
        Ok(())
    }

    fn is_being_included(&self, file: &Path) -> bool {
        let resolver = self.parser.include_resolver();
        self.include_chain
            .iter()
            .any(|included| resolver.is_same_file(included, file))
    }

    fn visit_object_statement(&mut self, statement: &ObjectStatement) -> VisitResult<()> {
        self.statement_span = match &statement.operation {
            Some(operation) => Span::join(statement.span(), &operation.span()),
            None => statement.span(),
        };
        let prefix = self.current_object_path_prefix();
        let current_path = self.visit_object_path(&statement.path, prefix)?;
        trace!(path = ?current_path, "object statement");

        if let Some(operation) = &statement.operation {
            self.visit_operation(operation, &current_path)?;
        }

        let Some(block) = &statement.block else {
            return Ok(());
        };
        let was_inside_prototype_declaration = self.inside_prototype_declaration;
        self.inside_prototype_declaration = statement.is_root_prototype_declaration();
        let res = self.visit_block(block, current_path);
        self.inside_prototype_declaration = was_inside_prototype_declaration;
        res
    }

    fn visit_block(&mut self, block: &Block, current_path: Vec<String>) -> VisitResult<()> {
        self.current_object_path_stack.push(current_path);
        let res = self.visit_statement_list(&block.statement_list);
        self.current_object_path_stack.pop();
        res
    }

    fn current_object_path_prefix(&self) -> Vec<String> {
        self.current_object_path_stack
            .last()
            .cloned()
            .unwrap_or_default()
    }

    fn visit_object_path(
        &mut self,
        object_path: &ObjectPath,
        prefix: Vec<String>,
    ) -> VisitResult<Vec<String>> {
        let mut path = prefix;
        for segment in &object_path.segments {
            self.visit_path_segment(segment, &mut path)?;
        }
        Ok(path)
    }

    fn visit_path_segment(
        &mut self,
        segment: &PathSegment,
        path: &mut Vec<String>,
    ) -> VisitResult<()> {
        match segment {
            PathSegment::Plain { key, span } | PathSegment::Quoted { key, span } => {
                self.validate_path_key(key, span)?;
                path.push(key.clone());
            }
            PathSegment::Meta { name, span } => {
                if name == PRIVATE_META_NAME && !self.inside_prototype_declaration {
                    return Err(self
                        .handler
                        .emit_err(CompileError::PrivateOutsidePrototypeDeclaration {
                            span: span.clone(),
                        }));
                }
                path.push(META_KEY.to_string());
                path.push(name.clone());
            }
            PathSegment::Prototype { name, .. } => {
                path.push(PROTOTYPES_KEY.to_string());
                path.push(name.clone());
            }
        }
        Ok(())
    }

    fn validate_path_key(&self, key: &str, span: &Span) -> VisitResult<()> {
        let span = span.clone();
        let err = if key.is_empty() {
            CompileError::EmptyPathSegment { span }
        } else if is_reserved_key(key) {
            CompileError::ReservedKey {
                key: key.to_string(),
                span,
            }
        } else if key.contains('\n') {
            CompileError::NewlineInPathSegment {
                key: key.to_string(),
                span,
            }
        } else {
            return Ok(());
        };
        Err(self.handler.emit_err(err))
    }

    fn visit_operation(
        &mut self,
        operation: &Operation,
        current_path: &[String],
    ) -> VisitResult<()> {
        match operation {
            Operation::Assign(value) => self.visit_value_assignment(value, current_path),
            Operation::Unset { .. } => {
                self.tree.remove_value_in_tree(current_path);
                Ok(())
            }
            Operation::Copy(source) => self.visit_value_copy(source, current_path),
        }
    }

    fn visit_value_assignment(
        &mut self,
        value: &PathValue,
        current_path: &[String],
    ) -> VisitResult<()> {
        let value = self.visit_path_value(value)?;
        self.tree.set_value_in_tree(current_path, value);
        Ok(())
    }

    fn visit_path_value(&mut self, value: &PathValue) -> VisitResult<Node> {
        let node = match value {
            PathValue::String { value, .. } => Node::String(value.clone()),
            PathValue::Int { value, .. } => Node::Int(*value),
            PathValue::Float { value, .. } => Node::Float(*value),
            PathValue::Bool { value, .. } => Node::Bool(*value),
            PathValue::Null { .. } => Node::Null,
            PathValue::FusionObject { name, .. } => Node::object_type(name.as_str()),
            PathValue::Eel { code, .. } => Node::eel_expression(code.replace('\n', "")),
            PathValue::Dsl {
                identifier,
                code,
                span,
            } => self.parser.transpile_dsl(
                self.handler,
                identifier,
                code,
                span,
                self.include_chain.clone(),
            )?,
        };
        Ok(node)
    }

    fn visit_value_copy(
        &mut self,
        source: &AssignedObjectPath,
        current_path: &[String],
    ) -> VisitResult<()> {
        let prefix = match source.is_relative {
            true => MergedTree::parent_path(current_path).to_vec(),
            false => vec![],
        };
        let source_path = self.visit_object_path(&source.path, prefix)?;

        let current_is_prototype = MergedTree::path_is_prototype(current_path);
        let source_is_prototype = MergedTree::path_is_prototype(&source_path);

        if current_is_prototype && source_is_prototype {
            if current_path.len() != 2 || source_path.len() != 2 {
                return Err(self
                    .handler
                    .emit_err(CompileError::NestedPrototypeInheritance {
                        span: self.statement_span.clone(),
                    }));
            }
            let mut target = current_path.to_vec();
            target.push(PROTOTYPE_OBJECT_NAME_KEY.to_string());
            self.tree
                .set_value_in_tree(&target, Node::String(source_path[1].clone()));
            return Ok(());
        }

        if current_is_prototype != source_is_prototype {
            return Err(self.handler.emit_err(CompileError::PrototypeCopyMismatch {
                span: self.statement_span.clone(),
            }));
        }

        self.tree.copy_value_in_tree(current_path, &source_path);
        Ok(())
    }
}
