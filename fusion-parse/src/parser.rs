use crate::priv_prelude::*;

use tracing::trace;

pub type ParseResult<T> = Result<T, ErrorEmitted>;

/// How many blocks may be open at once.
pub const MAX_NESTING_DEPTH: usize = 64;

/// A predictive recursive descent parser over a [`Lexer`].
///
/// Every grammar point asks the lexer for the token kinds it can continue with,
/// in a fixed priority order. The first kind that matches wins.
pub struct Parser<'e> {
    lexer: Lexer,
    handler: &'e Handler,
    depth: usize,
}

impl<'e> Parser<'e> {
    pub fn new(handler: &'e Handler, lexer: Lexer) -> Parser<'e> {
        Parser {
            lexer,
            handler,
            depth: 0,
        }
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    /// Reports `kind` at the cached lookahead, or at the character under the cursor.
    pub fn emit_error(&mut self, kind: ParseErrorKind) -> ErrorEmitted {
        let span = match self.lexer.lookahead() {
            Some(token) => token.span(),
            None => self.lexer.span_of_char_at(self.lexer.cursor()),
        };
        self.emit_error_with_span(kind, span)
    }

    pub fn emit_error_with_span(&mut self, kind: ParseErrorKind, span: Span) -> ErrorEmitted {
        let error = ParseError { span, kind };
        self.handler.emit_err(CompileError::Parse { error })
    }

    /// Peeks for a token of `kind` without consuming it.
    pub fn accept(&mut self, kind: TokenKind) -> bool {
        matches!(self.lexer.try_match(kind), Some(token) if token.kind == kind)
    }

    /// Consumes and returns a token of `kind` if one is next.
    pub fn take(&mut self, kind: TokenKind) -> Option<Token> {
        if self.accept(kind) {
            self.lexer.consume_lookahead()
        } else {
            None
        }
    }

    /// Consumes a token of `kind` or fails.
    ///
    /// A cached token of another kind is a syntax error. When no rule matched at
    /// all the failure is lexical.
    pub fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if let Some(token) = self.take(kind) {
            return Ok(token);
        }
        match self.lexer.lookahead().map(|token| token.kind) {
            Some(found) => Err(self.emit_error(ParseErrorKind::UnexpectedToken {
                expected: kind,
                found,
            })),
            None => {
                let error = LexError {
                    span: self.lexer.span_of_char_at(self.lexer.cursor()),
                    expected: kind,
                    found: self.lexer.peek_char(),
                };
                Err(self.handler.emit_err(CompileError::Lex { error }))
            }
        }
    }

    /// Consumes a token of `kind` if one is next and tells whether it did.
    pub fn lazy_expect(&mut self, kind: TokenKind) -> bool {
        self.take(kind).is_some()
    }

    /// Skips spaces, newlines and comments.
    fn lazy_big_gap(&mut self) {
        while self.lazy_expect(TokenKind::Space)
            || self.lazy_expect(TokenKind::Newline)
            || self.lazy_expect(TokenKind::SlashComment)
            || self.lazy_expect(TokenKind::HashComment)
            || self.lazy_expect(TokenKind::MultilineComment)
        {}
    }

    /// Skips spaces and comments but stops at a newline.
    fn lazy_small_gap(&mut self) {
        while self.lazy_expect(TokenKind::Space)
            || self.lazy_expect(TokenKind::SlashComment)
            || self.lazy_expect(TokenKind::HashComment)
            || self.lazy_expect(TokenKind::MultilineComment)
        {}
    }

    /// ```text
    /// FusionFile = StatementList
    /// ```
    pub fn parse_fusion_file(mut self) -> ParseResult<FusionFile> {
        let statement_list = self.parse_statement_list(None)?;
        let span = self.lexer.span(0, self.lexer.code().len());
        Ok(FusionFile {
            statement_list,
            path: self.lexer.path().cloned(),
            span,
        })
    }

    /// ```text
    /// StatementList = ( Statement )*
    /// ```
    ///
    /// Stops at the end of input, or at `stop` when given.
    fn parse_statement_list(&mut self, stop: Option<TokenKind>) -> ParseResult<StatementList> {
        let mut statements = Vec::new();
        self.lazy_big_gap();
        while !self.accept(TokenKind::Eof) && !stop.is_some_and(|stop| self.accept(stop)) {
            statements.push(self.parse_statement()?);
            self.lazy_big_gap();
        }
        Ok(StatementList { statements })
    }

    /// ```text
    /// Statement = IncludeStatement / ObjectStatement
    /// ```
    fn parse_statement(&mut self) -> ParseResult<Statement> {
        if self.accept(TokenKind::Include) {
            return self.parse_include_statement().map(Statement::Include);
        }
        if self.accept(TokenKind::PrototypeStart)
            || self.accept(TokenKind::ObjectPathPart)
            || self.accept(TokenKind::MetaPathStart)
            || self.accept(TokenKind::StringSingleQuoted)
            || self.accept(TokenKind::StringDoubleQuoted)
        {
            return self.parse_object_statement().map(Statement::Object);
        }
        Err(self.emit_error(ParseErrorKind::ExpectedStatement))
    }

    /// ```text
    /// IncludeStatement = "include" ":" ( STRING / FILE_PATTERN ) EndOfStatement
    /// ```
    fn parse_include_statement(&mut self) -> ParseResult<IncludeStatement> {
        let include_token = self.expect(TokenKind::Include)?;
        self.lazy_expect(TokenKind::Space);

        let pattern_token = match self
            .take(TokenKind::StringDoubleQuoted)
            .or_else(|| self.take(TokenKind::StringSingleQuoted))
        {
            Some(quoted) => {
                let text = quoted.text();
                let pattern = text[1..text.len() - 1].to_string();
                (pattern, quoted.span)
            }
            None => match self.take(TokenKind::FilePattern) {
                Some(pattern) => (pattern.text().to_string(), pattern.span),
                None => return Err(self.emit_error(ParseErrorKind::ExpectedIncludePattern)),
            },
        };
        let (pattern, pattern_span) = pattern_token;

        self.parse_end_of_statement()?;
        trace!(pattern = %pattern, "parsed include statement");
        Ok(IncludeStatement {
            pattern,
            span: Span::join(include_token.span, &pattern_span),
        })
    }

    /// ```text
    /// ObjectStatement = ObjectPath ( ValueAssignment / ValueUnset / ValueCopy )? ( Block / EndOfStatement )
    /// ```
    fn parse_object_statement(&mut self) -> ParseResult<ObjectStatement> {
        let path = self.parse_object_path()?;
        self.lazy_small_gap();
        let cursor_after_path = self.lexer.cursor();

        let operation = if self.accept(TokenKind::Assignment) {
            Some(self.parse_value_assignment()?)
        } else if self.accept(TokenKind::Unset) {
            let token = self.expect(TokenKind::Unset)?;
            Some(Operation::Unset { span: token.span })
        } else if self.accept(TokenKind::Copy) {
            Some(self.parse_value_copy()?)
        } else {
            None
        };

        self.lazy_small_gap();

        if self.accept(TokenKind::Lbrace) {
            let block = self.parse_block()?;
            return Ok(ObjectStatement {
                path,
                operation,
                block: Some(block),
            });
        }

        if operation.is_none() {
            let span = self.lexer.span_of_char_at(cursor_after_path);
            return Err(self.emit_error_with_span(ParseErrorKind::ExpectedOperationOrBlock, span));
        }

        self.parse_end_of_statement()?;
        Ok(ObjectStatement {
            path,
            operation,
            block: None,
        })
    }

    /// ```text
    /// ObjectPath = PathSegment ( "." PathSegment )*
    /// ```
    fn parse_object_path(&mut self) -> ParseResult<ObjectPath> {
        let mut segments = vec![self.parse_path_segment()?];
        while self.lazy_expect(TokenKind::Dot) {
            segments.push(self.parse_path_segment()?);
        }
        Ok(ObjectPath { segments })
    }

    /// ```text
    /// PathSegment = PROTOTYPE_START FUSION_OBJECT_NAME ")" / "@" OBJECT_PATH_PART / STRING / OBJECT_PATH_PART
    /// ```
    fn parse_path_segment(&mut self) -> ParseResult<PathSegment> {
        if let Some(start) = self.take(TokenKind::PrototypeStart) {
            let Some(name) = self.take(TokenKind::FusionObjectName) else {
                return Err(self.emit_error(ParseErrorKind::ExpectedPrototypeName));
            };
            let end = self.expect(TokenKind::Rparen)?;
            return Ok(PathSegment::Prototype {
                name: name.text().to_string(),
                span: Span::join(start.span, &end.span),
            });
        }

        if let Some(at) = self.take(TokenKind::MetaPathStart) {
            let name = self.expect(TokenKind::ObjectPathPart)?;
            return Ok(PathSegment::Meta {
                name: name.text().to_string(),
                span: Span::join(at.span, &name.span),
            });
        }

        if let Some(quoted) = self
            .take(TokenKind::StringDoubleQuoted)
            .or_else(|| self.take(TokenKind::StringSingleQuoted))
        {
            let text = quoted.text();
            return Ok(PathSegment::Quoted {
                key: strip_slashes(&text[1..text.len() - 1]),
                span: quoted.span,
            });
        }

        if let Some(part) = self.take(TokenKind::ObjectPathPart) {
            return Ok(PathSegment::Plain {
                key: part.text().to_string(),
                span: part.span,
            });
        }

        Err(self.emit_error(ParseErrorKind::ExpectedPathSegment))
    }

    /// ```text
    /// ValueAssignment = "=" PathValue
    /// ```
    fn parse_value_assignment(&mut self) -> ParseResult<Operation> {
        self.expect(TokenKind::Assignment)?;
        self.lazy_small_gap();
        self.parse_path_value().map(Operation::Assign)
    }

    /// ```text
    /// PathValue = STRING / FUSION_OBJECT_NAME / DslExpression / EEL_EXPRESSION
    ///           / FLOAT / INTEGER / TRUE / FALSE / NULL
    /// ```
    fn parse_path_value(&mut self) -> ParseResult<PathValue> {
        if let Some(token) = self.take(TokenKind::StringSingleQuoted) {
            let text = token.text();
            return Ok(PathValue::String {
                value: strip_slashes(&text[1..text.len() - 1]),
                span: token.span,
            });
        }
        if let Some(token) = self.take(TokenKind::StringDoubleQuoted) {
            let text = token.text();
            return Ok(PathValue::String {
                value: strip_c_slashes(&text[1..text.len() - 1]),
                span: token.span,
            });
        }
        if let Some(token) = self.take(TokenKind::FusionObjectName) {
            return Ok(PathValue::FusionObject {
                name: token.text().to_string(),
                span: token.span,
            });
        }
        if self.accept(TokenKind::DslExpressionStart) {
            return self.parse_dsl_expression();
        }
        if let Some(token) = self.take(TokenKind::EelExpression) {
            let text = token.text();
            return Ok(PathValue::Eel {
                code: text[2..text.len() - 1].to_string(),
                span: token.span,
            });
        }
        if let Some(token) = self.take(TokenKind::Float) {
            return Ok(PathValue::Float {
                value: token.text().parse().unwrap_or_default(),
                span: token.span,
            });
        }
        if let Some(token) = self.take(TokenKind::Integer) {
            return Ok(PathValue::Int {
                value: parse_int_saturating(token.text()),
                span: token.span,
            });
        }
        if let Some(token) = self.take(TokenKind::TrueValue) {
            return Ok(PathValue::Bool {
                value: true,
                span: token.span,
            });
        }
        if let Some(token) = self.take(TokenKind::FalseValue) {
            return Ok(PathValue::Bool {
                value: false,
                span: token.span,
            });
        }
        if let Some(token) = self.take(TokenKind::NullValue) {
            return Ok(PathValue::Null { span: token.span });
        }
        Err(self.emit_error(ParseErrorKind::ExpectedPathValue))
    }

    /// ```text
    /// DslExpression = DSL_EXPRESSION_START DSL_EXPRESSION_CONTENT
    /// ```
    fn parse_dsl_expression(&mut self) -> ParseResult<PathValue> {
        let identifier = self.expect(TokenKind::DslExpressionStart)?;
        let Some(content) = self.take(TokenKind::DslExpressionContent) else {
            let kind = ParseErrorKind::MalformedDslExpression {
                identifier: identifier.text().to_string(),
            };
            return Err(self.emit_error_with_span(kind, identifier.span));
        };
        let code = content.text();
        Ok(PathValue::Dsl {
            identifier: identifier.text().to_string(),
            code: code[1..code.len() - 1].to_string(),
            span: Span::join(identifier.span, &content.span),
        })
    }

    /// ```text
    /// ValueCopy = "<" "."? ObjectPath
    /// ```
    fn parse_value_copy(&mut self) -> ParseResult<Operation> {
        self.expect(TokenKind::Copy)?;
        self.lazy_small_gap();
        let is_relative = self.lazy_expect(TokenKind::Dot);
        let path = self.parse_object_path()?;
        Ok(Operation::Copy(AssignedObjectPath { path, is_relative }))
    }

    /// ```text
    /// Block = "{" StatementList "}"
    /// ```
    fn parse_block(&mut self) -> ParseResult<Block> {
        let open_brace = self.expect(TokenKind::Lbrace)?.span;
        if self.depth >= MAX_NESTING_DEPTH {
            let kind = ParseErrorKind::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            };
            return Err(self.emit_error_with_span(kind, open_brace));
        }

        self.depth += 1;
        let statement_list = self.parse_statement_list(Some(TokenKind::Rbrace));
        self.depth -= 1;
        let statement_list = statement_list?;

        match self.take(TokenKind::Rbrace) {
            Some(close_brace) => Ok(Block {
                open_brace,
                statement_list,
                close_brace: close_brace.span,
            }),
            None => Err(self.emit_error_with_span(ParseErrorKind::UnclosedBlock, open_brace)),
        }
    }

    /// ```text
    /// EndOfStatement = EOF / NEWLINE
    /// ```
    ///
    /// Inside a block the closing brace also ends a statement. It is left for
    /// the block to consume.
    fn parse_end_of_statement(&mut self) -> ParseResult<()> {
        self.lazy_small_gap();
        if self.accept(TokenKind::Eof) || self.lazy_expect(TokenKind::Newline) {
            return Ok(());
        }
        if self.depth > 0 && self.accept(TokenKind::Rbrace) {
            return Ok(());
        }
        Err(self.emit_error(ParseErrorKind::ExpectedEndOfStatement))
    }
}

fn parse_int_saturating(text: &str) -> i64 {
    text.parse().unwrap_or(if text.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}
