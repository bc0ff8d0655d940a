//! Parser implementation
//!
//! Recursive descent over the filtered token stream. The grammar is
//! line-oriented: every definition and statement occupies one line, bodies are
//! the following lines indented exactly one level deeper.

use super::ast::*;
use crate::error::{PigeonError, PigeonResult, SourceLocation};
use crate::lexer::{Keyword, Token, TokenType, INDENT_WIDTH};

/// Parser for Pigeon source code
pub struct Parser {
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
}

impl Parser {
    /// Create a new parser from tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse tokens into the list of top-level definitions
    pub fn parse(&mut self) -> PigeonResult<ParsedPackage> {
        let mut definitions = Vec::new();

        while !self.is_at_end() {
            definitions.push(self.definition()?);
        }

        tracing::debug!(definitions = definitions.len(), "parsed package");
        Ok(ParsedPackage { definitions })
    }

    // ===== Definitions =====

    fn definition(&mut self) -> PigeonResult<Definition> {
        match self.peek_type() {
            Some(TokenType::Reserved(Keyword::Import)) => self.import_definition(false),
            Some(TokenType::Reserved(Keyword::NativeImport)) => self.import_definition(true),
            Some(TokenType::Reserved(Keyword::Struct)) => self.struct_definition(false),
            Some(TokenType::Reserved(Keyword::NativeStruct)) => self.struct_definition(true),
            Some(TokenType::Reserved(Keyword::Interface)) => self.interface_definition(),
            Some(TokenType::Reserved(Keyword::Method)) => self.method_definition(),
            Some(TokenType::Reserved(Keyword::Func)) => self.function_definition(),
            Some(TokenType::Reserved(Keyword::NativeFunc)) => self.native_function_definition(),
            Some(TokenType::Reserved(Keyword::Global)) => self.global_definition(),
            Some(TokenType::Indentation) => {
                Err(self.error_here("unexpected indentation at top level"))
            }
            _ => Err(self.unexpected("definition")),
        }
    }

    fn import_definition(&mut self, native: bool) -> PigeonResult<Definition> {
        let location = self.advance().location.clone();
        self.expect_space("import")?;

        let token = self.consume(TokenType::String, "import path")?;
        let path = strip_quotes(&token.lexeme).to_string();

        let alias = if self.match_token(TokenType::Space) {
            Some(self.consume_identifier("import name")?)
        } else {
            None
        };
        self.end_line()?;

        let name = match &alias {
            Some(alias) => alias.clone(),
            None => path.rsplit('/').next().unwrap_or(path.as_str()).to_string(),
        };

        Ok(Definition::Import(ImportDefinition {
            name,
            path,
            alias,
            native,
            location,
        }))
    }

    fn struct_definition(&mut self, native: bool) -> PigeonResult<Definition> {
        let location = self.advance().location.clone();
        self.expect_space("struct")?;
        let name = self.consume(TokenType::TypeName, "struct name")?.lexeme;
        self.end_line()?;

        let mut members = Vec::new();
        let mut native_code = None;
        while self.line_indent()? == Some(1) {
            self.advance();
            if native && self.check(TokenType::MultiLineString) {
                let token = self.advance().clone();
                native_code = Some(strip_triple_quotes(&token.lexeme).to_string());
                self.end_line()?;
                break;
            }
            members.push(self.param()?);
            self.end_line()?;
        }

        Ok(Definition::Struct(StructDefinition {
            name,
            members,
            native_code,
            location,
        }))
    }

    fn interface_definition(&mut self) -> PigeonResult<Definition> {
        let location = self.advance().location.clone();
        self.expect_space("interface")?;
        let name = self.consume(TokenType::TypeName, "interface name")?.lexeme;
        self.end_line()?;

        let mut methods = Vec::new();
        while self.line_indent()? == Some(1) {
            self.advance();
            let method_location = self.location();
            let method_name = self.consume_identifier("method name")?;

            let mut params = Vec::new();
            let mut return_types = Vec::new();
            while !self.check(TokenType::Newline) {
                self.expect_space("method signature")?;
                if self.match_token(TokenType::Colon) {
                    return_types = self.return_types()?;
                    break;
                }
                params.push(self.parse_type()?);
            }
            self.end_line()?;

            methods.push(InterfaceMethod {
                name: method_name,
                params,
                return_types,
                location: method_location,
            });
        }

        Ok(Definition::Interface(InterfaceDefinition {
            name,
            methods,
            location,
        }))
    }

    fn method_definition(&mut self) -> PigeonResult<Definition> {
        let location = self.advance().location.clone();
        self.expect_space("method")?;
        let name = self.consume_identifier("method name")?;
        self.expect_space("method name")?;
        let receiver = self.param()?;
        let (params, return_types) = self.signature()?;
        self.end_line()?;
        let body = self.block(1)?;

        Ok(Definition::Method(MethodDefinition {
            name,
            receiver,
            params,
            return_types,
            body,
            location,
        }))
    }

    fn function_definition(&mut self) -> PigeonResult<Definition> {
        let location = self.advance().location.clone();
        let func = self.function_rest(location, 0)?;
        Ok(Definition::Function(func))
    }

    fn native_function_definition(&mut self) -> PigeonResult<Definition> {
        let location = self.advance().location.clone();
        self.expect_space("nativefunc")?;
        let name = self.consume_identifier("function name")?;
        let (params, return_types) = self.signature()?;
        self.end_line()?;

        if self.line_indent()? != Some(1) {
            return Err(self.error_here("expected indented native code block"));
        }
        self.advance();
        let token = self.consume(TokenType::MultiLineString, "native code block")?;
        self.end_line()?;

        Ok(Definition::Function(FunctionDefinition {
            name,
            params,
            return_types,
            body: Vec::new(),
            native_code: Some(strip_triple_quotes(&token.lexeme).to_string()),
            location,
        }))
    }

    fn global_definition(&mut self) -> PigeonResult<Definition> {
        let location = self.advance().location.clone();
        self.expect_space("global")?;
        let name = self.consume_identifier("global name")?;
        self.expect_space("global name")?;
        let data_type = self.parse_type()?;
        self.expect_space("global type")?;
        let value = self.expression()?;
        self.end_line()?;

        Ok(Definition::Global(GlobalDefinition {
            name,
            data_type,
            value,
            location,
        }))
    }

    /// Name, signature and body of a `func` or `localfunc` whose keyword was consumed
    fn function_rest(
        &mut self,
        location: SourceLocation,
        level: usize,
    ) -> PigeonResult<FunctionDefinition> {
        self.expect_space("func")?;
        let name = self.consume_identifier("function name")?;
        let (params, return_types) = self.signature()?;
        self.end_line()?;
        let body = self.block(level + 1)?;

        Ok(FunctionDefinition {
            name,
            params,
            return_types,
            body,
            native_code: None,
            location,
        })
    }

    /// `(SPACE name SPACE Type)* (SPACE : (SPACE Type)+)?` up to the end of line
    fn signature(&mut self) -> PigeonResult<(Vec<Param>, Vec<ParsedDataType>)> {
        let mut params = Vec::new();
        let mut return_types = Vec::new();

        while !self.check(TokenType::Newline) {
            self.expect_space("signature")?;
            if self.match_token(TokenType::Colon) {
                return_types = self.return_types()?;
                break;
            }
            params.push(self.param()?);
        }

        Ok((params, return_types))
    }

    /// Types after a `:` in a signature; at least one is required
    fn return_types(&mut self) -> PigeonResult<Vec<ParsedDataType>> {
        let mut types = Vec::new();
        while self.match_token(TokenType::Space) {
            types.push(self.parse_type()?);
        }
        if types.is_empty() {
            return Err(self.error_here("expected return type after ':'"));
        }
        Ok(types)
    }

    /// `name SPACE Type`
    pub(super) fn param(&mut self) -> PigeonResult<Param> {
        let location = self.location();
        let name = self.consume_identifier("name")?;
        self.expect_space("name")?;
        let data_type = self.parse_type()?;
        Ok(Param {
            name,
            data_type,
            location,
        })
    }

    // ===== Statements =====

    /// Lines indented exactly `level` deep; a shallower line ends the block
    fn block(&mut self, level: usize) -> PigeonResult<Vec<Stmt>> {
        let mut body = Vec::new();

        while let Some(indent) = self.line_indent()? {
            if indent < level {
                break;
            }
            if indent > level {
                return Err(self.error_here("unexpected indentation"));
            }
            self.advance();
            body.push(self.statement(level)?);
        }

        Ok(body)
    }

    fn nonempty_block(&mut self, level: usize, owner: &str) -> PigeonResult<Vec<Stmt>> {
        let location = self.location();
        let body = self.block(level)?;
        if body.is_empty() {
            return Err(PigeonError::syntax_error(
                format!("expected indented body after '{}'", owner),
                location,
            ));
        }
        Ok(body)
    }

    fn statement(&mut self, level: usize) -> PigeonResult<Stmt> {
        match self.peek_type() {
            Some(TokenType::Reserved(Keyword::As)) => self.assignment_statement(),
            Some(TokenType::Reserved(Keyword::If)) => self.if_statement(level),
            Some(TokenType::Reserved(Keyword::While)) => self.while_statement(level),
            Some(TokenType::Reserved(Keyword::Foreach)) => self.foreach_statement(level),
            Some(TokenType::Reserved(Keyword::Forinc)) => self.forinc_statement(level, false),
            Some(TokenType::Reserved(Keyword::Fordec)) => self.forinc_statement(level, true),
            Some(TokenType::Reserved(Keyword::Typeswitch)) => self.typeswitch_statement(level),
            Some(TokenType::Reserved(Keyword::Select)) => self.select_statement(level),
            Some(TokenType::Reserved(Keyword::Return)) => self.return_statement(),
            Some(TokenType::Reserved(Keyword::Break)) => {
                let location = self.advance().location.clone();
                self.end_line()?;
                Ok(Stmt::Break { location })
            }
            Some(TokenType::Reserved(Keyword::Continue)) => {
                let location = self.advance().location.clone();
                self.end_line()?;
                Ok(Stmt::Continue { location })
            }
            Some(TokenType::Reserved(Keyword::Go)) => self.go_statement(),
            Some(TokenType::Reserved(Keyword::Locals)) => self.locals_statement(),
            Some(TokenType::Reserved(Keyword::LocalFunc)) => {
                let location = self.advance().location.clone();
                let func = self.function_rest(location.clone(), level)?;
                Ok(Stmt::LocalFunc {
                    func: Box::new(func),
                    location,
                })
            }
            Some(TokenType::OpenParen) => {
                let location = self.location();
                let expr = self.expression()?;
                self.end_line()?;
                Ok(Stmt::Expression { expr, location })
            }
            Some(TokenType::Reserved(keyword)) => Err(self.error_here(format!(
                "'{}' without a matching enclosing statement",
                keyword
            ))),
            _ => Err(self.unexpected("statement")),
        }
    }

    fn assignment_statement(&mut self) -> PigeonResult<Stmt> {
        let location = self.advance().location.clone();
        self.expect_space("'as'")?;

        let mut exprs = vec![self.expression()?];
        while self.match_token(TokenType::Space) {
            exprs.push(self.expression()?);
        }
        self.end_line()?;

        if exprs.len() < 2 {
            return Err(PigeonError::syntax_error(
                "as statement needs at least one target and a value",
                location,
            ));
        }
        let value = exprs.remove(exprs.len() - 1);

        Ok(Stmt::Assignment {
            targets: exprs,
            value,
            location,
        })
    }

    fn if_statement(&mut self, level: usize) -> PigeonResult<Stmt> {
        let location = self.advance().location.clone();
        self.expect_space("'if'")?;
        let condition = self.expression()?;
        self.end_line()?;
        let body = self.nonempty_block(level + 1, "if")?;

        let mut elseifs = Vec::new();
        while self.next_line_is(level, Keyword::Elseif) {
            self.skip_indentation(level);
            let clause_location = self.advance().location.clone();
            self.expect_space("'elseif'")?;
            let condition = self.expression()?;
            self.end_line()?;
            let body = self.nonempty_block(level + 1, "elseif")?;
            elseifs.push(ElseIf {
                condition,
                body,
                location: clause_location,
            });
        }

        let else_body = if self.next_line_is(level, Keyword::Else) {
            self.skip_indentation(level);
            self.advance();
            self.end_line()?;
            Some(self.nonempty_block(level + 1, "else")?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            body,
            elseifs,
            else_body,
            location,
        })
    }

    fn while_statement(&mut self, level: usize) -> PigeonResult<Stmt> {
        let location = self.advance().location.clone();
        self.expect_space("'while'")?;
        let condition = self.expression()?;
        self.end_line()?;
        let body = self.nonempty_block(level + 1, "while")?;

        Ok(Stmt::While {
            condition,
            body,
            location,
        })
    }

    fn foreach_statement(&mut self, level: usize) -> PigeonResult<Stmt> {
        let location = self.advance().location.clone();
        self.expect_space("'foreach'")?;
        let index = self.param()?;
        self.expect_space("index type")?;
        let value = self.param()?;
        self.expect_space("value type")?;
        let collection = self.expression()?;
        self.end_line()?;
        let body = self.nonempty_block(level + 1, "foreach")?;

        Ok(Stmt::Foreach {
            index,
            value,
            collection,
            body,
            location,
        })
    }

    fn forinc_statement(&mut self, level: usize, descending: bool) -> PigeonResult<Stmt> {
        let location = self.advance().location.clone();
        let keyword = if descending { "fordec" } else { "forinc" };
        self.expect_space(keyword)?;
        let var = self.param()?;
        self.expect_space("counter type")?;
        let start = self.expression()?;
        self.expect_space("start value")?;
        let end = self.expression()?;
        self.end_line()?;
        let body = self.nonempty_block(level + 1, keyword)?;

        Ok(Stmt::Forinc {
            var,
            start,
            end,
            descending,
            body,
            location,
        })
    }

    fn typeswitch_statement(&mut self, level: usize) -> PigeonResult<Stmt> {
        let location = self.advance().location.clone();
        self.expect_space("'typeswitch'")?;
        let subject = self.expression()?;
        self.end_line()?;

        let clause_level = level + 1;
        let mut cases = Vec::new();
        let mut default = None;
        loop {
            if self.next_line_is(clause_level, Keyword::Case) {
                self.skip_indentation(clause_level);
                let case_location = self.advance().location.clone();
                self.expect_space("'case'")?;
                let binding = self.param()?;
                self.end_line()?;
                let body = self.nonempty_block(clause_level + 1, "case")?;
                cases.push(TypeCase {
                    binding,
                    body,
                    location: case_location,
                });
            } else if self.next_line_is(clause_level, Keyword::Default) {
                self.skip_indentation(clause_level);
                let default_location = self.advance().location.clone();
                if default.is_some() {
                    return Err(PigeonError::syntax_error(
                        "duplicate default clause",
                        default_location,
                    ));
                }
                self.end_line()?;
                default = Some(self.nonempty_block(clause_level + 1, "default")?);
            } else {
                break;
            }
        }

        if self.line_indent()? == Some(clause_level) {
            self.skip_indentation(clause_level);
            return Err(self.unexpected("'case' or 'default'"));
        }
        if cases.is_empty() && default.is_none() {
            return Err(PigeonError::syntax_error(
                "typeswitch needs at least one case",
                location,
            ));
        }

        Ok(Stmt::Typeswitch {
            subject,
            cases,
            default,
            location,
        })
    }

    fn select_statement(&mut self, level: usize) -> PigeonResult<Stmt> {
        let location = self.advance().location.clone();
        self.end_line()?;

        let clause_level = level + 1;
        let mut clauses = Vec::new();
        let mut default = None;
        loop {
            if self.next_line_is(clause_level, Keyword::Sending) {
                self.skip_indentation(clause_level);
                let clause_location = self.advance().location.clone();
                self.expect_space("'sending'")?;
                let channel = self.expression()?;
                self.expect_space("channel")?;
                let value = self.expression()?;
                self.end_line()?;
                let body = self.nonempty_block(clause_level + 1, "sending")?;
                clauses.push(SelectClause {
                    kind: SelectKind::Sending { channel, value },
                    body,
                    location: clause_location,
                });
            } else if self.next_line_is(clause_level, Keyword::Rcving) {
                self.skip_indentation(clause_level);
                let clause_location = self.advance().location.clone();
                self.expect_space("'rcving'")?;
                let binding = self.param()?;
                self.expect_space("received type")?;
                let channel = self.expression()?;
                self.end_line()?;
                let body = self.nonempty_block(clause_level + 1, "rcving")?;
                clauses.push(SelectClause {
                    kind: SelectKind::Rcving { binding, channel },
                    body,
                    location: clause_location,
                });
            } else if self.next_line_is(clause_level, Keyword::Default) {
                self.skip_indentation(clause_level);
                let default_location = self.advance().location.clone();
                if default.is_some() {
                    return Err(PigeonError::syntax_error(
                        "duplicate default clause",
                        default_location,
                    ));
                }
                self.end_line()?;
                default = Some(self.nonempty_block(clause_level + 1, "default")?);
            } else {
                break;
            }
        }

        if self.line_indent()? == Some(clause_level) {
            self.skip_indentation(clause_level);
            return Err(self.unexpected("'sending', 'rcving' or 'default'"));
        }
        if clauses.is_empty() {
            return Err(PigeonError::syntax_error(
                "select needs at least one sending or rcving clause",
                location,
            ));
        }

        Ok(Stmt::Select {
            clauses,
            default,
            location,
        })
    }

    fn return_statement(&mut self) -> PigeonResult<Stmt> {
        let location = self.advance().location.clone();
        let mut values = Vec::new();
        while self.match_token(TokenType::Space) {
            values.push(self.expression()?);
        }
        self.end_line()?;
        Ok(Stmt::Return { values, location })
    }

    fn go_statement(&mut self) -> PigeonResult<Stmt> {
        let location = self.advance().location.clone();
        self.expect_space("'go'")?;
        let call = self.expression()?;
        if !call.is_call() {
            return Err(PigeonError::syntax_error(
                "go requires a function or method call",
                call.location().clone(),
            ));
        }
        self.end_line()?;
        Ok(Stmt::Go { call, location })
    }

    fn locals_statement(&mut self) -> PigeonResult<Stmt> {
        let location = self.advance().location.clone();
        let mut vars = Vec::new();
        while self.match_token(TokenType::Space) {
            vars.push(self.param()?);
        }
        if vars.is_empty() {
            return Err(self.error_here("expected at least one local after 'locals'"));
        }
        self.end_line()?;
        Ok(Stmt::Locals { vars, location })
    }

    // ===== Lines =====

    /// Indentation level of the next line, or `None` at the end of input
    fn line_indent(&self) -> PigeonResult<Option<usize>> {
        match self.peek() {
            None => Ok(None),
            Some(token) if token.token_type == TokenType::Indentation => {
                let width = token.lexeme.len();
                if width % INDENT_WIDTH != 0 {
                    return Err(PigeonError::syntax_error(
                        format!("indentation must be a multiple of {} spaces", INDENT_WIDTH),
                        token.location.clone(),
                    ));
                }
                Ok(Some(width / INDENT_WIDTH))
            }
            Some(_) => Ok(Some(0)),
        }
    }

    /// Whether the next line sits at `level` and opens with `keyword`
    fn next_line_is(&self, level: usize, keyword: Keyword) -> bool {
        let offset = if level == 0 {
            0
        } else {
            match self.peek() {
                Some(token)
                    if token.token_type == TokenType::Indentation
                        && token.lexeme.len() == level * INDENT_WIDTH =>
                {
                    1
                }
                _ => return false,
            }
        };
        matches!(
            self.tokens.get(self.current + offset).map(|t| t.token_type),
            Some(TokenType::Reserved(k)) if k == keyword
        )
    }

    fn skip_indentation(&mut self, level: usize) {
        if level > 0 {
            self.match_token(TokenType::Indentation);
        }
    }

    pub(super) fn expect_space(&mut self, after: &str) -> PigeonResult<()> {
        if self.match_token(TokenType::Space) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected space after {}", after)))
        }
    }

    fn end_line(&mut self) -> PigeonResult<()> {
        if self.match_token(TokenType::Newline) || self.is_at_end() {
            Ok(())
        } else {
            Err(self.unexpected("end of line"))
        }
    }

    // ===== Helper methods =====

    pub(super) fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn check(&self, token_type: TokenType) -> bool {
        self.peek_type() == Some(token_type)
    }

    pub(super) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    pub(super) fn peek_type(&self) -> Option<TokenType> {
        self.peek().map(|t| t.token_type)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    pub(super) fn consume(&mut self, token_type: TokenType, what: &str) -> PigeonResult<Token> {
        if self.check(token_type) {
            Ok(self.advance().clone())
        } else {
            Err(self.unexpected(what))
        }
    }

    pub(super) fn consume_identifier(&mut self, what: &str) -> PigeonResult<String> {
        Ok(self.consume(TokenType::Identifier, what)?.lexeme)
    }

    /// Location of the next token, or of the last one at the end of input
    pub(super) fn location(&self) -> SourceLocation {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.location.clone())
            .unwrap_or_else(|| SourceLocation::at(1, 1))
    }

    pub(super) fn error_here(&self, message: impl Into<String>) -> PigeonError {
        PigeonError::syntax_error(message, self.location())
    }

    /// "expected X, found Y" at the next token
    pub(super) fn unexpected(&self, expected: &str) -> PigeonError {
        let found = match self.peek() {
            Some(token) if token.token_type == TokenType::Newline => "end of line".to_string(),
            Some(token) => token.token_type.to_string(),
            None => "end of input".to_string(),
        };
        self.error_here(format!("expected {}, found {}", expected, found))
    }
}

/// Contents of a `"..."` lexeme
pub(super) fn strip_quotes(lexeme: &str) -> &str {
    lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme)
}

/// Contents of a `'''...'''` lexeme
pub(super) fn strip_triple_quotes(lexeme: &str) -> &str {
    lexeme
        .strip_prefix("'''")
        .and_then(|s| s.strip_suffix("'''"))
        .unwrap_or(lexeme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Lexer, Operator};
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> PigeonResult<ParsedPackage> {
        let tokens = Lexer::new(source, None).tokenize()?;
        Parser::new(tokens).parse()
    }

    fn parse_error(source: &str) -> (String, usize, usize) {
        let err = parse(source).unwrap_err();
        let location = err.location().unwrap().clone();
        (err.message().to_string(), location.line, location.column)
    }

    fn only_function(package: &ParsedPackage) -> &FunctionDefinition {
        match &package.definitions[..] {
            [Definition::Function(f)] => f,
            other => panic!("expected one function, got {:?}", other),
        }
    }

    #[test]
    fn test_hello_function() {
        let package = parse("func main\n    (println \"hi\")\n").unwrap();
        let main = only_function(&package);
        assert_eq!(main.name, "main");
        assert!(main.params.is_empty());
        assert_eq!(main.body.len(), 1);

        match &main.body[0] {
            Stmt::Expression {
                expr: Expr::Operation {
                    operator, operands, ..
                },
                location,
            } => {
                assert_eq!(*operator, Operator::Println);
                assert_eq!(location.line, 2);
                assert_eq!(location.column, 5);
                assert!(matches!(
                    &operands[0],
                    Expr::Literal { value: Literal::String(s), .. } if s == "hi"
                ));
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn test_function_signature() {
        let package = parse("func sum a I b I : I Err\n    return a nil\n").unwrap();
        let sum = only_function(&package);
        let names: Vec<&str> = sum.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        let returns: Vec<String> = sum.return_types.iter().map(|t| t.to_string()).collect();
        assert_eq!(returns, vec!["I", "Err"]);
        assert!(matches!(&sum.body[0], Stmt::Return { values, .. } if values.len() == 2));
    }

    #[test]
    fn test_struct_interface_method() {
        let source = "\
interface Animal
    speak : Str
    eat Str I
struct Dog
    name Str
    tags L<Str>
method speak d Dog : Str
    return \"woof\"
";
        let package = parse(source).unwrap();
        assert_eq!(package.definitions.len(), 3);

        match &package.definitions[0] {
            Definition::Interface(i) => {
                assert_eq!(i.methods.len(), 2);
                assert_eq!(i.methods[0].return_types[0].name, "Str");
                assert_eq!(i.methods[1].params.len(), 2);
                assert!(i.methods[1].return_types.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
        match &package.definitions[1] {
            Definition::Struct(s) => {
                assert_eq!(s.members.len(), 2);
                assert_eq!(s.members[1].data_type.to_string(), "L<Str>");
            }
            other => panic!("unexpected {:?}", other),
        }
        match &package.definitions[2] {
            Definition::Method(m) => {
                assert_eq!(m.receiver.name, "d");
                assert_eq!(m.receiver.data_type.name, "Dog");
                assert!(m.params.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_native_definitions() {
        let source = "\
nativeimport \"strings\"
nativestruct Buf
    n I
    '''extra int'''
nativefunc upper s Str : Str
    '''return strings.ToUpper(_s)'''
";
        let package = parse(source).unwrap();
        match &package.definitions[0] {
            Definition::Import(i) => {
                assert!(i.native);
                assert_eq!(i.name, "strings");
            }
            other => panic!("unexpected {:?}", other),
        }
        match &package.definitions[1] {
            Definition::Struct(s) => assert_eq!(s.native_code.as_deref(), Some("extra int")),
            other => panic!("unexpected {:?}", other),
        }
        match &package.definitions[2] {
            Definition::Function(f) => {
                assert_eq!(f.native_code.as_deref(), Some("return strings.ToUpper(_s)"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_if_elseif_else() {
        let source = "\
func main
    if (eq 1 2)
        (println 1)
    elseif (eq 2 2)
        (println 2)
    else
        (println 3)
    (println 4)
";
        let package = parse(source).unwrap();
        let main = only_function(&package);
        assert_eq!(main.body.len(), 2);
        match &main.body[0] {
            Stmt::If {
                elseifs, else_body, ..
            } => {
                assert_eq!(elseifs.len(), 1);
                assert_eq!(else_body.as_ref().map(|b| b.len()), Some(1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_typeswitch_and_select() {
        let source = "\
func main
    typeswitch a
        case d Dog
            (println 1)
        default
            (println 2)
    select
        sending ch 1
            (println 3)
        rcving v I ch
            (println v)
";
        let package = parse(source).unwrap();
        let main = only_function(&package);
        match &main.body[0] {
            Stmt::Typeswitch { cases, default, .. } => {
                assert_eq!(cases.len(), 1);
                assert_eq!(cases[0].binding.data_type.name, "Dog");
                assert!(default.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
        match &main.body[1] {
            Stmt::Select { clauses, default, .. } => {
                assert_eq!(clauses.len(), 2);
                assert!(matches!(clauses[1].kind, SelectKind::Rcving { .. }));
                assert!(default.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_loops_and_locals() {
        let source = "\
func main
    locals xs L<I> i I
    foreach i I v I xs
        continue
    forinc j I 0 10
        break
    fordec j I 10 0
        (println j)
    while true
        break
    localfunc twice n I : I
        return (mul n 2)
    go (twice 3)
";
        let package = parse(source).unwrap();
        let main = only_function(&package);
        assert_eq!(main.body.len(), 7);
        assert!(matches!(&main.body[0], Stmt::Locals { vars, .. } if vars.len() == 2));
        assert!(matches!(&main.body[2], Stmt::Forinc { descending: false, .. }));
        assert!(matches!(&main.body[3], Stmt::Forinc { descending: true, .. }));
        assert!(matches!(&main.body[5], Stmt::LocalFunc { func, .. } if func.name == "twice"));
        assert!(matches!(&main.body[6], Stmt::Go { .. }));
    }

    #[test]
    fn test_global() {
        let package = parse("global limit I 10\n").unwrap();
        match &package.definitions[0] {
            Definition::Global(g) => {
                assert_eq!(g.name, "limit");
                assert_eq!(g.data_type.name, "I");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse_error("func main\n    as(f)\n"),
            ("expected space after 'as'".to_string(), 2, 7)
        );
        assert_eq!(
            parse_error("x\n"),
            ("expected definition, found identifier".to_string(), 1, 1)
        );
        assert_eq!(
            parse_error("func main\n        (f)\n"),
            ("unexpected indentation".to_string(), 2, 1)
        );
        assert_eq!(
            parse_error("func main\n    if (f\n        (g)\n"),
            ("expected ')', found end of line".to_string(), 2, 10)
        );
        assert_eq!(
            parse_error("func main\n    as x\n"),
            ("as statement needs at least one target and a value".to_string(), 2, 5)
        );
        assert_eq!(
            parse_error("func main\n    else\n        (f)\n").0,
            "'else' without a matching enclosing statement"
        );
        assert_eq!(
            parse_error("func main\n    go x\n").0,
            "go requires a function or method call"
        );
        assert_eq!(
            parse_error("func main\n   (f)\n").0,
            "indentation must be a multiple of 4 spaces"
        );
    }
}
