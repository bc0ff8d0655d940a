//! Type checker implementation
//!
//! This module checks function bodies and global initializers against the
//! package model and produces the typed tree.

use std::collections::HashMap;

use super::type_def::{format_types, DataType, FunctionType};
use super::typed::*;
use crate::config::CompilerConfig;
use crate::error::{PigeonError, PigeonResult, SourceLocation};
use crate::parser::ast::{self, Expr, Param, SelectKind, Stmt};
use crate::semantic::{Function, Method, Package, TypeNames, Variable};

/// Type environment for tracking local variable types
#[derive(Debug, Clone)]
pub(super) struct TypeEnvironment {
    scopes: Vec<HashMap<String, DataType>>,
    /// First scope owned by the function being checked
    function_base: usize,
}

impl TypeEnvironment {
    fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            function_base: 0,
        }
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    fn define(&mut self, name: String, typ: DataType) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, typ);
        }
    }

    pub(super) fn get(&self, name: &str) -> Option<DataType> {
        for scope in self.scopes.iter().rev() {
            if let Some(typ) = scope.get(name) {
                return Some(typ.clone());
            }
        }
        None
    }

    /// Whether the current function already binds `name`
    fn defined_in_function(&self, name: &str) -> bool {
        self.scopes[self.function_base..]
            .iter()
            .any(|scope| scope.contains_key(name))
    }
}

/// Type checker
pub struct TypeChecker<'a> {
    pub(super) package: &'a Package,
    pub(super) config: &'a CompilerConfig,
    pub(super) names: TypeNames,
    pub(super) env: TypeEnvironment,
    current_function_return_types: Vec<DataType>,
    loop_depth: usize,
}

impl<'a> TypeChecker<'a> {
    pub fn new(package: &'a Package, config: &'a CompilerConfig) -> Self {
        Self {
            package,
            config,
            names: TypeNames::from_package(package),
            env: TypeEnvironment::new(),
            current_function_return_types: Vec::new(),
            loop_depth: 0,
        }
    }

    /// Check every body in the package and produce the typed tree
    pub fn check(&mut self) -> PigeonResult<CheckedPackage> {
        let entry = self.check_entry()?;

        let mut globals = Vec::with_capacity(self.package.globals.len());
        for global in self.package.globals.values() {
            self.env = TypeEnvironment::new();
            let value = self.check_value(&global.value)?;
            if !self.is_assignable(value.data_type(), &global.data_type) {
                return Err(PigeonError::type_error(
                    format!(
                        "global '{}' is {} but its value is {}",
                        global.name,
                        global.data_type,
                        value.data_type()
                    ),
                    value.location.clone(),
                ));
            }
            globals.push(CheckedGlobal {
                name: global.name.clone(),
                data_type: global.data_type.clone(),
                value,
                location: global.location.clone(),
            });
        }

        let mut functions = Vec::with_capacity(self.package.functions.len());
        for function in self.package.functions.values() {
            functions.push(self.check_top_function(function)?);
        }

        let mut methods = Vec::with_capacity(self.package.methods.len());
        for method in self.package.methods.values() {
            methods.push(self.check_method(method)?);
        }

        tracing::debug!(
            globals = globals.len(),
            functions = functions.len(),
            methods = methods.len(),
            "type checked package"
        );

        Ok(CheckedPackage {
            dialect: self.config.dialect,
            imports: self.package.imports.values().cloned().collect(),
            structs: self.package.structs.clone(),
            interfaces: self.package.interfaces.clone(),
            globals,
            functions,
            methods,
            entry,
        })
    }

    fn check_entry(&self) -> PigeonResult<Option<String>> {
        if !self.config.require_entry {
            return Ok(None);
        }
        let name = &self.config.entry_function;
        let function = self.package.functions.get(name).ok_or_else(|| {
            PigeonError::semantic_error(
                format!("missing entry function '{}'", name),
                SourceLocation::at(1, 1),
            )
        })?;
        if !function.params.is_empty() || !function.signature.return_types.is_empty() {
            return Err(PigeonError::type_error(
                format!(
                    "entry function '{}' must take no parameters and return nothing",
                    name
                ),
                function.location.clone(),
            ));
        }
        Ok(Some(name.clone()))
    }

    fn check_top_function(&mut self, function: &Function) -> PigeonResult<CheckedFunction> {
        if let Some(code) = &function.native_code {
            return Ok(CheckedFunction {
                name: function.name.clone(),
                params: function.params.clone(),
                return_types: function.signature.return_types.clone(),
                body: Vec::new(),
                native_code: Some(code.clone()),
                location: function.location.clone(),
            });
        }

        self.env = TypeEnvironment::new();
        self.check_function(
            &function.name,
            &function.params,
            &function.signature.return_types,
            &function.body,
            &function.location,
        )
    }

    fn check_method(&mut self, method: &Method) -> PigeonResult<CheckedMethod> {
        self.env = TypeEnvironment::new();
        self.env
            .define(method.receiver.name.clone(), method.receiver.data_type.clone());
        let function = self.check_function(
            &method.name,
            &method.params,
            &method.signature.return_types,
            &method.body,
            &method.location,
        )?;
        Ok(CheckedMethod {
            receiver: method.receiver.clone(),
            receiver_struct: method.receiver_struct.clone(),
            function,
        })
    }

    /// Check a body in the current environment with its parameters bound
    fn check_function(
        &mut self,
        name: &str,
        params: &[Variable],
        return_types: &[DataType],
        body: &[Stmt],
        location: &SourceLocation,
    ) -> PigeonResult<CheckedFunction> {
        for param in params {
            self.env.define(param.name.clone(), param.data_type.clone());
        }

        let previous_returns =
            std::mem::replace(&mut self.current_function_return_types, return_types.to_vec());
        let previous_depth = std::mem::replace(&mut self.loop_depth, 0);

        let checked = self.check_block(body, true);

        self.current_function_return_types = previous_returns;
        self.loop_depth = previous_depth;
        let checked = checked?;

        if !return_types.is_empty() && !matches!(body.last(), Some(Stmt::Return { .. })) {
            return Err(PigeonError::type_error(
                format!("function '{}' must end with a return statement", name),
                location.clone(),
            ));
        }

        Ok(CheckedFunction {
            name: name.to_string(),
            params: params.to_vec(),
            return_types: return_types.to_vec(),
            body: checked,
            native_code: None,
            location: location.clone(),
        })
    }

    // ===== Statements =====

    fn check_block(&mut self, body: &[Stmt], function_body: bool) -> PigeonResult<Vec<TypedStmt>> {
        self.env.push_scope();
        let result = self.check_statements(body, function_body);
        self.env.pop_scope();
        result
    }

    fn check_statements(
        &mut self,
        body: &[Stmt],
        function_body: bool,
    ) -> PigeonResult<Vec<TypedStmt>> {
        let mut checked = Vec::with_capacity(body.len());
        for (i, stmt) in body.iter().enumerate() {
            if matches!(stmt, Stmt::Locals { .. }) && !(function_body && i == 0) {
                return Err(PigeonError::syntax_error(
                    "locals must be the first statement of a function body",
                    stmt.location().clone(),
                ));
            }
            checked.push(self.check_stmt(stmt)?);
        }
        Ok(checked)
    }

    /// Check a nested body: a fresh scope, with `bindings` defined in it
    fn check_scoped(
        &mut self,
        bindings: &[&Variable],
        body: &[Stmt],
        in_loop: bool,
    ) -> PigeonResult<Vec<TypedStmt>> {
        self.env.push_scope();
        let result = self.check_scoped_inner(bindings, body, in_loop);
        self.env.pop_scope();
        result
    }

    fn check_scoped_inner(
        &mut self,
        bindings: &[&Variable],
        body: &[Stmt],
        in_loop: bool,
    ) -> PigeonResult<Vec<TypedStmt>> {
        for binding in bindings {
            self.define_local(binding)?;
        }
        if in_loop {
            self.loop_depth += 1;
        }
        let result = self.check_block(body, false);
        if in_loop {
            self.loop_depth -= 1;
        }
        result
    }

    /// Check a statement
    fn check_stmt(&mut self, stmt: &Stmt) -> PigeonResult<TypedStmt> {
        let location = stmt.location().clone();

        let kind = match stmt {
            Stmt::Locals { vars, .. } => {
                let mut locals = Vec::with_capacity(vars.len());
                for param in vars {
                    let variable = self.variable(param)?;
                    self.define_local(&variable)?;
                    locals.push(variable);
                }
                StmtKind::Locals(locals)
            }

            Stmt::LocalFunc { func, .. } => StmtKind::LocalFunc(Box::new(self.check_local_func(func)?)),

            Stmt::If {
                condition,
                body,
                elseifs,
                else_body,
                ..
            } => {
                let condition = self.check_condition(condition)?;
                let body = self.check_block(body, false)?;
                let mut checked_elseifs = Vec::with_capacity(elseifs.len());
                for clause in elseifs {
                    let condition = self.check_condition(&clause.condition)?;
                    let body = self.check_block(&clause.body, false)?;
                    checked_elseifs.push((condition, body));
                }
                let else_body = match else_body {
                    Some(body) => Some(self.check_block(body, false)?),
                    None => None,
                };
                StmtKind::If {
                    condition,
                    body,
                    elseifs: checked_elseifs,
                    else_body,
                }
            }

            Stmt::While { condition, body, .. } => {
                let condition = self.check_condition(condition)?;
                let body = self.check_scoped(&[], body, true)?;
                StmtKind::While { condition, body }
            }

            Stmt::Foreach {
                index,
                value,
                collection,
                body,
                ..
            } => {
                let index = self.variable(index)?;
                let value = self.variable(value)?;
                let collection = self.check_value(collection)?;
                self.check_foreach_types(&index, &value, &collection)?;
                let body = self.check_scoped(&[&index, &value], body, true)?;
                StmtKind::Foreach {
                    index,
                    value,
                    collection,
                    body,
                }
            }

            Stmt::Forinc {
                var,
                start,
                end,
                descending,
                body,
                ..
            } => {
                let var = self.variable(var)?;
                if !self.is_dynamic() && !var.data_type.is_integer() {
                    return Err(PigeonError::type_error(
                        format!("loop counter must be an integer type, found {}", var.data_type),
                        var.location.clone(),
                    ));
                }
                let start = self.check_value(start)?;
                let end = self.check_value(end)?;
                for bound in [&start, &end] {
                    if !self.is_assignable(bound.data_type(), &var.data_type) {
                        return Err(PigeonError::type_error(
                            format!(
                                "loop bound must be {}, found {}",
                                var.data_type,
                                bound.data_type()
                            ),
                            bound.location.clone(),
                        ));
                    }
                }
                let body = self.check_scoped(&[&var], body, true)?;
                StmtKind::Forinc {
                    var,
                    start,
                    end,
                    descending: *descending,
                    body,
                }
            }

            Stmt::Typeswitch {
                subject,
                cases,
                default,
                ..
            } => self.check_typeswitch(subject, cases, default.as_deref(), &location)?,

            Stmt::Select {
                clauses, default, ..
            } => self.check_select(clauses, default.as_deref(), &location)?,

            Stmt::Assignment { targets, value, .. } => {
                self.check_assignment(targets, value, &location)?
            }

            Stmt::Return { values, .. } => self.check_return(values, &location)?,

            Stmt::Break { .. } | Stmt::Continue { .. } => {
                let is_break = matches!(stmt, Stmt::Break { .. });
                if self.loop_depth == 0 {
                    let word = if is_break { "break" } else { "continue" };
                    return Err(PigeonError::type_error(
                        format!("{} outside of a loop", word),
                        location,
                    ));
                }
                if is_break {
                    StmtKind::Break
                } else {
                    StmtKind::Continue
                }
            }

            Stmt::Go { call, .. } => StmtKind::Go(self.check_expr(call)?),

            Stmt::Expression { expr, .. } => {
                if let Expr::Operation { operator, .. } = expr {
                    if !operator.is_statement() {
                        return Err(PigeonError::type_error(
                            format!("operation '{}' cannot be used as a statement", operator),
                            location,
                        ));
                    }
                } else if !expr.is_call() {
                    return Err(PigeonError::type_error(
                        "only calls and set, push, print, println, prompt, send or rcv operations can be statements",
                        location,
                    ));
                }
                StmtKind::Expression(self.check_expr(expr)?)
            }
        };

        Ok(TypedStmt { kind, location })
    }

    fn check_local_func(&mut self, func: &ast::FunctionDefinition) -> PigeonResult<CheckedFunction> {
        let params = self.parameters(&func.params)?;
        let return_types = func
            .return_types
            .iter()
            .map(|t| self.declared_type(t))
            .collect::<PigeonResult<Vec<_>>>()?;

        let function_type = DataType::Function(FunctionType::new(
            params.iter().map(|p| p.data_type.clone()).collect(),
            return_types.clone(),
        ));
        self.define_local(&Variable {
            name: func.name.clone(),
            data_type: function_type,
            location: func.location.clone(),
        })?;

        // the closure sees enclosing locals but owns a fresh set of names
        let saved_base = self.env.function_base;
        self.env.push_scope();
        self.env.function_base = self.env.scopes.len() - 1;
        let result = self.check_function(
            &func.name,
            &params,
            &return_types,
            &func.body,
            &func.location,
        );
        self.env.pop_scope();
        self.env.function_base = saved_base;
        result
    }

    fn check_condition(&mut self, condition: &Expr) -> PigeonResult<TypedExpr> {
        let checked = self.check_value(condition)?;
        if !self.is_dynamic() && *checked.data_type() != DataType::BOOL {
            return Err(PigeonError::type_error(
                format!("condition must be Bool, found {}", checked.data_type()),
                checked.location.clone(),
            ));
        }
        Ok(checked)
    }

    fn check_foreach_types(
        &self,
        index: &Variable,
        value: &Variable,
        collection: &TypedExpr,
    ) -> PigeonResult<()> {
        if self.is_dynamic() {
            return Ok(());
        }

        let (index_ok, element) = match collection.data_type() {
            DataType::List(element) | DataType::Slice(element) | DataType::Array(_, element) => {
                (index.data_type.is_numeric(), element.as_ref())
            }
            DataType::Map(key, element) => {
                (self.is_assignable(key, &index.data_type), element.as_ref())
            }
            other => {
                return Err(PigeonError::type_error(
                    format!("foreach requires a list, slice, array or map, found {}", other),
                    collection.location.clone(),
                ))
            }
        };

        if !index_ok {
            return Err(PigeonError::type_error(
                format!(
                    "foreach index cannot be {} when iterating {}",
                    index.data_type,
                    collection.data_type()
                ),
                index.location.clone(),
            ));
        }
        if !self.is_assignable(element, &value.data_type) {
            return Err(PigeonError::type_error(
                format!(
                    "foreach value must hold {}, found {}",
                    element, value.data_type
                ),
                value.location.clone(),
            ));
        }
        Ok(())
    }

    fn check_typeswitch(
        &mut self,
        subject: &Expr,
        cases: &[ast::TypeCase],
        default: Option<&[Stmt]>,
        location: &SourceLocation,
    ) -> PigeonResult<StmtKind> {
        self.reject_dynamic("typeswitch", location)?;

        let subject = self.check_value(subject)?;
        let subject_type = subject.data_type().clone();
        if !subject_type.is_interface_like() {
            return Err(PigeonError::type_error(
                format!("typeswitch requires an interface value, found {}", subject_type),
                subject.location.clone(),
            ));
        }

        let mut checked_cases: Vec<(Variable, Vec<TypedStmt>)> = Vec::with_capacity(cases.len());
        for case in cases {
            let binding = self.variable(&case.binding)?;
            if checked_cases
                .iter()
                .any(|(seen, _)| seen.data_type == binding.data_type)
            {
                return Err(PigeonError::type_error(
                    format!("duplicate case type {}", binding.data_type),
                    case.binding.data_type.location.clone(),
                ));
            }
            if !self.is_assignable(&binding.data_type, &subject_type) {
                return Err(PigeonError::type_error(
                    format!("{} does not implement {}", binding.data_type, subject_type),
                    case.binding.data_type.location.clone(),
                ));
            }
            let body = self.check_scoped(&[&binding], &case.body, false)?;
            checked_cases.push((binding, body));
        }

        let default = match default {
            Some(body) => Some(self.check_block(body, false)?),
            None => None,
        };

        Ok(StmtKind::Typeswitch {
            subject,
            cases: checked_cases,
            default,
        })
    }

    fn check_select(
        &mut self,
        clauses: &[ast::SelectClause],
        default: Option<&[Stmt]>,
        location: &SourceLocation,
    ) -> PigeonResult<StmtKind> {
        self.reject_dynamic("select", location)?;

        let mut checked = Vec::with_capacity(clauses.len());
        for clause in clauses {
            match &clause.kind {
                SelectKind::Sending { channel, value } => {
                    let channel = self.check_value(channel)?;
                    let element = self.channel_element(&channel)?;
                    let value = self.check_value(value)?;
                    self.expect_assignable(&value, &element, "send")?;
                    let body = self.check_block(&clause.body, false)?;
                    checked.push(TypedSelectClause::Sending {
                        channel,
                        value,
                        body,
                    });
                }
                SelectKind::Rcving { binding, channel } => {
                    let binding = self.variable(binding)?;
                    let channel = self.check_value(channel)?;
                    let element = self.channel_element(&channel)?;
                    if element != binding.data_type {
                        return Err(PigeonError::type_error(
                            format!(
                                "received value is {}, but the binding is {}",
                                element, binding.data_type
                            ),
                            binding.location.clone(),
                        ));
                    }
                    let body = self.check_scoped(&[&binding], &clause.body, false)?;
                    checked.push(TypedSelectClause::Rcving {
                        binding,
                        channel,
                        body,
                    });
                }
            }
        }

        let default = match default {
            Some(body) => Some(self.check_block(body, false)?),
            None => None,
        };

        Ok(StmtKind::Select {
            clauses: checked,
            default,
        })
    }

    fn check_assignment(
        &mut self,
        targets: &[Expr],
        value: &Expr,
        location: &SourceLocation,
    ) -> PigeonResult<StmtKind> {
        let value = self.check_expr(value)?;
        if value.types.len() != targets.len() {
            return Err(PigeonError::type_error(
                format!(
                    "assignment to {} target{} but the value yields {}",
                    targets.len(),
                    if targets.len() == 1 { "" } else { "s" },
                    format_types(&value.types)
                ),
                location.clone(),
            ));
        }

        let mut checked_targets = Vec::with_capacity(targets.len());
        for (target, source_type) in targets.iter().zip(&value.types) {
            let (checked, target_type) = self.check_target(target)?;
            if !self.is_assignable(source_type, &target_type) {
                return Err(PigeonError::type_error(
                    format!("cannot assign {} to {}", source_type, target_type),
                    target.location().clone(),
                ));
            }
            checked_targets.push(checked);
        }

        Ok(StmtKind::Assignment {
            targets: checked_targets,
            value,
        })
    }

    fn check_return(&mut self, values: &[Expr], location: &SourceLocation) -> PigeonResult<StmtKind> {
        let checked = values
            .iter()
            .map(|v| self.check_expr(v))
            .collect::<PigeonResult<Vec<_>>>()?;

        // a single call may supply every value
        let yielded: Vec<DataType> = match checked.as_slice() {
            [single] => single.types.clone(),
            many => {
                for value in many {
                    if value.types.len() != 1 {
                        return Err(self.single_value_error(value));
                    }
                }
                many.iter().map(|v| v.data_type().clone()).collect()
            }
        };

        let expected = &self.current_function_return_types;
        if yielded.len() != expected.len() {
            return Err(PigeonError::type_error(
                format!(
                    "return expects {} but found {}",
                    format_types(expected),
                    format_types(&yielded)
                ),
                location.clone(),
            ));
        }
        for (i, (actual, wanted)) in yielded.iter().zip(expected).enumerate() {
            if !self.is_assignable(actual, wanted) {
                let at = checked
                    .get(i)
                    .or(checked.first())
                    .map_or_else(|| location.clone(), |v| v.location.clone());
                return Err(PigeonError::type_error(
                    format!("cannot return {} as {}", actual, wanted),
                    at,
                ));
            }
        }

        Ok(StmtKind::Return(checked))
    }

    // ===== Helpers =====

    pub(super) fn is_dynamic(&self) -> bool {
        self.config.is_dynamic()
    }

    pub(super) fn is_assignable(&self, child: &DataType, parent: &DataType) -> bool {
        self.is_dynamic() || self.package.is_assignable(child, parent)
    }

    pub(super) fn reject_dynamic(&self, what: &str, location: &SourceLocation) -> PigeonResult<()> {
        if self.is_dynamic() {
            return Err(PigeonError::semantic_error(
                format!("{} is not supported in the dynamic dialect", what),
                location.clone(),
            ));
        }
        Ok(())
    }

    /// Resolve a declared type; the dynamic dialect erases it to `Any`
    pub(super) fn declared_type(&self, parsed: &ast::ParsedDataType) -> PigeonResult<DataType> {
        let resolved = self.names.resolve(parsed)?;
        Ok(if self.is_dynamic() { DataType::ANY } else { resolved })
    }

    fn variable(&self, param: &Param) -> PigeonResult<Variable> {
        Ok(Variable {
            name: param.name.clone(),
            data_type: self.declared_type(&param.data_type)?,
            location: param.location.clone(),
        })
    }

    fn parameters(&self, params: &[Param]) -> PigeonResult<Vec<Variable>> {
        let mut variables: Vec<Variable> = Vec::with_capacity(params.len());
        for param in params {
            if variables.iter().any(|v| v.name == param.name) {
                return Err(PigeonError::semantic_error(
                    format!("duplicate parameter '{}'", param.name),
                    param.location.clone(),
                ));
            }
            variables.push(self.variable(param)?);
        }
        Ok(variables)
    }

    fn define_local(&mut self, variable: &Variable) -> PigeonResult<()> {
        if self.env.defined_in_function(&variable.name) {
            return Err(PigeonError::semantic_error(
                format!("local '{}' is already defined", variable.name),
                variable.location.clone(),
            ));
        }
        self.env
            .define(variable.name.clone(), variable.data_type.clone());
        Ok(())
    }

    pub(super) fn channel_element(&self, channel: &TypedExpr) -> PigeonResult<DataType> {
        match channel.data_type() {
            DataType::Channel(element) => Ok(element.as_ref().clone()),
            _ if self.is_dynamic() => Ok(DataType::ANY),
            other => Err(PigeonError::type_error(
                format!("expected a channel, found {}", other),
                channel.location.clone(),
            )),
        }
    }

    pub(super) fn expect_assignable(
        &self,
        value: &TypedExpr,
        expected: &DataType,
        context: &str,
    ) -> PigeonResult<()> {
        if self.is_assignable(value.data_type(), expected) {
            Ok(())
        } else {
            Err(PigeonError::type_error(
                format!(
                    "{} expects {}, found {}",
                    context,
                    expected,
                    value.data_type()
                ),
                value.location.clone(),
            ))
        }
    }

    pub(super) fn single_value_error(&self, value: &TypedExpr) -> PigeonError {
        let message = if value.types.is_empty() {
            "expression yields no value".to_string()
        } else {
            format!(
                "expression yields {} values where one is expected",
                value.types.len()
            )
        };
        PigeonError::type_error(message, value.location.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::semantic;
    use pretty_assertions::assert_eq;

    fn check_with(source: &str, config: &CompilerConfig) -> PigeonResult<CheckedPackage> {
        let tokens = Lexer::new(source, None).tokenize()?;
        let parsed = Parser::new(tokens).parse()?;
        let package = semantic::build(parsed, config)?;
        TypeChecker::new(&package, config).check()
    }

    fn check_source(source: &str) -> PigeonResult<CheckedPackage> {
        check_with(source, &CompilerConfig::new())
    }

    fn check_error(source: &str) -> (String, usize, usize) {
        let err = check_source(source).unwrap_err();
        let location = err.location().unwrap().clone();
        (err.message().to_string(), location.line, location.column)
    }

    fn main_body(package: &CheckedPackage) -> &[TypedStmt] {
        &package.functions.iter().find(|f| f.name == "main").unwrap().body
    }

    const ANIMAL: &str = "\
interface Animal
    speak : Str
struct Dog
    name Str
method speak d Dog : Str
    return \"woof\"
";

    #[test]
    fn test_hello() {
        let package = check_source("func main\n    (println \"hi\")\n").unwrap();
        assert_eq!(package.entry.as_deref(), Some("main"));
        assert!(matches!(main_body(&package)[0].kind, StmtKind::Expression(_)));
    }

    #[test]
    fn test_typeswitch_flow_typing() {
        let source = format!(
            "{}func main\n    locals a Animal\n    as a (Dog \"Rex\")\n    typeswitch a\n        case d Dog\n            (println (. d name) (.speak d))\n",
            ANIMAL
        );
        let package = check_source(&source).unwrap();
        match &main_body(&package)[2].kind {
            StmtKind::Typeswitch { cases, .. } => {
                assert_eq!(cases[0].0.data_type, DataType::Struct("Dog".into()));
                match &cases[0].1[0].kind {
                    StmtKind::Expression(TypedExpr {
                        kind: ExprKind::Operation { operands, .. },
                        ..
                    }) => {
                        assert_eq!(operands[0].types, vec![DataType::STR]);
                        assert_eq!(operands[1].types, vec![DataType::STR]);
                    }
                    other => panic!("unexpected {:?}", other),
                }
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_interface_mismatch_rejects_assignment() {
        let source = "\
interface Animal
    speak : Str
struct Dog
    name Str
method speak d Dog : I
    return 1
func main
    locals a Animal
    as a (Dog \"Rex\")
";
        assert_eq!(
            check_error(source),
            ("cannot assign Dog to Animal".to_string(), 9, 8)
        );
    }

    #[test]
    fn test_assignment_arity() {
        let source = "\
func pair : I Str
    return 1 \"a\"
func main
    locals x I y Str
    as x y (pair)
    as x (pair)
";
        assert_eq!(
            check_error(source),
            (
                "assignment to 1 target but the value yields (I, Str)".to_string(),
                6,
                5
            )
        );
    }

    #[test]
    fn test_return_rules() {
        assert_eq!(
            check_error("func f : I\n    (println 1)\nfunc main\n    (f)\n").0,
            "function 'f' must end with a return statement"
        );
        assert_eq!(
            check_error("func f : I\n    return \"a\"\nfunc main\n    (f)\n").0,
            "cannot return Str as I"
        );
        assert_eq!(
            check_error("func f : I Str\n    return 1\nfunc main\n    (f)\n").0,
            "return expects (I, Str) but found I"
        );
        assert!(check_source(
            "func g : I Err\n    return (parseInt \"1\")\nfunc main\n    (g)\n"
        )
        .is_ok());
    }

    #[test]
    fn test_control_flow_errors() {
        assert_eq!(
            check_error("func main\n    if 1\n        (println 1)\n").0,
            "condition must be Bool, found I"
        );
        assert_eq!(
            check_error("func main\n    break\n"),
            ("break outside of a loop".to_string(), 2, 5)
        );
        assert_eq!(
            check_error("func main\n    (println 1)\n    locals x I\n").0,
            "locals must be the first statement of a function body"
        );
        assert_eq!(
            check_error("func main\n    (add 1 2)\n").0,
            "operation 'add' cannot be used as a statement"
        );
    }

    #[test]
    fn test_loops() {
        let source = "\
func main
    locals xs L<I> m M<Str F>
    foreach i I v I xs
        if (gt v 1)
            continue
    foreach k Str f F m
        (println k f)
    forinc i I 0 (len xs)
        break
    fordec i I 10 0
        (println i)
";
        assert!(check_source(source).is_ok());

        assert_eq!(
            check_error("func main\n    locals m M<Str F>\n    foreach k I f F m\n        (println k)\n").0,
            "foreach index cannot be I when iterating M<Str F>"
        );
        assert_eq!(
            check_error("func main\n    forinc i F 0 1\n        (println i)\n").0,
            "loop counter must be an integer type, found F"
        );
    }

    #[test]
    fn test_typeswitch_errors() {
        let cat = format!("{}struct Cat\n    n I\n", ANIMAL);
        assert_eq!(
            check_error(&format!(
                "{}func main\n    locals a Animal\n    typeswitch a\n        case c Cat\n            (println 1)\n",
                cat
            ))
            .0,
            "Cat does not implement Animal"
        );
        assert_eq!(
            check_error(&format!(
                "{}func main\n    locals a Animal\n    typeswitch a\n        case d Dog\n            (println 1)\n        case e Dog\n            (println 2)\n",
                ANIMAL
            ))
            .0,
            "duplicate case type Dog"
        );
        assert_eq!(
            check_error("func main\n    locals n I\n    typeswitch n\n        case v I\n            (println v)\n").0,
            "typeswitch requires an interface value, found I"
        );
    }

    #[test]
    fn test_select() {
        let source = "\
func main
    locals ch Ch<I>
    select
        sending ch 1
            (println 1)
        rcving v I ch
            (println v)
        default
            (println 0)
";
        assert!(check_source(source).is_ok());
        assert_eq!(
            check_error("func main\n    locals ch Ch<I>\n    select\n        rcving v Str ch\n            (println v)\n").0,
            "received value is I, but the binding is Str"
        );
    }

    #[test]
    fn test_local_func() {
        let source = "\
func main
    locals total I
    localfunc fact n I : I
        if (lte n 1)
            return 1
        return (mul n (fact (sub n 1)))
    as total (fact 5)
";
        let package = check_source(source).unwrap();
        assert!(matches!(main_body(&package)[1].kind, StmtKind::LocalFunc(_)));
    }

    #[test]
    fn test_locals_cannot_repeat() {
        assert_eq!(
            check_error("func main\n    locals x I\n    forinc x I 0 3\n        (println x)\n").0,
            "local 'x' is already defined"
        );
    }

    #[test]
    fn test_entry_function() {
        assert_eq!(
            check_error("func helper\n    (println 1)\n"),
            ("missing entry function 'main'".to_string(), 1, 1)
        );
        assert_eq!(
            check_error("func main a I\n    (println a)\n").0,
            "entry function 'main' must take no parameters and return nothing"
        );
        assert!(check_with("func helper\n    (println 1)\n", &CompilerConfig::library()).is_ok());
    }

    #[test]
    fn test_globals() {
        let package = check_source("global limit I 10\nfunc main\n    (println limit)\n").unwrap();
        assert_eq!(package.globals[0].value.types, vec![DataType::INT]);
        assert_eq!(
            check_error("global limit I \"ten\"\nfunc main\n    (println limit)\n").0,
            "global 'limit' is I but its value is Str"
        );
    }

    #[test]
    fn test_dynamic_dialect() {
        let config = CompilerConfig::dynamic();
        let source = "\
func main
    locals x I
    as x (add 1 \"a\")
    if x
        (println x)
";
        assert!(check_with(source, &config).is_ok());

        let err = check_with(
            "func main\n    locals x I\n    typeswitch x\n        case v I\n            (println v)\n",
            &config,
        )
        .unwrap_err();
        assert_eq!(err.message(), "typeswitch is not supported in the dynamic dialect");
    }
}
