//! Expression checking: names, literals, calls and type expressions.

use super::checker::TypeChecker;
use super::operators::is_addressable;
use super::type_def::{DataType, FunctionType, Scalar};
use super::typed::{AssignTarget, ExprKind, TypedExpr};
use crate::error::{PigeonError, PigeonResult, SourceLocation};
use crate::lexer::Operator;
use crate::parser::ast::{Expr, Literal};

impl<'a> TypeChecker<'a> {
    /// Check an expression and compute the types it yields
    pub(super) fn check_expr(&mut self, expr: &Expr) -> PigeonResult<TypedExpr> {
        let mut checked = self.check_expr_kind(expr)?;
        if self.is_dynamic() {
            // function values keep their arity so calls can still be checked
            for t in checked.types.iter_mut() {
                if !matches!(t, DataType::Function(_)) {
                    *t = DataType::ANY;
                }
            }
        }
        Ok(checked)
    }

    /// Check an expression that must yield exactly one value
    pub(super) fn check_value(&mut self, expr: &Expr) -> PigeonResult<TypedExpr> {
        let checked = self.check_expr(expr)?;
        if checked.types.len() != 1 {
            return Err(self.single_value_error(&checked));
        }
        Ok(checked)
    }

    fn check_expr_kind(&mut self, expr: &Expr) -> PigeonResult<TypedExpr> {
        match expr {
            Expr::Identifier { name, location } => self.check_identifier(name, location),

            Expr::Literal { value, location } => {
                let location = location.clone();
                Ok(match value {
                    Literal::Number(text) if text.contains('.') => {
                        TypedExpr::new(ExprKind::Float(text.clone()), vec![DataType::FLOAT], location)
                    }
                    Literal::Number(text) => {
                        if text.parse::<i64>().is_err() {
                            return Err(PigeonError::type_error(
                                format!("integer literal {} is out of range", text),
                                location,
                            ));
                        }
                        TypedExpr::new(ExprKind::Int(text.clone()), vec![DataType::INT], location)
                    }
                    Literal::String(text) => {
                        TypedExpr::new(ExprKind::Str(text.clone()), vec![DataType::STR], location)
                    }
                    Literal::MultiLineString(text) => {
                        TypedExpr::new(ExprKind::RawStr(text.clone()), vec![DataType::STR], location)
                    }
                    Literal::Boolean(b) => {
                        TypedExpr::new(ExprKind::Bool(*b), vec![DataType::BOOL], location)
                    }
                    Literal::Nil => TypedExpr::new(ExprKind::Nil, vec![DataType::Nil], location),
                })
            }

            Expr::Operation {
                operator,
                operands,
                location,
            } => self.check_operation(*operator, operands, location),

            Expr::FunctionCall {
                callee,
                arguments,
                location,
            } => {
                let callee = self.check_value(callee)?;
                let signature = match callee.data_type() {
                    DataType::Function(signature) => signature.clone(),
                    other => {
                        return Err(PigeonError::type_error(
                            format!("cannot call a value of type {}", other),
                            callee.location.clone(),
                        ))
                    }
                };
                let description = match &callee.kind {
                    ExprKind::Function(name) | ExprKind::Local(name) | ExprKind::Global(name) => {
                        format!("function '{}'", name)
                    }
                    _ => "function value".to_string(),
                };
                let arguments = self.check_arguments(&signature, arguments, location, &description)?;
                Ok(TypedExpr::new(
                    ExprKind::FunctionCall {
                        callee: Box::new(callee),
                        arguments,
                    },
                    signature.return_types,
                    location.clone(),
                ))
            }

            Expr::MethodCall {
                method,
                receiver,
                arguments,
                location,
            } => {
                self.reject_dynamic("method call", location)?;
                let receiver = self.check_value(receiver)?;
                let signature = self
                    .package
                    .method_signature(receiver.data_type(), method)
                    .cloned()
                    .ok_or_else(|| {
                        PigeonError::type_error(
                            format!("type {} has no method '{}'", receiver.data_type(), method),
                            location.clone(),
                        )
                    })?;
                let description = format!("method '{}'", method);
                let arguments = self.check_arguments(&signature, arguments, location, &description)?;
                Ok(TypedExpr::new(
                    ExprKind::MethodCall {
                        receiver: Box::new(receiver),
                        method: method.clone(),
                        arguments,
                    },
                    signature.return_types,
                    location.clone(),
                ))
            }

            Expr::TypeExpression {
                data_type,
                arguments,
                location,
            } => {
                let data_type = self.names.resolve(data_type)?;
                self.check_construct(data_type, arguments, location)
            }

            Expr::DataType { data_type, location } => Err(PigeonError::type_error(
                format!("type {} cannot be used as a value", data_type),
                location.clone(),
            )),
        }
    }

    fn check_identifier(&self, name: &str, location: &SourceLocation) -> PigeonResult<TypedExpr> {
        let location = location.clone();
        if let Some(t) = self.env.get(name) {
            return Ok(TypedExpr::new(ExprKind::Local(name.to_string()), vec![t], location));
        }
        if let Some(global) = self.package.globals.get(name) {
            return Ok(TypedExpr::new(
                ExprKind::Global(name.to_string()),
                vec![global.data_type.clone()],
                location,
            ));
        }
        if let Some(function) = self.package.functions.get(name) {
            return Ok(TypedExpr::new(
                ExprKind::Function(name.to_string()),
                vec![DataType::Function(function.signature.clone())],
                location,
            ));
        }
        if self.package.imports.contains_key(name) {
            return Err(PigeonError::semantic_error(
                format!("imported package '{}' cannot be used as a value", name),
                location,
            ));
        }
        Err(PigeonError::semantic_error(
            format!("undefined name '{}'", name),
            location,
        ))
    }

    fn check_arguments(
        &mut self,
        signature: &FunctionType,
        arguments: &[Expr],
        location: &SourceLocation,
        description: &str,
    ) -> PigeonResult<Vec<TypedExpr>> {
        if arguments.len() != signature.params.len() {
            return Err(PigeonError::type_error(
                format!(
                    "{} expects {} argument{}, found {}",
                    description,
                    signature.params.len(),
                    if signature.params.len() == 1 { "" } else { "s" },
                    arguments.len()
                ),
                location.clone(),
            ));
        }

        let mut checked = Vec::with_capacity(arguments.len());
        for (i, (argument, param)) in arguments.iter().zip(&signature.params).enumerate() {
            let argument = self.check_value(argument)?;
            self.expect_assignable(&argument, param, &format!("argument {} of {}", i + 1, description))?;
            checked.push(argument);
        }
        Ok(checked)
    }

    /// `(T args...)`: construction of containers and structs, or conversion
    fn check_construct(
        &mut self,
        data_type: DataType,
        arguments: &[Expr],
        location: &SourceLocation,
    ) -> PigeonResult<TypedExpr> {
        let checked = arguments
            .iter()
            .map(|a| self.check_value(a))
            .collect::<PigeonResult<Vec<_>>>()?;
        let dynamic = self.is_dynamic();

        match &data_type {
            DataType::Scalar(Scalar::I | Scalar::F | Scalar::Byte) => {
                let source = self.conversion_source(&data_type, &checked, location)?;
                if !dynamic && !source.data_type().is_numeric() {
                    return Err(self.conversion_error(&data_type, source));
                }
            }
            DataType::Scalar(Scalar::Str) => {
                let source = self.conversion_source(&data_type, &checked, location)?;
                let convertible = match source.data_type() {
                    DataType::Scalar(Scalar::Str) => true,
                    DataType::List(element) => {
                        matches!(element.as_ref(), DataType::Scalar(Scalar::I | Scalar::Str))
                    }
                    DataType::Slice(element) => matches!(
                        element.as_ref(),
                        DataType::Scalar(Scalar::I | Scalar::Str | Scalar::Byte)
                    ),
                    _ => dynamic,
                };
                if !convertible {
                    return Err(self.conversion_error(&data_type, source));
                }
            }
            DataType::List(element) | DataType::Slice(element) => {
                for argument in &checked {
                    self.expect_assignable(argument, element, &format!("{}", data_type))?;
                }
            }
            DataType::Array(size, element) => {
                if checked.len() != *size {
                    return Err(PigeonError::type_error(
                        format!(
                            "{} takes exactly {} element{}, found {}",
                            data_type,
                            size,
                            if *size == 1 { "" } else { "s" },
                            checked.len()
                        ),
                        location.clone(),
                    ));
                }
                for argument in &checked {
                    self.expect_assignable(argument, element, &format!("{}", data_type))?;
                }
            }
            DataType::Map(key, value) => {
                if checked.len() % 2 != 0 {
                    return Err(PigeonError::type_error(
                        format!("{} takes key value pairs, found {} arguments", data_type, checked.len()),
                        location.clone(),
                    ));
                }
                for pair in checked.chunks(2) {
                    self.expect_assignable(&pair[0], key, &format!("{} key", data_type))?;
                    self.expect_assignable(&pair[1], value, &format!("{} value", data_type))?;
                }
            }
            DataType::Channel(_) => {
                if checked.len() > 1 {
                    return Err(PigeonError::type_error(
                        format!("{} takes at most one buffer size, found {} arguments", data_type, checked.len()),
                        checked[1].location.clone(),
                    ));
                }
                if let Some(size) = checked.first() {
                    if !dynamic && !size.data_type().is_integer() {
                        return Err(PigeonError::type_error(
                            format!("channel buffer size must be an integer, found {}", size.data_type()),
                            size.location.clone(),
                        ));
                    }
                }
            }
            DataType::Struct(name) => {
                let members = self
                    .package
                    .structs
                    .get(name)
                    .map(|s| s.members.clone())
                    .unwrap_or_default();
                if checked.len() != members.len() {
                    return Err(PigeonError::type_error(
                        format!(
                            "struct {} takes one argument per member ({}), found {}",
                            name,
                            members.len(),
                            checked.len()
                        ),
                        location.clone(),
                    ));
                }
                for (argument, member) in checked.iter().zip(&members) {
                    self.expect_assignable(
                        argument,
                        &member.data_type,
                        &format!("member '{}' of {}", member.name, name),
                    )?;
                }
            }
            other => {
                return Err(PigeonError::type_error(
                    format!("type {} cannot be constructed", other),
                    location.clone(),
                ))
            }
        }

        Ok(TypedExpr::new(
            ExprKind::Construct {
                data_type: data_type.clone(),
                arguments: checked,
            },
            vec![data_type],
            location.clone(),
        ))
    }

    fn conversion_source<'e>(
        &self,
        target: &DataType,
        checked: &'e [TypedExpr],
        location: &SourceLocation,
    ) -> PigeonResult<&'e TypedExpr> {
        match checked {
            [single] => Ok(single),
            _ => Err(PigeonError::type_error(
                format!(
                    "conversion to {} takes exactly one argument, found {}",
                    target,
                    checked.len()
                ),
                location.clone(),
            )),
        }
    }

    fn conversion_error(&self, target: &DataType, source: &TypedExpr) -> PigeonError {
        PigeonError::type_error(
            format!("cannot convert {} to {}", source.data_type(), target),
            source.location.clone(),
        )
    }

    /// Check the left-hand side of an assignment
    pub(super) fn check_target(&mut self, target: &Expr) -> PigeonResult<(AssignTarget, DataType)> {
        match target {
            Expr::Identifier { name, location } => {
                let checked = self.check_expr(target)?;
                match checked.kind {
                    ExprKind::Local(_) | ExprKind::Global(_) => {
                        let t = checked.data_type().clone();
                        Ok((AssignTarget::Variable(checked), t))
                    }
                    _ => Err(PigeonError::type_error(
                        format!("cannot assign to function '{}'", name),
                        location.clone(),
                    )),
                }
            }

            Expr::Operation {
                operator: Operator::Dr,
                operands,
                location,
            } => {
                self.reject_dynamic("dr", location)?;
                let checked = self.check_operation(Operator::Dr, operands, location)?;
                let t = checked.data_type().clone();
                match checked.kind {
                    ExprKind::Operation { mut operands, .. } if operands.len() == 1 => {
                        Ok((AssignTarget::Deref(operands.remove(0)), t))
                    }
                    _ => Err(invalid_target(location)),
                }
            }

            Expr::Operation {
                operator: Operator::Get,
                operands,
                location,
            } => {
                let checked = self.check_operation(Operator::Get, operands, location)?;
                let t = checked.data_type().clone();
                match checked.kind {
                    ExprKind::Member { target, member } => {
                        if !is_addressable(&target) {
                            return Err(PigeonError::type_error(
                                format!(
                                    "cannot assign to member '{}' of a value that is not addressable",
                                    member
                                ),
                                target.location.clone(),
                            ));
                        }
                        Ok((AssignTarget::Member { target: *target, member }, t))
                    }
                    ExprKind::Operation { operands, .. } => {
                        let mut operands = operands.into_iter();
                        match (operands.next(), operands.next()) {
                            (Some(container), Some(index)) => {
                                if matches!(container.data_type(), DataType::Array(..))
                                    && !is_addressable(&container)
                                {
                                    return Err(PigeonError::type_error(
                                        "cannot assign to an element of an array that is not addressable",
                                        container.location.clone(),
                                    ));
                                }
                                Ok((AssignTarget::Index { container, index }, t))
                            }
                            _ => Err(invalid_target(location)),
                        }
                    }
                    _ => Err(invalid_target(location)),
                }
            }

            Expr::Operation {
                operator: Operator::Ref,
                location,
                ..
            } => Err(PigeonError::type_error(
                "cannot assign to a reference",
                location.clone(),
            )),

            other => Err(invalid_target(other.location())),
        }
    }
}

fn invalid_target(location: &SourceLocation) -> PigeonError {
    PigeonError::type_error(
        "assignment target must be a variable, a dr or a get",
        location.clone(),
    )
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerConfig;
    use crate::error::PigeonResult;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::semantic;
    use crate::types::{CheckedPackage, TypeChecker};

    fn check(source: &str) -> PigeonResult<CheckedPackage> {
        let config = CompilerConfig::new();
        let tokens = Lexer::new(source, None).tokenize()?;
        let parsed = Parser::new(tokens).parse()?;
        let package = semantic::build(parsed, &config)?;
        TypeChecker::new(&package, &config).check()
    }

    fn error_in_main(body: &str) -> (String, usize, usize) {
        let source = format!(
            "struct Dog\n    name Str\n    age I\nfunc two : I Str\n    return 1 \"a\"\nfunc main\n{}",
            body
        );
        let err = check(&source).unwrap_err();
        let location = err.location().unwrap().clone();
        (err.message().to_string(), location.line, location.column)
    }

    #[test]
    fn test_names() {
        assert_eq!(
            error_in_main("    (println missing)\n"),
            ("undefined name 'missing'".to_string(), 7, 14)
        );
        assert!(check("import \"lib/util\"\nfunc main\n    (println util)\n")
            .unwrap_err()
            .message()
            .contains("imported package 'util'"));
        assert_eq!(
            error_in_main("    as two 1\n").0,
            "cannot assign to function 'two'"
        );
    }

    #[test]
    fn test_calls() {
        assert_eq!(
            error_in_main("    (two 1)\n").0,
            "function 'two' expects 0 arguments, found 1"
        );
        assert_eq!(
            error_in_main("    (println (two))\n"),
            (
                "expression yields 2 values where one is expected".to_string(),
                7,
                14
            )
        );
        assert_eq!(
            error_in_main("    locals d Dog\n    (.bark d)\n").0,
            "type Dog has no method 'bark'"
        );
    }

    #[test]
    fn test_type_expressions() {
        assert_eq!(
            error_in_main("    locals bs S<Byte>\n    as bs (S<Byte> 104)\n").0,
            "S<Byte> expects Byte, found I"
        );
        assert_eq!(
            error_in_main("    locals d Dog\n    as d (Dog \"Rex\")\n").0,
            "struct Dog takes one argument per member (2), found 1"
        );
        assert_eq!(
            error_in_main("    locals x I\n    as x (I \"3\")\n").0,
            "cannot convert Str to I"
        );
        assert_eq!(
            error_in_main("    locals m M<Str I>\n    as m (M<Str I> \"a\")\n").0,
            "M<Str I> takes key value pairs, found 1 arguments"
        );
        assert_eq!(
            error_in_main("    locals p P<I>\n    as p (P<I> 1)\n").0,
            "type P<I> cannot be constructed"
        );
        assert_eq!(
            error_in_main("    locals xs L<I>\n    as xs (L<I> 1 \"b\")\n").0,
            "L<I> expects I, found Str"
        );
    }

    #[test]
    fn test_conversions_accepted() {
        let source = "\
func main
    locals s Str f F b Byte xs L<I> a A<I 2> ch Ch<I>
    as xs (L<I> 104 105)
    as s (Str xs)
    as f (F 3)
    as b (Byte 7)
    as a (A<I 2> 1 2)
    as ch (Ch<I> 4)
";
        assert!(check(source).is_ok());
    }

    #[test]
    fn test_targets() {
        assert_eq!(
            error_in_main("    locals x I\n    as (ref x) 1\n").0,
            "cannot assign to a reference"
        );
        assert_eq!(
            error_in_main("    locals d Dog\n    as (get d age) \"old\"\n"),
            ("cannot assign Str to I".to_string(), 8, 8)
        );
        assert_eq!(
            error_in_main("    locals s Str\n    as (get s 0) \"x\"\n"),
            (
                "get operand must be a struct, list, slice, array or map, found Str".to_string(),
                8,
                13
            )
        );
        assert!(check(
            "struct Dog\n    age I\nfunc main\n    locals d Dog p P<Dog> xs L<I>\n    as (get d age) 3\n    as p (ref d)\n    as (dr p) d\n    as xs[0] 4\n"
        )
        .is_ok());
    }

    #[test]
    fn test_member_targets_need_an_addressable_base() {
        assert_eq!(
            error_in_main("    locals m M<Str Dog>\n    as (get (get m \"k\") name) \"c\"\n"),
            (
                "cannot assign to member 'name' of a value that is not addressable".to_string(),
                8,
                13
            )
        );
        assert_eq!(
            error_in_main("    locals xs L<Dog>\n    as (get (get xs 0) age) 3\n").0,
            "cannot assign to member 'age' of a value that is not addressable"
        );
        assert_eq!(
            error_in_main("    locals rows L<A<I 2>>\n    as (get (get rows 0) 1) 3\n").0,
            "cannot assign to an element of an array that is not addressable"
        );
        assert!(check(
            "struct Dog\n    age I\nfunc main\n    locals ds S<Dog> ps L<P<Dog>> grid A<I 2>\n    as (get (get ds 0) age) 3\n    as (get (get ps 0) age) 4\n    as (get grid 1) 5\n"
        )
        .is_ok());
    }
}
