//! Operator arity and typing rules.

use super::checker::TypeChecker;
use super::type_def::DataType;
use super::typed::{ExprKind, TypedExpr};
use crate::error::{PigeonError, PigeonResult, SourceLocation};
use crate::lexer::Operator;
use crate::parser::ast::{Expr, Literal};

/// Operand count bounds: `(min, max)`, `None` meaning unbounded
pub fn arity(operator: Operator) -> (usize, Option<usize>) {
    use Operator::*;
    match operator {
        Add | Sub | Mul | Div | Eq | Neq | Lt | Gt | Lte | Gte | And | Or | Band | Bor | Bxor
        | Concat => (2, None),
        Mod | Get | Push | Append | GetChar | GetRune | IsType | ReadFile | WriteFile | SeekFile
        | SeekFileStart | SeekFileEnd | Send => (2, Some(2)),
        Set | Slice => (3, Some(3)),
        Inc | Dec | Not | Len | Ref | Dr | Bnot | CharList | RuneList | CharSlice | RuneSlice
        | ByteSlice | RandIntN | Floor | Ceil | ParseInt | ParseFloat | FormatInt | FormatFloat
        | FormatTime | ParseTime | CreateFile | OpenFile | CloseFile | Rcv => (1, Some(1)),
        Print | Println => (0, None),
        Prompt => (0, Some(1)),
        RandInt | RandFloat | TimeNow => (0, Some(0)),
    }
}

/// How many values an operation yields
pub fn result_count(operator: Operator) -> usize {
    use Operator::*;
    match operator {
        Set | Push | Print | Println | Send => 0,
        IsType | ParseInt | ParseFloat | ParseTime | CreateFile | OpenFile | ReadFile
        | WriteFile | SeekFile | SeekFileStart | SeekFileEnd => 2,
        _ => 1,
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "operand"
    } else {
        "operands"
    }
}

fn check_arity(
    operator: Operator,
    operands: &[Expr],
    location: &SourceLocation,
) -> PigeonResult<()> {
    let (min, max) = arity(operator);
    let count = operands.len();
    let bound = match max {
        Some(max) if max == min => format!("exactly {} {}", min, plural(min)),
        Some(max) if min == 0 => format!("at most {} {}", max, plural(max)),
        Some(max) => format!("between {} and {} operands", min, max),
        None => format!("at least {} {}", min, plural(min)),
    };
    let message = format!("{} requires {}, found {}", operator, bound, count);

    if count < min {
        return Err(PigeonError::type_error(message, location.clone()));
    }
    if let Some(max) = max {
        if count > max {
            return Err(PigeonError::type_error(
                message,
                operands[max].location().clone(),
            ));
        }
    }
    Ok(())
}

impl<'a> TypeChecker<'a> {
    /// Check `(operator operands...)`
    pub(super) fn check_operation(
        &mut self,
        operator: Operator,
        operands: &[Expr],
        location: &SourceLocation,
    ) -> PigeonResult<TypedExpr> {
        check_arity(operator, operands, location)?;

        match operator {
            Operator::IsType => return self.check_istype(operands, location),
            Operator::Ref | Operator::Dr => self.reject_dynamic(operator.as_str(), location)?,
            _ => {}
        }

        let member_access = !self.is_dynamic() && matches!(operator, Operator::Get | Operator::Set);
        let mut typed: Vec<TypedExpr> = Vec::with_capacity(operands.len());
        for (i, operand) in operands.iter().enumerate() {
            if i == 1 && member_access {
                // the member name is not an expression of its own
                if let Some(name) = typed[0].data_type().struct_name().map(str::to_string) {
                    let value = match operands.get(2) {
                        Some(value) => Some(self.check_value(value)?),
                        None => None,
                    };
                    let target = typed.remove(0);
                    return self.check_member(operator, &name, target, operand, value, location);
                }
            }
            typed.push(self.check_value(operand)?);
        }

        if self.is_dynamic() {
            let types = vec![DataType::ANY; result_count(operator)];
            return Ok(operation(operator, typed, types, location));
        }

        if operator == Operator::Set {
            if let Some(container) = typed.first() {
                if matches!(container.data_type(), DataType::Array(..)) && !is_addressable(container) {
                    return Err(PigeonError::type_error(
                        "cannot set an element of an array that is not addressable",
                        container.location.clone(),
                    ));
                }
            }
        }

        let types = self.operation_types(operator, &typed)?;
        Ok(operation(operator, typed, types, location))
    }

    fn operation_types(
        &self,
        operator: Operator,
        operands: &[TypedExpr],
    ) -> PigeonResult<Vec<DataType>> {
        use Operator::*;

        let first_type = operands
            .first()
            .map(|o| o.data_type().clone())
            .unwrap_or(DataType::Nil);

        let types = match operator {
            Add | Sub | Mul | Div | Inc | Dec => {
                self.expect_numeric(operator, &operands[0])?;
                self.expect_same(operator, &first_type, &operands[1..])?;
                vec![first_type]
            }
            Mod | Band | Bor | Bxor | Bnot => {
                self.expect_integer(operator, &operands[0])?;
                self.expect_same(operator, &first_type, &operands[1..])?;
                vec![first_type]
            }

            Eq | Neq => {
                self.check_equality(operator, operands)?;
                vec![DataType::BOOL]
            }
            Lt | Gt | Lte | Gte => {
                self.expect_numeric(operator, &operands[0])?;
                self.expect_same(operator, &first_type, &operands[1..])?;
                vec![DataType::BOOL]
            }

            Not | And | Or => {
                for operand in operands {
                    self.expect_exact(operator, &DataType::BOOL, operand)?;
                }
                vec![DataType::BOOL]
            }

            Get => vec![self.check_index(operator, &operands[0], &operands[1])?],
            Set => {
                let element = self.check_index(operator, &operands[0], &operands[1])?;
                self.expect_assignable(&operands[2], &element, "set")?;
                vec![]
            }
            Push => match &first_type {
                DataType::List(element) => {
                    self.expect_assignable(&operands[1], element, "push")?;
                    vec![]
                }
                _ => return Err(operand_error(operator, "a list", &operands[0])),
            },
            Append => match &first_type {
                DataType::Slice(element) => {
                    self.expect_assignable(&operands[1], element, "append")?;
                    vec![first_type.clone()]
                }
                _ => return Err(operand_error(operator, "a slice", &operands[0])),
            },
            Slice => {
                let result = match &first_type {
                    DataType::Scalar(_) if first_type == DataType::STR => DataType::STR,
                    DataType::Slice(_) => first_type.clone(),
                    DataType::Array(_, element) => DataType::slice(element.as_ref().clone()),
                    _ => {
                        return Err(operand_error(
                            operator,
                            "Str, a slice or an array",
                            &operands[0],
                        ))
                    }
                };
                for bound in &operands[1..] {
                    self.expect_integer(operator, bound)?;
                }
                vec![result]
            }
            Len => match &first_type {
                DataType::Scalar(_) if first_type == DataType::STR => vec![DataType::INT],
                DataType::List(_)
                | DataType::Slice(_)
                | DataType::Map(..)
                | DataType::Array(..)
                | DataType::Channel(_) => vec![DataType::INT],
                _ => {
                    return Err(operand_error(
                        operator,
                        "Str, a list, slice, array, map or channel",
                        &operands[0],
                    ))
                }
            },

            Ref => {
                self.check_reference(&operands[0])?;
                vec![DataType::pointer(first_type)]
            }
            Dr => match &first_type {
                DataType::Pointer(target) => vec![target.as_ref().clone()],
                _ => return Err(operand_error(operator, "a pointer", &operands[0])),
            },

            Print | Println => vec![],
            Prompt => {
                if let Some(message) = operands.first() {
                    self.expect_exact(operator, &DataType::STR, message)?;
                }
                vec![DataType::STR]
            }

            Concat => {
                for operand in operands {
                    self.expect_exact(operator, &DataType::STR, operand)?;
                }
                vec![DataType::STR]
            }
            GetChar | GetRune => {
                self.expect_exact(operator, &DataType::STR, &operands[0])?;
                self.expect_integer(operator, &operands[1])?;
                if operator == GetChar {
                    vec![DataType::STR]
                } else {
                    vec![DataType::INT]
                }
            }
            CharList | RuneList | CharSlice | RuneSlice | ByteSlice => {
                self.expect_exact(operator, &DataType::STR, &operands[0])?;
                vec![match operator {
                    CharList => DataType::list(DataType::STR),
                    RuneList => DataType::list(DataType::INT),
                    CharSlice => DataType::slice(DataType::STR),
                    RuneSlice => DataType::slice(DataType::INT),
                    _ => DataType::slice(DataType::BYTE),
                }]
            }

            RandInt | TimeNow => vec![DataType::INT],
            RandFloat => vec![DataType::FLOAT],
            RandIntN => {
                self.expect_exact(operator, &DataType::INT, &operands[0])?;
                vec![DataType::INT]
            }
            Floor | Ceil => {
                self.expect_exact(operator, &DataType::FLOAT, &operands[0])?;
                vec![DataType::FLOAT]
            }
            ParseInt | ParseTime => {
                self.expect_exact(operator, &DataType::STR, &operands[0])?;
                vec![DataType::INT, DataType::ERR]
            }
            ParseFloat => {
                self.expect_exact(operator, &DataType::STR, &operands[0])?;
                vec![DataType::FLOAT, DataType::ERR]
            }
            FormatInt | FormatTime => {
                self.expect_exact(operator, &DataType::INT, &operands[0])?;
                vec![DataType::STR]
            }
            FormatFloat => {
                self.expect_exact(operator, &DataType::FLOAT, &operands[0])?;
                vec![DataType::STR]
            }

            CreateFile | OpenFile => {
                self.expect_exact(operator, &DataType::STR, &operands[0])?;
                vec![DataType::INT, DataType::STR]
            }
            CloseFile => {
                self.expect_exact(operator, &DataType::INT, &operands[0])?;
                vec![DataType::STR]
            }
            ReadFile | WriteFile | SeekFile | SeekFileStart | SeekFileEnd => {
                self.expect_exact(operator, &DataType::INT, &operands[0])?;
                self.expect_exact(operator, &DataType::slice(DataType::BYTE), &operands[1])?;
                vec![DataType::INT, DataType::STR]
            }

            Send => {
                let element = self.channel_element(&operands[0])?;
                self.expect_assignable(&operands[1], &element, "send")?;
                vec![]
            }
            Rcv => vec![self.channel_element(&operands[0])?],

            IsType => {
                return Err(PigeonError::internal_error(
                    "istype operands are checked separately",
                ))
            }
        };
        Ok(types)
    }

    /// Element type read by `get`/`set` on a container
    fn check_index(
        &self,
        operator: Operator,
        container: &TypedExpr,
        index: &TypedExpr,
    ) -> PigeonResult<DataType> {
        match container.data_type() {
            DataType::List(element) | DataType::Slice(element) | DataType::Array(_, element) => {
                if !index.data_type().is_integer() {
                    return Err(PigeonError::type_error(
                        format!("{} index must be an integer, found {}", operator, index.data_type()),
                        index.location.clone(),
                    ));
                }
                Ok(element.as_ref().clone())
            }
            DataType::Map(key, value) => {
                self.expect_assignable(index, key, &format!("{} key", operator))?;
                Ok(value.as_ref().clone())
            }
            _ => Err(operand_error(
                operator,
                "a struct, list, slice, array or map",
                container,
            )),
        }
    }

    /// `get`/`set` on a struct or a pointer to one
    fn check_member(
        &self,
        operator: Operator,
        struct_name: &str,
        target: TypedExpr,
        name_operand: &Expr,
        value: Option<TypedExpr>,
        location: &SourceLocation,
    ) -> PigeonResult<TypedExpr> {
        let member_name = match name_operand {
            Expr::Identifier { name, .. } => name.clone(),
            Expr::Literal {
                value: Literal::String(name),
                ..
            } => name.clone(),
            other => {
                return Err(PigeonError::type_error(
                    format!("{} on struct {} needs a member name", operator, struct_name),
                    other.location().clone(),
                ))
            }
        };

        let member_type = self
            .package
            .structs
            .get(struct_name)
            .and_then(|s| s.member(&member_name))
            .map(|m| m.data_type.clone())
            .ok_or_else(|| {
                PigeonError::type_error(
                    format!("struct {} has no member '{}'", struct_name, member_name),
                    name_operand.location().clone(),
                )
            })?;

        let value = match value {
            Some(value) if operator == Operator::Set => value,
            _ => {
                return Ok(TypedExpr::new(
                    ExprKind::Member {
                        target: Box::new(target),
                        member: member_name,
                    },
                    vec![member_type],
                    location.clone(),
                ))
            }
        };
        if !is_addressable(&target) {
            return Err(PigeonError::type_error(
                format!(
                    "cannot set member '{}' of a value that is not addressable",
                    member_name
                ),
                target.location.clone(),
            ));
        }
        self.expect_assignable(&value, &member_type, "set")?;
        Ok(TypedExpr::new(
            ExprKind::SetMember {
                target: Box::new(target),
                member: member_name,
                value: Box::new(value),
            },
            vec![],
            location.clone(),
        ))
    }

    /// `(istype T value)`: yields the value as `T` and whether it holds one
    fn check_istype(
        &mut self,
        operands: &[Expr],
        location: &SourceLocation,
    ) -> PigeonResult<TypedExpr> {
        self.reject_dynamic("istype", location)?;

        let target = match &operands[0] {
            Expr::DataType { data_type, .. } => self.names.resolve(data_type)?,
            other => {
                return Err(PigeonError::type_error(
                    "istype requires a type as its first operand",
                    other.location().clone(),
                ))
            }
        };
        let value = self.check_value(&operands[1])?;
        let interface = value.data_type().clone();
        if !interface.is_interface_like() {
            return Err(operand_error(Operator::IsType, "an interface value", &value));
        }
        if !self.is_assignable(&target, &interface) {
            return Err(PigeonError::type_error(
                format!("{} does not implement {}", target, interface),
                operands[0].location().clone(),
            ));
        }

        let type_value = TypedExpr::new(
            ExprKind::TypeValue(target.clone()),
            vec![DataType::TYPE],
            operands[0].location().clone(),
        );
        Ok(operation(
            Operator::IsType,
            vec![type_value, value],
            vec![target, DataType::BOOL],
            location,
        ))
    }

    /// `ref` needs an addressable operand
    fn check_reference(&self, operand: &TypedExpr) -> PigeonResult<()> {
        match &operand.kind {
            ExprKind::Local(_) | ExprKind::Global(_) => Ok(()),
            ExprKind::Member { target, .. } if is_addressable(target) => Ok(()),
            ExprKind::Member { .. } => Err(PigeonError::type_error(
                "cannot take a reference to a member of a value that is not addressable",
                operand.location.clone(),
            )),
            ExprKind::Function(name) => Err(PigeonError::type_error(
                format!("cannot take a reference to function '{}'", name),
                operand.location.clone(),
            )),
            ExprKind::Operation {
                operator: Operator::Get,
                operands,
            } => match operands.first() {
                Some(container) if matches!(container.data_type(), DataType::Slice(_)) => Ok(()),
                Some(container) if matches!(container.data_type(), DataType::Array(..)) => {
                    if is_addressable(container) {
                        Ok(())
                    } else {
                        Err(PigeonError::type_error(
                            "cannot take a reference to an element of an array that is not addressable",
                            operand.location.clone(),
                        ))
                    }
                }
                _ => Err(PigeonError::type_error(
                    "cannot take a reference to a list or map element",
                    operand.location.clone(),
                )),
            },
            _ => Err(PigeonError::type_error(
                "ref requires a variable, a struct member or a slice or array element",
                operand.location.clone(),
            )),
        }
    }

    fn check_equality(&self, operator: Operator, operands: &[TypedExpr]) -> PigeonResult<()> {
        let base = operands
            .iter()
            .map(|o| o.data_type())
            .find(|t| **t != DataType::Nil)
            .cloned()
            .ok_or_else(|| {
                PigeonError::type_error(
                    format!("{} cannot compare nil with nil", operator),
                    operands[0].location.clone(),
                )
            })?;

        let mut compares_nil = false;
        for operand in operands {
            let t = operand.data_type();
            if *t == DataType::Nil {
                if !base.is_nilable() {
                    return Err(PigeonError::type_error(
                        format!("cannot compare {} with nil", base),
                        operand.location.clone(),
                    ));
                }
                compares_nil = true;
            } else if *t != base {
                return Err(PigeonError::type_error(
                    format!("{} operands must all be {}, found {}", operator, base, t),
                    operand.location.clone(),
                ));
            }
        }

        if !compares_nil && !self.package.is_comparable(&base) {
            return Err(PigeonError::type_error(
                format!("{} cannot compare {} values", operator, base),
                operands[0].location.clone(),
            ));
        }
        Ok(())
    }

    fn expect_numeric(&self, operator: Operator, operand: &TypedExpr) -> PigeonResult<()> {
        if operand.data_type().is_numeric() {
            Ok(())
        } else {
            Err(operand_error(operator, "numeric", operand))
        }
    }

    fn expect_integer(&self, operator: Operator, operand: &TypedExpr) -> PigeonResult<()> {
        if operand.data_type().is_integer() {
            Ok(())
        } else {
            Err(operand_error(operator, "an integer", operand))
        }
    }

    fn expect_exact(
        &self,
        operator: Operator,
        expected: &DataType,
        operand: &TypedExpr,
    ) -> PigeonResult<()> {
        if operand.data_type() == expected {
            Ok(())
        } else {
            Err(operand_error(operator, &expected.to_string(), operand))
        }
    }

    fn expect_same(
        &self,
        operator: Operator,
        expected: &DataType,
        rest: &[TypedExpr],
    ) -> PigeonResult<()> {
        for operand in rest {
            if operand.data_type() != expected {
                return Err(PigeonError::type_error(
                    format!(
                        "{} operands must all be {}, found {}",
                        operator,
                        expected,
                        operand.data_type()
                    ),
                    operand.location.clone(),
                ));
            }
        }
        Ok(())
    }
}

/// Whether a struct or array value can be written in place.
///
/// Heap-list elements, map values and call results are copies.
pub(super) fn is_addressable(expr: &TypedExpr) -> bool {
    if matches!(expr.data_type(), DataType::Pointer(_)) {
        return true;
    }
    match &expr.kind {
        ExprKind::Local(_) | ExprKind::Global(_) => true,
        ExprKind::Member { target, .. } => is_addressable(target),
        ExprKind::Operation {
            operator: Operator::Dr,
            ..
        } => true,
        ExprKind::Operation {
            operator: Operator::Get,
            operands,
        } => match operands.first() {
            Some(container) => match container.data_type() {
                DataType::Slice(_) => true,
                DataType::Array(..) => is_addressable(container),
                _ => false,
            },
            None => false,
        },
        _ => false,
    }
}

fn operation(
    operator: Operator,
    operands: Vec<TypedExpr>,
    types: Vec<DataType>,
    location: &SourceLocation,
) -> TypedExpr {
    TypedExpr::new(
        ExprKind::Operation { operator, operands },
        types,
        location.clone(),
    )
}

fn operand_error(operator: Operator, expected: &str, operand: &TypedExpr) -> PigeonError {
    PigeonError::type_error(
        format!(
            "{} operand must be {}, found {}",
            operator,
            expected,
            operand.data_type()
        ),
        operand.location.clone(),
    )
}
