//! Go emitter: expressions and assignment targets.

use super::emitter::Emitter;
use super::names;
use crate::error::{PigeonError, PigeonResult};
use crate::lexer::Operator;
use crate::runtime;
use crate::types::type_def::{DataType, Scalar};
use crate::types::typed::{AssignTarget, ExprKind, TypedExpr};

impl<'a> Emitter<'a> {
    /// Render an expression
    pub(super) fn expr(&self, expr: &TypedExpr) -> PigeonResult<String> {
        Ok(match &expr.kind {
            ExprKind::Local(name) => names::local(name),
            ExprKind::Global(name) => names::global(name),
            ExprKind::Function(name) => names::function(name),

            ExprKind::Int(text) => format!("int64({})", text),
            ExprKind::Float(text) => format!("float64({})", text),
            ExprKind::Str(text) => names::quote(text),
            ExprKind::RawStr(text) => names::escape_verbatim(text),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Nil => "nil".to_string(),

            ExprKind::Operation { operator, operands } => {
                if self.is_dynamic() {
                    self.dynamic_operation(*operator, operands)?
                } else {
                    self.operation(*operator, operands)?
                }
            }

            ExprKind::Member { target, member } => {
                format!("{}.{}", self.expr(target)?, names::field(member))
            }

            ExprKind::SetMember {
                target,
                member,
                value,
            } => format!(
                "{}.{} = {}",
                self.expr(target)?,
                names::field(member),
                self.expr(value)?
            ),

            ExprKind::FunctionCall { callee, arguments } => {
                format!("{}({})", self.expr(callee)?, self.list(arguments)?)
            }

            ExprKind::MethodCall {
                receiver,
                method,
                arguments,
            } => format!(
                "{}.{}({})",
                self.expr(receiver)?,
                names::method(method),
                self.list(arguments)?
            ),

            ExprKind::Construct {
                data_type,
                arguments,
            } => self.construct(data_type, arguments)?,

            ExprKind::TypeValue(data_type) => self.types.render(data_type),
        })
    }

    /// Render a statement-level expression
    pub(super) fn statement_expr(&self, expr: &TypedExpr) -> PigeonResult<String> {
        self.expr(expr)
    }

    /// Render an `if`/`while` condition
    pub(super) fn condition(&self, expr: &TypedExpr) -> PigeonResult<String> {
        let rendered = self.expr(expr)?;
        Ok(if self.is_dynamic() {
            format!("{}({})", self.rt(runtime::TRUTHY), rendered)
        } else {
            rendered
        })
    }

    fn list(&self, exprs: &[TypedExpr]) -> PigeonResult<String> {
        let rendered = exprs
            .iter()
            .map(|e| self.expr(e))
            .collect::<PigeonResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }

    /// Type as written in a composite literal: lists are allocated with `&`
    pub(super) fn composite_type(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::List(element) => format!(
                "&{}.{}[{}]",
                self.config.runtime_alias,
                runtime::LIST,
                self.types.render(element)
            ),
            other => self.types.render(other),
        }
    }

    fn operation(&self, operator: Operator, operands: &[TypedExpr]) -> PigeonResult<String> {
        use Operator::*;

        let rendered = operands
            .iter()
            .map(|o| self.expr(o))
            .collect::<PigeonResult<Vec<_>>>()?;
        let first_type = operands.first().map(|o| o.data_type());
        let is_list = matches!(first_type, Some(DataType::List(_)));

        let code = match operator {
            Add | Concat => infix("+", &rendered),
            Sub => infix("-", &rendered),
            Mul => infix("*", &rendered),
            Div => infix("/", &rendered),
            Mod => infix("%", &rendered),
            Band => infix("&", &rendered),
            Bor => infix("|", &rendered),
            Bxor => infix("^", &rendered),
            And => infix("&&", &rendered),
            Or => infix("||", &rendered),
            Inc => format!("({} + 1)", arg(&rendered, 0)?),
            Dec => format!("({} - 1)", arg(&rendered, 0)?),
            Not => format!("(!{})", arg(&rendered, 0)?),
            Bnot => format!("(^{})", arg(&rendered, 0)?),

            Eq => chained("==", &rendered),
            Neq => chained("!=", &rendered),
            Lt => chained("<", &rendered),
            Gt => chained(">", &rendered),
            Lte => chained("<=", &rendered),
            Gte => chained(">=", &rendered),

            Get if is_list => format!(
                "{}.{}({})",
                arg(&rendered, 0)?,
                runtime::list::GET,
                self.list_index(&operands[1], arg(&rendered, 1)?)
            ),
            Get => format!("{}[{}]", arg(&rendered, 0)?, arg(&rendered, 1)?),
            Set if is_list => format!(
                "{}.{}({}, {})",
                arg(&rendered, 0)?,
                runtime::list::SET,
                self.list_index(&operands[1], arg(&rendered, 1)?),
                arg(&rendered, 2)?
            ),
            Set => format!(
                "{}[{}] = {}",
                arg(&rendered, 0)?,
                arg(&rendered, 1)?,
                arg(&rendered, 2)?
            ),
            Push => format!("{}.{}({})", arg(&rendered, 0)?, runtime::list::APPEND, arg(&rendered, 1)?),
            Append => format!("append({}, {})", arg(&rendered, 0)?, arg(&rendered, 1)?),
            Slice => format!(
                "{}[{}:{}]",
                arg(&rendered, 0)?,
                arg(&rendered, 1)?,
                arg(&rendered, 2)?
            ),
            Len => match first_type {
                Some(DataType::Scalar(Scalar::Str)) => {
                    format!("{}({})", self.rt(runtime::STR_LEN), arg(&rendered, 0)?)
                }
                Some(DataType::List(_)) => {
                    format!("{}.{}()", arg(&rendered, 0)?, runtime::list::LEN)
                }
                _ => format!("int64(len({}))", arg(&rendered, 0)?),
            },

            Ref => format!("(&{})", arg(&rendered, 0)?),
            Dr => format!("(*{})", arg(&rendered, 0)?),

            Print => format!("fmt.Print({})", rendered.join(", ")),
            Println => format!("fmt.Println({})", rendered.join(", ")),

            GetChar => format!("string({}[{}])", arg(&rendered, 0)?, arg(&rendered, 1)?),
            GetRune => format!("int64([]rune({})[{}])", arg(&rendered, 0)?, arg(&rendered, 1)?),
            ByteSlice => format!("[]byte({})", arg(&rendered, 0)?),

            IsType => format!("{}.({})", arg(&rendered, 1)?, arg(&rendered, 0)?),

            Send => format!("{} <- {}", arg(&rendered, 0)?, arg(&rendered, 1)?),
            Rcv => format!("(<-{})", arg(&rendered, 0)?),

            other => match runtime::operator_function(other) {
                Some(function) => format!("{}({})", self.rt(function), rendered.join(", ")),
                None => {
                    return Err(PigeonError::internal_error(format!(
                        "no rendering for operator '{}'",
                        other
                    )))
                }
            },
        };
        Ok(code)
    }

    /// Every operator goes through its runtime helper, except output
    fn dynamic_operation(&self, operator: Operator, operands: &[TypedExpr]) -> PigeonResult<String> {
        let rendered = self.list(operands)?;
        Ok(match operator {
            Operator::Print => format!("fmt.Print({})", rendered),
            Operator::Println => format!("fmt.Println({})", rendered),
            other => format!("{}({})", self.rt(&runtime::dynamic_helper(other)), rendered),
        })
    }

    /// List methods take an `int64` index
    fn list_index(&self, index: &TypedExpr, rendered: &str) -> String {
        if *index.data_type() == DataType::BYTE {
            format!("int64({})", rendered)
        } else {
            rendered.to_string()
        }
    }

    fn construct(&self, data_type: &DataType, arguments: &[TypedExpr]) -> PigeonResult<String> {
        if self.is_dynamic() {
            return self.dynamic_construct(data_type, arguments);
        }

        let rendered = arguments
            .iter()
            .map(|a| self.expr(a))
            .collect::<PigeonResult<Vec<_>>>()?;

        Ok(match data_type {
            DataType::Scalar(Scalar::Str) => {
                let source = arguments.first().map(|a| a.data_type());
                let value = arg(&rendered, 0)?;
                match source {
                    Some(DataType::List(element)) => format!(
                        "{}({})",
                        self.rt(runtime::to_string_function(true, **element == DataType::INT)),
                        value
                    ),
                    Some(DataType::Slice(element)) if **element == DataType::BYTE => {
                        format!("string({})", value)
                    }
                    Some(DataType::Slice(element)) => format!(
                        "{}({})",
                        self.rt(runtime::to_string_function(false, **element == DataType::INT)),
                        value
                    ),
                    _ => value.to_string(),
                }
            }
            DataType::Scalar(_) => {
                format!("{}({})", self.types.render(data_type), arg(&rendered, 0)?)
            }
            DataType::List(_) => {
                let list_type = self.composite_type(data_type);
                if rendered.is_empty() {
                    format!("{}{{}}", list_type)
                } else {
                    // filled inside a closure so the literal stays an expression
                    let appends: String = rendered
                        .iter()
                        .map(|r| format!("__l.{}({}); ", runtime::list::APPEND, r))
                        .collect();
                    format!(
                        "func() {} {{ __l := {}{{}}; {}return __l }}()",
                        self.types.render(data_type),
                        list_type,
                        appends
                    )
                }
            }
            DataType::Slice(_) | DataType::Array(..) => {
                format!("{}{{{}}}", self.types.render(data_type), rendered.join(", "))
            }
            DataType::Map(..) => {
                let pairs: Vec<String> = rendered
                    .chunks(2)
                    .map(|pair| pair.join(": "))
                    .collect();
                format!("{}{{{}}}", self.types.render(data_type), pairs.join(", "))
            }
            DataType::Channel(_) => match rendered.first() {
                Some(size) => format!("make({}, {})", self.types.render(data_type), size),
                None => format!("make({})", self.types.render(data_type)),
            },
            DataType::Struct(name) => {
                let members = self
                    .package
                    .structs
                    .get(name)
                    .map(|s| s.members.as_slice())
                    .unwrap_or_default();
                let fields: Vec<String> = members
                    .iter()
                    .zip(&rendered)
                    .map(|(member, value)| format!("{}: {}", names::field(&member.name), value))
                    .collect();
                format!("{}{{{}}}", name, fields.join(", "))
            }
            other => {
                return Err(PigeonError::internal_error(format!(
                    "type {} cannot be constructed",
                    other
                )))
            }
        })
    }

    fn dynamic_construct(&self, data_type: &DataType, arguments: &[TypedExpr]) -> PigeonResult<String> {
        let rendered = self.list(arguments)?;
        Ok(match data_type {
            DataType::Scalar(scalar) => format!(
                "{}(\"{}\", {})",
                self.rt(runtime::CONVERT),
                scalar.as_str(),
                rendered
            ),
            DataType::List(_) | DataType::Slice(_) | DataType::Array(..) => {
                format!("{}({})", self.rt(runtime::NEW_LIST), rendered)
            }
            DataType::Map(..) => format!("{}({})", self.rt(runtime::NEW_MAP), rendered),
            DataType::Channel(_) if rendered.is_empty() => "make(chan interface{})".to_string(),
            DataType::Channel(_) => format!(
                "make(chan interface{{}}, {}(\"I\", {}).(int64))",
                self.rt(runtime::CONVERT),
                rendered
            ),
            other => {
                return Err(PigeonError::internal_error(format!(
                    "type {} cannot be constructed in the dynamic dialect",
                    other
                )))
            }
        })
    }

    /// Whether writing to `target` takes a method call rather than `=`
    pub(super) fn needs_setter(&self, target: &AssignTarget) -> bool {
        match target {
            AssignTarget::Index { container, .. } => {
                self.is_dynamic() || matches!(container.data_type(), DataType::List(_))
            }
            _ => false,
        }
    }

    /// Left-hand side of a plain `=` assignment
    pub(super) fn target_place(&self, target: &AssignTarget) -> PigeonResult<String> {
        Ok(match target {
            AssignTarget::Variable(variable) => self.expr(variable)?,
            AssignTarget::Deref(pointer) => format!("*{}", self.expr(pointer)?),
            AssignTarget::Member { target, member } => {
                format!("{}.{}", self.expr(target)?, names::field(member))
            }
            AssignTarget::Index { container, index } => {
                format!("{}[{}]", self.expr(container)?, self.expr(index)?)
            }
        })
    }

    /// A statement storing `value` into `target`
    pub(super) fn assign_to(&self, target: &AssignTarget, value: &str) -> PigeonResult<String> {
        if let AssignTarget::Index { container, index } = target {
            if self.is_dynamic() {
                return Ok(format!(
                    "{}({}, {}, {})",
                    self.rt(&runtime::dynamic_helper(Operator::Set)),
                    self.expr(container)?,
                    self.expr(index)?,
                    value
                ));
            }
            if matches!(container.data_type(), DataType::List(_)) {
                return Ok(format!(
                    "{}.{}({}, {})",
                    self.expr(container)?,
                    runtime::list::SET,
                    self.list_index(index, &self.expr(index)?),
                    value
                ));
            }
        }
        Ok(format!("{} = {}", self.target_place(target)?, value))
    }
}

fn arg(rendered: &[String], i: usize) -> PigeonResult<&str> {
    rendered
        .get(i)
        .map(String::as_str)
        .ok_or_else(|| PigeonError::internal_error(format!("missing operand {}", i + 1)))
}

/// `(a op b op c)`
fn infix(op: &str, operands: &[String]) -> String {
    format!("({})", operands.join(&format!(" {} ", op)))
}

/// `(a < b)`, or `((a < b) && (b < c))` for longer chains
fn chained(op: &str, operands: &[String]) -> String {
    let pairs: Vec<String> = operands
        .windows(2)
        .map(|pair| format!("({} {} {})", pair[0], op, pair[1]))
        .collect();
    match pairs.as_slice() {
        [single] => single.clone(),
        _ => format!("({})", pairs.join(" && ")),
    }
}
