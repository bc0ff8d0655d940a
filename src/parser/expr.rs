//! Expression and type parsing
//!
//! Expressions are prefix forms: `(op args...)`, `(fn args...)`,
//! `(.method receiver args...)`, `(Type args...)` and the member form
//! `(. expr name)`, plus atoms and the postfix sugars `.name` and `[index]`.

use super::ast::*;
use super::parser::{strip_quotes, strip_triple_quotes, Parser};
use crate::error::{PigeonError, PigeonResult};
use crate::lexer::{Operator, TokenType};

impl Parser {
    pub(super) fn expression(&mut self) -> PigeonResult<Expr> {
        let expr = self.primary()?;
        self.postfix(expr)
    }

    fn primary(&mut self) -> PigeonResult<Expr> {
        let location = self.location();

        match self.peek_type() {
            Some(TokenType::Number) => {
                let token = self.advance().clone();
                Ok(Expr::Literal {
                    value: Literal::Number(token.lexeme),
                    location,
                })
            }
            Some(TokenType::String) => {
                let token = self.advance().clone();
                Ok(Expr::Literal {
                    value: Literal::String(strip_quotes(&token.lexeme).to_string()),
                    location,
                })
            }
            Some(TokenType::MultiLineString) => {
                let token = self.advance().clone();
                Ok(Expr::Literal {
                    value: Literal::MultiLineString(strip_triple_quotes(&token.lexeme).to_string()),
                    location,
                })
            }
            Some(TokenType::Boolean) => {
                let value = self.advance().lexeme == "true";
                Ok(Expr::Literal {
                    value: Literal::Boolean(value),
                    location,
                })
            }
            Some(TokenType::Nil) => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Nil,
                    location,
                })
            }
            Some(TokenType::Identifier) => {
                let name = self.advance().lexeme.clone();
                Ok(Expr::Identifier { name, location })
            }
            Some(TokenType::TypeName) => {
                let data_type = self.parse_type()?;
                Ok(Expr::DataType {
                    data_type,
                    location,
                })
            }
            Some(TokenType::OpenParen) => self.paren_expression(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `.name` and `[index]` directly after an expression
    fn postfix(&mut self, mut expr: Expr) -> PigeonResult<Expr> {
        loop {
            if self.check(TokenType::Dot) {
                self.advance();
                let location = self.location();
                let name = self.consume_identifier("member name after '.'")?;
                let member_location = expr.location().clone();
                expr = Expr::Operation {
                    operator: Operator::Get,
                    operands: vec![
                        expr,
                        Expr::Literal {
                            value: Literal::String(name),
                            location,
                        },
                    ],
                    location: member_location,
                };
            } else if self.check(TokenType::OpenSquare) {
                self.advance();
                let index = self.expression()?;
                self.consume(TokenType::CloseSquare, "']'")?;
                let location = expr.location().clone();
                expr = Expr::Operation {
                    operator: Operator::Get,
                    operands: vec![expr, index],
                    location,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn paren_expression(&mut self) -> PigeonResult<Expr> {
        let location = self.advance().location.clone();

        match self.peek_type() {
            Some(TokenType::Dot) => {
                self.advance();
                if self.match_token(TokenType::Space) {
                    // (. expr member)
                    let target = self.expression()?;
                    self.expect_space("member target")?;
                    let member_location = self.location();
                    let name = self.consume_identifier("member name")?;
                    self.consume(TokenType::CloseParen, "')'")?;
                    return Ok(Expr::Operation {
                        operator: Operator::Get,
                        operands: vec![
                            target,
                            Expr::Identifier {
                                name,
                                location: member_location,
                            },
                        ],
                        location,
                    });
                }

                let method = self.consume_identifier("method name after '.'")?;
                let mut arguments = self.arguments()?;
                if arguments.is_empty() {
                    return Err(PigeonError::syntax_error(
                        format!("method call '.{}' needs a receiver", method),
                        location,
                    ));
                }
                let receiver = arguments.remove(0);
                Ok(Expr::MethodCall {
                    method,
                    receiver: Box::new(receiver),
                    arguments,
                    location,
                })
            }
            Some(TokenType::Operator(operator)) => {
                self.advance();
                let operands = self.arguments()?;
                Ok(Expr::Operation {
                    operator,
                    operands,
                    location,
                })
            }
            Some(TokenType::TypeName) => {
                let data_type = self.parse_type()?;
                let arguments = self.arguments()?;
                Ok(Expr::TypeExpression {
                    data_type,
                    arguments,
                    location,
                })
            }
            Some(TokenType::Identifier) | Some(TokenType::OpenParen) => {
                let callee = self.expression()?;
                let arguments = self.arguments()?;
                Ok(Expr::FunctionCall {
                    callee: Box::new(callee),
                    arguments,
                    location,
                })
            }
            Some(TokenType::Space) => Err(self.error_here("unexpected space after '('")),
            _ => Err(self.unexpected("operator, function, method or type after '('")),
        }
    }

    /// `(SPACE expr)* )`
    fn arguments(&mut self) -> PigeonResult<Vec<Expr>> {
        let mut arguments = Vec::new();
        while self.match_token(TokenType::Space) {
            arguments.push(self.expression()?);
        }
        self.consume(TokenType::CloseParen, "')'")?;
        Ok(arguments)
    }

    // ===== Types =====

    /// `Name`, `Name<P...>` or `Fn<P... : R...>`
    pub(super) fn parse_type(&mut self) -> PigeonResult<ParsedDataType> {
        let token = self.consume(TokenType::TypeName, "type")?;
        let mut data_type = ParsedDataType::simple(token.lexeme, token.location);

        if !self.match_token(TokenType::OpenAngle) {
            return Ok(data_type);
        }

        let mut in_returns = false;
        loop {
            match self.peek_type() {
                Some(TokenType::CloseAngle) => {
                    self.advance();
                    break;
                }
                Some(TokenType::Space) => {
                    self.advance();
                }
                Some(TokenType::Colon) if !in_returns => {
                    self.advance();
                    in_returns = true;
                }
                Some(TokenType::Number) => {
                    let token = self.advance().clone();
                    let param = ParsedDataType::simple(token.lexeme, token.location);
                    if in_returns {
                        data_type.return_types.push(param);
                    } else {
                        data_type.params.push(param);
                    }
                }
                Some(TokenType::TypeName) => {
                    let param = self.parse_type()?;
                    if in_returns {
                        data_type.return_types.push(param);
                    } else {
                        data_type.params.push(param);
                    }
                }
                _ => return Err(self.unexpected("type parameter or '>'")),
            }
        }

        Ok(data_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse_expr(source: &str) -> PigeonResult<Expr> {
        let tokens = Lexer::new(source, None).tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.expression()
    }

    fn parse_type(source: &str) -> PigeonResult<ParsedDataType> {
        let tokens = Lexer::new(source, None).tokenize()?;
        let mut parser = Parser::new(tokens);
        parser.parse_type()
    }

    #[test]
    fn test_literals() {
        assert!(matches!(
            parse_expr("-12").unwrap(),
            Expr::Literal { value: Literal::Number(n), .. } if n == "-12"
        ));
        assert!(matches!(
            parse_expr("\"a\\nb\"").unwrap(),
            Expr::Literal { value: Literal::String(s), .. } if s == "a\\nb"
        ));
        assert!(matches!(
            parse_expr("false").unwrap(),
            Expr::Literal { value: Literal::Boolean(false), .. }
        ));
        assert!(matches!(
            parse_expr("nil").unwrap(),
            Expr::Literal { value: Literal::Nil, .. }
        ));
    }

    #[test]
    fn test_operation() {
        match parse_expr("(add 1 (mul x 2))").unwrap() {
            Expr::Operation {
                operator, operands, ..
            } => {
                assert_eq!(operator, Operator::Add);
                assert_eq!(operands.len(), 2);
                assert!(matches!(
                    &operands[1],
                    Expr::Operation { operator: Operator::Mul, .. }
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_calls() {
        match parse_expr("(f a b)").unwrap() {
            Expr::FunctionCall {
                callee, arguments, ..
            } => {
                assert!(matches!(*callee, Expr::Identifier { ref name, .. } if name == "f"));
                assert_eq!(arguments.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }

        match parse_expr("(.speak d 1)").unwrap() {
            Expr::MethodCall {
                method,
                receiver,
                arguments,
                ..
            } => {
                assert_eq!(method, "speak");
                assert!(matches!(*receiver, Expr::Identifier { ref name, .. } if name == "d"));
                assert_eq!(arguments.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            parse_expr("((get fs 0) 1)").unwrap(),
            Expr::FunctionCall { .. }
        ));
    }

    #[test]
    fn test_member_forms() {
        match parse_expr("(. d name)").unwrap() {
            Expr::Operation {
                operator: Operator::Get,
                operands,
                ..
            } => {
                assert!(matches!(&operands[1], Expr::Identifier { name, .. } if name == "name"));
            }
            other => panic!("unexpected {:?}", other),
        }

        match parse_expr("d.owner.name").unwrap() {
            Expr::Operation {
                operator: Operator::Get,
                operands,
                ..
            } => {
                assert!(matches!(
                    &operands[1],
                    Expr::Literal { value: Literal::String(s), .. } if s == "name"
                ));
                assert!(matches!(&operands[0], Expr::Operation { operator: Operator::Get, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }

        match parse_expr("xs[(add i 1)]").unwrap() {
            Expr::Operation {
                operator: Operator::Get,
                operands,
                ..
            } => {
                assert!(matches!(&operands[1], Expr::Operation { operator: Operator::Add, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_type_expression() {
        match parse_expr("(M<Str I> \"a\" 1)").unwrap() {
            Expr::TypeExpression {
                data_type,
                arguments,
                ..
            } => {
                assert_eq!(data_type.to_string(), "M<Str I>");
                assert_eq!(arguments.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_types() {
        assert_eq!(parse_type("I").unwrap().to_string(), "I");
        assert_eq!(parse_type("L<M<Str P<Dog>>>").unwrap().to_string(), "L<M<Str P<Dog>>>");

        let array = parse_type("A<I 5>").unwrap();
        assert_eq!(array.params[1].name, "5");

        let func = parse_type("Fn<I Str : Bool Err>").unwrap();
        assert_eq!(func.params.len(), 2);
        assert_eq!(func.return_types.len(), 2);
        assert_eq!(func.to_string(), "Fn<I Str : Bool Err>");

        let no_params = parse_type("Fn<: I>").unwrap();
        assert!(no_params.params.is_empty());
        assert_eq!(no_params.return_types.len(), 1);
    }

    #[test]
    fn test_expression_errors() {
        let err = parse_expr("( f)").unwrap_err();
        assert_eq!(err.message(), "unexpected space after '('");

        let err = parse_expr("(.speak)").unwrap_err();
        assert_eq!(err.message(), "method call '.speak' needs a receiver");

        let err = parse_expr("(add 1 2").unwrap_err();
        assert_eq!(err.message(), "expected ')', found end of line");

        let err = parse_type("L<I").unwrap_err();
        assert_eq!(err.message(), "expected type parameter or '>', found end of line");
    }
}
