//! Recursive-descent parser, one method per precedence level.

use super::lexer::{Spanned, Token};
use super::{BinaryOp, CompareOp, Expr, FormulaError, Function, MAX_NESTING};

pub(crate) fn parse(tokens: &[Spanned]) -> Result<Expr, FormulaError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.or_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some((token, at)) => Err(FormulaError::UnexpectedToken {
            found: token.describe(),
            at: *at,
        }),
    }
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Spanned> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<&'a Token> {
        self.peek().map(|(token, _)| token)
    }

    fn advance(&mut self) -> Result<&'a Spanned, FormulaError> {
        let spanned = self.tokens.get(self.pos).ok_or(FormulaError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(spanned)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek_token() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), FormulaError> {
        let (token, at) = self.advance()?;
        if token == expected {
            Ok(())
        } else {
            Err(FormulaError::UnexpectedToken {
                found: token.describe(),
                at: *at,
            })
        }
    }

    /// Every recursive entry point goes through here so that deeply nested
    /// input fails cleanly instead of exhausting the stack.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, FormulaError>,
    ) -> Result<T, FormulaError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(FormulaError::NestingTooDeep);
        }
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn or_expr(&mut self) -> Result<Expr, FormulaError> {
        self.nested(|p| {
            let mut operands = vec![p.and_expr()?];
            while p.eat(&Token::Or) {
                operands.push(p.and_expr()?);
            }
            Ok(flatten(operands, Expr::Or))
        })
    }

    fn and_expr(&mut self) -> Result<Expr, FormulaError> {
        let mut operands = vec![self.not_expr()?];
        while self.eat(&Token::And) {
            operands.push(self.not_expr()?);
        }
        Ok(flatten(operands, Expr::And))
    }

    fn not_expr(&mut self) -> Result<Expr, FormulaError> {
        if self.eat(&Token::Not) {
            let inner = self.nested(Self::not_expr)?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, FormulaError> {
        let lhs = self.additive()?;
        let Some(op) = self.peek_token().and_then(compare_op) else {
            return Ok(lhs);
        };
        self.pos += 1;
        let rhs = self.additive()?;
        if let Some((token, at)) = self.peek()
            && compare_op(token).is_some()
        {
            return Err(FormulaError::ChainedComparison { at: *at });
        }
        Ok(Expr::Compare(op, Box::new(lhs), Box::new(rhs)))
    }

    /// Operator runs such as `1 + 2 - 3 + ...` become one flat [`Expr::Chain`]
    /// rather than a tree as deep as the run is long.
    fn additive(&mut self) -> Result<Expr, FormulaError> {
        let first = self.term()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(chain(first, rest)),
            };
            self.pos += 1;
            rest.push((op, self.term()?));
        }
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let first = self.unary()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::SlashSlash) => BinaryOp::FloorDiv,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => return Ok(chain(first, rest)),
            };
            self.pos += 1;
            rest.push((op, self.unary()?));
        }
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        match self.peek_token() {
            Some(Token::Minus) => {
                self.pos += 1;
                let inner = self.nested(Self::unary)?;
                Ok(Expr::Negate(Box::new(inner)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.nested(Self::unary)
            }
            _ => self.power(),
        }
    }

    /// `a ** b ** c` is `a ** (b ** c)`, and `-2 ** 2` is `-(2 ** 2)`, but the
    /// exponent itself may carry a sign: `2 ** -1`.
    fn power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.primary()?;
        if self.eat(&Token::Power) {
            let exponent = self.nested(Self::unary)?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let (token, at) = self.advance()?;
        let at = *at;
        match token {
            Token::Number(value) => Ok(Expr::Number(*value)),
            Token::LParen => {
                let inner = self.or_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::LBrace => {
                let (token, at) = self.advance()?;
                let Token::Ident(name) = token else {
                    return Err(FormulaError::UnexpectedToken {
                        found: token.describe(),
                        at: *at,
                    });
                };
                let name = name.clone();
                self.expect(&Token::RBrace)?;
                Ok(Expr::Variable(name))
            }
            Token::Ident(name) => {
                let name = name.clone();
                if self.eat(&Token::LParen) {
                    self.call(&name)
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            other => Err(FormulaError::UnexpectedToken {
                found: other.describe(),
                at,
            }),
        }
    }

    /// Arguments of a call whose `(` has been consumed.
    fn call(&mut self, name: &str) -> Result<Expr, FormulaError> {
        let function =
            Function::lookup(name).ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.or_expr()?);
                if self.eat(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RParen)?;
                break;
            }
        }
        function.check_arity(args.len())?;
        Ok(Expr::Call(function, args))
    }
}

fn chain(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    if rest.is_empty() {
        first
    } else {
        Expr::Chain(Box::new(first), rest)
    }
}

fn flatten(mut operands: Vec<Expr>, node: fn(Vec<Expr>) -> Expr) -> Expr {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        node(operands)
    }
}

fn compare_op(token: &Token) -> Option<CompareOp> {
    match token {
        Token::EqEq => Some(CompareOp::Eq),
        Token::NotEq => Some(CompareOp::Ne),
        Token::Lt => Some(CompareOp::Lt),
        Token::Le => Some(CompareOp::Le),
        Token::Gt => Some(CompareOp::Gt),
        Token::Ge => Some(CompareOp::Ge),
        _ => None,
    }
}
