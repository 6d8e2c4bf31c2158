use crate::Position;

use super::{
    identifier::Identifier,
    scope::{FunctionId, VariableId},
    variable::Variable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Less,
    Greater,
    Equals,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            "<" => Some(Operator::Less),
            ">" => Some(Operator::Greater),
            "==" => Some(Operator::Equals),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::Equals => "==",
        }
    }

    pub fn is_relational(&self) -> bool {
        matches!(self, Operator::Less | Operator::Greater | Operator::Equals)
    }
}

/// A leaf: either a resolved variable or an unsigned literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Variable(VariableId),
    Literal(u64),
}

#[derive(Debug, Clone)]
pub enum Expression {
    Basic(BasicExpression),
    Advanced(AdvancedExpression),
    Call(CallExpression),
}

impl Expression {
    pub fn position(&self) -> &Position {
        match self {
            Expression::Basic(basic) => &basic.position,
            Expression::Advanced(advanced) => &advanced.position,
            Expression::Call(call) => &call.position,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BasicExpression {
    pub term: Term,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct AdvancedExpression {
    pub operator: Operator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub position: Position,
}

/// A call whose callee and arguments were resolved when it was built.
#[derive(Debug, Clone)]
pub struct CallExpression {
    pub name: Identifier,
    pub function: FunctionId,
    pub arguments: Vec<Term>,
    pub position: Position,
}

/// Result of evaluating an expression.
///
/// Scope-owned variables are only ever referenced; temporaries are owned by
/// whoever holds the operand and are dropped with it.
#[derive(Debug, Clone)]
pub enum Operand<'ctx> {
    Reference(VariableId),
    Owned(Variable<'ctx>),
}
