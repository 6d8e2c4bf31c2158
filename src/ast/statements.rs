use inkwell::values::InstructionValue;

use crate::Position;

use super::{
    expressions::{CallExpression, Expression},
    scope::{FunctionId, VariableId},
};

#[derive(Debug, Clone)]
pub enum Statement<'ctx> {
    Assignment(AssignmentStatement),
    Return(ReturnStatement<'ctx>),
    Call(CallStatement),
}

impl Statement<'_> {
    pub fn position(&self) -> &Position {
        match self {
            Statement::Assignment(assignment) => &assignment.position,
            Statement::Return(ret) => &ret.position,
            Statement::Call(call) => &call.call.position,
        }
    }
}

/// The right hand side of an assignment. The form is fixed when the
/// statement is built.
#[derive(Debug, Clone)]
pub enum AssignmentSource {
    Variable(VariableId),
    Literal(u64),
    Expression(Expression),
}

#[derive(Debug, Clone)]
pub struct AssignmentStatement {
    pub target: VariableId,
    pub source: AssignmentSource,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnValue {
    Void,
    Variable(VariableId),
    Literal(u64),
}

#[derive(Debug, Clone)]
pub struct ReturnStatement<'ctx> {
    pub function: FunctionId,
    pub value: ReturnValue,
    pub position: Position,
    emitted: Option<InstructionValue<'ctx>>,
}

impl<'ctx> ReturnStatement<'ctx> {
    pub fn new(function: FunctionId, value: ReturnValue, position: Position) -> Self {
        ReturnStatement {
            function,
            value,
            position,
            emitted: None,
        }
    }

    /// The `ret` instruction, once it has been generated.
    pub fn emitted(&self) -> Option<InstructionValue<'ctx>> {
        self.emitted
    }

    pub fn set_emitted(&mut self, instruction: InstructionValue<'ctx>) {
        self.emitted = Some(instruction);
    }
}

#[derive(Debug, Clone)]
pub struct CallStatement {
    pub call: CallExpression,
}
