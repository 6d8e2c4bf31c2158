//! The per-compilation symbol table.
//!
//! [`CompilerContext`] owns every variable, function, scope and statement in
//! an arena and hands out typed handles. The parser drives it: each completed
//! declaration or statement is registered into the active scope right away,
//! and names are resolved against the active scope stack at that moment.

use inkwell::{context::Context, types::IntType, values::IntValue};

use crate::{
    ast::{
        expressions::{AdvancedExpression, BasicExpression, CallExpression, Expression, Operator, Term},
        identifier::Identifier,
        scope::{Function, FunctionId, Scope, ScopeChild, ScopeId, StatementId, Symbol, VariableId},
        statements::{
            AssignmentSource, AssignmentStatement, CallStatement, ReturnStatement, ReturnValue,
            Statement,
        },
        types::{NumericType, TypeContainer, TypeId, Width},
        value::Value,
        variable::Variable,
    },
    errors::errors::{Error, ErrorImpl},
    Position,
};

use super::stdlib::SYSTEM_FUNCTIONS;

pub struct CompilerContext<'ctx> {
    pub types: TypeContainer,
    variables: Vec<Variable<'ctx>>,
    functions: Vec<Function<'ctx>>,
    scopes: Vec<Scope>,
    statements: Vec<Statement<'ctx>>,
    /// Innermost scope last. Never empty.
    active: Vec<ScopeId>,
    global: ScopeId,
    current_function: Option<FunctionId>,
}

impl Default for CompilerContext<'_> {
    fn default() -> Self {
        CompilerContext::new()
    }
}

impl<'ctx> CompilerContext<'ctx> {
    pub fn new() -> Self {
        let global = ScopeId(0);
        let mut context = CompilerContext {
            types: TypeContainer::new(),
            variables: vec![],
            functions: vec![],
            scopes: vec![Scope::new(None, None)],
            statements: vec![],
            active: vec![global],
            global,
            current_function: None,
        };

        context.types.intern(NumericType::new(Width::W32, true));

        let mut names = SYSTEM_FUNCTIONS.keys().copied().collect::<Vec<&str>>();
        names.sort();
        for name in names {
            context.register_system_function(name);
        }

        context
    }

    fn register_system_function(&mut self, name: &str) {
        let body = ScopeId(self.scopes.len());
        let id = FunctionId(self.functions.len());

        self.scopes.push(Scope::new(Some(self.global), Some(id)));
        let mut function = Function::new(Identifier::new(name), body, None, Position::null());
        function.is_system = true;
        self.functions.push(function);
        self.scopes[self.global.0]
            .children
            .push(ScopeChild::Function(id));
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    pub fn active_scope(&self) -> ScopeId {
        self.active[self.active.len() - 1]
    }

    pub fn current_function(&self) -> Option<FunctionId> {
        self.current_function
    }

    pub fn is_inside_function(&self) -> bool {
        self.current_function.is_some()
    }

    pub fn variable(&self, id: VariableId) -> &Variable<'ctx> {
        &self.variables[id.0]
    }

    pub fn variable_mut(&mut self, id: VariableId) -> &mut Variable<'ctx> {
        &mut self.variables[id.0]
    }

    pub fn function(&self, id: FunctionId) -> &Function<'ctx> {
        &self.functions[id.0]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function<'ctx> {
        &mut self.functions[id.0]
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &Function<'ctx>)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(index, function)| (FunctionId(index), function))
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    pub fn statement(&self, id: StatementId) -> &Statement<'ctx> {
        &self.statements[id.0]
    }

    pub fn statement_mut(&mut self, id: StatementId) -> &mut Statement<'ctx> {
        &mut self.statements[id.0]
    }

    pub fn type_of(&self, id: VariableId) -> NumericType {
        self.types.get(self.variables[id.0].ty)
    }

    /// Cached backend value of a variable, materializing its literal on
    /// first use.
    pub fn materialize(
        &mut self,
        id: VariableId,
        context: &'ctx Context,
        target: Option<IntType<'ctx>>,
    ) -> IntValue<'ctx> {
        self.variables[id.0].backend_value(&self.types, context, target)
    }

    /// Looks `identifier` up among the direct children of `scope` only.
    pub fn lookup_in(&self, scope: ScopeId, identifier: &Identifier) -> Option<Symbol> {
        self.scopes[scope.0]
            .children
            .iter()
            .find_map(|child| match child {
                ScopeChild::Variable(id) if self.variables[id.0].identifier == *identifier => {
                    Some(Symbol::Variable(*id))
                }
                ScopeChild::Function(id) if self.functions[id.0].identifier == *identifier => {
                    Some(Symbol::Function(*id))
                }
                _ => None,
            })
    }

    /// Resolves from the innermost active scope outwards; the first match
    /// shadows everything further out.
    pub fn resolve(&self, identifier: &Identifier) -> Option<Symbol> {
        self.active
            .iter()
            .rev()
            .find_map(|scope| self.lookup_in(*scope, identifier))
    }

    pub fn resolve_variable(
        &self,
        identifier: &Identifier,
        position: &Position,
    ) -> Result<VariableId, Error> {
        match self.resolve(identifier) {
            Some(Symbol::Variable(id)) => Ok(id),
            _ => Err(Error::new(
                ErrorImpl::UndeclaredIdentifier {
                    identifier: identifier.name().to_string(),
                },
                position.clone(),
            )),
        }
    }

    /// Whether `target` can be named from code living in `from`: it is
    /// global, or declared in `from` or one of its enclosing scopes.
    pub fn is_visible(&self, from: ScopeId, target: VariableId) -> bool {
        let variable = &self.variables[target.0];
        if variable.is_global {
            return true;
        }

        let mut scope = Some(from);
        while let Some(current) = scope {
            if variable.scope == Some(current) {
                return true;
            }
            scope = self.scopes[current.0].parent;
        }

        false
    }

    /// Registers `child` as the newest entity of the active scope.
    pub fn add_entity(&mut self, child: ScopeChild) {
        let scope = self.active_scope();
        self.scopes[scope.0].children.push(child);
    }

    fn ensure_undeclared(&self, identifier: &Identifier, position: &Position) -> Result<(), Error> {
        if self.lookup_in(self.active_scope(), identifier).is_some() {
            return Err(Error::new(
                ErrorImpl::AlreadyDeclared {
                    identifier: identifier.name().to_string(),
                },
                position.clone(),
            ));
        }

        Ok(())
    }

    /// Declares a variable in the active scope. Variables of the global
    /// scope become module-level globals.
    pub fn declare_variable(
        &mut self,
        identifier: Identifier,
        ty: TypeId,
        value: Value,
        position: Position,
    ) -> Result<VariableId, Error> {
        self.ensure_undeclared(&identifier, &position)?;

        let scope = self.active_scope();
        let mut variable = Variable::new(identifier, ty, value, position);
        variable.scope = Some(scope);
        variable.is_global = scope == self.global;

        let id = VariableId(self.variables.len());
        self.variables.push(variable);
        self.add_entity(ScopeChild::Variable(id));

        Ok(id)
    }

    /// Declares a function and its parameters without entering its body.
    ///
    /// Fails before registering anything when a function is already being
    /// defined, when the name is taken, or when the parameter names and
    /// types do not pair up.
    pub fn declare_function(
        &mut self,
        identifier: Identifier,
        parameters: Vec<(Identifier, Position)>,
        parameter_types: Vec<TypeId>,
        return_type: Option<TypeId>,
        position: Position,
    ) -> Result<FunctionId, Error> {
        if self.is_inside_function() {
            return Err(Error::new(
                ErrorImpl::NestedFunction {
                    function: identifier.name().to_string(),
                },
                position,
            ));
        }

        self.ensure_undeclared(&identifier, &position)?;

        if parameters.len() != parameter_types.len() {
            return Err(Error::new(
                ErrorImpl::ParameterCountMismatch {
                    names: parameters.len(),
                    types: parameter_types.len(),
                },
                position,
            ));
        }

        for (index, (name, name_position)) in parameters.iter().enumerate() {
            if parameters[..index].iter().any(|(other, _)| other == name) {
                return Err(Error::new(
                    ErrorImpl::AlreadyDeclared {
                        identifier: name.name().to_string(),
                    },
                    name_position.clone(),
                ));
            }
        }

        let id = FunctionId(self.functions.len());
        let body = ScopeId(self.scopes.len());
        let parent = self.active_scope();

        self.scopes.push(Scope::new(Some(parent), Some(id)));
        self.functions
            .push(Function::new(identifier, body, return_type, position));
        self.add_entity(ScopeChild::Function(id));

        for (index, ((name, name_position), ty)) in
            parameters.into_iter().zip(parameter_types).enumerate()
        {
            let mut variable = Variable::new(name, ty, Value::None, name_position);
            variable.scope = Some(body);
            variable.param_index = Some(index as u32);

            let variable_id = VariableId(self.variables.len());
            self.variables.push(variable);
            self.scopes[body.0]
                .children
                .push(ScopeChild::Variable(variable_id));
            self.functions[id.0].parameters.push(variable_id);
        }

        Ok(id)
    }

    /// Makes `function`'s body the active scope.
    pub fn enter_function(&mut self, function: FunctionId, position: Position) -> Result<(), Error> {
        if self.is_inside_function() {
            return Err(Error::new(
                ErrorImpl::NestedFunction {
                    function: self.functions[function.0].identifier.name().to_string(),
                },
                position,
            ));
        }

        self.active.push(self.functions[function.0].body);
        self.current_function = Some(function);
        Ok(())
    }

    /// Opens an anonymous block nested in the active scope.
    pub fn enter_block(&mut self, position: Position) -> Result<ScopeId, Error> {
        let Some(function) = self.current_function else {
            return Err(Error::new(
                ErrorImpl::OutsideFunction {
                    construct: String::from("Block"),
                },
                position,
            ));
        };

        let id = ScopeId(self.scopes.len());
        let parent = self.active_scope();
        self.scopes.push(Scope::new(Some(parent), Some(function)));
        self.add_entity(ScopeChild::Scope(id));
        self.active.push(id);

        Ok(id)
    }

    /// Closes the active scope. Closing a function body leaves the function.
    pub fn exit_scope(&mut self, position: Position) -> Result<ScopeId, Error> {
        if self.active.len() == 1 {
            return Err(Error::new(ErrorImpl::GlobalScopeExit, position));
        }

        let scope = self.active.pop().unwrap_or(self.global);
        if let Some(function) = self.current_function {
            if self.functions[function.0].body == scope {
                self.current_function = None;
            }
        }

        Ok(scope)
    }

    /// Stores a finished statement and registers it in the active scope.
    pub fn add_statement(&mut self, statement: Statement<'ctx>) -> Result<StatementId, Error> {
        if !self.is_inside_function() {
            return Err(Error::new(
                ErrorImpl::OutsideFunction {
                    construct: String::from("Statement"),
                },
                statement.position().clone(),
            ));
        }

        let id = StatementId(self.statements.len());
        self.statements.push(statement);
        self.add_entity(ScopeChild::Statement(id));

        Ok(id)
    }

    pub fn term(&self, identifier: &Identifier, position: &Position) -> Result<Term, Error> {
        match identifier.literal_value() {
            Some(value) => Ok(Term::Literal(value)),
            None => Ok(Term::Variable(self.resolve_variable(identifier, position)?)),
        }
    }

    pub fn basic_expression(
        &self,
        identifier: &Identifier,
        position: Position,
    ) -> Result<Expression, Error> {
        Ok(Expression::Basic(BasicExpression {
            term: self.term(identifier, &position)?,
            position,
        }))
    }

    pub fn advanced_expression(
        &self,
        operator: Operator,
        left: Expression,
        right: Expression,
        position: Position,
    ) -> Expression {
        Expression::Advanced(AdvancedExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            position,
        })
    }

    /// Resolves the callee and every argument now, so a bad call fails at
    /// the point it is written.
    pub fn call_expression(
        &self,
        name: Identifier,
        arguments: Vec<Identifier>,
        position: Position,
    ) -> Result<CallExpression, Error> {
        let function = match self.resolve(&name) {
            Some(Symbol::Function(function)) => function,
            Some(Symbol::Variable(_)) => {
                return Err(Error::new(
                    ErrorImpl::NotAFunction {
                        identifier: name.name().to_string(),
                    },
                    position,
                ))
            }
            None => {
                return Err(Error::new(
                    ErrorImpl::UndeclaredIdentifier {
                        identifier: name.name().to_string(),
                    },
                    position,
                ))
            }
        };

        let callee = &self.functions[function.0];
        if !callee.is_system && callee.parameters.len() != arguments.len() {
            return Err(Error::new(
                ErrorImpl::ArgumentCountMismatch {
                    function: name.name().to_string(),
                    expected: callee.parameters.len(),
                    received: arguments.len(),
                },
                position,
            ));
        }

        let arguments = arguments
            .iter()
            .map(|argument| self.term(argument, &position))
            .collect::<Result<Vec<Term>, Error>>()?;

        Ok(CallExpression {
            name,
            function,
            arguments,
            position,
        })
    }

    pub fn assignment_statement(
        &self,
        target: &Identifier,
        source: Option<AssignmentSource>,
        position: Position,
    ) -> Result<Statement<'ctx>, Error> {
        let target = self.resolve_variable(target, &position)?;
        let Some(source) = source else {
            return Err(Error::new(ErrorImpl::NullExpression, position));
        };

        Ok(Statement::Assignment(AssignmentStatement {
            target,
            source,
            position,
        }))
    }

    pub fn return_statement(
        &self,
        value: Option<&Identifier>,
        position: Position,
    ) -> Result<Statement<'ctx>, Error> {
        let Some(function) = self.current_function else {
            return Err(Error::new(
                ErrorImpl::OutsideFunction {
                    construct: String::from("Return"),
                },
                position,
            ));
        };

        let value = match value {
            None => ReturnValue::Void,
            Some(identifier) => match self.term(identifier, &position)? {
                Term::Literal(literal) => ReturnValue::Literal(literal),
                Term::Variable(variable) => ReturnValue::Variable(variable),
            },
        };

        Ok(Statement::Return(ReturnStatement::new(function, value, position)))
    }

    pub fn call_statement(&self, call: CallExpression) -> Statement<'ctx> {
        Statement::Call(CallStatement { call })
    }
}
