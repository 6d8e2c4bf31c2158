//! Main compiler module.
//!
//! This module contains the [`Compiler`] structure that walks the scope tree
//! built by the parser and lowers it to LLVM IR. It manages the LLVM module
//! and builder, declares functions lazily, lays out storage for variables
//! and verifies the finished module.

use std::{path::Path, rc::Rc};

use inkwell::{
    attributes::{Attribute, AttributeLoc},
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    targets::{CodeModel, InitializationConfig, RelocMode, Target, TargetMachine},
    types::{BasicMetadataTypeEnum, FunctionType},
    values::{FunctionValue, IntValue, PointerValue},
    AddressSpace, OptimizationLevel,
};
use tracing::{debug, trace, warn};

use crate::{
    ast::{
        scope::{FunctionId, ScopeChild, ScopeId, VariableId},
        types::NumericType,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
    parser::parser::parse,
    Position,
};

use super::{context::CompilerContext, stmt::gen_statement};

/// The state of one code generation run.
///
/// # Type Parameters
///
/// * `'ctx` - Lifetime of the LLVM context
pub struct Compiler<'ctx> {
    /// Reference to the LLVM context
    pub context: &'ctx Context,
    /// The LLVM module being built
    pub module: Module<'ctx>,
    /// The LLVM IR builder
    pub builder: Builder<'ctx>,
    /// Scopes, variables, functions and statements produced by the parser
    pub program: CompilerContext<'ctx>,
    /// Function whose body is being generated
    current_function: Option<FunctionId>,
}

impl<'ctx> Compiler<'ctx> {
    pub fn new(context: &'ctx Context, program: CompilerContext<'ctx>, module_name: &str) -> Self {
        Compiler {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            program,
            current_function: None,
        }
    }

    /// Writes the module as textual IR.
    pub fn save_module_to_file(&self, output_file: &Path) -> Result<(), Error> {
        self.module.print_to_file(output_file).map_err(|message| {
            Error::new(
                ErrorImpl::Io {
                    path: output_file.to_string_lossy().to_string(),
                    message: message.to_string(),
                },
                Position::null(),
            )
        })
    }

    pub fn print_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    /// Generates the whole program and verifies the resulting module.
    pub fn compile(&mut self) -> Result<(), Error> {
        self.configure_target();

        let global = self.program.global_scope();
        self.gen_global_scope(global)?;

        self.module.verify().map_err(|message| {
            Error::new(
                ErrorImpl::InvalidModule {
                    message: message.to_string(),
                },
                Position::null(),
            )
        })
    }

    /// Sets the host triple and data layout when a native target exists.
    fn configure_target(&self) {
        if let Err(message) = Target::initialize_native(&InitializationConfig::default()) {
            warn!(%message, "no native target, emitting target independent IR");
            return;
        }

        let target_triple = TargetMachine::get_default_triple();
        self.module.set_triple(&target_triple);

        let target_machine = Target::from_triple(&target_triple).ok().and_then(|target| {
            target.create_target_machine(
                &target_triple,
                "generic",
                "",
                OptimizationLevel::None,
                RelocMode::PIC,
                CodeModel::Default,
            )
        });

        if let Some(target_machine) = target_machine {
            self.module
                .set_data_layout(&target_machine.get_target_data().get_data_layout());
        }
    }

    fn gen_global_scope(&mut self, scope: ScopeId) -> Result<(), Error> {
        self.program.scope_mut(scope).generated = true;
        let children = self.program.scope(scope).children.clone();

        for child in children {
            match child {
                ScopeChild::Variable(variable) => self.gen_global_variable(variable),
                ScopeChild::Function(function) => self.gen_function(function)?,
                ScopeChild::Statement(statement) => {
                    return Err(Error::new(
                        ErrorImpl::OutsideFunction {
                            construct: String::from("Statement"),
                        },
                        self.program.statement(statement).position().clone(),
                    ))
                }
                ScopeChild::Scope(_) => {
                    return Err(Error::new(
                        ErrorImpl::OutsideFunction {
                            construct: String::from("Block"),
                        },
                        Position::null(),
                    ))
                }
            }
        }

        Ok(())
    }

    fn gen_global_variable(&mut self, id: VariableId) {
        let variable = self.program.variable(id);
        let ty = self.program.types.get(variable.ty).llvm_type(self.context);

        let global = self.module.add_global(
            ty,
            Some(AddressSpace::default()),
            variable.identifier.name(),
        );
        global.set_initializer(&variable.value.const_in(ty));

        trace!(variable = %variable.identifier, "declared global");
        self.program
            .variable_mut(id)
            .set_storage(global.as_pointer_value());
    }

    fn gen_function(&mut self, id: FunctionId) -> Result<(), Error> {
        let function = self.program.function(id).clone();
        if function.is_system {
            return Ok(());
        }

        debug!(function = %function.identifier, "generating function");

        let llvm_function = self.declare_function(id);
        self.create_function_block(llvm_function);
        self.current_function = Some(id);

        self.gen_scope(function.body)?;

        if !self.is_block_terminated() {
            if !function.is_void() {
                return Err(Error::new(
                    ErrorImpl::MissingReturn {
                        function: function.identifier.name().to_string(),
                    },
                    function.position,
                ));
            }

            self.builder
                .build_return(None)
                .map_err(|error| Error::backend(error, function.position.clone()))?;
        }

        self.current_function = None;
        Ok(())
    }

    /// Generates a function body or nested block, children in order.
    fn gen_scope(&mut self, scope: ScopeId) -> Result<(), Error> {
        if self.program.scope(scope).generated {
            return Err(Error::new(ErrorImpl::ScopeReentered, Position::null()));
        }
        self.program.scope_mut(scope).generated = true;

        let children = self.program.scope(scope).children.clone();

        for child in children {
            if self.is_block_terminated() {
                warn!("skipping code after return");
                break;
            }

            match child {
                ScopeChild::Variable(variable) => self.gen_local_variable(variable)?,
                ScopeChild::Statement(statement) => gen_statement(self, statement)?,
                ScopeChild::Scope(inner) => self.gen_scope(inner)?,
                ScopeChild::Function(function) => {
                    let function = self.program.function(function);
                    return Err(Error::new(
                        ErrorImpl::NestedFunction {
                            function: function.identifier.name().to_string(),
                        },
                        function.position.clone(),
                    ));
                }
            }
        }

        Ok(())
    }

    /// Allocates stack storage for a local or parameter and stores its
    /// initial value.
    fn gen_local_variable(&mut self, id: VariableId) -> Result<(), Error> {
        let variable = self.program.variable(id).clone();
        let ty = self.program.types.get(variable.ty);
        let llvm_type = ty.llvm_type(self.context);
        let position = variable.position.clone();

        let alloca = self
            .builder
            .build_alloca(llvm_type, variable.identifier.name())
            .map_err(|error| Error::backend(error, position.clone()))?;

        let value = match variable.param_index {
            Some(index) => self
                .current_llvm_function()
                .and_then(|function| function.get_nth_param(index))
                .map(|parameter| parameter.into_int_value())
                .ok_or_else(|| {
                    Error::backend(
                        format!("missing parameter `{}`", variable.identifier),
                        position.clone(),
                    )
                })?,
            None => self.program.materialize(id, self.context, None),
        };

        self.store(alloca, value, ty, &position)?;

        trace!(variable = %variable.identifier, "allocated local");
        let variable = self.program.variable_mut(id);
        variable.set_storage(alloca);
        variable.update(value, llvm_type);

        Ok(())
    }

    fn store(
        &self,
        pointer: PointerValue<'ctx>,
        value: IntValue<'ctx>,
        ty: NumericType,
        position: &Position,
    ) -> Result<(), Error> {
        let store = self
            .builder
            .build_store(pointer, value)
            .map_err(|error| Error::backend(error, position.clone()))?;
        store
            .set_alignment(ty.width.bits() / 8)
            .map_err(|error| Error::backend(error, position.clone()))
    }

    /// Current value of a variable: globals are loaded from memory, locals
    /// come from the cached backend value.
    pub fn read_variable(&mut self, id: VariableId, position: &Position) -> Result<IntValue<'ctx>, Error> {
        if self.program.variable(id).is_global {
            return self.load_variable(id, position);
        }

        Ok(self.program.materialize(id, self.context, None))
    }

    /// Emits a load from the variable's storage.
    pub fn load_variable(&self, id: VariableId, position: &Position) -> Result<IntValue<'ctx>, Error> {
        let variable = self.program.variable(id);
        let storage = variable.storage().ok_or_else(|| {
            Error::backend(
                format!("variable `{}` has no storage", variable.identifier),
                position.clone(),
            )
        })?;

        self.builder
            .build_load(storage, variable.identifier.name())
            .map(|value| value.into_int_value())
            .map_err(|error| Error::backend(error, position.clone()))
    }

    /// Stores `value` into the variable and, for locals, replaces the cached
    /// backend value.
    pub fn write_variable(
        &mut self,
        id: VariableId,
        value: IntValue<'ctx>,
        position: &Position,
    ) -> Result<(), Error> {
        let variable = self.program.variable(id);
        let ty = self.program.types.get(variable.ty);
        let is_global = variable.is_global;
        let storage = variable.storage().ok_or_else(|| {
            Error::backend(
                format!("variable `{}` has no storage", variable.identifier),
                position.clone(),
            )
        })?;

        self.store(storage, value, ty, position)?;

        if !is_global {
            self.program
                .variable_mut(id)
                .update(value, ty.llvm_type(self.context));
        }

        Ok(())
    }

    /// Returns the LLVM function for `id`, declaring its prototype on first
    /// use. Calls may reach a function before its body is generated.
    pub fn declare_function(&mut self, id: FunctionId) -> FunctionValue<'ctx> {
        if let Some(function) = self.program.function(id).backend() {
            return function;
        }

        let function = self.program.function(id);
        let name = function.identifier.name().to_string();
        let parameters = function
            .parameters
            .iter()
            .map(|parameter| self.program.type_of(*parameter).llvm_type(self.context).into())
            .collect::<Vec<BasicMetadataTypeEnum>>();

        let function_type = match function.return_type {
            Some(ty) => self
                .program
                .types
                .get(ty)
                .llvm_type(self.context)
                .fn_type(&parameters, false),
            None => self.context.void_type().fn_type(&parameters, false),
        };

        let llvm_function = self
            .module
            .get_function(&name)
            .unwrap_or_else(|| self.create_function_proto(&name, function_type));

        self.program.function_mut(id).set_backend(llvm_function);
        llvm_function
    }

    fn create_function_proto(&self, name: &str, function_type: FunctionType<'ctx>) -> FunctionValue<'ctx> {
        let function = self
            .module
            .add_function(name, function_type, Some(Linkage::External));

        let attributes = [
            self.context
                .create_enum_attribute(Attribute::get_named_enum_kind_id("uwtable"), 0),
            self.context
                .create_enum_attribute(Attribute::get_named_enum_kind_id("nounwind"), 0),
        ];

        for attribute in attributes.iter() {
            function.add_attribute(AttributeLoc::Function, *attribute);
        }

        function
    }

    /// Creates the entry block of `function` and positions the builder in it.
    fn create_function_block(&self, function: FunctionValue<'ctx>) {
        let entry = self.create_basic_block("entry", function);
        self.builder.position_at_end(entry);
    }

    fn create_basic_block(&self, name: &str, function: FunctionValue<'ctx>) -> BasicBlock<'ctx> {
        self.context.append_basic_block(function, name)
    }

    pub fn current_function(&self) -> Option<FunctionId> {
        self.current_function
    }

    fn current_llvm_function(&self) -> Option<FunctionValue<'ctx>> {
        self.current_function
            .and_then(|function| self.program.function(function).backend())
    }

    /// Whether the block under the builder already ends in a terminator.
    pub fn is_block_terminated(&self) -> bool {
        self.builder
            .get_insert_block()
            .and_then(|block| block.get_terminator())
            .is_some()
    }
}

/// Runs the whole pipeline on `source`: tokenize, parse into a fresh
/// [`CompilerContext`], then generate and verify the module.
pub fn compile<'ctx>(source: String, file_name: &str, context: &'ctx Context) -> Result<Compiler<'ctx>, Error> {
    let tokens = tokenize(source, Some(file_name.to_string()))?;

    let mut program = CompilerContext::new();
    parse(tokens, Rc::new(file_name.to_string()), &mut program)?;

    let mut compiler = Compiler::new(context, program, file_name);
    compiler.compile()?;

    Ok(compiler)
}
