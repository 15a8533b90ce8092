//! Reference interpreter for checking that optimised IR behaves like the
//! original.
//!
//! Values are `u128` with wrapping arithmetic. Storage starts zeroed. The
//! observable behaviour of a run is its [`Event`] sequence: storage writes,
//! logs and a final revert, in the order they happen. Calls to user-defined
//! functions are not events, so adding or removing forwarding functions does
//! not change the trace.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use yulopt_core::ast::{Block, Expression, FunctionDefinition, Name, Program, Statement};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Store { slot: u128, value: u128 },
    Log(Vec<u128>),
    Revert { offset: u128, size: u128 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    pub events: Vec<Event>,
    pub storage: BTreeMap<u128, u128>,
    pub reverted: bool,
}

/// Executor for IR programs in tests.
#[derive(Debug, Clone)]
pub struct Interpreter {
    step_limit: usize,
    max_call_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            step_limit: 100_000,
            max_call_depth: 256,
        }
    }

    pub fn with_step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Runs the top-level block of `program`.
    ///
    /// # Errors
    ///
    /// Returns an error for undefined variables or functions, arity
    /// mismatches and exceeded step or call-depth limits. A `revert` is not
    /// an error; it ends the run with `reverted` set.
    pub fn run(&self, program: &Program) -> Result<Execution, String> {
        let mut functions = FxHashMap::default();
        collect_functions(&program.root, &mut functions);

        let mut machine = Machine {
            functions,
            execution: Execution::default(),
            steps: 0,
            depth: 0,
            step_limit: self.step_limit,
            max_call_depth: self.max_call_depth,
        };
        let mut frame = Frame::default();

        match machine.block(&program.root, &mut frame) {
            Ok(Flow::Normal) => {}
            Ok(flow) => return Err(format!("unexpected {flow:?} at top level")),
            Err(Interrupt::Reverted) => machine.execution.reverted = true,
            Err(Interrupt::Failed(message)) => return Err(message),
        }
        Ok(machine.execution)
    }
}

fn collect_functions<'p>(block: &'p Block, out: &mut FxHashMap<&'p str, &'p FunctionDefinition>) {
    for stmt in &block.statements {
        match stmt {
            Statement::FunctionDefinition(func) => {
                out.insert(func.name.as_str(), func);
                collect_functions(&func.body, out);
            }
            Statement::If { body, .. } => collect_functions(body, out),
            Statement::Switch { cases, .. } => {
                for case in cases {
                    collect_functions(&case.body, out);
                }
            }
            Statement::ForLoop { pre, post, body, .. } => {
                collect_functions(pre, out);
                collect_functions(post, out);
                collect_functions(body, out);
            }
            Statement::Block(inner) => collect_functions(inner, out),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Normal,
    Break,
    Continue,
    Leave,
}

#[derive(Debug)]
enum Interrupt {
    Reverted,
    Failed(String),
}

type Step<T> = Result<T, Interrupt>;

fn fail<T>(message: impl Into<String>) -> Step<T> {
    Err(Interrupt::Failed(message.into()))
}

#[derive(Debug, Default)]
struct Frame {
    variables: FxHashMap<Name, u128>,
}

impl Frame {
    fn get(&self, name: &Name) -> Step<u128> {
        match self.variables.get(name) {
            Some(value) => Ok(*value),
            None => fail(format!("undefined variable `{name}`")),
        }
    }

    fn set(&mut self, name: &Name, value: u128) {
        self.variables.insert(name.clone(), value);
    }
}

struct Machine<'p> {
    functions: FxHashMap<&'p str, &'p FunctionDefinition>,
    execution: Execution,
    steps: usize,
    depth: usize,
    step_limit: usize,
    max_call_depth: usize,
}

impl<'p> Machine<'p> {
    fn block(&mut self, block: &'p Block, frame: &mut Frame) -> Step<Flow> {
        for stmt in &block.statements {
            let flow = self.statement(stmt, frame)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn statement(&mut self, stmt: &'p Statement, frame: &mut Frame) -> Step<Flow> {
        self.steps += 1;
        if self.steps > self.step_limit {
            return fail("step limit exceeded");
        }

        match stmt {
            Statement::ExpressionStatement(expr) => {
                let values = self.evaluate(expr, frame)?;
                if !values.is_empty() {
                    return fail("expression statement produced values");
                }
            }
            Statement::Assignment { targets, value } => {
                let values = self.evaluate(value, frame)?;
                self.bind(targets, values, frame)?;
            }
            Statement::VariableDeclaration { names, value } => match value {
                Some(value) => {
                    let values = self.evaluate(value, frame)?;
                    self.bind(names, values, frame)?;
                }
                None => {
                    for name in names {
                        frame.set(name, 0);
                    }
                }
            },
            Statement::FunctionDefinition(_) => {}
            Statement::If { condition, body } => {
                if self.single(condition, frame)? != 0 {
                    return self.block(body, frame);
                }
            }
            Statement::Switch { expression, cases } => {
                let selector = self.single(expression, frame)?;
                let chosen = cases
                    .iter()
                    .find(|case| matches!(&case.value, Some(lit) if lit.value() == selector))
                    .or_else(|| cases.iter().find(|case| case.value.is_none()));
                if let Some(case) = chosen {
                    return self.block(&case.body, frame);
                }
            }
            Statement::ForLoop {
                pre,
                condition,
                post,
                body,
            } => {
                let flow = self.block(pre, frame)?;
                if flow != Flow::Normal {
                    return Ok(flow);
                }
                while self.single(condition, frame)? != 0 {
                    match self.block(body, frame)? {
                        Flow::Break => break,
                        Flow::Leave => return Ok(Flow::Leave),
                        Flow::Normal | Flow::Continue => {}
                    }
                    if self.block(post, frame)? == Flow::Leave {
                        return Ok(Flow::Leave);
                    }
                    self.steps += 1;
                    if self.steps > self.step_limit {
                        return fail("step limit exceeded");
                    }
                }
            }
            Statement::Break => return Ok(Flow::Break),
            Statement::Continue => return Ok(Flow::Continue),
            Statement::Leave => return Ok(Flow::Leave),
            Statement::Block(block) => return self.block(block, frame),
        }
        Ok(Flow::Normal)
    }

    fn bind(&mut self, names: &[Name], values: Vec<u128>, frame: &mut Frame) -> Step<()> {
        if names.len() != values.len() {
            return fail(format!(
                "cannot bind {} value(s) to {} variable(s)",
                values.len(),
                names.len()
            ));
        }
        for (name, value) in names.iter().zip(values) {
            frame.set(name, value);
        }
        Ok(())
    }

    fn single(&mut self, expr: &'p Expression, frame: &mut Frame) -> Step<u128> {
        match self.evaluate(expr, frame)?.as_slice() {
            [value] => Ok(*value),
            values => fail(format!("expected one value, got {}", values.len())),
        }
    }

    /// Arguments are evaluated left to right.
    fn evaluate(&mut self, expr: &'p Expression, frame: &mut Frame) -> Step<Vec<u128>> {
        match expr {
            Expression::Identifier(name) => Ok(vec![frame.get(name)?]),
            Expression::Literal(lit) => Ok(vec![lit.value()]),
            Expression::FunctionCall(call) => {
                let mut arguments = Vec::with_capacity(call.arguments.len());
                for arg in &call.arguments {
                    arguments.push(self.single(arg, frame)?);
                }
                match self.functions.get(call.function_name.as_str()).copied() {
                    Some(func) => self.call(func, arguments),
                    None => self.builtin(call.function_name.as_str(), &arguments),
                }
            }
        }
    }

    fn call(&mut self, func: &'p FunctionDefinition, arguments: Vec<u128>) -> Step<Vec<u128>> {
        if func.parameters.len() != arguments.len() {
            return fail(format!(
                "`{}` expects {} argument(s), got {}",
                func.name,
                func.parameters.len(),
                arguments.len()
            ));
        }
        if self.depth >= self.max_call_depth {
            return fail("call depth exceeded");
        }

        let mut frame = Frame::default();
        for (name, value) in func.parameters.iter().zip(arguments) {
            frame.set(name, value);
        }
        for name in &func.return_variables {
            frame.set(name, 0);
        }

        self.depth += 1;
        let flow = self.block(&func.body, &mut frame);
        self.depth -= 1;
        match flow? {
            Flow::Normal | Flow::Leave => {}
            other => return fail(format!("{other:?} outside of a loop in `{}`", func.name)),
        }

        func.return_variables
            .iter()
            .map(|name| frame.get(name))
            .collect()
    }

    fn builtin(&mut self, name: &str, args: &[u128]) -> Step<Vec<u128>> {
        let bool_value = |b: bool| vec![u128::from(b)];
        let value = match (name, args) {
            ("add", [a, b]) => vec![a.wrapping_add(*b)],
            ("sub", [a, b]) => vec![a.wrapping_sub(*b)],
            ("mul", [a, b]) => vec![a.wrapping_mul(*b)],
            ("div", [a, b]) => vec![a.checked_div(*b).unwrap_or(0)],
            ("mod", [a, b]) => vec![a.checked_rem(*b).unwrap_or(0)],
            ("lt", [a, b]) => bool_value(a < b),
            ("gt", [a, b]) => bool_value(a > b),
            ("eq", [a, b]) => bool_value(a == b),
            ("iszero", [a]) => bool_value(*a == 0),
            ("and", [a, b]) => vec![a & b],
            ("or", [a, b]) => vec![a | b],
            ("not", [a]) => vec![!a],
            ("sload", [slot]) => vec![self.execution.storage.get(slot).copied().unwrap_or(0)],
            ("sstore", [slot, value]) => {
                self.execution.storage.insert(*slot, *value);
                self.execution.events.push(Event::Store {
                    slot: *slot,
                    value: *value,
                });
                Vec::new()
            }
            ("log", values) => {
                self.execution.events.push(Event::Log(values.to_vec()));
                Vec::new()
            }
            ("revert", [offset, size]) => {
                self.execution.events.push(Event::Revert {
                    offset: *offset,
                    size: *size,
                });
                return Err(Interrupt::Reverted);
            }
            _ => {
                return fail(format!(
                    "unknown function `{name}` with {} argument(s)",
                    args.len()
                ))
            }
        };
        Ok(value)
    }
}
