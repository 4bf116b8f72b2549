use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};
use hashbrown::HashMap;
use regex::Regex;
use tracing::{debug, trace};

use crate::ast::BinaryOp;
use crate::builtins;
use crate::types::FUNC_TYPES;
use crate::values::{Function, Value};
use crate::vm::operators;
use crate::vm::stack::Stack;
use crate::vm::{Instruction, Program, RuntimeError, RuntimeErrorKind};

type StepResult<T> = Result<T, RuntimeErrorKind>;

/// State of one predicate loop.
#[derive(Debug)]
struct Scope {
    array: Arc<Vec<Value>>,
    index: usize,
    count: i64,
    acc: Value,
}

/// The channels a debugged VM talks to its [`Debugger`](super::Debugger)
/// through.
pub(crate) struct DebugHooks {
    pub(crate) steps: Receiver<()>,
    /// Hands the controller the position feed of each new run.
    pub(crate) feeds: Sender<Receiver<usize>>,
    /// The current run's feed; dropping it closes the feed.
    pub(crate) positions: Option<Sender<usize>>,
}

enum Flow {
    Continue,
    Return(Value),
}

/// Stack-based bytecode interpreter.
///
/// A `Vm` can run any number of programs one after the other; each run
/// starts from empty stacks.
pub struct Vm {
    stack: Stack<Value>,
    scopes: Vec<Scope>,
    regexes: HashMap<String, Regex>,
    pub(crate) debug: Option<DebugHooks>,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    pub fn new() -> Self {
        Self {
            stack: Stack::new(),
            scopes: Vec::new(),
            regexes: HashMap::new(),
            debug: None,
        }
    }

    /// Number of values left on the operand stack.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of open predicate loops.
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Executes `program` against `env` and returns the value it produces.
    ///
    /// On error both stacks are cleared. In debug mode every run gets its own
    /// position feed, closed when the run ends whatever the outcome.
    pub fn run(&mut self, program: &Program, env: &Value) -> Result<Value, RuntimeError> {
        self.stack.clear();
        self.scopes.clear();
        debug!(instructions = program.len(), "vm run");
        if let Some(hooks) = &mut self.debug {
            let (positions, feed) = channel::bounded(1);
            // A missing controller is reported by the first step.
            let _ = hooks.feeds.send(feed);
            hooks.positions = Some(positions);
        }

        let result = self.execute(program, env);
        if let Err(err) = &result {
            debug!(error = %err, pos = err.pos, "vm run failed");
            self.stack.clear();
            self.scopes.clear();
        }
        if let Some(hooks) = &mut self.debug {
            hooks.positions = None;
        }
        result
    }

    fn execute(&mut self, program: &Program, env: &Value) -> Result<Value, RuntimeError> {
        let mut ip = 0;
        while ip < program.instructions.len() {
            let pos = program.position(ip);
            let at = |kind| RuntimeError::new(kind, pos);

            if let Some(hooks) = &self.debug {
                hooks
                    .steps
                    .recv()
                    .map_err(|_| at(RuntimeErrorKind::DebuggerDetached))?;
            }

            let executed = ip;
            let instruction = program.instructions[ip];
            trace!(ip, ?instruction, depth = self.stack.len(), "step");
            ip += 1;
            let flow = self
                .step(program, env, instruction, &mut ip)
                .map_err(at)?;

            if let Some(DebugHooks {
                positions: Some(positions),
                ..
            }) = &self.debug
            {
                positions
                    .send(executed)
                    .map_err(|_| at(RuntimeErrorKind::DebuggerDetached))?;
            }

            if let Flow::Return(value) = flow {
                return Ok(value);
            }
        }
        // Running off the end yields whatever is on top.
        let pos = program.position(program.len().saturating_sub(1));
        if self.stack.is_empty() {
            return Ok(Value::Nil);
        }
        self.stack.pop().map_err(|kind| RuntimeError::new(kind, pos))
    }

    fn step(
        &mut self,
        program: &Program,
        env: &Value,
        instruction: Instruction,
        ip: &mut usize,
    ) -> StepResult<Flow> {
        use Instruction::*;

        match instruction {
            // === Stack & Constants ===
            Push(index) => {
                let value = constant(program, index)?.clone();
                self.stack.push(value);
            }
            Pop => {
                self.stack.pop()?;
            }

            // === Environment ===
            LoadField { index, name } => {
                let name = constant_str(program, name)?;
                let value = match env {
                    Value::Struct(record) => record.field_at(index as usize, name).cloned(),
                    _ => None,
                };
                let value = match value {
                    Some(value) => value,
                    None => load_name(env, name)?,
                };
                self.stack.push(value);
            }
            LoadMethod { index, name } => {
                let name = constant_str(program, name)?;
                let method = match env {
                    Value::Struct(record) => record
                        .method_at(index as usize, name)
                        .map(|method| Value::Func(method.bind(env.clone()))),
                    _ => None,
                };
                let value = match method {
                    Some(method) => method,
                    None => load_name(env, name)?,
                };
                self.stack.push(value);
            }
            LoadKey(name) => {
                let name = constant_str(program, name)?;
                let value = match env {
                    Value::Map(map) => map.get(name).cloned().unwrap_or_default(),
                    _ => load_name(env, name)?,
                };
                self.stack.push(value);
            }
            LoadName(name) => {
                let value = load_name(env, constant_str(program, name)?)?;
                self.stack.push(value);
            }

            // === Member Access ===
            Fetch => {
                let property = self.stack.pop()?;
                let object = self.stack.pop()?;
                self.stack.push(operators::fetch(&object, &property)?);
            }
            FetchField { index, name } => {
                let object = self.stack.pop()?;
                let key = constant(program, name)?;
                let field = match (&object, key.as_str()) {
                    (Value::Struct(record), Some(name)) => {
                        record.field_at(index as usize, name).cloned()
                    }
                    _ => None,
                };
                let value = match field {
                    Some(value) => value,
                    None => operators::fetch(&object, key)?,
                };
                self.stack.push(value);
            }
            FetchMethod { index, name } => {
                let object = self.stack.pop()?;
                let key = constant(program, name)?;
                let method = match (&object, key.as_str()) {
                    (Value::Struct(record), Some(name)) => record
                        .method_at(index as usize, name)
                        .map(|method| Value::Func(method.bind(object.clone()))),
                    _ => None,
                };
                let value = match method {
                    Some(method) => method,
                    None => operators::fetch(&object, key)?,
                };
                self.stack.push(value);
            }
            Slice => {
                let to = self.stack.pop()?;
                let from = self.stack.pop()?;
                let object = self.stack.pop()?;
                self.stack.push(operators::slice(&object, &from, &to)?);
            }

            // === Operators ===
            Negate => {
                let value = self.stack.pop()?;
                self.stack.push(operators::negate(&value)?);
            }
            Not => {
                let value = self.stack.pop()?;
                self.stack.push(operators::not(&value)?);
            }
            IntBinOp(op) => {
                let b = self.stack.pop()?;
                let a = self.stack.pop()?;
                let result = match (&a, &b) {
                    (Value::Int(x), Value::Int(y)) => operators::int_binary(op, *x, *y)?,
                    _ => operators::binary(op, &a, &b)?,
                };
                self.stack.push(result);
            }
            FloatBinOp(op) => {
                let b = self.stack.pop()?;
                let a = self.stack.pop()?;
                let result = match (&a, &b) {
                    (Value::Float(x), Value::Float(y)) => operators::float_binary(op, *x, *y)?,
                    _ => operators::binary(op, &a, &b)?,
                };
                self.stack.push(result);
            }
            BinOp(op) => self.binary(op)?,
            Equal => {
                let b = self.stack.pop()?;
                let a = self.stack.pop()?;
                self.stack.push(Value::Bool(operators::equal(&a, &b)));
            }
            In => {
                let haystack = self.stack.pop()?;
                let needle = self.stack.pop()?;
                let found = operators::contains_element(&haystack, &needle)?;
                self.stack.push(Value::Bool(found));
            }
            Contains => self.binary(BinaryOp::Contains)?,
            StartsWith => self.binary(BinaryOp::StartsWith)?,
            EndsWith => self.binary(BinaryOp::EndsWith)?,
            Matches => {
                let pattern = self.stack.pop()?;
                let subject = self.stack.pop()?;
                let result = match (subject.as_str(), pattern.as_str()) {
                    (Some(s), Some(p)) => Value::Bool(self.regex(p)?.is_match(s)),
                    _ => operators::binary(BinaryOp::Matches, &subject, &pattern)?,
                };
                self.stack.push(result);
            }
            Range => self.binary(BinaryOp::Range)?,

            // === Control Flow ===
            Jump(offset) => *ip += offset as usize,
            JumpIfTrue(offset) => {
                if expect_bool(self.stack.peek()?)? {
                    *ip += offset as usize;
                }
            }
            JumpIfFalse(offset) => {
                if !expect_bool(self.stack.peek()?)? {
                    *ip += offset as usize;
                }
            }
            PopJumpIfFalse(offset) => {
                if !expect_bool(&self.stack.pop()?)? {
                    *ip += offset as usize;
                }
            }
            JumpIfNil(offset) => {
                if self.stack.peek()?.is_nil() {
                    *ip += offset as usize;
                }
            }
            JumpIfNotNil(offset) => {
                if !self.stack.peek()?.is_nil() {
                    *ip += offset as usize;
                }
            }
            JumpIfEnd(offset) => {
                let scope = self.scope()?;
                if scope.index >= scope.array.len() {
                    *ip += offset as usize;
                }
            }
            JumpBackward(offset) => {
                *ip = ip
                    .checked_sub(offset as usize)
                    .ok_or_else(|| RuntimeErrorKind::invalid("jump before program start"))?;
            }

            // === Collections ===
            Array(n) => {
                let items = self.stack.pop_n(n as usize)?;
                self.stack.push(Value::array(items));
            }
            Map(n) => {
                let flat = self.stack.pop_n(2 * n as usize)?;
                let mut entries = std::collections::BTreeMap::new();
                let mut iter = flat.into_iter();
                while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
                    match key {
                        Value::Str(key) => {
                            entries.insert(key.to_string(), value);
                        }
                        other => {
                            return Err(RuntimeErrorKind::invalid(format!(
                                "map key of type {}",
                                other.type_name()
                            )));
                        }
                    }
                }
                self.stack.push(Value::Map(Arc::new(entries)));
            }
            Collect => {
                let n = match self.stack.pop()? {
                    Value::Int(n) if n >= 0 => n as usize,
                    other => {
                        return Err(RuntimeErrorKind::invalid(format!(
                            "collect count of type {}",
                            other.type_name()
                        )));
                    }
                };
                let items = self.stack.pop_n(n)?;
                self.stack.push(Value::array(items));
            }

            // === Calls ===
            Call(argc) => self.call(argc as usize)?,
            CallTyped(index) => {
                let shape = FUNC_TYPES
                    .get(index as usize)
                    .copied()
                    .flatten()
                    .ok_or_else(|| RuntimeErrorKind::invalid("unknown call signature"))?;
                self.call(shape.arity())?;
            }
            CallBuiltin { id, argc } => {
                let builtin = builtins::get(id as usize)
                    .ok_or_else(|| RuntimeErrorKind::invalid("unknown builtin"))?;
                let imp = builtin.imp.ok_or_else(|| {
                    RuntimeErrorKind::invalid(format!("{} cannot be called directly", builtin.name))
                })?;
                let args = self.stack.pop_n(argc as usize)?;
                self.stack.push(imp(&args)?);
            }

            // === Predicate Loops ===
            Begin => match self.stack.pop()? {
                Value::Array(array) => self.scopes.push(Scope {
                    array,
                    index: 0,
                    count: 0,
                    acc: Value::Nil,
                }),
                other => {
                    return Err(RuntimeErrorKind::invalid(format!(
                        "cannot iterate over {}",
                        other.type_name()
                    )));
                }
            },
            End => {
                self.scopes.pop();
            }
            Pointer => {
                let scope = self.scope()?;
                let element = scope.array.get(scope.index).cloned().ok_or(
                    RuntimeErrorKind::IndexOutOfRange {
                        index: scope.index as i64,
                        len: scope.array.len(),
                    },
                )?;
                self.stack.push(element);
            }
            PointerIndex => {
                let index = self.scope()?.index as i64;
                self.stack.push(Value::Int(index));
            }
            PointerAcc => {
                let acc = self.scope()?.acc.clone();
                self.stack.push(acc);
            }
            SetAcc => {
                let value = self.stack.pop()?;
                self.scope_mut()?.acc = value;
            }
            IncrementIndex => self.scope_mut()?.index += 1,
            IncrementCount => self.scope_mut()?.count += 1,
            GetCount => {
                let count = self.scope()?.count;
                self.stack.push(Value::Int(count));
            }
            GetLen => {
                let len = self.scope()?.array.len() as i64;
                self.stack.push(Value::Int(len));
            }

            // === Special ===
            Return => return Ok(Flow::Return(self.stack.pop()?)),
        }
        Ok(Flow::Continue)
    }

    fn binary(&mut self, op: BinaryOp) -> StepResult<()> {
        let b = self.stack.pop()?;
        let a = self.stack.pop()?;
        self.stack.push(operators::binary(op, &a, &b)?);
        Ok(())
    }

    fn call(&mut self, argc: usize) -> StepResult<()> {
        let args = self.stack.pop_n(argc)?;
        let callee = self.stack.pop()?;
        let Value::Func(function) = callee else {
            return Err(RuntimeErrorKind::NotCallable(callee.type_name().to_string()));
        };
        self.stack.push(call_host(&function, &args)?);
        Ok(())
    }

    fn scope(&self) -> StepResult<&Scope> {
        self.scopes
            .last()
            .ok_or_else(|| RuntimeErrorKind::invalid("no enclosing loop"))
    }

    fn scope_mut(&mut self) -> StepResult<&mut Scope> {
        self.scopes
            .last_mut()
            .ok_or_else(|| RuntimeErrorKind::invalid("no enclosing loop"))
    }

    fn regex(&mut self, pattern: &str) -> StepResult<&Regex> {
        if !self.regexes.contains_key(pattern) {
            let compiled = Regex::new(pattern)
                .map_err(|err| RuntimeErrorKind::InvalidArgument(err.to_string()))?;
            self.regexes.insert(pattern.to_string(), compiled);
        }
        self.regexes
            .get(pattern)
            .ok_or_else(|| RuntimeErrorKind::invalid("regex cache miss"))
    }
}

fn constant(program: &Program, index: u32) -> StepResult<&Value> {
    program
        .constant(index)
        .ok_or_else(|| RuntimeErrorKind::invalid(format!("constant {} out of range", index)))
}

fn constant_str(program: &Program, index: u32) -> StepResult<&str> {
    constant(program, index)?
        .as_str()
        .ok_or_else(|| RuntimeErrorKind::invalid(format!("constant {} is not a name", index)))
}

fn expect_bool(value: &Value) -> StepResult<bool> {
    value.as_bool().ok_or_else(|| {
        RuntimeErrorKind::invalid(format!("expected bool, got {}", value.type_name()))
    })
}

/// Name lookup against an environment whose shape was not known statically.
fn load_name(env: &Value, name: &str) -> StepResult<Value> {
    match env {
        Value::Map(map) => Ok(map.get(name).cloned().unwrap_or_default()),
        Value::Struct(record) => {
            if let Some(value) = record.get(name) {
                Ok(value.clone())
            } else if let Some(method) = record.method(name) {
                Ok(Value::Func(method.bind(env.clone())))
            } else {
                Err(RuntimeErrorKind::UnknownName(name.to_string()))
            }
        }
        _ => Err(RuntimeErrorKind::UnknownName(name.to_string())),
    }
}

/// Calls into the host, turning panics into errors.
fn call_host(function: &Function, args: &[Value]) -> StepResult<Value> {
    match panic::catch_unwind(AssertUnwindSafe(|| function.call(args))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(RuntimeErrorKind::Host(err.message)),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(RuntimeErrorKind::HostPanic {
                name: function.name().to_string(),
                message,
            })
        }
    }
}
