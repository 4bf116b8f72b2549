use tracing::debug;

use crate::ast::{BinaryOp, NodeKind, NodeRef, UnaryOp};
use crate::builtins::{self, Builtin};
use crate::checker::error::{TypeError, TypeErrorKind};
use crate::types::{Fact, Type, TypeManager, TypeView};

/// Checks the tree rooted at `root` against the environment type `env`.
///
/// Every node gets a fact, even when errors are found: a node that fails gets
/// `Fact::Invalid` and so do its ancestors. All errors are returned together,
/// in the order they were found.
///
/// With `strict`, names missing from a struct (or scalar) environment are
/// errors; otherwise they check as `Unknown` and fail at runtime if absent.
pub fn check<'a>(
    types: &'a TypeManager<'a>,
    root: NodeRef<'a>,
    env: Option<&'a Type<'a>>,
    strict: bool,
) -> Result<Fact<'a>, Vec<TypeError>> {
    let mut checker = Checker {
        types,
        env,
        strict,
        scopes: Vec::new(),
        errors: Vec::new(),
    };
    let fact = checker.visit(root);
    debug!(errors = checker.errors.len(), fact = %fact, "check finished");
    if checker.errors.is_empty() {
        Ok(fact)
    } else {
        Err(checker.errors)
    }
}

/// What `#`, `#index` and `#acc` mean inside one predicate body.
#[derive(Clone, Copy)]
struct PointerScope<'a> {
    element: Fact<'a>,
    /// `Some` only inside `reduce`.
    accumulator: Option<Fact<'a>>,
}

struct Checker<'a> {
    types: &'a TypeManager<'a>,
    env: Option<&'a Type<'a>>,
    strict: bool,
    scopes: Vec<PointerScope<'a>>,
    errors: Vec<TypeError>,
}

impl<'a> Checker<'a> {
    fn visit(&mut self, slot: NodeRef<'a>) -> Fact<'a> {
        let fact = self.infer(slot);
        slot.set_fact(fact);
        fact
    }

    fn error(&mut self, slot: NodeRef<'a>, kind: TypeErrorKind) -> Fact<'a> {
        self.errors.push(TypeError::new(kind, slot.pos()));
        Fact::Invalid
    }

    fn infer(&mut self, slot: NodeRef<'a>) -> Fact<'a> {
        match slot.kind() {
            NodeKind::Nil => Fact::Known(self.types.nil()),
            NodeKind::Bool(_) => Fact::Known(self.types.bool()),
            NodeKind::Integer(_) => Fact::Known(self.types.int()),
            NodeKind::Float(_) => Fact::Known(self.types.float()),
            NodeKind::String(_) => Fact::Known(self.types.str()),
            NodeKind::Identifier(name) => self.identifier(slot, name),
            NodeKind::Unary { op, operand } => {
                let fact = self.visit(operand);
                self.unary(slot, op, fact)
            }
            NodeKind::Binary { op, left, right } => {
                let left = self.visit(left);
                let right = self.visit(right);
                if left.is_invalid() || right.is_invalid() {
                    return Fact::Invalid;
                }
                self.binary(slot, op, left, right)
            }
            NodeKind::Member {
                object,
                property,
                optional,
            } => self.member(slot, object, property, optional),
            NodeKind::Pointer(name) => self.pointer(slot, name),
            NodeKind::Slice { object, from, to } => self.slice(slot, object, from, to),
            NodeKind::Array(items) => self.array(items),
            NodeKind::Map(entries) => self.map(entries),
            NodeKind::Call { callee, args } => self.call(slot, callee, args),
            NodeKind::Builtin { name, args } => self.builtin(slot, name, args),
            NodeKind::Predicate(body) => {
                self.visit(body);
                self.error(slot, TypeErrorKind::UnexpectedPredicate)
            }
            NodeKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                let cond_fact = self.visit(cond);
                let then = self.visit(then);
                let otherwise = self.visit(otherwise);
                if cond_fact.is_invalid() || then.is_invalid() || otherwise.is_invalid() {
                    return Fact::Invalid;
                }
                if !self.is_bool_like(cond_fact) {
                    return self.error(
                        cond,
                        TypeErrorKind::NotBool {
                            context: "condition".into(),
                            found: cond_fact.to_string(),
                        },
                    );
                }
                common(then, otherwise)
            }
        }
    }

    // ========================================================================
    // Names
    // ========================================================================

    fn identifier(&mut self, slot: NodeRef<'a>, name: &str) -> Fact<'a> {
        let Some(env) = self.env else {
            return Fact::Unknown;
        };
        match env {
            Type::Any => Fact::Unknown,
            Type::Map(_, value) => Fact::of(value),
            Type::Struct { .. } => {
                if let Some((_, ty)) = env.field(name) {
                    Fact::of(ty)
                } else if let Some((_, ty)) = env.method(name) {
                    Fact::Known(self.strip_receiver(ty))
                } else if self.strict {
                    self.unknown_name(slot, name)
                } else {
                    Fact::Unknown
                }
            }
            _ if self.strict => self.unknown_name(slot, name),
            _ => Fact::Unknown,
        }
    }

    fn unknown_name(&mut self, slot: NodeRef<'a>, name: &str) -> Fact<'a> {
        self.error(
            slot,
            TypeErrorKind::UnknownName {
                name: name.to_string(),
            },
        )
    }

    /// A method as seen from outside: its receiver is already bound.
    fn strip_receiver(&self, method: &'a Type<'a>) -> &'a Type<'a> {
        match method {
            Type::Function {
                params,
                ret,
                variadic,
                ..
            } if !params.is_empty() => {
                self.types
                    .make_function(None, &params[1..], ret, *variadic && params.len() > 1)
            }
            other => other,
        }
    }

    fn pointer(&mut self, slot: NodeRef<'a>, name: &str) -> Fact<'a> {
        let Some(scope) = self.scopes.last().copied() else {
            let name = name.to_string();
            return self.error(slot, TypeErrorKind::PointerOutsidePredicate { name });
        };
        match name {
            "" => scope.element,
            "index" => Fact::Known(self.types.int()),
            "acc" => match scope.accumulator {
                Some(fact) => fact,
                None => self.error(slot, TypeErrorKind::AccumulatorOutsideReduce),
            },
            other => {
                let name = other.to_string();
                self.error(slot, TypeErrorKind::UnknownPointer { name })
            }
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn unary(&mut self, slot: NodeRef<'a>, op: UnaryOp, operand: Fact<'a>) -> Fact<'a> {
        let ok = match (op, operand) {
            (_, Fact::Invalid) => return Fact::Invalid,
            (UnaryOp::Neg, Fact::Unknown) => return Fact::Unknown,
            (UnaryOp::Not, Fact::Unknown) => return Fact::Known(self.types.bool()),
            (UnaryOp::Neg, Fact::Known(ty)) => ty.is_numeric(),
            (UnaryOp::Not, Fact::Known(ty)) => *ty == Type::Bool,
        };
        if ok {
            return operand;
        }
        self.error(
            slot,
            TypeErrorKind::UnaryMismatch {
                op: op.symbol().to_string(),
                operand: operand.to_string(),
            },
        )
    }

    fn binary(
        &mut self,
        slot: NodeRef<'a>,
        op: BinaryOp,
        left: Fact<'a>,
        right: Fact<'a>,
    ) -> Fact<'a> {
        let t = self.types;
        let (l, r) = (left.ty(), right.ty());
        let dynamic = l.is_none() || r.is_none();
        let result = match op {
            BinaryOp::Eq | BinaryOp::Ne => Some(Fact::Known(t.bool())),
            BinaryOp::And | BinaryOp::Or => (self.is_bool_like(left) && self.is_bool_like(right))
                .then_some(Fact::Known(t.bool())),
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => match (l, r) {
                _ if dynamic => Some(Fact::Known(t.bool())),
                (Some(a), Some(b)) if a.is_numeric() && b.is_numeric() => {
                    Some(Fact::Known(t.bool()))
                }
                (Some(a), Some(b)) if a == b && matches!(a, Type::Str | Type::Duration) => {
                    Some(Fact::Known(t.bool()))
                }
                _ => None,
            },
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => match (l, r) {
                _ if dynamic => Some(Fact::Unknown),
                (Some(Type::Int), Some(Type::Int)) => Some(Fact::Known(t.int())),
                (Some(a), Some(b)) if a.is_numeric() && b.is_numeric() => {
                    Some(Fact::Known(t.float()))
                }
                (Some(Type::Str), Some(Type::Str)) if op == BinaryOp::Add => {
                    Some(Fact::Known(t.str()))
                }
                (Some(Type::Duration), Some(Type::Duration)) if op != BinaryOp::Mul => {
                    Some(Fact::Known(t.duration()))
                }
                _ => None,
            },
            BinaryOp::Div | BinaryOp::Pow => {
                (numeric_like(left) && numeric_like(right)).then_some(Fact::Known(t.float()))
            }
            BinaryOp::Mod => {
                (int_like(left) && int_like(right)).then_some(Fact::Known(t.int()))
            }
            BinaryOp::In => match r {
                None => Some(Fact::Known(t.bool())),
                Some(Type::Array(_)) => Some(Fact::Known(t.bool())),
                Some(Type::Map(..)) | Some(Type::Struct { .. }) => {
                    str_like(left).then_some(Fact::Known(t.bool()))
                }
                _ => None,
            },
            BinaryOp::Contains
            | BinaryOp::StartsWith
            | BinaryOp::EndsWith
            | BinaryOp::Matches => {
                (str_like(left) && str_like(right)).then_some(Fact::Known(t.bool()))
            }
            BinaryOp::Range => {
                (int_like(left) && int_like(right)).then_some(Fact::Known(t.array(t.int())))
            }
            BinaryOp::Coalesce => Some(match l {
                Some(Type::Nil) => right,
                _ => common(left, right),
            }),
        };
        match result {
            Some(fact) => fact,
            None => self.error(
                slot,
                TypeErrorKind::Mismatch {
                    op: op.symbol().to_string(),
                    left: left.to_string(),
                    right: right.to_string(),
                },
            ),
        }
    }

    fn is_bool_like(&self, fact: Fact<'a>) -> bool {
        match fact {
            Fact::Known(ty) => *ty == Type::Bool,
            _ => true,
        }
    }

    // ========================================================================
    // Member access
    // ========================================================================

    fn member(
        &mut self,
        slot: NodeRef<'a>,
        object: NodeRef<'a>,
        property: NodeRef<'a>,
        optional: bool,
    ) -> Fact<'a> {
        let object_fact = self.visit(object);
        let property_fact = self.visit(property);
        if object_fact.is_invalid() || property_fact.is_invalid() {
            return Fact::Invalid;
        }
        let Fact::Known(ty) = object_fact else {
            return Fact::Unknown;
        };
        let literal = match property.kind() {
            NodeKind::String(name) => Some(name),
            _ => None,
        };

        let fact = match ty {
            Type::Struct { .. } => match literal {
                Some(name) => {
                    if let Some((_, field)) = ty.field(name) {
                        Fact::of(field)
                    } else if let Some((_, method)) = ty.method(name) {
                        Fact::Known(self.strip_receiver(method))
                    } else {
                        let available = ty.fields().iter().map(|(n, _)| n.to_string()).collect();
                        return self.error(
                            slot,
                            TypeErrorKind::UnknownField {
                                field: name.to_string(),
                                ty: ty.to_string(),
                                available,
                            },
                        );
                    }
                }
                None if str_like(property_fact) => Fact::Unknown,
                None => return self.not_indexable(slot, ty, property_fact),
            },
            Type::Map(_, value) if str_like(property_fact) => Fact::of(value),
            Type::Array(elem) if int_like(property_fact) => Fact::of(elem),
            Type::Str if int_like(property_fact) => Fact::Known(self.types.str()),
            Type::Any => Fact::Unknown,
            Type::Nil if optional => Fact::Unknown,
            _ => return self.not_indexable(slot, ty, property_fact),
        };
        if optional { Fact::Unknown } else { fact }
    }

    fn not_indexable(&mut self, slot: NodeRef<'a>, ty: &Type<'a>, property: Fact<'a>) -> Fact<'a> {
        self.error(
            slot,
            TypeErrorKind::NotIndexable {
                ty: ty.to_string(),
                property: property.to_string(),
            },
        )
    }

    fn slice(
        &mut self,
        slot: NodeRef<'a>,
        object: NodeRef<'a>,
        from: Option<NodeRef<'a>>,
        to: Option<NodeRef<'a>>,
    ) -> Fact<'a> {
        let object_fact = self.visit(object);
        let mut bounds_ok = true;
        for bound in [from, to].into_iter().flatten() {
            let fact = self.visit(bound);
            if fact.is_invalid() {
                bounds_ok = false;
            } else if !int_like(fact) {
                self.not_indexable(slot, self.types.int(), fact);
                bounds_ok = false;
            }
        }
        if object_fact.is_invalid() || !bounds_ok {
            return Fact::Invalid;
        }
        match object_fact {
            Fact::Known(ty @ (Type::Array(_) | Type::Str)) => Fact::Known(ty),
            Fact::Known(Type::Any) | Fact::Unknown => Fact::Unknown,
            Fact::Known(ty) => {
                let int = Fact::Known(self.types.int());
                self.not_indexable(slot, ty, int)
            }
            Fact::Invalid => Fact::Invalid,
        }
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn array(&mut self, items: &'a [NodeRef<'a>]) -> Fact<'a> {
        let facts: Vec<Fact<'a>> = items.iter().map(|&item| self.visit(item)).collect();
        if facts.iter().any(|fact| fact.is_invalid()) {
            return Fact::Invalid;
        }
        let elem = facts
            .iter()
            .copied()
            .reduce(common)
            .and_then(Fact::ty)
            .unwrap_or(self.types.any());
        Fact::Known(self.types.array(elem))
    }

    fn map(&mut self, entries: &'a [(NodeRef<'a>, NodeRef<'a>)]) -> Fact<'a> {
        let mut invalid = false;
        let mut values = Vec::with_capacity(entries.len());
        for &(key, value) in entries {
            let key_fact = self.visit(key);
            if key_fact.is_invalid() {
                invalid = true;
            } else if !str_like(key_fact) {
                let found = key_fact.to_string();
                self.error(key, TypeErrorKind::InvalidMapKey { found });
                invalid = true;
            }
            let value_fact = self.visit(value);
            invalid |= value_fact.is_invalid();
            values.push(value_fact);
        }
        if invalid {
            return Fact::Invalid;
        }
        let value = values
            .into_iter()
            .reduce(common)
            .and_then(Fact::ty)
            .unwrap_or(self.types.any());
        Fact::Known(self.types.map(self.types.str(), value))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn call(&mut self, slot: NodeRef<'a>, callee: NodeRef<'a>, args: &'a [NodeRef<'a>]) -> Fact<'a> {
        let callee_fact = self.visit(callee);
        let arg_facts: Vec<Fact<'a>> = args.iter().map(|&arg| self.visit(arg)).collect();
        if callee_fact.is_invalid() || arg_facts.iter().any(|fact| fact.is_invalid()) {
            return Fact::Invalid;
        }
        let Fact::Known(ty) = callee_fact else {
            return Fact::Unknown;
        };
        let Some(signature) = ty.signature() else {
            return self.error(slot, TypeErrorKind::NotCallable { ty: ty.to_string() });
        };
        let name = callee_name(callee).unwrap_or_else(|| ty.to_string());

        let (min, max) = signature.arity();
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            let expected = match max {
                Some(max) if max == min => min.to_string(),
                Some(max) => format!("{}..{}", min, max),
                None => format!("at least {}", min),
            };
            return self.error(
                slot,
                TypeErrorKind::ArgumentCount {
                    name,
                    expected,
                    found: args.len(),
                },
            );
        }

        let mut ok = true;
        for (index, (&arg, &fact)) in args.iter().zip(&arg_facts).enumerate() {
            let Some(expected) = signature.param(index) else {
                continue;
            };
            if !assignable(fact, expected) {
                self.error(
                    arg,
                    TypeErrorKind::ArgumentType {
                        name: name.clone(),
                        index,
                        expected: expected.to_string(),
                        found: fact.to_string(),
                    },
                );
                ok = false;
            }
        }
        if !ok {
            return Fact::Invalid;
        }
        Fact::of(signature.ret)
    }

    fn builtin(&mut self, slot: NodeRef<'a>, name: &str, args: &'a [NodeRef<'a>]) -> Fact<'a> {
        let Some((_, builtin)) = builtins::lookup(name) else {
            self.visit_rejected_args(args);
            let name = name.to_string();
            return self.error(slot, TypeErrorKind::UnknownBuiltin { name });
        };
        if !builtin.accepts(args.len()) {
            self.visit_rejected_args(args);
            let expected = match builtin.max_args {
                Some(max) if max == builtin.min_args => max.to_string(),
                Some(max) => format!("{}..{}", builtin.min_args, max),
                None => format!("at least {}", builtin.min_args),
            };
            return self.error(
                slot,
                TypeErrorKind::ArgumentCount {
                    name: name.to_string(),
                    expected,
                    found: args.len(),
                },
            );
        }
        if builtin.is_predicate() {
            self.predicate_builtin(slot, builtin, args)
        } else {
            let facts: Vec<Fact<'a>> = args.iter().map(|&arg| self.visit(arg)).collect();
            if facts.iter().any(|fact| fact.is_invalid()) {
                return Fact::Invalid;
            }
            self.plain_builtin(slot, builtin, &facts)
        }
    }

    /// Arguments of a call that was already rejected still get facts. A
    /// predicate body is checked with nothing known about its pointers.
    fn visit_rejected_args(&mut self, args: &'a [NodeRef<'a>]) {
        for &arg in args {
            match arg.kind() {
                NodeKind::Predicate(body) => {
                    self.scopes.push(PointerScope {
                        element: Fact::Unknown,
                        accumulator: Some(Fact::Unknown),
                    });
                    self.visit(body);
                    self.scopes.pop();
                    arg.set_fact(Fact::Invalid);
                }
                _ => {
                    self.visit(arg);
                }
            }
        }
    }

    fn plain_builtin(&mut self, slot: NodeRef<'a>, builtin: &Builtin, args: &[Fact<'a>]) -> Fact<'a> {
        let t = self.types;
        let arg = args[0];
        let known = arg.ty();
        let result = match builtin.name {
            "len" => matches!(known, None | Some(Type::Str | Type::Array(_) | Type::Map(..)))
                .then_some(Fact::Known(t.int())),
            "abs" => numeric_like(arg).then_some(arg),
            "int" => matches!(
                known,
                None | Some(Type::Int | Type::Float | Type::Str | Type::Duration)
            )
            .then_some(Fact::Known(t.int())),
            "float" => matches!(known, None | Some(Type::Int | Type::Float | Type::Str))
                .then_some(Fact::Known(t.float())),
            "string" => Some(Fact::Known(t.str())),
            "upper" | "lower" | "trim" => str_like(arg).then_some(Fact::Known(t.str())),
            "keys" => match known {
                None => Some(Fact::Known(t.array(t.any()))),
                Some(Type::Map(key, _)) => Some(Fact::Known(t.array(key))),
                _ => None,
            },
            "values" => match known {
                None => Some(Fact::Known(t.array(t.any()))),
                Some(Type::Map(_, value)) => Some(Fact::Known(t.array(value))),
                _ => None,
            },
            "max" | "min" => return self.extremum(slot, builtin, args),
            "first" | "last" => match known {
                None => Some(Fact::Unknown),
                Some(Type::Array(elem)) => Some(Fact::of(elem)),
                _ => None,
            },
            "fromJSON" => str_like(arg).then_some(Fact::Unknown),
            "toJSON" => Some(Fact::Known(t.str())),
            "duration" => str_like(arg).then_some(Fact::Known(t.duration())),
            _ => Some(Fact::Unknown),
        };
        match result {
            Some(fact) => fact,
            None => self.argument_type(slot, builtin.name, 0, expected_arg(builtin.name), arg),
        }
    }

    /// `max`/`min`: over the arguments, or over a single array argument.
    fn extremum(&mut self, slot: NodeRef<'a>, builtin: &Builtin, args: &[Fact<'a>]) -> Fact<'a> {
        let elements: Vec<Fact<'a>> = match args {
            [Fact::Known(Type::Array(elem))] => vec![Fact::of(elem)],
            _ => args.to_vec(),
        };
        for (index, &fact) in elements.iter().enumerate() {
            if !numeric_like(fact) {
                return self.argument_type(slot, builtin.name, index, "number", fact);
            }
        }
        // Mixed int/float arguments keep whichever value wins, so only a
        // uniform element type is known statically.
        elements.into_iter().reduce(common).unwrap_or(Fact::Unknown)
    }

    fn argument_type(
        &mut self,
        slot: NodeRef<'a>,
        name: &str,
        index: usize,
        expected: &str,
        found: Fact<'a>,
    ) -> Fact<'a> {
        self.error(
            slot,
            TypeErrorKind::ArgumentType {
                name: name.to_string(),
                index,
                expected: expected.to_string(),
                found: found.to_string(),
            },
        )
    }

    // ========================================================================
    // Predicate builtins
    // ========================================================================

    fn predicate_builtin(
        &mut self,
        slot: NodeRef<'a>,
        builtin: &Builtin,
        args: &'a [NodeRef<'a>],
    ) -> Fact<'a> {
        let t = self.types;
        let name = builtin.name;

        // `reduce(xs, body, init)`: the initial value is evaluated first, outside
        // of the loop scope.
        let init = if name == "reduce" {
            args.get(2).map(|&init| self.visit(init))
        } else {
            None
        };

        let collection = self.visit(args[0]);
        let element = match collection {
            Fact::Invalid => Fact::Invalid,
            Fact::Unknown | Fact::Known(Type::Any) => Fact::Unknown,
            Fact::Known(Type::Array(elem)) => Fact::of(elem),
            Fact::Known(_) => self.argument_type(args[0], name, 0, "array", collection),
        };

        let Some(&predicate) = args.get(1) else {
            // `sum(xs)` without a predicate.
            if element.is_invalid() {
                return Fact::Invalid;
            }
            return self.sum_result(slot, element);
        };
        let NodeKind::Predicate(body) = predicate.kind() else {
            self.visit(predicate);
            return self.error(
                predicate,
                TypeErrorKind::PredicateExpected {
                    name: name.to_string(),
                    index: 1,
                },
            );
        };

        let accumulator = (name == "reduce").then(|| init.unwrap_or(element));
        self.scopes.push(PointerScope {
            element,
            accumulator,
        });
        let body_fact = self.visit(body);
        self.scopes.pop();
        predicate.set_fact(body_fact);

        if element.is_invalid() || body_fact.is_invalid() || init.is_some_and(Fact::is_invalid) {
            return Fact::Invalid;
        }

        match name {
            "all" | "none" | "any" | "one" | "filter" | "count" | "find" | "findIndex"
                if !self.is_bool_like(body_fact) =>
            {
                self.error(
                    body,
                    TypeErrorKind::NotBool {
                        context: format!("predicate of {}", name),
                        found: body_fact.to_string(),
                    },
                );
                predicate.set_fact(Fact::Invalid);
                Fact::Invalid
            }
            "all" | "none" | "any" | "one" => Fact::Known(t.bool()),
            "count" | "findIndex" => Fact::Known(t.int()),
            "filter" => Fact::Known(t.array(element.ty().unwrap_or(t.any()))),
            "map" => Fact::Known(t.array(body_fact.ty().unwrap_or(t.any()))),
            "find" => element,
            "sum" => self.sum_result(slot, body_fact),
            "reduce" => match init {
                Some(init) => common(init, body_fact),
                None => common(element, body_fact),
            },
            _ => Fact::Unknown,
        }
    }

    fn sum_result(&mut self, slot: NodeRef<'a>, summand: Fact<'a>) -> Fact<'a> {
        if numeric_like(summand) {
            summand
        } else {
            self.argument_type(slot, "sum", 0, "array of numbers", summand)
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Two facts about values that may flow to the same place.
fn common<'a>(a: Fact<'a>, b: Fact<'a>) -> Fact<'a> {
    match (a, b) {
        (Fact::Invalid, _) | (_, Fact::Invalid) => Fact::Invalid,
        (Fact::Known(x), Fact::Known(y)) if x == y => a,
        _ => Fact::Unknown,
    }
}

fn numeric_like(fact: Fact<'_>) -> bool {
    match fact {
        Fact::Known(ty) => ty.is_numeric(),
        _ => true,
    }
}

fn int_like(fact: Fact<'_>) -> bool {
    match fact {
        Fact::Known(ty) => *ty == Type::Int,
        _ => true,
    }
}

fn str_like(fact: Fact<'_>) -> bool {
    match fact {
        Fact::Known(ty) => *ty == Type::Str,
        _ => true,
    }
}

/// Whether a value of `fact` can be passed where `expected` is declared.
///
/// There are no implicit conversions: an `int` is not a `float`.
fn assignable(fact: Fact<'_>, expected: &Type<'_>) -> bool {
    match fact {
        Fact::Known(ty) => type_assignable(ty, expected),
        _ => true,
    }
}

fn type_assignable(ty: &Type<'_>, expected: &Type<'_>) -> bool {
    match (ty, expected) {
        (_, Type::Any) | (Type::Any, _) => true,
        (Type::Nil, _) => expected.is_nilable(),
        (Type::Array(a), Type::Array(b)) => type_assignable(a, b),
        (Type::Map(ka, va), Type::Map(kb, vb)) => {
            type_assignable(ka, kb) && type_assignable(va, vb)
        }
        _ => ty == expected,
    }
}

fn callee_name(callee: NodeRef<'_>) -> Option<String> {
    match callee.kind() {
        NodeKind::Identifier(name) => Some(name.to_string()),
        NodeKind::Member { property, .. } => match property.kind() {
            NodeKind::String(name) => Some(name.to_string()),
            _ => None,
        },
        _ => None,
    }
}

fn expected_arg(builtin: &str) -> &'static str {
    match builtin {
        "len" => "string, array or map",
        "abs" => "number",
        "int" => "number, string or duration",
        "float" => "number or string",
        "keys" | "values" => "map",
        "first" | "last" => "array",
        _ => "string",
    }
}
