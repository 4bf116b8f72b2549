use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::values::Function;

/// A runtime value.
///
/// Scalars are stored inline; strings and composites are shared behind an
/// `Arc`, so cloning a value never copies its contents.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Duration(Duration),
    Array(Arc<Vec<Value>>),
    /// Map keys are always strings.
    Map(Arc<BTreeMap<String, Value>>),
    Struct(Arc<Record>),
    Func(Function),
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }

    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn record(record: Record) -> Self {
        Value::Struct(Arc::new(record))
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Duration(_) => "duration",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Struct(record) => record.name(),
            Value::Func(_) => "func",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Struct(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Func(f) => Some(f),
            _ => None,
        }
    }
}

/// Structural equality. Ints and floats are different kinds here; numeric
/// comparison across kinds is the `==` operator's job.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Func(a), Value::Func(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self {
        Value::Duration(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::record(record)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Func(f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            other => write_nested(other, f),
        }
    }
}

// Strings nested inside composites are quoted.
fn write_nested(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::Nil => write!(f, "nil"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Int(i) => write!(f, "{}", i),
        Value::Float(x) => write!(f, "{}", x),
        Value::Str(s) => write!(f, "{:?}", s),
        Value::Duration(d) => write_duration(*d, f),
        Value::Array(items) => {
            write!(f, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_nested(item, f)?;
            }
            write!(f, "]")
        }
        Value::Map(map) => {
            write!(f, "{{")?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}: ", key)?;
                write_nested(item, f)?;
            }
            write!(f, "}}")
        }
        Value::Struct(record) => {
            write!(f, "{}{{", record.name())?;
            for (i, (name, item)) in record.fields().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: ", name)?;
                write_nested(item, f)?;
            }
            write!(f, "}}")
        }
        Value::Func(func) => write!(f, "{:?}", func),
    }
}

/// Formats like `1h30m0s`, `1.5s` or `250ms`.
fn write_duration(d: Duration, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return write!(f, "0s");
    }
    if nanos < 1_000 {
        return write!(f, "{}ns", nanos);
    }
    if nanos < 1_000_000 {
        return write!(f, "{}µs", nanos as f64 / 1e3);
    }
    if nanos < 1_000_000_000 {
        return write!(f, "{}ms", nanos as f64 / 1e6);
    }
    let total = d.as_secs();
    let (hours, minutes) = (total / 3600, (total % 3600) / 60);
    let seconds = (total % 60) as f64 + f64::from(d.subsec_nanos()) / 1e9;
    if hours > 0 {
        write!(f, "{}h", hours)?;
    }
    if hours > 0 || minutes > 0 {
        write!(f, "{}m", minutes)?;
    }
    write!(f, "{}s", seconds)
}

/// A host struct instance: named fields in declaration order, plus methods.
///
/// Compiled programs address fields and methods by their position in the
/// struct type; a record built in a different order is still found by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: Arc<str>,
    fields: Vec<(Arc<str>, Value)>,
    methods: Vec<(Arc<str>, Function)>,
}

impl Record {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.push((Arc::from(name), value.into()));
        self
    }

    /// Adds a method. The implementation receives the record itself as its
    /// first argument.
    pub fn with_method(mut self, name: &str, method: Function) -> Self {
        self.methods.push((Arc::from(name), method));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (&**name, value))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, value)| value)
    }

    /// The field at `index`, if that field is called `name`.
    pub fn field_at(&self, index: usize, name: &str) -> Option<&Value> {
        match self.fields.get(index) {
            Some((n, value)) if &**n == name => Some(value),
            _ => None,
        }
    }

    pub fn method(&self, name: &str) -> Option<&Function> {
        self.methods
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, method)| method)
    }

    /// The method at `index`, if that method is called `name`.
    pub fn method_at(&self, index: usize, name: &str) -> Option<&Function> {
        match self.methods.get(index) {
            Some((n, method)) if &**n == name => Some(method),
            _ => None,
        }
    }
}
