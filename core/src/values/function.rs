use std::fmt;
use std::sync::Arc;

use crate::values::Value;

/// Error returned by a host function.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for HostError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for HostError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

pub type HostFn = dyn Fn(&[Value]) -> Result<Value, HostError> + Send + Sync;

/// A callable host function.
///
/// Functions compare equal only to clones of themselves.
#[derive(Clone)]
pub struct Function {
    name: Arc<str>,
    imp: Arc<HostFn>,
}

impl Function {
    pub fn new<F>(name: &str, imp: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            imp: Arc::new(imp),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, HostError> {
        (self.imp)(args)
    }

    /// Returns a function that calls `self` with `receiver` prepended to the
    /// arguments. This is how struct methods are fetched.
    pub fn bind(&self, receiver: Value) -> Function {
        let inner = self.imp.clone();
        Function {
            name: self.name.clone(),
            imp: Arc::new(move |args: &[Value]| {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(receiver.clone());
                full.extend_from_slice(args);
                inner(&full)
            }),
        }
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.imp, &other.imp)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<func {}>", self.name)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}
