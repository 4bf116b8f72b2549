use crate::vm::RuntimeErrorKind;

/// The VM operand stack.
///
/// Underflow is reported as an error rather than a panic, so a malformed
/// program fails its run instead of the host.
#[derive(Debug, Default)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    #[inline]
    pub fn pop(&mut self) -> Result<T, RuntimeErrorKind> {
        self.items.pop().ok_or(RuntimeErrorKind::StackUnderflow)
    }

    #[inline]
    pub fn peek(&self) -> Result<&T, RuntimeErrorKind> {
        self.items.last().ok_or(RuntimeErrorKind::StackUnderflow)
    }

    /// Removes the top `n` values and returns them in push order.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<T>, RuntimeErrorKind> {
        if n > self.items.len() {
            return Err(RuntimeErrorKind::StackUnderflow);
        }
        Ok(self.items.split_off(self.items.len() - n))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut stack = Stack::new();
        stack.push(1);
        stack.push(2);
        assert_eq!(stack.peek(), Ok(&2));
        assert_eq!(stack.pop(), Ok(2));
        assert_eq!(stack.pop(), Ok(1));
        assert_eq!(stack.pop(), Err(RuntimeErrorKind::StackUnderflow));
    }

    #[test]
    fn test_pop_n_keeps_order() {
        let mut stack = Stack::new();
        for i in 0..5 {
            stack.push(i);
        }
        assert_eq!(stack.pop_n(3), Ok(vec![2, 3, 4]));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop_n(3), Err(RuntimeErrorKind::StackUnderflow));
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![0, 1]);
    }
}
