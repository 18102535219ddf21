use crate::error::StackError;
use crate::instruction::StackRule;

/// LIFO of partial logic-chain results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalStack {
    values: Vec<bool>,
}

impl EvalStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bottom-to-top view.
    pub fn as_slice(&self) -> &[bool] {
        &self.values
    }

    /// Fail unless the current depth satisfies `rule`.
    pub fn check(&self, rule: StackRule) -> Result<(), StackError> {
        if rule.admits(self.depth()) {
            Ok(())
        } else {
            Err(StackError {
                rule,
                depth: self.depth(),
            })
        }
    }

    pub fn push(&mut self, value: bool) {
        self.values.push(value);
    }

    pub fn pop(&mut self) -> Result<bool, StackError> {
        self.values.pop().ok_or(StackError {
            rule: StackRule::AtLeast(1),
            depth: 0,
        })
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut stack = EvalStack::new();
        stack.push(true);
        stack.push(false);
        assert_eq!(stack.as_slice(), &[true, false]);
        assert_eq!(stack.pop(), Ok(false));
        assert_eq!(stack.pop(), Ok(true));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_underflow_is_an_error() {
        let mut stack = EvalStack::new();
        let err = stack.pop().unwrap_err();
        assert_eq!(err.depth, 0);
    }

    #[test]
    fn test_check_reports_depth() {
        let mut stack = EvalStack::new();
        stack.push(true);
        assert!(stack.check(StackRule::Exactly(1)).is_ok());
        let err = stack.check(StackRule::AtLeast(2)).unwrap_err();
        assert_eq!(err.rule, StackRule::AtLeast(2));
        assert_eq!(err.depth, 1);
        stack.push(true);
        assert!(stack.check(StackRule::Exactly(1)).is_err());
    }
}
