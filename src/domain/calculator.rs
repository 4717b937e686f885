use std::fmt;

/// Operations supported by the numeric calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Subtract,
    Multiply,
    Divide,
    Exponentiate,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Subtract => "subtract",
            Action::Multiply => "multiply",
            Action::Divide => "divide",
            Action::Exponentiate => "exponentiate",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "add" => Some(Action::Add),
            "subtract" => Some(Action::Subtract),
            "multiply" => Some(Action::Multiply),
            "divide" => Some(Action::Divide),
            "exponentiate" => Some(Action::Exponentiate),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Apply `action` to the two operands. Division by zero follows IEEE 754
/// (yields infinity), so this never fails.
pub fn evaluate(a: f64, b: f64, action: Action) -> f64 {
    match action {
        Action::Add => a + b,
        Action::Subtract => a - b,
        Action::Multiply => a * b,
        Action::Divide => a / b,
        Action::Exponentiate => a.powf(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_table() {
        let cases = [
            (1.0, 2.0, Action::Add, 3.0),
            (2.0, 2.0, Action::Add, 4.0),
            (3.0, 2.0, Action::Add, 5.0),
            (5.0, 3.0, Action::Subtract, 2.0),
            (6.0, 7.0, Action::Multiply, 42.0),
            (20.0, 4.0, Action::Divide, 5.0),
            (2.0, 3.0, Action::Exponentiate, 8.0),
            (5.0, 0.0, Action::Divide, f64::INFINITY), // division by zero case
        ];

        for (a, b, action, expected) in cases {
            assert_eq!(
                evaluate(a, b, action),
                expected,
                "{} {} {} should be {}",
                a,
                action,
                b,
                expected
            );
        }
    }

    #[test]
    fn test_action_roundtrip() {
        for action in [
            Action::Add,
            Action::Subtract,
            Action::Multiply,
            Action::Divide,
            Action::Exponentiate,
        ] {
            assert_eq!(Action::from_str(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_invalid_action_string() {
        assert_eq!(Action::from_str("modulo"), None);
        assert_eq!(Action::from_str(""), None);
    }
}
