//! Error taxonomy of the symbolic engine.
//!
//! Construction errors (`MalformedExpression`, `UnsupportedOperator`, `Parse`) are raised at the
//! boundary that detected them and no partially built tree is ever returned. Evaluation errors
//! (`UnboundVariable`, `DomainError`, `ArityMismatch`) are ordinary, recoverable outcomes.
//! A missing closed-form antiderivative is not an error at all: it is `Option::None`.
use std::fmt;

/// Errors produced by the symbolic engine.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolicError {
    /// Arity or shape violation detected while building a tree or a function.
    MalformedExpression(String),
    /// An operator or function name that is not part of the closed operator set.
    UnsupportedOperator(String),
    /// A variable of the tree has no value in the binding.
    UnboundVariable(String),
    /// An operation was applied outside of its real domain.
    DomainError { operation: String, value: f64 },
    /// Positional evaluation received the wrong number of arguments.
    ArityMismatch { expected: usize, got: usize },
    /// A default variable was requested from a function without parameters.
    NoParameters,
    /// Text could not be parsed into an expression.
    Parse { input: String, msg: String },
    /// Engine configuration could not be read.
    Config(String),
}

pub type SymbolicResult<T> = Result<T, SymbolicError>;

impl SymbolicError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        SymbolicError::MalformedExpression(msg.into())
    }

    pub fn domain(operation: impl Into<String>, value: f64) -> Self {
        SymbolicError::DomainError {
            operation: operation.into(),
            value,
        }
    }

    /// true for the errors a caller is expected to handle at evaluation time
    pub fn is_evaluation_error(&self) -> bool {
        matches!(
            self,
            SymbolicError::UnboundVariable(_)
                | SymbolicError::DomainError { .. }
                | SymbolicError::ArityMismatch { .. }
        )
    }
}

impl fmt::Display for SymbolicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolicError::MalformedExpression(msg) => write!(f, "Malformed expression: {}", msg),
            SymbolicError::UnsupportedOperator(name) => {
                write!(f, "Unsupported operator or function: '{}'", name)
            }
            SymbolicError::UnboundVariable(name) => {
                write!(f, "Variable '{}' has no value in the binding", name)
            }
            SymbolicError::DomainError { operation, value } => {
                write!(f, "Domain error: {} is undefined at {}", operation, value)
            }
            SymbolicError::ArityMismatch { expected, got } => {
                write!(f, "Expected {} argument(s), got {}", expected, got)
            }
            SymbolicError::NoParameters => {
                write!(f, "Function has no parameters, a variable must be given explicitly")
            }
            SymbolicError::Parse { input, msg } => {
                write!(f, "Cannot parse '{}': {}", input, msg)
            }
            SymbolicError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for SymbolicError {}
