//! Error types for parsing and evaluating templates

/// Parse error with position information
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    /// Byte offset into the raw template
    pub position: usize,
    /// Short excerpt of the input at `position`
    pub context: String,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, position: usize, context: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position,
            context: context.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at position {}: {}", self.position, self.message)?;
        if !self.context.is_empty() {
            write!(f, " (near '{}')", self.context)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Error raised while evaluating a parsed template
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Path did not resolve in the context or the registry
    VariableNotFound { path: String },
    /// No function registered under this name
    FunctionNotFound { name: String },
    /// A function rejected its arguments
    Function { name: String, message: String },
    /// forEach collection was neither a list nor a map
    NotIterable { type_name: &'static str },
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::VariableNotFound { path } => write!(f, "variable not found: {}", path),
            EvalError::FunctionNotFound { name } => write!(f, "function not found: {}", name),
            EvalError::Function { name, message } => write!(f, "{}: {}", name, message),
            EvalError::NotIterable { type_name } => {
                write!(f, "forEach expects an array or object, got {}", type_name)
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Any failure from `Engine` operations
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The template text itself is invalid
    Parse(ParseError),
    /// The template is valid but could not be evaluated with this registry/context
    Eval(EvalError),
}

impl Error {
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "parse error {}", e),
            Error::Eval(e) => write!(f, "evaluation error: {}", e),
        }
    }
}

// Display already includes the inner error
impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
