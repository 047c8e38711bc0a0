//! Error types for shadr

use thiserror::Error;

/// Result type alias using shadr's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during program synthesis, caching, and binding
#[derive(Error, Debug)]
pub enum Error {
    /// Logical rank exceeds what the synthesis engine supports
    #[error("Rank {rank} not yet supported for {context} (maximum is {limit})")]
    RankNotSupported {
        /// The offending rank
        rank: usize,
        /// Maximum supported rank in this context
        limit: usize,
        /// What was being synthesized
        context: &'static str,
    },

    /// Operand count differs from what the program was compiled for
    #[error("Operand count mismatch: program was compiled for {expected} operands, got {got}")]
    OperandCountMismatch {
        /// Operand count at compile time
        expected: usize,
        /// Operand count at dispatch time
        got: usize,
    },

    /// Logical shape differs from what the program was compiled for
    #[error("Shape mismatch for operand '{operand}': expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Operand slot name
        operand: &'static str,
        /// Shape at compile time
        expected: Vec<usize>,
        /// Shape at dispatch time
        got: Vec<usize>,
    },

    /// Physical surface shape differs from what the program was compiled for
    #[error(
        "Surface shape mismatch for operand '{operand}': expected {expected:?}, got {got:?}"
    )]
    SurfaceShapeMismatch {
        /// Operand slot name
        operand: &'static str,
        /// (rows, cols) at compile time
        expected: (usize, usize),
        /// (rows, cols) at dispatch time
        got: (usize, usize),
    },

    /// The device context rejected generated source.
    ///
    /// This is an internal-logic bug in the generator, not a user input
    /// problem; the full offending source is carried for diagnosis.
    #[error("Shader compilation failed: {reason}\n--- offending source ---\n{offending_source}")]
    CompileFailed {
        /// Compiler diagnostic from the device context
        reason: String,
        /// The complete generated source
        offending_source: String,
    },

    /// A declared custom parameter was not supplied at dispatch time
    #[error("Missing value for declared parameter '{name}'")]
    MissingParam {
        /// Declared parameter name
        name: String,
    },

    /// A supplied parameter value does not match its declared type
    #[error("Parameter '{name}' declared as {expected}, got {got}")]
    ParamTypeMismatch {
        /// Declared parameter name
        name: String,
        /// Declared type
        expected: &'static str,
        /// Supplied value's type
        got: &'static str,
    },

    /// Invalid argument provided to a template or the assembler
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },
}
