//! Error types for html2pdf library.

use std::io;
use thiserror::Error;

/// Result type alias for html2pdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading or executing a recipe.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error raised by the Lua runtime while executing a recipe.
    #[error("{0}")]
    Script(#[from] mlua::Error),

    /// Variables passed on the command line are not a JSON object.
    #[error("Invalid variables: {0}")]
    Variables(String),

    /// A bulk attribute table contained a non-string key.
    #[error("'{0}' attribute keys must be strings")]
    InvalidKey(String),

    /// A target attribute has the wrong shape.
    #[error("'{target}' invalid data format: {message}")]
    InvalidFormat {
        /// Name of the owning build target
        target: String,
        /// What was wrong with the value
        message: String,
    },

    /// A cover or page declares neither `input` nor `input_content`.
    #[error("'{0}': page must have 'input' or 'input_content'.")]
    MissingInput(String),

    /// A numeric option could not be parsed as an unsigned integer.
    #[error("'{target}' {context}: detected invalid parameter (uint expected): {field} = {value:?}")]
    InvalidUint {
        /// Name of the owning build target
        target: String,
        /// Attribute the option was read from (`options`, `cover`, ...)
        context: String,
        /// Option key
        field: String,
        /// Raw value as written in the recipe
        value: String,
    },

    /// An option value has a type the option cannot accept.
    #[error("'{target}' {context}: invalid type for option '{field}': {found} given")]
    InvalidOptionType {
        /// Name of the owning build target
        target: String,
        /// Attribute the option was read from
        context: String,
        /// Option key
        field: String,
        /// Type name of the given value
        found: &'static str,
    },

    /// The renderer binary could not be started.
    #[error("wkhtmltopdf unavailable ({path}): {source}")]
    RendererUnavailable {
        /// Binary that failed to spawn
        path: String,
        /// Underlying spawn error
        source: io::Error,
    },

    /// The renderer ran but exited unsuccessfully.
    #[error("wkhtmltopdf failed (exit {exit_code:?}): {stderr}")]
    Renderer {
        /// Process exit code, if any
        exit_code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Variables(err.to_string())
    }
}
