//! Construction-time failures. A finished tree never fails.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrettyError {
    /// Leaf payload was neither a string nor the absent marker, or asked for
    /// the `External` color which only `ExternalLeaf` may carry.
    #[error("invalid leaf input: {found}")]
    InvalidLeafInput { found: String },

    /// Named fields were appended to an abbreviated record, or unnamed
    /// children to a named one.
    #[error("cannot {operation} on {mode} record `{type_name}`")]
    InvalidModeOperation {
        operation: &'static str,
        type_name: String,
        mode: &'static str,
    },
}
