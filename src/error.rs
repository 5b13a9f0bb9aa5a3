// Copyright (C) Microsoft Corporation. All rights reserved.

use thiserror::Error;

use crate::adapter::Operation;
use crate::token::TokenError;

/// Adapter-level error taxonomy.
///
/// Every operation delivers exactly one `Result`; synchronous validation
/// failures and asynchronous token failures travel through the same channel,
/// so callers have a single failure-handling path regardless of where the
/// failure originated.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Requested algorithm name does not canonically match the family, or a
    /// required nested hash descriptor is missing or malformed.
    #[error("algorithm identifier error: {0}")]
    AlgorithmIdentifier(String),

    /// Key handle is absent, belongs to a different token, or has the wrong
    /// role for the requested operation.
    #[error("key type error: {0}")]
    KeyType(String),

    /// Operation is not implemented by the invoked algorithm family.
    #[error("operation '{operation}' is not supported by algorithm '{algorithm}'")]
    NotSupported {
        /// Canonical name of the family, or the requested name when no
        /// family is registered for it.
        algorithm: String,

        /// The operation that was requested.
        operation: Operation,
    },

    /// A structured interchange payload is malformed during unwrap/import.
    #[error("format error: {0}")]
    Format(String),

    /// Passthrough failure from the token session, never reinterpreted.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl AdapterError {
    pub(crate) fn not_supported(algorithm: impl Into<String>, operation: Operation) -> Self {
        AdapterError::NotSupported {
            algorithm: algorithm.into(),
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_error_passes_through_unwrapped() {
        let err = AdapterError::from(TokenError::KeyNotFound);
        match err {
            AdapterError::Token(TokenError::KeyNotFound) => {}
            other => panic!("token error was reinterpreted: {other:?}"),
        }
    }

    #[test]
    fn test_not_supported_names_operation_and_algorithm() {
        let err = AdapterError::not_supported("AES-CBC", Operation::DeriveKey);
        assert_eq!(
            err.to_string(),
            "operation 'derive-key' is not supported by algorithm 'AES-CBC'"
        );
    }
}
