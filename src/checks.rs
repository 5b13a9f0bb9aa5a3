// Copyright (C) Microsoft Corporation. All rights reserved.

//! Shared precondition checks.
//!
//! Every check is synchronous and runs to completion before any token call
//! is issued. Failures funnel into two error kinds:
//! [`AdapterError::AlgorithmIdentifier`] for identity/parameter problems and
//! [`AdapterError::KeyType`] for key-handle problems.

use crate::error::AdapterError;
use crate::types::AlgorithmDescriptor;
use crate::types::KeyHandle;
use crate::types::KeyRole;
use crate::types::TokenId;

/// Identity check: the request's algorithm name must case-insensitively
/// equal the family's canonical name.
///
/// On success returns a canonicalized copy of the descriptor; the caller's
/// descriptor is never mutated.
pub fn check_algorithm(
    canonical: &str,
    alg: &AlgorithmDescriptor,
) -> Result<AlgorithmDescriptor, AdapterError> {
    if !alg.name.eq_ignore_ascii_case(canonical) {
        return Err(AdapterError::AlgorithmIdentifier(format!(
            "wrong algorithm name '{}', must be '{}'",
            alg.name, canonical
        )));
    }
    Ok(alg.canonicalized(canonical))
}

/// Hashed-parameter check for hash-dependent families: the nested hash
/// descriptor must be present and carry a non-empty name.
pub fn check_hashed_params(
    alg: &AlgorithmDescriptor,
) -> Result<&AlgorithmDescriptor, AdapterError> {
    let hash = alg.hash.as_deref().ok_or_else(|| {
        AdapterError::AlgorithmIdentifier("missing required property 'hash'".to_owned())
    })?;
    if hash.name.is_empty() {
        return Err(AdapterError::AlgorithmIdentifier(
            "hash descriptor is missing a name".to_owned(),
        ));
    }
    Ok(hash)
}

/// Handle check: the handle must be present and must have been produced by
/// the session's token. Role is not inspected.
pub fn check_handle<'a>(
    token: TokenId,
    key: Option<&'a KeyHandle>,
) -> Result<&'a KeyHandle, AdapterError> {
    let key = key.ok_or_else(|| AdapterError::KeyType("key can not be null".to_owned()))?;
    if key.token() != token {
        return Err(AdapterError::KeyType(
            "key handle was not produced by this token".to_owned(),
        ));
    }
    Ok(key)
}

/// Key check: the handle must be present, must have been produced by the
/// session's token, and must carry the expected role.
pub fn check_key(
    token: TokenId,
    key: Option<&KeyHandle>,
    role: KeyRole,
) -> Result<(), AdapterError> {
    let key = check_handle(token, key)?;
    if key.role() != role {
        return Err(AdapterError::KeyType(format!(
            "wrong key type in use, must be '{}'",
            role
        )));
    }
    Ok(())
}

/// Assert a private-role key handle.
pub fn check_private_key(token: TokenId, key: Option<&KeyHandle>) -> Result<(), AdapterError> {
    check_key(token, key, KeyRole::Private)
}

/// Assert a public-role key handle.
pub fn check_public_key(token: TokenId, key: Option<&KeyHandle>) -> Result<(), AdapterError> {
    check_key(token, key, KeyRole::Public)
}

/// Assert a secret-role key handle.
pub fn check_secret_key(token: TokenId, key: Option<&KeyHandle>) -> Result<(), AdapterError> {
    check_key(token, key, KeyRole::Secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeyUsage;
    use crate::types::ObjectId;

    fn secret_key(token: TokenId) -> KeyHandle {
        KeyHandle::new(
            ObjectId(1),
            token,
            KeyRole::Secret,
            true,
            vec![KeyUsage::Encrypt],
            "AES-CBC",
        )
    }

    #[test]
    fn test_algorithm_name_matches_case_insensitively() {
        let alg = AlgorithmDescriptor::new("aEs-CbC");
        let canonical = check_algorithm("AES-CBC", &alg).unwrap();
        assert_eq!(canonical.name, "AES-CBC");
        assert_eq!(alg.name, "aEs-CbC");
    }

    #[test]
    fn test_algorithm_name_mismatch_is_identifier_error() {
        let alg = AlgorithmDescriptor::new("RSA-PSS");
        let err = check_algorithm("AES-CBC", &alg).unwrap_err();
        assert!(matches!(err, AdapterError::AlgorithmIdentifier(_)));
    }

    #[test]
    fn test_missing_hash_is_identifier_error() {
        let alg = AlgorithmDescriptor::new("RSA-PSS");
        assert!(matches!(
            check_hashed_params(&alg).unwrap_err(),
            AdapterError::AlgorithmIdentifier(_)
        ));
    }

    #[test]
    fn test_empty_hash_name_is_identifier_error() {
        let alg = AlgorithmDescriptor::new("RSA-PSS").with_hash(AlgorithmDescriptor::new(""));
        assert!(matches!(
            check_hashed_params(&alg).unwrap_err(),
            AdapterError::AlgorithmIdentifier(_)
        ));
    }

    #[test]
    fn test_hash_descriptor_is_returned_on_success() {
        let alg = AlgorithmDescriptor::new("RSA-PSS").with_hash(AlgorithmDescriptor::new("SHA-256"));
        assert_eq!(check_hashed_params(&alg).unwrap().name, "SHA-256");
    }

    #[test]
    fn test_null_key_fails_for_every_role() {
        for role in [KeyRole::Private, KeyRole::Public, KeyRole::Secret] {
            let err = check_key(TokenId(1), None, role).unwrap_err();
            assert!(matches!(err, AdapterError::KeyType(_)));
        }
    }

    #[test]
    fn test_foreign_token_handle_is_rejected() {
        let key = secret_key(TokenId(2));
        let err = check_secret_key(TokenId(1), Some(&key)).unwrap_err();
        assert!(matches!(err, AdapterError::KeyType(_)));
    }

    #[test]
    fn test_wrong_role_is_rejected() {
        let key = secret_key(TokenId(1));
        let err = check_private_key(TokenId(1), Some(&key)).unwrap_err();
        assert!(matches!(err, AdapterError::KeyType(_)));
    }

    #[test]
    fn test_matching_key_passes() {
        let key = secret_key(TokenId(1));
        check_secret_key(TokenId(1), Some(&key)).unwrap();
    }
}
