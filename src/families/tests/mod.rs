// Copyright (C) Microsoft Corporation. All rights reserved.

mod rsa_tests;

use std::sync::Arc;

use crate::adapter::KeyGenOutcome;
use crate::crypto::TokenCrypto;
use crate::families::AesCbc;
use crate::families::RsaPss;
use crate::registry::AlgorithmRegistry;
use crate::soft::SoftToken;
use crate::token::KeyPairHandle;
use crate::types::AlgorithmDescriptor;
use crate::types::KeyHandle;
use crate::types::KeyUsage;

/// Entry point over a soft token with both families registered.
pub(crate) fn create_test_crypto() -> (TokenCrypto, SoftToken) {
    let mut registry = AlgorithmRegistry::new();
    registry.register(Arc::new(AesCbc));
    registry.register(Arc::new(RsaPss));
    (TokenCrypto::new(registry), SoftToken::new())
}

pub(crate) fn aes_cbc_alg(iv: &[u8]) -> AlgorithmDescriptor {
    AlgorithmDescriptor::new("AES-CBC").with_iv(iv.to_vec())
}

pub(crate) fn rsa_pss_alg() -> AlgorithmDescriptor {
    AlgorithmDescriptor::new("RSA-PSS").with_hash(AlgorithmDescriptor::new("SHA-256"))
}

pub(crate) async fn generate_aes_key(
    crypto: &TokenCrypto,
    session: &SoftToken,
    bits: usize,
    extractable: bool,
    usages: &[KeyUsage],
) -> KeyHandle {
    let outcome = crypto
        .generate_key(
            session,
            &AlgorithmDescriptor::new("AES-CBC").with_length(bits),
            extractable,
            usages,
        )
        .await
        .expect("AES key generation failed");
    match outcome {
        KeyGenOutcome::Key(key) => key,
        KeyGenOutcome::KeyPair(_) => panic!("expected a single secret key"),
    }
}

pub(crate) async fn generate_rsa_key_pair(
    crypto: &TokenCrypto,
    session: &SoftToken,
    modulus_bits: usize,
) -> KeyPairHandle {
    let outcome = crypto
        .generate_key(
            session,
            &AlgorithmDescriptor::new("RSA-PSS").with_modulus_length(modulus_bits),
            false,
            &[KeyUsage::Sign, KeyUsage::Verify],
        )
        .await
        .expect("RSA key pair generation failed");
    match outcome {
        KeyGenOutcome::KeyPair(pair) => pair,
        KeyGenOutcome::Key(_) => panic!("expected a key pair"),
    }
}
