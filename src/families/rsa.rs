// Copyright (C) Microsoft Corporation. All rights reserved.

use async_trait::async_trait;

use crate::adapter::AlgorithmFamily;
use crate::adapter::KeyGenOutcome;
use crate::adapter::OpParam;
use crate::adapter::Operation;
use crate::checks;
use crate::error::AdapterError;
use crate::mech::HashKind;
use crate::mech::Mechanism;
use crate::token::KeyTemplate;
use crate::token::TokenSession;
use crate::types::AlgorithmDescriptor;
use crate::types::KeyHandle;
use crate::types::KeyRole;
use crate::types::KeyUsage;

const NAME: &str = "RSA-PSS";

const CAPABILITIES: &[Operation] = &[Operation::GenerateKey, Operation::Sign, Operation::Verify];

/// Usages that land on the public half of a generated pair.
const PUBLIC_USAGES: &[KeyUsage] = &[KeyUsage::Verify];

/// Usages that land on the private half of a generated pair.
const PRIVATE_USAGES: &[KeyUsage] = &[KeyUsage::Sign];

/// RSASSA-PSS signatures.
///
/// Hash-dependent: sign and verify require a nested hash descriptor naming
/// SHA-1, SHA-256, SHA-384 or SHA-512. The salt length defaults to the
/// digest length when the descriptor does not carry one.
#[derive(Debug, Default)]
pub struct RsaPss;

fn resolve_hash(algorithm: &AlgorithmDescriptor) -> Result<HashKind, AdapterError> {
    let hash = checks::check_hashed_params(algorithm)?;
    HashKind::from_name(&hash.name).ok_or_else(|| {
        AdapterError::AlgorithmIdentifier(format!("unsupported hash algorithm '{}'", hash.name))
    })
}

#[async_trait]
impl AlgorithmFamily for RsaPss {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> &'static [Operation] {
        CAPABILITIES
    }

    fn check(&self, operation: Operation, param: OpParam<'_>) -> Result<(), AdapterError> {
        match (operation, param) {
            (Operation::Sign | Operation::Verify, OpParam::Algorithm(alg)) => {
                resolve_hash(alg).map(|_| ())
            }
            _ => Ok(()),
        }
    }

    fn mechanism(
        &self,
        operation: Operation,
        algorithm: &AlgorithmDescriptor,
        _key: &KeyHandle,
    ) -> Result<Mechanism, AdapterError> {
        match operation {
            Operation::Sign | Operation::Verify => {
                let hash = resolve_hash(algorithm)?;
                let salt_len = algorithm.salt_length.unwrap_or_else(|| hash.digest_len());
                Ok(Mechanism::RsaPss { hash, salt_len })
            }
            _ => Err(AdapterError::not_supported(NAME, operation)),
        }
    }

    async fn generate_key(
        &self,
        session: &dyn TokenSession,
        algorithm: &AlgorithmDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyGenOutcome, AdapterError> {
        self.ensure_supported(Operation::GenerateKey)?;
        let algorithm = checks::check_algorithm(NAME, algorithm)?;
        let modulus_bits = algorithm.modulus_length.ok_or_else(|| {
            AdapterError::AlgorithmIdentifier(
                "RSA-PSS key generation requires a 'modulus_length' parameter".to_owned(),
            )
        })?;
        if !matches!(modulus_bits, 2048 | 3072 | 4096) {
            return Err(AdapterError::AlgorithmIdentifier(format!(
                "RSA-PSS modulus length must be 2048, 3072 or 4096 bits, got {modulus_bits}"
            )));
        }
        tracing::debug!(modulus_bits, "generate RSA key pair");

        let split = |allowed: &[KeyUsage]| -> Vec<KeyUsage> {
            usages
                .iter()
                .copied()
                .filter(|u| allowed.contains(u))
                .collect()
        };
        let public = KeyTemplate {
            role: KeyRole::Public,
            // The public half is always created extractable.
            extractable: true,
            usages: split(PUBLIC_USAGES),
            algorithm: NAME.to_owned(),
        };
        let private = KeyTemplate {
            role: KeyRole::Private,
            extractable,
            usages: split(PRIVATE_USAGES),
            algorithm: NAME.to_owned(),
        };

        let pair = session
            .generate_key_pair(&Mechanism::RsaKeyPairGen { modulus_bits }, &public, &private)
            .await?;
        Ok(KeyGenOutcome::KeyPair(pair))
    }
}
