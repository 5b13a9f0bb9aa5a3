// Copyright (C) Microsoft Corporation. All rights reserved.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::adapter::AlgorithmFamily;
use crate::adapter::KeyGenOutcome;
use crate::adapter::OpParam;
use crate::adapter::Operation;
use crate::checks;
use crate::error::AdapterError;
use crate::mech::Mechanism;
use crate::mech::AES_CBC_IV_LEN;
use crate::token::KeyTemplate;
use crate::token::TokenSession;
use crate::types::AlgorithmDescriptor;
use crate::types::ExportedKey;
use crate::types::Jwk;
use crate::types::KeyData;
use crate::types::KeyFormat;
use crate::types::KeyHandle;
use crate::types::KeyRole;
use crate::types::KeyUsage;

const NAME: &str = "AES-CBC";

const CAPABILITIES: &[Operation] = &[
    Operation::GenerateKey,
    Operation::Encrypt,
    Operation::Decrypt,
    Operation::WrapKey,
    Operation::UnwrapKey,
    Operation::ExportKey,
    Operation::ImportKey,
];

/// AES in CBC mode with PKCS#7 padding.
///
/// Secret-role keys only. Requires a 16-byte `iv` parameter for cipher
/// operations and a `length` of 128, 192 or 256 bits for key generation.
#[derive(Debug, Default)]
pub struct AesCbc;

fn jwk_alg_tag(len: usize) -> Option<&'static str> {
    match len {
        16 => Some("A128CBC"),
        24 => Some("A192CBC"),
        32 => Some("A256CBC"),
        _ => None,
    }
}

fn check_material_len(len: usize) -> Result<(), AdapterError> {
    if jwk_alg_tag(len).is_none() {
        return Err(AdapterError::Format(format!(
            "AES key material must be 16, 24 or 32 bytes, got {len}"
        )));
    }
    Ok(())
}

#[async_trait]
impl AlgorithmFamily for AesCbc {
    fn name(&self) -> &'static str {
        NAME
    }

    fn capabilities(&self) -> &'static [Operation] {
        CAPABILITIES
    }

    fn check(&self, operation: Operation, param: OpParam<'_>) -> Result<(), AdapterError> {
        match (operation, param) {
            (Operation::Encrypt | Operation::Decrypt, OpParam::Algorithm(alg)) => {
                match alg.iv.as_deref() {
                    Some(iv) if iv.len() == AES_CBC_IV_LEN => Ok(()),
                    Some(iv) => Err(AdapterError::AlgorithmIdentifier(format!(
                        "AES-CBC iv must be {AES_CBC_IV_LEN} bytes, got {}",
                        iv.len()
                    ))),
                    None => Err(AdapterError::AlgorithmIdentifier(
                        "AES-CBC requires an 'iv' parameter".to_owned(),
                    )),
                }
            }
            _ => Ok(()),
        }
    }

    fn role_for(&self, operation: Operation) -> Option<KeyRole> {
        match operation {
            Operation::Encrypt | Operation::Decrypt => Some(KeyRole::Secret),
            Operation::Sign => Some(KeyRole::Private),
            Operation::Verify => Some(KeyRole::Public),
            _ => None,
        }
    }

    fn mechanism(
        &self,
        operation: Operation,
        algorithm: &AlgorithmDescriptor,
        _key: &KeyHandle,
    ) -> Result<Mechanism, AdapterError> {
        match operation {
            Operation::Encrypt | Operation::Decrypt => {
                // The iv parameter was validated by the per-call checks.
                let bytes = algorithm.iv.as_deref().ok_or_else(|| {
                    AdapterError::AlgorithmIdentifier(
                        "AES-CBC requires an 'iv' parameter".to_owned(),
                    )
                })?;
                let mut iv = [0u8; AES_CBC_IV_LEN];
                iv.copy_from_slice(bytes);
                Ok(Mechanism::AesCbc { iv, pad: true })
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
        let bits = algorithm.length.ok_or_else(|| {
            AdapterError::AlgorithmIdentifier(
                "AES-CBC key generation requires a 'length' parameter".to_owned(),
            )
        })?;
        if !matches!(bits, 128 | 192 | 256) {
            return Err(AdapterError::AlgorithmIdentifier(format!(
                "AES-CBC key length must be 128, 192 or 256 bits, got {bits}"
            )));
        }
        tracing::debug!(bits, "generate AES key");

        let template = KeyTemplate {
            role: KeyRole::Secret,
            extractable,
            usages: usages.to_vec(),
            algorithm: NAME.to_owned(),
        };
        let key = session
            .generate_key(&Mechanism::AesKeyGen { bits }, &template)
            .await?;
        Ok(KeyGenOutcome::Key(key))
    }

    async fn export_key(
        &self,
        session: &dyn TokenSession,
        format: KeyFormat,
        key: &KeyHandle,
    ) -> Result<ExportedKey, AdapterError> {
        self.ensure_supported(Operation::ExportKey)?;
        checks::check_secret_key(session.token_id(), Some(key))?;

        // Extractability is enforced by the token, which owns the attribute.
        let material = session.export_key(key).await?;
        match format {
            KeyFormat::Raw => Ok(ExportedKey::Raw(material)),
            KeyFormat::Jwk => {
                let alg = jwk_alg_tag(material.len()).ok_or_else(|| {
                    AdapterError::Format(format!(
                        "AES key material must be 16, 24 or 32 bytes, got {}",
                        material.len()
                    ))
                })?;
                Ok(ExportedKey::Jwk(Jwk {
                    kty: "oct".to_owned(),
                    ext: key.extractable(),
                    key_ops: Some(key.usages().to_vec()),
                    usage: None,
                    alg: Some(alg.to_owned()),
                    k: Some(URL_SAFE_NO_PAD.encode(&material)),
                }))
            }
        }
    }

    async fn import_key(
        &self,
        session: &dyn TokenSession,
        format: KeyFormat,
        data: KeyData,
        algorithm: &AlgorithmDescriptor,
        extractable: bool,
        usages: &[KeyUsage],
    ) -> Result<KeyHandle, AdapterError> {
        self.ensure_supported(Operation::ImportKey)?;
        checks::check_algorithm(NAME, algorithm)?;

        let material = match (format, data) {
            (KeyFormat::Raw, KeyData::Raw(bytes)) => bytes,
            (KeyFormat::Jwk, KeyData::Jwk(jwk)) => {
                if jwk.kty != "oct" {
                    return Err(AdapterError::Format(format!(
                        "expected kty 'oct', got '{}'",
                        jwk.kty
                    )));
                }
                let k = jwk.k.as_deref().ok_or_else(|| {
                    AdapterError::Format("symmetric JWK is missing the 'k' field".to_owned())
                })?;
                URL_SAFE_NO_PAD
                    .decode(k)
                    .map_err(|e| AdapterError::Format(format!("invalid base64url key: {e}")))?
            }
            (format, _) => {
                return Err(AdapterError::Format(format!(
                    "key data does not match the '{format}' format"
                )))
            }
        };
        check_material_len(material.len())?;
        tracing::debug!(format = %format, "import AES key");

        let template = KeyTemplate {
            role: KeyRole::Secret,
            extractable,
            usages: usages.to_vec(),
            algorithm: NAME.to_owned(),
        };
        Ok(session.import_key(&template, &material).await?)
    }
}
