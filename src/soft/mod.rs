// Copyright (C) Microsoft Corporation. All rights reserved.

//! In-process software token.
//!
//! `SoftToken` implements the [`TokenSession`] boundary over RustCrypto
//! primitives with an in-memory keystore. It stands in for a hardware token
//! in tests and development the same way a device simulator stands in for
//! silicon. Attribute semantics follow real tokens: extractability and
//! usage flags are enforced here, not in the adapter.

mod keystore;
mod streams;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use rsa::RsaPublicKey;
use zeroize::Zeroizing;

use crate::mech::Mechanism;
use crate::token::CipherStream;
use crate::token::KeyPairHandle;
use crate::token::KeyTemplate;
use crate::token::SignStream;
use crate::token::TokenError;
use crate::token::TokenSession;
use crate::token::VerifyStream;
use crate::types::KeyHandle;
use crate::types::KeyRole;
use crate::types::KeyUsage;
use crate::types::ObjectId;
use crate::types::TokenId;

use keystore::KeyMaterial;
use keystore::KeyObject;
use keystore::Keystore;
use streams::AesCbcStream;
use streams::CipherDir;
use streams::PssSignStream;
use streams::PssVerifyStream;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Software security token with an in-memory keystore.
pub struct SoftToken {
    id: TokenId,
    store: RwLock<Keystore>,
}

impl SoftToken {
    /// Create a fresh token with a unique identity and an empty keystore.
    pub fn new() -> Self {
        SoftToken {
            id: TokenId(NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed)),
            store: RwLock::new(Keystore::default()),
        }
    }

    fn fetch(&self, key: &KeyHandle) -> Result<KeyObject, TokenError> {
        if key.token() != self.id {
            return Err(TokenError::KeyNotFound);
        }
        self.store.read().get(key.id()).cloned()
    }

    fn handle_for(&self, id: ObjectId, template: &KeyTemplate, role: KeyRole) -> KeyHandle {
        KeyHandle::new(
            id,
            self.id,
            role,
            template.extractable,
            template.usages.clone(),
            template.algorithm.clone(),
        )
    }

    fn secret_bytes(object: &KeyObject) -> Result<Zeroizing<Vec<u8>>, TokenError> {
        match &object.material {
            KeyMaterial::Secret(bytes) => Ok(bytes.clone()),
            _ => Err(TokenError::InvalidKeyMaterial(
                "secret key material expected".to_owned(),
            )),
        }
    }

    fn require_usage(object: &KeyObject, usages: &[KeyUsage]) -> Result<(), TokenError> {
        if object.allows_any(usages) {
            Ok(())
        } else {
            Err(TokenError::UsageViolation)
        }
    }
}

impl Default for SoftToken {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenSession for SoftToken {
    fn token_id(&self) -> TokenId {
        self.id
    }

    async fn sign_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn SignStream>, TokenError> {
        let object = self.fetch(key)?;
        Self::require_usage(&object, &[KeyUsage::Sign])?;
        match (mechanism, &object.material) {
            (Mechanism::RsaPss { hash, salt_len }, KeyMaterial::RsaPrivate(private)) => Ok(
                Box::new(PssSignStream::new(*hash, *salt_len, private.clone())),
            ),
            (Mechanism::RsaPss { .. }, _) => Err(TokenError::InvalidKeyMaterial(
                "RSA private key expected".to_owned(),
            )),
            _ => Err(TokenError::MechanismNotSupported),
        }
    }

    async fn verify_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn VerifyStream>, TokenError> {
        let object = self.fetch(key)?;
        Self::require_usage(&object, &[KeyUsage::Verify])?;
        match (mechanism, &object.material) {
            (Mechanism::RsaPss { hash, salt_len }, KeyMaterial::RsaPublic(public)) => Ok(Box::new(
                PssVerifyStream::new(*hash, *salt_len, public.clone()),
            )),
            (Mechanism::RsaPss { .. }, _) => Err(TokenError::InvalidKeyMaterial(
                "RSA public key expected".to_owned(),
            )),
            _ => Err(TokenError::MechanismNotSupported),
        }
    }

    async fn encrypt_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn CipherStream>, TokenError> {
        let object = self.fetch(key)?;
        Self::require_usage(&object, &[KeyUsage::Encrypt, KeyUsage::WrapKey])?;
        match mechanism {
            Mechanism::AesCbc { iv, pad } => {
                let material = Self::secret_bytes(&object)?;
                Ok(Box::new(AesCbcStream::new(
                    material,
                    *iv,
                    *pad,
                    CipherDir::Encrypt,
                )))
            }
            _ => Err(TokenError::MechanismNotSupported),
        }
    }

    async fn decrypt_init(
        &self,
        mechanism: &Mechanism,
        key: &KeyHandle,
    ) -> Result<Box<dyn CipherStream>, TokenError> {
        let object = self.fetch(key)?;
        Self::require_usage(&object, &[KeyUsage::Decrypt, KeyUsage::UnwrapKey])?;
        match mechanism {
            Mechanism::AesCbc { iv, pad } => {
                let material = Self::secret_bytes(&object)?;
                Ok(Box::new(AesCbcStream::new(
                    material,
                    *iv,
                    *pad,
                    CipherDir::Decrypt,
                )))
            }
            _ => Err(TokenError::MechanismNotSupported),
        }
    }

    async fn generate_key(
        &self,
        mechanism: &Mechanism,
        template: &KeyTemplate,
    ) -> Result<KeyHandle, TokenError> {
        match mechanism {
            Mechanism::AesKeyGen { bits } => {
                if !matches!(bits, 128 | 192 | 256) {
                    return Err(TokenError::MechanismInvalid(format!(
                        "unsupported AES key size {bits}"
                    )));
                }
                let mut material = Zeroizing::new(vec![0u8; bits / 8]);
                OsRng.fill_bytes(&mut material);
                let id = self.store.write().insert(KeyObject {
                    material: KeyMaterial::Secret(material),
                    role: KeyRole::Secret,
                    extractable: template.extractable,
                    usages: template.usages.clone(),
                });
                Ok(self.handle_for(id, template, KeyRole::Secret))
            }
            _ => Err(TokenError::MechanismNotSupported),
        }
    }

    async fn generate_key_pair(
        &self,
        mechanism: &Mechanism,
        public: &KeyTemplate,
        private: &KeyTemplate,
    ) -> Result<KeyPairHandle, TokenError> {
        match mechanism {
            Mechanism::RsaKeyPairGen { modulus_bits } => {
                let private_key = RsaPrivateKey::new(&mut OsRng, *modulus_bits)
                    .map_err(|e| TokenError::OperationFailed(e.to_string()))?;
                let public_key = RsaPublicKey::from(&private_key);

                let mut store = self.store.write();
                let public_id = store.insert(KeyObject {
                    material: KeyMaterial::RsaPublic(public_key),
                    role: KeyRole::Public,
                    extractable: public.extractable,
                    usages: public.usages.clone(),
                });
                let private_id = store.insert(KeyObject {
                    material: KeyMaterial::RsaPrivate(Box::new(private_key)),
                    role: KeyRole::Private,
                    extractable: private.extractable,
                    usages: private.usages.clone(),
                });

                Ok(KeyPairHandle {
                    public: self.handle_for(public_id, public, KeyRole::Public),
                    private: self.handle_for(private_id, private, KeyRole::Private),
                })
            }
            _ => Err(TokenError::MechanismNotSupported),
        }
    }

    async fn import_key(
        &self,
        template: &KeyTemplate,
        material: &[u8],
    ) -> Result<KeyHandle, TokenError> {
        if template.role != KeyRole::Secret {
            return Err(TokenError::InvalidKeyMaterial(
                "raw import supports secret keys only".to_owned(),
            ));
        }
        if material.is_empty() {
            return Err(TokenError::InvalidKeyMaterial(
                "empty key material".to_owned(),
            ));
        }
        let id = self.store.write().insert(KeyObject {
            material: KeyMaterial::Secret(Zeroizing::new(material.to_vec())),
            role: KeyRole::Secret,
            extractable: template.extractable,
            usages: template.usages.clone(),
        });
        Ok(self.handle_for(id, template, KeyRole::Secret))
    }

    async fn export_key(&self, key: &KeyHandle) -> Result<Vec<u8>, TokenError> {
        let object = self.fetch(key)?;
        if !object.extractable {
            return Err(TokenError::NotExtractable);
        }
        match &object.material {
            KeyMaterial::Secret(bytes) => Ok(bytes.to_vec()),
            _ => Err(TokenError::InvalidKeyMaterial(
                "raw export supports secret keys only".to_owned(),
            )),
        }
    }

    async fn destroy_key(&self, key: &KeyHandle) -> Result<(), TokenError> {
        if key.token() != self.id {
            return Err(TokenError::KeyNotFound);
        }
        self.store.write().remove(key.id())
    }
}

impl SoftToken {
    /// Modulus length in bytes of an RSA key object. Used by tests to check
    /// signature sizing.
    pub fn rsa_modulus_len(&self, key: &KeyHandle) -> Result<usize, TokenError> {
        let object = self.fetch(key)?;
        match &object.material {
            KeyMaterial::RsaPublic(public) => Ok(public.size()),
            KeyMaterial::RsaPrivate(private) => Ok(private.size()),
            _ => Err(TokenError::InvalidKeyMaterial("RSA key expected".to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_template() -> KeyTemplate {
        KeyTemplate {
            role: KeyRole::Secret,
            extractable: true,
            usages: vec![KeyUsage::Encrypt, KeyUsage::Decrypt],
            algorithm: "AES-CBC".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_generate_export_destroy_secret_key() {
        let token = SoftToken::new();
        let key = token
            .generate_key(&Mechanism::AesKeyGen { bits: 256 }, &secret_template())
            .await
            .unwrap();

        let material = token.export_key(&key).await.unwrap();
        assert_eq!(material.len(), 32);

        token.destroy_key(&key).await.unwrap();
        assert_eq!(
            token.export_key(&key).await.unwrap_err(),
            TokenError::KeyNotFound
        );
    }

    #[tokio::test]
    async fn test_non_extractable_key_refuses_export() {
        let token = SoftToken::new();
        let mut template = secret_template();
        template.extractable = false;
        let key = token
            .generate_key(&Mechanism::AesKeyGen { bits: 128 }, &template)
            .await
            .unwrap();

        assert_eq!(
            token.export_key(&key).await.unwrap_err(),
            TokenError::NotExtractable
        );
    }

    #[tokio::test]
    async fn test_usage_attributes_are_enforced() {
        let token = SoftToken::new();
        let mut template = secret_template();
        template.usages = vec![KeyUsage::Decrypt];
        let key = token
            .generate_key(&Mechanism::AesKeyGen { bits: 128 }, &template)
            .await
            .unwrap();

        let mech = Mechanism::AesCbc {
            iv: [0u8; 16],
            pad: true,
        };
        assert_eq!(
            token.encrypt_init(&mech, &key).await.map(|_| ()).unwrap_err(),
            TokenError::UsageViolation
        );
        assert!(token.decrypt_init(&mech, &key).await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_handle_is_rejected() {
        let token_a = SoftToken::new();
        let token_b = SoftToken::new();
        let key = token_a
            .generate_key(&Mechanism::AesKeyGen { bits: 128 }, &secret_template())
            .await
            .unwrap();

        assert_eq!(
            token_b.export_key(&key).await.unwrap_err(),
            TokenError::KeyNotFound
        );
    }

    #[tokio::test]
    async fn test_unsupported_generate_mechanism() {
        let token = SoftToken::new();
        let err = token
            .generate_key(
                &Mechanism::AesCbc {
                    iv: [0u8; 16],
                    pad: true,
                },
                &secret_template(),
            )
            .await
            .unwrap_err();
        assert_eq!(err, TokenError::MechanismNotSupported);
    }
}
