// Copyright (C) Microsoft Corporation. All rights reserved.

use aes::Aes128;
use aes::Aes192;
use aes::Aes256;
use async_trait::async_trait;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::BlockDecryptMut;
use cbc::cipher::BlockEncryptMut;
use cbc::cipher::KeyIvInit;
use rand::rngs::OsRng;
use rsa::Pss;
use rsa::RsaPrivateKey;
use rsa::RsaPublicKey;
use sha2::Digest;
use zeroize::Zeroizing;

use crate::mech::HashKind;
use crate::mech::AES_CBC_IV_LEN;
use crate::token::CipherStream;
use crate::token::SignStream;
use crate::token::TokenError;
use crate::token::VerifyStream;

/// Runtime-selected streaming digest.
pub(crate) enum HashCtx {
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Sha384(sha2::Sha384),
    Sha512(sha2::Sha512),
}

impl HashCtx {
    pub fn new(kind: HashKind) -> Self {
        match kind {
            HashKind::Sha1 => HashCtx::Sha1(sha1::Sha1::new()),
            HashKind::Sha256 => HashCtx::Sha256(sha2::Sha256::new()),
            HashKind::Sha384 => HashCtx::Sha384(sha2::Sha384::new()),
            HashKind::Sha512 => HashCtx::Sha512(sha2::Sha512::new()),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            HashCtx::Sha1(d) => d.update(data),
            HashCtx::Sha256(d) => d.update(data),
            HashCtx::Sha384(d) => d.update(data),
            HashCtx::Sha512(d) => d.update(data),
        }
    }

    pub fn finalize(self) -> Vec<u8> {
        match self {
            HashCtx::Sha1(d) => d.finalize().to_vec(),
            HashCtx::Sha256(d) => d.finalize().to_vec(),
            HashCtx::Sha384(d) => d.finalize().to_vec(),
            HashCtx::Sha512(d) => d.finalize().to_vec(),
        }
    }
}

fn make_pss(kind: HashKind, salt_len: usize) -> Pss {
    match kind {
        HashKind::Sha1 => Pss::new_with_salt::<sha1::Sha1>(salt_len),
        HashKind::Sha256 => Pss::new_with_salt::<sha2::Sha256>(salt_len),
        HashKind::Sha384 => Pss::new_with_salt::<sha2::Sha384>(salt_len),
        HashKind::Sha512 => Pss::new_with_salt::<sha2::Sha512>(salt_len),
    }
}

/// RSASSA-PSS signing context: incremental digest, sign at finalize.
pub(crate) struct PssSignStream {
    hash: HashCtx,
    hash_kind: HashKind,
    salt_len: usize,
    key: Box<RsaPrivateKey>,
}

impl PssSignStream {
    pub fn new(hash_kind: HashKind, salt_len: usize, key: Box<RsaPrivateKey>) -> Self {
        PssSignStream {
            hash: HashCtx::new(hash_kind),
            hash_kind,
            salt_len,
            key,
        }
    }
}

#[async_trait]
impl SignStream for PssSignStream {
    async fn update(&mut self, data: &[u8]) -> Result<(), TokenError> {
        self.hash.update(data);
        Ok(())
    }

    async fn finish(self: Box<Self>) -> Result<Vec<u8>, TokenError> {
        let this = *self;
        let hashed = this.hash.finalize();
        let padding = make_pss(this.hash_kind, this.salt_len);
        this.key
            .sign_with_rng(&mut OsRng, padding, &hashed)
            .map_err(|e| TokenError::OperationFailed(e.to_string()))
    }
}

/// RSASSA-PSS verification context.
pub(crate) struct PssVerifyStream {
    hash: HashCtx,
    hash_kind: HashKind,
    salt_len: usize,
    key: RsaPublicKey,
}

impl PssVerifyStream {
    pub fn new(hash_kind: HashKind, salt_len: usize, key: RsaPublicKey) -> Self {
        PssVerifyStream {
            hash: HashCtx::new(hash_kind),
            hash_kind,
            salt_len,
            key,
        }
    }
}

#[async_trait]
impl VerifyStream for PssVerifyStream {
    async fn update(&mut self, data: &[u8]) -> Result<(), TokenError> {
        self.hash.update(data);
        Ok(())
    }

    async fn finish(self: Box<Self>, signature: &[u8]) -> Result<bool, TokenError> {
        let this = *self;
        let hashed = this.hash.finalize();
        let padding = make_pss(this.hash_kind, this.salt_len);
        // A failed check is a negative verification result, not an error.
        Ok(this.key.verify(padding, &hashed, signature).is_ok())
    }
}

/// Cipher direction.
#[derive(Copy, Clone)]
pub(crate) enum CipherDir {
    Encrypt,
    Decrypt,
}

/// AES-CBC cipher context.
///
/// Input is buffered across updates and the block operation runs at
/// finalize, so `update` always returns an empty chunk; callers must
/// tolerate zero-length update output per the streaming contract.
pub(crate) struct AesCbcStream {
    key: Zeroizing<Vec<u8>>,
    iv: [u8; AES_CBC_IV_LEN],
    pad: bool,
    dir: CipherDir,
    buf: Vec<u8>,
}

impl AesCbcStream {
    pub fn new(key: Zeroizing<Vec<u8>>, iv: [u8; AES_CBC_IV_LEN], pad: bool, dir: CipherDir) -> Self {
        AesCbcStream {
            key,
            iv,
            pad,
            dir,
            buf: Vec::new(),
        }
    }

    fn run(self) -> Result<Vec<u8>, TokenError> {
        if !self.pad && self.buf.len() % AES_CBC_IV_LEN != 0 {
            return Err(TokenError::MechanismInvalid(
                "unpadded AES-CBC requires block-aligned input".to_owned(),
            ));
        }
        match self.dir {
            CipherDir::Encrypt => cbc_encrypt(&self.key, &self.iv, self.pad, &self.buf),
            CipherDir::Decrypt => cbc_decrypt(&self.key, &self.iv, self.pad, &self.buf),
        }
    }
}

#[async_trait]
impl CipherStream for AesCbcStream {
    async fn update(&mut self, data: &[u8]) -> Result<Vec<u8>, TokenError> {
        self.buf.extend_from_slice(data);
        Ok(Vec::new())
    }

    async fn finish(self: Box<Self>) -> Result<Vec<u8>, TokenError> {
        (*self).run()
    }
}

fn cbc_encrypt(
    key: &[u8],
    iv: &[u8; AES_CBC_IV_LEN],
    pad: bool,
    pt: &[u8],
) -> Result<Vec<u8>, TokenError> {
    macro_rules! enc {
        ($cipher:ty) => {{
            let enc = cbc::Encryptor::<$cipher>::new_from_slices(key, iv)
                .map_err(|e| TokenError::InvalidKeyMaterial(e.to_string()))?;
            if pad {
                Ok(enc.encrypt_padded_vec_mut::<Pkcs7>(pt))
            } else {
                Ok(enc.encrypt_padded_vec_mut::<NoPadding>(pt))
            }
        }};
    }
    match key.len() {
        16 => enc!(Aes128),
        24 => enc!(Aes192),
        32 => enc!(Aes256),
        _ => Err(TokenError::InvalidKeyMaterial(
            "AES key must be 16, 24 or 32 bytes".to_owned(),
        )),
    }
}

fn cbc_decrypt(
    key: &[u8],
    iv: &[u8; AES_CBC_IV_LEN],
    pad: bool,
    ct: &[u8],
) -> Result<Vec<u8>, TokenError> {
    macro_rules! dec {
        ($cipher:ty) => {{
            let dec = cbc::Decryptor::<$cipher>::new_from_slices(key, iv)
                .map_err(|e| TokenError::InvalidKeyMaterial(e.to_string()))?;
            let out = if pad {
                dec.decrypt_padded_vec_mut::<Pkcs7>(ct)
            } else {
                dec.decrypt_padded_vec_mut::<NoPadding>(ct)
            };
            out.map_err(|_| TokenError::OperationFailed("decryption failed".to_owned()))
        }};
    }
    match key.len() {
        16 => dec!(Aes128),
        24 => dec!(Aes192),
        32 => dec!(Aes256),
        _ => Err(TokenError::InvalidKeyMaterial(
            "AES key must be 16, 24 or 32 bytes".to_owned(),
        )),
    }
}
