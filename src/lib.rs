// Copyright (C) Microsoft Corporation. All rights reserved.

#![warn(missing_docs)]

//! Algorithm-agnostic key operations over a cryptographic token session.
//!
//! This crate adapts a uniform, async key-operations surface (sign, verify,
//! encrypt, decrypt, wrap, unwrap, derive, export, import, generate) onto a
//! mechanism-oriented token. Algorithm families plug into a registry as
//! trait objects; each operation validates its request fully before the
//! first token call and delivers a single result.

mod adapter;
mod crypto;
mod error;
mod mech;
mod registry;
mod token;
mod types;

pub mod checks;
pub mod families;
pub mod soft;

pub use adapter::AlgorithmFamily;
pub use adapter::KeyGenOutcome;
pub use adapter::OpParam;
pub use adapter::Operation;
pub use crypto::TokenCrypto;
pub use error::AdapterError;
pub use mech::HashKind;
pub use mech::Mechanism;
pub use mech::AES_CBC_IV_LEN;
pub use registry::AlgorithmRegistry;
pub use token::CipherStream;
pub use token::KeyPairHandle;
pub use token::KeyTemplate;
pub use token::SignStream;
pub use token::TokenError;
pub use token::TokenSession;
pub use token::VerifyStream;
pub use types::AlgorithmDescriptor;
pub use types::ExportedKey;
pub use types::Jwk;
pub use types::KeyData;
pub use types::KeyFormat;
pub use types::KeyHandle;
pub use types::KeyRole;
pub use types::KeyUsage;
pub use types::ObjectId;
pub use types::TokenId;
