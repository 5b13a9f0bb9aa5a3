// Copyright (C) Microsoft Corporation. All rights reserved.

#[cfg(test)]
mod tests {
    use crate::adapter::Operation;
    use crate::error::AdapterError;
    use crate::families::tests::create_test_crypto;
    use crate::families::tests::generate_rsa_key_pair;
    use crate::families::tests::rsa_pss_alg;
    use crate::types::AlgorithmDescriptor;

    #[tokio::test]
    async fn test_rsa_pss_sign_verify_sha256() {
        let (crypto, session) = create_test_crypto();
        let pair = generate_rsa_key_pair(&crypto, &session, 2048).await;
        let data = [0u8; 32];

        let signature = crypto
            .sign(&session, &rsa_pss_alg(), &pair.private, &data)
            .await
            .expect("sign failed");
        assert_eq!(
            signature.len(),
            session
                .rsa_modulus_len(&pair.private)
                .expect("modulus lookup failed"),
            "Signature length should equal the modulus byte length"
        );

        let valid = crypto
            .verify(&session, &rsa_pss_alg(), &pair.public, &signature, &data)
            .await
            .expect("verify failed");
        assert!(valid, "Signature over the original data should verify");
    }

    #[tokio::test]
    async fn test_rsa_pss_rejects_tampering_without_error() {
        let (crypto, session) = create_test_crypto();
        let pair = generate_rsa_key_pair(&crypto, &session, 2048).await;

        let signature = crypto
            .sign(&session, &rsa_pss_alg(), &pair.private, b"message")
            .await
            .expect("sign failed");

        // A mismatch is a successful verification with a false outcome,
        // never an error.
        let valid = crypto
            .verify(&session, &rsa_pss_alg(), &pair.public, &signature, b"other")
            .await
            .expect("verify over tampered data should not error");
        assert!(!valid, "Tampered data should not verify");

        let mut tampered = signature.clone();
        tampered[0] ^= 0x01;
        let valid = crypto
            .verify(
                &session,
                &rsa_pss_alg(),
                &pair.public,
                &tampered,
                b"message",
            )
            .await
            .expect("verify of tampered signature should not error");
        assert!(!valid, "Tampered signature should not verify");
    }

    #[tokio::test]
    async fn test_rsa_pss_explicit_salt_length() {
        let (crypto, session) = create_test_crypto();
        let pair = generate_rsa_key_pair(&crypto, &session, 2048).await;
        let alg = rsa_pss_alg().with_salt_length(20);

        let signature = crypto
            .sign(&session, &alg, &pair.private, b"salted")
            .await
            .expect("sign with explicit salt length failed");
        let valid = crypto
            .verify(&session, &alg, &pair.public, &signature, b"salted")
            .await
            .expect("verify failed");
        assert!(valid, "Signature should verify under the same salt length");
    }

    #[tokio::test]
    async fn test_rsa_pss_missing_hash_rejected() {
        let (crypto, session) = create_test_crypto();
        let pair = generate_rsa_key_pair(&crypto, &session, 2048).await;

        let err = crypto
            .sign(
                &session,
                &AlgorithmDescriptor::new("RSA-PSS"),
                &pair.private,
                b"data",
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, AdapterError::AlgorithmIdentifier(_)),
            "Missing hash parameter should be rejected, got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_rsa_pss_unsupported_hash_rejected() {
        let (crypto, session) = create_test_crypto();
        let pair = generate_rsa_key_pair(&crypto, &session, 2048).await;
        let alg = AlgorithmDescriptor::new("RSA-PSS")
            .with_hash(AlgorithmDescriptor::new("MD5"));

        let err = crypto
            .sign(&session, &alg, &pair.private, b"data")
            .await
            .unwrap_err();
        assert!(
            matches!(err, AdapterError::AlgorithmIdentifier(_)),
            "Unsupported hash should be rejected, got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_rsa_pss_enforces_key_roles() {
        let (crypto, session) = create_test_crypto();
        let pair = generate_rsa_key_pair(&crypto, &session, 2048).await;

        let err = crypto
            .sign(&session, &rsa_pss_alg(), &pair.public, b"data")
            .await
            .unwrap_err();
        assert!(
            matches!(err, AdapterError::KeyType(_)),
            "Signing with the public half should be a key type error, got {err:?}"
        );

        let err = crypto
            .verify(&session, &rsa_pss_alg(), &pair.private, &[0u8; 256], b"data")
            .await
            .unwrap_err();
        assert!(
            matches!(err, AdapterError::KeyType(_)),
            "Verifying with the private half should be a key type error, got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_rsa_pss_encrypt_not_supported() {
        let (crypto, session) = create_test_crypto();
        let pair = generate_rsa_key_pair(&crypto, &session, 2048).await;

        let err = crypto
            .encrypt(&session, &rsa_pss_alg(), &pair.public, b"data")
            .await
            .unwrap_err();
        match err {
            AdapterError::NotSupported {
                algorithm,
                operation,
            } => {
                assert_eq!(algorithm, "RSA-PSS");
                assert_eq!(operation, Operation::Encrypt);
            }
            other => panic!("Expected NotSupported, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rsa_pss_key_gen_requires_modulus_length() {
        let (crypto, session) = create_test_crypto();

        let err = crypto
            .generate_key(
                &session,
                &AlgorithmDescriptor::new("RSA-PSS"),
                false,
                &[],
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, AdapterError::AlgorithmIdentifier(_)),
            "Missing modulus length should be rejected, got {err:?}"
        );
    }
}
