//! Signature-to-envelope pipeline with realistic payloads.

use biocipher_crypto_core::{
    derive_session_key, encode_utf16le, open_base64, seal_base64, CryptoError, Envelope,
};

/// Stand-in for a platform signature over a fixed challenge.
fn fake_signature(challenge: &str) -> Vec<u8> {
    let mut sig = vec![0u8; 256];
    sig[255] = 1;
    sig.extend_from_slice(encode_utf16le(challenge).unwrap().expose());
    sig
}

#[test]
fn same_signature_reopens_envelope() {
    let sig = fake_signature("hello");
    let encoded = {
        let key = derive_session_key(&sig).unwrap();
        seal_base64(&key, "abandon ability able about above absent").unwrap()
    };

    // A later call re-derives the key from the same signature.
    let key = derive_session_key(&sig).unwrap();
    assert_eq!(
        open_base64(&key, &encoded).unwrap(),
        "abandon ability able about above absent"
    );
}

#[test]
fn different_challenge_cannot_open() {
    let key_a = derive_session_key(&fake_signature("seed-a")).unwrap();
    let key_b = derive_session_key(&fake_signature("seed-b")).unwrap();
    let encoded = seal_base64(&key_a, "payload").unwrap();
    assert!(matches!(
        open_base64(&key_b, &encoded),
        Err(CryptoError::Decryption)
    ));
}

#[test]
fn roundtrip_64kb_payload() {
    let key = derive_session_key(b"large").unwrap();
    let plaintext = "x".repeat(65_536);
    let encoded = seal_base64(&key, &plaintext).unwrap();
    let envelope = Envelope::from_base64(&encoded).unwrap();
    assert_eq!(envelope.ciphertext.len(), 131_072);
    assert_eq!(open_base64(&key, &encoded).unwrap(), plaintext);
}

#[test]
fn wire_form_is_standard_padded_base64() {
    let key = derive_session_key(b"padding").unwrap();
    // 12 + 4 + 16 = 32 bytes → not a multiple of 3 → padded.
    let encoded = seal_base64(&key, "ab").unwrap();
    assert_eq!(encoded.len(), 44);
    assert!(encoded.ends_with('='));
    assert!(encoded
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '='));
}
