//! NIST SP 800-38D: AES-256-GCM Known-Answer Test vectors.
//!
//! Checks `ring`'s AES-256-GCM against GCMEncryptExtIV256 test case 14, then
//! feeds the same vector through [`Envelope`] to pin the wire layout.

use biocipher_crypto_core::envelope::{open, Envelope, NONCE_LEN, TAG_LEN};
use ring::aead;

const KEY: [u8; 32] = [0u8; 32];
const IV: [u8; NONCE_LEN] = [0u8; NONCE_LEN];
const PT: [u8; 16] = [0u8; 16];
const CT: [u8; 16] = [
    0xce, 0xa7, 0x40, 0x3d, 0x4d, 0x60, 0x6b, 0x6e, 0x07, 0x4e, 0xc5, 0xd3, 0xba, 0xf3, 0x9d,
    0x18,
];
const TAG: [u8; TAG_LEN] = [
    0xd0, 0xd1, 0xc8, 0xa7, 0x99, 0x99, 0x6b, 0xf0, 0x26, 0x5b, 0x98, 0xb5, 0xd4, 0x8a, 0xb9,
    0x19,
];

#[test]
fn nist_test_case_14_aes256_gcm() {
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, &KEY).expect("key should be valid");
    let key = aead::LessSafeKey::new(unbound);

    let mut in_out = PT.to_vec();
    let tag = key
        .seal_in_place_separate_tag(
            aead::Nonce::assume_unique_for_key(IV),
            aead::Aad::empty(),
            &mut in_out,
        )
        .expect("seal should succeed");

    assert_eq!(in_out.as_slice(), &CT, "ciphertext mismatch");
    assert_eq!(tag.as_ref(), &TAG, "tag mismatch");
}

#[test]
fn nist_vector_opens_through_envelope() {
    let mut wire = Vec::new();
    wire.extend_from_slice(&IV);
    wire.extend_from_slice(&CT);
    wire.extend_from_slice(&TAG);

    let envelope = Envelope::from_bytes(&wire).expect("44-byte envelope should split");
    assert_eq!(envelope.nonce, IV);
    assert_eq!(envelope.ciphertext, CT);
    assert_eq!(envelope.tag, TAG);

    let plaintext = open(&envelope, &KEY).expect("NIST vector should verify");
    assert_eq!(plaintext.expose(), &PT);
}

#[test]
fn nist_vector_with_flipped_tag_bit_is_rejected() {
    let mut tag = TAG;
    tag[0] ^= 0x01;
    let envelope = Envelope {
        nonce: IV,
        ciphertext: CT.to_vec(),
        tag,
    };
    assert!(open(&envelope, &KEY).is_err());
}
