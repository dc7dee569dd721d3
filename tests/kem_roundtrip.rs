//! End-to-end KEM scenarios: round-trip correctness and implicit rejection
//! on a tampered ciphertext, run against every parameter set the same way a
//! consumer of this crate would.

use chacha20::ChaCha8Rng;
use rand_core::SeedableRng;
use sike::{decapsulate, encapsulate, keygen, Variant};

fn variants() -> [Variant; 4] {
    [
        Variant::SikeP434,
        Variant::SikeP503,
        Variant::SikeP610,
        Variant::SikeP751,
    ]
}

#[test]
fn encapsulate_then_decapsulate_agree() {
    for variant in variants() {
        let params = variant.params();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let sk = keygen(&mut rng, params);
        let (ct, key_sender) = encapsulate(&mut rng, &sk.public_key(), params);
        let key_receiver = decapsulate(&sk, &ct, params);

        assert_eq!(key_sender, key_receiver, "round-trip mismatch for {}", params.name);
    }
}

#[test]
fn two_encapsulations_to_the_same_key_differ() {
    let params = Variant::SikeP434.params();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let sk = keygen(&mut rng, params);

    let (ct1, key1) = encapsulate(&mut rng, &sk.public_key(), params);
    let (ct2, key2) = encapsulate(&mut rng, &sk.public_key(), params);

    assert_ne!(ct1.to_bytes(params), ct2.to_bytes(params));
    assert_ne!(key1, key2);
}

#[test]
fn decapsulating_a_tampered_ciphertext_yields_a_different_key_without_erroring() {
    let params = Variant::SikeP434.params();
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let sk = keygen(&mut rng, params);

    let (ct, honest_key) = encapsulate(&mut rng, &sk.public_key(), params);
    let mut tampered_bytes = ct.to_bytes(params);
    let last = tampered_bytes.len() - 1;
    tampered_bytes[last] ^= 0x01;
    let tampered = sike::Ciphertext::from_bytes(&tampered_bytes, params).unwrap();

    let rejected_key = decapsulate(&sk, &tampered, params);
    assert_ne!(honest_key, rejected_key);
}

#[test]
fn decapsulating_a_ciphertext_with_a_degenerate_public_point_does_not_panic() {
    let params = Variant::SikeP434.params();
    let mut rng = ChaCha8Rng::seed_from_u64(19);
    let sk = keygen(&mut rng, params);

    let (ct, honest_key) = encapsulate(&mut rng, &sk.public_key(), params);
    let mut degenerate_bytes = ct.to_bytes(params);
    // Zero out c0's x_p component: this makes `4*xP*xQ*x(Q-P)` vanish in
    // `recover_a`, which previously panicked instead of rejecting.
    degenerate_bytes[..2 * params.fp_byte_size].fill(0);
    let degenerate = sike::Ciphertext::from_bytes(&degenerate_bytes, params).unwrap();

    let rejected_key = decapsulate(&sk, &degenerate, params);
    assert_eq!(rejected_key.len(), params.crypto_bytes);
    assert_ne!(honest_key, rejected_key);
}

#[test]
fn secret_key_byte_round_trip_preserves_decapsulation() {
    let params = Variant::SikeP434.params();
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let sk = keygen(&mut rng, params);
    let (ct, key) = encapsulate(&mut rng, &sk.public_key(), params);

    let sk_bytes = sk.to_bytes(params);
    let sk_decoded = sike::SecretKey::from_bytes(&sk_bytes, params).unwrap();

    assert_eq!(decapsulate(&sk_decoded, &ct, params), key);
}
