//! The SIKE key encapsulation mechanism: keygen, encapsulate, decapsulate,
//! the Hofheinz-Hovelmanns-Kiltz transform over the underlying SIDH
//! public-key encryption scheme.
//!
//! `sk` always walks the `3^eB`-degree side and holds the long-term keypair;
//! encapsulation generates a fresh ephemeral `2^eA`-degree keypair per call.
//! Session-key and implicit-rejection derivation both go through
//! `sha3::Shake256` as an extendable-output hash.

use alloc::vec;
use alloc::vec::Vec;

use rand_core::{CryptoRng, RngCore};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;
use subtle::{ConditionallySelectable, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::curve::{recover_a, CurveConstants, ProjectivePoint};
use crate::error::{Error, ErrorKind, Result};
use crate::fp2::Fp2;
use crate::isogeny::{traverse_2e, traverse_3e};
use crate::params::SikeParams;

fn shake(inputs: &[&[u8]], out_len: usize) -> Vec<u8> {
    let mut hasher = Shake256::default();
    for input in inputs {
        Update::update(&mut hasher, input);
    }
    let mut reader = hasher.finalize_xof();
    let mut out = vec![0u8; out_len];
    reader.read(&mut out);
    out
}

fn mask_top_byte(bytes: &mut [u8], mask: u8) {
    if let Some(last) = bytes.last_mut() {
        *last &= mask;
    }
}

/// Reverse each `fp_len`-byte component of a concatenated field-element
/// encoding in place, converting between this crate's internal
/// little-endian `Fp`/`Fp2` representation and the MSB-first wire format
/// the NIST SIKE reference test vectors use.
fn reverse_each_component(bytes: &mut [u8], fp_len: usize) {
    for chunk in bytes.chunks_mut(fp_len) {
        chunk.reverse();
    }
}

fn random_masked_bytes(rng: &mut (impl RngCore + CryptoRng), bit_len: u32, mask: u8) -> Vec<u8> {
    let len = (bit_len as usize).div_ceil(8);
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    mask_top_byte(&mut bytes, mask);
    bytes
}

/// One party's public key: the x-coordinates of the other side's basis
/// points, pushed through this party's secret isogeny.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub struct PublicKey {
    x_p: Fp2,
    x_q: Fp2,
    x_r: Fp2,
}

impl PublicKey {
    /// Encode as `x_p || x_q || x_r`, each `Fp` component `fp_len` bytes,
    /// serialized MSB-first to match the NIST SIKE reference test vectors.
    pub fn to_bytes(self, fp_len: usize) -> Vec<u8> {
        let mut out = self.x_p.to_le_bytes(fp_len);
        out.extend(self.x_q.to_le_bytes(fp_len));
        out.extend(self.x_r.to_le_bytes(fp_len));
        reverse_each_component(&mut out, fp_len);
        out
    }

    /// Decode `x_p || x_q || x_r`, MSB-first per `Fp` component.
    pub fn from_bytes(bytes: &[u8], fp_len: usize, params: &SikeParams) -> Result<Self> {
        if bytes.len() != Self::byte_len(fp_len) {
            return Err(Error(ErrorKind::InvalidLength));
        }
        let mut le = bytes.to_vec();
        reverse_each_component(&mut le, fp_len);
        let chunk = 2 * fp_len;
        let x_p = Fp2::from_le_bytes(&params.fp, &le[..chunk], fp_len)
            .ok_or(Error(ErrorKind::InvalidFieldElement))?;
        let x_q = Fp2::from_le_bytes(&params.fp, &le[chunk..2 * chunk], fp_len)
            .ok_or(Error(ErrorKind::InvalidFieldElement))?;
        let x_r = Fp2::from_le_bytes(&params.fp, &le[2 * chunk..3 * chunk], fp_len)
            .ok_or(Error(ErrorKind::InvalidFieldElement))?;
        Ok(Self { x_p, x_q, x_r })
    }

    /// Total encoded length in bytes for a given `Fp` component size.
    pub fn byte_len(fp_len: usize) -> usize {
        3 * 2 * fp_len
    }
}

/// The long-term decapsulation key: the responder's `3^eB`-side secret
/// scalar, its public key, and the implicit-rejection seed `s` (the HHK
/// transform's `sk = (s, sk3, pk3)`).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    s: Vec<u8>,
    sk3: Vec<u8>,
    pk3: PublicKey,
}

impl SecretKey {
    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        self.pk3
    }

    /// Encode as `s || sk3 || pk3`.
    pub fn to_bytes(&self, params: &SikeParams) -> Vec<u8> {
        let mut out = self.s.clone();
        out.extend_from_slice(&self.sk3);
        out.extend(self.pk3.to_bytes(params.fp_byte_size));
        out
    }

    /// Decode `s || sk3 || pk3`.
    pub fn from_bytes(bytes: &[u8], params: &SikeParams) -> Result<Self> {
        let sk3_len = (params.bits_b as usize).div_ceil(8);
        let expected = params.message_bytes + sk3_len + PublicKey::byte_len(params.fp_byte_size);
        if bytes.len() != expected {
            return Err(Error(ErrorKind::InvalidLength));
        }
        let s = bytes[..params.message_bytes].to_vec();
        let sk3 = bytes[params.message_bytes..params.message_bytes + sk3_len].to_vec();
        let pk3 = PublicKey::from_bytes(
            &bytes[params.message_bytes + sk3_len..],
            params.fp_byte_size,
            params,
        )?;
        Ok(Self { s, sk3, pk3 })
    }
}

/// `c0 || c1`: the ephemeral public key and the masked message.
#[derive(Clone)]
pub struct Ciphertext {
    c0: PublicKey,
    c1: Vec<u8>,
}

impl Ciphertext {
    /// Encode as `c0 || c1`.
    pub fn to_bytes(&self, params: &SikeParams) -> Vec<u8> {
        let mut out = self.c0.to_bytes(params.fp_byte_size);
        out.extend_from_slice(&self.c1);
        out
    }

    /// Decode `c0 || c1`.
    pub fn from_bytes(bytes: &[u8], params: &SikeParams) -> Result<Self> {
        let c0_len = PublicKey::byte_len(params.fp_byte_size);
        if bytes.len() != c0_len + params.message_bytes {
            return Err(Error(ErrorKind::InvalidLength));
        }
        let c0 = PublicKey::from_bytes(&bytes[..c0_len], params.fp_byte_size, params)?;
        let c1 = bytes[c0_len..].to_vec();
        Ok(Self { c0, c1 })
    }
}

/// Recover the normalized Montgomery coefficient `A` from a 2-isogeny-chain
/// codomain `(A24+:C24)`: `A24+ = A + 2C`, `C24 = 4C`, so `A = A24+ - C24/2`
/// for any (possibly unnormalized) `C`.
fn curve_a_from_2side(c: &CurveConstants, params: &SikeParams) -> Fp2 {
    let two_inv = Fp2::from_u64(&params.fp, 2)
        .invert()
        .expect("2 is invertible mod p");
    c.a24_plus - c.c24 * two_inv
}

/// Recover `A` from a 3-isogeny-chain codomain `(A24+:A24-)`:
/// `A24+ + A24- = 2A` regardless of the (unused) normalization `C`.
fn curve_a_from_3side(c: &CurveConstants, params: &SikeParams) -> Fp2 {
    let two_inv = Fp2::from_u64(&params.fp, 2)
        .invert()
        .expect("2 is invertible mod p");
    (c.a24_plus + c.a24_minus) * two_inv
}

/// Alice's (2-side) keypair construction: walk the `2^eA`-isogeny chain
/// rooted at `skA` over the curve `a`, pushing the responder's basis
/// `(x_p, x_q, x_r)` through it. Returns the new curve coefficient and the
/// pushed-through public key.
fn isogeny_walk_2side(
    skA: &[u8],
    a: Fp2,
    x_p: Fp2,
    x_q: Fp2,
    x_r: Fp2,
    params: &SikeParams,
) -> (Fp2, PublicKey) {
    let kernel = crate::curve::ladder3pt(
        skA,
        params.bits_a,
        params.basis.pa_x,
        params.basis.qa_x,
        params.basis.ra_x,
        a,
        params,
    );
    let curve = CurveConstants::from_a(a, params);
    let image = (
        ProjectivePoint::from_x(x_p, params),
        ProjectivePoint::from_x(x_q, params),
        ProjectivePoint::from_x(x_r, params),
    );
    let (final_curve, (ip, iq, ir)) =
        traverse_2e(kernel, image, curve, params.e_a, &params.strategy_a);
    let a_new = curve_a_from_2side(&final_curve, params);
    (
        a_new,
        PublicKey {
            x_p: ip.to_affine(),
            x_q: iq.to_affine(),
            x_r: ir.to_affine(),
        },
    )
}

/// Bob's (3-side) keypair construction, the mirror of
/// [`isogeny_walk_2side`] over the `3^eB`-degree chain.
fn isogeny_walk_3side(
    skB: &[u8],
    a: Fp2,
    x_p: Fp2,
    x_q: Fp2,
    x_r: Fp2,
    params: &SikeParams,
) -> (Fp2, PublicKey) {
    let kernel = crate::curve::ladder3pt(
        skB,
        params.bits_b,
        params.basis.pb_x,
        params.basis.qb_x,
        params.basis.rb_x,
        a,
        params,
    );
    let curve = CurveConstants::from_a(a, params);
    let image = (
        ProjectivePoint::from_x(x_p, params),
        ProjectivePoint::from_x(x_q, params),
        ProjectivePoint::from_x(x_r, params),
    );
    let (final_curve, (ip, iq, ir)) =
        traverse_3e(kernel, image, curve, params.e_b, &params.strategy_b);
    let a_new = curve_a_from_3side(&final_curve, params);
    (
        a_new,
        PublicKey {
            x_p: ip.to_affine(),
            x_q: iq.to_affine(),
            x_r: ir.to_affine(),
        },
    )
}

/// Walk the `2^eA`-chain rooted at `skA`, over the curve recovered from a
/// 3-side public key `pk`, discarding the pushed-through image points:
/// returns only the shared `j`-invariant (the SIDH "key agreement" half of
/// encapsulation).
///
/// `pk` is peer-controlled; if its coordinates are degenerate and
/// `recover_a` can't solve for `A`, this substitutes the base curve and
/// carries on rather than erroring, so the caller's constant-time
/// accept/reject path always runs to completion.
fn shared_j_from_3side_pk(skA: &[u8], pk: &PublicKey, params: &SikeParams) -> Fp2 {
    let a = recover_a(pk.x_p, pk.x_q, pk.x_r, params).unwrap_or(params.a0);
    let kernel = crate::curve::ladder3pt(skA, params.bits_a, pk.x_p, pk.x_q, pk.x_r, a, params);
    let curve = CurveConstants::from_a(a, params);
    let dummy = (
        ProjectivePoint::from_x(pk.x_p, params),
        ProjectivePoint::from_x(pk.x_q, params),
        ProjectivePoint::from_x(pk.x_r, params),
    );
    let (final_curve, _) = traverse_2e(kernel, dummy, curve, params.e_a, &params.strategy_a);
    let a_final = curve_a_from_2side(&final_curve, params);
    crate::curve::j_invariant(a_final, params)
}

/// Walk the `3^eB`-chain rooted at `skB`, over the curve recovered from a
/// 2-side public key `pk`.
///
/// `pk` comes from an attacker-supplied ciphertext in `decapsulate`; see
/// [`shared_j_from_3side_pk`] for why a degenerate `pk` falls back to the
/// base curve instead of erroring.
fn shared_j_from_2side_pk(skB: &[u8], pk: &PublicKey, params: &SikeParams) -> Fp2 {
    let a = recover_a(pk.x_p, pk.x_q, pk.x_r, params).unwrap_or(params.a0);
    let kernel = crate::curve::ladder3pt(skB, params.bits_b, pk.x_p, pk.x_q, pk.x_r, a, params);
    let curve = CurveConstants::from_a(a, params);
    let dummy = (
        ProjectivePoint::from_x(pk.x_p, params),
        ProjectivePoint::from_x(pk.x_q, params),
        ProjectivePoint::from_x(pk.x_r, params),
    );
    let (final_curve, _) = traverse_3e(kernel, dummy, curve, params.e_b, &params.strategy_b);
    let a_final = curve_a_from_3side(&final_curve, params);
    crate::curve::j_invariant(a_final, params)
}

fn xor_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

fn derive_skA(m: &[u8], pk3: &PublicKey, params: &SikeParams) -> Vec<u8> {
    let pk_bytes = pk3.to_bytes(params.fp_byte_size);
    let mut skA = shake(&[m, &pk_bytes], (params.bits_a as usize).div_ceil(8));
    mask_top_byte(&mut skA, params.mask_a);
    skA
}

/// Generate a long-term responder (static, `3^eB`-side) keypair.
pub fn keygen(rng: &mut (impl RngCore + CryptoRng), params: &SikeParams) -> SecretKey {
    let sk3 = random_masked_bytes(rng, params.bits_b, params.mask_b);
    let (_a, pk3) = isogeny_walk_3side(
        &sk3,
        params.a0,
        params.basis.pa_x,
        params.basis.qa_x,
        params.basis.ra_x,
        params,
    );
    let mut s = vec![0u8; params.message_bytes];
    rng.fill_bytes(&mut s);
    SecretKey { s, sk3, pk3 }
}

/// Encapsulate against a responder's public key, returning the ciphertext
/// and the shared session key.
pub fn encapsulate(
    rng: &mut (impl RngCore + CryptoRng),
    pk: &PublicKey,
    params: &SikeParams,
) -> (Ciphertext, Vec<u8>) {
    let mut m = vec![0u8; params.message_bytes];
    rng.fill_bytes(&mut m);

    let skA = derive_skA(&m, pk, params);
    let (_a, c0) = isogeny_walk_2side(
        &skA,
        params.a0,
        params.basis.pb_x,
        params.basis.qb_x,
        params.basis.rb_x,
        params,
    );

    let j = shared_j_from_3side_pk(&skA, pk, params);
    let j_bytes = j.to_le_bytes(params.fp_byte_size);
    let mask = shake(&[&j_bytes], params.message_bytes);
    let c1 = xor_bytes(&m, &mask);

    let ct = Ciphertext { c0, c1 };
    let ct_bytes = ct.to_bytes(params);
    let key = shake(&[&m, &ct_bytes], params.crypto_bytes);
    (ct, key)
}

/// Decapsulate a ciphertext with the responder's secret key, returning the
/// shared session key.
///
/// Re-derives the sender's message and ephemeral public key and checks them
/// against the ciphertext in constant time; on mismatch, the implicit
/// rejection seed `s` is used to derive a pseudorandom key instead of
/// revealing the failure, so decapsulation never fails or errors.
pub fn decapsulate(sk: &SecretKey, ct: &Ciphertext, params: &SikeParams) -> Vec<u8> {
    let j = shared_j_from_2side_pk(&sk.sk3, &ct.c0, params);
    let j_bytes = j.to_le_bytes(params.fp_byte_size);
    let mask = shake(&[&j_bytes], params.message_bytes);
    let m_prime = xor_bytes(&ct.c1, &mask);

    let skA_prime = derive_skA(&m_prime, &sk.pk3, params);
    let (_a, c0_prime) = isogeny_walk_2side(
        &skA_prime,
        params.a0,
        params.basis.pb_x,
        params.basis.qb_x,
        params.basis.rb_x,
        params,
    );

    let matches = c0_prime.x_p.ct_eq(&ct.c0.x_p)
        & c0_prime.x_q.ct_eq(&ct.c0.x_q)
        & c0_prime.x_r.ct_eq(&ct.c0.x_r);

    let ct_bytes = ct.to_bytes(params);
    let accept_key = shake(&[&m_prime, &ct_bytes], params.crypto_bytes);
    let reject_key = shake(&[&sk.s, &ct_bytes], params.crypto_bytes);

    let mut key = vec![0u8; params.crypto_bytes];
    for i in 0..params.crypto_bytes {
        key[i] = u8::conditional_select(&reject_key[i], &accept_key[i], matches);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fp::U;

    fn tiny_params() -> SikeParams {
        SikeParams::toy_for_tests(U::from_u64(101))
    }

    #[test]
    fn public_key_byte_round_trip() {
        let params = tiny_params();
        let pk = PublicKey {
            x_p: params.a0,
            x_q: params.a0,
            x_r: params.a0,
        };
        let bytes = pk.to_bytes(params.fp_byte_size);
        let decoded = PublicKey::from_bytes(&bytes, params.fp_byte_size, &params).unwrap();
        assert_eq!(decoded, pk);
    }

    #[test]
    fn public_key_wire_bytes_are_msb_first_per_component() {
        let params = tiny_params();
        let pk = PublicKey {
            x_p: Fp2::from_u64(&params.fp, 4),
            x_q: params.a0,
            x_r: params.a0,
        };
        let wire = pk.to_bytes(params.fp_byte_size);
        let mut c0_msb_first = pk.x_p.c0.to_le_bytes(params.fp_byte_size);
        c0_msb_first.reverse();
        assert_eq!(&wire[..params.fp_byte_size], &c0_msb_first[..]);
    }

    #[test]
    fn xor_bytes_is_involutive() {
        let a = [1u8, 2, 3, 4];
        let b = [9u8, 8, 7, 6];
        let c = xor_bytes(&a, &b);
        let back = xor_bytes(&c, &b);
        assert_eq!(back, a);
    }

    #[test]
    fn shake_output_has_requested_length() {
        let out = shake(&[b"hello"], 42);
        assert_eq!(out.len(), 42);
    }
}
