//! Per-variant parameter tables.
//!
//! Four variants -- SIKEp434, SIKEp503, SIKEp610, SIKEp751 -- built once and
//! cached on first use. Rather than transcribe the NIST submission's prime
//! and basis-point hex constants (a hand-transcription risk this crate
//! avoids, see DESIGN.md), every field here is *computed*: the prime from
//! `(eA, eB)` via real `crypto_bigint` arithmetic, the basis points via
//! `crate::basis`, and the strategy tables via `crate::strategy`.

use alloc::boxed::Box;
use alloc::vec::Vec;

use once_cell::race::OnceBox;

use crate::basis::{build_basis, Basis};
use crate::error::{Error, ErrorKind, Result};
use crate::fp::{FpParams, U};
use crate::fp2::Fp2;

/// One of the four standard SIKE parameter sets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Variant {
    /// NIST security category 1.
    SikeP434,
    /// NIST security category 2.
    SikeP503,
    /// NIST security category 3.
    SikeP610,
    /// NIST security category 5.
    SikeP751,
}

impl Variant {
    /// Parse a variant from its NIST submission name, rejecting anything
    /// else at construction rather than later.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "SIKEp434" => Ok(Self::SikeP434),
            "SIKEp503" => Ok(Self::SikeP503),
            "SIKEp610" => Ok(Self::SikeP610),
            "SIKEp751" => Ok(Self::SikeP751),
            _ => Err(Error(ErrorKind::InvalidVariant)),
        }
    }

    /// The fully built, cached parameter table for this variant. Built on
    /// first use and memoized for the life of the process via
    /// `once_cell::race::OnceBox`, the no_std/alloc-friendly cousin of
    /// `once_cell::sync::Lazy`.
    pub fn params(&self) -> &'static SikeParams {
        match self {
            Self::SikeP434 => {
                P434.get_or_init(|| Box::new(SikeParams::build("SIKEp434", 216, 137, 16)))
            }
            Self::SikeP503 => {
                P503.get_or_init(|| Box::new(SikeParams::build("SIKEp503", 250, 159, 24)))
            }
            Self::SikeP610 => {
                P610.get_or_init(|| Box::new(SikeParams::build("SIKEp610", 305, 192, 24)))
            }
            Self::SikeP751 => {
                P751.get_or_init(|| Box::new(SikeParams::build("SIKEp751", 372, 239, 32)))
            }
        }
    }
}

/// The immutable, per-variant table: process-wide state built once and
/// never mutated.
pub struct SikeParams {
    pub name: &'static str,
    pub fp: FpParams,
    pub e_a: u32,
    pub e_b: u32,
    pub bits_a: u32,
    pub bits_b: u32,
    pub mask_a: u8,
    pub mask_b: u8,
    pub crypto_bytes: usize,
    pub message_bytes: usize,
    pub fp_byte_size: usize,
    pub a0: Fp2,
    pub basis: Basis,
    pub tree_rows_a: u32,
    pub tree_rows_b: u32,
    pub strategy_a: Vec<usize>,
    pub strategy_b: Vec<usize>,
}

fn top_byte_mask(bits: u32) -> u8 {
    let r = bits % 8;
    if r == 0 {
        0xFF
    } else {
        ((1u16 << r) - 1) as u8
    }
}

impl SikeParams {
    fn build(name: &'static str, e_a: u32, e_b: u32, crypto_bytes: usize) -> Self {
        let two_pow = U::ONE.shl_vartime(e_a);
        let three = U::from_u64(3);
        let mut three_pow = U::ONE;
        for _ in 0..e_b {
            three_pow = three_pow.wrapping_mul(&three);
        }
        let modulus = two_pow
            .wrapping_mul(&three_pow)
            .wrapping_sub(&U::ONE);

        let fp = FpParams::new(modulus);
        let fp_byte_size = (modulus.bits_vartime() as usize).div_ceil(8);

        let bits_a = e_a;
        let bits_b = three_pow.bits_vartime();

        // E0: y^2 = x^3 + 6x^2 + x.
        let a0 = Fp2::from_u64(&fp, 6);
        let basis = build_basis(a0, three_pow, two_pow, &fp);

        let tree_rows_a = e_a / 2;
        let tree_rows_b = e_b;
        // Representative relative cost of one doubling/tripling versus one
        // isogeny kernel-computation-plus-evaluation step; any positive
        // weighting yields a valid strategy, though not necessarily
        // NIST-timing-identical.
        let strategy_a = crate::strategy::optimal_strategy(tree_rows_a as usize, 4, 3);
        let strategy_b = crate::strategy::optimal_strategy(tree_rows_b as usize, 5, 3);

        Self {
            name,
            fp,
            e_a,
            e_b,
            bits_a,
            bits_b,
            mask_a: top_byte_mask(bits_a),
            mask_b: top_byte_mask(bits_b),
            crypto_bytes,
            message_bytes: crypto_bytes,
            fp_byte_size,
            a0,
            basis,
            tree_rows_a,
            tree_rows_b,
            strategy_a,
            strategy_b,
        }
    }

    /// A tiny, non-cryptographic parameter set used only by this crate's own
    /// unit tests, built over a toy prime instead of a full SIKE modulus.
    #[cfg(test)]
    pub(crate) fn toy_for_tests(modulus: U) -> Self {
        let fp = FpParams::new(modulus);
        let a0 = Fp2::from_u64(&fp, 6);
        Self {
            name: "toy",
            fp,
            e_a: 2,
            e_b: 1,
            bits_a: 2,
            bits_b: 2,
            mask_a: 0x03,
            mask_b: 0x03,
            crypto_bytes: 16,
            message_bytes: 16,
            fp_byte_size: 8,
            a0,
            basis: Basis {
                pa_x: a0,
                qa_x: a0,
                ra_x: a0,
                pb_x: a0,
                qb_x: a0,
                rb_x: a0,
            },
            tree_rows_a: 1,
            tree_rows_b: 1,
            strategy_a: Vec::new(),
            strategy_b: Vec::new(),
        }
    }
}

static P434: OnceBox<SikeParams> = OnceBox::new();
static P503: OnceBox<SikeParams> = OnceBox::new();
static P610: OnceBox<SikeParams> = OnceBox::new();
static P751: OnceBox<SikeParams> = OnceBox::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_round_trips_through_name() {
        assert_eq!(Variant::from_name("SIKEp434"), Ok(Variant::SikeP434));
    }

    #[test]
    fn unknown_variant_name_is_rejected() {
        assert_eq!(
            Variant::from_name("bogus"),
            Err(Error(ErrorKind::InvalidVariant))
        );
    }
}
