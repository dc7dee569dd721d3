//! `GF(p^2) = Fp[i] / (i^2 + 1)` arithmetic.
//!
//! Karatsuba multiplication/squaring keeps this to three `Fp` multiplies
//! instead of four.

use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

use crate::fp::{Fp, FpParams};

/// An element `c0 + c1*i` of `GF(p^2)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fp2 {
    pub c0: Fp,
    pub c1: Fp,
}

impl Fp2 {
    /// Build `c0 + c1*i` from two already-reduced `Fp` components.
    pub fn new(c0: Fp, c1: Fp) -> Self {
        Self { c0, c1 }
    }

    /// `0 + 0i`.
    pub fn zero(params: &FpParams) -> Self {
        Self::new(Fp::zero(params), Fp::zero(params))
    }

    /// `1 + 0i`.
    pub fn one(params: &FpParams) -> Self {
        Self::new(Fp::one(params), Fp::zero(params))
    }

    /// Lift a small rational integer `n` to `(n mod p) + 0i`.
    pub fn from_u64(params: &FpParams, n: u64) -> Self {
        Self::new(Fp::from_u64(params, n), Fp::zero(params))
    }

    /// Encode as `len`-byte little-endian `c0 || c1`.
    pub fn to_le_bytes(self, len: usize) -> alloc::vec::Vec<u8> {
        let mut out = self.c0.to_le_bytes(len);
        out.extend(self.c1.to_le_bytes(len));
        out
    }

    /// Decode `len`-byte little-endian `c0 || c1`. `None` if either half is
    /// out of range or the slice is the wrong length.
    pub fn from_le_bytes(params: &FpParams, bytes: &[u8], len: usize) -> Option<Self> {
        if bytes.len() != 2 * len {
            return None;
        }
        let c0 = Fp::from_le_bytes(params, &bytes[..len])?;
        let c1 = Fp::from_le_bytes(params, &bytes[len..])?;
        Some(Self::new(c0, c1))
    }

    /// `self == 0`.
    pub fn is_zero(&self) -> Choice {
        self.c0.is_zero() & self.c1.is_zero()
    }

    /// Karatsuba squaring: `(c0+c1)(c0-c1), 2*c0*c1`.
    pub fn square(&self) -> Self {
        let sum = self.c0 + self.c1;
        let diff = self.c0 - self.c1;
        let c0 = sum * diff;
        let c1 = (self.c0 * self.c1).double();
        Self { c0, c1 }
    }

    /// The Galois conjugate `c0 - c1*i`.
    pub fn conjugate(&self) -> Self {
        Self {
            c0: self.c0,
            c1: -self.c1,
        }
    }

    /// Multiplicative inverse: conjugate divided by the norm `c0^2 + c1^2`.
    pub fn invert(&self) -> CtOption<Self> {
        let norm = self.c0.square() + self.c1.square();
        let conj = self.conjugate();
        norm.invert().map(|inv_norm| Self {
            c0: conj.c0 * inv_norm,
            c1: conj.c1 * inv_norm,
        })
    }

    /// Square root, valid whenever `self` is a square in `GF(p^2)`.
    ///
    /// `GF(p^2)` is quadratically closed when `p ≡ 3 (mod 4)` (true for every
    /// SIKE prime): every element has a square root, so this never fails.
    /// Closed-form construction (Scott's Fp2-sqrt): reduce to an `Fp` sqrt of
    /// the norm via `x^((p+1)/4)`, then recover both components.
    pub fn sqrt(&self, params: &FpParams) -> Self {
        let exponent = (params.modulus + crate::fp::U::ONE) >> 2;

        if bool::from(self.c1.is_zero()) {
            let root = self.c0.pow_vartime(&exponent);
            if bool::from((root.square() - self.c0).is_zero()) {
                return Self::new(root, Fp::zero(params));
            }
            let root = (-self.c0).pow_vartime(&exponent);
            return Self::new(Fp::zero(params), root);
        }

        let norm = self.c0.square() + self.c1.square();
        let sqrt_norm = norm.pow_vartime(&exponent);
        let two_inv = Fp::from_u64(params, 2).invert().expect("2 is invertible mod p");

        let mut half_sum = (self.c0 + sqrt_norm) * two_inv;
        let mut c0 = half_sum.pow_vartime(&exponent);
        if !bool::from((c0.square() - half_sum).is_zero()) {
            half_sum = (self.c0 - sqrt_norm) * two_inv;
            c0 = half_sum.pow_vartime(&exponent);
        }
        let c1 = self.c1 * (c0.double().invert().expect("2*c0 is invertible mod p"));
        Self::new(c0, c1)
    }
}

impl ConditionallySelectable for Fp2 {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            c0: Fp::conditional_select(&a.c0, &b.c0, choice),
            c1: Fp::conditional_select(&a.c1, &b.c1, choice),
        }
    }
}

impl ConstantTimeEq for Fp2 {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.c0.ct_eq(&other.c0) & self.c1.ct_eq(&other.c1)
    }
}

impl Zeroize for Fp2 {
    fn zeroize(&mut self) {
        self.c0.zeroize();
        self.c1.zeroize();
    }
}

impl<'a> Add<&'a Fp2> for &'a Fp2 {
    type Output = Fp2;
    fn add(self, rhs: &'a Fp2) -> Fp2 {
        Fp2::new(self.c0 + rhs.c0, self.c1 + rhs.c1)
    }
}
define_add_variants!(LHS = Fp2, RHS = Fp2, Output = Fp2);
define_add_assign_variants!(LHS = Fp2, RHS = Fp2);
impl AddAssign<&Fp2> for Fp2 {
    fn add_assign(&mut self, rhs: &Fp2) {
        self.c0 += rhs.c0;
        self.c1 += rhs.c1;
    }
}

impl<'a> Sub<&'a Fp2> for &'a Fp2 {
    type Output = Fp2;
    fn sub(self, rhs: &'a Fp2) -> Fp2 {
        Fp2::new(self.c0 - rhs.c0, self.c1 - rhs.c1)
    }
}
define_sub_variants!(LHS = Fp2, RHS = Fp2, Output = Fp2);
define_sub_assign_variants!(LHS = Fp2, RHS = Fp2);
impl SubAssign<&Fp2> for Fp2 {
    fn sub_assign(&mut self, rhs: &Fp2) {
        self.c0 -= rhs.c0;
        self.c1 -= rhs.c1;
    }
}

impl<'a> Mul<&'a Fp2> for &'a Fp2 {
    type Output = Fp2;
    fn mul(self, rhs: &'a Fp2) -> Fp2 {
        // Karatsuba: t = c0*d0, u = c1*d1, result = (t-u, (c0+c1)(d0+d1)-t-u)
        let t = self.c0 * rhs.c0;
        let u = self.c1 * rhs.c1;
        let cross = (self.c0 + self.c1) * (rhs.c0 + rhs.c1);
        Fp2::new(t - u, cross - t - u)
    }
}
define_mul_variants!(LHS = Fp2, RHS = Fp2, Output = Fp2);
define_mul_assign_variants!(LHS = Fp2, RHS = Fp2);
impl MulAssign<&Fp2> for Fp2 {
    fn mul_assign(&mut self, rhs: &Fp2) {
        *self = *self * rhs;
    }
}

impl Neg for Fp2 {
    type Output = Fp2;
    fn neg(self) -> Fp2 {
        Fp2::new(-self.c0, -self.c1)
    }
}
impl Neg for &Fp2 {
    type Output = Fp2;
    fn neg(self) -> Fp2 {
        Fp2::new(-self.c0, -self.c1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fp::U;

    fn test_params() -> FpParams {
        FpParams::new(U::from_u64(101))
    }

    #[test]
    fn mul_one_is_identity() {
        let p = test_params();
        let a = Fp2::new(Fp::from_u64(&p, 5), Fp::from_u64(&p, 9));
        assert_eq!(a * Fp2::one(&p), a);
    }

    #[test]
    fn mul_inverse_is_one() {
        let p = test_params();
        let a = Fp2::new(Fp::from_u64(&p, 5), Fp::from_u64(&p, 9));
        let inv = a.invert().unwrap();
        assert_eq!(a * inv, Fp2::one(&p));
    }

    #[test]
    fn conjugate_norm_is_real() {
        let p = test_params();
        let a = Fp2::new(Fp::from_u64(&p, 3), Fp::from_u64(&p, 4));
        let norm = a * a.conjugate();
        assert_eq!(norm.c1.is_zero().unwrap_u8(), 1);
    }
}
