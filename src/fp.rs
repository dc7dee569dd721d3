//! Montgomery-form arithmetic over `GF(p)`.
//!
//! Built on `crypto_bigint`'s *dynamic* modular arithmetic
//! (`modular::{MontyParams, MontyForm}`) rather than its compile-time `Const`
//! variants, since the four SIKE primes are not known as literal constants
//! in this crate (see DESIGN.md) -- they are computed once, at
//! parameter-construction time, as `p = 2^eA * 3^eB - 1`, so the modulus has
//! to be a runtime value. `MontyForm` carries its `MontyParams` by value, so
//! an `Fp` is self-contained: no separate pointer back to a parameter table
//! is needed to add, multiply, or invert one.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crypto_bigint::modular::{MontyForm, MontyParams};
use crypto_bigint::{Odd, Uint};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};
use zeroize::Zeroize;

/// Number of 64-bit limbs shared by every SIKE variant's prime.
///
/// `p751` needs 12 limbs (768 bits); smaller variants simply leave the high
/// limbs at zero. Using one fixed width for all four variants avoids
/// threading a `const LIMBS: usize` generic parameter through every type in
/// this crate (curve points, isogeny steps, the KEM) for a few wasted words.
pub(crate) const LIMBS: usize = 12;

/// The common big-integer type every SIKE prime is represented in.
pub type U = Uint<LIMBS>;

/// Parameters for a single prime field `GF(p)`: the modulus and its
/// precomputed Montgomery constants.
#[derive(Clone)]
pub struct FpParams {
    pub(crate) monty: MontyParams<LIMBS>,
    pub(crate) modulus: U,
}

impl FpParams {
    /// Build the Montgomery constants for an odd modulus.
    pub fn new(modulus: U) -> Self {
        let odd = Odd::new(modulus)
            .into_option()
            .expect("SIKE prime p = 2^eA * 3^eB - 1 is always odd");
        Self {
            monty: MontyParams::new(odd),
            modulus,
        }
    }
}

/// An element of `GF(p)`, held internally in Montgomery form.
#[derive(Clone, Copy)]
pub struct Fp {
    inner: MontyForm<LIMBS>,
}

impl Fp {
    /// The additive identity.
    pub fn zero(params: &FpParams) -> Self {
        Self {
            inner: MontyForm::zero(params.monty),
        }
    }

    /// The multiplicative identity.
    pub fn one(params: &FpParams) -> Self {
        Self {
            inner: MontyForm::one(params.monty),
        }
    }

    /// Lift a small integer `n` into `GF(p)`.
    pub fn from_u64(params: &FpParams, n: u64) -> Self {
        Self {
            inner: MontyForm::new(&U::from_u64(n), params.monty),
        }
    }

    /// Interpret a residue already reduced mod `p` as a field element.
    pub fn from_uint(params: &FpParams, value: U) -> Self {
        Self {
            inner: MontyForm::new(&value, params.monty),
        }
    }

    /// Decode a little-endian byte string as a field element.
    ///
    /// Returns `None` if the value is not in `[0, p)`.
    pub fn from_le_bytes(params: &FpParams, bytes: &[u8]) -> Option<Self> {
        if bytes.len() > LIMBS * 8 {
            return None;
        }
        let mut buf = [0u8; LIMBS * 8];
        buf[..bytes.len()].copy_from_slice(bytes);
        let value = U::from_le_slice(&buf);
        if value >= params.modulus {
            return None;
        }
        Some(Self::from_uint(params, value))
    }

    /// Encode this element as a little-endian byte string of `len` bytes.
    pub fn to_le_bytes(self, len: usize) -> alloc::vec::Vec<u8> {
        let canonical = self.inner.retrieve();
        let bytes = canonical.to_le_bytes();
        bytes.as_ref()[..len].to_vec()
    }

    /// `self == 0`.
    pub fn is_zero(&self) -> Choice {
        self.inner.retrieve().is_zero()
    }

    /// `self + self`.
    pub fn double(&self) -> Self {
        *self + *self
    }

    /// `self * self`.
    pub fn square(&self) -> Self {
        Self {
            inner: self.inner.square(),
        }
    }

    /// Multiplicative inverse; the caller must never call this on zero
    /// outside of a branch-free context where the zero case cannot occur
    /// (SIKE never inverts a provably-zero field element in the hot path).
    pub fn invert(&self) -> CtOption<Self> {
        let (value, is_some) = self.inner.invert();
        CtOption::new(Self { inner: value }, is_some)
    }

    /// `self^exponent` by square-and-multiply, MSB first.
    ///
    /// `exponent` must be public: this is used only for the `(p+1)/4`
    /// sqrt-in-`Fp` exponent during basis-point construction, never on a
    /// secret scalar.
    pub fn pow_vartime(&self, exponent: &U) -> Self {
        let params = self.inner.params();
        let mut result = MontyForm::one(params);
        for i in (0..U::BITS as usize).rev() {
            result = result.square();
            if exponent.bit_vartime(i) {
                result *= self.inner;
            }
        }
        Self { inner: result }
    }
}

impl ConditionallySelectable for Fp {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            inner: MontyForm::conditional_select(&a.inner, &b.inner, choice),
        }
    }
}

impl ConstantTimeEq for Fp {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.inner.ct_eq(&other.inner)
    }
}

impl PartialEq for Fp {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}
impl Eq for Fp {}

impl fmt::Debug for Fp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fp({:?})", self.inner.retrieve())
    }
}

impl Zeroize for Fp {
    fn zeroize(&mut self) {
        // MontyForm has no canonical "uninitialized" state; zeroize a
        // retrieved copy, then write it back so the Montgomery residue
        // held in `self.inner` is actually cleared, not just the copy.
        let mut canonical = self.inner.retrieve();
        let params = self.inner.params();
        canonical.zeroize();
        self.inner = MontyForm::new(&canonical, params);
    }
}

impl<'a> Add<&'a Fp> for &'a Fp {
    type Output = Fp;
    fn add(self, rhs: &'a Fp) -> Fp {
        Fp {
            inner: self.inner + rhs.inner,
        }
    }
}
define_add_variants!(LHS = Fp, RHS = Fp, Output = Fp);
define_add_assign_variants!(LHS = Fp, RHS = Fp);
impl AddAssign<&Fp> for Fp {
    fn add_assign(&mut self, rhs: &Fp) {
        self.inner += rhs.inner;
    }
}

impl<'a> Sub<&'a Fp> for &'a Fp {
    type Output = Fp;
    fn sub(self, rhs: &'a Fp) -> Fp {
        Fp {
            inner: self.inner - rhs.inner,
        }
    }
}
define_sub_variants!(LHS = Fp, RHS = Fp, Output = Fp);
define_sub_assign_variants!(LHS = Fp, RHS = Fp);
impl SubAssign<&Fp> for Fp {
    fn sub_assign(&mut self, rhs: &Fp) {
        self.inner -= rhs.inner;
    }
}

impl<'a> Mul<&'a Fp> for &'a Fp {
    type Output = Fp;
    fn mul(self, rhs: &'a Fp) -> Fp {
        Fp {
            inner: self.inner * rhs.inner,
        }
    }
}
define_mul_variants!(LHS = Fp, RHS = Fp, Output = Fp);
define_mul_assign_variants!(LHS = Fp, RHS = Fp);
impl MulAssign<&Fp> for Fp {
    fn mul_assign(&mut self, rhs: &Fp) {
        self.inner *= rhs.inner;
    }
}

impl Neg for Fp {
    type Output = Fp;
    fn neg(self) -> Fp {
        Fp { inner: -self.inner }
    }
}
impl Neg for &Fp {
    type Output = Fp;
    fn neg(self) -> Fp {
        Fp { inner: -self.inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params() -> FpParams {
        // A small odd prime, purely to exercise the field laws; production
        // parameters live in `crate::params`.
        FpParams::new(U::from_u64(101))
    }

    #[test]
    fn add_zero_is_identity() {
        let p = test_params();
        let a = Fp::from_u64(&p, 42);
        assert_eq!(a + Fp::zero(&p), a);
    }

    #[test]
    fn mul_inverse_is_one() {
        let p = test_params();
        let a = Fp::from_u64(&p, 7);
        let inv = a.invert().unwrap();
        assert_eq!(a * inv, Fp::one(&p));
    }

    #[test]
    fn sub_self_is_zero() {
        let p = test_params();
        let a = Fp::from_u64(&p, 55);
        assert_eq!((a - a).is_zero().unwrap_u8(), 1);
    }
}
