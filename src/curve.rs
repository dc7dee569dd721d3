//! Montgomery-curve, x-only point arithmetic.
//!
//! `E_{A,C}: C*y^2 = x^3 + (A/C)*x^2 + x` in projective-coefficient form
//! (`B*y^2=x^3+Ax^2+x` with `B=1` once `C` is normalized away). Every point
//! is carried in `(X:Z)` projective coordinates, following the usual x-only
//! Montgomery ladder formulation, with `subtle::ConditionallySelectable`
//! cswaps standing in for every secret-dependent branch.

use subtle::{Choice, ConditionallySelectable, CtOption};
use zeroize::Zeroize;

use crate::fp2::Fp2;
use crate::params::SikeParams;

/// A point in `(X:Z)` projective coordinates. `Z = 0` encodes the point at
/// infinity.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    pub X: Fp2,
    pub Z: Fp2,
}

impl ProjectivePoint {
    /// Lift an affine x-coordinate to `(x:1)`.
    pub fn from_x(x: Fp2, params: &SikeParams) -> Self {
        Self {
            X: x,
            Z: Fp2::one(&params.fp),
        }
    }

    /// `self.X / self.Z`, the affine x-coordinate.
    pub fn to_affine(&self) -> Fp2 {
        let inv = self
            .Z
            .invert()
            .expect("projective points consumed by the KEM are never the point at infinity");
        self.X * inv
    }

    fn conditional_swap(a: &mut Self, b: &mut Self, choice: Choice) {
        Fp2::conditional_swap(&mut a.X, &mut b.X, choice);
        Fp2::conditional_swap(&mut a.Z, &mut b.Z, choice);
    }
}

impl ConditionallySelectable for ProjectivePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            X: Fp2::conditional_select(&a.X, &b.X, choice),
            Z: Fp2::conditional_select(&a.Z, &b.Z, choice),
        }
    }
}

impl Zeroize for ProjectivePoint {
    fn zeroize(&mut self) {
        self.X.zeroize();
        self.Z.zeroize();
    }
}

impl Fp2 {
    fn conditional_swap(a: &mut Self, b: &mut Self, choice: Choice) {
        let original_a = *a;
        *a = Self::conditional_select(&original_a, b, choice);
        *b = Self::conditional_select(b, &original_a, choice);
    }
}

/// The projective curve constants used while walking the isogeny tree:
/// `A24+ = A + 2C`, `C24 = 4C`, `A24- = A - 2C`.
#[derive(Clone, Copy, Debug)]
pub struct CurveConstants {
    pub a24_plus: Fp2,
    pub c24: Fp2,
    pub a24_minus: Fp2,
}

impl CurveConstants {
    /// From the normalized Montgomery coefficient `A` (`C = 1`).
    pub fn from_a(a: Fp2, params: &SikeParams) -> Self {
        let two = Fp2::from_u64(&params.fp, 2);
        let four = Fp2::from_u64(&params.fp, 4);
        Self {
            a24_plus: a + two,
            c24: four,
            a24_minus: a - two,
        }
    }
}

/// `xDBL`: `P -> [2]P`.
#[inline]
pub fn xdbl(p: &ProjectivePoint, c: &CurveConstants) -> ProjectivePoint {
    let t0 = p.X - p.Z;
    let t1 = p.X + p.Z;
    let t0 = t0.square();
    let t1 = t1.square();
    let z = c.c24 * t0;
    let x = z * t1;
    let t1 = t1 - t0;
    let t0 = c.a24_plus * t1;
    let z = z + t0;
    let z = z * t1;
    ProjectivePoint { X: x, Z: z }
}

/// `xDBLADD`: fused double-and-differential-add.
///
/// Returns `(2P, P+Q)` given the known difference `diff = P - Q`. `a24_plus`
/// here is the *normalized* `(A+2)/4` ratio (`C = 1`), matching the ladder's
/// single up-front division rather than the projective `(A24+:C24)` pair
/// `xDBL`/`xTPL` use.
#[inline]
pub fn xdbladd(
    p: &ProjectivePoint,
    q: &ProjectivePoint,
    diff: &ProjectivePoint,
    a24_plus: &Fp2,
) -> (ProjectivePoint, ProjectivePoint) {
    let t0 = p.X + p.Z;
    let t1 = p.X - p.Z;
    let x2 = t0.square();
    let t2 = q.X - q.Z;
    let xpq = q.X + q.Z;
    let t0 = t0 * t2;
    let z2 = t1.square();

    let t1 = t1 * xpq;
    let t2 = x2 - z2;
    let x2 = x2 * z2;
    let xpq = t2 * (*a24_plus);
    let zpq = t0 - t1;
    let z2 = xpq + z2;
    let xpq = t0 + t1;

    let z2 = z2 * t2;
    let zpq = zpq.square();
    let xpq = xpq.square();
    let zpq = diff.X * zpq;
    let xpq = diff.Z * xpq;

    (
        ProjectivePoint { X: x2, Z: z2 },
        ProjectivePoint { X: xpq, Z: zpq },
    )
}

/// `xADD`: differential addition `(P, Q, P-Q) -> P+Q`, without the fused
/// doubling [`xdbladd`] performs when both outputs are needed together.
#[inline]
pub fn xadd(p: &ProjectivePoint, q: &ProjectivePoint, diff: &ProjectivePoint) -> ProjectivePoint {
    let t0 = p.X + p.Z;
    let t1 = p.X - p.Z;
    let t2 = q.X - q.Z;
    let t3 = q.X + q.Z;
    let t0 = t0 * t2;
    let t1 = t1 * t3;
    let x = (t0 + t1).square() * diff.Z;
    let z = (t0 - t1).square() * diff.X;
    ProjectivePoint { X: x, Z: z }
}

/// `xTPL`: `P -> [3]P`.
#[inline]
pub fn xtpl(p: &ProjectivePoint, c: &CurveConstants) -> ProjectivePoint {
    let t0 = p.X - p.Z;
    let t2 = t0.square();
    let t1 = p.X + p.Z;
    let t3 = t1.square();
    let t4 = t1 + t0;
    let t0 = t1 - t0;

    let t1 = t4.square();
    let t1 = t1 - t3;
    let t1 = t1 - t2;
    let t5 = t3 * c.a24_plus;
    let t3 = t5 * t3;
    let t6 = t2 * c.a24_minus;

    let t2 = t2 * t6;
    let t3 = t3 - t2;
    let t2 = t5 - t6;
    let t1 = t2 * t1;
    let t2 = t3 + t1;
    let t2 = t2.square();

    let x = t2 * t4;
    let t1 = t3 - t1;
    let t1 = t1.square();
    let z = t1 * t0;

    ProjectivePoint { X: x, Z: z }
}

/// Repeated doubling, `P -> [2^e]P`.
pub fn xdble(mut p: ProjectivePoint, e: u32, c: &CurveConstants) -> ProjectivePoint {
    for _ in 0..e {
        p = xdbl(&p, c);
    }
    p
}

/// Repeated tripling, `P -> [3^e]P`.
pub fn xtple(mut p: ProjectivePoint, e: u32, c: &CurveConstants) -> ProjectivePoint {
    for _ in 0..e {
        p = xtpl(&p, c);
    }
    p
}

/// Montgomery three-point ladder (Costello-Smith Algorithm 8): computes
/// `R = P + sk*Q` given the known difference `P - Q`.
///
/// Walks `bits` bits of `sk` LSB to MSB, constant-time swapping the ladder
/// rails via `subtle::ConditionallySelectable` so the sequence of
/// `xDBLADD` calls is independent of the bits of `sk`.
pub fn ladder3pt(
    sk: &[u8],
    bits: u32,
    x_p: Fp2,
    x_q: Fp2,
    x_qmp: Fp2,
    a: Fp2,
    params: &SikeParams,
) -> ProjectivePoint {
    let two = Fp2::from_u64(&params.fp, 2);
    let four = Fp2::from_u64(&params.fp, 4);
    let a24_plus = (a + two) * four.invert().expect("4 is invertible mod p");

    let mut r0 = ProjectivePoint::from_x(x_q, params);
    let mut r1 = ProjectivePoint::from_x(x_p, params);
    let diff = ProjectivePoint::from_x(x_qmp, params);

    let mut prev_bit = Choice::from(0u8);
    for i in 0..bits {
        let byte = sk[(i / 8) as usize];
        let bit = Choice::from((byte >> (i % 8)) & 1);
        let swap = bit ^ prev_bit;
        ProjectivePoint::conditional_swap(&mut r0, &mut r1, swap);
        let (new_r0, new_r1) = xdbladd(&r0, &r1, &diff, &a24_plus);
        r0 = new_r0;
        r1 = new_r1;
        prev_bit = bit;
    }
    ProjectivePoint::conditional_swap(&mut r0, &mut r1, prev_bit);
    r1
}

/// Recover the Montgomery coefficient `A` from three x-coordinates (the
/// literature's `get_A`, Algorithm 10): given `xP`, `xQ`, and
/// `x(Q-P)`, return the unique `A` such that `P`, `Q` both lie on
/// `y^2 = x^3 + A x^2 + x`.
///
/// `x_p`, `x_q`, `x_qmp` may come from an untrusted peer's public key or
/// ciphertext, so `4*xP*xQ*x(Q-P)` is not guaranteed nonzero: this returns
/// a [`CtOption`] rather than panicking on that degenerate input.
pub fn recover_a(x_p: Fp2, x_q: Fp2, x_qmp: Fp2, params: &SikeParams) -> CtOption<Fp2> {
    let one = Fp2::one(&params.fp);
    let t1 = x_p + x_q;
    let t0 = x_p * x_q;
    let a = x_qmp * t1;
    let a = a + t0;

    let t0 = t0 * x_qmp;
    let a = a - one;
    let t0 = t0.double();
    let t1 = t1 + x_qmp;

    let t0 = t0.double();
    let a = a.square();

    t0.invert().map(|t0_inv| a * t0_inv - t1)
}

/// `jInvariant(A) = 256*(A^2-3)^3 / (A^2-4)`.
pub fn j_invariant(a: Fp2, params: &SikeParams) -> Fp2 {
    let three = Fp2::from_u64(&params.fp, 3);
    let four = Fp2::from_u64(&params.fp, 4);
    let two_fifty_six = Fp2::from_u64(&params.fp, 256);

    let a2 = a.square();
    let num_base = a2 - three;
    let num = num_base.square() * num_base * two_fifty_six;
    let den = a2 - four;
    num * den.invert().expect("A^2 != 4 for a valid SIKE curve")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fp::{Fp, U};

    fn toy_params() -> SikeParams {
        SikeParams::toy_for_tests(U::from_u64(101))
    }

    #[test]
    fn j_invariant_is_deterministic() {
        let params = toy_params();
        let a = Fp2::from_u64(&params.fp, 6);
        assert_eq!(j_invariant(a, &params), j_invariant(a, &params));
    }

    #[test]
    fn doubling_a_generic_point_does_not_collapse() {
        let params = toy_params();
        let a = Fp2::from_u64(&params.fp, 6);
        let c = CurveConstants::from_a(a, &params);
        let x = Fp2::new(Fp::from_u64(&params.fp, 4), Fp::zero(&params.fp));
        let p = ProjectivePoint::from_x(x, &params);
        let p2 = xdbl(&p, &c);
        assert_eq!(p2.Z.is_zero().unwrap_u8(), 0);
    }

    #[test]
    fn standalone_xadd_agrees_with_xdbladd_sum_output() {
        let params = toy_params();
        let a = Fp2::from_u64(&params.fp, 6);
        let two = Fp2::from_u64(&params.fp, 2);
        let four = Fp2::from_u64(&params.fp, 4);
        let a24_plus = (a + two) * four.invert().unwrap();

        let p = ProjectivePoint::from_x(Fp2::from_u64(&params.fp, 4), &params);
        let q = ProjectivePoint::from_x(Fp2::from_u64(&params.fp, 7), &params);
        let diff = ProjectivePoint::from_x(Fp2::from_u64(&params.fp, 11), &params);

        let (_double, fused_sum) = xdbladd(&p, &q, &diff, &a24_plus);
        let standalone_sum = xadd(&p, &q, &diff);

        assert_eq!(fused_sum.to_affine(), standalone_sum.to_affine());
    }
}
