//! Basis-point construction: `PA`, `QA`, `RA`, `PB`, `QB`, `RB`, the public
//! generators of the `2^eA`- and `3^eB`-torsion subgroups.
//!
//! Derives these from small-integer seeds rather than tabulated constants:
//! seed a small-`x` point on the base curve `E0`, lift to `GF(p^2)` (always
//! possible since `GF(p^2)` is quadratically closed when `p ≡ 3 mod 4`),
//! multiply by the complementary cofactor to land exactly on the
//! `2^eA`- or `3^eB`-torsion subgroup, and use the distortion map
//! `τ(x,y) = (-x, i*y)` to build an independent second generator (the
//! simplest independent choice, `Q = τ(P)`, `R = Q - P`).
//!
//! This is a one-time, parameter-construction-time computation, not a
//! per-operation hot path, so it is implemented with plain affine
//! `(x, y)` arithmetic rather than the x-only projective formulas the rest
//! of the crate uses -- there is no constant-time requirement on public
//! basis points.

use crate::fp::{Fp, FpParams, U};
use crate::fp2::Fp2;

/// The public x-coordinates of the six basis points.
#[derive(Clone, Copy, Debug)]
pub struct Basis {
    pub pa_x: Fp2,
    pub qa_x: Fp2,
    pub ra_x: Fp2,
    pub pb_x: Fp2,
    pub qb_x: Fp2,
    pub rb_x: Fp2,
}

#[derive(Clone, Copy, Debug)]
struct AffinePoint {
    x: Fp2,
    y: Fp2,
}

fn curve_rhs(x: Fp2, a: Fp2) -> Fp2 {
    let x2 = x.square();
    x2 * x + a * x2 + x
}

fn lift_point(seed: u64, a: Fp2, params: &FpParams) -> AffinePoint {
    let x = Fp2::from_u64(params, seed);
    let y = curve_rhs(x, a).sqrt(params);
    AffinePoint { x, y }
}

fn affine_double(p: AffinePoint, a: Fp2, params: &FpParams) -> AffinePoint {
    let three = Fp2::from_u64(params, 3);
    let two = Fp2::from_u64(params, 2);
    let num = p.x.square() * three + a * p.x * two + Fp2::one(params);
    let den = (p.y * two).invert().expect("basis seed points are never 2-torsion");
    let lambda = num * den;
    let x3 = lambda.square() - a - p.x - p.x;
    let y3 = lambda * (p.x - x3) - p.y;
    AffinePoint { x: x3, y: y3 }
}

fn affine_add(p: AffinePoint, q: AffinePoint, a: Fp2, params: &FpParams) -> AffinePoint {
    if bool::from((p.x - q.x).is_zero()) {
        return affine_double(p, a, params);
    }
    let lambda = (q.y - p.y) * (q.x - p.x).invert().expect("x-coordinates differ");
    let x3 = lambda.square() - a - p.x - q.x;
    let y3 = lambda * (p.x - x3) - p.y;
    AffinePoint { x: x3, y: y3 }
}

fn affine_neg(p: AffinePoint) -> AffinePoint {
    AffinePoint { x: p.x, y: -p.y }
}

/// `scalar * p` by fixed-base double-and-add; `scalar` need not be secret
/// (cofactors are public per-variant constants).
fn scalar_mul_affine(p: AffinePoint, scalar: U, a: Fp2, params: &FpParams) -> AffinePoint {
    let top = (0..U::BITS as usize)
        .rev()
        .find(|&i| scalar.bit_vartime(i))
        .expect("cofactor is nonzero");
    let mut acc = p;
    for i in (0..top).rev() {
        acc = affine_double(acc, a, params);
        if scalar.bit_vartime(i) {
            acc = affine_add(acc, p, a, params);
        }
    }
    acc
}

fn distortion(p: AffinePoint, params: &FpParams) -> AffinePoint {
    let i = Fp2::new(Fp::zero(params), Fp::one(params));
    AffinePoint {
        x: -p.x,
        y: p.y * i,
    }
}

fn build_side(seed: u64, cofactor: U, a: Fp2, params: &FpParams) -> (Fp2, Fp2, Fp2) {
    let seed_point = lift_point(seed, a, params);
    let p = scalar_mul_affine(seed_point, cofactor, a, params);
    let q = distortion(p, params);
    let r = affine_add(q, affine_neg(p), a, params);
    (p.x, q.x, r.x)
}

/// Build the six basis-point x-coordinates for a curve `E0: y^2 = x^3 + a*x^2
/// + x` with `2^eA`- and `3^eB`-torsion cofactors `cofactor_a = 3^eB`,
/// `cofactor_b = 2^eA`.
pub fn build_basis(a: Fp2, cofactor_a: U, cofactor_b: U, params: &FpParams) -> Basis {
    let (pa_x, qa_x, ra_x) = build_side(2, cofactor_a, a, params);
    let (pb_x, qb_x, rb_x) = build_side(3, cofactor_b, a, params);
    Basis {
        pa_x,
        qa_x,
        ra_x,
        pb_x,
        qb_x,
        rb_x,
    }
}
