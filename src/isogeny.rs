//! Degree-2/3/4 isogeny kernel construction, point evaluation, and
//! strategy-driven chain traversal.
//!
//! Each step maps a kernel point to the codomain curve and a formula for
//! pushing other points through the same isogeny; the traversal loop walks
//! a `2^eA`- or `3^eB`-degree chain one elementary step at a time, using an
//! explicit stack to follow a precomputed optimal strategy instead of
//! recursion.

use alloc::vec::Vec;

use crate::curve::{xdble, xtple, CurveConstants, ProjectivePoint};
use crate::fp2::Fp2;

/// Three image points tracked alongside the kernel while traversing an
/// isogeny chain.
pub type ImagePoints = (ProjectivePoint, ProjectivePoint, ProjectivePoint);

fn eval_triple(
    f: impl Fn(&ProjectivePoint) -> ProjectivePoint,
    points: ImagePoints,
) -> ImagePoints {
    (f(&points.0), f(&points.1), f(&points.2))
}

/// `get2Iso(K)`: degree-2 kernel-to-codomain step.
pub fn get2iso(k: &ProjectivePoint) -> (Fp2, Fp2) {
    let a = k.X.square();
    let c = k.Z.square();
    let a24_plus = c - a;
    (a24_plus, c)
}

/// `eval2Iso(P, K)`: push `P` through the degree-2 isogeny with kernel `K`.
pub fn eval2iso(p: &ProjectivePoint, k: &ProjectivePoint) -> ProjectivePoint {
    let t0 = k.X + k.Z;
    let t1 = k.X - k.Z;
    let t2 = p.X + p.Z;
    let t3 = p.X - p.Z;
    let t0 = t0 * t3;
    let t1 = t1 * t2;
    let t2 = t0 + t1;
    let t3 = t0 - t1;
    let x = p.X * t2;
    let z = p.Z * t3;
    ProjectivePoint { X: x, Z: z }
}

/// `get4Iso(K)`: degree-4 kernel-to-codomain step. Returns the codomain
/// `(A24+:C24)` pair and the evaluation constants `(k1, k2, k3)`.
pub fn get4iso(k: &ProjectivePoint) -> ((Fp2, Fp2), (Fp2, Fp2, Fp2)) {
    let k2 = k.X - k.Z;
    let k3 = k.X + k.Z;
    let mut k1 = k.Z.square();
    k1 = k1.double();
    let c24 = k1.square();
    let k1 = k1.double();
    let mut a24_plus = k.X.square();
    a24_plus = a24_plus.double();
    a24_plus = a24_plus.square();
    ((a24_plus, c24), (k1, k2, k3))
}

/// `eval4Iso(P, k1, k2, k3)`: push `P` through a degree-4 isogeny.
pub fn eval4iso(p: &ProjectivePoint, k1: &Fp2, k2: &Fp2, k3: &Fp2) -> ProjectivePoint {
    let t0 = p.X + p.Z;
    let t1 = p.X - p.Z;
    let x = t0 * *k2;
    let z = t1 * *k3;
    let t0 = t0 * t1;
    let t0 = t0 * *k1;
    let t1 = x + z;
    let z = x - z;
    let t1 = t1.square();
    let z = z.square();
    let x = t0 + t1;
    let t0 = z - t0;
    let x = x * t1;
    let z = z * t0;
    ProjectivePoint { X: x, Z: z }
}

/// `get3Iso(K)`: degree-3 kernel-to-codomain step. Returns the codomain
/// `(A24+:A24-)` pair and the evaluation constants `(k1, k2)`.
pub fn get3iso(k: &ProjectivePoint) -> ((Fp2, Fp2), (Fp2, Fp2)) {
    let k1 = k.X - k.Z;
    let t0 = k1.square();
    let k2 = k.X + k.Z;
    let t1 = k2.square();
    let t2 = t0 + t1;
    let t3 = k1 + k2;
    let t3 = t3.square();
    let t3 = t3 - t2;
    let t2 = t1 + t3;
    let t3 = t3 + t0;
    let t4 = t3 + t0;
    let t4 = t4.double();
    let t4 = t1 + t4;
    let c = t2 * t4;
    let t4 = t1 + t2;
    let t4 = t4.double();
    let t4 = t0 + t4;
    let t4 = t3 * t4;
    let t0 = t4 - c;
    let a = c + t0;
    ((a, c), (k1, k2))
}

/// `eval3Iso(Q, k1, k2)`: push `Q` through a degree-3 isogeny.
pub fn eval3iso(q: &ProjectivePoint, k1: &Fp2, k2: &Fp2) -> ProjectivePoint {
    let t0 = q.X + q.Z;
    let t1 = q.X - q.Z;
    let t0 = *k1 * t0;
    let t1 = *k2 * t1;
    let t2 = t0 + t1;
    let t0 = t1 - t0;
    let t2 = t2.square();
    let t0 = t0.square();
    let x = q.X * t2;
    let z = q.Z * t0;
    ProjectivePoint { X: x, Z: z }
}

/// Walk the `2^eA`-degree isogeny chain from a kernel `s` of full order
/// `2^e2`, pushing `image` points through every step, driven by `strategy`
/// Returns the codomain
/// `(A24+:C24)` pair and the pushed image points.
///
/// Grounded on `two_e_iso_optim`'s explicit-stack traversal: a queue of
/// `(height, point)` pairs, repeatedly doubled down to height 1 (where a
/// 4-isogeny step is taken) according to `strategy`.
pub fn traverse_2e(
    mut s: ProjectivePoint,
    mut image: ImagePoints,
    curve_plus: CurveConstants,
    e2: u32,
    strategy: &[usize],
) -> (CurveConstants, ImagePoints) {
    let mut curve = curve_plus;
    let mut remaining = e2;

    if remaining % 2 == 1 {
        remaining -= 1;
        let t = xdble(s, remaining, &curve);
        let (a24_plus, c24) = get2iso(&t);
        curve = CurveConstants {
            a24_plus,
            c24,
            a24_minus: a24_plus - c24,
        };
        s = eval2iso(&t, &s);
        image = eval_triple(|p| eval2iso(&t, p), image);
    }

    {
        let mut queue: Vec<(u32, ProjectivePoint)> = Vec::new();
        queue.push((remaining / 2, s));
        let mut i = 1usize;

        while let Some((h, p)) = queue.pop() {
            if h == 1 {
                let ((a24_plus, c24), (k1, k2, k3)) = get4iso(&p);
                curve = CurveConstants {
                    a24_plus,
                    c24,
                    a24_minus: a24_plus - c24,
                };
                let mut next_queue = Vec::with_capacity(queue.len());
                for (h_prime, p_prime) in queue.drain(..) {
                    next_queue.push((h_prime - 1, eval4iso(&p_prime, &k1, &k2, &k3)));
                }
                queue = next_queue;
                image = eval_triple(|q| eval4iso(q, &k1, &k2, &k3), image);
            } else {
                let split = strategy.get(i - 1).copied().unwrap_or(1) as u32;
                debug_assert!(split < h, "invalid strategy: split must shrink the subtree");
                queue.push((h, p));
                let doubled = xdble(p, 2 * split, &curve);
                queue.push((h - split, doubled));
                i += 1;
            }
        }
    }

    (curve, image)
}

/// Walk the `3^eB`-degree isogeny chain from a kernel `s` of full order
/// `3^e3`, pushing `image` points through every step.
///
/// Grounded on `three_e_iso_optim`'s explicit-stack traversal, symmetric to
/// [`traverse_2e`] but using `xTPL`/degree-3 steps throughout.
pub fn traverse_3e(
    s: ProjectivePoint,
    mut image: ImagePoints,
    curve_pm: CurveConstants,
    e3: u32,
    strategy: &[usize],
) -> (CurveConstants, ImagePoints) {
    let mut curve = curve_pm;

    {
        let mut queue: Vec<(u32, ProjectivePoint)> = Vec::new();
        queue.push((e3, s));
        let mut i = 1usize;

        while let Some((h, p)) = queue.pop() {
            if h == 1 {
                let ((a24_plus, a24_minus), (k1, k2)) = get3iso(&p);
                // `c24` is not read by `xTPL`/`eval3Iso`; carry the prior
                // value forward unchanged rather than recompute an unused
                // field.
                curve = CurveConstants {
                    a24_plus,
                    c24: curve.c24,
                    a24_minus,
                };
                let mut next_queue = Vec::with_capacity(queue.len());
                for (h_prime, p_prime) in queue.drain(..) {
                    next_queue.push((h_prime - 1, eval3iso(&p_prime, &k1, &k2)));
                }
                queue = next_queue;
                image = eval_triple(|q| eval3iso(q, &k1, &k2), image);
            } else {
                let split = strategy.get(i - 1).copied().unwrap_or(1) as u32;
                debug_assert!(split < h, "invalid strategy: split must shrink the subtree");
                queue.push((h, p));
                let tripled = xtple(p, split, &curve);
                queue.push((h - split, tripled));
                i += 1;
            }
        }
    }

    (curve, image)
}
