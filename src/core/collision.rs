//! Pure collision math: contact-time prediction and elastic resolution.
//!
//! Prediction solves the scalar quadratic in `t` for two spheres whose
//! centre distance reaches their combined radius. The container takes part
//! through the same formula via its negated reported radius, so one
//! predictor covers both ball-ball and ball-wall contacts.

use crate::core::body::{Ball, Body, Container, DIM};
use crate::error::{Error, Result};

/// Single tolerance governing grazing-contact rejection in the kernel:
/// two reals are equal when their difference is within 100 machine epsilons.
pub const CLOSE_EPS: f64 = 100.0 * f64::EPSILON;

/// Whether `a` and `b` are equal within [`CLOSE_EPS`].
#[inline]
pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= CLOSE_EPS
}

#[inline]
pub(crate) fn dot(a: &[f64; DIM], b: &[f64; DIM]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Time until `a` and `b` next collide along their current trajectories,
/// relative to now, or `None` if they never meet.
///
/// With `Δr = r_a - r_b`, `Δv = v_a - v_b` and combined radius
/// `R = radius(a) + radius(b)` (sign-aware), solves
/// `|Δr + Δv·t| = |R|`, i.e. the quadratic
/// `(Δv·Δv)t² + 2(Δr·Δv)t + (Δr·Δr - R²) = 0`.
///
/// Co-moving pairs (`Δv·Δv ≈ 0`) and complex roots mean no contact. Of the
/// real roots, the smaller positive one clear of zero wins; a root within
/// tolerance of zero is the just-resolved contact re-detecting itself and is
/// skipped in favour of the larger root. Pure function; no side effects.
pub fn time_to_collision<A: Body, B: Body>(a: &A, b: &B) -> Option<f64> {
    let (ra, rb) = (a.position(), b.position());
    let (va, vb) = (a.velocity(), b.velocity());
    let mut dr = [0.0; DIM];
    let mut dv = [0.0; DIM];
    for k in 0..DIM {
        dr[k] = ra[k] - rb[k];
        dv[k] = va[k] - vb[k];
    }

    let qa = dot(&dv, &dv);
    if close(qa, 0.0) {
        return None; // no relative motion
    }
    let qb = 2.0 * dot(&dr, &dv);
    let rsum = a.radius() + b.radius();
    let qc = dot(&dr, &dr) - rsum * rsum;

    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();

    let lo = (-qb - sqrt_disc) / (2.0 * qa);
    let hi = (-qb + sqrt_disc) / (2.0 * qa);
    for t in [lo, hi] {
        if t > 0.0 && !close(t, 0.0) {
            return Some(t);
        }
    }
    None
}

/// Resolve a perfectly elastic collision between two balls in place.
///
/// Velocities are decomposed along the unit line of centres `n`; the normal
/// components follow the 1-D elastic formulas, tangential components are
/// untouched. Conserves total momentum and kinetic energy up to
/// floating-point error.
///
/// Errors with [`Error::MathError`] on coincident centres and
/// [`Error::InvariantViolation`] when the combined mass is zero.
pub fn resolve_balls(a: &mut Ball, b: &mut Ball) -> Result<()> {
    let mut n = [0.0; DIM];
    for k in 0..DIM {
        n[k] = b.r[k] - a.r[k];
    }
    let dist = dot(&n, &n).sqrt();
    if close(dist, 0.0) {
        return Err(Error::MathError(
            "degenerate contact normal between coincident ball centres".into(),
        ));
    }
    for nk in &mut n {
        *nk /= dist;
    }

    let (ma, mb) = (a.mass(), b.mass());
    let msum = ma + mb;
    if msum == 0.0 {
        return Err(Error::InvariantViolation(
            "elastic collision between balls with zero combined mass".into(),
        ));
    }

    let ua = dot(&a.v, &n);
    let ub = dot(&b.v, &n);
    let ua_new = ((ma - mb) * ua + 2.0 * mb * ub) / msum;
    let ub_new = ((mb - ma) * ub + 2.0 * ma * ua) / msum;
    for (k, &nk) in n.iter().enumerate() {
        a.v[k] += (ua_new - ua) * nk;
        b.v[k] += (ub_new - ub) * nk;
    }
    Ok(())
}

/// Reflect a ball off the container wall and credit the impulse to the wall.
///
/// The radial component of the ball's velocity (along the unit vector from
/// the container centre to the ball) is negated; the tangential component is
/// unchanged. The container's running momentum gains `2·m·v_radial` and an
/// impulse-history entry is recorded at `now`. The wall itself never moves.
pub fn resolve_wall(ball: &mut Ball, container: &mut Container, now: f64) -> Result<()> {
    let mut n = ball.r;
    let dist = dot(&n, &n).sqrt();
    if close(dist, 0.0) {
        return Err(Error::MathError(
            "degenerate contact normal: ball at the container centre".into(),
        ));
    }
    for nk in &mut n {
        *nk /= dist;
    }

    let vn = dot(&ball.v, &n);
    let mut dp = [0.0; DIM];
    for (k, &nk) in n.iter().enumerate() {
        ball.v[k] -= 2.0 * vn * nk;
        dp[k] = 2.0 * ball.mass() * vn * nk;
    }
    container.record_impulse(now, dp);
    Ok(())
}
