/// Real roots of `a·x² + b·x + c = 0`, sorted ascending.
///
/// Falls back to the linear equation when `|a|` is below `eps`. A double root
/// is reported once.
#[must_use]
pub fn solve_quadratic(a: f64, b: f64, c: f64, eps: f64) -> Vec<f64> {
    if a.abs() < eps {
        if b.abs() < eps {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < -eps {
        return Vec::new();
    }
    let disc_sqrt = discriminant.max(0.0).sqrt();
    if disc_sqrt < eps {
        return vec![-b / (2.0 * a)];
    }

    // Avoid cancellation between -b and the root of the discriminant.
    let q = -0.5 * (b + b.signum() * disc_sqrt);
    let (r0, r1) = if q.abs() < eps {
        ((-b - disc_sqrt) / (2.0 * a), (-b + disc_sqrt) / (2.0 * a))
    } else {
        (q / a, c / q)
    };
    if r0 <= r1 {
        vec![r0, r1]
    } else {
        vec![r1, r0]
    }
}

/// Smallest root of `a·x² + b·x + c = 0` inside `[lo, hi]` (with `eps` slack),
/// clamped into the interval.
#[must_use]
pub fn smallest_root_in(a: f64, b: f64, c: f64, lo: f64, hi: f64, eps: f64) -> Option<f64> {
    solve_quadratic(a, b, c, eps)
        .into_iter()
        .find(|r| *r >= lo - eps && *r <= hi + eps)
        .map(|r| r.clamp(lo, hi))
}
