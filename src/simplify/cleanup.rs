use std::collections::BTreeSet;

use crate::math::polygon_2d::{classify_turn, Turn};
use crate::math::Point2;

/// Plans the cleanup cascade on a staged copy of the ring.
///
/// Starting from `seeds`, repeatedly removes one endpoint of every zero-length
/// edge and every vertex whose turn is straight or folded, re-examining the
/// neighbours of each removed vertex. Nothing is mutated; the result is the
/// sorted list of ring positions to delete. For a zero-length edge the vertex
/// that was *not* rewritten (`written`) is the one dropped, so the moved edge
/// keeps its handles. The cascade stops before fewer than 3 vertices remain.
#[must_use]
pub fn plan(points: &[Point2], seeds: &[usize], written: &[usize], eps: f64) -> Vec<usize> {
    let n = points.len();
    if n <= 3 {
        return Vec::new();
    }

    let mut prev: Vec<usize> = (0..n).map(|i| (i + n - 1) % n).collect();
    let mut next: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
    let mut alive = vec![true; n];
    let mut alive_count = n;
    let mut removed = BTreeSet::new();

    let mut work: Vec<usize> = seeds.iter().map(|s| s % n).collect();
    work.sort_unstable();
    work.dedup();
    work.reverse();

    while let Some(k) = work.pop() {
        if !alive[k] || alive_count <= 3 {
            continue;
        }
        let p = prev[k];
        let q = next[k];

        let victim = if (points[k] - points[q]).norm() <= eps {
            Some(pick_victim(k, q, written))
        } else if (points[p] - points[k]).norm() <= eps {
            Some(pick_victim(p, k, written))
        } else if is_redundant(&points[p], &points[k], &points[q], eps) {
            Some(k)
        } else {
            None
        };

        let Some(v) = victim else {
            continue;
        };

        // Unlink `v`, then re-examine both neighbours and `k` itself.
        let (vp, vn) = (prev[v], next[v]);
        next[vp] = vn;
        prev[vn] = vp;
        alive[v] = false;
        alive_count -= 1;
        removed.insert(v);
        tracing::trace!(vertex = v, "cleanup removes vertex");

        for w in [vn, vp, k] {
            if alive[w] {
                work.push(w);
            }
        }
    }

    removed.into_iter().collect()
}

/// Of the two endpoints of a zero-length edge, returns the one to delete.
fn pick_victim(a: usize, b: usize, written: &[usize]) -> usize {
    match (written.contains(&a), written.contains(&b)) {
        (true, false) => b,
        (false, true) => a,
        _ => b.max(a),
    }
}

/// A vertex is redundant when the turn at it is straight or folded back.
fn is_redundant(p: &Point2, k: &Point2, q: &Point2, eps: f64) -> bool {
    let a = k - p;
    let b = q - k;
    let (la, lb) = (a.norm(), b.norm());
    if la <= eps || lb <= eps {
        return true;
    }
    classify_turn(&(a / la), &(b / lb), eps) == Turn::Degenerate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn clean_ring_removes_nothing() {
        let pts = vec![p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)];
        assert!(plan(&pts, &[0, 1, 2, 3], &[], TOLERANCE).is_empty());
    }

    #[test]
    fn collapsed_notch_cascades() {
        // The notch bottom (ring 3, 4) was lifted onto the top edge.
        let pts = vec![
            p(0.0, 0.0),
            p(0.0, 10.0),
            p(4.0, 10.0),
            p(4.0, 10.0),
            p(6.0, 10.0),
            p(6.0, 10.0),
            p(10.0, 10.0),
            p(10.0, 0.0),
        ];
        let removed = plan(&pts, &[2, 3, 4, 5], &[3, 4], TOLERANCE);
        // Both duplicates go, then the two straight survivors on the top edge.
        assert_eq!(removed, vec![2, 3, 4, 5]);
    }

    #[test]
    fn written_vertex_survives_duplicate() {
        let pts = vec![
            p(0.0, 0.0),
            p(0.0, 10.0),
            p(5.0, 10.0),
            p(5.0, 10.0),
            p(10.0, 10.0),
            p(10.0, 0.0),
        ];
        let removed = plan(&pts, &[3], &[3], TOLERANCE);
        // 2 is the unwritten duplicate; 3 then lies straight on the top edge.
        assert_eq!(removed, vec![2, 3]);
    }

    #[test]
    fn folded_spike_is_removed() {
        let pts = vec![
            p(0.0, 0.0),
            p(0.0, 10.0),
            p(5.0, 10.0),
            p(8.0, 10.0),
            p(5.0, 10.0),
            p(10.0, 10.0),
            p(10.0, 0.0),
        ];
        let removed = plan(&pts, &[3], &[], TOLERANCE);
        assert!(removed.contains(&3));
        assert!(!removed.contains(&0));
        assert!(!removed.contains(&6));
    }

    #[test]
    fn never_below_three_vertices() {
        let pts = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)];
        let removed = plan(&pts, &[0, 1, 2, 3], &[], TOLERANCE);
        assert_eq!(removed.len(), 1);
    }
}
