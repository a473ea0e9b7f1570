//! 2D footprint of a skirt: convex hull and re-projection of dented segments.

use keebgen_math::{cross_2d, line_intersection_2d, Point2, Tolerance, Vec2};
use tracing::{debug, warn};

use crate::skirt::SkirtSegment;

/// Convex hull of `points` by gift wrapping, as indices in counter-clockwise
/// order starting from the leftmost point (lowest y on ties).
///
/// Collinear points on a hull edge are skipped in favour of the farthest one.
/// With fewer than three points every point is on the hull.
pub fn gift_wrap(points: &[Point2]) -> Vec<usize> {
    let n = points.len();
    if n < 3 {
        return (0..n).collect();
    }
    let eps = Tolerance::DEFAULT.linear;

    let start = (0..n)
        .min_by(|&a, &b| {
            let (pa, pb) = (points[a], points[b]);
            pa.x.total_cmp(&pb.x).then(pa.y.total_cmp(&pb.y))
        })
        .unwrap_or(0);

    let mut hull = vec![start];
    let mut current = start;
    // A hull never has more vertices than there are points.
    for _ in 0..n {
        let mut candidate = if current == 0 { 1 } else { 0 };
        for j in 0..n {
            if j == current {
                continue;
            }
            let to_cand = points[candidate] - points[current];
            let to_j = points[j] - points[current];
            let turn = cross_2d(&to_cand, &to_j);
            // j lies clockwise of the current edge, so the edge must swing to it
            if turn < -eps || (turn.abs() <= eps && to_j.norm() > to_cand.norm()) {
                candidate = j;
            }
        }
        if candidate == start || (points[candidate] - points[current]).norm() <= eps {
            break;
        }
        hull.push(candidate);
        current = candidate;
    }
    hull
}

/// Move the bottom and middle corners of segments that fall inside the hull
/// of the bottom-outer footprint onto the hull edge spanning them.
///
/// Segments are visited in loop order; each off-hull segment is projected
/// along its own flare line onto the edge between the nearest hull members
/// before and after it. Inner corners land on the same edge offset inward by
/// `wall_thickness`. A segment whose flare line is parallel to that edge is
/// left unchanged.
pub(crate) fn fit_to_hull(segments: &mut [SkirtSegment], wall_thickness: f64) {
    let footprint: Vec<Point2> = segments.iter().map(|s| s.bottom_outer.xy()).collect();
    let hull = gift_wrap(&footprint);
    if hull.len() < 2 || hull.len() == segments.len() {
        return;
    }

    let on_hull: Vec<bool> = (0..segments.len()).map(|i| hull.contains(&i)).collect();
    let hull_center = {
        let sum = hull.iter().fold(Vec2::zeros(), |acc, &i| acc + footprint[i].coords);
        Point2::from(sum / hull.len() as f64)
    };
    let n = segments.len();

    for i in 0..n {
        if on_hull[i] {
            continue;
        }
        let prev = (1..n).map(|k| (i + n - k) % n).find(|&k| on_hull[k]);
        let next = (1..n).map(|k| (i + k) % n).find(|&k| on_hull[k]);
        let (Some(prev), Some(next)) = (prev, next) else {
            continue;
        };
        if prev == next {
            continue;
        }

        let edge_start = footprint[prev];
        let edge = footprint[next] - edge_start;
        let origin = segments[i].shared.xy();
        let flare = footprint[i] - origin;

        let Some(outer) = project(&origin, &flare, &edge_start, &edge) else {
            warn!(segment = i, "flare line parallel to hull edge, leaving segment unchanged");
            continue;
        };

        let normal = inward_normal(&edge, &edge_start, &hull_center);
        let inner_start = edge_start + normal * wall_thickness;
        let Some(inner) = project(&origin, &flare, &inner_start, &edge) else {
            warn!(segment = i, "flare line parallel to inner hull edge, leaving segment unchanged");
            continue;
        };

        debug!(
            segment = i,
            prev,
            next,
            x = outer.x,
            y = outer.y,
            "segment moved onto footprint hull"
        );
        let segment = &mut segments[i];
        for p in [&mut segment.middle_outer, &mut segment.bottom_outer] {
            p.x = outer.x;
            p.y = outer.y;
        }
        for p in [&mut segment.middle_inner, &mut segment.bottom_inner] {
            p.x = inner.x;
            p.y = inner.y;
        }
    }
}

/// Point where the line `origin + s*dir` meets the segment `start + u*edge`,
/// with `u` clamped to the segment.
fn project(origin: &Point2, dir: &Vec2, start: &Point2, edge: &Vec2) -> Option<Point2> {
    let (_, u) = line_intersection_2d(origin, dir, start, edge)?;
    Some(start + edge * u.clamp(0.0, 1.0))
}

/// Unit normal of `edge` pointing toward `center`.
fn inward_normal(edge: &Vec2, start: &Point2, center: &Point2) -> Vec2 {
    let len = edge.norm();
    let normal = Vec2::new(-edge.y, edge.x) / len;
    if normal.dot(&(center - start)) < 0.0 {
        -normal
    } else {
        normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use keebgen_math::Point3;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn test_square_with_interior_point() {
        let points = pts(&[(0.0, 0.0), (2.0, 2.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let hull = gift_wrap(&points);
        assert_eq!(hull, vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_collinear_points_skipped() {
        let points = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (1.0, 1.0)]);
        let hull = gift_wrap(&points);
        assert_eq!(hull, vec![0, 2, 3]);
    }

    #[test]
    fn test_leftmost_tie_uses_lowest_y() {
        let points = pts(&[(0.0, 3.0), (0.0, -1.0), (2.0, 1.0)]);
        assert_eq!(gift_wrap(&points)[0], 1);
    }

    #[test]
    fn test_small_inputs() {
        assert!(gift_wrap(&[]).is_empty());
        assert_eq!(gift_wrap(&pts(&[(1.0, 1.0), (2.0, 2.0)])), vec![0, 1]);
        assert_eq!(gift_wrap(&pts(&[(1.0, 1.0); 4])), vec![0]);
    }

    fn segment(shared: (f64, f64), outer: (f64, f64), inner: (f64, f64)) -> SkirtSegment {
        let top = Point3::new(shared.0, shared.1, 5.0);
        SkirtSegment {
            shared: top,
            wall_start: top,
            top_extension: top,
            middle_outer: Point3::new(outer.0, outer.1, 3.0),
            middle_inner: Point3::new(inner.0, inner.1, 3.0),
            bottom_outer: Point3::new(outer.0, outer.1, 0.0),
            bottom_inner: Point3::new(inner.0, inner.1, 0.0),
        }
    }

    #[test]
    fn test_dented_segment_moves_to_hull() {
        let mut segments = vec![
            segment((0.0, 10.0), (0.0, 15.0), (0.0, 13.0)),
            segment((5.0, 10.0), (5.0, 12.0), (5.0, 10.0)),
            segment((10.0, 10.0), (10.0, 15.0), (10.0, 13.0)),
            segment((10.0, 0.0), (10.0, 0.0), (8.0, 2.0)),
            segment((0.0, 0.0), (0.0, 0.0), (2.0, 2.0)),
        ];
        let untouched = segments[0].clone();
        fit_to_hull(&mut segments, 2.0);

        let fixed = &segments[1];
        assert_relative_eq!(fixed.bottom_outer, Point3::new(5.0, 15.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(fixed.middle_outer, Point3::new(5.0, 15.0, 3.0), epsilon = 1e-9);
        assert_relative_eq!(fixed.bottom_inner, Point3::new(5.0, 13.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(fixed.middle_inner, Point3::new(5.0, 13.0, 3.0), epsilon = 1e-9);
        assert_eq!(segments[0], untouched);

        let footprint: Vec<Point2> = segments.iter().map(|s| s.bottom_outer.xy()).collect();
        // the corrected point is collinear with the hull edge
        assert_eq!(gift_wrap(&footprint).len(), 4);
    }

    #[test]
    fn test_parallel_flare_is_skipped() {
        // the dented segment flares sideways, parallel to the hull edge above it
        let mut segments = vec![
            segment((0.0, 10.0), (0.0, 15.0), (0.0, 13.0)),
            segment((5.0, 12.0), (6.0, 12.0), (6.0, 10.0)),
            segment((10.0, 10.0), (10.0, 15.0), (10.0, 13.0)),
            segment((10.0, 0.0), (10.0, 0.0), (8.0, 2.0)),
            segment((0.0, 0.0), (0.0, 0.0), (2.0, 2.0)),
        ];
        let before = segments[1].clone();
        fit_to_hull(&mut segments, 2.0);
        assert_eq!(segments[1], before);
    }

    #[test]
    fn test_convex_loop_unchanged() {
        let mut segments = vec![
            segment((0.0, 10.0), (0.0, 15.0), (0.0, 13.0)),
            segment((10.0, 10.0), (10.0, 15.0), (10.0, 13.0)),
            segment((10.0, 0.0), (10.0, -5.0), (10.0, -3.0)),
        ];
        let before = segments.clone();
        fit_to_hull(&mut segments, 2.0);
        assert_eq!(segments, before);
    }
}
