//! Planar marker geometry
//!
//! Pure functions over 2D map positions. All inputs are the planar
//! projections carried by [`Snapshot`](crate::types::Snapshot); nothing here
//! touches state.

use glam::Vec2;

/// Radius in map-distance units for a circle dropped at the live position.
pub const POINT_CIRCLE_RADIUS: u32 = 5;

/// Thick-line quadrilateral spanning `p0` to `p1`.
///
/// The rectangle is one unit-normal offset wide on each side of the segment
/// (total width 2), so overlay tools render a visible "thick line" rather
/// than a zero-width segment. Vertex order: `p0+perpA, p0+perpB, p1+perpB,
/// p1+perpA`, where `perpA = (-dir.y, dir.x)` and `perpB` its opposite.
///
/// Returns `None` when the points coincide; normalizing the zero vector is
/// guarded against rather than propagated as a numeric error.
pub fn line_quad(p0: Vec2, p1: Vec2) -> Option<[Vec2; 4]> {
    let mid = (p0 + p1) * 0.5;
    let dir = (p0 - mid).try_normalize()?;
    let perp_a = dir.perp();
    let perp_b = -perp_a;

    Some([p0 + perp_a, p0 + perp_b, p1 + perp_b, p1 + perp_a])
}

/// Radius of the circle whose diameter is the `p0`-`p1` segment.
///
/// Half the point distance, truncated toward zero to match the integer
/// radius the overlay record format carries.
pub fn diameter_radius(p0: Vec2, p1: Vec2) -> u32 {
    let mid = (p0 + p1) * 0.5;
    p0.distance(mid).trunc() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPSILON: f32 = 1e-3;

    #[test]
    fn line_quad_has_documented_vertex_order() {
        // Horizontal segment: dir points from mid toward p0, i.e. (-1, 0).
        let quad = line_quad(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)).unwrap();

        assert_eq!(quad[0], Vec2::new(0.0, -1.0));
        assert_eq!(quad[1], Vec2::new(0.0, 1.0));
        assert_eq!(quad[2], Vec2::new(10.0, 1.0));
        assert_eq!(quad[3], Vec2::new(10.0, -1.0));
    }

    #[test]
    fn coincident_points_are_rejected() {
        assert!(line_quad(Vec2::new(3.0, 4.0), Vec2::new(3.0, 4.0)).is_none());
    }

    #[test]
    fn point_circle_radius_is_fixed() {
        assert_eq!(POINT_CIRCLE_RADIUS, 5);
    }

    #[test]
    fn diameter_radius_truncates_toward_zero() {
        // |p0 - p1| = 7 => radius 3.5 => 3.
        assert_eq!(diameter_radius(Vec2::new(0.0, 0.0), Vec2::new(7.0, 0.0)), 3);
        assert_eq!(diameter_radius(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)), 5);
        assert_eq!(diameter_radius(Vec2::ZERO, Vec2::ZERO), 0);
    }

    fn arb_point() -> impl Strategy<Value = Vec2> {
        (-1.0e3f32..1.0e3, -1.0e3f32..1.0e3).prop_map(|(x, y)| Vec2::new(x, y))
    }

    proptest! {
        #[test]
        fn quad_is_a_rectangle_around_the_segment(
            (p0, p1) in (arb_point(), arb_point())
                .prop_filter("distinct points", |(a, b)| a.distance(*b) > 0.5)
        ) {
            let quad = line_quad(p0, p1).expect("distinct points must produce a quad");
            let length = p0.distance(p1);

            // Short sides have length 2, long sides the full segment length.
            prop_assert!((quad[0].distance(quad[1]) - 2.0).abs() < 1.0e-2);
            prop_assert!((quad[2].distance(quad[3]) - 2.0).abs() < 1.0e-2);
            prop_assert!((quad[1].distance(quad[2]) - length).abs() < 1.0e-2);
            prop_assert!((quad[3].distance(quad[0]) - length).abs() < 1.0e-2);

            // All four vertices are distinct.
            for i in 0..4 {
                for j in (i + 1)..4 {
                    prop_assert!(quad[i].distance(quad[j]) > 0.1);
                }
            }
        }

        #[test]
        fn normals_are_orthogonal_and_antiparallel(
            (p0, p1) in (arb_point(), arb_point())
                .prop_filter("distinct points", |(a, b)| a.distance(*b) > 0.5)
        ) {
            let mid = (p0 + p1) * 0.5;
            let dir = (p0 - mid).try_normalize().expect("distinct points have a direction");
            let perp_a = dir.perp();
            let perp_b = -perp_a;

            prop_assert!((dir.length() - 1.0).abs() < EPSILON);
            prop_assert!(dir.dot(perp_a).abs() < EPSILON);
            prop_assert!(dir.dot(perp_b).abs() < EPSILON);
            prop_assert!((perp_a.dot(perp_b) + 1.0).abs() < EPSILON);
        }

        #[test]
        fn diameter_radius_is_half_the_distance_truncated(
            (p0, p1) in (arb_point(), arb_point())
        ) {
            // The integer radius brackets half the point distance.
            let radius = diameter_radius(p0, p1) as f32;
            let half = p0.distance(p1) / 2.0;
            prop_assert!(radius <= half + 1.0e-3);
            prop_assert!(half < radius + 1.0 + 1.0e-3);
        }
    }
}
