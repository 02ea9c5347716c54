//! Winding number calculation for point-in-polygon testing.
//!
//! Uses horizontal ray casting with signed crossing count; backs the
//! nested-contour test that pairs a closed head with its enclosing tail.

use crate::model::Vec2;

/// Compute the winding number of a point relative to a polygon.
///
/// Positive = counter-clockwise winding, negative = clockwise,
/// zero = point is outside.
pub fn winding_number(px: f32, py: f32, polygon: &[Vec2]) -> i32 {
    if polygon.len() < 3 {
        return 0;
    }

    let mut winding = 0i32;
    let n = polygon.len();

    for i in 0..n {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];

        // Check if the edge crosses the horizontal ray from (px, py) going right
        if p1.y <= py {
            if p2.y > py {
                // Upward crossing
                let cross = cross_product(p1.x - px, p1.y - py, p2.x - px, p2.y - py);
                if cross > 0.0 {
                    winding += 1;
                }
            }
        } else if p2.y <= py {
            // Downward crossing
            let cross = cross_product(p1.x - px, p1.y - py, p2.x - px, p2.y - py);
            if cross < 0.0 {
                winding -= 1;
            }
        }
    }

    winding
}

/// Check if a point is inside a polygon using the non-zero winding rule.
#[inline]
pub fn point_in_polygon_nonzero(px: f32, py: f32, polygon: &[Vec2]) -> bool {
    winding_number(px, py, polygon) != 0
}

/// Cross product of 2D vectors (ax, ay) and (bx, by).
#[inline]
fn cross_product(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    ax * by - ay * bx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec2(x: f32, y: f32) -> Vec2 {
        Vec2 { x, y }
    }

    #[test]
    fn test_winding_number_square() {
        // Counter-clockwise square
        let square = vec![
            vec2(0.0, 0.0),
            vec2(10.0, 0.0),
            vec2(10.0, 10.0),
            vec2(0.0, 10.0),
        ];

        assert_eq!(winding_number(5.0, 5.0, &square), 1);

        assert_eq!(winding_number(-5.0, 5.0, &square), 0);
        assert_eq!(winding_number(15.0, 5.0, &square), 0);
        assert_eq!(winding_number(5.0, -5.0, &square), 0);
        assert_eq!(winding_number(5.0, 15.0, &square), 0);
    }

    #[test]
    fn test_winding_number_clockwise() {
        // Clockwise square (negative winding, still "inside")
        let square = vec![
            vec2(0.0, 0.0),
            vec2(0.0, 10.0),
            vec2(10.0, 10.0),
            vec2(10.0, 0.0),
        ];

        assert_eq!(winding_number(5.0, 5.0, &square), -1);
        assert!(point_in_polygon_nonzero(5.0, 5.0, &square));
    }

    #[test]
    fn test_concave_polygon() {
        // L-shaped polygon
        let l_shape = vec![
            vec2(0.0, 0.0),
            vec2(10.0, 0.0),
            vec2(10.0, 5.0),
            vec2(5.0, 5.0),
            vec2(5.0, 10.0),
            vec2(0.0, 10.0),
        ];

        assert_eq!(winding_number(2.0, 2.0, &l_shape), 1);
        assert_eq!(winding_number(2.0, 7.0, &l_shape), 1);

        // Outside the L (in the concave part)
        assert_eq!(winding_number(7.0, 7.0, &l_shape), 0);
    }

    #[test]
    fn test_empty_and_degenerate() {
        assert_eq!(winding_number(0.0, 0.0, &[]), 0);
        assert_eq!(winding_number(0.0, 0.0, &[vec2(0.0, 0.0)]), 0);
        assert_eq!(
            winding_number(0.0, 0.0, &[vec2(0.0, 0.0), vec2(1.0, 1.0)]),
            0
        );
    }
}
