use geo::{Point, Rect};
use rand::Rng;

use crate::boundary::Boundary;
use crate::error::{Error, Result};

pub const DEFAULT_MAX_TRIALS: usize = 1_000_000;

pub fn random_point_in_rect<R: Rng>(rng: &mut R, rect: &Rect<f64>) -> Point<f64> {
    let x = rng.random_range(rect.min().x..=rect.max().x);
    let y = rng.random_range(rect.min().y..=rect.max().y);
    Point::new(x, y)
}

/// Rejection-sample a point strictly inside `boundary`, drawing uniformly from
/// its bounding box. Gives up after `max_trials` misses.
pub fn random_point_in_boundary<R: Rng>(
    rng: &mut R,
    boundary: &Boundary,
    max_trials: usize,
) -> Result<Point<f64>> {
    random_rounded_point_in_boundary(rng, boundary, max_trials, None)
}

/// Like [`random_point_in_boundary`], but each candidate is rounded to
/// `precision` decimals before the containment check, so the point that is
/// returned is exactly the one that gets written.
pub fn random_rounded_point_in_boundary<R: Rng>(
    rng: &mut R,
    boundary: &Boundary,
    max_trials: usize,
    precision: Option<usize>,
) -> Result<Point<f64>> {
    let bbox = boundary.bbox();
    for _ in 0..max_trials {
        let candidate = round_point(random_point_in_rect(rng, &bbox), precision);
        if boundary.contains(&candidate) {
            return Ok(candidate);
        }
    }

    tracing::warn!(
        max_trials,
        ?precision,
        area = boundary.area(),
        bbox_area = boundary.bbox_area(),
        "rejection sampling exhausted"
    );
    Err(Error::DegeneratePolygon {
        trials: max_trials,
        area: boundary.area(),
        bbox_area: boundary.bbox_area(),
    })
}

/// Round both coordinates through their `{:.p$}` text form, the same text
/// `format_point` produces.
pub fn round_point(point: Point<f64>, precision: Option<usize>) -> Point<f64> {
    let Some(p) = precision else {
        return point;
    };
    let round = |v: f64| format!("{v:.p$}").parse::<f64>().unwrap_or(v);
    Point::new(round(point.x()), round(point.y()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, MultiPolygon, Polygon, polygon};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn unit_square() -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ]
    }

    /// Concave "C" shape with a hole in its spine plus a detached island.
    fn awkward_boundary() -> Boundary {
        let c_shape = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 0.0),
                (10.0, 2.0),
                (3.0, 2.0),
                (3.0, 8.0),
                (10.0, 8.0),
                (10.0, 10.0),
                (0.0, 10.0),
            ]),
            vec![LineString::from(vec![
                (1.0, 4.0),
                (2.0, 4.0),
                (2.0, 6.0),
                (1.0, 6.0),
            ])],
        );
        let island = polygon![
            (x: 20.0, y: 20.0),
            (x: 21.0, y: 20.0),
            (x: 21.0, y: 21.0),
            (x: 20.0, y: 21.0),
        ];
        Boundary::new(MultiPolygon(vec![c_shape, island])).unwrap()
    }

    #[test]
    fn rect_draws_stay_in_rect() {
        let mut rng = StdRng::seed_from_u64(7);
        let rect = Rect::new((-3.0, 10.0), (5.0, 12.0));
        for _ in 0..1000 {
            let p = random_point_in_rect(&mut rng, &rect);
            assert!((-3.0..=5.0).contains(&p.x()));
            assert!((10.0..=12.0).contains(&p.y()));
        }
    }

    #[test]
    fn ten_thousand_samples_in_concave_polygon_with_hole() {
        let boundary = awkward_boundary();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10_000 {
            let p = random_point_in_boundary(&mut rng, &boundary, DEFAULT_MAX_TRIALS).unwrap();
            assert!(boundary.contains(&p), "{p:?} escaped the boundary");
            assert!(!(p.x() > 1.0 && p.x() < 2.0 && p.y() > 4.0 && p.y() < 6.0));
        }
    }

    #[test]
    fn ten_thousand_samples_in_convex_polygon() {
        let boundary = Boundary::from_polygon(unit_square()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10_000 {
            let p = random_point_in_boundary(&mut rng, &boundary, DEFAULT_MAX_TRIALS).unwrap();
            assert!(boundary.contains(&p));
        }
    }

    #[test]
    fn trial_cap_reports_degenerate_polygon() {
        // a sliver whose area is tiny compared with its bbox
        let sliver = polygon![
            (x: 0.0, y: 0.0),
            (x: 1000.0, y: 1000.0),
            (x: 1000.0, y: 1000.000001),
        ];
        let boundary = Boundary::from_polygon(sliver).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let err = random_point_in_boundary(&mut rng, &boundary, 10).unwrap_err();
        assert!(matches!(err, Error::DegeneratePolygon { trials: 10, .. }));
    }

    #[test]
    fn zero_trials_never_samples() {
        let boundary = Boundary::from_polygon(unit_square()).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(random_point_in_boundary(&mut rng, &boundary, 0).is_err());
    }

    #[test]
    fn rounded_points_stay_inside() {
        let square = polygon![
            (x: 9.0, y: 9.0),
            (x: 11.0, y: 9.0),
            (x: 11.0, y: 11.0),
            (x: 9.0, y: 11.0),
        ];
        let boundary = Boundary::from_polygon(square).unwrap();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = random_rounded_point_in_boundary(&mut rng, &boundary, DEFAULT_MAX_TRIALS, Some(0))
                .unwrap();
            assert_eq!(p, Point::new(10.0, 10.0));
        }
    }

    #[test]
    fn too_coarse_precision_exhausts_trials() {
        let boundary = Boundary::from_polygon(polygon![
            (x: 0.2, y: 0.2),
            (x: 0.4, y: 0.2),
            (x: 0.4, y: 0.4),
            (x: 0.2, y: 0.4),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let err = random_rounded_point_in_boundary(&mut rng, &boundary, 500, Some(0)).unwrap_err();
        assert!(matches!(err, Error::DegeneratePolygon { trials: 500, .. }));
    }

    #[test]
    fn rounding_matches_written_text() {
        let p = round_point(Point::new(1.23456, -0.98765), Some(2));
        assert_eq!(p, Point::new(1.23, -0.99));
        assert_eq!(round_point(p, None), p);
    }

    proptest! {
        #[test]
        fn samples_inside_arbitrary_triangles(
            seed in any::<u64>(),
            ax in -100.0f64..100.0, ay in -100.0f64..100.0,
            bx in -100.0f64..100.0, by in -100.0f64..100.0,
            cx in -100.0f64..100.0, cy in -100.0f64..100.0,
        ) {
            let doubled_area = ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay)).abs();
            prop_assume!(doubled_area > 100.0);

            let triangle = polygon![(x: ax, y: ay), (x: bx, y: by), (x: cx, y: cy)];
            let boundary = Boundary::from_polygon(triangle).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..50 {
                let p = random_point_in_boundary(&mut rng, &boundary, DEFAULT_MAX_TRIALS).unwrap();
                prop_assert!(boundary.contains(&p));
            }
        }
    }
}
