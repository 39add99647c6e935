use geo::{Area, BoundingRect, Contains, MultiPolygon, Point, Polygon, Rect};

use crate::error::{Error, Result};

/// A polygon constraint for point sampling, with its bounding box computed once.
#[derive(Debug, Clone)]
pub struct Boundary {
    shape: MultiPolygon<f64>,
    bbox: Rect<f64>,
    area: f64,
}

impl Boundary {
    pub fn new(shape: MultiPolygon<f64>) -> Result<Self> {
        if shape.0.is_empty() {
            return Err(Error::EmptyBoundary("no polygon parts".into()));
        }

        let bbox = shape
            .bounding_rect()
            .ok_or_else(|| Error::EmptyBoundary("polygon has no coordinates".into()))?;

        let finite = [bbox.min().x, bbox.min().y, bbox.max().x, bbox.max().y]
            .iter()
            .chain(&[bbox.width(), bbox.height()])
            .all(|v| v.is_finite());
        let area = shape.unsigned_area();

        if !finite || !(area > 0.0) {
            return Err(Error::DegeneratePolygon {
                trials: 0,
                area,
                bbox_area: if finite { bbox.width() * bbox.height() } else { f64::NAN },
            });
        }

        Ok(Self { shape, bbox, area })
    }

    pub fn from_polygon(polygon: Polygon<f64>) -> Result<Self> {
        Self::new(MultiPolygon(vec![polygon]))
    }

    /// Strict interior containment; points on an edge are outside.
    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.shape.contains(point)
    }

    pub fn bbox(&self) -> Rect<f64> {
        self.bbox
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn bbox_area(&self) -> f64 {
        self.bbox.width() * self.bbox.height()
    }

    /// Expected fraction of bounding-box draws that land inside.
    pub fn acceptance_ratio(&self) -> f64 {
        self.area / self.bbox_area()
    }

    pub fn parts(&self) -> usize {
        self.shape.0.len()
    }
}
