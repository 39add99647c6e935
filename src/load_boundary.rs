use std::path::Path;

use geo::{LineString, MultiPolygon, Polygon};
use shapefile::{PolygonRing, Shape, ShapeReader};

use crate::boundary::Boundary;
use crate::error::{Error, Result};

/// Which polygon record(s) of a boundary layer form the sampling constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeatureSelection {
    #[default]
    First,
    Index(usize),
    All,
}

/// Read every polygon record of a shapefile, one `MultiPolygon` per record.
/// Non-polygon shapes are skipped.
pub fn load_polygon_records<P: AsRef<Path>>(
    shapefile_path: P,
) -> Result<Vec<MultiPolygon<f64>>> {
    let path = shapefile_path.as_ref();
    let mut reader = ShapeReader::from_path(path)?;
    let mut records = Vec::new();

    for shape in reader.iter_shapes() {
        let rings = match shape? {
            Shape::Polygon(p) => rings_xy(p.rings(), |pt| (pt.x, pt.y)),
            Shape::PolygonM(p) => rings_xy(p.rings(), |pt| (pt.x, pt.y)),
            Shape::PolygonZ(p) => rings_xy(p.rings(), |pt| (pt.x, pt.y)),
            other => {
                tracing::debug!(shape = ?other.shapetype(), "skipping non-polygon record");
                continue;
            }
        };
        records.push(assemble(rings));
    }

    tracing::debug!(path = %path.display(), records = records.len(), "read polygon records");
    Ok(records)
}

pub fn load_boundary<P: AsRef<Path>>(
    shapefile_path: P,
    selection: FeatureSelection,
) -> Result<Boundary> {
    let path = shapefile_path.as_ref();
    let mut records = load_polygon_records(path)?;
    let count = records.len();

    let shape = match selection {
        FeatureSelection::First if count > 0 => records.swap_remove(0),
        FeatureSelection::Index(i) if i < count => records.swap_remove(i),
        FeatureSelection::All if count > 0 => {
            MultiPolygon(records.into_iter().flat_map(|mp| mp.0).collect())
        }
        _ => {
            return Err(Error::EmptyBoundary(format!(
                "{} has {count} polygon records, selection {selection:?}",
                path.display()
            )));
        }
    };

    let boundary = Boundary::new(shape)?;
    tracing::info!(
        path = %path.display(),
        parts = boundary.parts(),
        area = boundary.area(),
        acceptance = boundary.acceptance_ratio(),
        "loaded boundary"
    );
    Ok(boundary)
}

/// `(is_outer, coordinates)` per ring.
fn rings_xy<P>(
    rings: &[PolygonRing<P>],
    xy: impl Fn(&P) -> (f64, f64),
) -> Vec<(bool, Vec<(f64, f64)>)> {
    rings
        .iter()
        .map(|ring| {
            let outer = matches!(ring, PolygonRing::Outer(_));
            (outer, ring.points().iter().map(&xy).collect())
        })
        .collect()
}

/// Group rings the shapefile way: an outer ring opens a new part and inner
/// rings become holes of the most recent part.
fn assemble(rings: Vec<(bool, Vec<(f64, f64)>)>) -> MultiPolygon<f64> {
    let mut parts: Vec<(LineString<f64>, Vec<LineString<f64>>)> = Vec::new();

    for (outer, coords) in rings {
        let ring = LineString::from(coords);
        match parts.last_mut() {
            Some((_, holes)) if !outer => holes.push(ring),
            _ => parts.push((ring, Vec::new())),
        }
    }

    MultiPolygon(
        parts
            .into_iter()
            .map(|(exterior, interiors)| Polygon::new(exterior, interiors))
            .collect(),
    )
}
