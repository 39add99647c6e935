use std::fs;
use std::path::Path;

use rand::Rng;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::boundary::Boundary;
use crate::config::{RepairOptions, RowPolicy};
use crate::error::{Error, Result};
use crate::placeholder::fill_placeholders;
use crate::table::DelimitedTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub rows: usize,
    pub rows_repaired: usize,
    /// Rows too short to hold a WKT value, passed through untouched.
    pub rows_skipped: usize,
    pub points_sampled: usize,
}

/// Replace placeholder geometries in `column` with points sampled inside
/// `boundary`. Row order, the header and every other field are left as-is.
///
/// Row numbers in errors are 1-based data rows (the header is not counted).
pub fn repair_wkt_column<R: Rng>(
    table: &mut DelimitedTable,
    column: &str,
    boundary: &Boundary,
    rng: &mut R,
    opts: &RepairOptions,
) -> Result<RepairReport> {
    let wkt_idx = table.column_index(column)?;
    let mut report = RepairReport {
        rows: table.rows.len(),
        ..RepairReport::default()
    };

    for (i, row) in table.rows.iter_mut().enumerate() {
        if row.len() <= wkt_idx {
            if opts.row_policy == RowPolicy::Strict {
                return Err(Error::MalformedRow {
                    row: i + 1,
                    fields: row.len(),
                    index: wkt_idx,
                });
            }
            tracing::debug!(row = i + 1, fields = row.len(), "short row passed through");
            report.rows_skipped += 1;
            continue;
        }

        let value = &mut row[wkt_idx];
        let filled = fill_placeholders(value, boundary, rng, opts)?;
        if !filled.cleared {
            return Err(Error::PlaceholderPersisted {
                row: i + 1,
                rounds: filled.rounds,
            });
        }
        if filled.replaced > 0 {
            tracing::trace!(row = i + 1, before = %value, after = %filled.text, "repaired");
            *value = filled.text;
            report.rows_repaired += 1;
            report.points_sampled += filled.replaced;
        }
    }

    Ok(report)
}

/// Repair a delimited text file in place. The file is read completely before
/// anything is written, and the result replaces it only after it has been
/// fully serialized to a sibling temporary file.
pub fn repair_file<P: AsRef<Path>, R: Rng>(
    path: P,
    column: &str,
    boundary: &Boundary,
    rng: &mut R,
    opts: &RepairOptions,
) -> Result<RepairReport> {
    let path = path.as_ref();
    let mut table = DelimitedTable::read(path, opts.delimiter_byte()?)?;
    let report = repair_wkt_column(&mut table, column, boundary, rng, opts)?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    table.write_to(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), fs::metadata(path)?.permissions())?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::info!(
        path = %path.display(),
        column,
        rows = report.rows,
        repaired = report.rows_repaired,
        skipped = report.rows_skipped,
        points = report.points_sampled,
        "repaired wkt column"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn boundary() -> Boundary {
        Boundary::from_polygon(polygon![
            (x: 9.0, y: 9.0),
            (x: 11.0, y: 9.0),
            (x: 11.0, y: 11.0),
            (x: 9.0, y: 11.0),
        ])
        .unwrap()
    }

    fn table(csv: &str) -> DelimitedTable {
        DelimitedTable::from_bytes(csv.as_bytes(), b',').unwrap()
    }

    #[test]
    fn repairs_only_placeholder_rows() {
        let mut t = table("id,wkt\n1,MULTIPOINT (EMPTY)\n2,MULTIPOINT ((10 10))\n");
        let before = t.clone();
        let mut rng = StdRng::seed_from_u64(1);

        let report =
            repair_wkt_column(&mut t, "wkt", &boundary(), &mut rng, &RepairOptions::default())
                .unwrap();

        assert_eq!(report.rows, 2);
        assert_eq!(report.rows_repaired, 1);
        assert_eq!(report.points_sampled, 1);
        assert_eq!(t.header, before.header);
        assert_eq!(t.rows.len(), before.rows.len());
        assert_ne!(t.rows[0][1], "MULTIPOINT (EMPTY)");
        assert_eq!(t.rows[0][0], "1");
        assert_eq!(t.rows[1], before.rows[1]);
    }

    #[test]
    fn short_rows_pass_through_when_lenient() {
        let mut t = table("id,name,wkt\n1\n2,b,MULTIPOINT ((0 0))\n");
        let mut rng = StdRng::seed_from_u64(2);

        let report =
            repair_wkt_column(&mut t, "wkt", &boundary(), &mut rng, &RepairOptions::default())
                .unwrap();

        assert_eq!(report.rows_skipped, 1);
        assert_eq!(report.rows_repaired, 1);
        assert_eq!(t.rows[0], vec!["1"]);
    }

    #[test]
    fn short_rows_fail_when_strict() {
        let mut t = table("id,name,wkt\n1,a,MULTIPOINT ((1 1))\n2,b\n");
        let mut rng = StdRng::seed_from_u64(2);
        let opts = RepairOptions {
            row_policy: RowPolicy::Strict,
            ..RepairOptions::default()
        };

        let err = repair_wkt_column(&mut t, "wkt", &boundary(), &mut rng, &opts).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedRow {
                row: 2,
                fields: 2,
                index: 2
            }
        ));
    }

    #[test]
    fn unknown_column_is_fatal() {
        let mut t = table("id,geometry\n1,MULTIPOINT (EMPTY)\n");
        let mut rng = StdRng::seed_from_u64(0);
        let err = repair_wkt_column(&mut t, "wkt", &boundary(), &mut rng, &RepairOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound { .. }));
        assert_eq!(t.rows[0][1], "MULTIPOINT (EMPTY)");
    }

    #[test]
    fn persisting_placeholder_is_reported() {
        let mut t = table("wkt\nMULTIPOINT (EMPTY)\n");
        let mut rng = StdRng::seed_from_u64(0);
        let opts = RepairOptions {
            max_rounds: 0,
            ..RepairOptions::default()
        };
        let err = repair_wkt_column(&mut t, "wkt", &boundary(), &mut rng, &opts).unwrap_err();
        assert!(matches!(err, Error::PlaceholderPersisted { row: 1, rounds: 0 }));
    }
}
