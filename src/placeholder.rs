//! Textual placeholder substitution inside WKT values.
//!
//! Markers are matched as raw substrings, not parsed as WKT. A genuine
//! geometry whose text contains `(0 0)` is treated as a placeholder too.

use geo::Point;
use rand::Rng;

use crate::boundary::Boundary;
use crate::config::{PointStyle, RepairOptions};
use crate::error::Result;
use crate::generate_point::random_rounded_point_in_boundary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Empty,
    Origin,
}

impl Placeholder {
    pub const ALL: [Placeholder; 2] = [Placeholder::Empty, Placeholder::Origin];

    pub fn marker(self) -> &'static str {
        match self {
            Placeholder::Empty => "(EMPTY)",
            Placeholder::Origin => "(0 0)",
        }
    }
}

pub fn has_placeholder(value: &str) -> bool {
    Placeholder::ALL.iter().any(|p| value.contains(p.marker()))
}

/// Leftmost marker in `text`, with its byte offset.
fn next_marker(text: &str) -> Option<(usize, Placeholder)> {
    Placeholder::ALL
        .iter()
        .filter_map(|&p| text.find(p.marker()).map(|pos| (pos, p)))
        .min_by_key(|&(pos, _)| pos)
}

pub fn format_point(point: &Point<f64>, style: PointStyle, precision: Option<usize>) -> String {
    let coords = match precision {
        Some(p) => format!("{:.p$} {:.p$}", point.x(), point.y()),
        None => format!("{} {}", point.x(), point.y()),
    };
    match style {
        PointStyle::Coordinates => format!("({coords})"),
        PointStyle::Tagged => format!("(POINT ({coords}))"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filled {
    pub text: String,
    /// Number of markers replaced, one sampled point each.
    pub replaced: usize,
    pub rounds: usize,
    /// False when markers were still present after `max_rounds`.
    pub cleared: bool,
}

/// One left-to-right pass: every marker occurrence gets its own fresh point.
fn substitute_round<R: Rng>(
    text: &str,
    boundary: &Boundary,
    rng: &mut R,
    opts: &RepairOptions,
) -> Result<(String, usize)> {
    let mut out = String::with_capacity(text.len() + 32);
    let mut rest = text;
    let mut replaced = 0;

    while let Some((pos, placeholder)) = next_marker(rest) {
        let point =
            random_rounded_point_in_boundary(rng, boundary, opts.max_trials, opts.precision)?;
        out.push_str(&rest[..pos]);
        out.push_str(&format_point(&point, opts.point_style, opts.precision));
        rest = &rest[pos + placeholder.marker().len()..];
        replaced += 1;
    }
    out.push_str(rest);

    Ok((out, replaced))
}

/// Replace placeholder markers with sampled points, re-scanning after each
/// round until no marker remains or `max_rounds` is reached.
pub fn fill_placeholders<R: Rng>(
    value: &str,
    boundary: &Boundary,
    rng: &mut R,
    opts: &RepairOptions,
) -> Result<Filled> {
    let mut text = value.to_owned();
    let mut replaced = 0;
    let mut rounds = 0;

    while has_placeholder(&text) {
        if rounds == opts.max_rounds {
            return Ok(Filled {
                text,
                replaced,
                rounds,
                cleared: false,
            });
        }
        let (next, n) = substitute_round(&text, boundary, rng, opts)?;
        text = next;
        replaced += n;
        rounds += 1;
    }

    Ok(Filled {
        text,
        replaced,
        rounds,
        cleared: true,
    })
}
