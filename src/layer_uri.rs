use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{Error, Result};

pub const DELIMITED_TEXT_PROVIDER: &str = "delimitedtext";
pub const DEFAULT_CRS: &str = "epsg:4326";

/// Data source URI for loading `path` as a delimited text layer whose
/// geometry comes from the `wkt_field` column.
pub fn delimited_text_uri(
    path: &Path,
    wkt_field: &str,
    delimiter: char,
    crs: &str,
) -> Result<String> {
    let abs = fs::canonicalize(path).or_else(|_| std::path::absolute(path))?;
    let mut url = Url::from_file_path(&abs)
        .map_err(|()| Error::UnsupportedSource(abs.display().to_string()))?;

    url.query_pairs_mut()
        .append_pair("type", "csv")
        .append_pair("delimiter", &delimiter.to_string())
        .append_pair("wktField", wkt_field)
        .append_pair("spatialIndex", "no")
        .append_pair("crs", crs);

    Ok(url.to_string())
}

/// Filesystem path behind a layer source: a `file://` URI (query dropped,
/// escapes decoded) or a plain path, optionally with a `|layername=..` suffix.
pub fn source_path(source: &str) -> Result<PathBuf> {
    match Url::parse(source) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|()| Error::UnsupportedSource(source.to_owned())),
        // single-letter schemes are drive letters
        Ok(url) if url.scheme().len() > 1 => Err(Error::UnsupportedSource(source.to_owned())),
        _ => {
            let plain = source.split('|').next().unwrap_or(source);
            Ok(PathBuf::from(plain))
        }
    }
}
