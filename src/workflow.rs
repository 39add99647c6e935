//! The interactive routine: pick a boundary and a feature layer, clone the
//! feature layer's file, fill its placeholder geometries and register the
//! result as a new layer.

use std::path::PathBuf;

use rand::Rng;
use serde::Serialize;

use crate::catalog::{GeometryKind, LayerCatalog, LayerInfo, LayerRequest};
use crate::clone_source::{Overwrite, clone_destination, clone_source};
use crate::config::RepairOptions;
use crate::error::{Error, Result};
use crate::layer_uri::{DELIMITED_TEXT_PROVIDER, delimited_text_uri, source_path};
use crate::load_boundary::{FeatureSelection, load_boundary};
use crate::prompt::{Question, UserPrompt};
use crate::repair::{RepairReport, repair_file};
use crate::table::read_header;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub boundary_layer: String,
    pub feature_layer: String,
    pub layer_name: String,
    pub output: PathBuf,
    pub wkt_column: String,
    pub uri: String,
    pub report: RepairReport,
}

fn pick_layer<P: UserPrompt>(
    prompt: &mut P,
    question: Question<'_>,
    layers: Vec<LayerInfo>,
) -> Result<LayerInfo> {
    let names: Vec<String> = layers.iter().map(|l| l.name.clone()).collect();
    prompt
        .choose(question, &names)
        .and_then(|i| layers.into_iter().nth(i))
        .ok_or_else(|| Error::LayerNotSelected(question.text()))
}

pub fn run<C, P, R>(
    catalog: &mut C,
    prompt: &mut P,
    rng: &mut R,
    opts: &RepairOptions,
) -> Result<RunSummary>
where
    C: LayerCatalog,
    P: UserPrompt,
    R: Rng,
{
    let boundary_layer = pick_layer(
        prompt,
        Question::BoundaryLayer,
        catalog.layers_of(GeometryKind::is_areal),
    )?;
    let boundary = load_boundary(source_path(&boundary_layer.source)?, FeatureSelection::First)?;

    let feature_layer = pick_layer(
        prompt,
        Question::FeatureLayer,
        catalog.layers_of(|g| g == GeometryKind::MultiPoint),
    )?;
    let layer_name = prompt
        .text(
            Question::LayerName,
            &format!("modified_{}", feature_layer.name),
        )
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| Error::InputCancelled(Question::LayerName.text()))?;
    let directory = prompt
        .text(Question::Directory, &catalog.home().to_string_lossy())
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| Error::InputCancelled(Question::Directory.text()))?;

    let source = source_path(&feature_layer.source)?;
    let dest = clone_destination(&source, &layer_name, &directory);
    let overwrite = if dest.exists() && prompt.confirm(Question::Overwrite(&dest)) {
        Overwrite::Replace
    } else {
        Overwrite::Refuse
    };
    let output = clone_source(&source, &layer_name, &directory, overwrite)?;

    let delimiter = opts.delimiter_byte()?;
    let header = read_header(&output, delimiter)?;
    let wkt_column = prompt
        .choose(Question::WktColumn, &header)
        .and_then(|i| header.get(i).cloned())
        .ok_or_else(|| Error::InputCancelled(Question::WktColumn.text()))?;

    let report = repair_file(&output, &wkt_column, &boundary, rng, opts)?;

    let uri = delimited_text_uri(&output, &wkt_column, opts.delimiter, &catalog.crs())?;
    catalog.add_layer(LayerRequest {
        name: layer_name.clone(),
        uri: uri.clone(),
        provider: DELIMITED_TEXT_PROVIDER.to_owned(),
        geometry: GeometryKind::MultiPoint,
    })?;

    tracing::info!(
        boundary = %boundary_layer.name,
        feature = %feature_layer.name,
        output = %output.display(),
        "modified feature layer created and loaded"
    );

    Ok(RunSummary {
        boundary_layer: boundary_layer.name,
        feature_layer: feature_layer.name,
        layer_name,
        output,
        wkt_column,
        uri,
        report,
    })
}
