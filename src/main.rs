use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use boundfill::catalog::{LayerCatalog, ProjectFile};
use boundfill::prompt::{PresetPrompt, StdioPrompt};
use boundfill::{
    FeatureSelection, Overwrite, PointStyle, RepairOptions, RowPolicy, clone_source,
    load_boundary, repair_file,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boundfill", version)]
#[command(about = "Fill placeholder WKT geometries with random points inside a boundary polygon")]
struct Cmd {
    /// More log output (repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Seed for reproducible sampling
    #[arg(long, env = "BOUNDFILL_SEED", global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Repair a delimited text file directly
    Repair {
        /// Delimited text file with a WKT column
        #[arg(long)]
        input: PathBuf,
        /// Polygon shapefile used as the boundary
        #[arg(long, env = "BOUNDFILL_BOUNDARY")]
        boundary: PathBuf,
        /// Name of the WKT column
        #[arg(long, env = "BOUNDFILL_COLUMN")]
        column: String,
        /// Repair a copy named <NAME>.<input extension> instead of the input itself
        #[arg(long)]
        name: Option<String>,
        /// Directory for the copy (default: next to the input)
        #[arg(long, requires = "name")]
        dir: Option<PathBuf>,
        /// Replace an existing copy
        #[arg(long, requires = "name")]
        overwrite: bool,
        /// Boundary record to use (0-based)
        #[arg(long, conflicts_with = "all_features")]
        feature: Option<usize>,
        /// Use every polygon record of the boundary
        #[arg(long)]
        all_features: bool,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Run the layer workflow against a project file
    Run {
        #[arg(long, env = "BOUNDFILL_PROJECT")]
        project: PathBuf,
        #[arg(long)]
        boundary_layer: Option<String>,
        #[arg(long)]
        feature_layer: Option<String>,
        /// Name of the new layer (default: modified_<feature layer>)
        #[arg(long)]
        name: Option<String>,
        /// Output directory (default: project home)
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        column: Option<String>,
        /// Overwrite an existing output file without asking
        #[arg(long)]
        yes: bool,
        /// Ask on the terminal instead of using the flags above
        #[arg(long)]
        interactive: bool,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// List the layers of a project file
    Layers {
        #[arg(long, env = "BOUNDFILL_PROJECT")]
        project: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StyleArg {
    Coordinates,
    Tagged,
}

/// Overrides for the repair options; unset flags keep the configured value.
#[derive(Args)]
struct OptionArgs {
    #[arg(long, env = "BOUNDFILL_MAX_TRIALS")]
    max_trials: Option<usize>,
    #[arg(long, env = "BOUNDFILL_PRECISION")]
    precision: Option<usize>,
    #[arg(long, value_enum, env = "BOUNDFILL_POINT_STYLE")]
    point_style: Option<StyleArg>,
    /// Fail on rows too short to hold a WKT value
    #[arg(long)]
    strict: bool,
    #[arg(long, env = "BOUNDFILL_DELIMITER")]
    delimiter: Option<char>,
}

impl OptionArgs {
    fn apply(&self, mut opts: RepairOptions) -> RepairOptions {
        if let Some(n) = self.max_trials {
            opts.max_trials = n;
        }
        if self.precision.is_some() {
            opts.precision = self.precision;
        }
        if let Some(style) = self.point_style {
            opts.point_style = match style {
                StyleArg::Coordinates => PointStyle::Coordinates,
                StyleArg::Tagged => PointStyle::Tagged,
            };
        }
        if self.strict {
            opts.row_policy = RowPolicy::Strict;
        }
        if let Some(d) = self.delimiter {
            opts.delimiter = d;
        }
        opts
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cmd = Cmd::parse();

    let default_level = match cmd.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let mut rng = match cmd.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    match cmd.action {
        Action::Repair {
            input,
            boundary,
            column,
            name,
            dir,
            overwrite,
            feature,
            all_features,
            options,
        } => {
            let opts = options.apply(RepairOptions::default());
            let selection = match (feature, all_features) {
                (_, true) => FeatureSelection::All,
                (Some(i), false) => FeatureSelection::Index(i),
                (None, false) => FeatureSelection::First,
            };
            let boundary = load_boundary(&boundary, selection)
                .with_context(|| format!("loading boundary {}", boundary.display()))?;

            let target = match name {
                Some(name) => {
                    let dir = dir
                        .or_else(|| input.parent().map(Path::to_path_buf))
                        .filter(|d| !d.as_os_str().is_empty())
                        .unwrap_or_else(|| PathBuf::from("."));
                    let policy = if overwrite {
                        Overwrite::Replace
                    } else {
                        Overwrite::Refuse
                    };
                    clone_source(&input, &name, &dir, policy)?
                }
                None => input,
            };
            let report = repair_file(&target, &column, &boundary, &mut rng, &opts)
                .with_context(|| format!("repairing {}", target.display()))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Action::Run {
            project,
            boundary_layer,
            feature_layer,
            name,
            dir,
            column,
            yes,
            interactive,
            options,
        } => {
            let mut catalog = ProjectFile::open(&project)
                .with_context(|| format!("opening project {}", project.display()))?;
            let opts = options.apply(catalog.project().repair.clone());

            let summary = if interactive {
                let mut prompt = StdioPrompt::stdio();
                boundfill::run(&mut catalog, &mut prompt, &mut rng, &opts)?
            } else {
                let mut prompt = PresetPrompt {
                    boundary_layer,
                    feature_layer,
                    layer_name: name,
                    directory: dir,
                    wkt_column: column,
                    overwrite: yes,
                };
                boundfill::run(&mut catalog, &mut prompt, &mut rng, &opts)?
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Action::Layers { project } => {
            let catalog = ProjectFile::open(&project)
                .with_context(|| format!("opening project {}", project.display()))?;
            for layer in catalog.layers() {
                println!("{}\t{:?}\t{}", layer.name, layer.geometry, layer.source);
            }
        }
    }

    Ok(())
}
