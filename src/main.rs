mod dataset;
mod error;
mod node_generation;
mod render;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};

use crate::dataset::Dataset;
use crate::error::VisualizerError;
use crate::node_generation::RiverFlow;

const OUTPUT_PATH: &str = "visualization.png";

#[derive(Parser)]
#[command(name = "riverflow")]
#[command(about = "Visualize the hierarchical structure of tabular data as a river flow.", long_about = None)]
struct Args {
    /// Path to the input data CSV (header row required).
    #[arg(long = "data_path", value_name = "FILE")]
    data_path: PathBuf,

    /// Distinct value limit for each branching column.
    #[arg(long = "distinct_value_limit", value_name = "N", default_value_t = 15)]
    distinct_value_limit: usize,

    /// Default color for nodes.
    #[arg(long = "default_color", value_name = "COLOR", default_value = "lightblue")]
    default_color: String,

    /// Save the analysis to visualization.png instead of writing SVG to stdout.
    #[arg(long = "save_analysis")]
    save_analysis: bool,

    /// Restrict the analysis to these columns, in this order.
    #[arg(long = "features_to_track", value_name = "A,B,...", value_delimiter = ',')]
    features_to_track: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    if let Err(err) = run(&args) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), VisualizerError> {
    info!("Loading {}...", args.data_path.display());
    let mut data = Dataset::from_csv_path(&args.data_path)?;
    if !args.features_to_track.is_empty() {
        data = data.select(&args.features_to_track)?;
    }
    debug!("{} columns, {} rows", data.column_count(), data.row_count());

    let flow = RiverFlow::new(args.distinct_value_limit);
    let (nodes, edges) = flow.generate(&data)?;
    info!("Generated {} nodes and {} edges", nodes.len(), edges.len());

    let graph = render::assemble(&nodes, &edges);

    if args.save_analysis {
        let png = render::render_png(&graph, &args.default_color)?;
        fs::write(OUTPUT_PATH, png).map_err(|source| VisualizerError::OutputWrite {
            path: PathBuf::from(OUTPUT_PATH),
            source,
        })?;
        info!("Saved {}", OUTPUT_PATH);
    } else {
        let svg = render::render_svg(&graph, &args.default_color);
        io::stdout()
            .write_all(svg.as_bytes())
            .map_err(|source| VisualizerError::OutputWrite {
                path: PathBuf::from("stdout"),
                source,
            })?;
    }

    Ok(())
}
