use polars::prelude::*;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "preprocessing")]
#[command(about = "Clean a raw CSV for riverflow: fill missing values, keep selected columns.")]
struct Args {
    /// Raw input CSV.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Where to write the cleaned CSV.
    #[arg(long, value_name = "FILE", default_value = "cleaned.csv")]
    output: PathBuf,

    /// Columns to keep, in this order (default: all).
    #[arg(long, value_name = "A,B,...", value_delimiter = ',')]
    columns: Vec<String>,

    /// Placeholder written into missing cells.
    #[arg(long, value_name = "VALUE", default_value = "0")]
    fill: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Read everything as strings so one fill value applies to every column.
    let df = CsvReader::from_path(&args.input)?
        .infer_schema(Some(0))
        .finish()?;

    let df = if args.columns.is_empty() {
        df
    } else {
        df.select(args.columns.iter().map(String::as_str))?
    };

    let mut df = df
        .lazy()
        .with_columns([all().fill_null(lit(args.fill.as_str()))])
        .collect()?;

    // print the first 5 rows
    println!("{:?}", df.head(Some(5)));

    let mut file = File::create(&args.output)?;
    CsvWriter::new(&mut file).finish(&mut df)?;

    Ok(())
}
