use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use structopt::StructOpt;

use gribconv::convert;

/// Convert GRIB edition 2 messages to GRIB edition 1
#[derive(Debug, StructOpt)]
struct Cli {
    /// GRIB2 file to convert
    input: PathBuf,
    /// GRIB1 file to create
    output: PathBuf,
}

fn main() {
    std::env::var("RUST_LOG")
        .map_err(|_| {
            std::env::set_var("RUST_LOG", "warn");
        })
        .unwrap_or_default();
    env_logger::init();

    let args = Cli::from_args();
    match run(&args) {
        Ok(grids) => {
            println!("Number of GRIB1 grids written to output: {}", grids);
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

fn run(args: &Cli) -> gribconv::Result<u64> {
    let input = BufReader::new(File::open(&args.input)?);
    let output = BufWriter::new(File::create(&args.output)?);
    convert::grib2_to_grib1(input, output)
}
