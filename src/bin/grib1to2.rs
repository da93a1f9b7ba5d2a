use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use structopt::StructOpt;

use gribconv::convert;

/// Convert GRIB edition 1 messages to GRIB edition 2
#[derive(Debug, StructOpt)]
struct Cli {
    /// GRIB1 file to convert
    input: PathBuf,
    /// GRIB2 file to create
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
        Ok(messages) => {
            println!("Number of GRIB2 messages written to output: {}", messages);
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
    convert::grib1_to_grib2(input, output)
}
