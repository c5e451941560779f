//! jsonslice: print the elements of a nested JSON array, one per line.
//!
//! The document is streamed; only the element being printed is held in memory.
//!
//! Usage:
//!   # Elements of {"data": {"results": [...]}} as NDJSON
//!   jsonslice response.json --path data.results
//!
//!   # Count the elements of a top-level array read from stdin
//!   curl -s https://api.example.com/items | jsonslice --count
//!
//!   # Field names containing dots
//!   jsonslice dump.json -f "v1.items" -f entries

use std::fs::File;
use std::io::{stdin, stdout, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use jsonslice::{SliceConfig, SliceIterator};
use simd_json::OwnedValue;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "jsonslice")]
#[command(about = "Stream the elements of a JSON array found at a field path", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Dotted path of field names leading to the array; omit for a top-level array
    #[arg(short, long, default_value = "")]
    path: String,

    /// One path segment; repeat for each level. Overrides --path
    #[arg(short = 'f', long = "field")]
    fields: Vec<String>,

    /// Print only the number of elements
    #[arg(long)]
    count: bool,

    /// Bytes requested from the input per read
    #[arg(long)]
    buffer_size: Option<usize>,

    /// Load decoder settings from a config file
    #[cfg(feature = "configs")]
    #[arg(long)]
    config: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let path = if args.fields.is_empty() {
        split_path(&args.path)
    } else {
        args.fields.clone()
    };

    let reader: Box<dyn Read> = if let Some(file_path) = &args.input {
        Box::new(BufReader::new(File::open(file_path)?))
    } else {
        Box::new(stdin())
    };

    #[cfg(feature = "configs")]
    let mut config = match &args.config {
        Some(file) => jsonslice::configuration::load_config(file)?,
        None => SliceConfig::default(),
    };
    #[cfg(not(feature = "configs"))]
    let mut config = SliceConfig::default();
    if let Some(size) = args.buffer_size {
        config.buffer_size = size;
    }

    let elements = SliceIterator::<_, OwnedValue>::with_config(reader, path.as_slice(), config);
    let mut out = BufWriter::new(stdout().lock());
    let mut count: u64 = 0;
    for element in elements {
        let element = element?;
        count += 1;
        if !args.count {
            writeln!(out, "{}", simd_json::to_string(&element)?)?;
        }
    }
    if args.count {
        writeln!(out, "{}", count)?;
    }
    out.flush()?;

    info!(count, path = %path.join("."), "done");
    Ok(())
}

fn split_path(dotted: &str) -> Vec<String> {
    dotted
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("data.results"), vec!["data", "results"]);
        assert!(split_path("").is_empty());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["jsonslice", "in.json", "-p", "a.b", "--count"]);
        assert_eq!(args.input, Some(PathBuf::from("in.json")));
        assert_eq!(args.path, "a.b");
        assert!(args.count);
    }
}
