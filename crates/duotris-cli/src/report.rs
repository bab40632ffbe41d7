//! JSON in and out of the command line: match configurations in, reports out.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context as _;
use duotris_sim::SimulationConfig;
use serde::Serialize;

/// Loads a match configuration written by `show-config` or by hand.
pub(crate) fn read_config(path: &Path) -> anyhow::Result<SimulationConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open match configuration: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse match configuration: {}", path.display()))
}

/// Writes `report` as pretty JSON to `path`, or to stdout when no path is given.
pub(crate) fn write_report<T>(report: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_json(BufWriter::new(file), report)
                .with_context(|| format!("Failed to write report to {}", path.display()))
        }
        None => write_json(io::stdout().lock(), report).context("Failed to write report"),
    }
}

fn write_json<W, T>(mut writer: W, value: &T) -> io::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()
}
