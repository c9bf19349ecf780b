use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::signal::Sample;

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    t: f64,
    fhr: f64,
    ua: f64,
}

/// Read a recording from a `t,fhr,ua` CSV with a header row.
pub fn read_recording(path: &Path) -> Result<Vec<Sample>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .with_context(|| format!("opening recording {}", path.display()))?;
    let mut samples = Vec::new();
    for (idx, row) in reader.deserialize::<Row>().enumerate() {
        let row = row.with_context(|| format!("parsing recording row {}", idx + 1))?;
        samples.push(Sample::new(row.t, row.fhr, row.ua));
    }
    if samples.is_empty() {
        anyhow::bail!("no samples in {}", path.display());
    }
    Ok(samples)
}

/// Write a recording as a `t,fhr,ua` CSV.
pub fn write_recording(path: &Path, samples: &[Sample]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("creating recording {}", path.display()))?;
    for s in samples {
        writer.serialize(Row {
            t: s.t,
            fhr: s.fhr,
            ua: s.ua,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Join the monitor's paired two-column channel exports into samples.
///
/// Each file is headerless `time,value` rows; non-numeric rows are
/// skipped the way the device writes them. Rows are matched by index and
/// the shorter file bounds the recording; timestamps come from the heart
/// rate channel.
pub fn join_channel_files(bpm_path: &Path, uterus_path: &Path) -> Result<Vec<Sample>> {
    let bpm = read_channel_file(bpm_path)?;
    let uterus = read_channel_file(uterus_path)?;
    let samples: Vec<Sample> = bpm
        .iter()
        .zip(uterus.iter())
        .map(|(&(t, fhr), &(_, ua))| Sample::new(t, fhr, ua))
        .collect();
    if samples.is_empty() {
        anyhow::bail!(
            "no overlapping rows between {} and {}",
            bpm_path.display(),
            uterus_path.display()
        );
    }
    Ok(samples)
}

fn read_channel_file(path: &Path) -> Result<Vec<(f64, f64)>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening channel file {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        if record.len() != 2 {
            continue;
        }
        let (Ok(t), Ok(v)) = (record[0].parse::<f64>(), record[1].parse::<f64>()) else {
            continue;
        };
        rows.push((t, v));
    }
    Ok(rows)
}
