use std::io::Write;
use std::path::Path;

use anyhow::{Result, bail};

use crate::dataset::{CohortKey, DatasetTable};
use crate::io::{create_buffered, fmt_value, odor_header};
use crate::response::{Field, ResponseRecord};
use crate::session::{FrameMatrix, SamplePivot, StimulusOrder};

/// One block of field rows per sample, odors as columns.
pub fn write_analysis(path: &Path, records: &[ResponseRecord]) -> Result<()> {
    let mut w = create_buffered(path)?;
    let odors = records.first().map(|r| r.odors()).unwrap_or_default();

    write!(w, "sample\tfield")?;
    for odor in &odors {
        write!(w, "\t{}", odor_header(*odor))?;
    }
    writeln!(w)?;

    for record in records {
        if record.odors() != odors {
            bail!(
                "{} has odors {:?}, expected {:?}",
                record.sample,
                record.odors(),
                odors
            );
        }
        for field in Field::ALL {
            write!(w, "{}\t{}", record.sample, field.label())?;
            for response in &record.responses {
                write!(w, "\t{}", response.get(field))?;
            }
            writeln!(w)?;
        }
    }
    w.flush()?;
    Ok(())
}

pub fn write_avg_means(path: &Path, pivots: &[SamplePivot]) -> Result<()> {
    let header = |odor: &u32| odor_header(*odor);
    write_matrices(path, pivots.iter().map(|p| (p.sample.as_str(), &p.avg)), header)
}

pub fn write_raw_means(path: &Path, pivots: &[SamplePivot]) -> Result<()> {
    let header = |(odor, trial): &(u32, usize)| format!("odor{}_trial{}", odor, trial);
    write_matrices(path, pivots.iter().map(|p| (p.sample.as_str(), &p.raw)), header)
}

fn write_matrices<'a, K: 'a>(
    path: &Path,
    matrices: impl Iterator<Item = (&'a str, &'a FrameMatrix<K>)>,
    header: impl Fn(&K) -> String,
) -> Result<()> {
    let mut w = create_buffered(path)?;
    let mut header_keys: Option<Vec<String>> = None;
    for (sample, m) in matrices {
        let keys: Vec<String> = m.keys.iter().map(&header).collect();
        match &header_keys {
            None => {
                writeln!(w, "sample\tFrame\t{}", keys.join("\t"))?;
                header_keys = Some(keys);
            }
            Some(expected) if *expected != keys => {
                bail!("{} columns differ from the first sample", sample);
            }
            Some(_) => {}
        }
        for (i, frame) in m.frames.iter().enumerate() {
            write!(w, "{}\t{}", sample, frame)?;
            for column in &m.columns {
                write!(w, "\t{}", fmt_value(column[i]))?;
            }
            writeln!(w)?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Odor/trial pairs sorted by odor then trial.
pub fn write_solenoid_info(path: &Path, order: &StimulusOrder) -> Result<()> {
    let mut w = create_buffered(path)?;
    writeln!(w, "Odor\tTrial")?;
    for (odor, trial) in order.by_odor() {
        writeln!(w, "{}\t{}", odor, trial)?;
    }
    w.flush()?;
    Ok(())
}

/// Long-format statistic table: key columns, sample index, one column per odor.
pub fn write_dataset_table(path: &Path, table: &DatasetTable) -> Result<()> {
    let mut w = create_buffered(path)?;
    let sample_header = table
        .sample_type
        .map(|t| t.as_str().to_string())
        .unwrap_or_else(|| "Sample".to_string());

    let mut header: Vec<String> = CohortKey::headers(table.cohort)
        .iter()
        .map(|h| h.to_string())
        .collect();
    header.push(sample_header);
    header.extend(table.odors.iter().map(|o| odor_header(*o)));
    writeln!(w, "{}", header.join("\t"))?;

    for row in &table.rows {
        let mut fields = row.key.values();
        fields.push(row.sample.to_string());
        for odor in &table.odors {
            fields.push(row.values.get(odor).map(|c| c.to_string()).unwrap_or_default());
        }
        writeln!(w, "{}", fields.join("\t"))?;
    }
    w.flush()?;
    Ok(())
}
