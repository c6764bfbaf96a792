// src/report.rs
// Batch report writers. The text layout is the one existing result files use:
//
//   Time 0.00 seconds:
//     Joint 1: Angle: 180.00 degrees
//     ...
//
// JSON lines carry the same content as one {time, joint, angle_degrees} record per joint per step.

use crate::angles::normalize;
use crate::error::Result;
use crate::logic::StepRecord;
use serde::Serialize;
use std::io::Write;

/// Output layout for batch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    JsonLines,
}

/// One joint's reported angle at one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngleRecord {
    pub time: f64,
    /// 1-based joint index.
    pub joint: usize,
    pub angle_degrees: f64,
}

/// Flattens a step into per-joint records.
pub fn angle_records(record: &StepRecord) -> impl Iterator<Item = AngleRecord> + '_ {
    record
        .state
        .angles
        .iter()
        .enumerate()
        .map(move |(i, &angle)| AngleRecord {
            time: record.time,
            joint: i + 1,
            angle_degrees: normalize(angle),
        })
}

/// Text block for one step.
pub fn format_step(record: &StepRecord) -> String {
    let mut block = format!("Time {:.2} seconds:\n", record.time);
    for r in angle_records(record) {
        block.push_str(&format!(
            "  Joint {}: Angle: {:.2} degrees\n",
            r.joint, r.angle_degrees
        ));
    }
    block
}

pub fn write_text<W: Write>(out: &mut W, records: &[StepRecord]) -> Result<()> {
    for record in records {
        out.write_all(format_step(record).as_bytes())?;
    }
    Ok(())
}

pub fn write_json_lines<W: Write>(out: &mut W, records: &[StepRecord]) -> Result<()> {
    for record in records {
        for r in angle_records(record) {
            serde_json::to_writer(&mut *out, &r)?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

pub fn write_report<W: Write>(
    out: &mut W,
    records: &[StepRecord],
    format: ReportFormat,
) -> Result<()> {
    match format {
        ReportFormat::Text => write_text(out, records),
        ReportFormat::JsonLines => write_json_lines(out, records),
    }?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KinematicState;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn sample() -> StepRecord {
        StepRecord {
            step: 3,
            time: 0.1,
            state: KinematicState::at_rest([FRAC_PI_2, PI, 0.0, 1.25 * PI]),
        }
    }

    #[test]
    fn text_block_layout() {
        assert_eq!(
            format_step(&sample()),
            "Time 0.10 seconds:\n\
             \x20 Joint 1: Angle: 180.00 degrees\n\
             \x20 Joint 2: Angle: 270.00 degrees\n\
             \x20 Joint 3: Angle: 90.00 degrees\n\
             \x20 Joint 4: Angle: 315.00 degrees\n"
        );
    }

    #[test]
    fn json_lines_has_one_record_per_joint() {
        let mut buf = Vec::new();
        write_report(&mut buf, &[sample(), sample()], ReportFormat::JsonLines).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["joint"], 1);
        assert_eq!(first["time"], 0.1);
        assert!((first["angle_degrees"].as_f64().unwrap() - 180.0).abs() < 1e-9);
    }
}
