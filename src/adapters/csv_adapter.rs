//! CSV bar loader.
//!
//! Expected columns, in order: `time,open,high,low,close`. Extra trailing
//! columns (volume, spread) are ignored. Rows are returned oldest first.

use crate::domain::bar::Bar;
use crate::domain::error::EngineError;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;

const TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
];

pub fn load_bars<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>, EngineError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| EngineError::Csv {
        reason: format!("failed to read {}: {}", path.display(), e),
    })?;
    parse_bars(&content)
}

pub fn parse_bars(content: &str) -> Result<Vec<Bar>, EngineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut bars = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let line = row + 2;
        let record = result.map_err(|e| EngineError::Csv {
            reason: format!("CSV parse error: {}", e),
        })?;

        let time_str = record.get(0).ok_or_else(|| EngineError::Csv {
            reason: format!("line {}: missing time column", line),
        })?;
        let time = parse_time(time_str).ok_or_else(|| EngineError::Csv {
            reason: format!("line {}: invalid time '{}'", line, time_str),
        })?;

        let open = price_field(&record, 1, "open", line)?;
        let high = price_field(&record, 2, "high", line)?;
        let low = price_field(&record, 3, "low", line)?;
        let close = price_field(&record, 4, "close", line)?;

        if high < low {
            return Err(EngineError::Csv {
                reason: format!("line {}: high {} is below low {}", line, high, low),
            });
        }

        bars.push(Bar {
            time,
            open,
            high,
            low,
            close,
        });
    }

    bars.sort_by_key(|b| b.time);
    bars.dedup_by_key(|b| b.time);
    Ok(bars)
}

fn parse_time(value: &str) -> Option<NaiveDateTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn price_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: usize,
) -> Result<f64, EngineError> {
    let raw = record.get(index).ok_or_else(|| EngineError::Csv {
        reason: format!("line {}: missing {} column", line, name),
    })?;
    raw.parse().map_err(|e| EngineError::Csv {
        reason: format!("line {}: invalid {} value '{}': {}", line, name, raw, e),
    })
}
