// Result export module
// CSV rendering of batch results and human-readable size formatting

use crate::hash::{AlgorithmSet, FileEntry, FileStatus, HashError};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write batch results as CSV to a file
///
/// Columns: path, human-readable size, then one column per algorithm in
/// selection order.
pub fn export_csv(
    output: &Path,
    entries: &[FileEntry],
    algorithms: &AlgorithmSet,
) -> Result<(), HashError> {
    let file = File::create(output).map_err(|e| {
        HashError::from_io_error(e, "creating output", Some(output.to_path_buf()))
    })?;
    let mut writer = BufWriter::new(file);

    write_csv(&mut writer, entries, algorithms).map_err(|e| {
        HashError::from_io_error(e, "writing", Some(output.to_path_buf()))
    })?;

    writer.flush().map_err(|e| {
        HashError::from_io_error(e, "flushing output", Some(output.to_path_buf()))
    })
}

/// Write CSV rows to any writer
pub fn write_csv<W: Write>(
    writer: &mut W,
    entries: &[FileEntry],
    algorithms: &AlgorithmSet,
) -> io::Result<()> {
    // Header row
    let mut header = vec!["File Path".to_string(), "Size".to_string()];
    for id in algorithms.iter() {
        header.push(id.name().to_string());
    }
    writeln!(writer, "{}", join_row(&header))?;

    for entry in entries {
        let mut fields = vec![
            entry.path.display().to_string(),
            format_file_size(entry.size_bytes),
        ];

        match entry.status {
            FileStatus::Done => {
                for id in algorithms.iter() {
                    fields.push(entry.digest(*id).unwrap_or("").to_string());
                }
            }
            FileStatus::Error => {
                // Error message in the first algorithm column, placeholders
                // after it
                let message = entry.error.as_deref().unwrap_or("error");
                fields.push(message.to_string());
                for _ in 1..algorithms.len() {
                    fields.push("---".to_string());
                }
            }
            _ => {
                // Pending / Computing / Cancelled rows have no digests
                for _ in 0..algorithms.len() {
                    fields.push(String::new());
                }
            }
        }

        writeln!(writer, "{}", join_row(&fields))?;
    }

    Ok(())
}

fn join_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| escape_csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote a CSV field when it contains a comma, quote, or line break;
/// internal quotes are doubled
pub fn escape_csv_field(field: &str) -> String {
    if field.is_empty() {
        return String::new();
    }

    if field.contains(',') || field.contains('"') || field.contains('\r') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Format a byte count as a human-readable size
///
/// Binary 1024 base, two decimal places, units B through TB.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let power = ((bytes as f64).log2() / 10.0).floor() as usize;
    let power = power.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(power as i32);

    format!("{:.2} {}", value, UNITS[power])
}
