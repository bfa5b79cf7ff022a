// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use coresync_engine::{CellValue, Table};

use crate::error::TableIoError;

pub fn import(path: &Path) -> Result<Table, TableIoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(path, &content, delimiter)
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, TableIoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(path, &content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // More columns breaks ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252 exports from Excel)
pub fn read_file_as_utf8(path: &Path) -> Result<String, TableIoError> {
    let read_err = |e: std::io::Error| TableIoError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.trim_start_matches('\u{feff}').to_string()),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(path: &Path, content: &str, delimiter: u8) -> Result<Table, TableIoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record.map_err(|e| TableIoError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?,
        None => return Err(TableIoError::MissingHeader(path.to_path_buf())),
    };
    let header: Vec<&str> = header.iter().collect();
    let mut table = Table::new(&header);

    for result in records {
        let record = result.map_err(|e| TableIoError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        table.push_row(record.iter().map(CellValue::from_raw).collect());
    }

    Ok(table)
}

pub fn export(table: &Table, path: &Path) -> Result<(), TableIoError> {
    export_with_delimiter(table, path, b',')
}

pub fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<(), TableIoError> {
    let write_err = |e: csv::Error| match e.into_kind() {
        csv::ErrorKind::Io(source) => TableIoError::Write {
            path: path.to_path_buf(),
            source,
        },
        other => TableIoError::Encode {
            path: path.to_path_buf(),
            message: format!("{:?}", other),
        },
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(write_err)?;

    writer.write_record(table.columns()).map_err(write_err)?;
    for row in table.rows() {
        writer
            .write_record(row.iter().map(|c| c.display()))
            .map_err(write_err)?;
    }

    writer.flush().map_err(|source| TableIoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
