// Excel import/export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use coresync_engine::{CellValue, Table};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::error::TableIoError;

/// Maximum dimensions read from a sheet
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Import the first worksheet of an Excel file (xlsx, xlsm, xls, xlsb, ods).
///
/// The first row of the used range is the header. Cells keep calamine's
/// typing: numbers stay numbers, strings stay strings.
pub fn import(path: &Path) -> Result<Table, TableIoError> {
    let read_err = |message: String| TableIoError::Read {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| read_err(format!("failed to open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| read_err("workbook contains no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| read_err(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let (height, width) = range.get_size();
    if height > MAX_ROWS || width > MAX_COLS {
        log::warn!(
            "sheet '{}' in {} is {}x{}; reading the first {}x{}",
            sheet_name,
            path.display(),
            height,
            width,
            height.min(MAX_ROWS),
            width.min(MAX_COLS)
        );
    }

    let mut rows = range.rows().take(MAX_ROWS);
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| TableIoError::MissingHeader(path.to_path_buf()))?
        .iter()
        .take(MAX_COLS)
        .map(|c| convert_cell(c).display())
        .collect();

    let mut table = Table::new(&header);
    for row in rows {
        table.push_row(row.iter().take(MAX_COLS).map(convert_cell).collect());
    }

    Ok(table)
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Serial date number, 1900 system
        Data::DateTime(dt) => CellValue::Date(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}

/// Export a table as a single-sheet xlsx with a bold header row.
pub fn export(table: &Table, path: &Path) -> Result<(), TableIoError> {
    let encode_err = |e: XlsxError| match e {
        XlsxError::IoError(source) => TableIoError::Write {
            path: path.to_path_buf(),
            source,
        },
        other => TableIoError::Encode {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let column = |col: usize| {
        u16::try_from(col).map_err(|_| TableIoError::Encode {
            path: path.to_path_buf(),
            message: format!("column {} exceeds the xlsx column limit", col + 1),
        })
    };
    let row_number = |row: usize| {
        u32::try_from(row).map_err(|_| TableIoError::Encode {
            path: path.to_path_buf(),
            message: format!("row {} exceeds the xlsx row limit", row),
        })
    };

    for (col, name) in table.columns().iter().enumerate() {
        worksheet
            .write_string_with_format(0, column(col)?, name, &header_format)
            .map_err(encode_err)?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row32 = row_number(row_idx + 1)?;
        for (col, cell) in row.iter().enumerate() {
            let col16 = column(col)?;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    worksheet.write_string(row32, col16, s).map_err(encode_err)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(row32, col16, *n).map_err(encode_err)?;
                }
                CellValue::Date(serial) => {
                    let format = if serial.fract() == 0.0 {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet
                        .write_number_with_format(row32, col16, *serial, format)
                        .map_err(encode_err)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(row32, col16, *b).map_err(encode_err)?;
                }
            }
        }
    }

    workbook.save(path).map_err(encode_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn export_then_import_keeps_types_and_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ddh.xlsx");

        let table = Table::from_rows(
            &["MasterNo", "Co_No", "Depth", "Logged"],
            vec![
                vec!["M1".into(), "AB12".into(), CellValue::Number(10.5), CellValue::Bool(true)],
                vec!["M2".into(), CellValue::Empty, CellValue::Number(3.0), CellValue::Empty],
            ],
        );
        export(&table, &path).unwrap();

        let loaded = import(&path).unwrap();
        assert_eq!(loaded.columns(), table.columns());
        assert_eq!(loaded.row_count(), 2);
        assert_eq!(loaded.cell(0, 0), &CellValue::text("M1"));
        assert_eq!(loaded.cell(0, 2), &CellValue::Number(10.5));
        assert_eq!(loaded.cell(0, 3), &CellValue::Bool(true));
        assert!(loaded.cell(1, 1).is_missing());
        assert_eq!(loaded.cell(1, 2), &CellValue::Number(3.0));
    }

    #[test]
    fn header_whitespace_is_trimmed_on_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("iet.xlsx");

        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.write_string(0, 0, "  MasterNo ").unwrap();
        ws.write_string(0, 1, "Scan Type\t").unwrap();
        ws.write_string(1, 0, "M1").unwrap();
        workbook.save(&path).unwrap();

        let loaded = import(&path).unwrap();
        assert_eq!(loaded.columns(), &["MasterNo", "Scan Type"]);
        assert_eq!(loaded.row_count(), 1);
    }

    #[test]
    fn date_cells_survive_a_round_trip() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("ddh.xlsx");

        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        let date = Format::new().set_num_format("dd/mm/yyyy");
        ws.write_string(0, 0, "MasterNo").unwrap();
        ws.write_string(0, 1, "Logged").unwrap();
        ws.write_string(1, 0, "M1").unwrap();
        ws.write_number_with_format(1, 1, 45358.0, &date).unwrap();
        workbook.save(&source).unwrap();

        let loaded = import(&source).unwrap();
        assert_eq!(loaded.cell(0, 1), &CellValue::Date(45358.0));

        let written = dir.path().join("ddh_updated.xlsx");
        export(&loaded, &written).unwrap();

        let mut reopened: Sheets<_> = open_workbook_auto(&written).unwrap();
        let range = reopened.worksheet_range("Sheet1").unwrap();
        match range.get((1, 1)) {
            Some(Data::DateTime(dt)) => assert_eq!(dt.as_f64(), 45358.0),
            other => panic!("date written back as {other:?}"),
        }
        assert_eq!(import(&written).unwrap().cell(0, 1), &CellValue::Date(45358.0));
    }

    #[test]
    fn date_times_keep_their_time_of_day() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("times.xlsx");
        let table = Table::from_rows(&["Logged"], vec![vec![CellValue::Date(45358.5)]]);
        export(&table, &path).unwrap();
        assert_eq!(import(&path).unwrap().cell(0, 0), &CellValue::Date(45358.5));
    }

    #[test]
    fn too_many_columns_is_an_encode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wide.xlsx");
        let header: Vec<String> = (0..=usize::from(u16::MAX)).map(|i| format!("c{i}")).collect();
        let table = Table::new(&header);
        assert!(matches!(export(&table, &path), Err(TableIoError::Encode { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn garbage_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(matches!(import(&path), Err(TableIoError::Read { .. })));
    }
}
