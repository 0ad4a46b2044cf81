// Spreadsheet export and import of the report ledger (XLSX workbooks, CSV)

use crate::domain::{ActivityFields, ActivityReport, FieldError, NewReport};
use crate::errors::{AppError, Result};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Cursor;

/// Worksheet holding the exported reports
pub const SHEET_NAME: &str = "Relatorios";

/// Columns that precede the form fields in an export
const RECORD_COLUMNS: [&str; 4] = ["id", "userId", "submittedBy", "submittedAt"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
// Zip container (xlsx, ods) and OLE compound file (legacy xls)
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

pub type Row = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    #[default]
    Xlsx,
    Csv,
}

impl SheetFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            SheetFormat::Xlsx => "relatorio_atividades.xlsx",
            SheetFormat::Csv => "relatorio_atividades.csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            SheetFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            SheetFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    /// Workbooks are recognised by their container signature; anything else is CSV
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            SheetFormat::Xlsx
        } else {
            SheetFormat::Csv
        }
    }
}

/// Read an uploaded spreadsheet in whichever format it is
pub fn parse_sheet(bytes: &[u8]) -> Result<Vec<Row>> {
    match SheetFormat::detect(bytes) {
        SheetFormat::Xlsx => parse_workbook(bytes),
        SheetFormat::Csv => parse_csv(bytes),
    }
}

/// Read the first worksheet of a workbook. The first row holds the column names.
pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<Row>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Import("a planilha não tem abas".to_string()))??;

    let mut lines = range.rows();
    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header.iter().map(cell_text).collect();

    Ok(lines
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, cell)| (name.clone(), cell_text(cell)))
                .collect::<Row>()
        })
        .filter(|row| row.values().any(|value| !value.is_empty()))
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|at| at.and_utc().to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .unwrap_or_default(),
        other => other.to_string().trim().to_string(),
    }
}

/// Write a single-sheet workbook with every cell as text
pub fn write_workbook<R>(headers: &[&str], rows: R) -> Result<Vec<u8>>
where
    R: IntoIterator<Item = Vec<String>>,
{
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in headers.iter().enumerate() {
        sheet.write_string(0, column(col)?, *name)?;
    }
    for (index, row) in rows.into_iter().enumerate() {
        let line = u32::try_from(index + 1)
            .map_err(|_| AppError::Internal("Too many rows for a worksheet".to_string()))?;
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string(line, column(col)?, value.as_str())?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| AppError::Internal("Too many columns for a worksheet".to_string()))
}

/// Read a CSV document into header-keyed rows.
///
/// Cells are trimmed, a leading byte-order mark is ignored, and short rows
/// simply lack the trailing columns.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<Row>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect(),
        );
    }

    Ok(rows)
}

/// Write a header row followed by the given rows
pub fn write_csv<R>(headers: &[&str], rows: R) -> Result<Vec<u8>>
where
    R: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV: {}", e)))
}

/// Column names of an export, in order
pub fn export_headers() -> Vec<&'static str> {
    RECORD_COLUMNS
        .into_iter()
        .chain(ActivityFields::default().to_form().into_iter().map(|(name, _)| name))
        .collect()
}

/// One row per report, in ledger order
pub fn export_all(reports: &[ActivityReport], format: SheetFormat) -> Result<Vec<u8>> {
    let rows = reports.iter().map(|report| {
        let mut row = vec![
            report.id.clone(),
            report.account_id.clone(),
            report.submitted_by.clone(),
            report
                .submitted_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ];
        row.extend(report.fields.to_form().into_iter().map(|(_, value)| value));
        row
    });

    let headers = export_headers();
    let bytes = match format {
        SheetFormat::Xlsx => write_workbook(&headers, rows)?,
        SheetFormat::Csv => write_csv(&headers, rows)?,
    };

    tracing::info!(count = reports.len(), format = ?format, "Exported activity reports");

    Ok(bytes)
}

/// A spreadsheet row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// Line in the spreadsheet, counting the header as line 1
    pub line: usize,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub records: Vec<NewReport>,
    pub rejected: Vec<RejectedRow>,
}

/// Turn spreadsheet rows into ledger records.
///
/// Values go through the same parsers as the submission form. Missing
/// columns mean blank values. `accountId` is accepted for `userId`, and a
/// missing `submittedAt` becomes `now`. Any `id` column is ignored; the
/// ledger assigns fresh ids.
pub fn import_rows(rows: &[Row], now: DateTime<Utc>) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();

    for (index, row) in rows.iter().enumerate() {
        match import_row(row, now) {
            Ok(record) => outcome.records.push(record),
            Err(errors) => outcome.rejected.push(RejectedRow {
                line: index + 2,
                errors,
            }),
        }
    }

    if !outcome.rejected.is_empty() {
        tracing::warn!(
            rejected = outcome.rejected.len(),
            accepted = outcome.records.len(),
            "Some spreadsheet rows were rejected"
        );
    }

    outcome
}

fn import_row(row: &Row, now: DateTime<Utc>) -> std::result::Result<NewReport, Vec<FieldError>> {
    let cell = |name: &str| row.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    let mut errors = Vec::new();

    let submitted_at = match cell("submittedAt") {
        None => now,
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(at) => at.with_timezone(&Utc),
            Err(_) => {
                errors.push(FieldError::new("submittedAt", "Data de envio inválida."));
                now
            }
        },
    };

    let fields = match ActivityFields::try_from_form(row) {
        Ok(fields) => Some(fields),
        Err(field_errors) => {
            errors.extend(field_errors);
            None
        }
    };

    match fields {
        Some(fields) if errors.is_empty() => Ok(NewReport {
            account_id: cell("userId")
                .or_else(|| cell("accountId"))
                .unwrap_or_default()
                .to_string(),
            submitted_by: cell("submittedBy").unwrap_or_default().to_string(),
            submitted_at,
            fields,
        }),
        _ => Err(errors),
    }
}
