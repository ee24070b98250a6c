//! Persisted datasets: CSV files with an `.xlsx` mirror next to each one.

use crate::dataset::Dataset;
use crate::error::{PipelineError, Result};
use rust_xlsxwriter::{Format, Workbook};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    let dataset = Dataset::from_reader(file)?;
    info!("Loaded {} feedback records from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Loads a previously written output. A missing file means "no prior state";
/// an unreadable one is logged and treated the same way.
pub fn load_prior_output(path: &Path) -> Option<Dataset> {
    if !path.exists() {
        return None;
    }
    match load_dataset(path) {
        Ok(dataset) => Some(dataset),
        Err(e) => {
            warn!("Error reading processed records from {}: {}", path.display(), e);
            None
        }
    }
}

/// Longest string a spreadsheet cell accepts.
const SPREADSHEET_MAX_CELL_CHARS: usize = 32_767;

pub fn spreadsheet_path(csv_path: &Path) -> PathBuf {
    csv_path.with_extension("xlsx")
}

/// Writes the CSV, then its spreadsheet mirror.
pub fn save_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    dataset.write_csv(BufWriter::new(file))?;
    write_spreadsheet(dataset, &spreadsheet_path(path))?;

    info!("Results saved to {}", path.display());
    Ok(())
}

fn write_spreadsheet(dataset: &Dataset, path: &Path) -> Result<()> {
    let (headers, rows) = dataset.to_rows();
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column_index(col)?, header.as_str(), &header_format)?;
    }
    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx + 1)
            .map_err(|_| PipelineError::Schema("Too many rows for a spreadsheet".to_string()))?;
        for (col, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row_num, column_index(col)?, spreadsheet_cell(value, row_num))?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// The CSV keeps the full text; only the spreadsheet copy is cut.
fn spreadsheet_cell(value: &str, row_num: u32) -> &str {
    match value.char_indices().nth(SPREADSHEET_MAX_CELL_CHARS) {
        Some((end, _)) => {
            warn!(
                "Row {}: cell truncated to {} characters in spreadsheet mirror",
                row_num, SPREADSHEET_MAX_CELL_CHARS
            );
            &value[..end]
        }
        None => value,
    }
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| PipelineError::Schema("Too many columns for a spreadsheet".to_string()))
}
