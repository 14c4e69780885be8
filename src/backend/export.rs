use crate::backend::model::Voter;
use crate::state::report::gender_label;
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::{Path, PathBuf};

pub const SHEET_NAME: &str = "Votantes";
pub const EMPTY_EXPORT: &str = "No hay datos para exportar";
const NOT_AVAILABLE: &str = "N/A";

/// Column titles and widths, in sheet order.
pub const COLUMNS: [(&str, f64); 14] = [
    ("ID", 8.0),
    ("Nombre", 15.0),
    ("Apellido", 15.0),
    ("Identificación", 15.0),
    ("Género", 12.0),
    ("Teléfono", 15.0),
    ("Email", 25.0),
    ("Departamento", 18.0),
    ("Municipio", 18.0),
    ("Barrio", 15.0),
    ("Lugar de Votación", 20.0),
    ("Casilla", 10.0),
    ("Candidatos", 30.0),
    ("Líderes", 20.0),
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{}", EMPTY_EXPORT)]
    Empty,
    #[error("failed to build workbook: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpreadsheetExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SpreadsheetExport {
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("Informe_Votantes_{}.xlsx", date.format("%Y-%m-%d"))
}

/// Cell text for every column except the numeric ID.
pub fn export_row(voter: &Voter) -> Vec<String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let named = |v: Option<&str>| v.filter(|s| !s.is_empty()).unwrap_or(NOT_AVAILABLE).to_string();

    let candidates = voter
        .candidates
        .iter()
        .map(|c| match &c.corporation {
            Some(corp) => format!("{} ({})", c.name, corp.name),
            None => c.name.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ");
    let leaders = voter.leaders.iter().map(|l| l.name.as_str()).collect::<Vec<_>>().join("; ");

    vec![
        voter.first_name.clone(),
        voter.last_name.clone(),
        voter.identification.clone(),
        gender_label(voter.gender.as_deref()).to_string(),
        text(&voter.phone),
        text(&voter.email),
        named(voter.department.as_ref().map(|d| d.name.as_str())),
        named(voter.municipality.as_ref().map(|m| m.name.as_str())),
        text(&voter.neighborhood),
        text(&voter.voting_location),
        text(&voter.voting_booth),
        named(Some(candidates.as_str())),
        named(Some(leaders.as_str())),
    ]
}

/// Builds the report workbook in memory. An empty row set is refused so no
/// empty file is ever produced.
pub fn export_voters(voters: &[Voter], date: NaiveDate) -> Result<SpreadsheetExport, ExportError> {
    if voters.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut workbook = Workbook::new();
    {
        let header = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;
        for (col, (title, width)) in COLUMNS.iter().enumerate() {
            let col = col as u16;
            worksheet.write_string_with_format(0, col, *title, &header)?;
            worksheet.set_column_width(col, *width)?;
        }
        for (index, voter) in voters.iter().enumerate() {
            let row = index as u32 + 1;
            worksheet.write_number(row, 0, voter.id as f64)?;
            for (offset, cell) in export_row(voter).into_iter().enumerate() {
                worksheet.write_string(row, offset as u16 + 1, cell)?;
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::info!(rows = voters.len(), "Built voter export");
    Ok(SpreadsheetExport { file_name: export_file_name(date), bytes })
}
