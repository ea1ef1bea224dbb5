//! Reference dosage table: per-hectare nutrient rates per (crop, fertilizer).
//!
//! Loaded once at startup and never written. Every row is parsed into a
//! typed [`DoseTableRow`]; a row that cannot be parsed fails the whole load
//! with [`ReferenceError::MalformedRow`] naming the line.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::csv::CsvTable;
use crate::types::DoseTableRow;

pub const COL_CROP: &str = "Crop Type";
pub const COL_NAME: &str = "Fertilizer Name";
pub const COL_TYPE: &str = "Fertilizer Type";
pub const COL_N: &str = "N (kg/ha)";
pub const COL_P: &str = "P (kg/ha)";
pub const COL_K: &str = "K (kg/ha)";
pub const COL_NOTES: &str = "Notes";

const REQUIRED_COLUMNS: [&str; 7] = [
    COL_CROP, COL_NAME, COL_TYPE, COL_N, COL_P, COL_K, COL_NOTES,
];

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("Failed to read reference table {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Reference table has no header line")]
    MissingHeader,

    #[error("Reference table is missing column '{0}'")]
    MissingColumn(String),

    #[error("Malformed reference row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
}

/// The loaded dosage table, in file order.
#[derive(Debug, Clone, Default)]
pub struct DoseTable {
    rows: Vec<DoseTableRow>,
}

impl DoseTable {
    /// Load and parse a dosage table CSV file.
    pub fn load(path: &Path) -> Result<Self, ReferenceError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ReferenceError::Io(path.to_path_buf(), e))?;
        let table = Self::from_csv_str(&text)?;
        info!(
            path = %path.display(),
            rows = table.len(),
            crops = table.known_crops().len(),
            "Loaded fertilizer dosage table"
        );
        Ok(table)
    }

    /// Parse dosage table CSV text.
    pub fn from_csv_str(text: &str) -> Result<Self, ReferenceError> {
        let csv = CsvTable::parse(text).ok_or(ReferenceError::MissingHeader)?;
        let cols = csv
            .columns(&REQUIRED_COLUMNS)
            .map_err(ReferenceError::MissingColumn)?;
        let [crop, name, kind, n, p, k, notes] = [
            cols[0], cols[1], cols[2], cols[3], cols[4], cols[5], cols[6],
        ];
        let required_max = [crop, name, kind, n, p, k].into_iter().max().unwrap_or(0);

        let rows = csv
            .records()
            .iter()
            .map(|rec| {
                let malformed = |reason: String| ReferenceError::MalformedRow {
                    line: rec.line,
                    reason,
                };
                // Notes may be omitted; every other column must be present.
                if rec.fields.len() <= required_max {
                    return Err(malformed(format!(
                        "expected {} fields, got {}",
                        csv.headers().len(),
                        rec.fields.len()
                    )));
                }
                let crop_type = rec.get(crop).to_string();
                if crop_type.is_empty() {
                    return Err(malformed(format!("column '{COL_CROP}' is empty")));
                }
                let fertilizer_name = rec.get(name).to_string();
                if fertilizer_name.is_empty() {
                    return Err(malformed(format!("column '{COL_NAME}' is empty")));
                }
                Ok(DoseTableRow {
                    crop_type,
                    fertilizer_name,
                    fertilizer_type: rec.get(kind).to_string(),
                    n_per_ha: rec.get_f64(n, COL_N).map_err(malformed)?,
                    p_per_ha: rec.get_f64(p, COL_P).map_err(malformed)?,
                    k_per_ha: rec.get_f64(k, COL_K).map_err(malformed)?,
                    notes: rec.get(notes).to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(rows = rows.len(), "Parsed dosage table");
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[DoseTableRow] {
        &self.rows
    }

    /// All rows for `crop` (case and whitespace-insensitive), in table order.
    pub fn rows_for_crop(&self, crop: &str) -> Vec<&DoseTableRow> {
        self.rows.iter().filter(|r| r.matches_crop(crop)).collect()
    }

    /// Distinct crop type values, in order of first appearance.
    pub fn known_crops(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            if !seen.iter().any(|c| c == &row.crop_type) {
                seen.push(row.crop_type.clone());
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Crop Type,Fertilizer Name,Fertilizer Type,N (kg/ha),P (kg/ha),K (kg/ha),Notes
Maize,Urea,Chemical,120,0,0,Split in two doses
Maize,Vermicompost,Organic,50,25,25,\"Apply before sowing, mix well\"
Rice,DAP,Chemical,18,46,0,Basal
 maize ,Farmyard Manure,organic,30,15,15,
";

    #[test]
    fn test_parses_rows_in_order() {
        let t = DoseTable::from_csv_str(TABLE).unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.rows()[1].notes, "Apply before sowing, mix well");
        assert_eq!(t.rows()[3].notes, "");
    }

    #[test]
    fn test_rows_for_crop_is_case_and_whitespace_insensitive() {
        let t = DoseTable::from_csv_str(TABLE).unwrap();
        let names: Vec<_> = t
            .rows_for_crop("  MAIZE")
            .iter()
            .map(|r| r.fertilizer_name.as_str())
            .collect();
        assert_eq!(names, vec!["Urea", "Vermicompost", "Farmyard Manure"]);
        assert!(t.rows_for_crop("wheat").is_empty());
    }

    #[test]
    fn test_known_crops_are_distinct_raw_values() {
        let t = DoseTable::from_csv_str(TABLE).unwrap();
        assert_eq!(t.known_crops(), vec!["Maize", "Rice", "maize"]);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let err = DoseTable::from_csv_str("Crop Type,Fertilizer Name\nMaize,Urea\n").unwrap_err();
        assert!(matches!(err, ReferenceError::MissingColumn(c) if c == "Fertilizer Type"));
    }

    #[test]
    fn test_non_numeric_dose_is_malformed_row() {
        let text = "\
Crop Type,Fertilizer Name,Fertilizer Type,N (kg/ha),P (kg/ha),K (kg/ha),Notes
Maize,Urea,Chemical,lots,0,0,
";
        match DoseTable::from_csv_str(text).unwrap_err() {
            ReferenceError::MalformedRow { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("N (kg/ha)"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_is_malformed() {
        let text = "\
Crop Type,Fertilizer Name,Fertilizer Type,N (kg/ha),P (kg/ha),K (kg/ha),Notes
Maize,Urea
";
        assert!(matches!(
            DoseTable::from_csv_str(text),
            Err(ReferenceError::MalformedRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let t = DoseTable::from_csv_str(
            "Crop Type,Fertilizer Name,Fertilizer Type,N (kg/ha),P (kg/ha),K (kg/ha),Notes\n",
        )
        .unwrap();
        assert!(t.is_empty());
        assert!(t.known_crops().is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = DoseTable::load(Path::new("/nonexistent/dose.csv")).unwrap_err();
        assert!(matches!(err, ReferenceError::Io(..)));
    }
}
