//! Minimal quote-aware CSV reading for the reference and training tables.
//!
//! Header names are trimmed on read so `" N (kg/ha) "` and `"N (kg/ha)"`
//! address the same column. Blank lines are skipped.

use std::collections::HashMap;

/// Split a CSV line respecting quoted fields (handles commas inside quotes).
/// Returns owned strings because quoted fields need unquoting.
pub fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    // Escaped quote ("")
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// A parsed CSV document: trimmed headers plus data records.
#[derive(Debug, Clone)]
pub struct CsvTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<CsvRecord>,
}

/// One data line, with its 1-based line number in the source.
#[derive(Debug, Clone)]
pub struct CsvRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

impl CsvTable {
    /// Parse CSV text. Returns `None` when there is no header line.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .filter(|(_, l)| !l.trim().is_empty());

        let (_, header_line) = lines.next()?;
        let headers: Vec<String> = csv_split(header_line.trim_start_matches('\u{feff}'))
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        let records = lines
            .map(|(line, l)| CsvRecord {
                line,
                fields: csv_split(l),
            })
            .collect();

        Some(Self {
            headers,
            index,
            records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[CsvRecord] {
        &self.records
    }

    /// Column position for a (trimmed) header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.index.get(name.trim()).copied()
    }

    /// Resolve every name in `names` to a column, or return the first missing one.
    pub fn columns(&self, names: &[&str]) -> Result<Vec<usize>, String> {
        names
            .iter()
            .map(|n| self.column(n).ok_or_else(|| (*n).to_string()))
            .collect()
    }
}

impl CsvRecord {
    /// Field at `col`, trimmed. Missing trailing fields read as empty.
    pub fn get(&self, col: usize) -> &str {
        self.fields.get(col).map_or("", |f| f.trim())
    }

    /// Parse the field at `col` as a finite `f64`.
    pub fn get_f64(&self, col: usize, name: &str) -> Result<f64, String> {
        let raw = self.get(col);
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(format!("column '{name}' is not finite: '{raw}'")),
            Err(_) => Err(format!("column '{name}' is not a number: '{raw}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain() {
        assert_eq!(csv_split("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_quoted_comma_and_escaped_quote() {
        assert_eq!(
            csv_split(r#"Maize,"Apply in 2 splits, at sowing","6"" deep""#),
            vec!["Maize", "Apply in 2 splits, at sowing", "6\" deep"]
        );
    }

    #[test]
    fn test_split_trailing_empty() {
        assert_eq!(csv_split("a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_table_trims_headers_and_skips_blank_lines() {
        let t = CsvTable::parse(" Crop Type , N (kg/ha)\r\n\nMaize,120\r\n\n").unwrap();
        assert_eq!(t.headers(), &["Crop Type".to_string(), "N (kg/ha)".to_string()]);
        assert_eq!(t.column("N (kg/ha)"), Some(1));
        assert_eq!(t.records().len(), 1);
        assert_eq!(t.records()[0].line, 3);
        assert_eq!(t.records()[0].get_f64(1, "N"), Ok(120.0));
    }

    #[test]
    fn test_columns_reports_first_missing() {
        let t = CsvTable::parse("a,b\n1,2\n").unwrap();
        assert_eq!(t.columns(&["a", "c", "d"]), Err("c".to_string()));
    }

    #[test]
    fn test_empty_text_has_no_table() {
        assert!(CsvTable::parse("\n\n").is_none());
    }

    #[test]
    fn test_non_numeric_field() {
        let t = CsvTable::parse("n\nabc\n").unwrap();
        assert!(t.records()[0].get_f64(0, "n").is_err());
    }
}
