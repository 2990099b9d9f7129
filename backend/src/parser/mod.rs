//! CSV parsing for the opencovid19-fr `chiffres-cles` dataset.
//!
//! Bytes are decoded with encoding auto-detection, the delimiter is sniffed
//! from the header line, then rows are read with the `csv` crate into typed
//! [`RawRecord`]s. Structural errors and missing columns are fatal; a row
//! whose date or counter cell cannot be read is skipped and recorded.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{CsvError, CsvResult};
use crate::models::{RawRecord, RawTable, SkippedRow, REQUIRED_COLUMNS};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is taken as is; chardet is only consulted otherwise.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings and invalid UTF-8 fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let text = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Defaults to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<RawTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    parse_str(&content, delimiter, encoding)
}

/// Parse a decoded CSV body with an explicit delimiter.
pub fn parse_str(content: &str, delimiter: char, encoding: String) -> CsvResult<RawTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let header_record = reader.headers()?.clone();
    let headers: Vec<String> = header_record.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::EmptyFile);
    }

    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        match columns.read(&row) {
            Ok(record) => records.push(record),
            Err(reason) => skipped.push(SkippedRow { line, reason }),
        }
    }

    Ok(RawTable {
        records,
        encoding,
        delimiter,
        headers,
        skipped,
    })
}

/// Positions of the required columns in the header.
struct ColumnIndex {
    date: usize,
    granularite: usize,
    source_type: usize,
    maille_nom: usize,
    cas_confirmes: usize,
    deces: usize,
    reanimation: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> CsvResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CsvError::MissingColumn(name.to_string()))
        };

        // Report the first missing column in schema order.
        for name in REQUIRED_COLUMNS {
            find(name)?;
        }

        Ok(Self {
            date: find("date")?,
            granularite: find("granularite")?,
            source_type: find("source_type")?,
            maille_nom: find("maille_nom")?,
            cas_confirmes: find("cas_confirmes")?,
            deces: find("deces")?,
            reanimation: find("reanimation")?,
        })
    }

    fn read(&self, row: &StringRecord) -> Result<RawRecord, String> {
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let raw_date = cell(self.date);
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
            .map_err(|_| format!("column 'date': invalid date '{}'", raw_date))?;

        let maille_nom = match cell(self.maille_nom) {
            "" => None,
            name => Some(name.to_string()),
        };

        Ok(RawRecord {
            date,
            granularite: cell(self.granularite).to_string(),
            source_type: cell(self.source_type).to_string(),
            maille_nom,
            cas_confirmes: parse_count("cas_confirmes", cell(self.cas_confirmes))?,
            deces: parse_count("deces", cell(self.deces))?,
            reanimation: parse_count("reanimation", cell(self.reanimation))?,
        })
    }
}

/// Parse a non-negative counter cell. Blank means absent.
///
/// Integral floats (`"12.0"`) are accepted since some exports write counters
/// that way.
fn parse_count(column: &str, raw: &str) -> Result<Option<u64>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(Some(n));
    }
    match raw.parse::<f64>() {
        Ok(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(Some(f as u64)),
        _ => Err(format!("column '{}': invalid count '{}'", column, raw)),
    }
}
