//! Parsing of the wide call table.
//!
//! Layout: a header row `city,type,<date>,<date>,...` followed by one row
//! per `(city, type)` pair. Date columns must be in chronological order.

use chrono::NaiveDate;
use helpline_dataset_models::{Dataset, DateAxis, Row};

use crate::LoadError;

/// Number of leading key columns before the date columns.
const KEY_COLUMNS: usize = 2;

/// Parses a date column header. Accepts `YYYY-MM-DD` and `MM/DD/YYYY`.
#[must_use]
pub fn parse_date_header(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
}

/// Parses one count cell. Empty cells are zero; whole-number floats such as
/// `"3.0"` are accepted.
fn parse_count(cell: &str, line: u64, column: &str) -> Result<u64, LoadError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(0);
    }
    if let Ok(v) = cell.parse::<u64>() {
        return Ok(v);
    }

    match cell.parse::<f64>() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(v as u64),
        _ => Err(LoadError::Format {
            message: format!("Invalid count '{cell}' on line {line}, column {column}"),
        }),
    }
}

/// Parses the call table from any reader.
///
/// # Errors
///
/// Returns [`LoadError`] if the CSV is malformed, the header is not
/// `city,type,<dates>`, a date header or count cell does not parse, or the
/// resulting table fails [`Dataset`] validation.
pub fn parse_table<R: std::io::Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new().from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.len() < KEY_COLUMNS
        || !headers[0].eq_ignore_ascii_case("city")
        || !headers[1].eq_ignore_ascii_case("type")
    {
        return Err(LoadError::Format {
            message: format!(
                "Expected header to start with 'city,type', found '{}'",
                headers.join(",")
            ),
        });
    }

    let dates = headers[KEY_COLUMNS..]
        .iter()
        .map(|h| {
            parse_date_header(h).ok_or_else(|| LoadError::Format {
                message: format!("Invalid date column '{h}'"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let axis = DateAxis::new(dates)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);

        let city = record.get(0).unwrap_or("").trim().to_owned();
        let category = record.get(1).unwrap_or("").trim().to_owned();
        if city.is_empty() || category.is_empty() {
            log::warn!("Skipping line {line}: missing city or type");
            continue;
        }

        let values = record
            .iter()
            .skip(KEY_COLUMNS)
            .zip(&headers[KEY_COLUMNS..])
            .map(|(cell, column)| parse_count(cell, line, column))
            .collect::<Result<Vec<_>, _>>()?;

        rows.push(Row {
            city,
            category,
            values,
        });
    }

    log::debug!(
        "Parsed call table: {} rows x {} dates",
        rows.len(),
        axis.len()
    );

    Ok(Dataset::new(axis, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wide_table() {
        let csv = "city,type,2020-03-01,2020-03-02,2020-03-03\n\
                   Providence,Housing,5,,7\n\
                   Warwick,Housing,1,2,3.0\n";
        let dataset = parse_table(csv.as_bytes()).unwrap();

        assert_eq!(dataset.axis().len(), 3);
        assert_eq!(
            dataset.row("Providence", "Housing").unwrap().values,
            vec![5, 0, 7]
        );
        assert_eq!(dataset.row("Warwick", "Housing").unwrap().values, vec![1, 2, 3]);
    }

    #[test]
    fn accepts_us_style_date_headers() {
        assert_eq!(
            parse_date_header("03/15/2020"),
            NaiveDate::from_ymd_opt(2020, 3, 15)
        );
        assert!(parse_date_header("March 15").is_none());
    }

    #[test]
    fn rejects_bad_header() {
        let err = parse_table("town,kind,2020-03-01\nA,B,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Format { .. }), "{err}");
    }

    #[test]
    fn rejects_unordered_dates() {
        let err =
            parse_table("city,type,2020-03-02,2020-03-01\nA,B,1,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Dataset(_)), "{err}");
    }

    #[test]
    fn rejects_non_numeric_count() {
        let err = parse_table("city,type,2020-03-01\nA,B,lots\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("lots"), "{err}");
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = parse_table("city,type,2020-03-01,2020-03-02\nA,B,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)), "{err}");
    }
}
