//! Cell value formatting
//!
//! Each cell carries a [`CellFormat`]: a [`FormatKind`] plus an optional spec
//! string. The allowed specs per kind form a closed table, checked when the
//! format is built, so an invalid combination never reaches a cell.
//!
//! - `default` passes values through unchanged (spec must be `None`)
//! - `number` applies a printf-style spec such as `%.2f`
//! - `date` parses `YYYY-MM-DD[THH:MM:SS]` or `DD-MM-YYYY[THH:MM:SS]` and
//!   renders with a strftime-style spec such as `%Y-%m-%d`

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use lazy_regex::regex;
use tracing::error;

use crate::error::{Error, Result};

/// The kind of formatting applied to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormatKind {
    /// Pass the value through unchanged
    #[default]
    Default,
    /// printf-style numeric formatting
    Number,
    /// strftime-style date formatting
    Date,
}

impl FormatKind {
    /// Specs accepted for `number` cells
    pub const NUMBER_SPECS: &'static [&'static str] = &["%.0f", "%.2f"];

    /// Specs accepted for `date` cells
    pub const DATE_SPECS: &'static [&'static str] = &["%Y-%m-%d", "%Y-%m-%d %H:%M:%S"];

    /// The name used in the textual API
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Default => "default",
            FormatKind::Number => "number",
            FormatKind::Date => "date",
        }
    }

    /// The closed set of spec strings valid for this kind
    ///
    /// `default` accepts no spec at all.
    pub fn allowed_specs(&self) -> &'static [&'static str] {
        match self {
            FormatKind::Default => &[],
            FormatKind::Number => Self::NUMBER_SPECS,
            FormatKind::Date => Self::DATE_SPECS,
        }
    }

    /// Check whether `spec` is valid for this kind
    pub fn accepts(&self, spec: Option<&str>) -> bool {
        match (self, spec) {
            (FormatKind::Default, None) => true,
            (FormatKind::Default, Some(_)) => false,
            (_, None) => false,
            (kind, Some(spec)) => kind.allowed_specs().contains(&spec),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(FormatKind::Default),
            "number" => Ok(FormatKind::Number),
            "date" => Ok(FormatKind::Date),
            _ => Err(Error::InvalidFormatKind(s.to_string())),
        }
    }
}

/// A validated format: kind plus spec
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellFormat {
    kind: FormatKind,
    spec: Option<String>,
}

impl CellFormat {
    /// Build a format, rejecting specs outside the kind's allowed set
    ///
    /// # Examples
    /// ```
    /// use slate_sheets_core::{CellFormat, FormatKind};
    ///
    /// assert!(CellFormat::new(FormatKind::Number, Some("%.2f")).is_ok());
    /// assert!(CellFormat::new(FormatKind::Number, Some("%.3f")).is_err());
    /// assert!(CellFormat::new(FormatKind::Default, None).is_ok());
    /// ```
    pub fn new(kind: FormatKind, spec: Option<&str>) -> Result<Self> {
        if !kind.accepts(spec) {
            error!(%kind, ?spec, "invalid format spec");
            return Err(Error::InvalidFormat {
                kind,
                spec: spec.map(str::to_string),
            });
        }

        Ok(Self {
            kind,
            spec: spec.map(str::to_string),
        })
    }

    /// Build a format from its textual kind name
    pub fn parse(kind: &str, spec: Option<&str>) -> Result<Self> {
        Self::new(kind.parse()?, spec)
    }

    /// The format kind
    pub fn kind(&self) -> FormatKind {
        self.kind
    }

    /// The format spec, if any
    pub fn spec(&self) -> Option<&str> {
        self.spec.as_deref()
    }

    /// Render a resolved value
    ///
    /// Fails with [`Error::Value`] when the value cannot be read as a number
    /// (`number`) or as one of the recognized date shapes (`date`).
    pub fn apply(&self, value: &str) -> Result<String> {
        match (self.kind, self.spec.as_deref()) {
            (FormatKind::Default, _) => Ok(value.to_string()),
            (FormatKind::Number, Some(spec)) => format_number(spec, value),
            (FormatKind::Date, Some(spec)) => format_date(spec, value),
            (kind, None) => Err(Error::InvalidFormat { kind, spec: None }),
        }
    }
}

/// Apply a printf-style float spec (`%f`, `%.Nf`) to a numeric string
pub fn format_number(spec: &str, value: &str) -> Result<String> {
    let caps = regex!(r"^%(?:\.(?P<precision>[0-9]+))?f$")
        .captures(spec)
        .ok_or_else(|| Error::InvalidFormat {
            kind: FormatKind::Number,
            spec: Some(spec.to_string()),
        })?;

    // printf defaults to six digits
    let precision = match caps.name("precision") {
        Some(p) => p.as_str().parse::<usize>().map_err(|_| Error::InvalidFormat {
            kind: FormatKind::Number,
            spec: Some(spec.to_string()),
        })?,
        None => 6,
    };

    let number: f64 = value.trim().parse().map_err(|_| {
        error!(value, "invalid number for formatting");
        Error::Value(format!("'{}' is not a number", value))
    })?;

    Ok(format!("{:.*}", precision, number))
}

/// Parse a date in one of the recognized shapes and render it with `spec`
///
/// The ISO shape (`YYYY-MM-DD`) is tried before the day-first shape
/// (`DD-MM-YYYY`). Within a shape, a with-time parse is attempted first.
pub fn format_date(spec: &str, value: &str) -> Result<String> {
    let (with_time, date_only) = if regex!(r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}:\d{2})?").is_match(value)
    {
        ("%Y-%m-%dT%H:%M:%S", "%Y-%m-%d")
    } else if regex!(r"^\d{2}-\d{2}-\d{4}(T\d{2}:\d{2}:\d{2})?").is_match(value) {
        ("%d-%m-%YT%H:%M:%S", "%d-%m-%Y")
    } else {
        error!(value, "unrecognized date format");
        return Err(Error::Value(format!("'{}' is not a recognized date", value)));
    };

    let parsed = NaiveDateTime::parse_from_str(value, with_time).or_else(|_| {
        NaiveDate::parse_from_str(value, date_only)
            .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default())
    });

    match parsed {
        Ok(datetime) => Ok(datetime.format(spec).to_string()),
        Err(e) => {
            error!(value, "error parsing date: {e}");
            Err(Error::Value(format!("'{}' is not a valid date", value)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn number(spec: &str) -> CellFormat {
        CellFormat::new(FormatKind::Number, Some(spec)).unwrap()
    }

    fn date(spec: &str) -> CellFormat {
        CellFormat::new(FormatKind::Date, Some(spec)).unwrap()
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("number".parse::<FormatKind>().unwrap(), FormatKind::Number);
        assert_eq!("DATE".parse::<FormatKind>().unwrap(), FormatKind::Date);
        assert_eq!(
            "datetime".parse::<FormatKind>(),
            Err(Error::InvalidFormatKind("datetime".into()))
        );
    }

    #[test]
    fn test_spec_validation() {
        assert!(CellFormat::new(FormatKind::Default, None).is_ok());
        assert!(CellFormat::new(FormatKind::Default, Some("%.2f")).is_err());
        assert!(CellFormat::new(FormatKind::Number, None).is_err());
        assert!(CellFormat::new(FormatKind::Number, Some("%.0f")).is_ok());
        assert!(CellFormat::new(FormatKind::Number, Some("%Y-%m-%d")).is_err());
        assert!(CellFormat::new(FormatKind::Date, Some("%Y-%m-%d %H:%M:%S")).is_ok());
        assert!(CellFormat::new(FormatKind::Date, Some("%d/%m/%Y")).is_err());

        assert_eq!(
            CellFormat::parse("number", Some("%.5f")),
            Err(Error::InvalidFormat {
                kind: FormatKind::Number,
                spec: Some("%.5f".into())
            })
        );
    }

    #[test]
    fn test_default_passthrough() {
        let format = CellFormat::default();
        assert_eq!(format.apply("anything at all").unwrap(), "anything at all");
        assert_eq!(format.apply("").unwrap(), "");
    }

    #[test]
    fn test_number_format() {
        assert_eq!(number("%.2f").apply("3.14159").unwrap(), "3.14");
        assert_eq!(number("%.0f").apply("2.4").unwrap(), "2");
        assert_eq!(number("%.2f").apply("7").unwrap(), "7.00");
        assert_eq!(number("%.2f").apply(" -1.5 ").unwrap(), "-1.50");
    }

    #[test]
    fn test_number_format_rejects_text() {
        assert!(matches!(number("%.2f").apply("abc"), Err(Error::Value(_))));
        assert!(matches!(number("%.2f").apply(""), Err(Error::Value(_))));
    }

    #[test]
    fn test_format_number_plain_f() {
        assert_eq!(format_number("%f", "1").unwrap(), "1.000000");
        assert!(format_number("%d", "1").is_err());
    }

    #[test]
    fn test_date_iso() {
        assert_eq!(date("%Y-%m-%d").apply("2018-01-01").unwrap(), "2018-01-01");
        assert_eq!(
            date("%Y-%m-%d %H:%M:%S").apply("2018-01-01").unwrap(),
            "2018-01-01 00:00:00"
        );
        assert_eq!(
            date("%Y-%m-%d %H:%M:%S")
                .apply("2018-03-04T05:06:07")
                .unwrap(),
            "2018-03-04 05:06:07"
        );
    }

    #[test]
    fn test_date_day_first() {
        assert_eq!(date("%Y-%m-%d").apply("13-01-2018").unwrap(), "2018-01-13");
        assert_eq!(
            date("%Y-%m-%d %H:%M:%S")
                .apply("02-01-2018T10:00:00")
                .unwrap(),
            "2018-01-02 10:00:00"
        );
    }

    #[test]
    fn test_date_ambiguous_shape_is_day_first() {
        // Only the DD-MM-YYYY shape matches, so 01-02 is the first of February
        assert_eq!(date("%Y-%m-%d").apply("01-02-2018").unwrap(), "2018-02-01");
    }

    #[test]
    fn test_date_errors() {
        // Month 13 under the day-first shape
        assert!(matches!(
            date("%Y-%m-%d").apply("01-13-2018"),
            Err(Error::Value(_))
        ));
        assert!(matches!(
            date("%Y-%m-%d").apply("2018-02-30"),
            Err(Error::Value(_))
        ));
        assert!(matches!(
            date("%Y-%m-%d").apply("yesterday"),
            Err(Error::Value(_))
        ));
        assert!(matches!(
            date("%Y-%m-%d").apply("2018/01/01"),
            Err(Error::Value(_))
        ));
    }
}
