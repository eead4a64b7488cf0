use crate::report::error::ReportError;
use chrono::NaiveDateTime;

const UPDATE_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Report text as delivered by a [`crate::Fetcher`]: an update timestamp line
/// followed by the encoded body.
///
/// # Examples
///
/// ```
/// use metar_weather::RawReport;
///
/// let raw = RawReport::new("2024/03/12 18:51\nKJFK 121851Z 19005KT 10SM FEW250 12/M03 A3012\n").unwrap();
/// assert_eq!(raw.body(), "KJFK 121851Z 19005KT 10SM FEW250 12/M03 A3012");
/// assert!(raw.updated().is_some());
///
/// assert!(RawReport::new("2024/03/12 18:51").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReport {
    lines: Vec<String>,
}

impl RawReport {
    /// # Errors
    ///
    /// Returns [`ReportError::MalformedSource`] when fewer than two non-empty lines remain.
    pub fn new(text: &str) -> Result<Self, ReportError> {
        Self::from_lines(text.lines())
    }

    pub fn from_lines<I, S>(lines: I) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<String> = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.len() < 2 {
            return Err(ReportError::MalformedSource { lines: lines.len() });
        }
        Ok(RawReport { lines })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn update_line(&self) -> &str {
        &self.lines[0]
    }

    /// The update line parsed as UTC, `None` when it is not `YYYY/MM/DD HH:MM`.
    pub fn updated(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.update_line(), UPDATE_FORMAT).ok()
    }

    /// All body lines joined by single spaces.
    pub fn body(&self) -> String {
        self.lines[1..].join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn single_line_is_malformed() {
        assert_eq!(
            RawReport::new("KJFK 121851Z 19005KT").unwrap_err(),
            ReportError::MalformedSource { lines: 1 }
        );
        assert_eq!(
            RawReport::new("\n\n  \n").unwrap_err(),
            ReportError::MalformedSource { lines: 0 }
        );
    }

    #[test]
    fn multi_line_body_is_joined() {
        let raw = RawReport::new("2024/03/12 17:30\nTAF KJFK 121730Z 1218/1324\n     19010KT P6SM\n")
            .unwrap();
        assert_eq!(raw.lines().len(), 3);
        assert_eq!(raw.body(), "TAF KJFK 121730Z 1218/1324 19010KT P6SM");
        let updated = raw.updated().unwrap();
        assert_eq!((updated.day(), updated.hour(), updated.minute()), (12, 17, 30));
    }

    #[test]
    fn unreadable_update_line_is_tolerated() {
        let raw = RawReport::new("yesterday\nKJFK 121851Z").unwrap();
        assert_eq!(raw.updated(), None);
    }
}
