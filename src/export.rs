//! CSV report export
//!
//! The report is UTF-8 with a leading byte order mark, then an optional metadata
//! block, a fixed 30-column header and one row per record. Lines are separated by `\n`.

use crate::config::ExportConfig;
use crate::types::{DayReading, SourceKind, WeatherRecord, WindowReadings};
use chrono::NaiveDate;
use std::borrow::Cow;

const BOM: &str = "\u{FEFF}";

/// Column headers, in output order
pub const HEADERS: [&str; 30] = [
    "ZIP Code",
    "City Name",
    "State",
    "This Friday Date",
    "This Fri Temp °F",
    "This Friday Weather Conditions",
    "This Saturday Date",
    "This Sat Temp °F",
    "This Saturday Weather Conditions",
    "This Sunday Date",
    "This Sun Temp °F",
    "This Sunday Weather Conditions",
    "Last Year Friday Date",
    "Last Yr Fri Temp °F",
    "Last Year Friday Weather Conditions",
    "Last Year Saturday Date",
    "Last Yr Sat Temp °F",
    "Last Year Saturday Weather Conditions",
    "Last Year Sunday Date",
    "Last Yr Sun Temp °F",
    "Last Year Sunday Weather Conditions",
    "Next Friday Date",
    "Next Fri Temp °F",
    "Next Friday Weather Conditions",
    "Next Saturday Date",
    "Next Sat Temp °F",
    "Next Saturday Weather Conditions",
    "Next Sunday Date",
    "Next Sun Temp °F",
    "Next Sunday Weather Conditions",
];

/// Report-level facts that are not part of any record
#[derive(Debug, Clone, Copy)]
pub struct ReportMetadata {
    /// Date printed in the "Generated" line and the filename
    pub generated_on: NaiveDate,
    /// Source the records came from
    pub source: SourceKind,
}

/// Serializes weather records into the CSV report format
#[derive(Debug, Clone)]
pub struct CsvExporter {
    include_metadata: bool,
    title: String,
}

impl CsvExporter {
    /// Create an exporter
    pub fn new(include_metadata: bool, title: impl Into<String>) -> Self {
        Self {
            include_metadata,
            title: title.into(),
        }
    }

    /// Render the report; output depends only on the arguments
    pub fn export(&self, records: &[WeatherRecord], metadata: &ReportMetadata) -> Vec<u8> {
        let mut lines: Vec<String> = Vec::with_capacity(records.len() + 6);

        if self.include_metadata {
            lines.push(escape_field(&self.title).into_owned());
            lines.push(format!(
                "Generated: {}",
                metadata.generated_on.format("%-m/%-d/%Y")
            ));
            lines.push(format!("Data Source: {}", metadata.source.report_label()));
            lines.push(format!("Locations: {}", records.len()));
            lines.push(String::new());
        }

        lines.push(join_row(HEADERS.iter().map(|h| Cow::Borrowed(*h))));
        lines.extend(records.iter().map(record_row));

        let mut out = String::from(BOM);
        out.push_str(&lines.join("\n"));
        out.into_bytes()
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for CsvExporter {
    fn from(config: &ExportConfig) -> Self {
        Self::new(config.include_metadata, config.report_title.clone())
    }
}

/// Download filename for a report, e.g. `Weekend-Weather-Report-3-Locations-2026-10-19.csv`
pub fn report_filename(count: usize, generated_on: NaiveDate) -> String {
    format!(
        "Weekend-Weather-Report-{}-Locations-{}.csv",
        count,
        generated_on.format("%Y-%m-%d")
    )
}

/// Quote a field if it contains a comma, a double quote or a line break
///
/// Internal double quotes are doubled. Other fields pass through unchanged.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn join_row<'a>(fields: impl Iterator<Item = Cow<'a, str>>) -> String {
    fields
        .map(|f| escape_field(&f).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

fn record_row(record: &WeatherRecord) -> String {
    let mut fields: Vec<Cow<'_, str>> = vec![
        Cow::Borrowed(record.code.as_str()),
        Cow::Borrowed(record.place.as_str()),
        Cow::Borrowed(record.region.as_str()),
    ];
    for window in [&record.this_weekend, &record.last_year, &record.next_weekend] {
        push_window(&mut fields, window);
    }
    join_row(fields.into_iter())
}

fn push_window<'a>(fields: &mut Vec<Cow<'a, str>>, window: &'a WindowReadings) {
    for day in window.days() {
        push_day(fields, day);
    }
}

fn push_day<'a>(fields: &mut Vec<Cow<'a, str>>, day: &'a DayReading) {
    fields.push(Cow::Owned(day.date.format("%b %-d, %Y").to_string()));
    fields.push(Cow::Owned(format!("{}°F", day.high_f)));
    fields.push(Cow::Borrowed(day.conditions.as_str()));
}
