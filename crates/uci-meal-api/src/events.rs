//! Themed event rows from the location overview page.

use std::sync::LazyLock;

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use crate::{
    processed::Event,
    time::{format_date, parse_long_date, time_from_str, TimeParseError},
};

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"tr[style="height: 10pt;"]"#).unwrap());

static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").unwrap());

/// The page uses an en dash (U+2013), not `-`.
const RANGE_SEPARATOR: char = '\u{2013}';

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum EventRowError {
    #[error("expected 4 cells, found {0}")]
    MissingCells(usize),
    #[error("no time range in '{0}'")]
    NoTimeRange(String),
    #[error(transparent)]
    Time(#[from] TimeParseError),
}

/// What became of a single table row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Upcoming(Event),
    Past(NaiveDate),
    Skipped(EventRowError),
}

/// cells: date, name, (unused), time range
pub fn event_from_cells(cells: &[String], today: NaiveDate) -> RowOutcome {
    match try_event_from_cells(cells, today) {
        Ok(v) => v,
        Err(err) => RowOutcome::Skipped(err),
    }
}

fn try_event_from_cells(cells: &[String], today: NaiveDate) -> Result<RowOutcome, EventRowError> {
    let [date, name, _, range, ..] = cells else {
        return Err(EventRowError::MissingCells(cells.len()));
    };

    let date = parse_long_date(date)?;
    if date < today {
        return Ok(RowOutcome::Past(date));
    }

    let (start, end) = range.split_once(RANGE_SEPARATOR)
        .ok_or_else(|| EventRowError::NoTimeRange(range.clone()))?;

    Ok(RowOutcome::Upcoming(Event {
        date: format_date(date),
        name: name.clone(),
        service_start: time_from_str(start)?,
        service_end: time_from_str(end)?,
    }))
}

fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL_SELECTOR)
        .map(|td| td.text().collect::<String>().trim().to_owned())
        .collect()
}

/// Events dated `today` or later, in page order. Rows that can't be read
/// are logged and dropped.
pub fn extract_events(html: &str, today: NaiveDate) -> Vec<Event> {
    let document = Html::parse_document(html);

    document.select(&ROW_SELECTOR).filter_map(|row| {
        match event_from_cells(&cell_texts(row), today) {
            RowOutcome::Upcoming(event) => Some(event),
            RowOutcome::Past(date) => {
                tracing::debug!("dropping past event on {date}");
                None
            },
            RowOutcome::Skipped(err) => {
                tracing::warn!("skipping event row: {err}");
                None
            },
        }
    }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
    }

    fn cells(v: [&str; 4]) -> Vec<String> {
        v.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn past_today_and_future_rows() {
        let yesterday = cells(["Thursday, March 7, 2024", "Pi Day", "", "11:00 am – 2:00 pm"]);
        assert_eq!(
            event_from_cells(&yesterday, today()),
            RowOutcome::Past(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()),
        );

        let today_row = cells(["Friday, March 8, 2024", "Taco Night", "", "4:30 pm – 8:00 pm"]);
        assert_eq!(event_from_cells(&today_row, today()), RowOutcome::Upcoming(Event {
            date: "03/08/2024".into(),
            name: "Taco Night".into(),
            service_start: 1630,
            service_end: 2000,
        }));

        let later = cells(["Monday, April 1, 2024", "Brunch Bash", "", "11 am – 12:30 pm"]);
        assert!(matches!(event_from_cells(&later, today()), RowOutcome::Upcoming(e) if e.service_end == 1230));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let bad_date = cells(["Someday", "Mystery", "", "1:00 pm – 2:00 pm"]);
        assert!(matches!(
            event_from_cells(&bad_date, today()),
            RowOutcome::Skipped(EventRowError::Time(TimeParseError::DateShape(_))),
        ));

        let hyphen = cells(["Friday, March 8, 2024", "Hyphen", "", "1:00 pm - 2:00 pm"]);
        assert!(matches!(
            event_from_cells(&hyphen, today()),
            RowOutcome::Skipped(EventRowError::NoTimeRange(_)),
        ));

        let short = vec!["Friday, March 8, 2024".to_string()];
        assert_eq!(
            event_from_cells(&short, today()),
            RowOutcome::Skipped(EventRowError::MissingCells(1)),
        );
    }

    #[test]
    fn page_extraction_keeps_order_and_survives_bad_rows() {
        let html = r#"
            <html><body><table>
              <tr style="height: 10pt;"><td>Date</td><td>Event</td><td>Location</td><td>Time</td></tr>
              <tr style="height: 10pt;">
                <td> Wednesday, March 6, 2024 </td><td>Old</td><td>Anteatery</td><td>5:00 pm – 8:00 pm</td>
              </tr>
              <tr style="height: 10pt;">
                <td>Saturday, March 9, 2024</td><td><span>Lunar</span> Feast</td><td></td><td>5:00 pm – 8:00 pm</td>
              </tr>
              <tr style="height: 10pt;">
                <td>Friday, March 8, 2024</td><td>Today Special</td><td></td><td>11:00 am – 1:00 pm</td>
              </tr>
              <tr><td>Monday, March 11, 2024</td><td>Unstyled</td><td></td><td>1:00 pm – 2:00 pm</td></tr>
            </table></body></html>
        "#;

        let events = extract_events(html, today());
        let names: Vec<_> = events.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["Lunar Feast", "Today Special"]);
        assert_eq!(events[0].date, "03/09/2024");
        assert_eq!((events[1].service_start, events[1].service_end), (1100, 1300));
    }

    #[test]
    fn page_without_rows() {
        assert!(extract_events("<html><body><p>closed</p></body></html>", today()).is_empty());
    }
}
