//! Weekend date arithmetic
//!
//! Every session covers nine dates: Friday through Sunday of the upcoming weekend,
//! the weekend after it, and the same three calendar dates one year earlier.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Friday, Saturday and Sunday of one weekend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WeekendWindow {
    /// Friday
    pub friday: NaiveDate,
    /// Saturday
    pub saturday: NaiveDate,
    /// Sunday
    pub sunday: NaiveDate,
}

impl WeekendWindow {
    fn starting(friday: NaiveDate) -> Self {
        Self {
            friday,
            saturday: friday + Days::new(1),
            sunday: friday + Days::new(2),
        }
    }

    /// The three dates in order
    pub fn days(&self) -> [NaiveDate; 3] {
        [self.friday, self.saturday, self.sunday]
    }

    fn shifted(&self, days: u64) -> Self {
        Self {
            friday: self.friday + Days::new(days),
            saturday: self.saturday + Days::new(days),
            sunday: self.sunday + Days::new(days),
        }
    }

    fn year_earlier(&self) -> Self {
        Self {
            friday: one_year_earlier(self.friday),
            saturday: one_year_earlier(self.saturday),
            sunday: one_year_earlier(self.sunday),
        }
    }
}

/// The three weekends a record compares
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WeekendDates {
    /// This weekend's dates with the year decremented
    pub last_year: WeekendWindow,
    /// The upcoming weekend
    pub this_weekend: WeekendWindow,
    /// Seven days after `this_weekend`
    pub next_weekend: WeekendWindow,
}

impl WeekendDates {
    /// Compute the nine dates for a reference calendar date.
    ///
    /// On a Friday "this weekend" starts the same day; on a Saturday it is the
    /// following Friday, six days out.
    pub fn from_reference(reference: NaiveDate) -> Self {
        let offset = days_until_friday(reference.weekday());
        let this_weekend = WeekendWindow::starting(reference + Days::new(offset));

        Self {
            last_year: this_weekend.year_earlier(),
            this_weekend,
            next_weekend: this_weekend.shifted(7),
        }
    }

    /// Compute the dates for an instant, using its calendar date in its own timezone
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self::from_reference(instant.date_naive())
    }

    /// Dates for the local calendar date right now
    pub fn current() -> Self {
        Self::from_instant(&chrono::Local::now())
    }
}

/// Days from `weekday` to the next Friday (zero on a Friday)
pub fn days_until_friday(weekday: Weekday) -> u64 {
    match weekday {
        Weekday::Sun => 5,
        Weekday::Mon => 4,
        Weekday::Tue => 3,
        Weekday::Wed => 2,
        Weekday::Thu => 1,
        Weekday::Fri => 0,
        Weekday::Sat => 6,
    }
}

// Feb 29 clamps to Feb 28; every other date keeps its month and day.
fn one_year_earlier(date: NaiveDate) -> NaiveDate {
    date.checked_sub_months(Months::new(12)).unwrap_or(date)
}
