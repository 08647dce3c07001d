use chrono::{DateTime, Datelike as _, Days, FixedOffset, NaiveDate, Utc};

/// Business calendar for the shop floor.
///
/// All "today" decisions (entry/exit lookups, dashboard windows, stats
/// periods) use a fixed UTC-6 civil clock, independent of wherever the
/// server happens to run.
#[derive(Clone)]
pub struct WorkClock {
    offset: FixedOffset,
    frozen: Option<DateTime<Utc>>,
}

impl WorkClock {
    pub fn honduras() -> Self {
        Self {
            offset: FixedOffset::west_opt(6 * 3600).expect("static offset"),
            frozen: None,
        }
    }

    /// Current instant expressed in business-local time.
    pub fn now_local(&self) -> DateTime<FixedOffset> {
        self.frozen.unwrap_or_else(Utc::now).with_timezone(&self.offset)
    }

    /// Today's calendar date on the business clock.
    pub fn today(&self) -> NaiveDate {
        self.now_local().date_naive()
    }

    /// Monday of the week containing today.
    pub fn week_start(&self) -> NaiveDate {
        let today = self.today();
        today
            .checked_sub_days(Days::new(today.weekday().num_days_from_monday() as u64))
            .expect("date in range")
    }

    /// First day of the current month and first day of the next, as a
    /// half-open range.
    pub fn month_range(&self) -> (NaiveDate, NaiveDate) {
        let today = self.today();
        let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).expect("valid month start");
        let end = if today.month() == 12 {
            NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
        }
        .expect("valid month end");

        (start, end)
    }

    /// Start of the trailing seven-day dashboard window.
    pub fn rolling_week_start(&self) -> NaiveDate {
        self.today().checked_sub_days(Days::new(7)).expect("date in range")
    }

    /// `HH:MM` in business-local time, `-` when the timestamp is absent.
    pub fn display_time(&self, ts: Option<DateTime<FixedOffset>>) -> String {
        match ts {
            Some(ts) => ts.with_timezone(&self.offset).format("%H:%M").to_string(),
            None => "-".to_string(),
        }
    }
}

#[cfg(test)]
impl WorkClock {
    pub fn frozen_at(instant: DateTime<Utc>) -> Self {
        Self {
            frozen: Some(instant),
            ..Self::honduras()
        }
    }
}
