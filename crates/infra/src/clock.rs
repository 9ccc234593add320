use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Japan Standard Time. No daylight saving, so a fixed offset is exact.
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(JST_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Source of "now". Tests pin it with `Clock::Fixed`.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Calendar date in Japan at the current instant.
    pub fn today(&self) -> NaiveDate {
        self.now().with_timezone(&jst()).date_naive()
    }
}
