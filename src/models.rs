use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Naive date-time layouts accepted for textual timestamps (interpreted as UTC)
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Days kept clear at either end of the representable calendar, enough to
/// shift an instant into any timezone and walk back to its Monday
const CALENDAR_MARGIN_DAYS: u64 = 7;

/// Completion time of a session as it arrives from the document store.
///
/// Exported documents carry the timestamp in one of several shapes; all of
/// them normalize through [`CompletionTimestamp::to_utc`]. When deserializing,
/// the variants are tried in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletionTimestamp {
    /// Epoch-seconds wrapper (`{"seconds": .., "nanoseconds": ..}`)
    Seconds {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },

    /// A native instant, or an RFC 3339 string in serialized form
    Instant(DateTime<Utc>),

    /// Numeric value, milliseconds since the Unix epoch
    Millis(f64),

    /// Any other string; parsed leniently on normalization
    Text(String),
}

impl CompletionTimestamp {
    /// Normalize to a UTC instant.
    ///
    /// Returns `None` when the value cannot be interpreted as a date. This
    /// never panics: out-of-range numbers and garbage text are simply absent,
    /// as are instants too close to the ends of the calendar to be placed in
    /// a week.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let instant = match self {
            CompletionTimestamp::Instant(instant) => Some(*instant),
            CompletionTimestamp::Seconds {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds),
            CompletionTimestamp::Millis(millis) => millis_to_utc(*millis),
            CompletionTimestamp::Text(raw) => parse_text_timestamp(raw),
        }?;
        within_calendar(instant)
    }
}

impl From<DateTime<Utc>> for CompletionTimestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        CompletionTimestamp::Instant(instant)
    }
}

fn within_calendar(instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let earliest = NaiveDate::MIN.checked_add_days(Days::new(CALENDAR_MARGIN_DAYS))?;
    let latest = NaiveDate::MAX.checked_sub_days(Days::new(CALENDAR_MARGIN_DAYS))?;
    let date = instant.date_naive();
    (earliest..=latest).contains(&date).then_some(instant)
}

fn millis_to_utc(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

fn parse_text_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }

    // Stringified epoch milliseconds
    text.parse::<f64>().ok().and_then(millis_to_utc)
}

/// A completed workout session, as exported from the document store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Document identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Name of the workout template the session was run from
    #[serde(default, alias = "workout_name", alias = "name")]
    pub workout_name: Option<String>,

    /// When the session was finished
    #[serde(
        default,
        alias = "completed_at",
        alias = "completionTimestamp",
        alias = "completion_timestamp"
    )]
    pub completed_at: Option<CompletionTimestamp>,

    /// Total session duration in seconds
    #[serde(default, alias = "duration_seconds", skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
}

impl SessionRecord {
    /// Create a record completed at the given instant
    pub fn completed_at(instant: DateTime<Utc>) -> Self {
        SessionRecord {
            completed_at: Some(CompletionTimestamp::Instant(instant)),
            ..SessionRecord::default()
        }
    }

    /// Attach a workout name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.workout_name = Some(name.into());
        self
    }

    /// Normalized completion instant, if the record carries a usable one
    pub fn completed_at_utc(&self) -> Option<DateTime<Utc>> {
        self.completed_at.as_ref().and_then(CompletionTimestamp::to_utc)
    }
}

/// Training status of a day in the monthly grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Trained,
    Rest,
    Future,
    PrevMonthRest,
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayStatus::Trained => write!(f, "trained"),
            DayStatus::Rest => write!(f, "rest"),
            DayStatus::Future => write!(f, "future"),
            DayStatus::PrevMonthRest => write!(f, "prev_month_rest"),
        }
    }
}

/// One calendar day's training status, ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCell {
    /// Abbreviated weekday name
    pub weekday_label: String,

    /// Day number within its month
    pub day_of_month: u32,

    /// Calendar date this cell represents
    pub date: NaiveDate,

    /// At least one session was completed on this day
    pub trained: bool,

    /// Name of the representative session trained that day
    pub workout_label: Option<String>,

    /// Local completion time of the representative session
    pub workout_time: Option<NaiveTime>,

    /// Past or current day without training
    pub is_rest: bool,

    /// Month-grid classification (absent in the weekly strip)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DayStatus>,

    /// Padding cell borrowed from the previous or next month
    #[serde(default)]
    pub is_outside_month: bool,
}

/// Session count for one ISO week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSummary {
    /// ISO week identifier, e.g. `2024-W11`
    pub week_key: String,

    /// Monday the week starts on
    pub week_start: NaiveDate,

    /// Dated sessions completed within the week
    pub sessions: u32,

    /// Whether the week met the weekly goal
    pub goal_met: bool,
}

/// Statistics derived from a session history at a given instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Consecutive qualifying weeks ending at the current week
    pub current_streak: u32,

    /// Longest run of consecutive qualifying weeks in the history
    pub best_streak: u32,

    /// Sessions completed in the current Monday-aligned week
    pub completed_this_week: u32,

    /// Sessions completed in the current calendar month
    pub completed_this_month: u32,

    /// Weekly goal as supplied by the caller
    pub weekly_goal: u32,

    /// All records supplied, dated or not
    pub total_sessions: usize,

    /// Records skipped for lack of a usable completion time
    pub undated_sessions: usize,

    /// Monday through Sunday of the current week
    pub week_days: Vec<DayCell>,

    /// Current month padded to whole Monday-start weeks
    pub month_days: Vec<DayCell>,

    /// Most recent weeks, oldest first, ending with the current week
    pub recent_weeks: Vec<WeekSummary>,
}
