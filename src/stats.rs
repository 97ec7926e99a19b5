//! Weekly goal streaks and calendar views over a session history
//!
//! The calculator is pure: it never mutates the session list, performs no
//! I/O and takes "now" as an explicit argument. Calendar days are those of
//! the timezone `now` is expressed in.

use crate::models::{DayCell, DayStatus, SessionRecord, StatsSnapshot, WeekSummary};
use chrono::{DateTime, Datelike, Days, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Day that is never counted as a rest day when left untrained
pub const DEFAULT_OFF_DAY: Weekday = Weekday::Sun;

/// Weekday labels used when no localized labels are configured, Monday first
pub const DEFAULT_WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Statistics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Weekly session goal used when the caller does not supply one
    pub weekly_goal: u32,

    /// Number of weeks reported in the recent-weeks history
    pub history_weeks: u16,

    /// Localized weekday labels, Monday first (must hold exactly 7 entries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday_labels: Option<Vec<String>>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig {
            weekly_goal: 4,
            history_weeks: 8,
            weekday_labels: None,
        }
    }
}

/// Monday of the week containing `date`.
///
/// Sunday counts as day 7, so it maps back six days to the preceding Monday.
/// Dates in the first days of the calendar, whose Monday is not
/// representable, map to `NaiveDate::MIN`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday();
    date.checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or(NaiveDate::MIN)
}

/// Monday 00:00:00 of the week containing `moment`
pub fn week_start_datetime(moment: NaiveDateTime) -> NaiveDateTime {
    week_start(moment.date()).and_time(NaiveTime::MIN)
}

/// ISO-8601 week identifier, e.g. `2025-W01`.
///
/// Uses the ISO week-numbering year, so the days of a week that straddles
/// New Year share one key.
pub fn iso_week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// A session placed on the local calendar
struct DatedSession<'a> {
    local: NaiveDateTime,
    name: Option<&'a str>,
}

/// Sessions grouped by local calendar day
#[derive(Debug, Clone, Default)]
struct DayEntry {
    count: u32,
    first_completed: Option<NaiveDateTime>,
    label: Option<String>,
}

/// Session count for one Monday-aligned week
#[derive(Debug, Clone, Copy)]
struct WeekBucket {
    start: NaiveDate,
    count: u32,
}

/// Weekly session counts keyed by ISO week identifier
#[derive(Debug, Default)]
struct WeekBuckets {
    buckets: HashMap<String, WeekBucket>,
}

impl WeekBuckets {
    fn from_sessions(sessions: &[DatedSession<'_>]) -> Self {
        let mut buckets: HashMap<String, WeekBucket> = HashMap::new();
        for session in sessions {
            let date = session.local.date();
            buckets
                .entry(iso_week_key(date))
                .or_insert_with(|| WeekBucket {
                    start: week_start(date),
                    count: 0,
                })
                .count += 1;
        }
        WeekBuckets { buckets }
    }

    fn count_for(&self, date: NaiveDate) -> u32 {
        self.buckets
            .get(&iso_week_key(date))
            .map(|bucket| bucket.count)
            .unwrap_or(0)
    }

    /// Consecutive qualifying weeks walking back from the week of `today`
    fn current_streak(&self, today: NaiveDate, goal: u32) -> u32 {
        let mut streak = 0;
        let mut cursor = week_start(today);

        while self.count_for(cursor) >= goal {
            streak += 1;
            match cursor.checked_sub_signed(Duration::weeks(1)) {
                Some(previous) => cursor = previous,
                None => break,
            }
        }

        streak
    }

    /// Longest run of qualifying weeks whose starts are exactly one week apart
    fn best_streak(&self, goal: u32) -> u32 {
        let mut starts: Vec<NaiveDate> = self
            .buckets
            .values()
            .filter(|bucket| bucket.count >= goal)
            .map(|bucket| bucket.start)
            .collect();
        starts.sort_unstable();

        let mut best = 0;
        let mut run = 0;
        let mut previous: Option<NaiveDate> = None;

        for start in starts {
            run = match previous {
                Some(prev) if start - prev == Duration::weeks(1) => run + 1,
                _ => 1,
            };
            best = best.max(run);
            previous = Some(start);
        }

        best
    }
}

/// Core statistics engine
#[derive(Debug, Clone, Default)]
pub struct StatsCalculator {
    config: StatsConfig,
}

impl StatsCalculator {
    /// Create a calculator with default configuration
    pub fn new() -> Self {
        StatsCalculator {
            config: StatsConfig::default(),
        }
    }

    /// Create a calculator with custom configuration
    pub fn with_config(config: StatsConfig) -> Self {
        StatsCalculator { config }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Compute the statistics snapshot using the local wall clock
    pub fn compute_now(&self, sessions: &[SessionRecord], weekly_goal: u32) -> StatsSnapshot {
        self.compute(sessions, weekly_goal, &Local::now())
    }

    /// Compute the statistics snapshot as seen at `now`.
    ///
    /// Records without a usable completion time are left out of every
    /// date-based figure and reported through `undated_sessions`. A weekly
    /// goal of 0 is treated as 1: a week qualifies once it has any session.
    pub fn compute<Tz: TimeZone>(
        &self,
        sessions: &[SessionRecord],
        weekly_goal: u32,
        now: &DateTime<Tz>,
    ) -> StatsSnapshot {
        let zone = now.timezone();
        let today = now.naive_local().date();
        let goal = weekly_goal.max(1);

        let dated: Vec<DatedSession<'_>> = sessions
            .iter()
            .filter_map(|session| {
                session.completed_at_utc().map(|instant| DatedSession {
                    local: instant.with_timezone(&zone).naive_local(),
                    name: session.workout_name.as_deref(),
                })
            })
            .collect();
        let undated_sessions = sessions.len() - dated.len();

        debug!(
            total = sessions.len(),
            undated = undated_sessions,
            weekly_goal,
            %today,
            "Computing workout stats"
        );

        let days = Self::index_days(&dated);
        let weeks = WeekBuckets::from_sessions(&dated);

        let current_streak = weeks.current_streak(today, goal);
        let best_streak = weeks.best_streak(goal);
        let completed_this_week = weeks.count_for(today);
        let completed_this_month = days
            .iter()
            .filter(|(date, _)| date.year() == today.year() && date.month() == today.month())
            .map(|(_, entry)| entry.count)
            .sum();

        debug!(current_streak, best_streak, completed_this_week, "Streaks computed");

        StatsSnapshot {
            current_streak,
            best_streak,
            completed_this_week,
            completed_this_month,
            weekly_goal,
            total_sessions: sessions.len(),
            undated_sessions,
            week_days: self.week_strip(&days, today),
            month_days: self.month_grid(&days, today),
            recent_weeks: self.recent_weeks(&weeks, today, goal),
        }
    }

    /// Group dated sessions by calendar day, keeping the earliest completion
    /// as the day's representative session
    fn index_days(sessions: &[DatedSession<'_>]) -> BTreeMap<NaiveDate, DayEntry> {
        let mut days: BTreeMap<NaiveDate, DayEntry> = BTreeMap::new();

        for session in sessions {
            let entry = days.entry(session.local.date()).or_default();
            entry.count += 1;

            let is_earliest = entry
                .first_completed
                .map_or(true, |first| session.local < first);
            if is_earliest {
                entry.first_completed = Some(session.local);
                entry.label = session.name.map(str::to_string);
            }
        }

        days
    }

    fn weekday_label(&self, weekday: Weekday) -> String {
        let index = weekday.num_days_from_monday() as usize;
        self.config
            .weekday_labels
            .as_ref()
            .filter(|labels| labels.len() == 7)
            .map(|labels| labels[index].clone())
            .unwrap_or_else(|| DEFAULT_WEEKDAY_LABELS[index].to_string())
    }

    fn day_cell(&self, date: NaiveDate, days: &BTreeMap<NaiveDate, DayEntry>) -> DayCell {
        let entry = days.get(&date);
        DayCell {
            weekday_label: self.weekday_label(date.weekday()),
            day_of_month: date.day(),
            date,
            trained: entry.is_some(),
            workout_label: entry.and_then(|e| e.label.clone()),
            workout_time: entry.and_then(|e| e.first_completed).map(|t| t.time()),
            is_rest: false,
            status: None,
            is_outside_month: false,
        }
    }

    /// Monday through Sunday of the week containing `today`
    fn week_strip(&self, days: &BTreeMap<NaiveDate, DayEntry>, today: NaiveDate) -> Vec<DayCell> {
        week_start(today)
            .iter_days()
            .take(7)
            .map(|date| {
                let mut cell = self.day_cell(date, days);
                cell.is_rest = date <= today && !cell.trained && date.weekday() != DEFAULT_OFF_DAY;
                cell
            })
            .collect()
    }

    /// Current month padded with neighbouring days to whole Monday-start weeks
    fn month_grid(&self, days: &BTreeMap<NaiveDate, DayEntry>, today: NaiveDate) -> Vec<DayCell> {
        let Some(first) = today.with_day(1) else {
            return Vec::new();
        };
        let lead = u64::from(first.weekday().num_days_from_monday());

        let mut cells = Vec::with_capacity(42);

        for offset in (1..=lead).rev() {
            let Some(date) = first.checked_sub_days(Days::new(offset)) else {
                continue;
            };
            let mut cell = self.day_cell(date, days);
            let status = if cell.trained {
                DayStatus::Trained
            } else {
                DayStatus::PrevMonthRest
            };
            cell.status = Some(status);
            cell.is_rest = status == DayStatus::PrevMonthRest;
            cell.is_outside_month = true;
            cells.push(cell);
        }

        let mut last = first;
        for date in first.iter_days().take_while(|d| d.month() == first.month()) {
            let mut cell = self.day_cell(date, days);
            let status = if date > today {
                DayStatus::Future
            } else if cell.trained {
                DayStatus::Trained
            } else {
                DayStatus::Rest
            };
            cell.status = Some(status);
            cell.is_rest = status == DayStatus::Rest;
            cells.push(cell);
            last = date;
        }

        for date in last.iter_days().skip(1) {
            if cells.len() % 7 == 0 {
                break;
            }
            let mut cell = self.day_cell(date, days);
            cell.status = Some(DayStatus::Future);
            cell.is_outside_month = true;
            cells.push(cell);
        }

        cells
    }

    /// Configured number of weeks ending with the week of `today`, oldest first
    fn recent_weeks(&self, weeks: &WeekBuckets, today: NaiveDate, goal: u32) -> Vec<WeekSummary> {
        let current = week_start(today);

        (0..i64::from(self.config.history_weeks))
            .rev()
            .filter_map(|back| current.checked_sub_signed(Duration::weeks(back)))
            .map(|start| {
                let sessions = weeks.count_for(start);
                WeekSummary {
                    week_key: iso_week_key(start),
                    week_start: start,
                    sessions,
                    goal_met: sessions >= goal,
                }
            })
            .collect()
    }
}

/// Compute a snapshot with the default calculator
pub fn compute_stats<Tz: TimeZone>(
    sessions: &[SessionRecord],
    weekly_goal: u32,
    now: &DateTime<Tz>,
) -> StatsSnapshot {
    StatsCalculator::new().compute(sessions, weekly_goal, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Wednesday 2024-03-13 15:00 UTC
    fn wednesday_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 13, 15, 0, 0).unwrap()
    }

    fn session_on(d: NaiveDate, name: &str) -> SessionRecord {
        SessionRecord::completed_at(d.and_hms_opt(10, 0, 0).unwrap().and_utc()).with_name(name)
    }

    /// `per_week` sessions in each week starting `back` weeks before `monday`
    fn sessions_for_weeks(monday: NaiveDate, weeks_back: &[i64], per_week: u32) -> Vec<SessionRecord> {
        let mut sessions = Vec::new();
        for back in weeks_back {
            let start = monday - Duration::weeks(*back);
            for i in 0..per_week {
                sessions.push(session_on(start + Duration::days(i64::from(i)), "Full Body"));
            }
        }
        sessions
    }

    #[test]
    fn test_week_start() {
        // Wednesday
        assert_eq!(week_start(date(2024, 3, 13)), date(2024, 3, 11));
        // Monday maps to itself
        assert_eq!(week_start(date(2024, 3, 11)), date(2024, 3, 11));
        // Sunday maps to the Monday six days earlier
        assert_eq!(week_start(date(2024, 3, 17)), date(2024, 3, 11));
        // Across a month boundary
        assert_eq!(week_start(date(2024, 9, 1)), date(2024, 8, 26));
        // Across a year boundary
        assert_eq!(week_start(date(2025, 1, 5)), date(2024, 12, 30));
    }

    #[test]
    fn test_week_start_datetime_zeroes_time() {
        let moment = date(2024, 3, 17).and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(
            week_start_datetime(moment),
            date(2024, 3, 11).and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_iso_week_key() {
        assert_eq!(iso_week_key(date(2024, 3, 13)), "2024-W11");
        assert_eq!(iso_week_key(date(2024, 12, 29)), "2024-W52");
        // Monday 2024-12-30 belongs to the first ISO week of 2025
        assert_eq!(iso_week_key(date(2024, 12, 30)), "2025-W01");
        assert_eq!(iso_week_key(date(2025, 1, 5)), "2025-W01");
        assert_ne!(iso_week_key(date(2025, 1, 5)), iso_week_key(date(2025, 1, 6)));
    }

    #[test]
    fn test_sunday_buckets_with_preceding_week() {
        let keys: Vec<String> = (11..=17).map(|d| iso_week_key(date(2024, 3, d))).collect();
        assert!(keys.iter().all(|k| k == &keys[0]));
        assert_ne!(iso_week_key(date(2024, 3, 18)), keys[0]);
    }

    #[test]
    fn test_no_sessions() {
        let snapshot = compute_stats(&[], 4, &wednesday_now());

        assert_eq!(snapshot.completed_this_week, 0);
        assert_eq!(snapshot.current_streak, 0);
        assert_eq!(snapshot.best_streak, 0);
        assert_eq!(snapshot.weekly_goal, 4);
        assert_eq!(snapshot.week_days.len(), 7);
        assert_eq!(snapshot.month_days.len() % 7, 0);
        assert!(snapshot.week_days.iter().all(|d| !d.trained));
    }

    #[test]
    fn test_single_session_today() {
        let now = wednesday_now();
        let sessions = vec![SessionRecord::completed_at(now).with_name("Push Day")];

        let snapshot = compute_stats(&sessions, 1, &now);

        assert_eq!(snapshot.completed_this_week, 1);
        assert_eq!(snapshot.current_streak, 1);
        assert_eq!(snapshot.best_streak, 1);

        let today = &snapshot.week_days[2];
        assert_eq!(today.date, date(2024, 3, 13));
        assert!(today.trained);
        assert!(!today.is_rest);
        assert_eq!(today.workout_label.as_deref(), Some("Push Day"));
        assert_eq!(today.workout_time, NaiveTime::from_hms_opt(15, 0, 0));
    }

    #[test]
    fn test_four_consecutive_qualifying_weeks() {
        let monday = date(2024, 3, 11);
        let mut sessions = sessions_for_weeks(monday, &[0, 1, 2, 3], 2);
        // Fifth week back falls short of the goal
        sessions.extend(sessions_for_weeks(monday, &[4], 1));

        let snapshot = compute_stats(&sessions, 2, &wednesday_now());

        assert_eq!(snapshot.current_streak, 4);
        assert_eq!(snapshot.best_streak, 4);
        assert_eq!(snapshot.completed_this_week, 2);
    }

    #[test]
    fn test_gap_breaks_current_streak() {
        let sessions = sessions_for_weeks(date(2024, 3, 11), &[1, 2, 3], 3);

        let snapshot = compute_stats(&sessions, 3, &wednesday_now());

        assert_eq!(snapshot.current_streak, 0);
        assert_eq!(snapshot.best_streak, 3);
    }

    #[test]
    fn test_best_streak_picks_longest_run() {
        // Runs of 2 and 3 separated by an empty week
        let sessions = sessions_for_weeks(date(2024, 3, 11), &[0, 1, 3, 4, 5], 1);

        let snapshot = compute_stats(&sessions, 1, &wednesday_now());

        assert_eq!(snapshot.current_streak, 2);
        assert_eq!(snapshot.best_streak, 3);
    }

    #[test]
    fn test_single_past_week_qualifies() {
        let sessions = sessions_for_weeks(date(2024, 3, 11), &[6], 4);

        let snapshot = compute_stats(&sessions, 4, &wednesday_now());

        assert_eq!(snapshot.current_streak, 0);
        assert_eq!(snapshot.best_streak, 1);
    }

    #[test]
    fn test_streak_across_year_boundary() {
        // Weeks starting 2024-12-23 and 2024-12-30 (ISO 2025-W01)
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 12, 0, 0).unwrap();
        let sessions = vec![
            session_on(date(2024, 12, 28), "A"),
            session_on(date(2024, 12, 31), "B"),
        ];

        let snapshot = compute_stats(&sessions, 1, &now);

        assert_eq!(snapshot.current_streak, 2);
        assert_eq!(snapshot.best_streak, 2);
        assert_eq!(snapshot.completed_this_week, 1);
    }

    #[test]
    fn test_zero_goal_treated_as_one() {
        let sessions = sessions_for_weeks(date(2024, 3, 11), &[0, 1], 1);

        let snapshot = compute_stats(&sessions, 0, &wednesday_now());

        assert_eq!(snapshot.weekly_goal, 0);
        assert_eq!(snapshot.current_streak, 2);
        assert_eq!(snapshot.best_streak, 2);
        assert!(snapshot.recent_weeks[..6].iter().all(|w| !w.goal_met));
    }

    #[test]
    fn test_undated_sessions_are_skipped() {
        let now = wednesday_now();
        let sessions = vec![
            SessionRecord::completed_at(now),
            SessionRecord::default().with_name("Draft"),
            SessionRecord {
                completed_at: Some(crate::models::CompletionTimestamp::Text("soon".to_string())),
                ..SessionRecord::default()
            },
        ];

        let snapshot = compute_stats(&sessions, 1, &now);

        assert_eq!(snapshot.total_sessions, 3);
        assert_eq!(snapshot.undated_sessions, 2);
        assert_eq!(snapshot.completed_this_week, 1);
    }

    #[test]
    fn test_week_strip_rest_days() {
        let sessions = vec![session_on(date(2024, 3, 12), "Pull")];

        let snapshot = compute_stats(&sessions, 3, &wednesday_now());
        let rest: Vec<bool> = snapshot.week_days.iter().map(|d| d.is_rest).collect();

        // Mon rest, Tue trained, Wed (today) rest, rest of the week neutral
        assert_eq!(rest, vec![true, false, true, false, false, false, false]);
        assert_eq!(snapshot.week_days[0].weekday_label, "Mon");
        assert_eq!(snapshot.week_days[6].weekday_label, "Sun");
        assert!(snapshot.week_days.iter().all(|d| d.status.is_none() && !d.is_outside_month));
    }

    #[test]
    fn test_sunday_never_marked_rest() {
        // Sunday 2024-09-15, nothing trained all week
        let now = Utc.with_ymd_and_hms(2024, 9, 15, 20, 0, 0).unwrap();

        let snapshot = compute_stats(&[], 2, &now);

        assert!(snapshot.week_days[..6].iter().all(|d| d.is_rest));
        assert_eq!(snapshot.week_days[6].date, date(2024, 9, 15));
        assert!(!snapshot.week_days[6].is_rest);
    }

    #[test]
    fn test_representative_session_is_earliest() {
        let day = date(2024, 3, 12);
        let sessions = vec![
            SessionRecord::completed_at(day.and_hms_opt(18, 0, 0).unwrap().and_utc()).with_name("Evening"),
            SessionRecord::completed_at(day.and_hms_opt(7, 30, 0).unwrap().and_utc()).with_name("Morning"),
        ];

        let snapshot = compute_stats(&sessions, 1, &wednesday_now());
        let tuesday = &snapshot.week_days[1];

        assert_eq!(tuesday.workout_label.as_deref(), Some("Morning"));
        assert_eq!(tuesday.workout_time, NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(snapshot.completed_this_week, 2);
    }

    #[test]
    fn test_month_grid_layout() {
        // March 2024 starts on a Friday and has 31 days: 4 + 31 = 35 cells
        let sessions = vec![
            session_on(date(2024, 2, 27), "Legs"),
            session_on(date(2024, 3, 4), "Push"),
        ];

        let snapshot = compute_stats(&sessions, 1, &wednesday_now());
        let grid = &snapshot.month_days;

        assert_eq!(grid.len(), 35);
        assert_eq!(grid[0].date, date(2024, 2, 26));
        assert!(grid[..4].iter().all(|c| c.is_outside_month));
        assert_eq!(grid[0].status, Some(DayStatus::PrevMonthRest));
        assert_eq!(grid[1].status, Some(DayStatus::Trained));
        assert_eq!(grid[4].date, date(2024, 3, 1));
        assert!(!grid[4].is_outside_month);

        let march = |d: u32| &grid[3 + d as usize];
        assert_eq!(march(4).status, Some(DayStatus::Trained));
        assert_eq!(march(5).status, Some(DayStatus::Rest));
        // Today untrained still counts as rest
        assert_eq!(march(13).status, Some(DayStatus::Rest));
        assert!(march(13).is_rest);
        assert_eq!(march(14).status, Some(DayStatus::Future));
        assert!(!march(14).is_rest);
        assert_eq!(march(31).date, date(2024, 3, 31));
    }

    #[test]
    fn test_month_grid_trailing_padding() {
        // September 2024 starts on a Sunday: 6 + 30 days, padded to 42
        let now = Utc.with_ymd_and_hms(2024, 9, 15, 8, 0, 0).unwrap();

        let snapshot = compute_stats(&[], 1, &now);
        let grid = &snapshot.month_days;

        assert_eq!(grid.len(), 42);
        assert_eq!(grid[0].date, date(2024, 8, 26));
        assert_eq!(grid[6].date, date(2024, 9, 1));
        let tail = &grid[36..];
        assert_eq!(tail[0].date, date(2024, 10, 1));
        assert!(tail.iter().all(|c| c.is_outside_month && c.status == Some(DayStatus::Future)));
    }

    #[test]
    fn test_month_starting_monday_has_no_lead() {
        // April 2024 starts on a Monday
        let now = Utc.with_ymd_and_hms(2024, 4, 10, 8, 0, 0).unwrap();

        let snapshot = compute_stats(&[], 1, &now);

        assert_eq!(snapshot.month_days[0].date, date(2024, 4, 1));
        assert_eq!(snapshot.month_days.len(), 35);
    }

    #[test]
    fn test_calendar_days_follow_now_timezone() {
        // 23:30 UTC on Tuesday is already Wednesday in UTC+2
        let sessions = vec![SessionRecord::completed_at(
            Utc.with_ymd_and_hms(2024, 3, 12, 23, 30, 0).unwrap(),
        )];
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap();

        let snapshot = compute_stats(&sessions, 1, &now);

        assert!(!snapshot.week_days[1].trained);
        assert!(snapshot.week_days[2].trained);
        assert_eq!(snapshot.week_days[2].workout_time, NaiveTime::from_hms_opt(1, 30, 0));
    }

    #[test]
    fn test_completed_this_month() {
        let sessions = vec![
            session_on(date(2024, 2, 28), "Feb"),
            session_on(date(2024, 3, 1), "Mar"),
            session_on(date(2024, 3, 2), "Mar"),
        ];

        let snapshot = compute_stats(&sessions, 1, &wednesday_now());

        assert_eq!(snapshot.completed_this_month, 2);
    }

    #[test]
    fn test_recent_weeks_history() {
        let sessions = sessions_for_weeks(date(2024, 3, 11), &[0, 2], 2);
        let calculator = StatsCalculator::with_config(StatsConfig {
            history_weeks: 3,
            ..StatsConfig::default()
        });

        let snapshot = calculator.compute(&sessions, 2, &wednesday_now());
        let weeks = &snapshot.recent_weeks;

        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].week_start, date(2024, 2, 26));
        assert_eq!(weeks[2].week_key, "2024-W11");
        assert_eq!(
            weeks.iter().map(|w| w.goal_met).collect::<Vec<_>>(),
            vec![true, false, true]
        );
    }

    #[test]
    fn test_localized_weekday_labels() {
        let labels = ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let calculator = StatsCalculator::with_config(StatsConfig {
            weekday_labels: Some(labels),
            ..StatsConfig::default()
        });

        let snapshot = calculator.compute(&[], 1, &wednesday_now());

        assert_eq!(snapshot.week_days[2].weekday_label, "Mi");
        assert_eq!(snapshot.week_days[6].weekday_label, "So");
    }

    #[test]
    fn test_malformed_labels_fall_back_to_defaults() {
        let calculator = StatsCalculator::with_config(StatsConfig {
            weekday_labels: Some(vec!["Mo".to_string()]),
            ..StatsConfig::default()
        });

        let snapshot = calculator.compute(&[], 1, &wednesday_now());

        assert_eq!(snapshot.week_days[0].weekday_label, "Mon");
    }

    #[test]
    fn test_input_not_mutated_and_idempotent() {
        let sessions = sessions_for_weeks(date(2024, 3, 11), &[0, 1, 2], 2);
        let before = sessions.clone();

        let first = compute_stats(&sessions, 2, &wednesday_now());
        let second = compute_stats(&sessions, 2, &wednesday_now());

        assert_eq!(sessions, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_instants_at_calendar_edges_are_undated() {
        use crate::models::CompletionTimestamp;

        let now = wednesday_now();
        let sessions = vec![
            SessionRecord {
                completed_at: Some(CompletionTimestamp::Seconds {
                    seconds: DateTime::<Utc>::MIN_UTC.timestamp(),
                    nanoseconds: 0,
                }),
                ..SessionRecord::default()
            },
            SessionRecord::completed_at(DateTime::<Utc>::MAX_UTC),
            SessionRecord {
                completed_at: Some(CompletionTimestamp::Millis(
                    (DateTime::<Utc>::MIN_UTC.timestamp_millis() + 86_400_000) as f64,
                )),
                ..SessionRecord::default()
            },
            SessionRecord::completed_at(now),
        ];

        let snapshot = compute_stats(&sessions, 1, &now);
        assert_eq!(snapshot.undated_sessions, 3);
        assert_eq!(snapshot.completed_this_week, 1);
        assert_eq!(snapshot.current_streak, 1);

        let east = FixedOffset::east_opt(14 * 3600).unwrap();
        let shifted = compute_stats(&sessions, 1, &now.with_timezone(&east));
        assert_eq!(shifted.undated_sessions, 3);
    }

    #[test]
    fn test_week_start_at_calendar_edges() {
        assert_eq!(week_start(NaiveDate::MAX).weekday(), Weekday::Mon);
        let first = week_start(NaiveDate::MIN);
        assert!(first == NaiveDate::MIN || first.weekday() == Weekday::Mon);
    }
}
