use chrono::{Local, NaiveDate};

use crate::models::contribution::{ContributionDay, ContributionHistory};

/// If the newest day in the calendar is older than this, the data does not
/// reach "today" and there is no current streak.
const STALE_AFTER_DAYS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakSummary {
    pub total_commits: u64,
    pub longest_streak: u32,
    pub current_streak: u32,
}

/// Compute all calendar-derived numbers at once, with `today` taken from the local clock
pub fn summarize(history: &ContributionHistory) -> StreakSummary {
    summarize_at(history, Local::now().date_naive())
}

pub fn summarize_at(history: &ContributionHistory, today: NaiveDate) -> StreakSummary {
    StreakSummary {
        total_commits: total_commits(history),
        longest_streak: longest_streak(history),
        current_streak: current_streak(history, today),
    }
}

/// Flatten every year into one list of days. Years are merged before any
/// sorting so a run crossing Dec 31 -> Jan 1 stays one run.
fn all_days(history: &ContributionHistory) -> Vec<&ContributionDay> {
    history.values().flat_map(|year| year.days()).collect()
}

pub fn total_commits(history: &ContributionHistory) -> u64 {
    all_days(history)
        .iter()
        .map(|day| u64::from(day.contribution_count))
        .sum()
}

/// Longest run of days with a non-zero count. Only explicit zero-count days
/// break a run; missing dates do not.
pub fn longest_streak(history: &ContributionHistory) -> u32 {
    let mut days = all_days(history);
    days.sort_by_key(|day| day.date);

    let mut running = 0u32;
    let mut longest = 0u32;

    for day in days {
        if day.contribution_count > 0 {
            running += 1;
            longest = longest.max(running);
        } else {
            running = 0;
        }
    }

    longest
}

/// Streak ending at (or within a day of) `today`, walking backwards.
///
/// A contributing day extends the streak when it is at most one day before
/// the last contributing day. A zero-count day only ends the walk once it is
/// more than one day away from the last contributing day.
// TODO: confirm the one-day tolerance on zero-count days with the product owner
pub fn current_streak(history: &ContributionHistory, today: NaiveDate) -> u32 {
    let mut days = all_days(history);
    if days.is_empty() {
        return 0;
    }

    days.sort_by(|a, b| b.date.cmp(&a.date));

    let most_recent = days[0].date;
    if (today - most_recent).num_days() > STALE_AFTER_DAYS {
        return 0;
    }

    let mut streak = 0u32;
    let mut last_contribution: Option<NaiveDate> = None;

    for day in days {
        match (day.contribution_count > 0, last_contribution) {
            (true, None) => {
                streak = 1;
                last_contribution = Some(day.date);
            }
            (true, Some(last)) => {
                if (last - day.date).num_days() <= 1 {
                    streak += 1;
                    last_contribution = Some(day.date);
                } else {
                    break;
                }
            }
            (false, Some(last)) => {
                if (last - day.date).num_days() > 1 {
                    break;
                }
            }
            (false, None) => {}
        }
    }

    streak
}
