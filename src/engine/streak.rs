use std::sync::Arc;

use chrono::Utc;

use crate::error::AppResult;
use crate::models::daily_record::{DailyRecord, StreakState};
use crate::store::DailyRecordStore;

/// Recomputes the journaling streak from the full rollup history.
///
/// A full rescan per mutation is fine here: the input is one record per
/// distinct journaled day, bounded by calendar time rather than entry volume.
/// Concurrent recomputes race benignly; the last writer's state wins.
pub struct StreakCalculator {
    records: Arc<dyn DailyRecordStore>,
}

impl StreakCalculator {
    pub fn new(records: Arc<dyn DailyRecordStore>) -> Self {
        Self { records }
    }

    pub async fn recompute(&self) -> AppResult<StreakState> {
        let records = self.records.list_desc().await?;
        let (current, longest) = compute_streaks(&records);
        let state = StreakState {
            current_streak: current,
            longest_streak: longest,
            computed_at: Utc::now(),
        };
        self.records.save_streak_state(&state).await?;
        tracing::debug!(current, longest, "streak recomputed");
        Ok(state)
    }
}

/// Walks rollup records (most recent first) and returns
/// `(current_streak, longest_streak)`.
///
/// A run is a set of records on consecutive dates, each with at least one
/// entry. Records with `entries_count == 0` break runs and never extend them;
/// a date gap greater than one day breaks runs as well. The current streak is
/// the run anchored at the most recent record, zero when that record is empty.
pub fn compute_streaks(records: &[DailyRecord]) -> (i32, i32) {
    let mut current = 0;
    let mut longest = 0;
    let mut temp = 0;
    let mut run_start = 0;

    for (i, record) in records.iter().enumerate() {
        if record.entries_count > 0 {
            if temp == 0 {
                run_start = i;
            }
            temp += 1;

            let run_breaks = match records.get(i + 1) {
                Some(next) => (record.date - next.date).num_days() > 1,
                None => true,
            };
            if run_breaks {
                if run_start == 0 {
                    current = temp;
                }
                longest = longest.max(temp);
                temp = 0;
            }
        } else {
            if temp > 0 && run_start == 0 {
                current = temp;
            }
            longest = longest.max(temp);
            temp = 0;
        }
    }
    longest = longest.max(temp);

    (current, longest)
}
