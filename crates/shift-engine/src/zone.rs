//! Attach a time zone to naive local shift starts.
//!
//! Shifts are generated on a naive local clock. Consumers that need real
//! instants pin them to the zone that clock belongs to; this never converts
//! between zones. A DST transition can make a local start nonexistent (spring
//! forward) or ambiguous (fall back), which [`DstPolicy`] resolves.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::expander::Shift;

/// Policy for shift starts that fall in a DST gap.
///
/// Ambiguous starts (repeated hour) always resolve to the earlier instant.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DstPolicy {
    /// Drop starts that fall in the DST gap (e.g., 2:30 AM during spring forward)
    Skip,
    /// Move to the first valid local time after the gap
    ShiftForward,
    /// Keep the elapsed time from before the gap, using the pre-transition offset
    #[default]
    WallClock,
}

/// Longest DST gap searched by [`DstPolicy::ShiftForward`].
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Pin a naive local datetime to `tz`.
pub fn localize_datetime(local: NaiveDateTime, tz: &Tz, policy: DstPolicy) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => (1..=MAX_GAP_MINUTES)
                .map(|m| local + Duration::minutes(m))
                .find_map(|candidate| tz.from_local_datetime(&candidate).earliest()),
            DstPolicy::WallClock => {
                let before = tz
                    .from_local_datetime(&(local - Duration::hours(12)))
                    .earliest()?;
                let offset = before.offset().fix();
                let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
                Some(Utc.from_utc_datetime(&utc).with_timezone(tz))
            }
        },
    }
}

/// Pin a shift's start to `tz`. `None` only under [`DstPolicy::Skip`].
pub fn localize(shift: &Shift, tz: &Tz, policy: DstPolicy) -> Option<DateTime<Tz>> {
    localize_datetime(shift.start, tz, policy)
}

/// Localize every shift, dropping those the policy skips.
pub fn localize_all(shifts: &[Shift], tz: &Tz, policy: DstPolicy) -> Vec<DateTime<Tz>> {
    shifts
        .iter()
        .filter_map(|shift| localize(shift, tz, policy))
        .collect()
}
