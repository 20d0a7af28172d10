//! Wall-clock time-of-day helpers.
//!
//! Everything here operates on minutes-since-midnight in `[0, 1440)`. Dates
//! and instants are `chrono`'s job; this module only knows about `HH:MM`.

/// Parse a zero-padded 24-hour `HH:MM` string into minutes since midnight.
///
/// Rejects anything that isn't exactly `HH:MM` with `HH` in `0..24` and `MM`
/// in `0..60`.
pub fn parse_hhmm(s: &str) -> Option<u32> {
    let (h, m) = s.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    if h >= 24 || m >= 60 {
        return None;
    }
    Some(h * 60 + m)
}

/// Format minutes since midnight as a zero-padded `HH:MM` string.
pub fn format_hhmm(minutes: u32) -> String {
    format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
}

/// Intersect two half-open ranges `[a, b)` and `[c, d)`.
///
/// Returns `None` if the intersection is empty.
pub fn range_intersect(a: (u32, u32), b: (u32, u32)) -> Option<(u32, u32)> {
    let start = a.0.max(b.0);
    let end = a.1.min(b.1);
    if start < end {
        Some((start, end))
    } else {
        None
    }
}

/// Is `now` within the inclusive daily window `[start, end]`?
///
/// If `start <= end` the window is a normal same-day range. If `start > end`
/// the window crosses midnight (e.g. 22:00-06:00) and `now` is inside it
/// whenever it's on either side of midnight within the window.
pub fn in_window(now: u32, start: u32, end: u32) -> bool {
    if start <= end {
        now >= start && now <= end
    } else {
        now >= start || now <= end
    }
}
