use chrono::{DateTime, Duration, Timelike};

/// Minute past each hour at which a cycle runs and the reminder goes out.
pub const PREPARE_MINUTE: u32 = 58;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Select a fresh signal and send the reminder
    Prepare,
    /// Announce the cached signal on the hour
    Announce,
}

fn hour_start<Tz: chrono::TimeZone>(at: &DateTime<Tz>) -> DateTime<Tz> {
    let into_hour = Duration::seconds(i64::from(at.minute() * 60 + at.second()))
        + Duration::nanoseconds(i64::from(at.nanosecond()));
    at.clone() - into_hour
}

/// The first event strictly after `now`.
pub fn next_event<Tz: chrono::TimeZone>(now: &DateTime<Tz>) -> (DateTime<Tz>, Event) {
    let hour_start = hour_start(now);

    let prepare = hour_start.clone() + Duration::minutes(i64::from(PREPARE_MINUTE));
    if *now < prepare {
        return (prepare, Event::Prepare);
    }
    (hour_start + Duration::hours(1), Event::Announce)
}

/// The event to run once `event`, scheduled for `fired_at`, has completed at `now`.
///
/// A prepare is always followed by that hour's announcement, even when the cycle ran past the
/// hour; the returned time is then already due and the announcement goes out late.
pub fn event_after<Tz: chrono::TimeZone>(
    fired_at: &DateTime<Tz>,
    event: Event,
    now: &DateTime<Tz>,
) -> (DateTime<Tz>, Event) {
    match event {
        Event::Prepare => (hour_start(fired_at) + Duration::hours(1), Event::Announce),
        Event::Announce => next_event(now),
    }
}
