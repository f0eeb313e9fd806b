use crate::model::*;

/// Three-case overlap test between a candidate `a` and an existing `b`:
/// `a` starts inside `b`, `a` ends inside `b`, or `a` contains `b`.
/// Touching boundaries do not overlap.
pub fn intervals_conflict(a: &TimeInterval, b: &TimeInterval) -> bool {
    (b.start <= a.start && a.start < b.end)
        || (b.start < a.end && a.end <= b.end)
        || (a.start <= b.start && a.end >= b.end)
}

/// True if `candidate` conflicts with any interval in `existing`.
/// Stops at the first match.
pub fn has_conflict<'a, I>(candidate: &TimeInterval, existing: I) -> bool
where
    I: IntoIterator<Item = &'a TimeInterval>,
{
    existing
        .into_iter()
        .any(|other| intervals_conflict(candidate, other))
}

/// First appointment that conflicts with `candidate`, for diagnostics.
pub fn find_conflict<'a, I>(candidate: &TimeInterval, appointments: I) -> Option<&'a Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    appointments
        .into_iter()
        .find(|appt| intervals_conflict(candidate, &appt.interval))
}
