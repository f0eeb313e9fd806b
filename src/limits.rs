//! Hard bounds on input sizes. Requests past these are rejected, not truncated.

pub const MAX_RESOURCES: usize = 1_024;
pub const MAX_APPOINTMENTS_PER_RESOURCE: usize = 10_000;

pub const MAX_ID_LEN: usize = 128;
pub const MAX_NAME_LEN: usize = 256;
pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_DETAILS_LEN: usize = 4_096;

/// Slot granularity accepted by the enumerator over the wire, in minutes.
pub const MIN_SLOT_MINUTES: u32 = 1;
pub const MAX_SLOT_MINUTES: u32 = 24 * 60;

pub const MAX_REQUEST_LINE_LEN: usize = 64 * 1024;
