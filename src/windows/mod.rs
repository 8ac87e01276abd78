//! MumbleLink shared memory access
//!
//! Maps the named link segment directly, following the consumer-side rules
//! the game imposes:
//!
//! - The region must exist at its full footprint (header + context +
//!   description tail) before the game will begin writing telemetry, so the
//!   consumer *creates* the mapping rather than opening an existing one;
//!   whichever process maps the name first wins and later mappings reuse it.
//! - There is no data-valid event object; consumers poll on their own
//!   cadence and judge validity by the tick field.

mod segment;

pub use segment::SharedSegment;
