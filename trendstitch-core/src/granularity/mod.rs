/// Per-granularity calendar arithmetic table.
pub mod calendar;
/// Granularity selection and block counting.
pub mod resolve;

pub use calendar::{CALENDARS, Calendar, calendar};
pub use resolve::{Resolution, resolve};
