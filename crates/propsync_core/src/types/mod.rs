//! Composite value kinds.

mod color;
mod light;
mod location;
mod schedule;
mod television;

pub use color::Color;
pub use light::{ColoredLight, DimmedLight};
pub use location::Location;
pub use chrono::{Month, Weekday};
pub use schedule::{Schedule, ScheduleType, ScheduleUnit};
pub use television::{InputValue, PlaybackCommand, Television};
