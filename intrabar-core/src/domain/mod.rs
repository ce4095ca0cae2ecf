//! Domain types for the intrabar engine.

pub mod bar;
pub mod event;
pub mod ids;
pub mod intent;
pub mod periodicity;

pub use bar::Bar;
pub use event::ScheduledEvent;
pub use ids::SeriesIndex;
pub use intent::{Direction, OrderIntent};
pub use periodicity::{PeriodUnit, Periodicity};
