pub mod duration;
pub mod engine;
pub mod record;
pub mod store;

pub use duration::{format_minutes, DurationParser};
pub use engine::{ExpiryEngine, Warning};
pub use record::PowerRecord;
pub use store::RecordStore;
