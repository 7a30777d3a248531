//! Journal records and the lifecycle that keeps them consistent with their
//! media blobs.

pub mod error;
pub mod lifecycle;
pub mod period;
pub mod postgres;
pub mod record;
pub mod repository;

pub use error::JournalError;
pub use lifecycle::{DayMood, JournalLifecycle, MonthListing};
pub use period::MonthPeriod;
pub use postgres::SeaOrmJournalRepository;
pub use record::{JournalRecord, MediaKind};
pub use repository::{JournalRepository, MemoryJournalRepository};
