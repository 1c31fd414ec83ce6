use crate::domain::value_objects::Timestamp;
use chrono::NaiveDate;

/// Basic clock trait - provides current time.
///
/// The engine never reads the system clock directly; injecting this keeps
/// day-rollover behavior (OHLC buckets) testable.
pub trait Clock: Send + Sync {
    /// Get current time from this clock's perspective
    fn now(&self) -> Timestamp;

    /// Get current time as milliseconds since Unix epoch
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// The calendar day trades are bucketed under.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
