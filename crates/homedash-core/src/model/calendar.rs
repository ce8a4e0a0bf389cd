// ── Calendar domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One calendar event, normalized from iCalendar.
///
/// `start` is always concrete; events without a resolvable start are
/// dropped during parsing and never reach this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Which configured calendar this event came from.
    pub calendar_name: Option<String>,
    /// Display color assigned to the calendar in config.
    pub calendar_color: Option<String>,
}
