//! View models behind the screens. Plain data, no UI or network types, so the
//! rules live here and the components only wire them to signals.

pub mod cascade;
pub mod form;
pub mod listing;
pub mod report;

/// Parses the value of an id `<select>`; the empty option maps to `None`.
pub fn parse_id(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}
