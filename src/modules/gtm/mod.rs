pub mod extract;

pub use extract::{extract_events, parse_export};
