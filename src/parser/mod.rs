
pub mod filter;
pub mod summary;


pub use filter::IgnoreFilter;
pub use summary::{InfectionPair, ParsedSummary, SummaryParser, BYTES_PER_MEGABYTE};
