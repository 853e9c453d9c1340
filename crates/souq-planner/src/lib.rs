//! souq-planner
//!
//! Search planning over a bilingual catalog: split the query by script, build
//! prefix token queries, walk the strategy cascade against a `CatalogIndex`,
//! merge scores per record, apply structured filters and truncate.

pub mod cascade;
pub mod filter;
pub mod merge;
pub mod planner;
pub mod segment;
pub mod token_query;

pub use cascade::{CascadeController, CascadeOutcome, CascadeState};
pub use filter::FilterSpec;
pub use merge::ScoredResultSet;
pub use planner::{RankedProduct, SearchOutcome, SearchPlanner, SearchRequest};
pub use segment::{segment, Segment, SegmentedQuery};
