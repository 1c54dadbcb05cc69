pub mod aggregate;
pub mod calendar;
pub mod error;
pub mod fact;
pub mod filter;
pub mod ingest;
pub mod join;
pub mod normalize;
pub mod observability;
pub mod records;
pub mod session;

pub use aggregate::{AggregateRequest, AggregateRow, GroupBy, Metric};
pub use error::{EngineError, Result};
pub use fact::{FactRow, FactTable};
pub use filter::FilterCriteria;
pub use ingest::{ingest, CachedIngestor, SourceBundle};
pub use session::AnalysisSession;
