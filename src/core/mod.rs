/// Core functionality modules
///
/// Contains the main business logic for command recording,
/// retrieval, searching, statistics and retention.

pub mod aggregator;
pub mod filter;
pub mod pruner;
pub mod recorder;
pub mod retriever;
pub mod searcher;

pub use aggregator::Aggregator;
pub use filter::{is_excluded, ExclusionFilter};
pub use pruner::Pruner;
pub use recorder::{RecordOutcome, Recorder};
pub use retriever::Retriever;
pub use searcher::Searcher;
