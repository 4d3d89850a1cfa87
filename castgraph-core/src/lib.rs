pub mod analyze;
pub mod crawl;
pub mod data;
pub mod error;
pub mod frontier;
pub mod graph;
pub mod model;
pub mod query;
pub mod snapshot;
pub mod weight;

pub use crawl::{CrawlConfig, CrawlController, CrawlReport, CrawlState, CrawlStats, ProgressCallback};
pub use error::{GraphError, PersistError};
pub use frontier::FrontierScheduler;
pub use graph::GraphStore;
pub use model::{EntityKind, Vertex};
pub use snapshot::{GraphSnapshot, VertexRecord};
pub use weight::EdgeWeightPolicy;
