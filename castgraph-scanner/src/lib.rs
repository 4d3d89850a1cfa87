pub mod error;
pub mod extract;
pub mod fetcher;
pub mod kind;
pub mod result;
pub mod source;

pub use error::ScanError;
pub use fetcher::WikiSource;
pub use kind::EntityKind;
pub use result::PageRecord;
pub use source::PageSource;
