use std::future::Future;

use crate::error::Result;
use crate::kind::EntityKind;
use crate::result::PageRecord;

/// Anything that can turn a link into a structured page record.
///
/// Any failure, transport or extraction, comes back as a `ScanError`; the
/// crawl controller treats them all the same way and abandons the link.
pub trait PageSource {
    fn fetch_and_extract(
        &self,
        link: &str,
        kind: EntityKind,
    ) -> impl Future<Output = Result<PageRecord>> + Send;
}
