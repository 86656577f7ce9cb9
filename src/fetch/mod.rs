//! Resource acquisition: locator classification, single fetches and fail-fast batches.

pub(crate) mod batch;
pub(crate) mod cancel;
pub(crate) mod fetcher;
pub(crate) mod locator;
