pub mod fetcher;
pub mod snapshot;
