// Nested protections and booking limits for the fare classes of an airline cabin

pub mod bucket;
pub mod bucket_holder;
pub mod cursor;
pub mod report;

// Re-export key types for convenience
pub use bucket::{Bucket, FareClass};
pub use bucket_holder::{BucketHolder, HolderConfig, HolderError, DEFAULT_CABIN_CAPACITY};
pub use cursor::PairCursor;
pub use report::{ClassSnapshot, HolderInput, HolderSnapshot};
