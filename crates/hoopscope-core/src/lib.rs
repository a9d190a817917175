// Library root: court geometry, payload model, event flattening, summaries
// and view filtering. No I/O lives here.

pub mod event;
pub mod filter;
pub mod geometry;
pub mod normalize;
pub mod payload;
pub mod summary;
