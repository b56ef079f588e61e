//! Remote synchronization seams.
//!
//! Only the outbound mirror contract lives here; concrete remote clients are
//! supplied by the embedding app.

pub mod mirror;
