//! Resilient round-robin stream multiplexer
//!
//! Merges delimiter-separated records from many byte sources into one
//! stream, one record per source per turn, while bounding how long any single
//! source may stall a read.
//!
//! Import everything you need with: `use rrmux::prelude::*;`

pub mod app;
pub mod io;
pub mod mux;
pub mod prelude;
pub mod source;
