//! Shared data structures for the recommendation services
//!
//! - Fertilizer: requests, dosage table rows, land-scaled options, results
//! - Crop: soil/climate feature readings and predictions

mod crop;
mod fertilizer;

pub use crop::*;
pub use fertilizer::*;
