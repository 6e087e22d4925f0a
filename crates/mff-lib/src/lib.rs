pub mod conditioner;
pub mod error;
pub mod io;
pub mod landmarks;
pub mod metrics;
pub mod pipeline;
pub mod plot;
pub mod signal;

pub use error::*;
pub use signal::*;
