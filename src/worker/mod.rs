//! Scheduled batch worker: pipeline, sinks and the Lambda entry point.

pub mod deliver;
pub mod handler;
pub mod pipeline;
pub mod sinks;

pub use deliver::{Distributor, Sink};
pub use handler::function_handler as handler;
pub use pipeline::Pipeline;
