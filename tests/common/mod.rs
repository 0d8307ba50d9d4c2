//! Hand-written fakes shared by the pipeline and sink tests.

#[allow(dead_code)]
pub mod fakes;

#[allow(unused_imports)]
pub use fakes::*;
