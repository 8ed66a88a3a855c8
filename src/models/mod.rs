pub mod client;
pub mod growth;
pub mod opportunity;

pub use client::*;
pub use growth::*;
pub use opportunity::*;
