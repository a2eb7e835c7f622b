//! Domain models for the godown inventory platform

mod alert;
mod godown;
mod movement;
mod product;
mod report;

pub use alert::*;
pub use godown::*;
pub use movement::*;
pub use product::*;
pub use report::*;
