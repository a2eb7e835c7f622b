//! HTTP handlers

pub mod admin;
pub mod alert;
pub mod company;
pub mod godown;
pub mod health;
pub mod movement;
pub mod product;
pub mod reporting;
pub mod unit_type;

pub use admin::*;
pub use alert::*;
pub use company::*;
pub use godown::*;
pub use health::*;
pub use movement::*;
pub use product::*;
pub use reporting::*;
pub use unit_type::*;
