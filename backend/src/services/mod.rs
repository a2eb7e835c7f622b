//! Business logic services for the godown inventory server

pub mod admin;
pub mod alert;
pub mod company;
pub mod godown;
pub mod inventory;
pub mod movement;
pub mod product;
pub mod reporting;
pub mod unit_type;

#[cfg(test)]
pub(crate) mod test_support;

pub use admin::AdminService;
pub use alert::AlertService;
pub use company::CompanyService;
pub use godown::GodownService;
pub use inventory::InventoryService;
pub use movement::MovementService;
pub use product::ProductService;
pub use reporting::ReportingService;
pub use unit_type::UnitTypeService;
