//! HTTP handlers for the Restaurant POS Management Platform

mod attendance;
mod catalog;
mod customers;
mod employees;
mod health;
mod inventory;
mod leave;
mod orders;
mod payroll;
mod reporting;
mod stock_count;
mod suppliers;

pub use attendance::*;
pub use catalog::*;
pub use customers::*;
pub use employees::*;
pub use health::*;
pub use inventory::*;
pub use leave::*;
pub use orders::*;
pub use payroll::*;
pub use reporting::*;
pub use stock_count::*;
pub use suppliers::*;
