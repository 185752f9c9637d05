//! Business logic services for the Restaurant POS Management Platform

pub mod attendance;
pub mod catalog;
pub mod customers;
pub mod employees;
pub mod inventory;
pub mod leave;
pub mod orders;
pub mod payroll;
pub mod reporting;
pub mod stock_count;
pub mod suppliers;

pub use attendance::AttendanceService;
pub use catalog::CatalogService;
pub use customers::CustomerService;
pub use employees::EmployeeService;
pub use inventory::InventoryService;
pub use leave::LeaveService;
pub use orders::OrderService;
pub use payroll::PayrollService;
pub use reporting::ReportingService;
pub use stock_count::StockCountService;
pub use suppliers::SupplierService;
