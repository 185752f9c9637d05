//! Route definitions for the Restaurant POS Management Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - menu catalog
        .nest("/menu", menu_routes())
        // Protected routes - ingredients and the stock ledger
        .nest("/ingredients", ingredient_routes())
        // Protected routes - orders and refunds
        .nest("/orders", order_routes())
        // Protected routes - stock counts
        .nest("/stock-counts", stock_count_routes())
        // Protected routes - employees
        .nest("/employees", employee_routes())
        // Protected routes - attendance
        .nest("/attendance", attendance_routes())
        // Protected routes - leave requests
        .nest("/leave", leave_routes())
        // Protected routes - payroll estimation
        .nest("/payroll", payroll_routes())
        // Protected routes - customer CRM
        .nest("/customers", customer_routes())
        // Protected routes - suppliers
        .nest("/suppliers", supplier_routes())
        // Protected routes - reporting
        .nest("/reports", report_routes())
}

/// Menu catalog routes (protected)
fn menu_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/categories/:category_id", put(handlers::update_category))
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/:product_id",
            get(handlers::get_product).put(handlers::update_product),
        )
        .route(
            "/products/:product_id/recipe",
            get(handlers::get_recipe).put(handlers::set_recipe),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Ingredient and stock ledger routes (protected)
fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_ingredients).post(handlers::create_ingredient),
        )
        .route("/low-stock", get(handlers::list_low_stock))
        .route("/recompute", post(handlers::recompute_stock))
        .route(
            "/:ingredient_id",
            get(handlers::get_ingredient).put(handlers::update_ingredient),
        )
        .route("/:ingredient_id/movements", get(handlers::list_movements))
        .route("/:ingredient_id/add-stock", post(handlers::add_stock))
        .route("/:ingredient_id/adjust", post(handlers::adjust_stock))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Order routes (protected)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/refund", post(handlers::refund_order))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock count routes (protected)
fn stock_count_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_stock_counts).post(handlers::create_stock_count),
        )
        .route(
            "/:count_id",
            get(handlers::get_stock_count).delete(handlers::delete_stock_count),
        )
        .route("/:count_id/items", put(handlers::update_stock_count_items))
        .route("/:count_id/submit", post(handlers::submit_stock_count))
        .route("/:count_id/approve", post(handlers::approve_stock_count))
        .route("/:count_id/complete", post(handlers::complete_stock_count))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Employee routes (protected)
fn employee_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_employees).post(handlers::create_employee),
        )
        .route(
            "/:employee_id",
            get(handlers::get_employee).put(handlers::update_employee),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Attendance routes (protected)
fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_attendance))
        .route("/clock-in", post(handlers::clock_in))
        .route("/clock-out", post(handlers::clock_out))
        .route(
            "/active/:employee_id",
            get(handlers::get_active_attendance),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Leave request routes (protected)
fn leave_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_leave_requests).post(handlers::create_leave_request),
        )
        .route("/:request_id/approve", post(handlers::approve_leave_request))
        .route("/:request_id/reject", post(handlers::reject_leave_request))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Payroll routes (protected)
fn payroll_routes() -> Router<AppState> {
    Router::new()
        .route("/estimate", post(handlers::estimate_payroll))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Customer CRM routes (protected)
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::deactivate_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/sales/daily", get(handlers::get_daily_sales_report))
        .route("/sales/top-products", get(handlers::get_top_products_report))
        .route("/attendance", get(handlers::get_attendance_summary_report))
        .route_layer(middleware::from_fn(auth_middleware))
}
