//! HTTP middleware for the Restaurant POS Management Platform

mod auth;

pub use auth::{auth_middleware, check_permission, require_role, AuthUser, CurrentUser};
