//! Configuration management for the Restaurant POS Management Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with RPOS_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Attendance and overtime rules
    pub attendance: AttendanceConfig,

    /// Payroll estimation parameters
    pub payroll: PayrollConfig,

    /// Reference-data cache configuration
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for validating JWT tokens issued by the auth platform
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AttendanceConfig {
    /// Unpaid break deducted from each shift, in hours
    pub break_hours: rust_decimal::Decimal,

    /// Normal working hours per day before overtime starts
    pub normal_hours_per_day: rust_decimal::Decimal,

    /// Overtime pay multiplier (e.g. 1.5)
    pub ot_multiplier: rust_decimal::Decimal,

    /// Shift start used for the late flag, "HH:MM" local time
    pub shift_start: String,

    /// Minutes after shift start before a clock-in counts as late
    pub late_grace_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PayrollConfig {
    /// Standard working days per month for monthly-rate staff
    pub standard_days_per_month: u32,

    /// Standard working hours per day for hourly-equivalent rates
    pub standard_hours_per_day: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Time-to-live for cached reference data (products, categories), seconds
    pub ttl_seconds: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("RPOS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("attendance.break_hours", "1")?
            .set_default("attendance.normal_hours_per_day", "8")?
            .set_default("attendance.ot_multiplier", "1.5")?
            .set_default("attendance.shift_start", "09:00")?
            .set_default("attendance.late_grace_minutes", 15)?
            .set_default("payroll.standard_days_per_month", 26)?
            .set_default("payroll.standard_hours_per_day", 8)?
            .set_default("cache.ttl_seconds", 300)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (RPOS_ prefix)
            .add_source(
                Environment::with_prefix("RPOS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
