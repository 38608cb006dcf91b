//! different utility modules used throughout the project
/// engine settings (simplification pass budget, quadrature tolerances) read from TOML
pub mod config;
/// tiny module to set up terminal and file logging
pub mod logger;
