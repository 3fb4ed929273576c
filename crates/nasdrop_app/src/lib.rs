//! Command-line front end for nasdrop: configuration and request running.
pub mod config;
pub mod runner;
