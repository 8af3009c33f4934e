//! # Unit Components
//!
//! This module organizes the tests for each building block of the model: the
//! protection unit itself, the gate in front of it, the downstream side, and
//! the configuration and statistics layers around them.




/// Configuration parsing and building tests.
pub mod config;
