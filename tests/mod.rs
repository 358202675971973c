//! Test suite for the account portal
//!
//! This module organizes all tests

pub mod common;
pub mod integration;
pub mod property;
