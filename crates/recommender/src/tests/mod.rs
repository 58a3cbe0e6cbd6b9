//! Crate-internal test suites sharing one set of fixtures

mod fixtures;
mod property_test;
