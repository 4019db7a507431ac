//! Knobs read by test suites from the CI environment.

pub mod property_test_profile;
