//! Property-based tests

pub mod reversible_proptest;
