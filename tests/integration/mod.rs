//! Integration tests across reversible states and the widget configuration

pub mod composition_test;
pub mod widget_test;
