//! UI module - reusable widgets and layout math

pub mod components;
