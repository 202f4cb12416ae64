//! Features - Vertical Feature Slices
//!
//! Each feature contains its controller.

pub mod verify;
