//! HTTP request handlers for the fake API.

pub mod calls;

pub use calls::*;
