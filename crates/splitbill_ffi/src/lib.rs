//! FFI facade crate for the SplitBill host app.

pub mod api;
