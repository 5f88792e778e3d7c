//! End-to-end session flows through the public API.

mod persistence;
mod session_flow;
