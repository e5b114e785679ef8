#![doc = include_str!("../README.md")]

mod body;
mod client;
mod common;

pub use body::*;
pub use client::*;
pub use common::*;
// Public re-export so downstream crates can access `dcw` via
// `dcw_dispatch::dcw`
pub use dcw;
