#![doc = include_str!("../README.md")]

mod error;
mod formatter;
mod generator;
mod state;
mod vocabulary;

pub use crate::error::*;
pub use crate::formatter::*;
pub use crate::generator::*;
pub use crate::state::*;
pub use crate::vocabulary::*;
