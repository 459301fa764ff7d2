#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod def;
pub use def::*;

mod shape;
pub use shape::*;

mod scalar;
pub use scalar::*;

mod data;
pub use data::*;

mod value;
pub use value::*;

mod collections;
pub use collections::*;

mod semantics;
pub use semantics::*;

mod error;
pub use error::*;

pub mod builtins;
