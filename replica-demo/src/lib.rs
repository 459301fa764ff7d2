#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

use replica::{DeepCopy, Object, builtins};

mod error;
pub use error::DemoError;

mod people;
pub use people::*;

mod fixed_list;
pub use fixed_list::FixedListPlugin;

mod family;
pub use family::*;

mod check;
pub use check::check_copy;

/// The engine the demonstration copies with.
///
/// Extended people come from an instance supplier since their constructor
/// rejects blank instances. Decimals are wrappers already; registering them
/// again changes nothing. Empty lists are shared through a predicate, and
/// fixed-size lists get their own plugin ahead of the built-in ones.
pub fn engine() -> DeepCopy {
    DeepCopy::builder()
        .instance_supplier(&MAN_EXTENDED, || Object::blank(&MAN_EXTENDED))
        .wrapper(&builtins::DECIMAL)
        .wrapper_predicate(|shape| shape == &EMPTY_LIST)
        .plugin(FixedListPlugin, 1)
        .build()
}
