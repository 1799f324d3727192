#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

pub mod decode;
pub mod encode;
pub mod node;
pub mod store;
pub mod tree;

mod cursor;
mod teardown;

pub use decode::{decode, decode_range, decode_with};
pub use encode::encode;
pub use node::{Kind, NodeId, Value};
pub use store::{Arena, NodeStore};
pub use tree::{Document, Item};
