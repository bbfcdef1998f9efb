//! Typed - typed handler API on top of the `TaskHandler` port.
//!
//! # 二層構造
//! - **表層（Typed）**: `TaskInput` trait, `Handler<T>` trait - input decoded for you
//! - **内部（Dyn）**: `TaskHandler` port - object-safe, what the loops call

pub mod handler;
pub mod task;

pub use self::handler::{Handler, TypedHandler};
pub use self::task::TaskInput;
