//! # Child abstractions and specifications.
//!
//! This module provides the child-facing types:
//! - [`Child`] - trait for implementing async cancelable child bodies
//! - [`ChildFn`] - function-backed child implementation
//! - [`ChildRef`] - shared reference to a child (`Arc<dyn Child>`)
//! - [`ChildSpec`] - specification bundling a child with its restart policy
//!
//! The crate-internal [`record`] submodule holds the live per-child state the
//! supervisor's control loop manages (cancellation handle, restart counter,
//! exit reporting).

mod child;
pub(crate) mod record;
mod spec;

pub use child::{BoxChildFuture, Child, ChildFn, ChildRef};
pub use spec::ChildSpec;
