//! The resume pipeline: validate, store, render.

pub mod handlers;
pub mod store;
pub mod validation;
