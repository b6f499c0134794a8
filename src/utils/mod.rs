//! Request helpers shared by the handlers.

pub mod validate;
