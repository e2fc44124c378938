//! Domain types shared by the editing layer.

pub mod errors;
pub mod model;
