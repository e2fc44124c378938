//! Editing layer reconciling the text view with the host's data model.

pub mod adapter;
pub mod collaborators;
pub mod controller;
pub mod session;
