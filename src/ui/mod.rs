//! egui rendering. Nothing in here owns data; every function draws from and
//! writes back into [`crate::state::AppState`].

pub mod panels;
pub mod plot;
pub mod table;
pub mod views;
