/// egui rendering. Every function here reads from or forwards user input to
/// [`crate::state::AppState`]; no data logic lives in this module.
pub mod pages;
pub mod panels;
pub mod plot;
