pub mod history;
pub mod predict;
