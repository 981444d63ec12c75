//! API request/response models

pub mod habits;

pub use habits::{HabitCreate, HabitUpdate};
