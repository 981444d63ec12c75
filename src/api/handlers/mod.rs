pub mod habits;
pub mod system;

pub use habits::*;
pub use system::*;

use crate::auth::jwt::TokenService;
use crate::db::repository::{HabitRepository, UserRepository};
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repo: Arc<UserRepository>,
    pub habit_repo: Arc<HabitRepository>,
    pub tokens: Arc<TokenService>,
    pub bcrypt_cost: u32,
}
