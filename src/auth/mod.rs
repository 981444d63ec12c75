//! Authentication module
//!
//! This module provides authentication functionality including:
//! - User registration and login
//! - JWT token issuance and verification
//! - Password hashing and verification
//! - The auth gate middleware for protected routes

pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use handlers::{get_me, login, register};
pub use jwt::{AuthFailure, Claims, TokenService};
pub use middleware::{authenticate, AuthUser};
pub use password::{hash_password_with_cost, verify_password, MAX_BCRYPT_COST, MIN_BCRYPT_COST};
