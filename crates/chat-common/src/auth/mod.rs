//! Authentication utilities

mod jwt;

pub use jwt::{Claims, JwtService, TokenType};
