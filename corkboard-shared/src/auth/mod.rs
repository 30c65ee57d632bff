//! Authentication and authorization utilities
//!
//! # Modules
//!
//! - [`password`]: Argon2id password hashing and strength validation
//! - [`jwt`]: JWT token generation and validation
//! - [`middleware`]: Authentication context carried through requests
//! - [`authorization`]: Project-role and system-role guards
//!
//! # Security Features
//!
//! - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
//! - **JWT Tokens**: HS256 signing with access/refresh split
//! - **Constant-time Comparison**: Verification uses constant-time operations
//!
//! # Example
//!
//! ```no_run
//! use corkboard_shared::auth::password::{hash_password, verify_password};
//! use corkboard_shared::auth::jwt::{create_token, Claims, TokenType};
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("user_password")?;
//! assert!(verify_password("user_password", &hash)?);
//!
//! let claims = Claims::new(Uuid::new_v4(), TokenType::Access);
//! let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
