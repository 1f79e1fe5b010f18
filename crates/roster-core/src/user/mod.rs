//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: `User` record, `NewUser` draft and `UserPatch`
//!
//! # Usage
//!
//! ```ignore
//! use roster_core::user::{User, NewUser, UserPatch, UserStatus};
//! ```

mod model;

pub use model::{NewUser, User, UserPatch, UserStatus};
