// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Account credentials and bearer tokens for the SaveKaro API.
//!
//! ## Auth Flow
//!
//! 1. Client registers (`POST /api/users`) or logs in (`POST /api/users/login`)
//! 2. Server verifies the password against its PBKDF2 hash and returns an
//!    HS256 JWT whose `sub` is the user id
//! 3. Client sends `Authorization: Bearer <token>` on every expense request
//! 4. The [`Auth`] extractor verifies signature and expiry, then loads the
//!    account so deleted users are rejected
//!
//! ## Security
//!
//! - All expense endpoints require authentication
//! - Clock skew tolerance is 60 seconds
//! - Ownership mismatches are reported as 401, the same as bad credentials

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod token;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use password::{hash_password, normalize_email, verify_password, PasswordError};
pub use token::TokenIssuer;
