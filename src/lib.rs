//! # Coursebook API
//!
//! A learning-management REST backend built with Axum and PostgreSQL: accounts with
//! JWT access/refresh tokens, teacher and student roles, courses with weekly
//! schedules, enrollments and grades.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Bearer auth, role guards, per-IP rate limiting
//! ├── modules/          # Feature modules
//! │   ├── auth/        # Signup, login, refresh, logout, password reset
//! │   ├── users/       # Profile, avatar, change password
//! │   ├── teachers/    # Role toggle, teacher profile, grading
//! │   ├── courses/     # Course CRUD, schedules, reports
//! │   └── enrollments/ # Student enrollments
//! └── utils/           # Email delivery
//! ```
//!
//! Each feature module has a `controller.rs` (handlers with OpenAPI annotations),
//! a `service.rs` (queries and business rules) and a `router.rs`. Models live in
//! the `coursebook-models` crate.
//!
//! ## Roles
//!
//! Every account is a student or a teacher, never both. Signup creates a student;
//! an existing teacher can grant or revoke teacher status on another account. The
//! first teacher is created with `coursebook-cli create-teacher`.
//!
//! ## Authentication
//!
//! - **Access token**: short-lived (default 15 minutes), sent as `Authorization: Bearer`
//! - **Refresh token**: long-lived (default 7 days), rotated on every refresh
//! - **Reset token**: one-hour, single-use password reset token
//!
//! ## API documentation
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

// Re-export workspace crates for convenience
pub use coursebook_auth;
pub use coursebook_cache;
pub use coursebook_config;
pub use coursebook_core;
pub use coursebook_db;
pub use coursebook_models;
