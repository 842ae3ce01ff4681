//! # Coursebook CLI
//!
//! Database seeding utilities for development and demos.
//!
//! ```ignore
//! use coursebook_cli::seeder::{seed_all, SeedConfig};
//!
//! seed_all(&pool, SeedConfig::default()).await?;
//! ```

pub mod seeder;
