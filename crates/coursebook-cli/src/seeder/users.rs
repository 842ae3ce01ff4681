//! Fake teachers and students.

use fake::Fake;
use fake::faker::name::en::*;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;
use uuid::Uuid;

use super::models::{SeedRole, UserSeed};

/// Email domain shared by every seeded account; `clear_all` deletes by it.
pub const SEED_EMAIL_DOMAIN: &str = "example.com";

pub fn generate_users(role: SeedRole, count: usize, password_hash: &str) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();

            let email = format!(
                "{}.{}+{}{}@{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                role.prefix(),
                idx,
                SEED_EMAIL_DOMAIN
            );

            UserSeed {
                first_name,
                last_name,
                email,
                password_hash: password_hash.to_string(),
                role,
            }
        })
        .collect()
}

/// Inserts users with their role rows. Returns the role-row ids
/// (teacher or student ids) in input order.
pub async fn seed_users(
    db: &PgPool,
    users: &[UserSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let mut tx = db.begin().await?;

    // 4 params per user
    const BATCH_SIZE: usize = 1000;

    let mut role_ids = Vec::with_capacity(users.len());
    for chunk in users.chunks(BATCH_SIZE) {
        let user_ids = insert_users_chunk(&mut tx, chunk).await?;
        for (user_id, seed) in user_ids.into_iter().zip(chunk) {
            let id: Uuid = sqlx::query_scalar(&format!(
                "INSERT INTO {} (user_id) VALUES ($1) RETURNING id",
                seed.role.table()
            ))
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
            role_ids.push(id);
        }
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} users in {:?}",
        role_ids.len(),
        start_time.elapsed()
    );

    Ok(role_ids)
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    if users.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from("INSERT INTO users (first_name, last_name, email, password) VALUES ");

    for i in 0..users.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 4;
        query.push_str(&format!("(${}, ${}, ${}, ${})", p + 1, p + 2, p + 3, p + 4));
    }

    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for user in users {
        q = q
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash);
    }

    let ids: Vec<Uuid> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}
