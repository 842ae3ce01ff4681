use clap::{Parser, Subcommand};
use coursebook_cli::seeder::{self, SeedConfig};
use coursebook_core::hash_password;
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "coursebook-cli")]
#[command(about = "Coursebook CLI - administrative tools for Coursebook", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a teacher account
    CreateTeacher {
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (prompted if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed demo accounts, the CS101 course and fake data
    Seed {
        #[arg(long, default_value = "5")]
        teachers: usize,

        #[arg(long, default_value = "50")]
        students: usize,

        #[arg(long, default_value = "3")]
        courses_per_teacher: usize,

        #[arg(long, default_value = "3")]
        enrollments_per_student: usize,

        /// Only the demo accounts and CS101
        #[arg(long)]
        demo_only: bool,
    },
    /// Remove all seeded accounts and their data
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match coursebook_db::init_db_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Migrate => coursebook_db::run_migrations(&pool)
            .await
            .map(|_| println!("✅ Migrations applied"))
            .map_err(Into::into),
        Commands::CreateTeacher {
            first_name,
            last_name,
            email,
            password,
        } => handle_create_teacher(&pool, first_name, last_name, email, password).await,
        Commands::Seed {
            teachers,
            students,
            courses_per_teacher,
            enrollments_per_student,
            demo_only,
        } => {
            if demo_only {
                seeder::seed_demo(&pool).await
            } else {
                let config = SeedConfig {
                    teachers,
                    students,
                    courses_per_teacher,
                    enrollments_per_student,
                };
                seeder::seed_all(&pool, config).await
            }
        }
        Commands::ClearSeed => seeder::clear_all(&pool).await.map(|_| ()),
    };

    if let Err(e) = result {
        eprintln!("\n❌ {}", e);
        std::process::exit(1);
    }
}

fn prompt(value: Option<String>, label: &str) -> Result<String, dialoguer::Error> {
    match value {
        Some(v) => Ok(v),
        None => Input::new().with_prompt(label).interact_text(),
    }
}

async fn handle_create_teacher(
    pool: &PgPool,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let first_name = prompt(first_name, "First name")?;
    let last_name = prompt(last_name, "Last name")?;
    let email = prompt(email, "Email address")?.trim().to_lowercase();
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    coursebook_core::validate_password_strength(&password)
        .map_err(|_| "Password must contain an uppercase letter, a lowercase letter and a number")?;
    if password.len() < coursebook_core::password::MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 8 characters".into());
    }

    let hashed = hash_password(&password).map_err(|e| e.message())?;

    let mut tx = pool.begin().await?;

    let user_id = sqlx::query_scalar::<_, uuid::Uuid>(
        "INSERT INTO users (first_name, last_name, email, password)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(&first_name)
    .bind(&last_name)
    .bind(&email)
    .bind(&hashed)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| format!("A user with email {} already exists", email))?;

    sqlx::query("INSERT INTO teachers (user_id) VALUES ($1)")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    println!("\n✅ Teacher created successfully!");
    println!("   Email: {}", email);
    println!("   Name: {} {}", first_name, last_name);
    Ok(())
}
