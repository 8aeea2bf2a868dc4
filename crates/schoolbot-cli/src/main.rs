use clap::{Parser, Subcommand};
use dialoguer::Input;
use dotenvy::dotenv;
use schoolbot_cli::admin::{Stats, create_admin};
use schoolbot_cli::seeder::{self, SeedConfig};
use schoolbot_config::StorageConfig;
use schoolbot_db::{Repository, apply_import};
use schoolbot_models::{ImportStudentDto, UserIdentity};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schoolbot-cli")]
#[command(about = "Schoolbot CLI - Administrative tools for the school bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grant the admin role to a chat identity
    CreateAdmin {
        /// Chat identity of the new admin
        #[arg(short = 'i', long)]
        identity: Option<i64>,

        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,
    },
    /// Seed the data directory with fake students and teachers
    Seed {
        /// Class names (defaults to Grade 1..Grade 6)
        #[arg(short = 'c', long = "class")]
        classes: Vec<String>,

        /// Number of students per class
        #[arg(long, default_value = "25")]
        students: usize,

        /// Number of unclaimed teacher records
        #[arg(long, default_value = "5")]
        teachers: usize,
    },
    /// Import students from a JSON document
    ImportStudents {
        /// Path to a JSON array of { name, class, parent_id?, schedule? }
        file: PathBuf,
    },
    /// Print collection statistics
    Stats,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    let storage = StorageConfig::from_env();

    let repo = match Repository::open(&storage).await {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("❌ Failed to open data directory: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::CreateAdmin { identity, name } => {
            handle_create_admin(&repo, identity, name).await
        }
        Commands::Seed {
            classes,
            students,
            teachers,
        } => handle_seed(&repo, classes, students, teachers).await,
        Commands::ImportStudents { file } => handle_import(&repo, file).await,
        Commands::Stats => handle_stats(&repo).await,
    }
}

fn prompt<T>(label: &str) -> T
where
    T: Clone + ToString + std::str::FromStr,
    <T as std::str::FromStr>::Err: ToString,
{
    match Input::<T>::new().with_prompt(label).interact_text() {
        Ok(value) => value,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", label.to_lowercase(), e);
            std::process::exit(1);
        }
    }
}

async fn handle_create_admin(repo: &Repository, identity: Option<i64>, name: Option<String>) {
    let identity = identity.unwrap_or_else(|| prompt::<i64>("Chat identity"));
    let name = name.unwrap_or_else(|| prompt::<String>("Name"));

    match create_admin(repo, UserIdentity(identity), &name).await {
        Ok(user) => {
            println!("\n✅ Admin ready!");
            println!("   Identity: {}", user.identity);
            println!("   Name: {}", user.display_name());
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_seed(repo: &Repository, classes: Vec<String>, students: usize, teachers: usize) {
    let config = SeedConfig::new(classes, students).with_teachers(teachers);

    match seeder::seed(repo, config).await {
        Ok(report) => {
            println!("✅ Created {} students", report.students);
            for id in report.teachers {
                println!("   Teacher id: {}", id);
            }
        }
        Err(e) => {
            eprintln!("\n❌ Error seeding data: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_import(repo: &Repository, file: PathBuf) {
    let bytes = match tokio::fs::read(&file).await {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", file.display(), e);
            std::process::exit(1);
        }
    };

    let rows = match ImportStudentDto::parse_document(&bytes) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("❌ {} is not a valid import document: {}", file.display(), e);
            std::process::exit(1);
        }
    };

    match repo.transaction(|tx| Ok(apply_import(tx, rows))).await {
        Ok(report) => {
            println!(
                "✅ Imported {} students ({} linked to parents)",
                report.created.len(),
                report.linked
            );
            for rejection in report.rejected {
                println!("   ⚠️  Row {} skipped: {}", rejection.row, rejection.reason);
            }
        }
        Err(e) => {
            eprintln!("\n❌ Error importing students: {}", e);
            std::process::exit(1);
        }
    }
}

async fn handle_stats(repo: &Repository) {
    let stats = repo.read(Stats::collect).await;
    println!("Users:     {} ({} admins, {} parents)", stats.users, stats.admins, stats.parents);
    println!(
        "Students:  {} ({} linked, {} pending) in {} classes",
        stats.students, stats.students_linked, stats.students_pending, stats.classes
    );
    println!(
        "Teachers:  {} ({} claimed)",
        stats.teachers, stats.teachers_linked
    );
}
