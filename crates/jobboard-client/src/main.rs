//! Command-line front end for the job-board API.
//!
//! The session token is kept in the config directory (mirrored to the OS
//! keyring) so that `login` and later commands share it.
//!
//! # Examples
//!
//! ```sh
//! jobboard login --email ada@example.com --password s3cret
//! jobboard jobs list --search rust --type FULL_TIME --salary-min 3000
//! jobboard jobs show 0b7c…
//! JOBBOARD_API_BASE=https://jobs.example.com jobboard session
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobboard_client::api::ApiClient;
use jobboard_client::auth::{CredentialStore, FileCredentialStore};
use jobboard_client::config::ConfigManager;
use jobboard_client::navigation::TracingNavigator;
use jobboard_client::stores::{AuthStore, JobsStore};
use jobboard_client::types::{Job, JobFiltersUpdate, RegisterRequest, Role, SalaryRange};

#[derive(Parser)]
#[command(name = "jobboard", version, about = "Job-board API client")]
struct Cli {
    /// API base URL (overrides config and JOBBOARD_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in with it
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, value_enum, default_value = "job-seeker")]
        role: RoleArg,
    },
    /// End the session
    Logout,
    /// Show who the stored token belongs to
    Session,
    /// Ask for a password reset link
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with a reset token
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
    },
    /// Browse and manage job postings
    #[command(subcommand)]
    Jobs(JobsCommand),
    /// Check that the API answers
    Health,
}

#[derive(Subcommand)]
enum JobsCommand {
    /// List postings, optionally filtered
    List(ListArgs),
    /// Show one posting
    Show { id: String },
    /// List featured postings
    Featured,
    /// Delete a posting
    Delete { id: String },
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    limit: u32,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// FULL_TIME, PART_TIME, CONTRACT or INTERNSHIP
    #[arg(long = "type")]
    job_type: Option<String>,
    /// ENTRY, JUNIOR, MID, SENIOR or LEAD
    #[arg(long)]
    experience: Option<String>,
    #[arg(long)]
    salary_min: Option<f64>,
    #[arg(long)]
    salary_max: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    JobSeeker,
    Hr,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::JobSeeker => Role::JobSeeker,
            RoleArg::Hr => Role::Hr,
            RoleArg::Admin => Role::Admin,
        }
    }
}

fn print_job_line(job: &Job) {
    let remote = if job.is_remote { " (remote)" } else { "" };
    println!(
        "{}  {}  [{} / {}]  {}{}  {}",
        job.id, job.title, job.job_type, job.experience, job.location, remote, job.salary
    );
}

fn print_job(job: &Job) {
    println!("{}", job.title);
    println!("  id:         {}", job.id);
    println!("  location:   {}{}", job.location, if job.is_remote { " (remote)" } else { "" });
    println!("  type:       {} / {}", job.job_type, job.experience);
    println!("  category:   {}", job.category);
    println!("  salary:     {}", job.salary);
    if !job.skills.is_empty() {
        println!("  skills:     {}", job.skills.join(", "));
    }
    println!("  posted:     {}", job.created_at.format("%Y-%m-%d"));
    println!();
    println!("{}", job.description);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = ConfigManager::new()
        .context("Failed to load configuration")?
        .get()
        .with_api_base_override(cli.api_base);
    tracing::debug!("Using API at {}", config.api_base);

    let credentials: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new().context("Failed to open credential store")?);
    let client = Arc::new(
        ApiClient::builder(config.to_client_config())
            .credentials(credentials)
            .navigator(Arc::new(TracingNavigator))
            .build()?,
    );

    let auth = AuthStore::new(client.clone());
    let jobs = JobsStore::new(client.clone());

    match cli.command {
        Command::Login { email, password } => {
            let payload = auth.login(&email, &password).await?;
            println!("Signed in as {}", payload.user.display_name());
        }
        Command::Register {
            email,
            password,
            first_name,
            last_name,
            role,
        } => {
            let request = RegisterRequest {
                email,
                password,
                first_name,
                last_name,
                role: role.into(),
            };
            let payload = auth.register(&request).await?;
            println!("Registered and signed in as {}", payload.user.display_name());
        }
        Command::Logout => {
            auth.logout().await?;
            println!("Signed out");
        }
        Command::Session => match auth.check_auth().await? {
            Some(user) => println!("{} <{}> ({:?})", user.display_name(), user.email, user.role),
            None => println!("Not signed in"),
        },
        Command::ForgotPassword { email } => {
            auth.request_password_reset(&email).await?;
            println!("If an account exists for {email}, a reset link is on its way");
        }
        Command::ResetPassword { token, password } => {
            auth.reset_password(&token, &password).await?;
            println!("Password updated");
        }
        Command::Jobs(JobsCommand::List(args)) => {
            jobs.set_page(args.page).await;
            jobs.set_items_per_page(args.limit).await;
            jobs.set_filters(JobFiltersUpdate {
                search: args.search,
                location: args.location,
                category: args.category,
                job_type: args.job_type,
                experience: args.experience,
                salary: Some(SalaryRange {
                    min: args.salary_min,
                    max: args.salary_max,
                }),
            })
            .await;

            let list = jobs.fetch_jobs().await?;
            for job in &list.jobs {
                print_job_line(job);
            }
            println!(
                "-- page {} of {} ({} jobs)",
                args.page,
                jobs.total_pages().await,
                list.total
            );
        }
        Command::Jobs(JobsCommand::Show { id }) => {
            let job = jobs.fetch_job_by_id(&id).await?;
            print_job(&job);
        }
        Command::Jobs(JobsCommand::Featured) => {
            let list = jobs.fetch_featured_jobs().await?;
            if list.jobs.is_empty() {
                println!("No featured jobs");
            }
            for job in &list.jobs {
                print_job_line(job);
            }
        }
        Command::Jobs(JobsCommand::Delete { id }) => {
            jobs.delete_job(&id).await?;
            println!("Deleted {id}");
        }
        Command::Health => {
            let response = client.get::<serde_json::Value>("/health").await?;
            println!("{}", response.data);
        }
    }

    Ok(())
}
