use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use libdesk_core::{LoanStatus, Role};

#[derive(Parser)]
#[command(name = "libdesk")]
#[command(about = "libdesk CLI: manage books, members and loans on a library server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL (overrides config and LIBDESK__BASE_URL)
    #[arg(short, long, global = true, env = "LIBDESK_URL")]
    pub server: Option<String>,

    /// Credentials profile name
    #[arg(short, long, global = true, env = "LIBDESK_PROFILE")]
    pub profile: Option<String>,

    /// Config file (default ~/.libdesk/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Log at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Clone, Copy, ValueEnum, Default, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session tokens
    Login(LoginArgs),
    /// Create an account (always a USER) and log in
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show the dashboard for your role
    Dashboard,
    /// View or edit your own account
    Profile(ProfileArgs),
    /// Browse and manage the catalogue
    Books(BooksArgs),
    /// Manage library members (LIBRARIAN or ADMIN)
    Members(MembersArgs),
    /// Borrow, return and review loans
    Loans(LoansArgs),
    /// Manage user accounts (ADMIN)
    Admin(AdminArgs),
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// Username or email
    #[arg(short, long)]
    pub username: String,
    /// Password
    #[arg(long, env = "LIBDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(clap::Args)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "LIBDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
}

/// Client-side narrowing and paging of a fetched list.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive text to look for
    #[arg(long)]
    pub search: Option<String>,
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page
    #[arg(long, default_value_t = libdesk_client::DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

#[derive(clap::Args)]
pub struct BodyArgs {
    /// Path to a JSON file (reads from stdin if omitted)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommands,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show your profile
    Show,
    /// Update email or name
    Update {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    /// Change your password
    Password {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
    },
}

#[derive(clap::Args)]
pub struct BooksArgs {
    #[command(subcommand)]
    pub command: BookCommands,
}

#[derive(Subcommand)]
pub enum BookCommands {
    /// List books, filtered by title or author
    List(ListArgs),
    /// Show one book
    Get { id: i64 },
    /// Books currently on the shelf
    Available,
    /// Server-side search
    Search {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        genre: Option<String>,
    },
    /// Add a book from JSON
    Create(BodyArgs),
    /// Replace a book from JSON
    Update {
        id: i64,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Remove a book
    Delete { id: i64 },
}

#[derive(clap::Args)]
pub struct MembersArgs {
    #[command(subcommand)]
    pub command: MemberCommands,
}

#[derive(Subcommand)]
pub enum MemberCommands {
    /// List members, filtered by name or email
    List(ListArgs),
    Get { id: i64 },
    /// Server-side search
    Search {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Add a member from JSON
    Create(BodyArgs),
    /// Replace a member from JSON
    Update {
        id: i64,
        #[command(flatten)]
        body: BodyArgs,
    },
    Delete { id: i64 },
}

#[derive(clap::Args)]
pub struct LoansArgs {
    #[command(subcommand)]
    pub command: LoanCommands,
}

#[derive(Subcommand)]
pub enum LoanCommands {
    /// List all loans (LIBRARIAN or ADMIN)
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Only loans in this status
        #[arg(long)]
        status: Option<LoanStatus>,
    },
    /// Your own loans
    Mine(ListArgs),
    /// Loans past their return date
    Overdue(ListArgs),
    Get { id: i64 },
    /// Lend a book to a member
    Create {
        #[arg(long)]
        member: i64,
        #[arg(long)]
        book: i64,
        /// Borrow date as YYYY-MM-DD (default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a loan as returned
    Return { id: i64 },
    Delete { id: i64 },
    /// Loans of one member
    Member { id: i64 },
    /// Loans of one book
    Book { id: i64 },
}

#[derive(clap::Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommands,
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// List user accounts
    Users(ListArgs),
    /// Show one account
    User { id: i64 },
    /// Create an account from JSON
    Create(BodyArgs),
    /// Replace an account from JSON
    Update {
        id: i64,
        #[command(flatten)]
        body: BodyArgs,
    },
    Delete { id: i64 },
    /// Change an account's role
    Role { id: i64, role: Role },
    Enable { id: i64 },
    Disable { id: i64 },
    /// Set a new password for an account
    ResetPassword { id: i64, password: String },
    /// Account counts by role and status
    Stats,
    /// Accounts holding a role
    ByRole { role: Role },
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Set a value in the config file
    Set(ConfigSetArgs),
    /// Print the config file location
    Path,
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (base_url, request_timeout_secs, max_auth_retries, profile, credentials_dir, log_level)
    pub key: String,
    /// Value
    pub value: String,
}
