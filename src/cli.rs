use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line back-office for the GreenTech CMS
#[derive(Parser)]
#[command(name = "greentech-admin")]
#[command(about = "Manage GreenTech site content from the terminal", long_about = None)]
pub struct Cli {
    /// TOML config file (defaults to config.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ResourceKind {
    About,
    Hero,
    Notices,
    FaqChat,
    YoutubeShort,
    Domain,
    Courses,
    Modules,
    Certificate,
    TechStack,
    StudentSuccess,
    CareerImpact,
    EnrollCards,
    Enrollments,
}

/// `--set k=v` and `--file k=path` pairs shared by create and update.
#[derive(clap::Args, Debug, Default)]
pub struct FieldArgs {
    /// Field value, e.g. --set title="Solar basics"
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_key_val::<String>)]
    pub set: Vec<(String, String)>,
    /// File to upload, e.g. --file images=./banner.png (repeat for galleries)
    #[arg(long = "file", value_name = "FIELD=PATH", value_parser = parse_key_val::<PathBuf>)]
    pub files: Vec<(String, PathBuf)>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// List records with filters and pagination
    List {
        resource: ResourceKind,
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        domain: Option<i64>,
        #[arg(long)]
        course: Option<i64>,
        /// Only active records
        #[arg(long, conflicts_with = "inactive")]
        active: bool,
        /// Only inactive records
        #[arg(long)]
        inactive: bool,
        #[arg(long)]
        oldest_first: bool,
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the form fields of a resource
    Fields { resource: ResourceKind },
    /// Create a record
    Create {
        resource: ResourceKind,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Edit a record; unspecified fields keep their current values
    Update {
        resource: ResourceKind,
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Flip a record's active flag
    Toggle { resource: ResourceKind, id: i64 },
    /// Delete a record after typed confirmation
    Delete {
        resource: ResourceKind,
        id: i64,
        /// Confirmation text; prompted for when omitted
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Email enrollment contacts
    BulkEmail {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        /// Recipient address (repeatable); every enrollment when omitted
        #[arg(long = "to")]
        to: Vec<String>,
    },
    /// Resolve a stored image path to a full URL
    ImageUrl { path: String },
}

fn parse_key_val<V: From<String>>(s: &str) -> Result<(String, V), String> {
    let (k, v) = s.split_once('=').ok_or_else(|| format!("expected FIELD=VALUE, got `{s}`"))?;
    if k.trim().is_empty() { return Err(format!("missing field name in `{s}`")); }
    Ok((k.trim().to_string(), V::from(v.to_string())))
}
