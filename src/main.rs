mod cli;

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, FieldArgs, ResourceKind};
use greentech_admin::config::AdminConfig;
use greentech_admin::entities::*;
use greentech_admin::form::{FileUpload, FormDraft};
use greentech_admin::list::{ListQuery, SortOrder, Toast, ToastLevel, DELETE_WORD};
use greentech_admin::resource::Resource;
use greentech_admin::Admin;

/// Per-resource work, independent of the concrete entity type.
enum Action {
    List { query: ListQuery, json: bool },
    Fields,
    Create(FieldArgs),
    Update(i64, FieldArgs),
    Toggle(i64),
    Delete { id: i64, confirm: Option<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AdminConfig::load(cli.config.as_deref())?;
    let admin = Admin::connect(config).await?;

    match cli.command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password: ")?,
            };
            admin.login(&email, &password).await?;
            println!("Logged in as {email}");
        }
        Commands::Logout => {
            admin.logout().await?;
            println!("Logged out");
        }
        Commands::List {
            resource,
            search,
            domain,
            course,
            active,
            inactive,
            oldest_first,
            page,
            json,
        } => {
            let query = ListQuery {
                search,
                domain_id: domain,
                course_id: course,
                active: if active { Some(true) } else if inactive { Some(false) } else { None },
                sort: if oldest_first { SortOrder::OldestFirst } else { SortOrder::NewestFirst },
                page,
                ..admin.list_query()
            };
            dispatch(&admin, resource, Action::List { query, json }).await?;
        }
        Commands::Fields { resource } => dispatch(&admin, resource, Action::Fields).await?,
        Commands::Create { resource, fields } => {
            dispatch(&admin, resource, Action::Create(fields)).await?
        }
        Commands::Update { resource, id, fields } => {
            dispatch(&admin, resource, Action::Update(id, fields)).await?
        }
        Commands::Toggle { resource, id } => dispatch(&admin, resource, Action::Toggle(id)).await?,
        Commands::Delete { resource, id, confirm } => {
            dispatch(&admin, resource, Action::Delete { id, confirm }).await?
        }
        Commands::BulkEmail { subject, message, to } => {
            let mail = BulkEmail { subject, message, recipients: to };
            admin.send_bulk_email(&mail).await?;
            match mail.recipients.len() {
                0 => println!("Email sent to all enrollment contacts"),
                n => println!("Email sent to {n} recipient(s)"),
            }
        }
        Commands::ImageUrl { path } => println!("{}", admin.image_url(&path)?),
    }
    Ok(())
}

async fn dispatch(admin: &Admin, kind: ResourceKind, action: Action) -> Result<()> {
    match kind {
        ResourceKind::About => run::<About>(admin, action).await,
        ResourceKind::Hero => run::<Hero>(admin, action).await,
        ResourceKind::Notices => run::<Notice>(admin, action).await,
        ResourceKind::FaqChat => run::<FaqChat>(admin, action).await,
        ResourceKind::YoutubeShort => run::<YoutubeShort>(admin, action).await,
        ResourceKind::Domain => run::<Domain>(admin, action).await,
        ResourceKind::Courses => run::<Course>(admin, action).await,
        ResourceKind::Modules => run::<Module>(admin, action).await,
        ResourceKind::Certificate => run::<Certificate>(admin, action).await,
        ResourceKind::TechStack => run::<TechStack>(admin, action).await,
        ResourceKind::StudentSuccess => run::<StudentSuccess>(admin, action).await,
        ResourceKind::CareerImpact => run::<CareerImpact>(admin, action).await,
        ResourceKind::EnrollCards => run::<EnrollCard>(admin, action).await,
        ResourceKind::Enrollments => run::<Enrollment>(admin, action).await,
    }
}

async fn run<T: Resource + Serialize>(admin: &Admin, action: Action) -> Result<()> {
    let mut ctl = admin.controller::<T>();
    let outcome = match action {
        Action::Fields => {
            for spec in T::SCHEMA.fields {
                let mut notes = Vec::new();
                if spec.required {
                    notes.push("required");
                }
                if spec.companion {
                    notes.push("kept on status updates");
                }
                println!("{:<16} {:<12} {}", spec.name, spec.encoding.describe(), notes.join(", "));
            }
            Ok(())
        }
        Action::List { query, json } => {
            ctl.refresh().await?;
            let page = ctl.view(&query);
            if json {
                println!("{}", serde_json::to_string_pretty(&page.items)?);
            } else {
                for item in &page.items {
                    let label =
                        item.search_text().into_iter().find(|s| !s.is_empty()).unwrap_or("-");
                    let state = if item.is_active() { "active" } else { "inactive" };
                    println!("{:>6}  {:<8}  {}", item.id(), state, label);
                }
                let pages = page.total_pages.max(1);
                println!("page {}/{pages} ({} matching)", page.page, page.total_items);
            }
            Ok(())
        }
        Action::Create(fields) => {
            let mut draft = FormDraft::new(T::SCHEMA);
            apply(&mut draft, fields).await?;
            let payload = draft.build()?;
            ctl.create(payload).await.map_err(Into::into)
        }
        Action::Update(id, fields) => {
            ctl.refresh().await?;
            let record = ctl.get(id).with_context(|| format!("{} #{id} not found", T::LABEL))?;
            let mut draft = record.to_draft();
            apply(&mut draft, fields).await?;
            let payload = draft.build()?;
            ctl.update(id, payload).await.map_err(Into::into)
        }
        Action::Toggle(id) => {
            ctl.refresh().await?;
            match ctl.toggle_active(id).await {
                Ok(Some(_)) => Ok(()),
                Ok(None) => Err(anyhow::anyhow!("{} #{id} not found", T::LABEL)),
                Err(e) => Err(e.into()),
            }
        }
        Action::Delete { id, confirm } => {
            let typed = match confirm {
                Some(c) => c,
                None => prompt(&format!("Type {DELETE_WORD} to remove {} #{id}: ", T::LABEL))?,
            };
            match ctl.delete(id, &typed).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(anyhow::anyhow!("not confirmed; nothing deleted")),
                Err(e) => Err(e.into()),
            }
        }
    };
    report(ctl.take_toasts());
    outcome
}

async fn apply(draft: &mut FormDraft, fields: FieldArgs) -> Result<()> {
    for (name, raw) in &fields.set {
        draft.set(name, raw)?;
    }
    for (name, path) in &fields.files {
        let file = FileUpload::from_path(path).await?;
        draft.attach(name, file)?;
    }
    Ok(())
}

fn report(toasts: Vec<Toast>) {
    for t in toasts {
        match t.level {
            ToastLevel::Success => println!("{}", t.message),
            ToastLevel::Error => eprintln!("error: {}", t.message),
        }
    }
}

/// One line from stdin, without the trailing newline. Not trimmed otherwise.
fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("no input");
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
