//! Subcommands and their execution against a [`SiapApp`].
//!
//! Every page-like command runs the route guard first and only then
//! touches a collaborator, so a signed-out invocation never reads data.

use clap::Subcommand;
use serde_json::{json, Value};
use siap_app::{
    AppError, Authenticated, Record, RecordInput, RecordOutcome, Resource, Route, Schema, SiapApp,
    Theme,
};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and cache the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign out and clear the cached session
    Logout,

    /// Show the signed-in email and role
    Profile,

    /// List the navigation tabs visible to the current role
    Tabs {
        /// Path of the current page, marks the matching tab active
        #[arg(long, default_value = "/")]
        active: String,
    },

    /// List the records of a resource
    List { resource: String },

    /// Show one record
    Show {
        resource: String,
        id: String,

        /// Keep printing the record as it changes (Ctrl-C to stop)
        #[arg(long)]
        watch: bool,

        /// Stop watching after this many snapshots (at least 1)
        #[arg(long, requires = "watch", value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
    },

    /// Create a record
    Add {
        resource: String,

        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        #[arg(long = "attach", value_name = "FIELD=PATH")]
        attach: Vec<String>,
    },

    /// Change fields of an existing record
    Edit {
        resource: String,
        id: String,

        #[arg(long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        #[arg(long = "attach", value_name = "FIELD=PATH")]
        attach: Vec<String>,
    },

    /// Delete a record
    Delete { resource: String, id: String },

    /// Manage local identity accounts
    Account {
        #[command(subcommand)]
        action: AccountCommand,
    },

    /// Print or change the theme (light, dark or toggle)
    Theme { value: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Create an account and its user profile
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Display name, defaults to the local part of the email
        #[arg(long)]
        username: Option<String>,
        #[arg(long, default_value = "USER")]
        role: String,
    },
}

/// Runs one command.
///
/// # Errors
///
/// Returns the first [`AppError`] raised; callers map redirects and
/// denials to exit codes.
pub async fn execute(app: &SiapApp, command: Command) -> Result<(), AppError> {
    match command {
        Command::Login { email, password } => {
            let session = app.auth().sign_in(&email, &password).await?;
            println!(
                "Signed in as {} ({})",
                session.email().unwrap_or(email.as_str()),
                session.role().unwrap_or_default()
            );
            println!("navigate: {}", Route::List(Resource::Dashboard));
        }
        Command::Logout => {
            app.auth().sign_out().await?;
            println!("Signed out");
            println!("navigate: {}", Route::Entry);
        }
        Command::Profile => {
            let who = app.guard().into_result()?;
            let profile = app.auth().profile(&who);
            println!("email: {}", profile.email);
            println!("role: {}", profile.role);
        }
        Command::Tabs { active } => {
            for tab in app.tabs(&active) {
                let marker = if tab.active { "*" } else { " " };
                println!("{marker} {:<10} {:<18} {}", tab.label, tab.href, tab.icon);
            }
        }
        Command::List { resource } => {
            let who = app.guard().into_result()?;
            let schema = schema_for(&resource)?;
            let records = app.records().list(&who, schema).await?;
            if records.is_empty() {
                println!("No {} records", schema.resource);
            }
            for record in &records {
                println!("{}\t{}", record.id, title_of(schema, record));
            }
        }
        Command::Show {
            resource,
            id,
            watch,
            count,
        } => {
            let who = app.guard().into_result()?;
            let schema = schema_for(&resource)?;
            if watch {
                watch_record(app, &who, schema, &id, count).await?;
            } else {
                let record = app.records().show(&who, schema, &id).await?;
                print_record(&record);
                print_actions(app, &who, schema.resource);
            }
        }
        Command::Add {
            resource,
            set,
            attach,
        } => {
            let who = app.guard().into_result()?;
            let schema = schema_for(&resource)?;
            let input = build_input(&set, &attach).await?;
            let outcome = app.records().create(&who, schema, input).await?;
            print_outcome(&outcome);
        }
        Command::Edit {
            resource,
            id,
            set,
            attach,
        } => {
            let who = app.guard().into_result()?;
            let schema = schema_for(&resource)?;
            let input = build_input(&set, &attach).await?;
            let outcome = app.records().edit(&who, schema, &id, input).await?;
            print_outcome(&outcome);
        }
        Command::Delete { resource, id } => {
            let who = app.guard().into_result()?;
            let schema = schema_for(&resource)?;
            let outcome = app.records().delete(&who, schema, &id).await?;
            print_outcome(&outcome);
        }
        Command::Account {
            action:
                AccountCommand::Add {
                    email,
                    password,
                    username,
                    role,
                },
        } => {
            let username = username.unwrap_or_else(|| default_username(&email));
            let uid = app
                .register_account(&email, &password, &username, &role)
                .await?;
            println!("Account created: {uid} ({role})");
        }
        Command::Theme { value } => {
            if let Some(value) = value {
                let theme = if value.eq_ignore_ascii_case("toggle") {
                    app.theme().toggled()
                } else {
                    Theme::parse(&value).ok_or_else(|| {
                        AppError::input(format!(
                            "unknown theme '{value}', expected light, dark or toggle"
                        ))
                    })?
                };
                app.set_theme(theme);
            }
            println!("{}", app.theme());
        }
    }
    Ok(())
}

fn schema_for(name: &str) -> Result<&'static Schema, AppError> {
    let resource =
        Resource::parse(name).ok_or_else(|| AppError::input(format!("unknown resource '{name}'")))?;
    Schema::for_resource(resource)
        .ok_or_else(|| AppError::input(format!("{resource} has no records")))
}

async fn build_input(set: &[String], attach: &[String]) -> Result<RecordInput, AppError> {
    let mut input = RecordInput::new();
    for text in set {
        let (field, value) = RecordInput::parse_assignment(text)
            .ok_or_else(|| AppError::input(format!("expected FIELD=VALUE, got '{text}'")))?;
        input = input.set(field, value);
    }
    for text in attach {
        let (field, path) = RecordInput::parse_assignment(text)
            .ok_or_else(|| AppError::input(format!("expected FIELD=PATH, got '{text}'")))?;
        let path = Path::new(&path);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::input(format!("'{}' is not a file", path.display())))?;
        let bytes = tokio::fs::read(path).await?;
        debug!(field = %field, file = %file_name, size = bytes.len(), "attachment read");
        input = input.attach(field, file_name, bytes);
    }
    Ok(input)
}

async fn watch_record(
    app: &SiapApp,
    who: &Authenticated,
    schema: &Schema,
    id: &str,
    count: Option<u64>,
) -> Result<(), AppError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = app
        .records()
        .watch(who, schema, id, move |record| {
            let _ = tx.send(record);
        })
        .await?;

    let mut seen = 0u64;
    loop {
        tokio::select! {
            next = rx.recv() => match next {
                Some(Some(record)) => {
                    print_record(&record);
                    seen += 1;
                }
                Some(None) => {
                    println!("Record deleted");
                    println!("navigate: {}", Route::List(schema.resource));
                    break;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
        if count.is_some_and(|n| seen >= n) {
            break;
        }
    }

    subscription.cancel();
    Ok(())
}

fn title_of(schema: &Schema, record: &Record) -> String {
    match record.fields.get(schema.title) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn print_record(record: &Record) {
    println!("{:#}", json!({ "id": record.id.as_str(), "fields": record.fields }));
}

fn print_actions(app: &SiapApp, who: &Authenticated, resource: Resource) {
    if app.gate().can_mutate(who.role(), resource) {
        println!("actions: edit, delete");
    }
}

fn print_outcome(outcome: &RecordOutcome) {
    println!("{}", outcome.notice);
    println!("id: {}", outcome.id);
    println!("navigate: {}", outcome.navigate);
}

fn default_username(email: &str) -> String {
    email.split('@').next().unwrap_or(email).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lookup_accepts_aliases() {
        assert_eq!(schema_for("worker").unwrap().resource, Resource::Workers);
        assert_eq!(schema_for("on-call").unwrap().resource, Resource::OnCall);
    }

    #[test]
    fn schema_lookup_rejects_pages_without_records() {
        let err = schema_for("profile").unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
        assert!(schema_for("inventory").is_err());
    }

    #[tokio::test]
    async fn build_input_collects_fields_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        let photo = tmp.path().join("budi.jpg");
        std::fs::write(&photo, [0xFF, 0xD8]).unwrap();

        let input = build_input(
            &["name=Budi".into(), "note=a=b".into()],
            &[format!("photo={}", photo.display())],
        )
        .await
        .unwrap();

        assert_eq!(input.value("name"), Some("Budi"));
        assert_eq!(input.value("note"), Some("a=b"));
        assert_eq!(input.uploads().len(), 1);
        assert_eq!(input.uploads()[0].file_name, "budi.jpg");
        assert_eq!(input.uploads()[0].bytes, vec![0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn build_input_rejects_bare_words() {
        let err = build_input(&["name".into()], &[]).await.unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }

    #[tokio::test]
    async fn build_input_reports_missing_files() {
        let err = build_input(&[], &["photo=/definitely/not/here.jpg".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn username_defaults_to_local_part() {
        assert_eq!(default_username("budi@siap.id"), "budi");
        assert_eq!(default_username("plain"), "plain");
    }
}
