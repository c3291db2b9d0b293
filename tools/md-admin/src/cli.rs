//! Command-line surface and dispatch.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::api::{ClientError, GatewayClient};

/// Menudesk admin client
#[derive(Parser, Debug)]
#[command(name = "md-admin")]
#[command(about = "Manage menus, todos, users and uploads through the admin gateway")]
pub struct Cli {
    /// Admin gateway URL
    #[arg(short, long, env = "MD_ADMIN_ENDPOINT", default_value = "http://127.0.0.1:8080")]
    pub endpoint: String,

    /// Bearer token from `md-admin login`
    #[arg(short, long, env = "MD_ADMIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Gateway liveness and version
    Health,
    /// Exchange credentials for a session; prints the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MD_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// The signed-in user
    Whoami,
    #[command(subcommand)]
    Menus(MenuCommand),
    #[command(subcommand)]
    Todos(TodoCommand),
    #[command(subcommand)]
    Users(UserCommand),
    /// Upload a file through a presigned URL
    Upload {
        file: PathBuf,
        /// Target folder, `uploads` when omitted
        #[arg(long)]
        folder: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MenuCommand {
    List,
    Show {
        id: i64,
    },
    /// Create from a JSON file holding the tree
    Create {
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        meta: MenuMeta,
    },
    /// Update metadata and optionally replace the tree
    Update {
        id: i64,
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        meta: MenuMeta,
    },
    Delete {
        id: i64,
    },
    /// Preview the flattened rows of a tree file without saving anything
    Flatten {
        #[arg(long)]
        file: PathBuf,
    },
    /// Names along a route such as `/todo/dashboard`
    Breadcrumbs {
        id: i64,
        route: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct MenuMeta {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub classification: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TodoCommand {
    List {
        /// Group consecutive rows by first menu
        #[arg(long)]
        grouped: bool,
    },
    /// Replace your todos with the rows of a menu tree
    Seed {
        /// Stored menu structure id
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        menu: Option<i64>,
        /// Tree JSON file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    Complete {
        id: i64,
        /// Mark as not completed instead
        #[arg(long)]
        undo: bool,
    },
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    List,
    /// Update profile fields; only the given ones change
    Update {
        id: String,
        #[arg(long)]
        user_image: Option<String>,
        #[arg(long)]
        phone_number: Option<String>,
        #[arg(long)]
        github_url: Option<String>,
        #[arg(long)]
        current_task: Option<String>,
        #[arg(long)]
        today_completed_tasks_count: Option<u32>,
    },
    Delete {
        id: String,
    },
}

/// Failures of a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0}")]
    Usage(String),
}

/// Run one command; the result is printed by the caller.
pub async fn run(client: &GatewayClient, command: Command) -> Result<Value, CommandError> {
    let value = match command {
        Command::Health => client.health().await?,
        Command::Login { email, password } => client.login(&email, &password).await?,
        Command::Whoami => client.me().await?,
        Command::Menus(cmd) => run_menu(client, cmd).await?,
        Command::Todos(cmd) => run_todo(client, cmd).await?,
        Command::Users(cmd) => run_user(client, cmd).await?,
        Command::Upload { file, folder } => {
            let bytes = std::fs::read(&file).map_err(|source| CommandError::Read {
                path: file.clone(),
                source,
            })?;
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| CommandError::Usage(format!("{} has no file name", file.display())))?;
            client.upload(name, folder.as_deref(), bytes).await?
        }
    };
    Ok(value)
}

async fn run_menu(client: &GatewayClient, command: MenuCommand) -> Result<Value, CommandError> {
    Ok(match command {
        MenuCommand::List => client.list_menus().await?,
        MenuCommand::Show { id } => client.get_menu(id).await?,
        MenuCommand::Create { file, meta } => {
            let body = menu_body(meta, Some(read_json(&file)?));
            client.create_menu(body).await?
        }
        MenuCommand::Update { id, file, meta } => {
            let tree = file.as_deref().map(read_json).transpose()?;
            let body = menu_body(meta, tree);
            if body.as_object().map_or(true, Map::is_empty) {
                return Err(CommandError::Usage("nothing to update".into()));
            }
            client.update_menu(id, body).await?
        }
        MenuCommand::Delete { id } => {
            client.delete_menu(id).await?;
            json!({ "deleted": id })
        }
        MenuCommand::Flatten { file } => client.flatten(read_json(&file)?).await?,
        MenuCommand::Breadcrumbs { id, route } => client.breadcrumbs(id, &route).await?,
    })
}

async fn run_todo(client: &GatewayClient, command: TodoCommand) -> Result<Value, CommandError> {
    Ok(match command {
        TodoCommand::List { grouped: false } => client.list_todos().await?,
        TodoCommand::List { grouped: true } => client.list_todos_grouped().await?,
        TodoCommand::Seed {
            menu: Some(id), ..
        } => client.seed_from_menu(id).await?,
        TodoCommand::Seed {
            file: Some(file), ..
        } => client.seed_from_tree(read_json(&file)?).await?,
        TodoCommand::Seed { .. } => {
            return Err(CommandError::Usage("pass --menu ID or --file PATH".into()))
        }
        TodoCommand::Complete { id, undo } => client.set_completion(id, !undo).await?,
        TodoCommand::Delete { ids } => client.delete_todos(&ids).await?,
    })
}

async fn run_user(client: &GatewayClient, command: UserCommand) -> Result<Value, CommandError> {
    Ok(match command {
        UserCommand::List => client.list_users().await?,
        UserCommand::Update {
            id,
            user_image,
            phone_number,
            github_url,
            current_task,
            today_completed_tasks_count,
        } => {
            let mut update = Map::new();
            insert_some(&mut update, "user_image", user_image.map(Value::from));
            insert_some(&mut update, "phone_number", phone_number.map(Value::from));
            insert_some(&mut update, "github_url", github_url.map(Value::from));
            insert_some(&mut update, "current_task", current_task.map(Value::from));
            insert_some(
                &mut update,
                "today_completed_tasks_count",
                today_completed_tasks_count.map(Value::from),
            );
            if update.is_empty() {
                return Err(CommandError::Usage("nothing to update".into()));
            }
            client.update_profile(&id, Value::Object(update)).await?
        }
        UserCommand::Delete { id } => client.delete_user(&id).await?,
    })
}

/// Request body for menu create/update from flags and an optional tree.
pub fn menu_body(meta: MenuMeta, tree: Option<Value>) -> Value {
    let mut body = Map::new();
    insert_some(&mut body, "title", meta.title.map(Value::from));
    insert_some(&mut body, "description", meta.description.map(Value::from));
    insert_some(&mut body, "classification", meta.classification.map(Value::from));
    insert_some(&mut body, "menu_structure", tree);
    Value::Object(body)
}

fn insert_some(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

fn read_json(path: &Path) -> Result<Value, CommandError> {
    let text = std::fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CommandError::Json {
        path: path.to_path_buf(),
        source,
    })
}
