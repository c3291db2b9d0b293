//! MD-Admin: Menudesk admin client
//!
//! Calls the admin gateway from the terminal and prints JSON.
//!
//! ```text
//! md-admin login --email me@example.com --password ...   # prints a session
//! export MD_ADMIN_TOKEN=<access_token>
//! md-admin menus create --file tree.json --title Main
//! md-admin menus flatten --file tree.json
//! md-admin todos seed --menu 3
//! md-admin todos list --grouped
//! md-admin upload ./avatar.png --folder avatars
//! ```

pub mod api;
pub mod cli;

pub use api::{ClientError, GatewayClient};
pub use cli::{run, Cli, Command, CommandError};
