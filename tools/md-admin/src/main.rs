//! MD-Admin: Menudesk admin client

use std::process::ExitCode;

use clap::Parser;

use md_admin::{run, Cli, ClientError, CommandError, GatewayClient};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let client = match GatewayClient::new(&cli.endpoint, cli.token.clone()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli.command).await {
        Ok(value) => {
            match serde_json::to_string_pretty(&value) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(CommandError::Client(ClientError::Api {
            code,
            message,
            data,
            ..
        })) => {
            eprintln!("error [{}]: {}", code, message);
            if let Some(data) = data {
                eprintln!("{}", data);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
