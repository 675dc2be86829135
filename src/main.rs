use std::process::ExitCode;

use config::DbSettings;
use console::{Console, Terminal};
use errors::AppError;

mod config;
mod console;
mod db;
mod employees;
mod errors;
mod menu;
mod reports;
mod structs;
mod utils;

fn credentials<C: Console>(console: &mut C, settings: &DbSettings) -> Result<(String, String), AppError> {
    let user = console.read_line(&format!(
        "Database user for {}@{} (e.g. root): ",
        settings.database, settings.host
    ))?;
    let password = console.read_secret("Database password:")?;
    Ok((user, password))
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let settings = DbSettings::from_env();
    let mut console = Terminal::new();

    let (user, password) = match credentials(&mut console, &settings) {
        Ok(creds) => creds,
        Err(e) => {
            log::error!("Could not read credentials: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut store = match db::open(&settings, &user, &password).await {
        Ok(store) => store,
        Err(e) => {
            console.print(&format!("Error: {}", e));
            return ExitCode::FAILURE;
        }
    };
    console.print(&format!("\nConnected to database '{}'.", settings.database));

    if let Err(e) = menu::run(&mut store, &mut console).await {
        log::warn!("Leaving the menu early: {}", e);
    }

    if let Err(e) = store.close().await {
        log::error!("Failed to close the database session: {}", e);
    }
    console.print("\nApplication closed.");
    ExitCode::SUCCESS
}
