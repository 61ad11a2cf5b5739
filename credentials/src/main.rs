//! Provisioning helper: prompts for a password and prints its canonical
//! credential string, ready to paste into the agents sheet.

use std::process::ExitCode;

use agent_credentials::config::CredentialConfig;
use agent_credentials::hash_password_with_iterations;
use log::{error, info};
use zeroize::Zeroize;

fn main() -> ExitCode {
    let config = match CredentialConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("config load failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str())).init();

    let mut password = match rpassword::prompt_password("Enter password to hash for agent: ") {
        Ok(pw) => pw,
        Err(err) => {
            error!("could not read password: {err}");
            return ExitCode::FAILURE;
        }
    };

    let result = hash_password_with_iterations(password.trim(), config.iterations);
    password.zeroize();

    match result {
        Ok(hash) => {
            info!("minted credential with {} iterations", config.iterations);
            println!("{hash}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("hashing failed: {err}");
            ExitCode::FAILURE
        }
    }
}
