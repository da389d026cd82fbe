use std::{env, env::VarError};

/// The server has no CLI. Any argument prints the help text and the current configuration.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // LFP_PAYMENTS_API_KEY is left out on purpose
    const DISPLAY_ENVS: [&str; 17] = [
        "RUST_LOG",
        "LFP_HOST",
        "LFP_PORT",
        "LFP_DATABASE_URL",
        "LFP_E5_API_URL",
        "LFP_E5_USERNAME",
        "LFP_E5_COMPANY_CODE",
        "LFP_PAYMENTS_API_URL",
        "LFP_PENALTY_TYPES_PATH",
        "LFP_EMAIL_SEND_URL",
        "LFP_CHS_URL",
        "LFP_SETTLEMENT_ORDERING",
        "LFP_WEEKLY_MAINTENANCE_DAY",
        "LFP_WEEKLY_MAINTENANCE_START_TIME",
        "LFP_WEEKLY_MAINTENANCE_END_TIME",
        "LFP_PLANNED_MAINTENANCE_START_TIME",
        "LFP_PLANNED_MAINTENANCE_END_TIME",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
