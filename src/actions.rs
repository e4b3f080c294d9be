//! GitHub Actions workflow commands.

const GITHUB_ACTIONS_ENV: &str = "GITHUB_ACTIONS";

pub fn running_in_actions() -> bool {
    std::env::var(GITHUB_ACTIONS_ENV).is_ok_and(|value| value == "true")
}

/// Escapes a message so the runner reads it as a single command
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// `::error::` command that marks the step as failed with `message`
pub fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Prints the failure annotation when running inside GitHub Actions. Callers must redact `message`.
pub fn set_failed(message: &str) {
    if running_in_actions() {
        println!("{}", error_command(message));
    }
}
