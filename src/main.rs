use std::process::ExitCode;

fn main() -> ExitCode {
    match cursor_history_explorer::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
