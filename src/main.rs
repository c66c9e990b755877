use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match attendance_kiosk::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "command failed");
            ExitCode::FAILURE
        }
    }
}
