use crate::error::ManifetchError;
use crate::manifest::Dataset;
use tokio::process::Command;

fn shell_command(line: &str) -> Command {
    #[cfg(windows)]
    {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(line);
        command
    }
    #[cfg(not(windows))]
    {
        let mut command = Command::new("sh");
        command.arg("-c").arg(line);
        command
    }
}

/// Runs one command through the platform shell in the current directory.
pub async fn run_shell_command(line: &str) -> Result<(), ManifetchError> {
    tracing::debug!(command = line, "Running post install command");
    let status = shell_command(line).status().await?;

    if status.success() {
        Ok(())
    } else {
        Err(ManifetchError::PostInstall {
            command: line.to_string(),
            status: status.to_string(),
        })
    }
}

/// Runs the dataset's `post_install` commands in order, stopping at the first failure.
pub async fn run_post_install(dataset: &Dataset, title: &str) -> Result<(), ManifetchError> {
    if dataset.post_install.is_empty() {
        return Ok(());
    }

    tracing::info!("{} post install", title);
    for line in &dataset.post_install {
        run_shell_command(line).await?;
    }
    Ok(())
}
