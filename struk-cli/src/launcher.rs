//! Opens print URIs by running an external program (`xdg-open`, `termux-open-url`, ...)

use tokio::process::Command;
use tracing::{debug, instrument};

use struk_printer::{PrintError, PrintResult, UriLauncher};

#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: String,
}

impl CommandLauncher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl UriLauncher for CommandLauncher {
    #[instrument(skip(self, uri), fields(program = %self.program, uri_len = uri.len()))]
    async fn launch(&self, uri: &str) -> PrintResult<()> {
        let status = Command::new(&self.program)
            .arg(uri)
            .status()
            .await
            .map_err(|e| PrintError::Launch(format!("{}: {e}", self.program)))?;

        debug!(%status, "launcher exited");
        if !status.success() {
            return Err(PrintError::Launch(format!(
                "{} exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}
