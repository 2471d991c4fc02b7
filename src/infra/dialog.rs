use anyhow::Result;
use async_trait::async_trait;
use std::io::Write;

/// Blocking user-facing messages. `warn` completes once the message has been
/// dismissed.
#[async_trait(?Send)]
pub trait Dialog {
    async fn warn(&self, message: &str) -> Result<()>;
}

/// Prints warnings to stderr; dismissal is immediate.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrDialog;

#[async_trait(?Send)]
impl Dialog for StderrDialog {
    async fn warn(&self, message: &str) -> Result<()> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "warning: {message}")?;
        Ok(())
    }
}
