use crate::Error;
use legal_secretary_engine::Coordinator;
use std::io::Write;

#[derive(clap::Subcommand)]
pub(crate) enum Action {
    /// Replace the local library with the remote one
    Pull,
    /// Send the local library to the remote store
    Push,
    /// Print the state of the library and of the sync
    Status,
}

impl Action {
    pub(crate) async fn execute<W: Write>(
        self,
        coordinator: &Coordinator,
        output: &mut W,
    ) -> Result<(), Error> {
        match self {
            Self::Pull => {
                coordinator.pull().await?;
                writeln!(output, "pulled revision {}", coordinator.revision())?;
            }
            Self::Push => {
                coordinator.push().await?;
                writeln!(output, "pushed revision {}", coordinator.revision())?;
            }
            Self::Status => {
                let state = coordinator.sync_state();
                writeln!(output, "revision {}", coordinator.revision())?;
                writeln!(output, "templates {}", coordinator.templates().len())?;
                writeln!(output, "sync {:?}", state.status)?;
                if let Some(error) = state.last_error {
                    writeln!(output, "last error {error}")?;
                }
            }
        }
        Ok(())
    }
}
