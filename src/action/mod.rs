mod backup;
mod cloud;
mod draft;
mod sync;
mod template;

use crate::service::configuration::Configuration;
use crate::Error;
use legal_secretary_engine::Coordinator;
use std::io::Write;

#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration toml file.
    #[clap(
        short,
        long,
        default_value = "legal-secretary.toml",
        env = "LEGAL_SECRETARY_CONFIG"
    )]
    pub config_path: String,
    #[command(subcommand)]
    action: Action,
}

impl Args {
    pub fn configuration(&self) -> Result<Configuration, Error> {
        Ok(Configuration::from_path(&self.config_path)?)
    }

    /// Runs the action once the startup fetch is applied, then waits for the
    /// changes it made to reach the remote store.
    pub async fn execute<W: Write>(self, output: &mut W) -> Result<(), Error> {
        let configuration = self.configuration()?;
        let coordinator = configuration.engine.build();
        coordinator.settle().await;
        let result = self.action.execute(&coordinator, output).await;
        coordinator.flush().await;
        result
    }
}

#[derive(clap::Subcommand)]
pub(crate) enum Action {
    /// List the templates of the library
    List(template::ListAction),
    /// Print a template as json
    Show(template::ShowAction),
    /// Add a template from a text file with {{NAME}} markers
    Add(template::AddAction),
    /// Delete a template
    Delete(template::DeleteAction),
    /// Fill the placeholders of a template
    Draft(draft::Action),
    /// Write a backup file of the whole library
    Export(backup::ExportAction),
    /// Replace the library with the content of a backup file
    Import(backup::ImportAction),
    /// Read or change the remote store settings
    #[command(subcommand)]
    Cloud(cloud::Action),
    /// Synchronize with the remote store
    #[command(subcommand)]
    Sync(sync::Action),
}

impl Action {
    pub(crate) async fn execute<W: Write>(
        self,
        coordinator: &Coordinator,
        output: &mut W,
    ) -> Result<(), Error> {
        match self {
            Self::List(inner) => inner.execute(coordinator, output),
            Self::Show(inner) => inner.execute(coordinator, output),
            Self::Add(inner) => inner.execute(coordinator, output),
            Self::Delete(inner) => inner.execute(coordinator, output),
            Self::Draft(inner) => inner.execute(coordinator, output),
            Self::Export(inner) => inner.execute(coordinator, output),
            Self::Import(inner) => inner.execute(coordinator, output),
            Self::Cloud(inner) => inner.execute(coordinator, output),
            Self::Sync(inner) => inner.execute(coordinator, output).await,
        }
    }
}
