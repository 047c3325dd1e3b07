use crate::Error;
use legal_secretary_engine::Coordinator;
use legal_secretary_prelude::CloudConfig;
use std::io::Write;

#[derive(clap::Subcommand)]
pub(crate) enum Action {
    /// Print the remote store settings
    Show,
    /// Change the remote store settings, an empty endpoint disables the sync
    Set {
        #[clap(long, default_value = "")]
        endpoint: String,
        #[clap(long, default_value = "", env = "LEGAL_SECRETARY_API_KEY")]
        api_key: String,
    },
}

fn masked(key: &str) -> String {
    match key.chars().count() {
        0 => String::new(),
        count if count <= 4 => "*".repeat(count),
        count => {
            let visible: String = key.chars().skip(count - 4).collect();
            format!("{}{visible}", "*".repeat(count - 4))
        }
    }
}

impl Action {
    pub(crate) fn execute<W: Write>(
        self,
        coordinator: &Coordinator,
        output: &mut W,
    ) -> Result<(), Error> {
        match self {
            Self::Show => {
                let config = coordinator.cloud_config();
                writeln!(output, "endpoint {}", config.endpoint)?;
                writeln!(output, "api key {}", masked(&config.api_key))?;
            }
            Self::Set { endpoint, api_key } => {
                let config = CloudConfig { endpoint, api_key };
                let enabled = config.is_enabled();
                coordinator.configure(config);
                if enabled {
                    writeln!(output, "remote sync enabled")?;
                } else {
                    writeln!(output, "remote sync disabled")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::masked;
    use crate::action::tests::{coordinator, run};

    #[test]
    fn should_mask_api_key() {
        assert_eq!(masked(""), "");
        assert_eq!(masked("abc"), "***");
        assert_eq!(masked("abcdefgh"), "****efgh");
    }

    #[tokio::test]
    async fn should_disable_with_empty_endpoint() {
        let coordinator = coordinator();
        let output = run(&coordinator, &["cloud", "set", "--api-key", "secret"])
            .await
            .unwrap();
        assert_eq!(output, "remote sync disabled\n");
        let output = run(&coordinator, &["cloud", "show"]).await.unwrap();
        assert_eq!(output, "endpoint \napi key **cret\n");
    }
}
