use crate::Error;
use legal_secretary_engine::{draft, Coordinator};
use std::collections::BTreeMap;
use std::io::Write;

#[derive(clap::Parser)]
pub(crate) struct Action {
    id: String,
    /// Placeholder value, as NAME=VALUE
    #[clap(long = "value")]
    values: Vec<String>,
}

fn parse_value(input: &str) -> Result<(String, String), Error> {
    input
        .split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .ok_or_else(|| Error::InvalidValue(input.to_string()))
}

impl Action {
    pub(crate) fn execute<W: Write>(
        self,
        coordinator: &Coordinator,
        output: &mut W,
    ) -> Result<(), Error> {
        let template = coordinator
            .find(&self.id)
            .ok_or_else(|| Error::TemplateNotFound(self.id.clone()))?;
        let values = self
            .values
            .iter()
            .map(|item| parse_value(item))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        let result = draft::fill(&template, &values)?;
        writeln!(output, "{}", result.text)?;
        if !result.missing_fields.is_empty() {
            tracing::warn!("missing fields: {}", result.missing_fields.join(", "));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::action::tests::{coordinator, run};

    #[tokio::test]
    async fn should_fill_seed_template() {
        let coordinator = coordinator();
        let output = run(
            &coordinator,
            &[
                "draft",
                "seed-residential-lease",
                "--value",
                "LANDLORD_NAME=Alice",
                "--value",
                "TENANT_NAME=Bob",
            ],
        )
        .await
        .unwrap();
        assert!(output.starts_with("Between Alice, the landlord, and Bob, the tenant"));
        assert!(output.contains("{{MONTHLY_RENT}}"));
    }

    #[tokio::test]
    async fn fails_on_malformed_value() {
        let coordinator = coordinator();
        let args = ["draft", "seed-residential-lease", "--value", "=Alice"];
        let err = run(&coordinator, &args).await.unwrap_err();
        assert!(matches!(err, crate::Error::InvalidValue(_)));
    }
}
