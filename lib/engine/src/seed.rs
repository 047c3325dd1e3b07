use legal_secretary_prelude::Template;

const SEED: &str = include_str!("../seed/templates.json");

/// Templates offered on first start, before anything was stored.
pub(crate) fn templates() -> Vec<Template> {
    serde_json::from_str(SEED).unwrap_or_else(|err| {
        tracing::error!("unable to parse seed templates: {:?}", err);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    #[test]
    fn seed_templates_are_valid() {
        let templates = super::templates();
        assert_eq!(templates.len(), 2);
        for template in templates.iter() {
            assert_eq!(
                crate::draft::extract_placeholders(&template.structure),
                template.placeholders
            );
        }
    }
}
