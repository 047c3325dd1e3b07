//! Portable backup of the whole library, as pretty printed json.

use legal_secretary_prelude::{Backup, Revision, Template};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unable to read backup file: {0}")]
    Read(#[from] std::io::Error),
    #[error("unable to parse backup file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid or corrupted file")]
    Invalid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content: String,
}

impl ExportFile {
    pub fn write_into(&self, directory: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(directory)?;
        let path = directory.join(&self.file_name);
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Imported {
    pub templates: Vec<Template>,
    pub version: Revision,
}

pub fn file_name(revision: &Revision) -> String {
    format!("legal_secretary_backup_Vr_{revision}.json")
}

pub fn export(templates: &[Template], revision: Revision) -> Result<ExportFile, serde_json::Error> {
    let backup = Backup {
        version: revision,
        templates: templates.to_vec(),
        exported_at: Some(chrono::Utc::now().timestamp_millis()),
        imported_at: None,
    };
    Ok(ExportFile {
        file_name: file_name(&revision),
        content: serde_json::to_string_pretty(&backup)?,
    })
}

/// All or nothing: either the whole file is accepted or an error is returned.
/// Only the presence of a `templates` array and of a `version` is checked,
/// entries are read leniently and a malformed version restarts the count.
pub fn import(text: &str) -> Result<Imported, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let (Some(Value::Array(entries)), Some(version)) = (
        value.get("templates"),
        value.get("version").filter(|version| !version.is_null()),
    ) else {
        tracing::warn!("backup file is missing templates or version");
        return Err(ImportError::Invalid);
    };
    let mut templates: Vec<Template> = entries
        .iter()
        .filter_map(|entry| {
            serde_json::from_value(entry.clone())
                .map_err(|err| tracing::warn!("skipping backup entry: {:?}", err))
                .ok()
        })
        .collect();
    crate::draft::assign_missing_ids(&mut templates);
    let version = match version {
        Value::String(inner) => inner.parse(),
        other => other.to_string().parse(),
    };
    let version = version.unwrap_or_else(|err| {
        tracing::warn!("backup revision is malformed, restarting: {}", err);
        Revision::INITIAL
    });
    Ok(Imported { templates, version })
}

pub fn import_file(path: &Path) -> Result<Imported, ImportError> {
    tracing::debug!("importing backup from {:?}", path);
    let text = std::fs::read_to_string(path)?;
    import(&text)
}

#[cfg(test)]
mod tests {
    use super::{export, import, import_file, ImportError, Imported};
    use crate::persistence::tests::template;
    use legal_secretary_prelude::Revision;

    #[test]
    fn should_name_file_after_revision() {
        let file = export(&[], Revision::new(2, 3, 4)).unwrap();
        assert_eq!(file.file_name, "legal_secretary_backup_Vr_2.3.4.json");
    }

    #[test]
    fn export_then_import_gives_back_library() {
        let templates = vec![template("b"), template("a")];
        let file = export(&templates, Revision::new(1, 0, 7)).unwrap();
        assert!(file.content.contains("\n  \"version\": \"1.0.7\""));
        assert_eq!(
            import(&file.content).unwrap(),
            Imported {
                templates,
                version: Revision::new(1, 0, 7),
            }
        );
    }

    #[test]
    fn should_accept_import_timestamp() {
        let imported = import(
            r#"{"version": "1.0.0", "templates": [{"id": 12, "name": "Lease"}], "importedAt": 1}"#,
        )
        .unwrap();
        assert_eq!(imported.templates[0].id, "12");
    }

    #[test]
    fn fails_without_templates() {
        let err = import(r#"{"version": "1.0.0"}"#).unwrap_err();
        assert!(matches!(err, ImportError::Invalid));
        let err = import(r#"{"version": "1.0.0", "templates": {}}"#).unwrap_err();
        assert!(matches!(err, ImportError::Invalid));
    }

    #[test]
    fn fails_without_version() {
        let err = import(r#"{"templates": []}"#).unwrap_err();
        assert!(matches!(err, ImportError::Invalid));
    }

    #[test]
    fn malformed_version_restarts_from_initial() {
        let imported = import(r#"{"version": "abc", "templates": []}"#).unwrap();
        assert_eq!(imported.version, Revision::INITIAL);
        assert_eq!(imported.version.next().to_string(), "1.0.1");
        let imported = import(r#"{"version": 3, "templates": []}"#).unwrap();
        assert_eq!(imported.version, Revision::INITIAL);
    }

    #[test]
    fn entries_are_read_leniently() {
        let imported = import(
            r#"{"version": "1.0.0", "templates": [{"name": "no id"}, "garbage", {"id": "b", "placeholders": null}]}"#,
        )
        .unwrap();
        assert_eq!(imported.templates.len(), 2);
        assert_eq!(imported.templates[0].name, "no id");
        assert!(!imported.templates[0].id.is_empty());
        assert_eq!(imported.templates[1].id, "b");
        assert!(imported.templates[1].placeholders.is_empty());
    }

    #[test]
    fn fails_on_invalid_json() {
        let err = import("{ not json").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
    }

    #[test]
    fn should_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = export(&[template("a")], Revision::new(1, 2, 3)).unwrap();
        let path = file.write_into(dir.path()).unwrap();
        assert!(path.ends_with("legal_secretary_backup_Vr_1.2.3.json"));
        let imported = import_file(&path).unwrap();
        assert_eq!(imported.version, Revision::new(1, 2, 3));
    }

    #[test]
    fn fails_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ImportError::Read(_)));
    }
}
