use crate::Error;
use legal_secretary_engine::{backup, Coordinator};
use std::io::Write;
use std::path::PathBuf;

#[derive(clap::Parser)]
pub(crate) struct ExportAction {
    /// Directory receiving the backup file
    #[clap(long, default_value = ".")]
    output: PathBuf,
}

impl ExportAction {
    pub(crate) fn execute<W: Write>(
        self,
        coordinator: &Coordinator,
        output: &mut W,
    ) -> Result<(), Error> {
        let file = coordinator.export_backup()?;
        let path = file.write_into(&self.output)?;
        writeln!(output, "exported {}", path.display())?;
        Ok(())
    }
}

#[derive(clap::Parser)]
pub(crate) struct ImportAction {
    path: PathBuf,
}

impl ImportAction {
    pub(crate) fn execute<W: Write>(
        self,
        coordinator: &Coordinator,
        output: &mut W,
    ) -> Result<(), Error> {
        let imported = backup::import_file(&self.path)?;
        let count = imported.templates.len();
        coordinator.replace(imported.templates, imported.version);
        writeln!(
            output,
            "imported {count} templates at revision {}",
            imported.version
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::action::tests::{coordinator, run};

    #[tokio::test]
    async fn should_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = coordinator();
        let target = dir.path().to_str().unwrap();
        let output = run(&coordinator, &["export", "--output", target])
            .await
            .unwrap();
        let path = dir.path().join("legal_secretary_backup_Vr_1.0.0.json");
        assert_eq!(output, format!("exported {}\n", path.display()));

        let seed = coordinator.templates();
        coordinator.delete("seed-residential-lease");
        assert_eq!(coordinator.revision().to_string(), "1.0.1");

        let output = run(&coordinator, &["import", path.to_str().unwrap()])
            .await
            .unwrap();
        assert_eq!(output, "imported 2 templates at revision 1.0.0\n");
        assert_eq!(coordinator.templates(), seed);
        assert_eq!(coordinator.revision().to_string(), "1.0.0");
    }

    #[tokio::test]
    async fn invalid_backup_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.json");
        std::fs::write(&path, r#"{"templates": []}"#).unwrap();
        let coordinator = coordinator();
        let err = run(&coordinator, &["import", path.to_str().unwrap()])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid or corrupted file");
        assert_eq!(coordinator.templates().len(), 2);
    }
}
