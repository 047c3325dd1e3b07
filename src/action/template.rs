use crate::Error;
use base64::Engine as _;
use legal_secretary_engine::{draft, Coordinator};
use legal_secretary_prelude::{Analysis, OriginalFile};
use std::io::Write;
use std::path::{Path, PathBuf};

fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(clap::Parser)]
pub(crate) struct ListAction {
    /// Only list templates of this category
    #[clap(long)]
    category: Option<String>,
}

impl ListAction {
    pub(crate) fn execute<W: Write>(
        self,
        coordinator: &Coordinator,
        output: &mut W,
    ) -> Result<(), Error> {
        for template in coordinator.templates().iter().filter(|item| {
            self.category
                .as_deref()
                .map_or(true, |category| item.category == category)
        }) {
            writeln!(
                output,
                "{}\t{}\t{}\t{}",
                template.id,
                template.name,
                template.category,
                template.placeholders.len()
            )?;
        }
        writeln!(output, "revision {}", coordinator.revision())?;
        Ok(())
    }
}

#[derive(clap::Parser)]
pub(crate) struct ShowAction {
    id: String,
}

impl ShowAction {
    pub(crate) fn execute<W: Write>(
        self,
        coordinator: &Coordinator,
        output: &mut W,
    ) -> Result<(), Error> {
        let template = coordinator
            .find(&self.id)
            .ok_or_else(|| Error::TemplateNotFound(self.id.clone()))?;
        serde_json::to_writer_pretty(&mut *output, &template)?;
        writeln!(output)?;
        Ok(())
    }
}

#[derive(clap::Parser)]
pub(crate) struct AddAction {
    #[clap(long)]
    name: String,
    #[clap(long, default_value = "")]
    category: String,
    #[clap(long, default_value = "")]
    description: String,
    /// Text file with {{NAME}} markers
    #[clap(long)]
    structure: PathBuf,
    /// Placeholder names, read from the structure when omitted
    #[clap(long = "placeholder")]
    placeholders: Vec<String>,
    /// Document the template was extracted from, kept with the template
    #[clap(long)]
    original: Option<PathBuf>,
    /// Mime type of the original document
    #[clap(long, default_value = "application/octet-stream")]
    mime: String,
}

impl AddAction {
    fn original_file(&self) -> Result<Option<OriginalFile>, Error> {
        let Some(ref path) = self.original else {
            return Ok(None);
        };
        let content = read_file(path)?;
        Ok(Some(OriginalFile {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            data: base64::engine::general_purpose::STANDARD.encode(content),
            mime_type: self.mime.clone(),
        }))
    }

    pub(crate) fn execute<W: Write>(
        self,
        coordinator: &Coordinator,
        output: &mut W,
    ) -> Result<(), Error> {
        let structure = String::from_utf8_lossy(&read_file(&self.structure)?).into_owned();
        let original_file = self.original_file()?;
        let template = draft::into_template(
            Analysis {
                name: self.name,
                category: self.category,
                description: self.description,
                structure,
                placeholders: self.placeholders,
            },
            original_file,
        );
        let id = template.id.clone();
        let revision = coordinator.add(template);
        writeln!(output, "added {id} at revision {revision}")?;
        Ok(())
    }
}

#[derive(clap::Parser)]
pub(crate) struct DeleteAction {
    id: String,
}

impl DeleteAction {
    pub(crate) fn execute<W: Write>(
        self,
        coordinator: &Coordinator,
        output: &mut W,
    ) -> Result<(), Error> {
        if !coordinator.delete(&self.id) {
            tracing::warn!("no template with id {}", self.id);
        }
        writeln!(output, "deleted {} at revision {}", self.id, coordinator.revision())?;
        Ok(())
    }
}
