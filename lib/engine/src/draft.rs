//! Placeholder handling for templates: listing the `{{NAME}}` markers of a
//! structure and filling them with values.

use legal_secretary_prelude::{Analysis, OriginalFile, Template};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to interpolate template with provided values: {0}")]
    Interpolation(#[from] handlebars::RenderError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    /// Placeholders without a value, left as markers in `text`.
    pub missing_fields: Vec<String>,
}

fn is_placeholder(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['{', '}', '[', ']'])
        && !name.starts_with(['#', '/', '!', '>', '^', '&'])
}

enum Segment<'a> {
    Text(&'a str),
    Marker(&'a str),
}

/// Splits a structure into plain text and placeholder markers. Braces that
/// don't form a placeholder stay in the text.
fn segments(structure: &str) -> Vec<Segment<'_>> {
    let mut result = Vec::new();
    let mut rest = structure;
    let mut text_start = 0;
    let mut offset = 0;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = after[..end].trim();
        let marker_len = start + 2 + end + 2;
        if is_placeholder(name) {
            if offset + start > text_start {
                result.push(Segment::Text(&structure[text_start..offset + start]));
            }
            result.push(Segment::Marker(name));
            text_start = offset + marker_len;
        }
        offset += marker_len;
        rest = &after[end + 2..];
    }
    if text_start < structure.len() {
        result.push(Segment::Text(&structure[text_start..]));
    }
    result
}

/// Marker names in order of first appearance, without duplicates.
pub fn extract_placeholders(structure: &str) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for segment in segments(structure) {
        if let Segment::Marker(name) = segment {
            if !result.iter().any(|item| item == name) {
                result.push(name.to_string());
            }
        }
    }
    result
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Entries written without an id get a fresh one so they can be addressed.
pub fn assign_missing_ids(templates: &mut [Template]) {
    for template in templates.iter_mut().filter(|item| item.id.trim().is_empty()) {
        template.id = new_id();
        tracing::debug!("assigned id {} to template {:?}", template.id, template.name);
    }
}

/// Gives the analysis an id and a creation date. Placeholders are read from
/// the structure when the analysis lists none.
pub fn into_template(analysis: Analysis, original_file: Option<OriginalFile>) -> Template {
    let placeholders = if analysis.placeholders.is_empty() {
        extract_placeholders(&analysis.structure)
    } else {
        analysis.placeholders
    };
    Template {
        id: new_id(),
        name: analysis.name,
        category: analysis.category,
        description: analysis.description,
        structure: analysis.structure,
        placeholders,
        created_at: chrono::Utc::now().timestamp_millis(),
        original_file,
    }
}

pub fn fill(template: &Template, values: &BTreeMap<String, String>) -> Result<Draft, Error> {
    let mut missing_fields = Vec::new();
    let mut texts: Vec<&str> = Vec::new();
    let mut fields = serde_json::Map::new();
    // The structure itself is never parsed by handlebars: text goes through
    // the context like values do, so stray braces render verbatim.
    let mut source = String::new();
    for segment in segments(&template.structure) {
        match segment {
            Segment::Text(text) => {
                source.push_str(&format!("{{{{text.[{}]}}}}", texts.len()));
                texts.push(text);
            }
            Segment::Marker(name) => {
                if !fields.contains_key(name) {
                    let value = match values.get(name) {
                        Some(value) => value.clone(),
                        None => {
                            missing_fields.push(name.to_string());
                            format!("{{{{{name}}}}}")
                        }
                    };
                    fields.insert(name.to_string(), serde_json::Value::String(value));
                }
                source.push_str(&format!("{{{{fields.[{name}]}}}}"));
            }
        }
    }
    let mut handlebar = handlebars::Handlebars::new();
    handlebar.register_escape_fn(handlebars::no_escape);
    let params = serde_json::json!({ "text": texts, "fields": fields });
    let text = handlebar.render_template(&source, &params)?;
    if !missing_fields.is_empty() {
        tracing::debug!("missing fields for {}: {:?}", template.id, missing_fields);
    }
    Ok(Draft {
        text,
        missing_fields,
    })
}
