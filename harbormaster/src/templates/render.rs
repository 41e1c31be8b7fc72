//! Renders a project's job definition from its template

use std::error::Error as _;

use tera::{Context, Tera};

use crate::errors::HarborError;
use crate::models::project::Project;
use crate::models::template::JobTemplate;

/// Render `template` with the fields of `project` bound by their JSON names
/// (`name`, `shortName`, `description`, `email`, `contactName`, `githubUrl`).
///
/// Undefined variables are an error rather than an empty substitution.
pub fn render(template: &JobTemplate, project: &Project) -> Result<String, HarborError> {
    let context = Context::from_serialize(project).map_err(|e| {
        HarborError::TemplateError(format!("cannot bind project '{}': {}", project.short_name, e))
    })?;

    Tera::one_off(&template.content, &context, false).map_err(|e| {
        HarborError::TemplateError(format!(
            "template '{}' failed for project '{}': {}",
            template.name,
            project.short_name,
            error_chain(&e)
        ))
    })
}

fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
