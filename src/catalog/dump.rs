//! Decoding of `just --dump --dump-format json`.

use super::{Catalog, CatalogError, Parameter, ParameterKind, Task};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct DumpDocument {
    #[serde(default)]
    recipes: BTreeMap<String, DumpRecipe>,
}

#[derive(Debug, Deserialize)]
struct DumpRecipe {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    doc: Option<String>,
    #[serde(default)]
    dependencies: Vec<DumpDependency>,
    #[serde(default)]
    parameters: Vec<DumpParameter>,
}

#[derive(Debug, Deserialize)]
struct DumpDependency {
    recipe: String,
}

#[derive(Debug, Deserialize)]
struct DumpParameter {
    name: String,
    #[serde(default)]
    default: Option<serde_json::Value>,
    #[serde(default = "default_kind")]
    kind: String,
}

fn default_kind() -> String {
    ParameterKind::Singular.as_str().to_string()
}

/// Non-string defaults (expressions) are kept as their JSON text so the form
/// can still show and submit them.
fn default_text(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

pub fn parse_dump(raw: &str) -> Result<Catalog, CatalogError> {
    let document: DumpDocument =
        serde_json::from_str(raw).map_err(|source| CatalogError::Parse { source })?;
    let mut tasks = Vec::with_capacity(document.recipes.len());
    for (key, recipe) in document.recipes {
        let name = recipe.name.filter(|n| !n.is_empty()).unwrap_or(key);
        let mut parameters = Vec::with_capacity(recipe.parameters.len());
        for parameter in recipe.parameters {
            let kind = ParameterKind::try_from(parameter.kind.as_str()).map_err(|kind| {
                CatalogError::UnknownParameterKind {
                    task: name.clone(),
                    parameter: parameter.name.clone(),
                    kind,
                }
            })?;
            parameters.push(Parameter {
                name: parameter.name,
                default: default_text(parameter.default),
                kind,
            });
        }
        tasks.push(Task {
            description: recipe.doc.filter(|d| !d.trim().is_empty()),
            dependencies: recipe.dependencies.into_iter().map(|d| d.recipe).collect(),
            parameters,
            name,
        });
    }
    Ok(Catalog::from_tasks(tasks))
}
