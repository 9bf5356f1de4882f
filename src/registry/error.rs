// SPDX-License-Identifier: GPL-3.0-only
use crate::registry::models::{FieldError, PlotId};

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Plot not found: {0}")]
    NotFound(PlotId),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}
