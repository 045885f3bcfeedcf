//! Object → [`Document`] serialization.
//!
//! Reads every participating field through the model's accessor table and
//! writes the non-null values. No coercion happens here: a `Long` field is
//! written as a 64-bit value and the index decides how to encode it.
//! Non-finite floats have no JSON form and are treated as absent.

use tracing::debug;

use crate::error::SearchError;
use crate::models::{Document, Scalar};
use crate::schema::ModelType;

/// Serialize one instance of `T`.
///
/// The first field that cannot be read fails the whole object; callers on
/// the event path log the error and skip the object.
pub fn serialize<T: 'static>(model: &ModelType<T>, instance: &T) -> Result<Document, SearchError> {
    let mut document = Document::new();
    for accessor in model.accessors() {
        let value =
            (accessor.get)(instance).map_err(|source| SearchError::Serialization {
                model: model.name().to_string(),
                field: accessor.descriptor.name.clone(),
                source,
            })?;
        match value {
            Some(Scalar::Float(f)) if !f.is_finite() => {
                debug!(
                    model = model.name(),
                    field = %accessor.descriptor.name,
                    "non-finite float omitted"
                );
            }
            Some(value) => document.insert(accessor.descriptor.name.clone(), value),
            None => {}
        }
    }
    Ok(document)
}
