//! Search hits → typed instances.
//!
//! Each hit gets a fresh instance from the model's constructor; every
//! participating field present in the hit source is then assigned through
//! the accessor table:
//!
//! - a value already in the field's representation is assigned as-is;
//! - a 32-bit integer arriving for a 64-bit field is widened first;
//! - anything else is skipped and the field keeps its default.
//!
//! Skips are logged at debug level and never fail the result set. Only a
//! failed construction does.

use tracing::debug;

use crate::error::SearchError;
use crate::index::RawHit;
use crate::models::{FieldType, Scalar};
use crate::schema::ModelType;

/// Bring `value` into `field_type`'s representation, if that is lossless.
pub fn coerce(field_type: FieldType, value: Scalar) -> Option<Scalar> {
    if field_type.accepts(&value) {
        return Some(value);
    }
    match (field_type, value) {
        (FieldType::Long, Scalar::Int(n)) => Some(Scalar::Long(i64::from(n))),
        _ => None,
    }
}

/// Materialize `hits` as instances of `T`, preserving hit order.
pub fn materialize<T: 'static>(model: &ModelType<T>, hits: &[RawHit]) -> Result<Vec<T>, SearchError> {
    hits.iter().map(|hit| materialize_one(model, hit)).collect()
}

fn materialize_one<T: 'static>(model: &ModelType<T>, hit: &RawHit) -> Result<T, SearchError> {
    let mut instance = model
        .instantiate()
        .map_err(|source| SearchError::Materialization {
            model: model.name().to_string(),
            hit: hit.id.clone(),
            source,
        })?;

    for accessor in model.accessors() {
        let field = &accessor.descriptor;
        let Some(raw) = hit.source.get(&field.name) else {
            continue;
        };
        let found = raw.kind();
        let Some(value) = coerce(field.field_type, raw.clone()) else {
            debug!(
                model = model.name(),
                hit = %hit.id,
                field = %field.name,
                expected = %field.field_type,
                found,
                "skipping field with mismatched value"
            );
            continue;
        };
        if let Err(e) = (accessor.set)(&mut instance, value) {
            debug!(
                model = model.name(),
                hit = %hit.id,
                field = %field.name,
                error = %e,
                "skipping field that could not be assigned"
            );
        }
    }
    Ok(instance)
}
