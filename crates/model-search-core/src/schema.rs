//! Model metadata: per-type accessor tables and the model registry.
//!
//! Each model type is described once, at registration, by a [`ModelType`]:
//! its simple name, whether it opts into search, the key accessor, a
//! constructor, and an ordered table of typed field getters and setters.
//! Nothing is discovered at runtime; the accessor table is the only way
//! the mapping layer reads or writes instance fields.
//!
//! # Example
//!
//! ```rust
//! use model_search_core::{FieldOptions, FieldType, IndexHint, ModelRegistry, ModelType, Scalar};
//!
//! #[derive(Default)]
//! struct Article {
//!     id: i64,
//!     title: Option<String>,
//!     views: i64,
//! }
//!
//! let article = ModelType::<Article>::builder("Article")
//!     .searchable()
//!     .key(|a| a.id.to_string())
//!     .field_with(
//!         "title",
//!         FieldType::Text,
//!         FieldOptions::default().multi_field([IndexHint::Analyzed, IndexHint::NotAnalyzed]),
//!         |a| Ok(a.title.clone().map(Scalar::from)),
//!         |a, v| {
//!             a.title = Some(v.into_string()?);
//!             Ok(())
//!         },
//!     )
//!     .field(
//!         "views",
//!         FieldType::Long,
//!         |a| Ok(Some(Scalar::from(a.views))),
//!         |a, v| {
//!             a.views = v.into_i64()?;
//!             Ok(())
//!         },
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mut registry = ModelRegistry::new();
//! registry.register(article).unwrap();
//! assert!(registry.is_participating::<Article>());
//! assert_eq!(registry.fields_of::<Article>().unwrap().len(), 2);
//! ```

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};

use crate::error::{FieldError, MetadataError, SearchError};
use crate::models::{Document, FieldDescriptor, FieldOptions, FieldType, Scalar};
use crate::serialize;
use crate::slug::slugify;

type Getter<T> = Box<dyn Fn(&T) -> Result<Option<Scalar>, FieldError> + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Scalar) -> Result<(), FieldError> + Send + Sync>;
type KeyFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;
type Factory<T> = Box<dyn Fn() -> Result<T, FieldError> + Send + Sync>;

/// Typed read/write access to one participating field.
pub(crate) struct FieldAccessor<T> {
    pub(crate) descriptor: FieldDescriptor,
    pub(crate) get: Getter<T>,
    pub(crate) set: Setter<T>,
}

/// The registered description of one model type `T`.
pub struct ModelType<T> {
    name: String,
    type_name: String,
    searchable: bool,
    accessors: Vec<FieldAccessor<T>>,
    descriptors: Vec<FieldDescriptor>,
    key: KeyFn<T>,
    factory: Factory<T>,
}

impl<T: Default + 'static> ModelType<T> {
    /// Start describing `T`, constructing fresh instances with `T::default()`.
    pub fn builder(name: &str) -> ModelTypeBuilder<T> {
        ModelType::builder_with(name, || Ok(T::default()))
    }
}

impl<T: 'static> ModelType<T> {
    /// Start describing `T` with an explicit constructor.
    pub fn builder_with(
        name: &str,
        constructor: impl Fn() -> Result<T, FieldError> + Send + Sync + 'static,
    ) -> ModelTypeBuilder<T> {
        ModelTypeBuilder {
            name: name.to_string(),
            searchable: false,
            fields: Vec::new(),
            key: None,
            factory: Box::new(constructor),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    /// Participating fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn key_of(&self, instance: &T) -> String {
        (self.key)(instance)
    }

    pub(crate) fn accessors(&self) -> &[FieldAccessor<T>] {
        &self.accessors
    }

    pub(crate) fn instantiate(&self) -> Result<T, FieldError> {
        (self.factory)()
    }
}

struct PendingField<T> {
    name: String,
    field_type: FieldType,
    is_relation: bool,
    options: FieldOptions,
    get: Getter<T>,
    set: Setter<T>,
}

/// Builder for [`ModelType`]. Fields keep the order they are declared in.
pub struct ModelTypeBuilder<T> {
    name: String,
    searchable: bool,
    fields: Vec<PendingField<T>>,
    key: Option<KeyFn<T>>,
    factory: Factory<T>,
}

impl<T: 'static> ModelTypeBuilder<T> {
    /// Opt this type into search indexing.
    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Primary key accessor. Required.
    pub fn key(mut self, key: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.key = Some(Box::new(key));
        self
    }

    pub fn field(
        self,
        name: &str,
        field_type: FieldType,
        get: impl Fn(&T) -> Result<Option<Scalar>, FieldError> + Send + Sync + 'static,
        set: impl Fn(&mut T, Scalar) -> Result<(), FieldError> + Send + Sync + 'static,
    ) -> Self {
        self.field_with(name, field_type, FieldOptions::default(), get, set)
    }

    pub fn field_with(
        mut self,
        name: &str,
        field_type: FieldType,
        options: FieldOptions,
        get: impl Fn(&T) -> Result<Option<Scalar>, FieldError> + Send + Sync + 'static,
        set: impl Fn(&mut T, Scalar) -> Result<(), FieldError> + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(PendingField {
            name: name.to_string(),
            field_type,
            is_relation: false,
            options,
            get: Box::new(get),
            set: Box::new(set),
        });
        self
    }

    /// A reference to another model, carried as the referenced key in text form.
    pub fn relation(
        mut self,
        name: &str,
        get: impl Fn(&T) -> Result<Option<Scalar>, FieldError> + Send + Sync + 'static,
        set: impl Fn(&mut T, Scalar) -> Result<(), FieldError> + Send + Sync + 'static,
    ) -> Self {
        self.fields.push(PendingField {
            name: name.to_string(),
            field_type: FieldType::Text,
            is_relation: true,
            options: FieldOptions::default(),
            get: Box::new(get),
            set: Box::new(set),
        });
        self
    }

    pub fn build(self) -> Result<ModelType<T>, MetadataError> {
        let type_name = slugify(&self.name);
        if type_name.is_empty() {
            return Err(MetadataError::InvalidTypeName(self.name));
        }
        let Some(key) = self.key else {
            return Err(MetadataError::MissingKey(self.name));
        };

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(MetadataError::DuplicateField {
                    model: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let accessors: Vec<FieldAccessor<T>> = self
            .fields
            .into_iter()
            .filter(|f| f.options.participating)
            .map(|f| FieldAccessor {
                descriptor: FieldDescriptor {
                    is_multi_field: f.options.is_multi_field(),
                    index_hint: f.options.index,
                    name: f.name,
                    field_type: f.field_type,
                    is_relation: f.is_relation,
                },
                get: f.get,
                set: f.set,
            })
            .collect();

        if self.searchable && accessors.is_empty() {
            return Err(MetadataError::NoFields(self.name));
        }

        let descriptors = accessors.iter().map(|a| a.descriptor.clone()).collect();
        Ok(ModelType {
            name: self.name,
            type_name,
            searchable: self.searchable,
            accessors,
            descriptors,
            key,
            factory: self.factory,
        })
    }
}

/// Type-erased view of a registered [`ModelType`].
///
/// The change router only sees `&dyn Any` instances; this trait is how it
/// reaches the typed accessor table behind them.
pub trait ModelDescriptor: Send + Sync {
    /// Simple name as registered (e.g. `"Article"`).
    fn name(&self) -> &str;

    /// Slug used as the index type name (e.g. `"article"`).
    fn type_name(&self) -> &str;

    fn is_searchable(&self) -> bool;

    fn fields(&self) -> &[FieldDescriptor];

    fn model_type_id(&self) -> TypeId;

    /// Primary key of `instance`, or `None` if it is not this model's type.
    fn key_of(&self, instance: &dyn Any) -> Option<String>;

    /// Serialize `instance`, or `None` if it is not this model's type.
    fn serialize_any(&self, instance: &dyn Any) -> Option<Result<Document, SearchError>>;

    fn as_any(&self) -> &dyn Any;
}

impl<T: Send + Sync + 'static> ModelDescriptor for ModelType<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn is_searchable(&self) -> bool {
        self.searchable
    }

    fn fields(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    fn model_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn key_of(&self, instance: &dyn Any) -> Option<String> {
        instance.downcast_ref::<T>().map(|i| (self.key)(i))
    }

    fn serialize_any(&self, instance: &dyn Any) -> Option<Result<Document, SearchError>> {
        instance
            .downcast_ref::<T>()
            .map(|i| serialize::serialize(self, i))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The universe of known model types.
///
/// [`ModelRegistry::is_participating_type`] is the only place that decides
/// whether a type is searchable; schema building and change routing both
/// go through it.
#[derive(Default)]
pub struct ModelRegistry {
    models: Vec<Box<dyn ModelDescriptor>>,
    by_type: HashMap<TypeId, usize>,
    by_name: HashMap<String, usize>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Send + Sync + 'static>(
        &mut self,
        model: ModelType<T>,
    ) -> Result<(), MetadataError> {
        if self.by_type.contains_key(&TypeId::of::<T>()) || self.by_name.contains_key(&model.name)
        {
            return Err(MetadataError::AlreadyRegistered(model.name));
        }
        if model.searchable {
            if let Some(other) = self
                .participating()
                .find(|m| m.type_name() == model.type_name)
            {
                return Err(MetadataError::DuplicateTypeName {
                    type_name: model.type_name.clone(),
                    first: other.name().to_string(),
                    second: model.name,
                });
            }
        }

        let idx = self.models.len();
        self.by_type.insert(TypeId::of::<T>(), idx);
        self.by_name.insert(model.name.clone(), idx);
        self.models.push(Box::new(model));
        Ok(())
    }

    /// Chaining form of [`register`](Self::register).
    pub fn with<T: Send + Sync + 'static>(
        mut self,
        model: ModelType<T>,
    ) -> Result<Self, MetadataError> {
        self.register(model)?;
        Ok(self)
    }

    pub fn is_participating<T: 'static>(&self) -> bool {
        self.is_participating_type(TypeId::of::<T>())
    }

    /// True iff the type is registered and opted into search.
    pub fn is_participating_type(&self, type_id: TypeId) -> bool {
        self.lookup(type_id).is_some_and(|m| m.is_searchable())
    }

    pub fn lookup(&self, type_id: TypeId) -> Option<&dyn ModelDescriptor> {
        self.by_type
            .get(&type_id)
            .map(|&idx| self.models[idx].as_ref())
    }

    /// Look up a model by its registered simple name.
    pub fn by_name(&self, name: &str) -> Option<&dyn ModelDescriptor> {
        self.by_name
            .get(name)
            .map(|&idx| self.models[idx].as_ref())
    }

    pub fn model<T: 'static>(&self) -> Option<&ModelType<T>> {
        self.lookup(TypeId::of::<T>())
            .and_then(|m| m.as_any().downcast_ref::<ModelType<T>>())
    }

    pub fn fields_of<T: 'static>(&self) -> Option<&[FieldDescriptor]> {
        self.lookup(TypeId::of::<T>()).map(|m| m.fields())
    }

    /// Searchable models in registration order.
    pub fn participating(&self) -> impl Iterator<Item = &dyn ModelDescriptor> {
        self.models
            .iter()
            .filter(|m| self.is_participating_type(m.model_type_id()))
            .map(|m| m.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ModelDescriptor> {
        self.models.iter().map(|m| m.as_ref())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
