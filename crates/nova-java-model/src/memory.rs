use std::collections::HashMap;

use crate::{JavaModel, JavaType, ModelError, SearchScope, TypeId};

/// Simple in-memory Java model for hosts and tests.
///
/// Types are kept in insertion order, which is also the order
/// [`JavaModel::resolve_project`] reports them in.
#[derive(Clone, Debug, Default)]
pub struct MemoryJavaModel {
    project: String,
    loaded: bool,
    types: Vec<JavaType>,
    documents: HashMap<String, Vec<TypeId>>,
}

impl MemoryJavaModel {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            loaded: true,
            types: Vec::new(),
            documents: HashMap::new(),
        }
    }

    /// A model whose project failed to load; every query reports
    /// [`ModelError::ProjectNotLoaded`].
    pub fn unloaded(project: impl Into<String>) -> Self {
        Self {
            loaded: false,
            ..Self::named(project)
        }
    }

    pub fn add_type(&mut self, ty: JavaType) -> TypeId {
        let id = TypeId::new(self.types.len() as u32);
        if let Some(uri) = ty.uri() {
            self.documents.entry(uri.to_string()).or_default().push(id);
        }
        self.types.push(ty);
        id
    }

    /// Register an (initially empty) source document.
    pub fn add_document(&mut self, uri: impl Into<String>) {
        self.documents.entry(uri.into()).or_default();
    }

    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.types
            .iter()
            .position(|ty| ty.name == name)
            .map(|idx| TypeId::new(idx as u32))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn ensure_loaded(&self) -> Result<(), ModelError> {
        if self.loaded {
            Ok(())
        } else {
            Err(ModelError::ProjectNotLoaded(self.project.clone()))
        }
    }
}

impl JavaModel for MemoryJavaModel {
    fn resolve_project(&self, scope: SearchScope) -> Result<Vec<TypeId>, ModelError> {
        self.ensure_loaded()?;
        Ok(self
            .types
            .iter()
            .enumerate()
            .filter(|(_, ty)| scope.includes(&ty.origin))
            .map(|(idx, _)| TypeId::new(idx as u32))
            .collect())
    }

    fn java_type(&self, id: TypeId) -> Result<&JavaType, ModelError> {
        self.ensure_loaded()?;
        self.types
            .get(id.to_raw() as usize)
            .ok_or(ModelError::UnknownType(id))
    }

    fn types_in_document(&self, uri: &str) -> Result<Vec<TypeId>, ModelError> {
        self.ensure_loaded()?;
        self.documents
            .get(uri)
            .cloned()
            .ok_or_else(|| ModelError::UnknownDocument(uri.to_string()))
    }
}
