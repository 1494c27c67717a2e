//! # Command Catalogs
//!
//! A catalog is the set of command types a handler table must resolve. Catalogs
//! are frozen once assembled; unions flatten their children and collapse
//! duplicates.

use std::collections::HashSet;
use std::sync::Arc;

use crate::command::{Command, CommandType};

/// Source of the command types known to a handler table.
pub trait CommandCatalog: Send + Sync {
    fn types(&self) -> HashSet<CommandType>;
}

/// Catalog over an explicit collection of command types.
///
/// ```rust
/// use command_gate::{Command, CommandCatalog, TypeCatalog};
///
/// #[derive(Debug)]
/// struct OrderPlaced;
/// impl Command for OrderPlaced {}
///
/// let catalog = TypeCatalog::new().with::<OrderPlaced>();
/// assert_eq!(catalog.types().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: HashSet<CommandType>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_types(types: impl IntoIterator<Item = CommandType>) -> Self {
        Self {
            types: types.into_iter().collect(),
        }
    }

    pub fn with<C: Command>(mut self) -> Self {
        self.types.insert(CommandType::of::<C>());
        self
    }

    pub fn insert(&mut self, command_type: CommandType) -> bool {
        self.types.insert(command_type)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl CommandCatalog for TypeCatalog {
    fn types(&self) -> HashSet<CommandType> {
        self.types.clone()
    }
}

/// Union of several catalogs.
#[derive(Clone, Default)]
pub struct CatalogUnion {
    catalogs: Vec<Arc<dyn CommandCatalog>>,
}

impl CatalogUnion {
    pub fn new(catalogs: Vec<Arc<dyn CommandCatalog>>) -> Self {
        Self { catalogs }
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

impl CommandCatalog for CatalogUnion {
    fn types(&self) -> HashSet<CommandType> {
        self.catalogs
            .iter()
            .flat_map(|catalog| catalog.types())
            .collect()
    }
}

impl std::fmt::Debug for CatalogUnion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogUnion")
            .field("catalogs", &self.catalogs.len())
            .finish()
    }
}
