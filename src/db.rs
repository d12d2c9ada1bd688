//! Salsa database definition.

/// Database trait for the localisation workbench.
#[salsa::db]
pub trait L10nDatabase: salsa::Database {}

/// Concrete workbench database.
#[salsa::db]
#[derive(Clone, Default)]
pub struct L10nDatabaseImpl {
    /// Salsa storage.
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for L10nDatabaseImpl {}

#[salsa::db]
impl L10nDatabase for L10nDatabaseImpl {}

impl std::fmt::Debug for L10nDatabaseImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L10nDatabaseImpl").finish_non_exhaustive()
    }
}
