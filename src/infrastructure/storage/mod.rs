//! Storage backends and schema management

pub mod memory;
pub mod migrations;

pub use memory::MemoryStore;
pub use migrations::{run_migrations, Migration, PostgresMigrator};

/// Which storage backend the application runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local, for development and tests
    Memory,
    /// PostgreSQL via sqlx
    Postgres,
}

impl StorageBackend {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "memory" | "in_memory" | "in-memory" => Some(Self::Memory),
            "postgres" | "postgresql" => Some(Self::Postgres),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!(StorageBackend::from_str("memory"), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::from_str("in-memory"), Some(StorageBackend::Memory));
        assert_eq!(
            StorageBackend::from_str("Postgres"),
            Some(StorageBackend::Postgres)
        );
        assert_eq!(StorageBackend::from_str("sqlite"), None);
    }
}
