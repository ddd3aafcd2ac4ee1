//! In-memory storage backend
//!
//! A single mutex guards all tables, so every repository operation - and in
//! particular the multi-row invitation accept - executes as one atomic unit.
//! This is the moral equivalent of the row locks the Postgres backend takes,
//! which is what makes the backend usable both for development and for the
//! concurrency tests. Data is lost when the process terminates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::invitation::{InvitationId, TenantInvitation};
use crate::domain::member::{MemberId, TenantMember};
use crate::domain::tenant::{Tenant, TenantId};
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

/// All tables of the in-memory database
#[derive(Debug, Default)]
pub struct MemoryDb {
    pub users: HashMap<UserId, User>,
    pub tenants: HashMap<TenantId, Tenant>,
    pub members: HashMap<MemberId, TenantMember>,
    pub invitations: HashMap<InvitationId, TenantInvitation>,
}

/// Shared handle to the in-memory database.
///
/// Cloning is cheap; all clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryDb>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the store-wide lock
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, MemoryDb>, DomainError> {
        self.inner
            .lock()
            .map_err(|e| DomainError::storage(format!("Failed to acquire store lock: {}", e)))
    }
}
