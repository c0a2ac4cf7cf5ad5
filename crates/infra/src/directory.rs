//! Directory service: users and suppliers.

use std::sync::Arc;

use stockroom_core::{DomainError, Entity, SupplierId, UserId};
use stockroom_parties::{NewSupplier, NewUser, Supplier, User};

use crate::audit;
use crate::engine::EngineError;
use crate::store::{AuditStore, DirectoryStore};

pub struct Directory<S> {
    store: Arc<S>,
}

impl<S> Clone for Directory<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> Directory<S>
where
    S: DirectoryStore + AuditStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a user. Emails are unique case-insensitively.
    pub async fn create_user(
        &self,
        input: NewUser,
        acting_user: &str,
    ) -> Result<User, EngineError> {
        let user = User::new(UserId::new(), input)?;
        if self
            .store
            .user_by_email(&user.normalized_email())
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(format!(
                "email already registered: {}",
                user.email()
            ))
            .into());
        }
        self.store.insert_user(user.clone()).await?;
        audit::record_best_effort(
            &*self.store,
            acting_user,
            &format!("Created user {}.", user.name()),
        )
        .await;
        Ok(user)
    }

    pub async fn update_user(
        &self,
        id: UserId,
        input: NewUser,
        acting_user: &str,
    ) -> Result<User, EngineError> {
        let mut user = self
            .store
            .user(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user {id}")))?;
        user.update(input)?;
        if let Some(existing) = self.store.user_by_email(&user.normalized_email()).await? {
            if *existing.id() != id {
                return Err(DomainError::conflict(format!(
                    "email already registered: {}",
                    user.email()
                ))
                .into());
            }
        }
        self.store.update_user(user.clone()).await?;
        audit::record_best_effort(
            &*self.store,
            acting_user,
            &format!("Updated user {}.", user.name()),
        )
        .await;
        Ok(user)
    }

    pub async fn delete_user(&self, id: UserId, acting_user: &str) -> Result<(), EngineError> {
        let user = self
            .store
            .user(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user {id}")))?;
        self.store.remove_user(id).await?;
        audit::record_best_effort(
            &*self.store,
            acting_user,
            &format!("Deleted user {}.", user.name()),
        )
        .await;
        Ok(())
    }

    pub async fn users(&self) -> Result<Vec<User>, EngineError> {
        Ok(self.store.users().await?)
    }

    pub async fn create_supplier(
        &self,
        input: NewSupplier,
        acting_user: &str,
    ) -> Result<Supplier, EngineError> {
        let supplier = Supplier::new(SupplierId::new(), input)?;
        self.store.insert_supplier(supplier.clone()).await?;
        audit::record_best_effort(
            &*self.store,
            acting_user,
            &format!("Created supplier {}.", supplier.name()),
        )
        .await;
        Ok(supplier)
    }

    pub async fn update_supplier(
        &self,
        id: SupplierId,
        input: NewSupplier,
        acting_user: &str,
    ) -> Result<Supplier, EngineError> {
        let mut supplier = self
            .store
            .supplier(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))?;
        supplier.update(input)?;
        self.store.update_supplier(supplier.clone()).await?;
        audit::record_best_effort(
            &*self.store,
            acting_user,
            &format!("Updated supplier {}.", supplier.name()),
        )
        .await;
        Ok(supplier)
    }

    pub async fn delete_supplier(
        &self,
        id: SupplierId,
        acting_user: &str,
    ) -> Result<(), EngineError> {
        let supplier = self
            .store
            .supplier(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))?;
        self.store.remove_supplier(id).await?;
        audit::record_best_effort(
            &*self.store,
            acting_user,
            &format!("Deleted supplier {}.", supplier.name()),
        )
        .await;
        Ok(())
    }

    pub async fn suppliers(&self) -> Result<Vec<Supplier>, EngineError> {
        Ok(self.store.suppliers().await?)
    }
}
