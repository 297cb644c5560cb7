use std::sync::Arc;

use uuid::Uuid;

use super::{ServiceResult, auth::create_account};
use crate::{
    auth::PasswordHasher,
    authz::{Action, Caller, Resource, authorize, ownership},
    db::{DbPool, Page, PageParams},
    models::{ChangeRole, CreateUser, UpdateUser, User, UserFilter, normalize_email},
};

/// Account administration and self-service profile edits.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(db: Arc<DbPool>, hasher: PasswordHasher) -> Self {
        Self { db, hasher }
    }

    pub async fn list(
        &self,
        caller: &Caller,
        filter: UserFilter,
        params: PageParams,
    ) -> ServiceResult<Page<User>> {
        authorize(Some(caller), Action::Read, &Resource::UserDirectory)?;
        Ok(self.db.users().list(&filter, params.normalized()).await?)
    }

    /// Create an account on someone else's behalf. Any role may be assigned.
    pub async fn create(&self, caller: &Caller, input: CreateUser) -> ServiceResult<User> {
        authorize(Some(caller), Action::Create, &Resource::UserDirectory)?;
        let role = input.role.unwrap_or_default();
        create_account(&self.db, &self.hasher, input, role).await
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> ServiceResult<User> {
        let user = ownership::user(&self.db, id).await?;
        authorize(Some(caller), Action::Read, &user.resource)?;
        Ok(user.record)
    }

    /// Update profile fields. Changing the role or active flag additionally
    /// requires the privilege to administer users.
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        mut input: UpdateUser,
    ) -> ServiceResult<User> {
        let user = ownership::user(&self.db, id).await?;
        authorize(Some(caller), Action::Update, &user.resource)?;
        if input.is_privileged() {
            authorize(Some(caller), Action::Update, &Resource::UserPrivileges)?;
        }

        if let Some(email) = input.email.as_mut() {
            *email = normalize_email(email);
        }
        Ok(self.db.users().update(id, input).await?)
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> ServiceResult<()> {
        let user = ownership::user(&self.db, id).await?;
        authorize(Some(caller), Action::Delete, &user.resource)?;
        self.db.users().delete(id).await?;
        tracing::info!(user_id = %id, deleted_by = %caller.id, "User deleted");
        Ok(())
    }

    pub async fn change_role(
        &self,
        caller: &Caller,
        id: Uuid,
        input: ChangeRole,
    ) -> ServiceResult<User> {
        ownership::user(&self.db, id).await?;
        authorize(Some(caller), Action::Update, &Resource::UserPrivileges)?;

        let user = self
            .db
            .users()
            .update(
                id,
                UpdateUser {
                    role: Some(input.role),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(user_id = %id, role = %user.role, changed_by = %caller.id, "User role changed");
        Ok(user)
    }
}
