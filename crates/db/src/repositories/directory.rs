//! Database-backed guardian directory.

use async_trait::async_trait;
use aula_core::collaborators::{CollaboratorError, GuardianContact, GuardianDirectory};
use aula_shared::types::GuardianId;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::guardians;

/// Resolves guardians against the guardians table.
///
/// Lookup priority is email, then phone, then exact full name; a guardian
/// row is created when nothing matches and the contact carries a name.
#[derive(Debug, Clone)]
pub struct DbGuardianDirectory {
    db: DatabaseConnection,
}

impl DbGuardianDirectory {
    /// Creates a new directory over the given connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Uuid>, sea_orm::DbErr> {
        let found = guardians::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(guardians::Column::Email)))
                    .eq(email.to_lowercase()),
            )
            .one(&self.db)
            .await?;
        Ok(found.map(|row| row.id))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Uuid>, sea_orm::DbErr> {
        let found = guardians::Entity::find()
            .filter(guardians::Column::Phone.eq(phone))
            .one(&self.db)
            .await?;
        Ok(found.map(|row| row.id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Uuid>, sea_orm::DbErr> {
        let found = guardians::Entity::find()
            .filter(guardians::Column::FullName.eq(name))
            .one(&self.db)
            .await?;
        Ok(found.map(|row| row.id))
    }

    async fn create(&self, contact: &GuardianContact, name: &str) -> Result<Uuid, sea_orm::DbErr> {
        let row = guardians::ActiveModel {
            id: Set(Uuid::now_v7()),
            full_name: Set(name.to_owned()),
            email: Set(contact.email.clone()),
            phone: Set(contact.phone.clone()),
            created_at: Set(Utc::now().into()),
        };
        let stored = row.insert(&self.db).await?;
        Ok(stored.id)
    }
}

#[async_trait]
impl GuardianDirectory for DbGuardianDirectory {
    async fn find_or_create(
        &self,
        contact: &GuardianContact,
    ) -> Result<Option<GuardianId>, CollaboratorError> {
        let map_err = |err: sea_orm::DbErr| CollaboratorError::new("guardian_directory", err.to_string());

        if contact.is_empty() {
            return Ok(None);
        }

        if let Some(email) = &contact.email {
            if let Some(id) = self.find_by_email(email).await.map_err(map_err)? {
                return Ok(Some(GuardianId::from_uuid(id)));
            }
        }

        if let Some(phone) = &contact.phone {
            if let Some(id) = self.find_by_phone(phone).await.map_err(map_err)? {
                return Ok(Some(GuardianId::from_uuid(id)));
            }
        }

        if let Some(name) = &contact.name {
            if let Some(id) = self.find_by_name(name).await.map_err(map_err)? {
                return Ok(Some(GuardianId::from_uuid(id)));
            }

            let id = self.create(contact, name).await.map_err(map_err)?;
            return Ok(Some(GuardianId::from_uuid(id)));
        }

        // Email or phone only, no match, and nothing to name a new row by.
        Ok(None)
    }
}
