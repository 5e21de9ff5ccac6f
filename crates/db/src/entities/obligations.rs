//! `SeaORM` Entity for the obligations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ObligationKind, ObligationState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "obligations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// `(session_id, kind)` is unique - the idempotence anchor.
    pub kind: ObligationKind,
    pub account_id: Uuid,
    pub amount: Decimal,
    /// Unsettled balance; only ever decreases, via applications.
    pub remaining: Decimal,
    pub accrual_date: Date,
    pub state: ObligationState,
    pub session_id: Uuid,
    pub student_id: Option<Uuid>,
    pub tutor_id: Option<Uuid>,
    pub course_id: Option<Uuid>,
    pub enrollment_id: Option<Uuid>,
    pub detail: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::class_sessions::Entity",
        from = "Column::SessionId",
        to = "super::class_sessions::Column::Id"
    )]
    ClassSessions,
    #[sea_orm(has_many = "super::applications::Entity")]
    Applications,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::class_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassSessions.def()
    }
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
