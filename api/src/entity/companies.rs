use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub sold_to: String,
    pub sales_org: String,
    pub distribution_channel: String,
    pub division: String,
    pub default_ship_to: Option<String>,
    pub order_type: String,
    pub quote_type: String,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::sap_connections::Entity")]
    SapConnections,
    #[sea_orm(has_many = "super::portal_users::Entity")]
    PortalUsers,
}

impl Related<super::sap_connections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SapConnections.def()
    }
}

impl Related<super::portal_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PortalUsers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
