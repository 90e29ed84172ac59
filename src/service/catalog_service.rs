// service/catalog_service.rs
use std::sync::Arc;

use crate::{
    db::{db::DBClient, servicedb::ServiceExt, skilldb::SkillExt},
    dtos::servicedtos::{CreateServiceDto, UpdateServiceDto},
    models::servicemodel::Service,
    service::error::ServiceError,
    utils::decimal::money_from_f64,
};

/// Owner check for service mutations.
pub fn ensure_owner(service: &Service, acting_user: i32) -> Result<(), ServiceError> {
    if service.vendor_id == acting_user {
        Ok(())
    } else {
        Err(ServiceError::UnauthorizedServiceAccess(acting_user, service.id))
    }
}

/// Write side of the catalogue: services are created by their vendor and only
/// the vendor may change or remove them.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db_client: Arc<DBClient>,
}

impl CatalogService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    async fn ensure_skill(&self, skill_id: Option<i32>) -> Result<(), ServiceError> {
        if let Some(skill_id) = skill_id {
            self.db_client
                .get_skill(skill_id)
                .await?
                .ok_or(ServiceError::SkillNotFound(skill_id))?;
        }
        Ok(())
    }

    async fn owned_service(&self, service_id: i32, acting_user: i32) -> Result<Service, ServiceError> {
        let service = self
            .db_client
            .get_service(service_id)
            .await?
            .ok_or(ServiceError::ServiceNotFound(service_id))?;

        ensure_owner(&service, acting_user)?;
        Ok(service)
    }

    pub async fn create_service(
        &self,
        vendor_id: i32,
        body: CreateServiceDto,
    ) -> Result<Service, ServiceError> {
        self.ensure_skill(body.skill_id).await?;
        let price = money_from_f64(body.price).map_err(ServiceError::InvalidArgument)?;

        let service = self
            .db_client
            .create_service(
                vendor_id,
                body.skill_id,
                body.title,
                body.description,
                price,
                body.is_active.unwrap_or(true),
                body.image_url,
            )
            .await?;

        tracing::info!("service {} created by vendor {}", service.id, vendor_id);
        Ok(service)
    }

    pub async fn update_service(
        &self,
        service_id: i32,
        acting_user: i32,
        body: UpdateServiceDto,
    ) -> Result<Service, ServiceError> {
        self.owned_service(service_id, acting_user).await?;
        self.ensure_skill(body.skill_id).await?;

        let price = body
            .price
            .map(money_from_f64)
            .transpose()
            .map_err(ServiceError::InvalidArgument)?;

        let service = self
            .db_client
            .update_service(
                service_id,
                body.skill_id,
                body.title,
                body.description,
                price,
                body.is_active,
                body.image_url,
            )
            .await?;

        Ok(service)
    }

    pub async fn delete_service(&self, service_id: i32, acting_user: i32) -> Result<(), ServiceError> {
        self.owned_service(service_id, acting_user).await?;
        self.db_client.delete_service(service_id).await?;

        tracing::info!("service {} deleted by vendor {}", service_id, acting_user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::error::ErrorKind;
    use chrono::Utc;
    use sqlx::types::BigDecimal;

    #[test]
    fn only_the_vendor_owns_a_service() {
        let service = Service {
            id: 4,
            vendor_id: 7,
            skill_id: None,
            title: "Jardinería".to_string(),
            description: None,
            price: BigDecimal::from(25),
            is_active: true,
            image_url: None,
            created_at: Utc::now(),
        };

        assert!(ensure_owner(&service, 7).is_ok());
        let err = ensure_owner(&service, 8).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.to_string(), "User 8 is not authorized to modify service 4");
    }
}
