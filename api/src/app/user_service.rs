//! User service
//!
//! Handles portal user provisioning and API key authentication.

use std::sync::Arc;

use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::domain::entities::{CompanyId, NewUser, PortalUser, Role, UserId};
use crate::domain::ports::{CompanyRepository, UserRepository};
use crate::error::{AppError, DomainError};

/// Admin request to create a user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

/// Service for managing portal users
pub struct UserService {
    users: Arc<dyn UserRepository>,
    companies: Arc<dyn CompanyRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, companies: Arc<dyn CompanyRepository>) -> Self {
        Self { users, companies }
    }

    /// Create a user and hand out its API key
    ///
    /// Returns (user, api_key). The key is only shown once.
    pub async fn create(&self, request: &CreateUserRequest) -> Result<(PortalUser, String), AppError> {
        let email = request.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') || email.len() > 254 {
            return Err(AppError::BadRequest("A valid email is required".to_string()));
        }
        if request.display_name.trim().is_empty() || request.display_name.len() > 100 {
            return Err(AppError::BadRequest(
                "Display name must be between 1 and 100 characters".to_string(),
            ));
        }

        match (request.role, request.company_id) {
            (Role::Customer, None) => {
                return Err(AppError::BadRequest(
                    "Customer users must belong to a company".to_string(),
                ))
            }
            (_, Some(company_id)) => {
                if self.companies.find_by_id(&company_id).await?.is_none() {
                    return Err(AppError::NotFound(format!("Company {}", company_id)));
                }
            }
            _ => {}
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Domain(DomainError::AlreadyExists(format!(
                "User with email '{}' already exists",
                email
            ))));
        }

        let api_key = generate_api_key();
        let user = self
            .users
            .create(&NewUser {
                email,
                display_name: request.display_name.trim().to_string(),
                role: request.role,
                company_id: request.company_id,
                api_key_hash: hash_api_key(&api_key),
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Created portal user");
        Ok((user, api_key))
    }

    /// Resolve the user owning an API key
    pub async fn authenticate(&self, api_key: &str) -> Result<Option<PortalUser>, AppError> {
        Ok(self.users.find_by_api_key_hash(&hash_api_key(api_key)).await?)
    }

    /// Update the user's last seen timestamp
    pub async fn touch(&self, id: &UserId) -> Result<(), AppError> {
        self.users.update_last_seen(id).await?;
        Ok(())
    }

    pub async fn list(&self, company_id: Option<&CompanyId>) -> Result<Vec<PortalUser>, AppError> {
        Ok(self.users.list(company_id).await?)
    }
}

/// Generate a random API key
fn generate_api_key() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    format!("pk-{}", hex::encode(bytes))
}

/// Hash an API key for storage
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_company, InMemoryCompanyRepository, InMemoryUserRepository};

    fn request(role: Role, company_id: Option<CompanyId>) -> CreateUserRequest {
        CreateUserRequest {
            email: " Buyer@Example.com ".to_string(),
            display_name: "Buyer".to_string(),
            role,
            company_id,
        }
    }

    #[test]
    fn api_key_generation() {
        let key = generate_api_key();
        assert!(key.starts_with("pk-"));
        assert_eq!(key.len(), 3 + 64);
    }

    #[test]
    fn api_key_hashing_is_stable() {
        assert_eq!(hash_api_key("pk-test"), hash_api_key("pk-test"));
        assert_ne!(hash_api_key("pk-test"), "pk-test");
    }

    #[tokio::test]
    async fn created_user_authenticates_with_returned_key() {
        let company = test_company();
        let service = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryCompanyRepository::new().with_company(company.clone())),
        );

        let (user, api_key) = service
            .create(&request(Role::Customer, Some(company.id)))
            .await
            .unwrap();
        assert_eq!(user.email, "buyer@example.com");

        let found = service.authenticate(&api_key).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(service.authenticate("pk-wrong").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn customer_without_company_rejected() {
        let service = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryCompanyRepository::new()),
        );

        let err = service
            .create(&request(Role::Customer, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unknown_company_rejected() {
        let service = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryCompanyRepository::new()),
        );

        let err = service
            .create(&request(Role::Sales, Some(CompanyId::new())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let service = UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryCompanyRepository::new()),
        );

        service.create(&request(Role::Admin, None)).await.unwrap();
        let err = service.create(&request(Role::Admin, None)).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
