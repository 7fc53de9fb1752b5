//! services/client/src/repository/users.rs
//!
//! Implements the `UserRepository` port over the backend REST API.

use crate::repository::protocol::{
    self, LanguageRequest, LoginRequest, RegisterRequest, UserResponse,
};
use crate::repository::rest::{require, RestClient};
use async_trait::async_trait;
use reqwest::Method;
use storybook_core::{Language, PortResult, User, UserId, UserRepository};
use tracing::info;

#[derive(Clone)]
pub struct HttpUserRepository {
    client: RestClient,
}

impl HttpUserRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserRepository for HttpUserRepository {
    async fn register(&self, device_id: &str, language: &Language) -> PortResult<User> {
        require(device_id, "device id")?;
        let body = RegisterRequest {
            device_id: device_id.to_string(),
            language: language.code().to_string(),
        };
        let response: UserResponse = self
            .client
            .call(self.client.request(Method::POST, &protocol::USER_REGISTER).json(&body))
            .await?;
        info!(user_id = %response.user_id, "Registered device");
        Ok(response.into_domain())
    }

    async fn login(&self, device_id: &str) -> PortResult<User> {
        require(device_id, "device id")?;
        let body = LoginRequest {
            device_id: device_id.to_string(),
        };
        let response: UserResponse = self
            .client
            .call(self.client.request(Method::POST, &protocol::USER_LOGIN).json(&body))
            .await?;
        Ok(response.into_domain())
    }

    async fn info(&self, user_id: &UserId) -> PortResult<User> {
        require(user_id.as_str(), "user id")?;
        let response: UserResponse = self
            .client
            .call(self.client.request(Method::GET, &protocol::user_path(user_id)))
            .await?;
        Ok(response.into_domain())
    }

    async fn update_language(&self, user_id: &UserId, language: &Language) -> PortResult<User> {
        require(user_id.as_str(), "user id")?;
        require(language.code(), "language")?;
        let body = LanguageRequest {
            language: language.code().to_string(),
        };
        let response: UserResponse = self
            .client
            .call(
                self.client
                    .request(Method::PUT, &protocol::user_language_path(user_id))
                    .json(&body),
            )
            .await?;
        Ok(response.into_domain())
    }
}
