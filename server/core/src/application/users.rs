// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Accounts: registration, login, profile edits and the bootstrap admin.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::application::auth::{hash_password, verify_password, AuthUser, TokenService};
use crate::application::error::{ServiceError, ServiceResult};
use crate::domain::common::UserId;
use crate::domain::repository::UserRepository;
use crate::domain::user::{Gender, Role, User, UserProfile, UserSummary};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    pub role: Option<String>,
    #[serde(rename = "class")]
    pub class_name: Option<String>,
    pub student_id: Option<String>,
    pub section: Option<String>,
    pub full_name: Option<String>,
    pub roll_number: Option<u32>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<UserProfile> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();
        if username.is_empty() || request.password.is_empty() || email.is_empty() {
            return Err(ServiceError::validation(
                "Username, password, and email are required",
            ));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }
        if !email.contains('@') {
            return Err(ServiceError::validation("Please provide a valid email address"));
        }

        let role = match request.role.as_deref() {
            None | Some("") => Role::Student,
            Some(raw) => raw.parse::<Role>().map_err(ServiceError::Validation)?,
        };

        if role == Role::Admin && self.users.count_by_role(Role::Admin).await? >= 1 {
            return Err(ServiceError::forbidden(
                "Only one admin is allowed in the system. Admin registration is disabled.",
            ));
        }

        let class_name = non_empty(request.class_name);
        if role == Role::Student && class_name.is_none() {
            return Err(ServiceError::validation(
                "Class is required for student registration",
            ));
        }

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(ServiceError::validation("User already exists"));
        }

        let mut user = User::new(username, hash_password(&request.password)?, email, role);
        if role == Role::Student {
            user.class_name = class_name;
            user.student_id = non_empty(request.student_id);
            user.section = non_empty(request.section);
            user.full_name = non_empty(request.full_name);
            user.roll_number = request.roll_number;
            user.parent_name = non_empty(request.parent_name);
            user.parent_phone = non_empty(request.parent_phone);
            user.address = non_empty(request.address);
            user.date_of_birth = request.date_of_birth;
            user.gender = request.gender;
        } else {
            user.full_name = non_empty(request.full_name);
        }

        self.users.save(&user).await?;
        info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user.profile())
    }

    /// Returns a signed token and the caller's profile.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<(String, UserProfile)> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::validation("Username and password are required"));
        }
        let user = self
            .users
            .find_by_username(username.trim())
            .await?
            .filter(|user| verify_password(password, &user.password_hash))
            .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        let token = self.tokens.issue(&user)?;
        info!(user_id = %user.id, "User logged in");
        Ok((token, user.profile()))
    }

    pub async fn update_profile(
        &self,
        caller: &AuthUser,
        update: ProfileUpdate,
    ) -> ServiceResult<UserProfile> {
        let mut user = self
            .users
            .find_by_id(caller.id)
            .await?
            .ok_or(ServiceError::NotFound("User"))?;

        if let Some(username) = non_empty(update.username) {
            if username != user.username {
                if self.users.find_by_username(&username).await?.is_some() {
                    return Err(ServiceError::validation("This username is already taken."));
                }
                user.username = username;
            }
        }
        if let Some(email) = non_empty(update.email) {
            if !email.contains('@') {
                return Err(ServiceError::validation("Please provide a valid email address"));
            }
            user.email = email;
        }
        if let Some(full_name) = non_empty(update.full_name) {
            user.full_name = Some(full_name);
        }
        user.updated_at = Utc::now();

        self.users.save(&user).await?;
        Ok(user.profile())
    }

    pub async fn profile(&self, id: UserId) -> ServiceResult<UserProfile> {
        self.users
            .find_by_id(id)
            .await?
            .map(|u| u.profile())
            .ok_or(ServiceError::NotFound("User"))
    }

    /// Compact projection used to populate references; `None` for unknown ids.
    pub async fn summary(&self, id: UserId) -> ServiceResult<Option<UserSummary>> {
        Ok(self.users.find_by_id(id).await?.map(|u| u.summary()))
    }

    pub async fn require_student(&self, id: UserId) -> ServiceResult<User> {
        match self.users.find_by_id(id).await? {
            Some(user) if user.role == Role::Student => Ok(user),
            _ => Err(ServiceError::NotFound("Student")),
        }
    }

    pub async fn count_students(&self) -> ServiceResult<u64> {
        Ok(self.users.count_by_role(Role::Student).await?)
    }

    /// Creates the admin account unless one already exists.
    /// Returns `None` when an admin was already present.
    pub async fn ensure_admin(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> ServiceResult<Option<UserProfile>> {
        if self.users.count_by_role(Role::Admin).await? > 0 {
            return Ok(None);
        }
        let profile = self
            .register(RegisterRequest {
                username: username.to_string(),
                password: password.to_string(),
                email: email.to_string(),
                role: Some("admin".to_string()),
                ..Default::default()
            })
            .await?;
        Ok(Some(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::InMemoryUserRepository;

    fn service() -> UserService {
        UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            TokenService::new("unit-secret", 1),
        )
    }

    fn student(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: "secret1".to_string(),
            email: format!("{}@school.test", username),
            role: Some("student".to_string()),
            class_name: Some("6A".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let svc = service();
        let profile = svc.register(student("anya")).await.unwrap();
        assert_eq!(profile.class_name.as_deref(), Some("6A"));

        let (token, logged_in) = svc.login("anya", "secret1").await.unwrap();
        assert_eq!(logged_in.id, profile.id);
        assert_eq!(svc.tokens().verify(&token).unwrap().sub, profile.id);

        assert!(matches!(
            svc.login("anya", "wrong-pass").await,
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let svc = service();
        let mut short = student("bo");
        short.password = "12345".to_string();
        assert!(matches!(svc.register(short).await, Err(ServiceError::Validation(_))));

        let mut no_at = student("cy");
        no_at.email = "cy.school.test".to_string();
        assert!(matches!(svc.register(no_at).await, Err(ServiceError::Validation(_))));

        let mut classless = student("di");
        classless.class_name = None;
        assert!(matches!(svc.register(classless).await, Err(ServiceError::Validation(_))));

        let mut bad_role = student("ed");
        bad_role.role = Some("principal".to_string());
        assert!(matches!(svc.register(bad_role).await, Err(ServiceError::Validation(_))));

        svc.register(student("fay")).await.unwrap();
        assert!(matches!(
            svc.register(student("fay")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_single_admin() {
        let svc = service();
        assert!(svc
            .ensure_admin("root", "rootpass", "root@school.test")
            .await
            .unwrap()
            .is_some());
        assert!(svc
            .ensure_admin("root2", "rootpass", "root2@school.test")
            .await
            .unwrap()
            .is_none());

        let second = RegisterRequest {
            username: "boss".to_string(),
            password: "bosspass".to_string(),
            email: "boss@school.test".to_string(),
            role: Some("admin".to_string()),
            ..Default::default()
        };
        assert!(matches!(svc.register(second).await, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_username() {
        let svc = service();
        svc.register(student("gil")).await.unwrap();
        let hal = svc.register(student("hal")).await.unwrap();
        let caller = AuthUser {
            id: hal.id,
            username: hal.username.clone(),
            role: Role::Student,
            class_name: Some("6A".to_string()),
        };

        let taken = ProfileUpdate {
            username: Some("gil".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            svc.update_profile(&caller, taken).await,
            Err(ServiceError::Validation(_))
        ));

        let rename = ProfileUpdate {
            full_name: Some("Hal Jordan".to_string()),
            ..Default::default()
        };
        let updated = svc.update_profile(&caller, rename).await.unwrap();
        assert_eq!(updated.full_name.as_deref(), Some("Hal Jordan"));
    }
}
