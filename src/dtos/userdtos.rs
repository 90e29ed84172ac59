use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::usermodel::{User, UserRole};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,

    #[validate(
        length(min = 1, message = "Confirm Password is required"),
        must_match(other = "password", message = "passwords do not match")
    )]
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,

    #[validate(custom = "validate_registration_role")]
    pub role: UserRole,
}

fn validate_registration_role(role: &UserRole) -> Result<(), ValidationError> {
    if role.is_self_assignable() {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_role");
        error.message = Some("Role must be vendor or contractor".into());
        Err(error)
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(length(min = 1, message = "Email is required"), email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, Deserialize, Validate)]
pub struct RequestQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateUserProfileDto {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,

    #[validate(url(message = "Invalid profile picture URL"))]
    pub profile_picture_url: Option<String>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    pub bio: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilterUserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub profile_picture_url: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id,
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            phone: user.phone.clone(),
            role: user.role.to_str().to_string(),
            profile_picture_url: user.profile_picture_url.clone(),
            location: user.location.clone(),
            bio: user.bio.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    pub fn filter_users(users: &[User]) -> Vec<FilterUserDto> {
        users.iter().map(FilterUserDto::filter_user).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponseDto {
    pub status: String,
    pub users: Vec<FilterUserDto>,
    pub results: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserLoginResponseDto {
    pub status: String,
    pub token: String,
    pub user: FilterUserDto,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct UserSkillsDto {
    pub skill_ids: Vec<i32>,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateSkillDto {
    #[validate(length(min = 1, max = 50, message = "Skill name must be between 1 and 50 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(role: UserRole) -> RegisterUserDto {
        RegisterUserDto {
            name: "Lucia".to_string(),
            email: "lucia@example.com".to_string(),
            password: "secret123".to_string(),
            password_confirm: "secret123".to_string(),
            phone: None,
            role,
        }
    }

    #[test]
    fn registration_accepts_vendor_and_contractor() {
        assert!(register(UserRole::Vendor).validate().is_ok());
        assert!(register(UserRole::Contractor).validate().is_ok());
    }

    #[test]
    fn registration_rejects_admin_role() {
        let err = register(UserRole::Admin).validate().unwrap_err();
        assert!(err.to_string().contains("vendor or contractor"));
    }

    #[test]
    fn registration_requires_matching_passwords() {
        let mut dto = register(UserRole::Vendor);
        dto.password_confirm = "different".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn role_is_read_from_snake_case() {
        let dto: RegisterUserDto = serde_json::from_str(
            r#"{"name":"A","email":"a@b.co","password":"secret1","passwordConfirm":"secret1","role":"contractor"}"#,
        )
        .unwrap();
        assert_eq!(dto.role, UserRole::Contractor);
    }

    #[test]
    fn skill_name_length_is_bounded() {
        let dto = CreateSkillDto {
            name: "x".repeat(51),
            description: None,
        };
        assert!(dto.validate().is_err());
    }
}
