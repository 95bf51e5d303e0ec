//! Profile Use Case
//!
//! Read and update the authenticated user's own profile. Updates go
//! through an allow-list of editable fields; identity, role, and
//! credential fields never change through this path.

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

/// Profile update input
#[derive(Default)]
pub struct ProfileUpdateInput {
    pub name: Option<String>,
    pub gram_panchayat: Option<String>,
}

/// Profile use case
pub struct ProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> ProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Fetch the profile for a user id
    pub async fn get(&self, user_id: &UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Apply the editable fields and return the fresh profile
    pub async fn update(&self, user_id: &UserId, input: ProfileUpdateInput) -> AuthResult<User> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(AuthError::Validation("name must not be empty".to_string()));
            }
        }

        user.update_profile(
            input.name.map(|n| n.trim().to_string()),
            input.gram_panchayat,
        );
        self.user_repo.update(&user).await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::phone::Phone;
    use crate::infra::memory::InMemoryAuthRepository;

    async fn setup() -> (ProfileUseCase<InMemoryAuthRepository>, User) {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let user = User::provision_by_phone(Phone::new("+910000000001").unwrap());
        repo.create(&user).await.unwrap();
        (ProfileUseCase::new(repo), user)
    }

    #[tokio::test]
    async fn test_get_profile() {
        let (uc, seeded) = setup().await;
        let user = uc.get(&seeded.user_id).await.unwrap();
        assert_eq!(user.user_id, seeded.user_id);
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let (uc, _) = setup().await;
        let err = uc.get(&kernel::id::UserId::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_update_editable_fields() {
        let (uc, seeded) = setup().await;
        let updated = uc
            .update(
                &seeded.user_id,
                ProfileUpdateInput {
                    name: Some("  Asha  ".to_string()),
                    gram_panchayat: Some("Ward 4".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Asha");
        assert_eq!(updated.gram_panchayat.as_deref(), Some("Ward 4"));
        // Untouched fields survive
        assert_eq!(updated.phone, seeded.phone);
        assert_eq!(updated.role, seeded.role);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_name() {
        let (uc, seeded) = setup().await;
        let err = uc
            .update(
                &seeded.user_id,
                ProfileUpdateInput {
                    name: Some("   ".to_string()),
                    gram_panchayat: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_with_no_fields_is_noop() {
        let (uc, seeded) = setup().await;
        let updated = uc
            .update(&seeded.user_id, ProfileUpdateInput::default())
            .await
            .unwrap();
        assert_eq!(updated.name, seeded.name);
        assert_eq!(updated.gram_panchayat, seeded.gram_panchayat);
    }
}
