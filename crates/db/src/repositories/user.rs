//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use mugshot_core::media::{MediaError, ProfileImageRecords};

use crate::entities::users;

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<users::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            profile_image_key: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Returns the user's current profile image key, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn profile_image_key(&self, id: Uuid) -> Result<Option<String>, DbErr> {
        let user = users::Entity::find_by_id(id).one(&self.db).await?;
        Ok(user.and_then(|u| u.profile_image_key))
    }

    /// Points the user's record at a new profile image key.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub async fn set_profile_image_key(&self, id: Uuid, key: &str) -> Result<(), DbErr> {
        let user = users::ActiveModel {
            id: Set(id),
            profile_image_key: Set(Some(key.to_string())),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        users::Entity::update(user).exec(&self.db).await?;
        Ok(())
    }
}

impl ProfileImageRecords for UserRepository {
    async fn current_key(&self, owner_id: Uuid) -> Result<Option<String>, MediaError> {
        self.profile_image_key(owner_id)
            .await
            .map_err(|e| MediaError::record(e.to_string()))
    }

    async fn set_current_key(&self, owner_id: Uuid, key: &str) -> Result<(), MediaError> {
        self.set_profile_image_key(owner_id, key)
            .await
            .map_err(|e| MediaError::record(e.to_string()))
    }
}
