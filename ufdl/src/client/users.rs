use super::actions::Actions;
use crate::errors::UfdlError;
use crate::models::User;

impl Actions<'_, User> {
    pub async fn load_by_username(&self, username: &str) -> Result<Option<User>, UfdlError> {
        self.load_by("username", username).await
    }
}
