//! Authentication test helpers
//!
//! Users are written straight to the store with a low bcrypt cost so that
//! tests stay fast; the signup endpoint itself is covered in auth_test.rs.

use uuid::Uuid;

use taskboard::backend::auth::users::User;
use taskboard::backend::store::DocumentStore;

use super::app::TestApp;

pub const TEST_PASSWORD: &str = "correct-horse";

pub struct TestUser {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub token: String,
}

impl TestApp {
    /// Create a user in the store and issue a token for them
    pub async fn register(&self, user_name: &str) -> TestUser {
        let password_hash = bcrypt::hash(TEST_PASSWORD, 4).expect("hash");
        let user = User::new(
            format!("{} Tester", user_name),
            user_name.to_string(),
            format!("{}_{}@example.com", user_name, Uuid::new_v4().simple()),
            password_hash,
        );
        self.state.store.put_user(&user).await.expect("store user");
        let token = self
            .state
            .sessions
            .create_token(user.id, &user.email)
            .expect("token");

        TestUser {
            id: user.id,
            user_name: user.user_name,
            email: user.email,
            token,
        }
    }
}
