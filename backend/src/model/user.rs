/// A row of the `users` table.
#[derive(Clone, Debug)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}
