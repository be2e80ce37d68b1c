use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{read, write, ModelError};

/// bcrypt work factor for new password hashes.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Clone, Debug)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct UserTable {
    last_id: i64,
    rows: BTreeMap<i64, User>,
}

impl UserTable {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows.values().any(|u| u.email == email && Some(u.id) != except)
    }
}

/// User repository. Passwords are only ever stored as bcrypt hashes.
#[derive(Debug)]
pub struct UserModel {
    table: RwLock<UserTable>,
    cost: u32,
}

impl Default for UserModel {
    fn default() -> Self {
        Self::with_cost(DEFAULT_BCRYPT_COST)
    }
}

impl UserModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model hashing at `cost` instead of [`DEFAULT_BCRYPT_COST`].
    pub fn with_cost(cost: u32) -> Self {
        Self { table: RwLock::default(), cost }
    }

    /// Creates a user. Fails with `DuplicateEmail` if the address is taken.
    pub async fn insert(&self, name: &str, email: &str, password: &str) -> Result<i64, ModelError> {
        if read(&self.table).email_taken(email, None) {
            return Err(ModelError::DuplicateEmail);
        }
        let hashed_password = hash(password, self.cost).await?;

        let mut table = write(&self.table);
        // Re-check: another signup may have won the race while we hashed.
        if table.email_taken(email, None) {
            return Err(ModelError::DuplicateEmail);
        }
        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(id, User {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            hashed_password,
            created: Utc::now(),
        });
        Ok(id)
    }

    /// Returns the id of the user with this email and password.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<i64, ModelError> {
        let found = read(&self.table)
            .rows
            .values()
            .find(|u| u.email == email)
            .map(|u| (u.id, u.hashed_password.clone()));
        let Some((id, hashed_password)) = found else {
            return Err(ModelError::InvalidCredentials);
        };

        if verify(password, &hashed_password).await? {
            Ok(id)
        } else {
            Err(ModelError::InvalidCredentials)
        }
    }

    pub fn exists(&self, id: i64) -> Result<bool, ModelError> {
        Ok(read(&self.table).rows.contains_key(&id))
    }

    pub fn get(&self, id: i64) -> Result<User, ModelError> {
        read(&self.table).rows.get(&id).cloned().ok_or(ModelError::NoRecord)
    }

    pub fn update(&self, id: i64, name: &str, email: &str) -> Result<(), ModelError> {
        let mut table = write(&self.table);
        if table.email_taken(email, Some(id)) {
            return Err(ModelError::DuplicateEmail);
        }
        let user = table.rows.get_mut(&id).ok_or(ModelError::NoRecord)?;
        user.name = name.to_owned();
        user.email = email.to_owned();
        Ok(())
    }

    /// Replaces the password after checking `current` against the stored hash.
    pub async fn update_password(&self, id: i64, current: &str, new: &str) -> Result<(), ModelError> {
        let stored = read(&self.table)
            .rows
            .get(&id)
            .map(|u| u.hashed_password.clone())
            .ok_or(ModelError::NoRecord)?;

        if !verify(current, &stored).await? {
            return Err(ModelError::InvalidCredentials);
        }
        let hashed_password = hash(new, self.cost).await?;

        let mut table = write(&self.table);
        let user = table.rows.get_mut(&id).ok_or(ModelError::NoRecord)?;
        user.hashed_password = hashed_password;
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<(), ModelError> {
        write(&self.table)
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(ModelError::NoRecord)
    }

    /// Every user, newest first.
    pub fn list(&self) -> Result<Vec<User>, ModelError> {
        let mut users: Vec<User> = read(&self.table).rows.values().cloned().collect();
        users.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(users)
    }
}

// bcrypt blocks for tens of milliseconds; keep it off the async workers.
async fn hash(password: &str, cost: u32) -> Result<String, ModelError> {
    let password = password.to_owned();
    Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
}

async fn verify(password: &str, hashed: &str) -> Result<bool, ModelError> {
    let password = password.to_owned();
    let hashed = hashed.to_owned();
    Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed)).await??)
}
