//! User account repository contract and SQLite implementation.

use super::base_repo::{ColumnSet, CrudRepository, RepoResult};
use crate::db::QueryExecutor;
use crate::model::user::{encode_patient_ids, NewUser, User, UserChanges};
use crate::model::EntityId;
use rusqlite::types::Value;
use rusqlite::Connection;

const BY_USERNAME_SQL: &str = "SELECT * FROM users WHERE username = ?1;";
const LIST_ALL_SQL: &str = "SELECT * FROM users ORDER BY username ASC, id ASC;";
const ASSIGNED_TO_SQL: &str = "SELECT * FROM users
     WHERE EXISTS (
        SELECT 1 FROM json_each(users.assigned_patients)
        WHERE json_each.value = ?1
     )
     ORDER BY username ASC, id ASC;";

impl ColumnSet for NewUser {
    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("username", Value::Text(self.username.clone())),
            ("password", Value::Text(self.password.clone())),
            ("role", Value::Text(self.role.as_str().to_string())),
            (
                "assigned_patients",
                Value::Text(encode_patient_ids(&self.assigned_patients)),
            ),
        ]
    }
}

impl ColumnSet for UserChanges {
    fn columns(&self) -> Vec<(&'static str, Value)> {
        let mut columns = Vec::new();
        if let Some(username) = self.username.as_ref() {
            columns.push(("username", Value::Text(username.clone())));
        }
        if let Some(password) = self.password.as_ref() {
            columns.push(("password", Value::Text(password.clone())));
        }
        if let Some(role) = self.role.as_ref() {
            columns.push(("role", Value::Text(role.as_str().to_string())));
        }
        if let Some(ids) = self.assigned_patients.as_ref() {
            columns.push(("assigned_patients", Value::Text(encode_patient_ids(ids))));
        }
        columns
    }
}

pub trait UserRepository {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<User>>;
    fn create(&self, user: &NewUser) -> RepoResult<User>;
    fn update(&self, id: EntityId, changes: &UserChanges) -> RepoResult<Option<User>>;
    fn delete(&self, id: EntityId) -> RepoResult<bool>;
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    fn list_all(&self) -> RepoResult<Vec<User>>;
    /// Users whose assignment list contains `patient_id`.
    fn list_assigned_to(&self, patient_id: EntityId) -> RepoResult<Vec<User>>;
}

pub struct SqliteUserRepository<'x, X: ?Sized = Connection> {
    crud: CrudRepository<'x, User, X>,
}

impl<'x, X: QueryExecutor + ?Sized> SqliteUserRepository<'x, X> {
    pub fn new(executor: &'x X) -> Self {
        Self {
            crud: CrudRepository::new(executor),
        }
    }
}

impl<X: QueryExecutor + ?Sized> UserRepository for SqliteUserRepository<'_, X> {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<User>> {
        self.crud.find_by_id(id)
    }

    fn create(&self, user: &NewUser) -> RepoResult<User> {
        self.crud.create(user)
    }

    fn update(&self, id: EntityId, changes: &UserChanges) -> RepoResult<Option<User>> {
        self.crud.update(id, changes)
    }

    fn delete(&self, id: EntityId) -> RepoResult<bool> {
        self.crud.delete(id)
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .crud
            .fetch_all(BY_USERNAME_SQL, &[Value::Text(username.to_string())])?
            .into_iter()
            .next())
    }

    fn list_all(&self) -> RepoResult<Vec<User>> {
        self.crud.fetch_all(LIST_ALL_SQL, &[])
    }

    fn list_assigned_to(&self, patient_id: EntityId) -> RepoResult<Vec<User>> {
        self.crud
            .fetch_all(ASSIGNED_TO_SQL, &[Value::Integer(patient_id)])
    }
}
