//! User storage.
//!
//! User name, email and phone number are unique across all users. The in-memory store
//! enforces that on insert and on update while holding the write lock, so two concurrent
//! registrations cannot both claim the same address.

use crate::error::{ClinicError, ClinicResult};
use crate::repositories::shared::{paginate, Page, PageRequest};
use crate::role::Role;
use crate::user::{Department, Gender, User};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Optional filters for a user search. Unset fields match everything.
///
/// User name, real name, email and phone number match case-insensitively on any part of the
/// stored value. The remaining filters need an exact match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserCriteria {
    pub user_name: Option<String>,
    pub real_name: Option<String>,
    pub email: Option<String>,
    pub phone_no: Option<String>,
    pub gender: Option<Gender>,
    pub role: Option<Role>,
    pub department: Option<Department>,
    pub date_of_birth: Option<NaiveDate>,
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    needle.map_or(true, |n| {
        haystack.to_lowercase().contains(&n.to_lowercase())
    })
}

impl UserCriteria {
    pub fn matches(&self, user: &User) -> bool {
        contains_ignore_case(user.user_name.as_str(), self.user_name.as_deref())
            && contains_ignore_case(user.real_name.as_str(), self.real_name.as_deref())
            && contains_ignore_case(user.email.as_str(), self.email.as_deref())
            && contains_ignore_case(&user.phone_no, self.phone_no.as_deref())
            && self.gender.map_or(true, |g| Some(g) == user.gender)
            && self.role.map_or(true, |r| r == user.role)
            && self.department.map_or(true, |d| Some(d) == user.department)
            && self
                .date_of_birth
                .map_or(true, |dob| Some(dob) == user.date_of_birth)
    }
}

pub trait UserRepository: Send + Sync {
    fn exists(&self, id: &str) -> bool;

    /// Fails with `AlreadyExists` on a taken id, user name, email or phone number,
    /// reported in that order.
    fn insert(&self, user: User) -> ClinicResult<()>;

    fn find(&self, id: &str) -> Option<User>;

    /// Atomically applies `change` to the stored user.
    ///
    /// The result is checked against every other user; all clashing fields are reported in
    /// a single `AlreadyExists`.
    fn update_with(
        &self,
        id: &str,
        change: &mut dyn FnMut(User) -> ClinicResult<User>,
    ) -> ClinicResult<User>;

    fn delete(&self, id: &str) -> ClinicResult<()>;

    /// Matching users ordered by creation time, then id.
    fn search(&self, criteria: &UserCriteria, page: PageRequest) -> Page<User>;
}

#[derive(Debug, Default)]
pub struct InMemoryUsers {
    rows: RwLock<BTreeMap<String, User>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UniqueField {
    UserName,
    Email,
    PhoneNo,
}

impl UniqueField {
    fn label(self) -> &'static str {
        match self {
            UniqueField::UserName => "Username",
            UniqueField::Email => "Email",
            UniqueField::PhoneNo => "Phone Number",
        }
    }

    fn taken_message(self) -> &'static str {
        match self {
            UniqueField::UserName => "Username already exists.",
            UniqueField::Email => "Email already exists.",
            UniqueField::PhoneNo => "Phone number already exists.",
        }
    }
}

/// Unique fields `candidate` shares with any user other than itself.
fn clashing_fields<'a>(rows: impl Iterator<Item = &'a User>, candidate: &User) -> Vec<UniqueField> {
    let mut user_name = false;
    let mut email = false;
    let mut phone_no = false;

    for other in rows.filter(|u| u.id != candidate.id) {
        user_name |= other.user_name == candidate.user_name;
        email |= other.email == candidate.email;
        phone_no |= other.phone_no == candidate.phone_no;
    }

    [
        (user_name, UniqueField::UserName),
        (email, UniqueField::Email),
        (phone_no, UniqueField::PhoneNo),
    ]
    .into_iter()
    .filter_map(|(clash, field)| clash.then_some(field))
    .collect()
}

impl UserRepository for InMemoryUsers {
    fn exists(&self, id: &str) -> bool {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    fn insert(&self, user: User) -> ClinicResult<()> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let key = user.id.to_string();
        if rows.contains_key(&key) {
            return Err(ClinicError::AlreadyExists(format!(
                "User already exists with ID: {key}"
            )));
        }

        if let Some(first) = clashing_fields(rows.values(), &user).first() {
            return Err(ClinicError::AlreadyExists(first.taken_message().into()));
        }

        rows.insert(key, user);
        Ok(())
    }

    fn find(&self, id: &str) -> Option<User> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn update_with(
        &self,
        id: &str,
        change: &mut dyn FnMut(User) -> ClinicResult<User>,
    ) -> ClinicResult<User> {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let current = rows
            .get(id)
            .cloned()
            .ok_or_else(|| ClinicError::user_not_found(id))?;

        let updated = change(current)?;
        if updated.id.as_str() != id {
            return Err(ClinicError::InvalidInput("user id cannot be changed".into()));
        }

        let clashes = clashing_fields(rows.values(), &updated);
        if !clashes.is_empty() {
            return Err(ClinicError::AlreadyExists(format!(
                "The following fields already exist in the database: {}",
                clashes
                    .iter()
                    .map(|field| field.label())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        rows.insert(id.to_owned(), updated.clone());
        Ok(updated)
    }

    fn delete(&self, id: &str) -> ClinicResult<()> {
        self.rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ClinicError::user_not_found(id))
    }

    fn search(&self, criteria: &UserCriteria, page: PageRequest) -> Page<User> {
        let mut matched: Vec<User> = self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|user| criteria.matches(user))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        paginate(matched, page)
    }
}
