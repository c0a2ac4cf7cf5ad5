use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, UserId};

/// Access profile of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Administrator,
    Operator,
}

/// Input shape for user registration and updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub profile: Profile,
}

/// A registered user. Emails are unique case-insensitively; the directory
/// service enforces that against the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    profile: Profile,
}

impl User {
    pub fn new(id: UserId, input: NewUser) -> DomainResult<Self> {
        Self::check(&input)?;
        Ok(Self {
            id,
            name: input.name,
            email: input.email,
            profile: input.profile,
        })
    }

    fn check(input: &NewUser) -> DomainResult<()> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("user name cannot be empty"));
        }
        let email = input.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation(format!(
                "invalid email address: '{email}'"
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Lowercased form used for uniqueness comparison.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_ascii_lowercase()
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn update(&mut self, input: NewUser) -> DomainResult<()> {
        Self::check(&input)?;
        self.name = input.name;
        self.email = input.email;
        self.profile = input.profile;
        Ok(())
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(email: &str) -> NewUser {
        NewUser {
            name: "Ana".to_string(),
            email: email.to_string(),
            profile: Profile::Operator,
        }
    }

    #[test]
    fn email_must_look_like_an_address() {
        assert!(User::new(UserId::new(), input("ana.example.com")).is_err());
        assert!(User::new(UserId::new(), input("ana@example.com")).is_ok());
    }

    #[test]
    fn normalized_email_lowercases() {
        let user = User::new(UserId::new(), input("Ana@Example.COM")).unwrap();
        assert_eq!(user.normalized_email(), "ana@example.com");
    }
}
