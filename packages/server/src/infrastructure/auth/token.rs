//! Static bearer-token authenticator.
//!
//! Credentials are configured up front as `<id>:<username>:<token>` and
//! matched against the `token` presented at connect time.

use std::{collections::HashMap, str::FromStr};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Authenticator, Principal, UserId, Username};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialParseError {
    #[error("expected '<id>:<username>:<token>', got '{0}'")]
    Format(String),

    #[error("invalid user id '{0}'")]
    UserId(String),

    #[error("invalid username: {0}")]
    Username(String),

    #[error("token must not be empty")]
    EmptyToken,
}

/// One configured user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredential {
    pub user_id: UserId,
    pub username: Username,
    pub token: String,
}

impl FromStr for UserCredential {
    type Err = CredentialParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(id), Some(username), Some(token)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(CredentialParseError::Format(s.to_string()));
        };

        let user_id = id
            .parse::<i64>()
            .map(UserId::new)
            .map_err(|_| CredentialParseError::UserId(id.to_string()))?;
        let username = Username::new(username.to_string())
            .map_err(|e| CredentialParseError::Username(e.to_string()))?;
        if token.is_empty() {
            return Err(CredentialParseError::EmptyToken);
        }

        Ok(Self {
            user_id,
            username,
            token: token.to_string(),
        })
    }
}

/// Resolves tokens against a fixed credential table.
pub struct TokenAuthenticator {
    users: HashMap<String, (UserId, Username)>,
}

impl TokenAuthenticator {
    pub fn new(credentials: impl IntoIterator<Item = UserCredential>) -> Self {
        let users = credentials
            .into_iter()
            .map(|c| (c.token, (c.user_id, c.username)))
            .collect();
        Self { users }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self, token: Option<&str>) -> Principal {
        match token.and_then(|t| self.users.get(t)) {
            Some((user_id, username)) => Principal::Authenticated {
                user_id: *user_id,
                username: username.clone(),
            },
            None => Principal::Anonymous,
        }
    }
}
