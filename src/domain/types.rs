//! Shared domain enumerations aligned with persisted values.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A named role granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Authority {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_USER_MANAGER")]
    UserManager,
}

impl Authority {
    pub const ALL: [Authority; 3] = [Authority::User, Authority::Admin, Authority::UserManager];

    pub fn as_str(self) -> &'static str {
        match self {
            Authority::User => "ROLE_USER",
            Authority::Admin => "ROLE_ADMIN",
            Authority::UserManager => "ROLE_USER_MANAGER",
        }
    }

    /// Role name without the `ROLE_` prefix.
    pub fn short_name(self) -> &'static str {
        match self {
            Authority::User => "USER",
            Authority::Admin => "ADMIN",
            Authority::UserManager => "USER_MANAGER",
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Authority {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Authority::ALL
            .into_iter()
            .find(|authority| authority.as_str() == value || authority.short_name() == value)
            .ok_or_else(|| DomainError::invariant(format!("unknown authority `{value}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_short_names() {
        assert_eq!(
            "ROLE_USER_MANAGER".parse::<Authority>().unwrap(),
            Authority::UserManager
        );
        assert_eq!("ADMIN".parse::<Authority>().unwrap(), Authority::Admin);
        assert!("ROLE_ROOT".parse::<Authority>().is_err());
    }
}
