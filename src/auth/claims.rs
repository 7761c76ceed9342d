//! Backend-issued role claims.

use serde::{Deserialize, Serialize};

/// Authorization flags for a signed-in identity.
///
/// Obtained from the backend claims endpoint per session. An absent flag
/// means `false`; the empty claim set describes an ordinary client who has
/// not been approved as a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaims {
    /// Platform administrator.
    #[serde(default)]
    pub admin: bool,
    /// Approved service provider.
    #[serde(default)]
    pub provider: bool,
}

impl RoleClaims {
    /// Effective role under the `admin > provider > client` precedence.
    #[must_use]
    pub fn role(self) -> Role {
        if self.admin {
            Role::Admin
        } else if self.provider {
            Role::Provider
        } else {
            Role::Client
        }
    }
}

/// Effective role of an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Provider,
    Client,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_precedence() {
        let both = RoleClaims {
            admin: true,
            provider: true,
        };
        assert_eq!(both.role(), Role::Admin);

        let provider = RoleClaims {
            admin: false,
            provider: true,
        };
        assert_eq!(provider.role(), Role::Provider);

        assert_eq!(RoleClaims::default().role(), Role::Client);
    }

    #[test]
    fn test_missing_flags_deserialize_false() {
        let claims: RoleClaims = serde_json::from_str("{}").unwrap();
        assert_eq!(claims, RoleClaims::default());

        let claims: RoleClaims = serde_json::from_str(r#"{"admin": true}"#).unwrap();
        assert!(claims.admin);
        assert!(!claims.provider);
    }
}
