//! Caller identity.
//!
//! Requests arrive through the API gateway, which authenticates the caller and describes them in a set of `ERIC-*`
//! headers. [`AuthUser`] is an extractor that reads those headers, so handlers that take an `AuthUser` argument are
//! only reachable by authenticated callers.
//!
//! | Header                           | Contents                                         |
//! |----------------------------------|--------------------------------------------------|
//! | `ERIC-Identity`                  | The user or key id                               |
//! | `ERIC-Identity-Type`             | `oauth2` or `key`                                |
//! | `ERIC-Authorised-User`           | `email; forename=Jane; surname=Doe`              |
//! | `ERIC-Authorised-Roles`          | Space-separated list of roles                    |
//! | `ERIC-Authorised-Key-Privileges` | Comma-separated list of API key privileges       |
use std::{
    future::{ready, Ready},
    str::FromStr,
    sync::OnceLock,
};

use actix_web::{dev::Payload, http::header::HeaderMap, FromRequest, HttpRequest};
use lfp_pay_engine::db_types::{CreatedBy, PayableResource};
use log::*;
use regex::Regex;

use crate::errors::{AuthError, ServerError};

pub const IDENTITY_HEADER: &str = "ERIC-Identity";
pub const IDENTITY_TYPE_HEADER: &str = "ERIC-Identity-Type";
pub const AUTHORISED_USER_HEADER: &str = "ERIC-Authorised-User";
pub const AUTHORISED_ROLES_HEADER: &str = "ERIC-Authorised-Roles";
pub const AUTHORISED_KEY_PRIVILEGES_HEADER: &str = "ERIC-Authorised-Key-Privileges";

/// Lets the holder look at any payable resource.
pub const PENALTY_LOOKUP_ROLE: &str = "/admin/penalty-lookup";
const INTERNAL_APP_PRIVILEGE: &str = "internal-app";
const ALL_PRIVILEGES: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityType {
    OAuth2,
    Key,
}

impl FromStr for IdentityType {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oauth2" => Ok(Self::OAuth2),
            "key" => Ok(Self::Key),
            s => Err(AuthError::UnsupportedIdentityType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub identity_type: IdentityType,
    pub email: String,
    pub forename: String,
    pub surname: String,
    pub roles: Vec<String>,
    pub key_privileges: Vec<String>,
}

impl AuthUser {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        let id = header_value(headers, IDENTITY_HEADER)
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingIdentity(IDENTITY_HEADER))?;
        let identity_type = header_value(headers, IDENTITY_TYPE_HEADER)
            .ok_or(AuthError::MissingIdentity(IDENTITY_TYPE_HEADER))?
            .parse::<IdentityType>()?;
        let roles = header_value(headers, AUTHORISED_ROLES_HEADER)
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default();
        let key_privileges = header_value(headers, AUTHORISED_KEY_PRIVILEGES_HEADER)
            .map(|s| s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();
        let user = header_value(headers, AUTHORISED_USER_HEADER);
        let (email, forename, surname) = match (identity_type, user) {
            (_, Some(user)) => parse_authorised_user(user)?,
            (IdentityType::OAuth2, None) => return Err(AuthError::MissingIdentity(AUTHORISED_USER_HEADER)),
            (IdentityType::Key, None) => Default::default(),
        };
        let user = Self { id: id.to_string(), identity_type, email, forename, surname, roles, key_privileges };
        if user.is_api_key() && !user.has_elevated_privileges() {
            return Err(AuthError::InsufficientPermissions("API key does not have elevated privileges".into()));
        }
        Ok(user)
    }

    pub fn is_api_key(&self) -> bool {
        self.identity_type == IdentityType::Key
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_elevated_privileges(&self) -> bool {
        self.is_api_key() &&
            self.key_privileges.iter().any(|p| p == INTERNAL_APP_PRIVILEGE || p == ALL_PRIVILEGES)
    }

    pub fn created_by(&self) -> CreatedBy {
        CreatedBy {
            id: self.id.clone(),
            email: self.email.clone(),
            forename: self.forename.clone(),
            surname: self.surname.clone(),
        }
    }

    /// Only signed-in users may create payable resources.
    pub fn require_oauth2(&self) -> Result<(), AuthError> {
        if self.identity_type == IdentityType::OAuth2 {
            Ok(())
        } else {
            debug!("💻️ {} tried to create a payable resource with an API key", self.id);
            Err(AuthError::InsufficientPermissions("Only signed-in users can create payable resources".into()))
        }
    }

    /// Modifying a payable resource, or acting on E5 on its behalf, is reserved for trusted internal API keys.
    pub fn require_elevated_privileges(&self) -> Result<(), AuthError> {
        if self.has_elevated_privileges() {
            Ok(())
        } else {
            debug!("💻️ {} does not have elevated privileges", self.id);
            Err(AuthError::InsufficientPermissions("Elevated API key privileges are required".into()))
        }
    }

    /// Access to an existing payable resource is granted to
    /// 1. the user that created it,
    /// 2. holders of the penalty lookup role, for reads only,
    /// 3. API keys with elevated privileges.
    pub fn check_payable_access(&self, resource: &PayableResource, is_read: bool) -> Result<(), AuthError> {
        if !self.is_api_key() && self.id == resource.created_by.id {
            trace!("💻️ {} authorised as creator of {}", self.id, resource.reference);
            return Ok(());
        }
        if is_read && self.has_role(PENALTY_LOOKUP_ROLE) {
            trace!("💻️ {} authorised for {} with the penalty lookup role", self.id, resource.reference);
            return Ok(());
        }
        if self.has_elevated_privileges() {
            trace!("💻️ {} authorised for {} as an elevated API key", self.id, resource.reference);
            return Ok(());
        }
        info!("💻️ {} is not allowed to access payable resource {}", self.id, resource.reference);
        Err(AuthError::InsufficientPermissions(format!("Not authorised for payable resource {}", resource.reference)))
    }
}

impl FromRequest for AuthUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = AuthUser::from_headers(req.headers()).map_err(|e| {
            info!("💻️ Unauthenticated request to {}. {e}", req.path());
            ServerError::AuthenticationError(e)
        });
        ready(result)
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

fn authorised_user_regex() -> Result<&'static Regex, AuthError> {
    static USER_REGEX: OnceLock<Regex> = OnceLock::new();
    if let Some(re) = USER_REGEX.get() {
        return Ok(re);
    }
    let re = Regex::new(r"^\s*([^;\s]+)\s*(?:;\s*forename=([^;]*))?\s*(?:;\s*surname=([^;]*))?\s*$")
        .map_err(|e| AuthError::PoorlyFormattedUser(e.to_string()))?;
    Ok(USER_REGEX.get_or_init(|| re))
}

/// Splits `email; forename=Jane; surname=Doe` into its parts. The names are optional.
fn parse_authorised_user(value: &str) -> Result<(String, String, String), AuthError> {
    let caps =
        authorised_user_regex()?.captures(value).ok_or_else(|| AuthError::PoorlyFormattedUser(value.to_string()))?;
    let part = |i: usize| caps.get(i).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
    Ok((part(1), part(2), part(3)))
}
