//! Account user and API key endpoints

use serde::Deserialize;
use strata_domain::{ErrorKind, Result, User};

use crate::classify::{ensure_success, ensure_success_as};
use crate::client::Client;
use crate::transport::encode_segment;

#[derive(Deserialize)]
struct AuthenticateResponse {
    apikey: String,
}

#[derive(Deserialize)]
struct UserListResponse {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct ApikeyListResponse {
    apikeys: Vec<String>,
}

impl Client {
    /// Exchange account credentials for an API key.
    ///
    /// Any client-error status here means the credentials were rejected,
    /// whatever the exact code, so unmapped 4xx responses classify as
    /// authentication failures.
    pub async fn authenticate(&self, user: &str, password: &str) -> Result<String> {
        let params = [("user", user.to_string()), ("password", password.to_string())];
        let resp = self.transport().post("/v3/user/authenticate", Some(&params)).await?;
        ensure_success_as(&resp, "Authentication failed", ErrorKind::Auth)?;
        let body: AuthenticateResponse = resp.json()?;
        Ok(body.apikey)
    }

    /// List the users of the account.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let resp = self.transport().get("/v3/user/list", &[]).await?;
        ensure_success(&resp, "List users failed")?;
        let body: UserListResponse = resp.json()?;
        Ok(body.users)
    }

    /// Add a user to the account.
    pub async fn add_user(
        &self,
        name: &str,
        organization: &str,
        email: &str,
        password: &str,
    ) -> Result<()> {
        let path = format!("/v3/user/add/{}", encode_segment(name));
        let params = [
            ("organization", organization.to_string()),
            ("email", email.to_string()),
            ("password", password.to_string()),
        ];
        let resp = self.transport().post(&path, Some(&params)).await?;
        ensure_success(&resp, &format!("Add user {name:?} failed"))
    }

    /// Remove a user from the account.
    pub async fn remove_user(&self, name: &str) -> Result<()> {
        let path = format!("/v3/user/remove/{}", encode_segment(name));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Remove user {name:?} failed"))
    }

    /// List a user's API keys.
    pub async fn list_apikeys(&self, user: &str) -> Result<Vec<String>> {
        let path = format!("/v3/user/apikey/list/{}", encode_segment(user));
        let resp = self.transport().get(&path, &[]).await?;
        ensure_success(&resp, &format!("List API keys of {user:?} failed"))?;
        let body: ApikeyListResponse = resp.json()?;
        Ok(body.apikeys)
    }

    /// Issue a new API key for a user.
    pub async fn add_apikey(&self, user: &str) -> Result<()> {
        let path = format!("/v3/user/apikey/add/{}", encode_segment(user));
        let resp = self.transport().post(&path, None).await?;
        ensure_success(&resp, &format!("Add API key for {user:?} failed"))
    }

    /// Revoke one of a user's API keys.
    pub async fn remove_apikey(&self, user: &str, apikey: &str) -> Result<()> {
        let path = format!("/v3/user/apikey/remove/{}", encode_segment(user));
        let params = [("apikey", apikey.to_string())];
        let resp = self.transport().post(&path, Some(&params)).await?;
        ensure_success(&resp, &format!("Remove API key of {user:?} failed"))
    }
}
