//! Access control endpoints

use serde::Deserialize;
use strata_domain::{AccessControl, Result};

use crate::classify::ensure_success;
use crate::client::Client;

#[derive(Deserialize)]
struct AccessControlListResponse {
    access_controls: Vec<AccessControl>,
}

#[derive(Deserialize)]
struct TestAccessControlResponse {
    permission: bool,
}

impl Client {
    /// Grant `subject` the right to perform `action` on `scope`.
    pub async fn grant_access_control(
        &self,
        subject: &str,
        action: &str,
        scope: &str,
        grant_option: bool,
    ) -> Result<()> {
        let params = [
            ("subject", subject.to_string()),
            ("action", action.to_string()),
            ("scope", scope.to_string()),
            ("grant_option", grant_option.to_string()),
        ];
        let resp = self.transport().post("/v3/acl/grant", Some(&params)).await?;
        ensure_success(&resp, &format!("Grant {action:?} on {scope:?} failed"))
    }

    /// Revoke a previously granted right.
    pub async fn revoke_access_control(
        &self,
        subject: &str,
        action: &str,
        scope: &str,
    ) -> Result<()> {
        let params = [
            ("subject", subject.to_string()),
            ("action", action.to_string()),
            ("scope", scope.to_string()),
        ];
        let resp = self.transport().post("/v3/acl/revoke", Some(&params)).await?;
        ensure_success(&resp, &format!("Revoke {action:?} on {scope:?} failed"))
    }

    /// List every access control grant.
    pub async fn list_access_controls(&self) -> Result<Vec<AccessControl>> {
        let resp = self.transport().get("/v3/acl/list", &[]).await?;
        ensure_success(&resp, "List access controls failed")?;
        let body: AccessControlListResponse = resp.json()?;
        Ok(body.access_controls)
    }

    /// Check whether `user` may perform `action` on `scope`.
    pub async fn test_access_control(
        &self,
        user: &str,
        action: &str,
        scope: &str,
    ) -> Result<bool> {
        let params = [
            ("user", user.to_string()),
            ("action", action.to_string()),
            ("scope", scope.to_string()),
        ];
        let resp = self.transport().get("/v3/acl/test", &params).await?;
        ensure_success(&resp, &format!("Test access of {user:?} failed"))?;
        let body: TestAccessControlResponse = resp.json()?;
        Ok(body.permission)
    }
}
