use serde_json::Value;
use tracing::instrument;

use crate::action::Action;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::results::{PlanInfo, ShareInfo};

impl super::ReportClient {
    /// Sharing details of a workspace.
    #[instrument(skip(self))]
    pub async fn get_share_info(&self, db_uri: &str) -> Result<ShareInfo> {
        let request = ApiRequest::v1_default(db_uri, Action::GetShareInfo);
        self.send_request(&request, None, 0).await?.into_share()
    }

    /// Subscription plan of the account.
    #[instrument(skip(self))]
    pub async fn get_plan_info(&self, user_uri: &str) -> Result<PlanInfo> {
        let request = ApiRequest::v1_default(user_uri, Action::GetUserPlanDetails);
        self.send_request(&request, None, 0).await?.into_plan()
    }

    /// Users of the account.
    #[instrument(skip(self))]
    pub async fn get_users(&self, user_uri: &str) -> Result<Value> {
        let request = ApiRequest::v1_default(user_uri, Action::GetUsers);
        self.send_request(&request, None, 0).await?.into_json()
    }

    /// Add users by email, comma separated.
    #[instrument(skip(self))]
    pub async fn add_users(&self, user_uri: &str, emails: &str) -> Result<()> {
        let request = ApiRequest::v1_default(user_uri, Action::AddUser).query("ZOHO_EMAILS", emails);
        self.send_unit(&request).await
    }

    /// Remove users by email, comma separated.
    #[instrument(skip(self))]
    pub async fn remove_users(&self, user_uri: &str, emails: &str) -> Result<()> {
        let request =
            ApiRequest::v1_default(user_uri, Action::RemoveUser).query("ZOHO_EMAILS", emails);
        self.send_unit(&request).await
    }

    /// Re-activate users by email, comma separated.
    #[instrument(skip(self))]
    pub async fn activate_users(&self, user_uri: &str, emails: &str) -> Result<()> {
        let request =
            ApiRequest::v1_default(user_uri, Action::ActivateUser).query("ZOHO_EMAILS", emails);
        self.send_unit(&request).await
    }

    /// Deactivate users by email, comma separated.
    #[instrument(skip(self))]
    pub async fn deactivate_users(&self, user_uri: &str, emails: &str) -> Result<()> {
        let request =
            ApiRequest::v1_default(user_uri, Action::DeactivateUser).query("ZOHO_EMAILS", emails);
        self.send_unit(&request).await
    }

    /// Share views of a workspace with users. `criteria` restricts the rows
    /// the users see.
    #[instrument(skip(self))]
    pub async fn share_views(
        &self,
        db_uri: &str,
        emails: &str,
        views: &str,
        criteria: Option<&str>,
    ) -> Result<()> {
        let mut request = ApiRequest::v1_default(db_uri, Action::Share)
            .query("ZOHO_EMAILS", emails)
            .query("ZOHO_VIEWS", views);
        if let Some(criteria) = criteria {
            request = request.map_http(|http| http.form([("ZOHO_CRITERIA", criteria)]));
        }
        self.send_unit(&request).await
    }

    /// Withdraw all shared views from users.
    #[instrument(skip(self))]
    pub async fn remove_share(&self, db_uri: &str, emails: &str) -> Result<()> {
        let request =
            ApiRequest::v1_default(db_uri, Action::RemoveShare).query("ZOHO_EMAILS", emails);
        self.send_unit(&request).await
    }

    /// Make users owners of the workspace.
    #[instrument(skip(self))]
    pub async fn add_db_owners(&self, db_uri: &str, emails: &str) -> Result<()> {
        let request =
            ApiRequest::v1_default(db_uri, Action::AddDbOwner).query("ZOHO_EMAILS", emails);
        self.send_unit(&request).await
    }

    #[instrument(skip(self))]
    pub async fn remove_db_owners(&self, db_uri: &str, emails: &str) -> Result<()> {
        let request =
            ApiRequest::v1_default(db_uri, Action::RemoveDbOwner).query("ZOHO_EMAILS", emails);
        self.send_unit(&request).await
    }
}
