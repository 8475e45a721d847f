use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::catalog::Account;
use crate::domain::errors::DomainError;
use crate::domain::ports::AccountDirectory;

use super::catalog_client::endpoint;

/// Account service over HTTP: `GET {base}/accounts/{id}`.
pub struct HttpAccountDirectory {
    client: Client,
    base_url: Url,
}

impl HttpAccountDirectory {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl AccountDirectory for HttpAccountDirectory {
    async fn get(&self, account_id: &str) -> Result<Option<Account>, DomainError> {
        let url = endpoint(&self.base_url, &["accounts", account_id])?;
        let resp = self.client.get(url).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let account = resp.error_for_status()?.json::<Account>().await?;
        Ok(Some(account))
    }
}
