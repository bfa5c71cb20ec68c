//! HTTP client for the SpendWise backend: import preview/commit, category
//! catalog, and the read-only month/transaction/summary queries.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use spendwise_core::{
    Category, CategoryCatalog, CategoryGroup, CommitOutcome, CommitRequest, ImportError,
    PreviewBatch, Result, StatementFile, StatementType,
};

use crate::encode::{import_query, side_channel_fields};

#[derive(Debug, Clone)]
pub struct SpendwiseClient {
    base_url: String,
    http: reqwest::Client,
}

impl SpendwiseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Dry-run parse of the statement. Never mutates storage.
    pub async fn preview(
        &self,
        file: &StatementFile,
        month: &str,
        statement_type: StatementType,
    ) -> Result<PreviewBatch> {
        let form = Form::new().part("file", file_part(file));
        let resp = self
            .http
            .post(self.url("/api/import/csv"))
            .query(&import_query(month, statement_type, true))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        decode(resp).await
    }

    /// Committing pass. Safe to retry: the service dedups by row hash, so a
    /// replay reports the rows as skipped rather than inserting twice.
    pub async fn commit(&self, request: &CommitRequest) -> Result<CommitOutcome> {
        let mut form = Form::new().part("file", file_part(&request.file));
        for (name, json) in side_channel_fields(request) {
            form = form.text(name, json);
        }
        let resp = self
            .http
            .post(self.url("/api/import/csv"))
            .query(&import_query(&request.month, request.statement_type, false))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        decode(resp).await
    }

    pub async fn list_categories(&self) -> Result<CategoryCatalog> {
        #[derive(Deserialize)]
        struct Categories {
            categories: Vec<Category>,
        }
        let resp = self
            .http
            .get(self.url("/api/categories"))
            .send()
            .await
            .map_err(transport)?;
        let body: Categories = decode(resp).await?;
        Ok(CategoryCatalog::new(body.categories))
    }

    /// Idempotent create: the service returns the existing category when the
    /// name is already taken.
    pub async fn create_category(
        &self,
        name: &str,
        group: Option<CategoryGroup>,
        is_income: bool,
    ) -> Result<Category> {
        let body = serde_json::json!({
            "name": name,
            "group": group,
            "isIncome": is_income,
        });
        let resp = self
            .http
            .post(self.url("/api/categories"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        decode(resp).await
    }

    /// Months that already hold committed transactions, newest first.
    pub async fn list_months(&self) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct Months {
            months: Vec<String>,
        }
        let resp = self
            .http
            .get(self.url("/api/months"))
            .send()
            .await
            .map_err(transport)?;
        let body: Months = decode(resp).await?;
        Ok(body.months)
    }

    pub async fn list_transactions(&self) -> Result<Vec<TransactionRecord>> {
        let resp = self
            .http
            .get(self.url("/api/transactions"))
            .send()
            .await
            .map_err(transport)?;
        decode(resp).await
    }

    pub async fn monthly_summary(&self, month: &str) -> Result<MonthlySummary> {
        let resp = self
            .http
            .get(self.url("/api/summary/monthly/by-group"))
            .query(&[("month", month)])
            .send()
            .await
            .map_err(transport)?;
        decode(resp).await
    }
}

/// A committed transaction as the query service reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub posted_at: chrono::NaiveDate,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub hash: Option<String>,
}

/// Monthly totals split by budget group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub by_group: GroupTotals,
    pub net: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupTotals {
    #[serde(rename = "ESSENTIAL")]
    pub essential: f64,
    #[serde(rename = "SURPLUS")]
    pub surplus: f64,
    #[serde(rename = "DEBT")]
    pub debt: f64,
}

fn file_part(file: &StatementFile) -> Part {
    Part::bytes(file.bytes.clone()).file_name(file.name.clone())
}

fn transport(err: reqwest::Error) -> ImportError {
    ImportError::Transport(err.to_string())
}

/// Non-2xx responses surface the service's own response text as the error
/// message.
async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let msg = if body.trim().is_empty() {
            status.to_string()
        } else {
            body
        };
        return Err(ImportError::Transport(msg));
    }
    resp.json::<T>().await.map_err(transport)
}
