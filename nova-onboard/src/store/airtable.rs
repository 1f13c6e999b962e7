//! Airtable record store via REST API (no SDK dependency)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::{EmployeeRecord, NewEmployee};
use std::time::Duration;

use super::{EmployeeStore, StoreError};
use crate::config::AirtableConfig;

#[derive(Clone)]
pub struct AirtableStore {
    client: reqwest::Client,
    api_key: String,
    /// `{api_url}/{base_id}/{table}`
    table_url: String,
}

#[derive(Deserialize)]
struct ListResponse {
    records: Vec<AirtableRecord>,
}

#[derive(Deserialize)]
struct AirtableRecord {
    id: String,
    #[serde(default)]
    fields: NewEmployee,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    records: [CreateRecord<'a>; 1],
}

#[derive(Serialize)]
struct CreateRecord<'a> {
    fields: &'a NewEmployee,
}

impl From<AirtableRecord> for EmployeeRecord {
    fn from(r: AirtableRecord) -> Self {
        EmployeeRecord {
            id: r.id,
            employee: r.fields,
        }
    }
}

impl AirtableStore {
    pub fn new(config: &AirtableConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let table_url = format!(
            "{}/{}/{}",
            config.api_url.trim_end_matches('/'),
            config.base_id,
            urlencoding::encode(&config.table)
        );
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            table_url,
        })
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl EmployeeStore for AirtableStore {
    fn name(&self) -> &'static str {
        "airtable"
    }

    async fn find_active_by_pin(&self, pin: &str) -> Result<Option<EmployeeRecord>, StoreError> {
        let formula = active_pin_formula(pin);
        let resp = self
            .client
            .get(&self.table_url)
            .bearer_auth(&self.api_key)
            .query(&[("filterByFormula", formula.as_str()), ("maxRecords", "1")])
            .send()
            .await?;

        let list: ListResponse = Self::check(resp).await?.json().await?;
        Ok(list.records.into_iter().next().map(EmployeeRecord::from))
    }

    async fn create(&self, employee: NewEmployee) -> Result<EmployeeRecord, StoreError> {
        let body = CreateRequest {
            records: [CreateRecord { fields: &employee }],
        };
        let resp = self
            .client
            .post(&self.table_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let list: ListResponse = Self::check(resp).await?.json().await?;
        let created = list
            .records
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("create returned no record".into()))?;

        // Echo back what was written; Airtable drops empty cells from the response
        Ok(EmployeeRecord {
            id: created.id,
            employee,
        })
    }
}

/// `AND({pin}='1234', {actif})` with the PIN quoted as a formula string literal
fn active_pin_formula(pin: &str) -> String {
    format!("AND({{pin}}={}, {{actif}})", formula_literal(pin))
}

fn formula_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
