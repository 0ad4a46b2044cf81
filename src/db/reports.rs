// Report ledger: append-only collection of submitted activity reports

use crate::db::store::{Collection, DocumentStore};
use crate::domain::{ActivityFields, ActivityReport, NewReport};
use crate::errors::Result;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ReportLedger {
    store: Arc<dyn DocumentStore>,
}

impl ReportLedger {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append one report stamped with the current time and the submitter's name
    pub async fn submit(
        &self,
        fields: ActivityFields,
        account_id: &str,
        display_name: &str,
    ) -> Result<ActivityReport> {
        let report = NewReport {
            account_id: account_id.to_string(),
            submitted_by: display_name.to_string(),
            submitted_at: Utc::now(),
            fields,
        }
        .into_report(Uuid::new_v4().to_string());

        self.store
            .put(
                Collection::ActivityReports,
                &report.id,
                serde_json::to_value(&report)?,
            )
            .await?;

        tracing::info!(
            report_id = %report.id,
            account_id = %account_id,
            "Activity report submitted"
        );

        Ok(report)
    }

    /// Every report in insertion order
    pub async fn list_all(&self) -> Result<Vec<ActivityReport>> {
        self.store
            .list(Collection::ActivityReports)
            .await?
            .into_iter()
            .map(|doc| Ok(serde_json::from_value(doc)?))
            .collect()
    }

    /// Append records under fresh ids. Repeated imports are not de-duplicated.
    pub async fn bulk_append(&self, records: Vec<NewReport>) -> Result<usize> {
        let documents = records
            .into_iter()
            .map(|record| {
                let report = record.into_report(Uuid::new_v4().to_string());
                Ok((report.id.clone(), serde_json::to_value(&report)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let count = documents.len();
        self.store
            .put_many(Collection::ActivityReports, documents)
            .await?;

        tracing::info!(count, "Appended activity reports");

        Ok(count)
    }

    /// Remove every report owned by an account
    pub async fn remove_by_account(&self, account_id: &str) -> Result<usize> {
        let docs = self
            .store
            .query(Collection::ActivityReports, "userId", account_id)
            .await?;

        let mut removed = 0;
        for doc in docs {
            let report: ActivityReport = serde_json::from_value(doc)?;
            if self
                .store
                .delete(Collection::ActivityReports, &report.id)
                .await?
            {
                removed += 1;
            }
        }

        Ok(removed)
    }
}
