// Dashboard statistics over the full ledger

use crate::domain::{ActivityReport, ScaleType, Unit};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Reports per integrated team; every unit is present, possibly at zero
pub fn count_by_unit(reports: &[ActivityReport]) -> BTreeMap<Unit, usize> {
    let mut counts: BTreeMap<Unit, usize> = Unit::ALL.into_iter().map(|u| (u, 0)).collect();
    for unit in reports.iter().filter_map(|r| r.fields.equipes_integradas) {
        *counts.entry(unit).or_default() += 1;
    }
    counts
}

/// Reports per scale type; every scale type is present, possibly at zero
pub fn count_by_scale_type(reports: &[ActivityReport]) -> BTreeMap<ScaleType, usize> {
    let mut counts: BTreeMap<ScaleType, usize> =
        ScaleType::ALL.into_iter().map(|s| (s, 0)).collect();
    for scale in reports.iter().filter_map(|r| r.fields.tipo_escala) {
        *counts.entry(scale).or_default() += 1;
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub name: &'static str,
    pub value: usize,
}

/// One line of the admin report table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListing {
    pub id: String,
    pub submitted_at: DateTime<Utc>,
    pub submitted_by: String,
    pub numero_rso: Option<String>,
    pub pelotao: Option<&'static str>,
    pub bo_pamb: u8,
    pub pessoas_abordadas: u8,
}

impl From<&ActivityReport> for ReportListing {
    fn from(report: &ActivityReport) -> Self {
        Self {
            id: report.id.clone(),
            submitted_at: report.submitted_at,
            submitted_by: report.submitted_by.clone(),
            numero_rso: report.fields.numero_rso.clone(),
            pelotao: report.fields.pelotao.map(|u| u.short_label()),
            bo_pamb: report.fields.bo_pamb,
            pessoas_abordadas: report.fields.pessoas_abordadas,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_reports: usize,
    pub by_unit: Vec<ChartPoint>,
    pub by_scale_type: Vec<ChartPoint>,
    /// Latest submissions first
    pub recent: Vec<ReportListing>,
}

/// Chart series plus the newest `recent_limit` reports, newest first
pub fn dashboard_summary(reports: &[ActivityReport], recent_limit: usize) -> DashboardSummary {
    let by_unit = count_by_unit(reports)
        .into_iter()
        .map(|(unit, value)| ChartPoint {
            name: unit.integrated_label(),
            value,
        })
        .collect();

    let by_scale_type = count_by_scale_type(reports)
        .into_iter()
        .map(|(scale, value)| ChartPoint {
            name: scale.label(),
            value,
        })
        .collect();

    DashboardSummary {
        total_reports: reports.len(),
        by_unit,
        by_scale_type,
        recent: reports
            .iter()
            .rev()
            .take(recent_limit)
            .map(ReportListing::from)
            .collect(),
    }
}
