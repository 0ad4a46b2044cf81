pub mod aggregation;
pub mod transfer;

pub use aggregation::{count_by_scale_type, count_by_unit, dashboard_summary, ChartPoint, DashboardSummary, ReportListing};
pub use transfer::{
    export_all, import_rows, parse_csv, parse_sheet, parse_workbook, write_csv, write_workbook, ImportOutcome,
    RejectedRow, SheetFormat,
};
