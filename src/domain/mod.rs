pub mod account;
pub mod form;
pub mod report;

pub use account::{Account, Rank, Role, Unit, ADMIN_ACCOUNT_ID};
pub use form::{FieldError, FieldSpec};
pub use report::{ActivityFields, ActivityReport, NewReport, ScaleType};
