pub mod middleware;
pub mod router;

pub use middleware::{authenticate, bearer_token, require_view, track_metrics};
pub use router::{route, RouteDecision, View};
