// Navigation decisions: which view a caller may see, and where to send them otherwise

use crate::domain::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Login,
    SignUp,
    Submission,
    AdminDashboard,
}

impl View {
    pub const ALL: [View; 4] = [
        View::Login,
        View::SignUp,
        View::Submission,
        View::AdminDashboard,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            View::Login => "/",
            View::SignUp => "/signup",
            View::Submission => "/dashboard",
            View::AdminDashboard => "/admin",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Login => "login",
            View::SignUp => "sign_up",
            View::Submission => "submission",
            View::AdminDashboard => "admin_dashboard",
        }
    }

    /// Trailing slashes are ignored, so `/admin/` is the dashboard
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        View::ALL.into_iter().find(|view| view.path() == normalized)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        View::ALL.into_iter().find(|view| view.as_str() == name)
    }

    fn is_public(&self) -> bool {
        matches!(self, View::Login | View::SignUp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "view", rename_all = "snake_case")]
pub enum RouteDecision {
    Render(View),
    Redirect(View),
}

impl RouteDecision {
    pub fn view(&self) -> View {
        match self {
            RouteDecision::Render(view) | RouteDecision::Redirect(view) => *view,
        }
    }

    pub fn is_render(&self) -> bool {
        matches!(self, RouteDecision::Render(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteDecision::Render(_) => "render",
            RouteDecision::Redirect(_) => "redirect",
        }
    }
}

/// Decide what the caller sees when asking for `requested`.
///
/// `role` is `None` for an anonymous caller.
pub fn route(role: Option<Role>, requested: View) -> RouteDecision {
    match role {
        None if !requested.is_public() => RouteDecision::Redirect(View::Login),
        Some(Role::Administrator) if requested != View::AdminDashboard => {
            RouteDecision::Redirect(View::AdminDashboard)
        }
        Some(Role::Regular)
            if matches!(
                requested,
                View::AdminDashboard | View::Login | View::SignUp
            ) =>
        {
            RouteDecision::Redirect(View::Submission)
        }
        _ => RouteDecision::Render(requested),
    }
}
