//! Read-only execution context shared by every command of a session

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::obj_ref::ObjRef;

/// Which backend wire dialect the host talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BackendKind {
    Bear,
    Tiger,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Bear => f.write_str("bear"),
            BackendKind::Tiger => f.write_str("tiger"),
        }
    }
}

/// Handle describing the backend connection owned by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendInfo {
    pub kind: BackendKind,
    #[serde(default)]
    pub endpoint: String,
}

#[derive(Debug, PartialEq, Eq)]
struct ContextInner {
    backend: BackendInfo,
    workspace: String,
    dashboard: Option<ObjRef>,
}

/// Context handed to every handler and attached to every event.
///
/// Cloning shares the same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardContext {
    inner: Arc<ContextInner>,
}

impl DashboardContext {
    pub fn new(backend: BackendInfo, workspace: impl Into<String>, dashboard: Option<ObjRef>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                backend,
                workspace: workspace.into(),
                dashboard,
            }),
        }
    }

    pub fn backend(&self) -> &BackendInfo {
        &self.inner.backend
    }

    pub fn workspace(&self) -> &str {
        &self.inner.workspace
    }

    pub fn dashboard(&self) -> Option<&ObjRef> {
        self.inner.dashboard.as_ref()
    }

    /// Whether two contexts share the same allocation
    pub fn ptr_eq(&self, other: &DashboardContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_inner() {
        let ctx = DashboardContext::new(
            BackendInfo {
                kind: BackendKind::Tiger,
                endpoint: "https://example.org".into(),
            },
            "ws1",
            Some(ObjRef::id("dash1")),
        );
        let copy = ctx.clone();

        assert!(ctx.ptr_eq(&copy));
        assert_eq!(copy.workspace(), "ws1");
        assert_eq!(copy.backend().kind.to_string(), "tiger");
        assert_eq!(copy.dashboard(), Some(&ObjRef::id("dash1")));
    }
}
