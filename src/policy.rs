use std::collections::HashSet;

/// Decides whether an operation may be listed and called.
pub trait EnablementPolicy: Send + Sync {
    fn is_enabled(&self, operation: &str) -> bool;
}

/// Allow-list / deny-list over operation names, compared case-insensitively.
/// A denied name stays disabled even when it is also allowed.
#[derive(Debug, Clone, Default)]
pub struct ToolPolicy {
    allowed: Option<HashSet<String>>,
    denied: HashSet<String>,
}

impl ToolPolicy {
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn new<A, D>(allowed: Option<A>, denied: D) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self {
            allowed: allowed.map(normalize),
            denied: normalize(denied),
        }
    }
}

impl EnablementPolicy for ToolPolicy {
    fn is_enabled(&self, operation: &str) -> bool {
        let key = operation.trim().to_lowercase();
        if self.denied.contains(&key) {
            return false;
        }
        self.allowed
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&key))
    }
}

fn normalize<I>(names: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}
