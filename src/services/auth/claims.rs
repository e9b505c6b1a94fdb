use serde_json::{Map, Value};

/// Verified identity-token payload.
///
/// Only built by the verifier after signature + registered-claim checks pass,
/// so `sub` is guaranteed to be a non-empty string.
#[derive(Debug, Clone)]
pub struct Claims {
    subject: String,
    raw: Map<String, Value>,
}

impl Claims {
    pub(crate) fn new(subject: String, raw: Map<String, Value>) -> Self {
        Self { subject, raw }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    /// Walk a dot-separated path (`realm_access.roles`) through nested objects.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.raw.get(first)?;
        for segment in segments {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }

    /// Whether `group` is present at `groups_path`. A missing path is simply "not a member".
    pub fn is_member(&self, groups_path: &str, group: &str) -> bool {
        match self.lookup(groups_path) {
            Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(group)),
            Some(Value::String(s)) => s == group,
            Some(Value::Object(map)) => map.contains_key(group),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        let raw = value.as_object().cloned().expect("object");
        let sub = raw["sub"].as_str().unwrap_or_default().to_string();
        Claims::new(sub, raw)
    }

    #[test]
    fn top_level_groups() {
        let c = claims(json!({"sub": "alice", "groups": ["admins", "users"]}));
        assert!(c.is_member("groups", "admins"));
        assert!(!c.is_member("groups", "superusers"));
    }

    #[test]
    fn nested_groups_path() {
        let c = claims(json!({"sub": "bob", "realm_access": {"roles": ["admins"]}}));
        assert!(c.is_member("realm_access.roles", "admins"));
        assert!(!c.is_member("realm_access.groups", "admins"));
        assert!(!c.is_member("realm_access.roles.extra", "admins"));
    }

    #[test]
    fn absent_path_is_not_member() {
        let c = claims(json!({"sub": "carol"}));
        assert!(!c.is_member("groups", "admins"));
        assert!(!c.is_member("", "admins"));
    }

    #[test]
    fn scalar_group_claim_requires_exact_match() {
        let c = claims(json!({"sub": "dan", "group": "admins"}));
        assert!(c.is_member("group", "admins"));
        assert!(!c.is_member("group", "admin"));
    }

    #[test]
    fn object_group_claim_checks_keys() {
        let c = claims(json!({"sub": "erin", "groups": {"admins": true}}));
        assert!(c.is_member("groups", "admins"));
    }

    #[test]
    fn claim_names_may_contain_colons() {
        let c = claims(json!({"sub": "frank", "cognito:groups": ["admins"]}));
        assert!(c.is_member("cognito:groups", "admins"));
        assert_eq!(c.subject(), "frank");
        assert!(c.get("cognito:groups").is_some());
    }
}
