use serde::{Deserialize, Serialize};

const CONTEXTS_SEGMENT: &str = "/contexts/";

/// v2 session path, e.g. `projects/p/agent/sessions/123`.
///
/// v2 contexts are named `{session}/contexts/{name}` on the wire; everything
/// above the wire layer uses the short `{name}` only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionPath(pub String);

impl SessionPath {
    pub fn new(session: impl Into<String>) -> Self {
        Self(session.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified context name for the wire.
    pub fn context_name(&self, short: &str) -> String {
        format!("{}{}{}", self.0, CONTEXTS_SEGMENT, short)
    }

    /// Recover the short name from a fully qualified one.
    ///
    /// Strips `{session}/contexts/` when it matches; otherwise falls back to
    /// whatever follows the last `/contexts/`, and finally the input itself.
    pub fn short_name<'a>(&self, full: &'a str) -> &'a str {
        if let Some(rest) = full
            .strip_prefix(self.0.as_str())
            .and_then(|r| r.strip_prefix(CONTEXTS_SEGMENT))
        {
            return rest;
        }
        match full.rfind(CONTEXTS_SEGMENT) {
            Some(pos) => &full[pos + CONTEXTS_SEGMENT.len()..],
            None => full,
        }
    }
}

impl std::fmt::Display for SessionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION: &str = "projects/weather/agent/sessions/abc-123";

    #[test]
    fn roundtrip_context_name() {
        let path = SessionPath::new(SESSION);
        let full = path.context_name("weather");
        assert_eq!(full, format!("{SESSION}/contexts/weather"));
        assert_eq!(path.short_name(&full), "weather");
    }

    #[test]
    fn foreign_session_falls_back_to_last_segment() {
        let path = SessionPath::new(SESSION);
        assert_eq!(
            path.short_name("projects/other/agent/sessions/zzz/contexts/city"),
            "city"
        );
    }

    #[test]
    fn bare_name_passes_through() {
        let path = SessionPath::new(SESSION);
        assert_eq!(path.short_name("city"), "city");
    }
}
