use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Messaging integrations the agent can be reached through.
///
/// The two webhook formats name platforms differently: v2 uses upper-case
/// enum names (`FACEBOOK`), v1 uses lower-case source names (`facebook`), and
/// the voice assistant is `ACTIONS_ON_GOOGLE` in v2 but `google` in v1.
/// Anything not listed here is kept verbatim in [`PlatformId::Other`] so that
/// new integrations round-trip without special-case rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum PlatformId {
    #[default]
    Unspecified,
    Facebook,
    Slack,
    Telegram,
    Kik,
    Skype,
    Line,
    Viber,
    /// The voice-assistant integration.
    ActionsOnGoogle,
    Other(String),
}

/// (variant, v2 name, v1 name) for every named platform.
const NAME_TABLE: &[(PlatformId, &str, &str)] = &[
    (PlatformId::Facebook, "FACEBOOK", "facebook"),
    (PlatformId::Slack, "SLACK", "slack"),
    (PlatformId::Telegram, "TELEGRAM", "telegram"),
    (PlatformId::Kik, "KIK", "kik"),
    (PlatformId::Skype, "SKYPE", "skype"),
    (PlatformId::Line, "LINE", "line"),
    (PlatformId::Viber, "VIBER", "viber"),
    (PlatformId::ActionsOnGoogle, "ACTIONS_ON_GOOGLE", "google"),
];

const UNSPECIFIED_V2: &str = "PLATFORM_UNSPECIFIED";

impl PlatformId {
    /// Resolve a v1 source name (`"facebook"`, `"google"`, …).
    pub fn from_v1_name(name: &str) -> Self {
        NAME_TABLE
            .iter()
            .find(|(_, _, v1)| *v1 == name)
            .map(|(id, _, _)| id.clone())
            .unwrap_or_else(|| PlatformId::Other(name.to_string()))
    }

    /// Resolve a v2 enum name (`"FACEBOOK"`, `"ACTIONS_ON_GOOGLE"`, …).
    pub fn from_v2_name(name: &str) -> Self {
        if name == UNSPECIFIED_V2 {
            return PlatformId::Unspecified;
        }
        NAME_TABLE
            .iter()
            .find(|(_, v2, _)| *v2 == name)
            .map(|(id, _, _)| id.clone())
            .unwrap_or_else(|| PlatformId::Other(name.to_string()))
    }

    /// v1 name, or `None` for `Unspecified` (v1 omits the field entirely).
    pub fn to_v1_name(&self) -> Option<&str> {
        match self {
            PlatformId::Unspecified => None,
            PlatformId::Other(name) => Some(name.as_str()),
            named => NAME_TABLE
                .iter()
                .find(|(id, _, _)| id == named)
                .map(|(_, _, v1)| *v1),
        }
    }

    pub fn to_v2_name(&self) -> &str {
        match self {
            PlatformId::Unspecified => UNSPECIFIED_V2,
            PlatformId::Other(name) => name.as_str(),
            named => NAME_TABLE
                .iter()
                .find(|(id, _, _)| id == named)
                .map(|(_, v2, _)| *v2)
                .unwrap_or(UNSPECIFIED_V2),
        }
    }

    /// Key used for a raw payload envelope (`{"facebook": {...}}`, `{"google": {...}}`).
    pub fn payload_key(&self) -> &str {
        self.to_v1_name().unwrap_or(UNSPECIFIED_V2)
    }

    /// Whether cards, images and suggestion chips can target this platform.
    pub fn is_rich_capable(&self) -> bool {
        !matches!(self, PlatformId::Unspecified | PlatformId::Other(_))
    }

    pub fn is_actions_on_google(&self) -> bool {
        matches!(self, PlatformId::ActionsOnGoogle)
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, PlatformId::Unspecified)
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_v2_name())
    }
}

impl std::str::FromStr for PlatformId {
    type Err = std::convert::Infallible;

    /// Accepts either naming; v2 names win.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match PlatformId::from_v2_name(s) {
            PlatformId::Other(_) => Ok(PlatformId::from_v1_name(s)),
            known => Ok(known),
        }
    }
}

impl From<&str> for PlatformId {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(id) => id,
            Err(never) => match never {},
        }
    }
}

impl Serialize for PlatformId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_v2_name())
    }
}

impl<'de> Deserialize<'de> for PlatformId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(PlatformId::from(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_names_round_trip() {
        for (id, _, v1) in NAME_TABLE {
            assert_eq!(&PlatformId::from_v1_name(v1), id);
            assert_eq!(id.to_v1_name(), Some(*v1));
        }
    }

    #[test]
    fn voice_assistant_names_differ_per_dialect() {
        let id = PlatformId::ActionsOnGoogle;
        assert_eq!(id.to_v1_name(), Some("google"));
        assert_eq!(id.to_v2_name(), "ACTIONS_ON_GOOGLE");
        assert_eq!(id.payload_key(), "google");
    }

    #[test]
    fn unknown_platform_passes_through_both_tables() {
        let id = PlatformId::from_v1_name("twitter");
        assert_eq!(id, PlatformId::Other("twitter".into()));
        assert_eq!(id.to_v1_name(), Some("twitter"));
        assert_eq!(id.to_v2_name(), "twitter");
        assert_eq!(PlatformId::from_v2_name("twitter"), id);
    }

    #[test]
    fn rich_capable_excludes_unspecified_only_among_named() {
        assert!(!PlatformId::Unspecified.is_rich_capable());
        for (id, _, _) in NAME_TABLE {
            assert!(id.is_rich_capable(), "{id} should be rich capable");
        }
    }

    #[test]
    fn unspecified_has_no_v1_name() {
        assert_eq!(PlatformId::Unspecified.to_v1_name(), None);
        assert_eq!(PlatformId::from_v2_name("PLATFORM_UNSPECIFIED"), PlatformId::Unspecified);
    }

    #[test]
    fn parse_accepts_either_naming() {
        assert_eq!(PlatformId::from("SLACK"), PlatformId::Slack);
        assert_eq!(PlatformId::from("slack"), PlatformId::Slack);
        assert_eq!(PlatformId::from("google"), PlatformId::ActionsOnGoogle);
    }

    #[test]
    fn serde_uses_v2_name() {
        let json = serde_json::to_string(&PlatformId::Telegram).unwrap();
        assert_eq!(json, r#""TELEGRAM""#);
        let back: PlatformId = serde_json::from_str(r#""telegram""#).unwrap();
        assert_eq!(back, PlatformId::Telegram);
    }
}
