//! Environment levels and the static table of per-level variables.
//!
//! # Invariants
//! - Every [`EnvironmentLevel`] has exactly one [`EnvironmentVariableSet`] in a
//!   table built by [`EnvironmentTable::builtin`].
//! - The table is immutable once constructed.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// A deployment tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentLevel {
    Dev,
    Staging,
    Prod,
}

/// Returned when a path segment does not name a known level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEnvironmentLevel(pub String);

impl std::fmt::Display for UnknownEnvironmentLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown environment level: {}", self.0)
    }
}

impl std::error::Error for UnknownEnvironmentLevel {}

impl EnvironmentLevel {
    pub const ALL: [Self; 3] = [Self::Dev, Self::Staging, Self::Prod];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Staging => "staging",
            Self::Prod => "prod",
        }
    }

    /// Resource name checked against the policy decision point, e.g. `envdev`.
    #[must_use]
    pub fn resource(self) -> String {
        format!("env{}", self.as_str())
    }
}

impl FromStr for EnvironmentLevel {
    type Err = UnknownEnvironmentLevel;

    /// Matching is exact; `Dev` or ` dev` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "staging" => Ok(Self::Staging),
            "prod" => Ok(Self::Prod),
            other => Err(UnknownEnvironmentLevel(other.to_string())),
        }
    }
}

impl std::fmt::Display for EnvironmentLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variable name to value. Serializes as a flat JSON object.
pub type EnvironmentVariableSet = BTreeMap<String, String>;

/// Read-only mapping from level to its variables.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentTable {
    sets: HashMap<EnvironmentLevel, EnvironmentVariableSet>,
}

impl EnvironmentTable {
    /// The hardcoded demo table.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries([
            (
                EnvironmentLevel::Dev,
                vec![("DB_HOST", "dev.db.local"), ("API_KEY", "dev123")],
            ),
            (
                EnvironmentLevel::Staging,
                vec![("DB_HOST", "staging.db.internal"), ("API_KEY", "staging456")],
            ),
            (
                EnvironmentLevel::Prod,
                vec![("DB_HOST", "prod.db.public"), ("API_KEY", "prod789")],
            ),
        ])
    }

    /// Build a table from explicit entries. A level listed twice keeps its last set.
    pub fn from_entries<I, V, K, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (EnvironmentLevel, V)>,
        V: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<String>,
    {
        let sets = entries
            .into_iter()
            .map(|(level, vars)| {
                let set = vars
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect();
                (level, set)
            })
            .collect();
        Self { sets }
    }

    #[must_use]
    pub fn get(&self, level: EnvironmentLevel) -> Option<&EnvironmentVariableSet> {
        self.sets.get(&level)
    }

    /// True when every level has a set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        EnvironmentLevel::ALL
            .iter()
            .all(|level| self.sets.contains_key(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!("dev".parse(), Ok(EnvironmentLevel::Dev));
        assert_eq!("staging".parse(), Ok(EnvironmentLevel::Staging));
        assert_eq!("prod".parse(), Ok(EnvironmentLevel::Prod));
    }

    #[test]
    fn test_parse_rejects_unknown_levels() {
        for input in ["", "Dev", "PROD", "production", "test", " dev", "dev/"] {
            assert_eq!(
                input.parse::<EnvironmentLevel>(),
                Err(UnknownEnvironmentLevel(input.to_string())),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn test_resource_names() {
        assert_eq!(EnvironmentLevel::Dev.resource(), "envdev");
        assert_eq!(EnvironmentLevel::Staging.resource(), "envstaging");
        assert_eq!(EnvironmentLevel::Prod.resource(), "envprod");
    }

    #[test]
    fn test_display_matches_parse() {
        for level in EnvironmentLevel::ALL {
            assert_eq!(level.to_string().parse(), Ok(level));
        }
    }

    #[test]
    fn test_builtin_table_is_complete() {
        let table = EnvironmentTable::builtin();
        assert!(table.is_complete());

        let dev = table.get(EnvironmentLevel::Dev).expect("dev set");
        assert_eq!(dev.len(), 2);
        assert_eq!(dev["DB_HOST"], "dev.db.local");
        assert_eq!(dev["API_KEY"], "dev123");

        let staging = table.get(EnvironmentLevel::Staging).expect("staging set");
        assert_eq!(staging["DB_HOST"], "staging.db.internal");
        assert_eq!(staging["API_KEY"], "staging456");

        let prod = table.get(EnvironmentLevel::Prod).expect("prod set");
        assert_eq!(prod["DB_HOST"], "prod.db.public");
        assert_eq!(prod["API_KEY"], "prod789");
    }

    #[test]
    fn test_partial_table() {
        let table = EnvironmentTable::from_entries([(
            EnvironmentLevel::Dev,
            vec![("ONLY", "dev")],
        )]);
        assert!(!table.is_complete());
        assert!(table.get(EnvironmentLevel::Prod).is_none());
        assert!(EnvironmentTable::default().get(EnvironmentLevel::Dev).is_none());
    }

    #[test]
    fn test_set_serializes_as_flat_object() {
        let table = EnvironmentTable::builtin();
        let json = serde_json::to_value(table.get(EnvironmentLevel::Dev).expect("dev set"))
            .expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({"DB_HOST": "dev.db.local", "API_KEY": "dev123"})
        );
    }
}
