use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::schedule::{parse_time, ConflictChecker};
use crate::domain::service::ServiceConfig;

/// Prefix for environment overrides, e.g. `CAMPUS_ORGS_SCHEDULE__MAX_SUGGESTIONS=6`.
pub const ENV_PREFIX: &str = "CAMPUS_ORGS_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CampusOrgsConfig {
    pub schedule: ScheduleConfig,
    pub collections: CollectionsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Suggested slots never start at or after this time of day.
    pub day_cutoff: String,
    pub max_suggestions: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            day_cutoff: "22:00".to_owned(),
            max_suggestions: 4,
        }
    }
}

/// Names of the store collections the module reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionsConfig {
    pub organizations: String,
    pub users: String,
    pub events: String,
    pub notifications: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            organizations: "organizations".to_owned(),
            users: "users".to_owned(),
            events: "events".to_owned(),
            notifications: "notifications".to_owned(),
        }
    }
}

impl CampusOrgsConfig {
    /// Defaults, then the YAML file (when given), then `CAMPUS_ORGS_*` env vars.
    ///
    /// # Errors
    /// Fails when the file is missing or any layer does not match the schema.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract the config from a caller-assembled figment.
    ///
    /// # Errors
    /// Fails when the figment data does not match the schema.
    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        figment
            .extract()
            .context("invalid campus-orgs configuration")
    }
}

impl TryFrom<&CampusOrgsConfig> for ServiceConfig {
    type Error = DomainError;

    fn try_from(config: &CampusOrgsConfig) -> Result<Self, Self::Error> {
        let day_cutoff = parse_time(&config.schedule.day_cutoff).map_err(|_| {
            DomainError::validation(
                "schedule.day_cutoff",
                format!("'{}' is not a time of day", config.schedule.day_cutoff),
            )
        })?;
        if config.schedule.max_suggestions == 0 {
            return Err(DomainError::validation(
                "schedule.max_suggestions",
                "must be at least 1",
            ));
        }

        let names = [
            ("collections.organizations", &config.collections.organizations),
            ("collections.users", &config.collections.users),
            ("collections.events", &config.collections.events),
            ("collections.notifications", &config.collections.notifications),
        ];
        for (field, name) in names {
            if name.trim().is_empty() {
                return Err(DomainError::validation(field, "must not be empty"));
            }
        }

        Ok(Self {
            checker: ConflictChecker::new(day_cutoff, config.schedule.max_suggestions),
            collections: config.collections.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use time::Time;

    #[test]
    fn defaults_match_documented_values() {
        let config = CampusOrgsConfig::default();
        assert_eq!(config.schedule.day_cutoff, "22:00");
        assert_eq!(config.schedule.max_suggestions, 4);
        assert_eq!(config.collections.users, "users");

        let service = ServiceConfig::try_from(&config).unwrap();
        assert_eq!(service.checker, ConflictChecker::default());
    }

    #[test]
    fn yaml_overrides_defaults() {
        let figment = Figment::new()
            .merge(Serialized::defaults(CampusOrgsConfig::default()))
            .merge(Yaml::string(
                "schedule:\n  day_cutoff: \"20:30\"\ncollections:\n  events: campus_events\n",
            ));

        let config = CampusOrgsConfig::from_figment(figment).unwrap();

        assert_eq!(config.schedule.day_cutoff, "20:30");
        assert_eq!(config.schedule.max_suggestions, 4);
        assert_eq!(config.collections.events, "campus_events");
        assert_eq!(config.collections.organizations, "organizations");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let figment = Figment::new()
            .merge(Serialized::defaults(CampusOrgsConfig::default()))
            .merge(Yaml::string("schedule:\n  max_suggestion: 3\n"));

        assert!(CampusOrgsConfig::from_figment(figment).is_err());
    }

    #[test]
    fn load_reads_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "schedule:\n  max_suggestions: 2").unwrap();

        temp_env::with_vars(
            [
                ("CAMPUS_ORGS_SCHEDULE__MAX_SUGGESTIONS", Some("6")),
                ("CAMPUS_ORGS_COLLECTIONS__USERS", Some("students")),
            ],
            || {
                let config = CampusOrgsConfig::load(Some(file.path())).unwrap();
                assert_eq!(config.schedule.max_suggestions, 6);
                assert_eq!(config.collections.users, "students");
            },
        );

        temp_env::with_vars_unset(["CAMPUS_ORGS_SCHEDULE__MAX_SUGGESTIONS"], || {
            let config = CampusOrgsConfig::load(Some(file.path())).unwrap();
            assert_eq!(config.schedule.max_suggestions, 2);
        });
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("campus-orgs.yaml");
        assert!(CampusOrgsConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn service_config_validates_schedule() {
        let mut config = CampusOrgsConfig::default();
        config.schedule.day_cutoff = "9:30 PM".to_owned();
        let service = ServiceConfig::try_from(&config).unwrap();
        assert_eq!(
            service.checker.day_cutoff(),
            Time::from_hms(21, 30, 0).unwrap()
        );

        config.schedule.day_cutoff = "late".to_owned();
        assert!(matches!(
            ServiceConfig::try_from(&config),
            Err(DomainError::Validation { .. })
        ));

        config.schedule.day_cutoff = "22:00".to_owned();
        config.schedule.max_suggestions = 0;
        assert!(ServiceConfig::try_from(&config).is_err());

        config.schedule.max_suggestions = 4;
        config.collections.events = "  ".to_owned();
        assert!(ServiceConfig::try_from(&config).is_err());
    }
}
