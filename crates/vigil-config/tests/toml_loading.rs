//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use vigil_config::{ConfigError, VigilConfig};

#[test]
fn loads_engine_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[engine]
statement_timeout_ms = 5000
row_cap = 250
sample_rows = 10
fk_sample_limit = 5
connect_timeout_secs = 3
"#,
        )?;

        let config: VigilConfig = Figment::from(Serialized::defaults(VigilConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.engine.statement_timeout_ms, 5000);
        assert_eq!(config.engine.row_cap, 250);
        assert_eq!(config.engine.sample_rows, 10);
        assert_eq!(config.engine.fk_sample_limit, 5);
        assert_eq!(config.engine.connect_timeout_secs, 3);
        Ok(())
    });
}

#[test]
fn loads_target_and_store_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[target]
database_url = "postgres://auditor@localhost:5432/app"
schemas = ["public", "billing"]

[store]
path = "/var/lib/vigil/vigil.db"
"#,
        )?;

        let config: VigilConfig = Figment::from(Serialized::defaults(VigilConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert!(config.target.is_configured());
        assert_eq!(
            config.target.schemas,
            vec!["public".to_string(), "billing".to_string()]
        );
        assert_eq!(config.store.path, "/var/lib/vigil/vigil.db");
        // Unset sections keep their defaults.
        assert_eq!(config.engine.row_cap, 100);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[engine]
row_cap = 250
"#,
        )?;
        jail.set_env("VIGIL_ENGINE__ROW_CAP", "40");
        jail.set_env("VIGIL_TARGET__DATABASE_URL", "postgres://env@localhost/app");

        let config: VigilConfig = Figment::from(Serialized::defaults(VigilConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("VIGIL_").split("__"))
            .extract()?;

        assert_eq!(config.engine.row_cap, 40);
        assert_eq!(config.target.database_url, "postgres://env@localhost/app");
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".vigil")?;
        jail.create_file(
            ".vigil/config.toml",
            r#"
[engine]
sample_rows = 7
"#,
        )?;

        let config = VigilConfig::load().expect("config loads");
        assert_eq!(config.engine.sample_rows, 7);
        Ok(())
    });
}

#[test]
fn invalid_guardrail_is_rejected_on_load() {
    Jail::expect_with(|jail| {
        jail.set_env("VIGIL_ENGINE__STATEMENT_TIMEOUT_MS", "0");

        let err = VigilConfig::load().expect_err("zero timeout must be rejected");
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "engine.statement_timeout_ms"));
        Ok(())
    });
}
