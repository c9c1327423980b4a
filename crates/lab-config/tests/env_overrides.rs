use std::path::PathBuf;

use figment::Jail;
use lab_config::LabConfig;
use pretty_assertions::assert_eq;

#[test]
fn env_vars_fill_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("LABSCHEMA_OUTPUT__DIR", "/data/records");
        jail.set_env("LABSCHEMA_SCHEMA__STRICT_VERSIONS", "true");

        let config = LabConfig::load().expect("config loads");
        assert_eq!(config.output.dir, PathBuf::from("/data/records"));
        assert!(config.schema.strict_versions);
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".labschema")?;
        jail.create_file(
            ".labschema/config.toml",
            "[output]\ndir = \"from-file\"\npretty = false\n",
        )?;
        jail.set_env("LABSCHEMA_OUTPUT__PRETTY", "true");

        let config = LabConfig::load().expect("config loads");
        assert_eq!(config.output.dir, PathBuf::from("from-file"));
        assert!(config.output.pretty);
        Ok(())
    });
}

#[test]
fn unrelated_env_vars_are_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("OUTPUT__DIR", "ignored");
        jail.set_env("LABSCHEMAOUTPUT__DIR", "ignored");

        let config = LabConfig::load().expect("config loads");
        assert_eq!(config.output.dir, PathBuf::from("."));
        Ok(())
    });
}
