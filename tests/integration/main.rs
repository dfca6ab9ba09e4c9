//! Integration tests for jitcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Workspace with a config pointing the store and cache dir into a tempdir
    struct Workspace {
        temp: TempDir,
        config: PathBuf,
    }

    impl Workspace {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let config = temp.path().join("config.toml");
            fs::write(
                &config,
                format!(
                    "[cache]\ndir = {:?}\n\n[store]\npath = {:?}\n",
                    temp.path().join("cache").display().to_string(),
                    temp.path().join("store").display().to_string(),
                ),
            )
            .unwrap();
            Self { temp, config }
        }

        fn cache_dir(&self) -> PathBuf {
            self.temp.path().join("cache")
        }

        fn cmd(&self) -> Command {
            let mut cmd = jitcache();
            cmd.arg("--config").arg(&self.config);
            cmd
        }
    }

    fn jitcache() -> Command {
        let mut cmd = cargo_bin_cmd!("jitcache");
        for var in [
            "RUNNER_OS",
            "JITCACHE_NAME",
            "JITCACHE_TOOL_VERSION",
            "JITCACHE_CONFIG",
            "GITHUB_ENV",
            "GITHUB_PATH",
            "GITHUB_OUTPUT",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    fn identity_args(date: &str) -> [&str; 6] {
        ["--os", "Linux", "--tool-version", "3.11", "--date", date]
    }

    fn populate(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("kernel.nbi"), b"compiled").unwrap();
    }

    #[test]
    fn help_displays() {
        jitcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("JIT compiler cache"));
    }

    #[test]
    fn version_displays() {
        jitcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("jitcache"));
    }

    #[test]
    fn key_prints_primary_and_prefix() {
        let ws = Workspace::new();
        ws.cmd()
            .arg("key")
            .args(identity_args("2024-03-05"))
            .args(["--format", "plain"])
            .assert()
            .success()
            .stdout("numba-build-Linux-3.11-05/03/2024\nnumba-build-Linux-3.11-\n");
    }

    #[test]
    fn restore_empty_store_is_cold_build() {
        let ws = Workspace::new();
        ws.cmd()
            .arg("restore")
            .args(identity_args("2024-03-05"))
            .args(["--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"reason\": \"not_found\""))
            .stdout(predicate::str::contains("\"hit\": false"));
    }

    #[test]
    fn restore_falls_back_to_previous_day() {
        let ws = Workspace::new();
        populate(&ws.cache_dir());

        ws.cmd()
            .arg("save")
            .args(identity_args("2024-03-04"))
            .assert()
            .success()
            .stdout(predicate::str::contains("numba-build-Linux-3.11-04/03/2024"));

        fs::remove_dir_all(ws.cache_dir()).unwrap();

        ws.cmd()
            .arg("restore")
            .args(identity_args("2024-03-05"))
            .args(["--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"reason\": \"prefix_match\""))
            .stdout(predicate::str::contains("numba-build-Linux-3.11-04/03/2024"));

        assert_eq!(
            fs::read(ws.cache_dir().join("kernel.nbi")).unwrap(),
            b"compiled"
        );
    }

    #[test]
    fn restore_disabled_never_touches_store() {
        let ws = Workspace::new();
        populate(&ws.cache_dir());
        ws.cmd()
            .arg("save")
            .args(identity_args("2024-03-05"))
            .assert()
            .success();

        ws.cmd()
            .arg("restore")
            .args(identity_args("2024-03-05"))
            .arg("--no-restore")
            .assert()
            .success()
            .stdout(predicate::str::contains("restore disabled"));
    }

    #[test]
    fn restore_writes_github_outputs() {
        let ws = Workspace::new();
        let output = ws.temp.path().join("github_output");

        ws.cmd()
            .env("GITHUB_OUTPUT", &output)
            .arg("restore")
            .args(identity_args("2024-03-05"))
            .arg("--github-output")
            .assert()
            .success();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "cache-hit=false\nmatched-key=\n"
        );
    }

    #[test]
    fn corrupt_store_is_cold_build() {
        let ws = Workspace::new();
        let store = ws.temp.path().join("store");
        fs::create_dir_all(&store).unwrap();
        fs::write(store.join("index.json"), "{broken").unwrap();

        ws.cmd()
            .arg("restore")
            .args(identity_args("2024-03-05"))
            .assert()
            .success()
            .stdout(predicate::str::contains("No cache found"));
    }

    #[test]
    fn invalid_tool_version_fails() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["key", "--os", "Linux", "--tool-version", "3.11-rc1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache identity"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn dashed_cache_name_fails() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["restore", "--name", "build-Linux-3.11"])
            .args(identity_args("2024-03-05"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("cache_name"));
    }

    #[test]
    fn invalid_date_rejected() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["key", "--os", "Linux", "-t", "3.11", "--date", "05/03/2024"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("expected YYYY-MM-DD"));
    }

    #[test]
    fn save_without_cache_dir_fails() {
        let ws = Workspace::new();
        ws.cmd()
            .arg("save")
            .args(identity_args("2024-03-05"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Nothing to save"));
    }

    #[test]
    fn env_prints_exports() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["env", "--os", "Linux"])
            .assert()
            .success()
            .stdout(predicate::str::contains("export NUMBA_CPU_NAME='generic'"))
            .stdout(predicate::str::contains("export NUMBA_CACHE_DIR="))
            .stdout(predicate::str::contains("PATH").not());
    }

    #[test]
    fn env_github_writes_files() {
        let ws = Workspace::new();
        let env_file = ws.temp.path().join("github_env");
        let path_file = ws.temp.path().join("github_path");

        ws.cmd()
            .env("GITHUB_ENV", &env_file)
            .env("GITHUB_PATH", &path_file)
            .args(["env", "--os", "Windows", "--github"])
            .assert()
            .success();

        let env = fs::read_to_string(&env_file).unwrap();
        assert!(env.contains("NUMBA_CPU_NAME=generic\n"));
        assert!(env.contains("NUMBA_CPU_FEATURES=+64bit"));
        assert_eq!(
            fs::read_to_string(&path_file).unwrap(),
            "C:\\Program Files\\Git\\usr\\bin\n"
        );
    }

    #[test]
    fn env_github_outside_actions_fails() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["env", "--github"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("GITHUB_ENV"));
    }

    #[test]
    fn config_path() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        jitcache()
            .args(["--config", "/nonexistent/jitcache.toml", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("namespace = \"numba\""));
    }

    #[test]
    fn config_init_writes_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("conf").join("config.toml");

        jitcache()
            .arg("--config")
            .arg(&path)
            .args(["config", "init"])
            .assert()
            .success();

        assert!(fs::read_to_string(&path).unwrap().contains("[compiler]"));
    }
}
