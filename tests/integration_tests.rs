//! Integration tests for lifegit
//!
//! These drive the binary end to end against throwaway repositories.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use lifegit::repo::LifeRepo;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A lifegit Command isolated from the caller's config and environment.
fn lifegit(config_home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("lifegit");
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("LIFEGIT_ADVANCED")
        .env_remove("LIFEGIT_CONTENT")
        .env_remove("LIFEGIT_DIRECTORY")
        .env_remove("RUST_LOG");
    cmd
}

fn commit(repo: &LifeRepo, name: &str, content: &str, message: &str) {
    fs::write(repo.path().join(name), content).unwrap();
    repo.commit_with(message, &[name]).unwrap();
}

/// A repository that has finished the first act.
fn decided_repo() -> (LifeRepo, TempDir) {
    let dir = TempDir::new().unwrap();
    let mut repo = LifeRepo::open(dir.path()).unwrap();
    repo.initialize().unwrap();
    commit(&repo, "decision.txt", "University", "My first decision");
    (repo, dir)
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        let home = TempDir::new().unwrap();
        lifegit(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("start"))
            .stdout(predicate::str::contains("validate"))
            .stdout(predicate::str::contains("status"));
    }

    #[test]
    fn test_version() {
        let home = TempDir::new().unwrap();
        lifegit(home.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("lifegit"));
    }

    #[test]
    fn test_missing_subcommand_is_usage_error() {
        let home = TempDir::new().unwrap();
        lifegit(home.path()).assert().failure();
    }
}

// =============================================================================
// Status
// =============================================================================

mod status {
    use super::*;

    #[test]
    fn test_status_without_repository() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        lifegit(home.path())
            .args(["status", "--path"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("No commits yet"));
        assert!(!dir.path().join(".git").exists());
    }

    #[test]
    fn test_status_counts_what_if_branches() {
        let home = TempDir::new().unwrap();
        let (repo, dir) = decided_repo();
        repo.create_branch("what-if-travel").unwrap();

        lifegit(home.path())
            .args(["status", "-p"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Total commits:    1"))
            .stdout(predicate::str::contains("What-if branches: 1"));
    }

    #[test]
    fn test_status_missing_path() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        lifegit(home.path())
            .args(["status", "--path"])
            .arg(dir.path().join("nowhere"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"));
    }
}

// =============================================================================
// Validate
// =============================================================================

mod validate {
    use super::*;

    #[test]
    fn test_unknown_act_fails() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        lifegit(home.path())
            .args(["validate", "3", "--path"])
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("between 1 and 2"));
    }

    #[test]
    fn test_incomplete_act_reports_and_succeeds() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        lifegit(home.path())
            .args(["validate", "1", "--path"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Act 1 not complete yet"))
            .stdout(predicate::str::contains("git init"));
        assert!(!dir.path().join(".git").exists());
    }

    #[test]
    fn test_first_act_complete() {
        let home = TempDir::new().unwrap();
        let (_repo, dir) = decided_repo();
        lifegit(home.path())
            .args(["validate", "1", "--path"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Act 1 complete!"));
    }

    #[test]
    fn test_second_act_progression() {
        let home = TempDir::new().unwrap();
        let (repo, dir) = decided_repo();

        lifegit(home.path())
            .args(["validate", "2", "--path"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Act 2 not complete yet"));

        repo.create_branch("what-if-travel").unwrap();
        repo.checkout("what-if-travel").unwrap();
        commit(&repo, "travel-life.txt", "Backpacking", "What if I'd chosen travel?");
        repo.checkout("main").unwrap();

        // twice: validation never changes the repository
        for _ in 0..2 {
            lifegit(home.path())
                .args(["validate", "2", "--path"])
                .arg(dir.path())
                .assert()
                .success()
                .stdout(predicate::str::contains("Act 2 complete!"));
        }
        assert_eq!(repo.current_branch_name().unwrap(), "main");
    }

    #[test]
    fn test_custom_prefix_from_config() {
        let home = TempDir::new().unwrap();
        let (repo, dir) = decided_repo();
        repo.create_branch("alt-travel").unwrap();
        repo.checkout("alt-travel").unwrap();
        commit(&repo, "travel-life.txt", "Backpacking", "alternate");
        repo.checkout("main").unwrap();

        let config = home.path().join("custom.toml");
        fs::write(&config, "[tutorial]\nwhat_if_prefix = \"alt-\"\n").unwrap();

        lifegit(home.path())
            .arg("--config")
            .arg(&config)
            .args(["validate", "2", "--path"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Act 2 complete!"));
    }
}

// =============================================================================
// Config
// =============================================================================

mod config {
    use super::*;

    #[test]
    fn test_show_defaults() {
        let home = TempDir::new().unwrap();
        lifegit(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No lifegit.toml found"))
            .stdout(predicate::str::contains("main_branches"));
    }

    #[test]
    fn test_init_then_validate() {
        let home = TempDir::new().unwrap();
        let path = home.path().join("lifegit.toml");

        lifegit(home.path())
            .arg("--config")
            .arg(&path)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created lifegit.toml"));
        assert!(path.exists());

        lifegit(home.path())
            .arg("--config")
            .arg(&path)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));

        lifegit(home.path())
            .arg("--config")
            .arg(&path)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration is valid."));
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let home = TempDir::new().unwrap();
        let path = home.path().join("broken.toml");
        fs::write(&path, "[tutorial\n").unwrap();
        let dir = TempDir::new().unwrap();

        lifegit(home.path())
            .arg("--config")
            .arg(&path)
            .args(["status", "--path"])
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("broken.toml"));
    }

    #[test]
    fn test_bad_env_flag_is_reported() {
        let home = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        lifegit(home.path())
            .env("LIFEGIT_ADVANCED", "sometimes")
            .args(["status", "--path"])
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("LIFEGIT_ADVANCED"));
    }
}
