//! End-to-end tests for the `gitremote` binary.

use assert_cmd::Command;
use predicates::prelude::*;

const LISTING: &str = "\
fork\thttps://gitlab.com/me/repo.git (fetch)
fork\thttps://gitlab.com/me/repo.git (push)
origin\tgit@github.com:Org/Repo.git (fetch)
origin\tgit@github.com:Org/Repo.git (push)
upstream\tssh://git@example.com/~org/repo.git (fetch)
broken line
";

fn gitremote() -> Command {
    let mut cmd = Command::cargo_bin("gitremote").unwrap();
    cmd.env_remove("GITREMOTE_SSH")
        .env_remove("GITREMOTE_SSH_TIMEOUT_MS")
        .env_remove("GITREMOTE_MAX_RESOLUTIONS")
        .env("GITREMOTE_NO_ALIAS", "1");
    cmd
}

#[test]
fn test_should_classify_urls() {
    gitremote()
        .args([
            "classify",
            "https://user@example.com/org/repo.git",
            "git@example.com:org/repo.git",
        ])
        .assert()
        .success()
        .stdout("https\texample.com\torg/repo\nssh\texample.com\torg/repo\n");
}

#[test]
fn test_should_fail_for_unrecognized_url() {
    gitremote()
        .args(["classify", "/srv/git/repo.git", "git://example.com/a/b"])
        .assert()
        .code(1)
        .stdout("git\texample.com\ta/b\n")
        .stderr(predicate::str::contains("/srv/git/repo.git: unrecognized"));
}

#[test]
fn test_should_list_from_stdin_in_input_order() {
    gitremote()
        .args(["list", "--input", "-", "--repo", "/repo"])
        .write_stdin(LISTING)
        .assert()
        .success()
        .stdout(
            "fork\thttps\tgitlab.com\tme/repo\tfetch,push\n\
             origin\tssh\tgithub.com\tOrg/Repo\tfetch,push\n\
             upstream\tssh\texample.com\torg/repo\tfetch\n",
        );
}

#[test]
fn test_should_sort_by_weight() {
    gitremote()
        .args(["list", "--input", "-", "--sort"])
        .write_stdin(LISTING)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("upstream\t"))
        .stdout(predicate::str::ends_with("fork\thttps\tgitlab.com\tme/repo\tfetch,push\n"));
}

#[test]
fn test_should_output_json() {
    gitremote()
        .args(["list", "--input", "-", "--repo", "/repo", "--json"])
        .write_stdin(LISTING)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"repository_path\": \"/repo\""))
        .stdout(predicate::str::contains("\"direction\": \"push\""))
        .stdout(predicate::str::contains("\"domain\": \"github.com\""));
}

#[test]
fn test_should_print_nothing_for_empty_listing() {
    gitremote()
        .args(["list", "--input", "-"])
        .write_stdin("")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_should_reject_invalid_environment() {
    gitremote()
        .env("GITREMOTE_SSH_TIMEOUT_MS", "soon")
        .args(["classify", "git@example.com:org/repo.git"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GITREMOTE_SSH_TIMEOUT_MS"));
}

#[test]
fn test_should_fall_back_to_alias_with_broken_ssh() {
    gitremote()
        .env_remove("GITREMOTE_NO_ALIAS")
        .env("GITREMOTE_SSH", "/nonexistent/bin/ssh-for-tests")
        .args(["classify", "git@myalias:org/repo.git"])
        .assert()
        .success()
        .stdout("ssh\tmyalias\torg/repo\n");
}
