use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

use lus::config_file::{FILENAME, LusFileError, find_lusfile, load_lusfile};

fn write_lusfile(dir: &Path, content: &str) {
    fs::write(dir.join(FILENAME), content).unwrap();
}

/// `lus` in `dir` with command echo disabled and a clean environment.
fn lus(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lus"));
    cmd.current_dir(dir)
        .env_remove("LUS_FILE")
        .env_remove("LUS_LOG_FILE")
        .env_remove("RUST_LOG")
        .env("LUS_PRINT_COMMANDS", "0");
    cmd
}

const DEFAULT: &str = "foo {\n    $ echo foo\n}\n$ lus foo\n";

const SUBCOMMAND_ENV_VAR: &str = r##"$ echo "Subcommand $subcommand"
cmd1 {
    $ echo #"1: \$subcommand is: $subcommand"#
    cmd4 {
        $ echo #"4: \$subcommand is: $subcommand"#
    }
}
cmd2 {
    $ echo #"2: \$subcommand is: $subcommand"#
}
cmd3 {
    $ echo "Default subcommand"
}
$ test -z "$subcommand" && lus cmd3
"##;

const JUST_EXAMPLE: &str = "b {\n    $ lus build\n}\nbuild {\n    $ echo building\n}\ntest-all {\n    $ lus test\n}\ntest {\n    $ echo testing\n}\n";

#[test]
fn test_find_lusfile_from_subdirectory() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), DEFAULT);
    let nested = dir.path().join("src").join("deep");
    fs::create_dir_all(&nested).unwrap();
    assert_eq!(find_lusfile(&nested).unwrap(), dir.path().join(FILENAME));
}

#[test]
fn test_load_explicit_lusfile() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), JUST_EXAMPLE);
    let lusfile = load_lusfile(Some(&dir.path().join(FILENAME))).unwrap();
    assert_eq!(lusfile.nodes.len(), 4);
    assert_eq!(lusfile.directory(), dir.path());
    assert_eq!(lusfile.aliases.get("b").map(String::as_str), Some("build"));
    assert_eq!(
        lusfile.aliases.get("test-all").map(String::as_str),
        Some("test")
    );
}

#[test]
fn test_load_missing_explicit_lusfile() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_lusfile(Some(&dir.path().join("missing.kdl")));
    assert!(matches!(result, Err(LusFileError::NotFound(_))));
}

#[test]
fn test_load_invalid_lusfile() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), "build {\n");
    let result = load_lusfile(Some(&dir.path().join(FILENAME)));
    assert!(matches!(result, Err(LusFileError::Parse { .. })));
}

#[cfg(unix)]
#[test]
fn test_default() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), DEFAULT);
    lus(dir.path()).assert().success().stdout("foo\n").stderr("");
    lus(dir.path())
        .arg("foo")
        .assert()
        .success()
        .stdout("foo\n")
        .stderr("");
}

#[cfg(unix)]
#[test]
fn test_root_default_accepts_arguments() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), "- echo foo\n");
    lus(dir.path()).assert().success().stdout("foo\n");
    lus(dir.path()).arg("foo").assert().success().stdout("foo\n");
}

#[cfg(unix)]
#[test]
fn test_args() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(
        dir.path(),
        "forward {\n    $ sh -c $args\n}\ninside {\n    $ echo before $args after\n}\nunused\n",
    );
    lus(dir.path())
        .args(["forward", "echo Hello, World!"])
        .assert()
        .success()
        .stdout("Hello, World!\n")
        .stderr("");
    lus(dir.path())
        .args(["forward", "exit 3"])
        .assert()
        .code(3)
        .stdout("");
    lus(dir.path())
        .args(["inside", "x", "y"])
        .assert()
        .success()
        .stdout("before x y after\n");
    lus(dir.path())
        .args(["unused", "foo"])
        .assert()
        .code(1)
        .stdout("error: Unexpected argument: foo\n")
        .stderr("");
}

#[cfg(unix)]
#[test]
fn test_subcommand_env_var() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), SUBCOMMAND_ENV_VAR);
    lus(dir.path())
        .arg("cmd1")
        .assert()
        .success()
        .stdout("Subcommand cmd1\n1: $subcommand is: \n");
    lus(dir.path())
        .arg("cmd2")
        .assert()
        .success()
        .stdout("Subcommand cmd2\n2: $subcommand is: \n");
    lus(dir.path())
        .assert()
        .success()
        .stdout("Subcommand \nSubcommand cmd3\nDefault subcommand\n");
    lus(dir.path())
        .args(["cmd1", "cmd4"])
        .assert()
        .success()
        .stdout("Subcommand cmd1\n1: $subcommand is: cmd4\n4: $subcommand is: \n");
}

#[test]
fn test_just_example() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), JUST_EXAMPLE);
    lus(dir.path())
        .arg("non_existing")
        .assert()
        .code(1)
        .stderr("")
        .stdout(
            "error: Unknown subcommand non_existing not one of:\n    b\n    build\n    test-all\n    test\n",
        );
}

#[cfg(unix)]
#[test]
fn test_alias() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), JUST_EXAMPLE);
    lus(dir.path())
        .arg("b")
        .assert()
        .success()
        .stdout("building\n");
}

#[test]
fn test_errors() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(
        dir.path(),
        "a {\n    $ echo 1\n}\na {\n    $ echo 2\n}\n",
    );
    lus(dir.path())
        .assert()
        .code(1)
        .stdout("")
        .stderr("error: Duplicate node name 'a'\n");
}

#[test]
fn test_missing_lusfile() {
    let dir = tempfile::tempdir().unwrap();
    lus(dir.path())
        .env("LUS_FILE", dir.path().join("nope.kdl"))
        .assert()
        .code(1)
        .stderr(contains("error: No such file or directory"));
}

#[test]
fn test_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), "build {\n");
    lus(dir.path())
        .assert()
        .code(1)
        .stderr(contains("error:").and(contains(FILENAME)));
}

#[cfg(unix)]
#[test]
fn test_export_reaches_programs() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(
        dir.path(),
        "$ export GREETING=hello\n$ sh -c #\"echo \\$GREETING from sh\"#\n",
    );
    lus(dir.path())
        .assert()
        .success()
        .stdout("hello from sh\n");
}

#[cfg(unix)]
#[test]
fn test_failed_test_stops_chain() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(
        dir.path(),
        "$ test -d \"some/missing/dir\" && echo yes\n$ echo after\n",
    );
    lus(dir.path())
        .assert()
        .code(1)
        .stdout(contains("yes").not().and(contains("after").not()));
}

#[cfg(unix)]
#[test]
fn test_cd_changes_program_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("inner")).unwrap();
    fs::write(dir.path().join("inner").join("marker.txt"), "").unwrap();
    write_lusfile(dir.path(), "$ cd inner\n$ ls\n");
    lus(dir.path())
        .assert()
        .success()
        .stdout("marker.txt\n");
}

#[cfg(unix)]
#[test]
fn test_runs_from_lusfile_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    write_lusfile(dir.path(), "$ test -f lus.kdl && echo found\n");
    lus(&nested).assert().success().stdout("found\n");
}

#[cfg(unix)]
#[test]
fn test_exit_message() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), "$ exit \"something went wrong\"\n");
    lus(dir.path())
        .assert()
        .code(1)
        .stderr("something went wrong\n");
}

#[test]
fn test_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), "$ exit 42\n");
    lus(dir.path()).assert().code(42).stdout("").stderr("");
}

#[test]
fn test_listing() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(
        dir.path(),
        "// Compile everything\nbuild {\n    --release {\n        $ echo release\n    }\n    $ echo build\n}\nb {\n    $ lus build\n}\n$ echo root\n",
    );
    lus(dir.path())
        .arg("-l")
        .assert()
        .success()
        .stdout(
            "Available subcommands:\n    build [--release] # Compile everything\n    b                 # alias for `build`\n",
        );
}

#[cfg(unix)]
#[test]
fn test_flag_body() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(
        dir.path(),
        "build {\n    --release {\n        $ echo release\n    }\n    $ echo build\n}\n",
    );
    lus(dir.path())
        .args(["build", "--release"])
        .assert()
        .success()
        .stdout("release\nbuild\n");
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    lus(dir.path())
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(contains("complete -F _lus_completions lus"));
    lus(dir.path())
        .args(["--completions", "fish"])
        .assert()
        .success()
        .stdout(contains("__lus_subcommands"));
}

#[cfg(unix)]
#[test]
fn test_commands_are_echoed_without_color() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(
        dir.path(),
        "$ echo \"hello world\"\n$ set +x\n$ echo quiet\n",
    );
    lus(dir.path())
        .env_remove("LUS_PRINT_COMMANDS")
        .assert()
        .success()
        .stdout("echo 'hello world'\nhello world\nquiet\n");
}

#[cfg(unix)]
#[test]
fn test_set_x_enables_echo() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), "$ echo one\n$ set -x\n$ echo two\n");
    lus(dir.path())
        .assert()
        .success()
        .stdout("one\necho two\ntwo\n");
}

#[cfg(unix)]
#[test]
fn test_missing_program() {
    let dir = tempfile::tempdir().unwrap();
    write_lusfile(dir.path(), "$ definitely-not-a-real-program-lus\n");
    lus(dir.path())
        .assert()
        .code(1)
        .stderr(contains(
            "No such file or directory: definitely-not-a-real-program-lus",
        ));
}
