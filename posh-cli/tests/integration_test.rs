// This file is part of posh, a job-control POSIX shell.
// Copyright (C) 2026 The posh authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Tests that run the `posh` binary

use std::io::{Seek as _, Write as _};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};
use tempfile::{TempDir, tempdir, tempfile};

const BIN: &str = env!("CARGO_BIN_EXE_posh");

fn subject() -> Command {
    let mut command = Command::new(BIN);
    command.env_clear();
    command.env("PATH", std::env::var_os("PATH").unwrap());
    command.stdin(Stdio::null());
    command
}

fn file_with_content(content: &[u8]) -> std::fs::File {
    let mut file = tempfile().unwrap();
    file.write_all(content).unwrap();
    file.rewind().unwrap();
    file
}

fn run_command_string(command: &str) -> Output {
    subject().arg("-c").arg(command).output().unwrap()
}

fn stdout(output: &Output) -> &str {
    std::str::from_utf8(&output.stdout).unwrap()
}

fn stderr(output: &Output) -> &str {
    std::str::from_utf8(&output.stderr).unwrap()
}

#[test]
fn command_string_runs_external_utility() {
    let output = run_command_string("echo hello world");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "hello world\n");
    assert_eq!(stderr(&output), "");
}

#[test]
fn command_string_name_and_positional_parameters() {
    let output = subject()
        .args(["-c", "echo $0 $1 $2 $#", "name", "a", "b"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "name a b 2\n");
}

#[test]
fn exit_with_operand() {
    let output = run_command_string("exit 7; echo not reached");
    assert_eq!(output.status.code(), Some(7));
    assert_eq!(stdout(&output), "");
}

#[test]
fn exit_status_of_last_command() {
    let output = run_command_string("true; false");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn missing_command_string_is_usage_error() {
    let output = subject().arg("-c").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("missing command string"), "{output:?}");
}

#[test]
fn unknown_option_is_usage_error() {
    let output = subject().args(["-x", "-c", "echo"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout(&output), "");

    let output = subject().args(["+e", "-c", "echo"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn command_not_found() {
    let output = run_command_string("no_such_command_for_posh_test; echo $?");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "127\n");
    assert!(
        stderr(&output).contains("no_such_command_for_posh_test: command not found"),
        "{output:?}"
    );
}

#[test]
fn command_not_executable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data");
    std::fs::write(&path, "data").unwrap();
    let output = subject()
        .arg("-c")
        .arg(format!("{}; echo $?", path.display()))
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "126\n");
}

#[test]
fn syntax_error_in_non_interactive_shell() {
    let output = run_command_string("echo 'unclosed");
    assert_eq!(output.status.code(), Some(255));
    assert!(stderr(&output).contains("syntax error"), "{output:?}");

    let output = run_command_string("echo a; | echo b");
    assert_eq!(output.status.code(), Some(255));
    assert_eq!(stdout(&output), "");
}

#[test]
fn and_or_lists() {
    let output = run_command_string("false && echo X");
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");

    let output = run_command_string("true || echo X");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");

    let output = run_command_string("false || echo Y && echo Z");
    assert_eq!(stdout(&output), "Y\nZ\n");

    let output = run_command_string("false && echo A || echo B; echo C");
    assert_eq!(stdout(&output), "C\n");
}

#[test]
fn pipeline_status_is_last_command() {
    let output = run_command_string("false | true");
    assert_eq!(output.status.code(), Some(0));

    let output = run_command_string("true | false");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn pipeline_connects_commands() {
    let output = run_command_string("echo piped | cat | cat");
    assert_eq!(stdout(&output), "piped\n");
}

#[test]
fn field_splitting_and_quoting() {
    let output = run_command_string(r#"VAR="a  b"; printf '[%s]\n' $VAR "$VAR""#);
    assert_eq!(stdout(&output), "[a]\n[b]\n[a  b]\n");
}

#[test]
fn unmatched_glob_stays_literal() {
    let dir = tempdir().unwrap();
    let output = subject()
        .current_dir(dir.path())
        .args(["-c", "echo nomatch*xyz"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "nomatch*xyz\n");
}

fn dir_with_files(names: &[&str]) -> TempDir {
    let dir = tempdir().unwrap();
    for name in names {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    dir
}

#[test]
fn glob_expands_to_sorted_pathnames() {
    let dir = dir_with_files(&["b1", "a1", ".a2"]);
    let output = subject()
        .current_dir(dir.path())
        .args(["-c", "echo *"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "a1 b1\n");
}

#[test]
fn ambiguous_redirect_does_not_run_command() {
    let dir = dir_with_files(&["file1", "file2"]);
    let output = subject()
        .current_dir(dir.path())
        .args(["-c", "echo X > file*; echo $?"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "2\n");
    assert!(stderr(&output).contains("ambiguous redirect"), "{output:?}");
    assert_eq!(std::fs::read_to_string(dir.path().join("file1")).unwrap(), "");
    assert_eq!(std::fs::read_to_string(dir.path().join("file2")).unwrap(), "");
}

#[test]
fn assignment_only_command() {
    let output = run_command_string("X=1; echo $X $?");
    assert_eq!(stdout(&output), "1 0\n");
}

#[test]
fn assignments_take_effect_from_left_to_right() {
    let output = run_command_string("A=1 B=$A; echo $B");
    assert_eq!(stdout(&output), "1\n");

    let output = run_command_string("C=x D=${C}y printenv D");
    assert_eq!(stdout(&output), "xy\n");
}

#[test]
fn assignment_for_external_command_is_temporary() {
    let output = run_command_string("Y=2 printenv Y; printenv Y; echo $? ${Y}.");
    assert_eq!(stdout(&output), "2\n1 .\n");
}

#[test]
fn exported_variable_is_passed_to_child() {
    let output = run_command_string("X=1; printenv X; echo $?; export X; printenv X");
    assert_eq!(stdout(&output), "1\n1\n");
}

#[test]
fn unset_and_clearenv() {
    let output = run_command_string("A=1 B=2; unset A; echo ${A}-$B; clearenv; exit ${B}9");
    assert_eq!(output.status.code(), Some(9));
    assert_eq!(stdout(&output), "-2\n");
}

#[test]
fn cd_updates_pwd() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
    let root = dir.path().canonicalize().unwrap();
    let output = subject()
        .args(["-c", r#"cd "$1/a/b/.."; echo "$PWD"; cd ..; echo "$OLDPWD""#, "posh"])
        .arg(&root)
        .output()
        .unwrap();
    let expected = format!("{0}/a\n{0}/a\n", root.display());
    assert_eq!(stdout(&output), expected);
}

#[test]
fn exec_with_redirection_persists() {
    let dir = tempdir().unwrap();
    let output = subject()
        .current_dir(dir.path())
        .args(["-c", "exec > out; echo one; echo two"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");
    let content = std::fs::read_to_string(dir.path().join("out")).unwrap();
    assert_eq!(content, "one\ntwo\n");
}

#[test]
fn exec_replaces_shell() {
    let output = run_command_string("exec echo replaced; echo not reached");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "replaced\n");
}

#[test]
fn background_command_does_not_block() {
    let start = Instant::now();
    let output = run_command_string("sleep 5 >/dev/null 2>&1 & echo started");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "started\n");
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[test]
fn pipeline_waits_for_last_stage_only() {
    let start = Instant::now();
    let output = run_command_string("sleep 5 2>/dev/null | true; echo done");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "done\n");
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[test]
fn errexit_stops_at_failure() {
    let output = subject().args(["-ec", "echo a; false; echo b"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "a\n");
}

#[test]
fn errexit_ignores_left_side_of_and_or() {
    let output = subject()
        .args(["-e", "-c", "false && true; echo reached"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "reached\n");
}

#[test]
fn script_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("script.sh");
    std::fs::write(&path, "echo \"$0\" $1\nexit 3\n").unwrap();
    let output = subject().arg(&path).arg("arg").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stdout(&output), format!("{} arg\n", path.display()));
}

#[test]
fn missing_script_file() {
    let output = subject().arg("/no/such/posh/script").output().unwrap();
    assert_eq!(output.status.code(), Some(127));
    assert!(stderr(&output).contains("cannot open script file"), "{output:?}");
}

#[test]
fn commands_from_standard_input() {
    let input = file_with_content(b"echo first\necho 'multi\nline'\nexit 4\necho not reached\n");
    let output = subject().stdin(input).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert_eq!(stdout(&output), "first\nmulti\nline\n");
}

#[test]
fn standard_input_with_positional_parameters() {
    let input = file_with_content(b"echo $1 $2\n");
    let output = subject().args(["-s", "x", "y"]).stdin(input).output().unwrap();
    assert_eq!(stdout(&output), "x y\n");
}

#[test]
fn shlvl_is_incremented() {
    let output = run_command_string("echo $SHLVL; printenv SHLVL");
    assert_eq!(stdout(&output), "1\n1\n");

    let output = subject()
        .env("SHLVL", "3")
        .args(["-c", "echo $SHLVL"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "4\n");
}

#[test]
fn redirections_of_builtin_are_undone() {
    let dir = tempdir().unwrap();
    let output = subject()
        .current_dir(dir.path())
        .args(["-c", "export X=1 > out; echo visible"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "visible\n");
    assert!(dir.path().join("out").exists());
}

#[test]
fn fd_duplication() {
    let output = run_command_string("echo to_stderr 1>&2");
    assert_eq!(stdout(&output), "");
    assert_eq!(stderr(&output), "to_stderr\n");
}
