use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

/// Echoes its input followed by a newline.
pub const ECHO: &str = r#"n=$(cat); printf '%s\n' "$n""#;
/// Ignores its input and prints `42` with no newline.
pub const CONST_42: &str = "cat > /dev/null; printf 42";
/// Echoes its input, except for 5 where it prints nothing.
pub const SILENT_ON_5: &str = r#"n=$(cat); [ "$n" = 5 ] || printf '%s\n' "$n""#;
/// Echoes its input, except for 5 where it prints `-` like the real interpreter.
pub const DASH_ON_5: &str = r#"n=$(cat); if [ "$n" = 5 ]; then echo -; else echo "$n"; fi"#;
/// Echoes its input with a trailing space.
pub const TRAILING_SPACE: &str = r#"n=$(cat); printf '%s \n' "$n""#;
/// Exits without reading its input.
pub const NO_READ: &str = "echo 1";
/// Evaluates the expression selected with `-e`.
pub const ARITH: &str = r#"n=$(cat)
case "$3" in
    double) echo $((n * 2)) ;;
    succ) echo $((n + 1)) ;;
    *) echo - ;;
esac"#;

// Writing a script and then executing it races with forks from other test
// threads (ETXTBSY), so every run holds this lock.
static LOCK: Mutex<()> = Mutex::new(());

pub struct Outcome {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Arguments of every interpreter invocation, one line per call.
    pub calls: Vec<String>,
}

pub fn test_file(name: &str) -> PathBuf {
    Path::new("tests").join("files").join(name)
}

fn write_fake(dir: &Path, body: &str) -> PathBuf {
    let exe = dir.join("una");
    let calls = dir.join("calls");
    let script = format!("#!/bin/sh\necho \"$@\" >> '{}'\n{}\n", calls.display(), body);
    fs::write(&exe, script).unwrap();
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
    exe
}

fn annotest(exe: &Path, test: &Path, args: &[&str]) -> Outcome {
    let output = Command::new(env!("CARGO_BIN_EXE_annotest"))
        .arg("--exe")
        .arg(exe)
        .arg("--test")
        .arg(test)
        .args(args)
        .output()
        .expect("could not run annotest");

    let calls = exe
        .parent()
        .map(|dir| dir.join("calls"))
        .and_then(|path| fs::read_to_string(path).ok())
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default();

    Outcome {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        calls,
    }
}

pub fn run_with_exe(exe: &Path, test: &Path, args: &[&str]) -> Outcome {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    annotest(exe, test, args)
}

pub fn run(file: &str, fake: &str, args: &[&str]) -> Outcome {
    let _guard = LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let exe = write_fake(dir.path(), fake);
    annotest(&exe, &test_file(file), args)
}

pub fn assert_report(outcome: &Outcome, expected: &[&str]) {
    let actual: Vec<&str> = outcome.stdout.lines().collect();
    if actual != expected {
        let expected = expected.join("\n");
        let actual = actual.join("\n");
        println!("{}", prettydiff::diff_lines(&expected, &actual));
        panic!(
            "report mismatch\nexpected:\n{}\nactual:\n{}\nstderr:\n{}",
            expected, actual, outcome.stderr
        );
    }
}

pub fn run_pass_test(file: &str, fake: &str, args: &[&str], expected: &[&str]) {
    let outcome = run(file, fake, args);
    assert_report(&outcome, expected);
    assert_eq!(outcome.code, Some(0), "stderr: {}", outcome.stderr);
}

pub fn run_fail_test(file: &str, fake: &str, args: &[&str], expected: &[&str]) {
    let outcome = run(file, fake, args);
    assert_report(&outcome, expected);
    assert_eq!(outcome.code, Some(1), "stderr: {}", outcome.stderr);
}

macro_rules! pass_tests {
    ($(
        {
            name: $name:ident,
            file: $file:literal,
            interpreter: $fake:expr,
            $(args: [$($arg:literal),* $(,)?],)?
            expected: [$($line:literal),* $(,)?] $(,)?
        }
    ),* $(,)?) => {
        $(
        #[test]
        fn $name() {
            $crate::infra::run_pass_test($file, $fake, &[$($($arg),*)?], &[$($line),*]);
        }
        )*
    };
}

macro_rules! fail_tests {
    ($(
        {
            name: $name:ident,
            file: $file:literal,
            interpreter: $fake:expr,
            $(args: [$($arg:literal),* $(,)?],)?
            expected: [$($line:literal),* $(,)?] $(,)?
        }
    ),* $(,)?) => {
        $(
        #[test]
        fn $name() {
            $crate::infra::run_fail_test($file, $fake, &[$($($arg),*)?], &[$($line),*]);
        }
        )*
    };
}
