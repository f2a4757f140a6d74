use std::{fs,process};
use std::ffi::OsStr;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::{Duration,Instant};

struct Run {
	stdout: String,
	stderr: String,
	status: process::ExitStatus,
}

fn osh() -> process::Command {
	let mut cmd = process::Command::new(env!("CARGO_BIN_EXE_osh"));
	cmd.env_remove("RUST_LOG");
	cmd
}

fn run_script<S: AsRef<[u8]>>(script: S) -> Run {
	let mut child = osh()
		.stdin(process::Stdio::piped())
		.stdout(process::Stdio::piped())
		.stderr(process::Stdio::piped())
		.spawn()
		.unwrap();
	child.stdin.take().unwrap().write_all(script.as_ref()).unwrap();
	let out = child.wait_with_output().unwrap();
	Run {
		stdout: String::from_utf8(out.stdout).unwrap(),
		stderr: String::from_utf8(out.stderr).unwrap(),
		status: out.status,
	}
}

fn path_str(p: &Path) -> &str {
	p.to_str().unwrap()
}

#[test]
fn single_command() {
	let r = run_script("echo hello world\n");
	assert_eq!(r.stdout, "hello world\n");
	assert!(r.status.success());
}

#[test]
fn quoted_argument_is_one_word() {
	let r = run_script("echo \"a   b\" c\n");
	assert_eq!(r.stdout, "a   b c\n");
}

#[test]
fn pipe_matches_direct_output() {
	let direct = run_script("echo A\n");
	let piped = run_script("echo A | cat\n");
	assert_eq!(piped.stdout, direct.stdout);
	assert_eq!(piped.stdout, "A\n");
}

#[test]
fn long_pipeline_terminates() {
	let r = run_script("echo x | cat | cat | cat | cat\n");
	assert_eq!(r.stdout, "x\n");
}

#[test]
fn three_stages() {
	let r = run_script("printf \"b\\na\\nc\\n\" | sort | head -n 2\n");
	assert_eq!(r.stdout, "a\nb\n");
}

#[test]
fn redirects_in_and_out() {
	let dir = tempfile::tempdir().unwrap();
	let out = dir.path().join("out.txt");
	let script = format!("echo hi > {0}\ncat < {0} | tr a-z A-Z\n", path_str(&out));
	let r = run_script(&script);
	assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
	assert_eq!(r.stdout, "HI\n");
}

#[test]
fn output_redirect_truncates() {
	let dir = tempfile::tempdir().unwrap();
	let out = dir.path().join("out.txt");
	fs::write(&out, "previous contents that are long\n").unwrap();
	run_script(&format!("echo new > {}\n", path_str(&out)));
	assert_eq!(fs::read_to_string(&out).unwrap(), "new\n");
}

#[test]
fn redirect_overrides_pipe() {
	let dir = tempfile::tempdir().unwrap();
	let out = dir.path().join("mid.txt");
	let r = run_script(&format!("echo mid > {} | cat\n", path_str(&out)));
	assert_eq!(r.stdout, "");
	assert_eq!(fs::read_to_string(&out).unwrap(), "mid\n");
}

#[test]
fn missing_redirect_target() {
	let r = run_script("cat <\necho still here\n");
	assert!(r.stderr.contains("missing file name after '<'"), "{}", r.stderr);
	assert_eq!(r.stdout, "still here\n");
}

#[test]
fn unopenable_redirect_target() {
	let r = run_script("cat < /nonexistent/osh/input\n");
	assert!(r.stderr.contains("cannot open file"), "{}", r.stderr);
	assert!(!r.stderr.contains("command not found"), "{}", r.stderr);
}

#[test]
fn command_not_found() {
	let r = run_script("osh-no-such-program-1\n");
	assert!(r.stderr.contains("command not found: osh-no-such-program-1"), "{}", r.stderr);
}

#[test]
fn command_not_found_in_pipeline() {
	let r = run_script("osh-no-such-program-1 | osh-no-such-program-2 | cat\n");
	assert!(r.stderr.contains("command not found: osh-no-such-program-1"), "{}", r.stderr);
	assert!(r.stderr.contains("command not found: osh-no-such-program-2"), "{}", r.stderr);
	assert!(!r.stderr.contains("command not found: cat"), "{}", r.stderr);
}

#[test]
fn program_exiting_127_is_not_missing() {
	let r = run_script("sh -c \"exit 127\"\nsh -c \"exit 127\" | cat\n");
	assert!(!r.stderr.contains("command not found"), "{}", r.stderr);
}

#[test]
fn programs_die_quietly_on_closed_pipe() {
	let r = run_script("yes | head -n 1\n");
	assert_eq!(r.stdout, "y\n");
	assert_eq!(r.stderr, "");
}

#[test]
fn non_utf8_file_names() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join(OsStr::from_bytes(b"in\xff.txt"));
	let output = dir.path().join(OsStr::from_bytes(b"out\xfe.txt"));
	fs::write(&input, "raw\n").unwrap();

	let mut script = b"cat < ".to_vec();
	script.extend_from_slice(input.as_os_str().as_bytes());
	script.extend_from_slice(b" | tr a-z A-Z > ");
	script.extend_from_slice(output.as_os_str().as_bytes());
	script.push(b'\n');
	let r = run_script(&script);
	assert_eq!(r.stderr, "");
	assert_eq!(fs::read_to_string(&output).unwrap(), "RAW\n");
}

#[test]
fn closed_stdout_is_an_error_not_a_crash() {
	let dir = tempfile::tempdir().unwrap();
	let after = dir.path().join("after.txt");
	let (read, write) = nix::unistd::pipe().unwrap();
	drop(read);
	let out = osh()
		.args(&["-c", "!!", "-c", &format!("echo after > {}", path_str(&after))])
		.stdout(process::Stdio::from(write))
		.output()
		.unwrap();
	let stderr = String::from_utf8(out.stderr).unwrap();
	assert!(out.status.success(), "{}", stderr);
	assert!(!stderr.contains("panicked"), "{}", stderr);
	assert_eq!(fs::read_to_string(&after).unwrap(), "after\n");
}

#[test]
fn empty_stage_is_a_syntax_error() {
	let r = run_script("echo a | | cat\n");
	assert!(r.stderr.contains("empty command"), "{}", r.stderr);
	assert_eq!(r.stdout, "");
}

#[test]
fn history_keeps_last_ten() {
	let mut script = String::new();
	for i in 1 ..= 12 {
		script.push_str(&format!("true c{}\n", i));
	}
	script.push_str("history\n");
	let r = run_script(&script);
	let expected: String = (1 ..= 10).map(|n| format!("{} true c{}\n", n, 13 - n)).collect();
	assert_eq!(r.stdout, expected);
}

#[test]
fn repeat_runs_last_command() {
	let r = run_script("echo x\n!!\nhistory\n");
	assert_eq!(r.stdout, "x\nx\n1 echo x\n2 echo x\n");
}

#[test]
fn repeat_with_empty_history() {
	let r = run_script("!!\nhistory\n");
	assert_eq!(r.stdout, "No commands in history\nNo commands in history\n");
}

#[test]
fn exit_stops_reading() {
	let r = run_script("echo one\nexit\necho two\n");
	assert_eq!(r.stdout, "one\n");
	assert!(r.status.success());
}

#[test]
fn command_flag() {
	let out = osh().args(&["-c", "echo hi | cat", "-c", "exit", "-c", "echo no"]).output().unwrap();
	assert_eq!(String::from_utf8(out.stdout).unwrap(), "hi\n");
	assert!(out.status.success());
}

#[test]
fn background_does_not_block() {
	let dir = tempfile::tempdir().unwrap();
	let out = dir.path().join("after.txt");
	let mut child = osh()
		.stdin(process::Stdio::piped())
		.stdout(process::Stdio::null())
		.stderr(process::Stdio::null())
		.spawn()
		.unwrap();
	let start = Instant::now();
	{
		let mut stdin = child.stdin.take().unwrap();
		writeln!(stdin, "sleep 20 &").unwrap();
		writeln!(stdin, "echo after > {}", path_str(&out)).unwrap();
	}
	let status = child.wait().unwrap();
	assert!(status.success());
	assert!(start.elapsed() < Duration::from_secs(10));
	assert_eq!(fs::read_to_string(&out).unwrap(), "after\n");
}

#[test]
fn overlong_line_is_rejected() {
	let out = osh().args(&["--max-line", "8", "-c", "echo 0123456789"]).output().unwrap();
	assert_eq!(out.stdout, b"");
	let stderr = String::from_utf8(out.stderr).unwrap();
	assert!(stderr.contains("longer than 8 bytes"), "{}", stderr);
}
