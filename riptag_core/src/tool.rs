/*!
# Rip & Tag: External Tools
*/

use crate::{
	KillSwitch,
	RipTagError,
};
use crossbeam::channel::{
	Receiver,
	RecvTimeoutError,
	Sender,
};
use std::{
	ffi::{
		OsStr,
		OsString,
	},
	io::Read,
	path::{
		Path,
		PathBuf,
	},
	process::{
		Child,
		Command,
		ExitStatus,
		Stdio,
	},
	time::{
		Duration,
		Instant,
	},
};



/// # Tick.
///
/// How often a running tool checks in on the kill switch and deadline.
const TICK: Duration = Duration::from_millis(50);

/// # Diagnostic Tail.
///
/// The number of trailing diagnostic lines to include in failure messages.
const TAIL: usize = 3;



#[derive(Debug, Clone)]
/// # Tool Command.
///
/// A program and its arguments, ready to be spawned.
pub(crate) struct ToolCommand {
	program: PathBuf,
	args: Vec<OsString>,
}

impl ToolCommand {
	/// # New.
	pub(crate) fn new(program: &Path) -> Self {
		Self {
			program: program.to_path_buf(),
			args: Vec::new(),
		}
	}

	#[must_use]
	/// # With Argument.
	pub(crate) fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
		self.args.push(arg.as_ref().to_os_string());
		self
	}

	#[must_use]
	/// # With Arguments.
	pub(crate) fn args<I, S>(mut self, args: I) -> Self
	where I: IntoIterator<Item=S>, S: AsRef<OsStr> {
		for arg in args { self.args.push(arg.as_ref().to_os_string()); }
		self
	}

	/// # Program Name.
	///
	/// Return the file name of the program, for messages.
	pub(crate) fn name(&self) -> String {
		self.program.file_name()
			.unwrap_or(self.program.as_os_str())
			.to_string_lossy()
			.into_owned()
	}

	/// # Command Line.
	///
	/// Return the full command as a (lossy) string, for the logs.
	pub(crate) fn command_line(&self) -> String {
		let mut out = self.program.to_string_lossy().into_owned();
		for arg in &self.args {
			let arg = arg.to_string_lossy();
			out.push(' ');
			if arg.is_empty() || arg.contains(char::is_whitespace) {
				out.push('"');
				out.push_str(&arg);
				out.push('"');
			}
			else { out.push_str(&arg); }
		}
		out
	}

	/// # Spawn.
	///
	/// Start the program with both output streams captured. The returned
	/// [`ToolRun`] yields its diagnostic lines as they arrive.
	///
	/// ## Errors
	///
	/// Returns an error if the program could not be started.
	pub(crate) fn spawn<'a>(&self, timeout: Duration, killed: &'a KillSwitch)
	-> Result<ToolRun<'a>, RipTagError> {
		let name = self.name();
		let mut child = Command::new(&self.program)
			.args(&self.args)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.spawn()
			.map_err(|e| RipTagError::Subprocess {
				program: name.clone(),
				code: None,
				detail: e.to_string(),
			})?;

		// The reader threads own the only senders, so the line channel
		// disconnects once both pipes have closed.
		let (tx, rx) = crossbeam::channel::unbounded();
		if let Some(out) = child.stdout.take() { pump(out, tx.clone()); }
		if let Some(err) = child.stderr.take() { pump(err, tx); }

		Ok(ToolRun {
			name,
			child: Some(child),
			lines: rx,
			deadline: Instant::now() + timeout,
			killed,
			diagnostics: Vec::new(),
			failure: None,
		})
	}
}



#[derive(Debug)]
/// # Running Tool.
///
/// This wraps a running child process. As an iterator, it yields each
/// diagnostic line (from either stream) as it arrives, while keeping an eye
/// on the kill switch and the deadline; either of those will stop the child
/// and end iteration early.
///
/// Call [`ToolRun::finish`] at the end to find out how things went.
///
/// The child is killed and reaped on drop if it is somehow still running.
pub(crate) struct ToolRun<'a> {
	name: String,
	child: Option<Child>,
	lines: Receiver<String>,
	deadline: Instant,
	killed: &'a KillSwitch,
	diagnostics: Vec<String>,
	failure: Option<RipTagError>,
}

impl Drop for ToolRun<'_> {
	fn drop(&mut self) { self.reap(); }
}

impl Iterator for ToolRun<'_> {
	type Item = String;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failure.is_some() { return None; }
		loop {
			if let Err(e) = self.check() {
				self.abort(e);
				return None;
			}

			match self.lines.recv_timeout(TICK) {
				Ok(line) => {
					self.diagnostics.push(line.clone());
					return Some(line);
				},
				Err(RecvTimeoutError::Timeout) => {},
				Err(RecvTimeoutError::Disconnected) => return None,
			}
		}
	}
}

impl ToolRun<'_> {
	/// # Finish.
	///
	/// Drain any remaining output, wait for the child to exit, and return
	/// everything it had to say.
	///
	/// ## Errors
	///
	/// Returns an error if the run was aborted, timed out, or exited with
	/// anything other than zero.
	pub(crate) fn finish(mut self) -> Result<Vec<String>, RipTagError> {
		for _ in self.by_ref() {}
		if let Some(e) = self.failure.take() { return Err(e); }

		let status = self.wait()?;
		if status.success() { Ok(std::mem::take(&mut self.diagnostics)) }
		else {
			let start = self.diagnostics.len().saturating_sub(TAIL);
			Err(RipTagError::Subprocess {
				program: self.name.clone(),
				code: status.code(),
				detail: self.diagnostics[start..].join(" / "),
			})
		}
	}

	/// # Check Kill Switch and Deadline.
	fn check(&self) -> Result<(), RipTagError> {
		if self.killed.killed() { Err(RipTagError::Killed) }
		else if self.deadline <= Instant::now() {
			Err(RipTagError::SubprocessTimeout(self.name.clone()))
		}
		else { Ok(()) }
	}

	/// # Wait.
	fn wait(&mut self) -> Result<ExitStatus, RipTagError> {
		loop {
			let res = match self.child.as_mut() {
				Some(child) => child.try_wait(),
				None => return Err(RipTagError::Bug("tool reaped twice")),
			};

			match res {
				Ok(Some(status)) => {
					self.child = None;
					return Ok(status);
				},
				Ok(None) => {},
				Err(e) => {
					let err = RipTagError::Subprocess {
						program: self.name.clone(),
						code: None,
						detail: e.to_string(),
					};
					self.abort(err.clone());
					return Err(err);
				},
			}

			if let Err(e) = self.check() {
				self.abort(e.clone());
				return Err(e);
			}
			std::thread::sleep(TICK);
		}
	}

	/// # Abort.
	///
	/// Kill the child and remember why.
	fn abort(&mut self, err: RipTagError) {
		self.reap();
		if self.failure.is_none() { self.failure = Some(err); }
	}

	/// # Kill and Reap.
	fn reap(&mut self) {
		if let Some(mut child) = self.child.take() {
			let _res = child.kill();
			let _res = child.wait();
		}
	}
}



/// # Pump Output.
///
/// Read the stream on a background thread, sending each non-empty line
/// along. Lines are split on newlines, carriage returns, and backspaces, the
/// latter two being how flac and lame redraw their progress in place.
///
/// The thread ends when the stream closes; nothing waits on it.
fn pump<R: Read + Send + 'static>(mut src: R, tx: Sender<String>) {
	let _res = std::thread::Builder::new()
		.name("riptag-pipe".to_owned())
		.spawn(move || {
			let mut buf = [0_u8; 4096];
			let mut line = Vec::new();
			while let Ok(len @ 1..) = src.read(&mut buf) {
				for &b in &buf[..len] {
					if matches!(b, b'\n' | b'\r' | 0x08) { flush_line(&mut line, &tx); }
					else { line.push(b); }
				}
			}
			flush_line(&mut line, &tx);
		});
}

/// # Flush Line.
fn flush_line(line: &mut Vec<u8>, tx: &Sender<String>) {
	let txt = String::from_utf8_lossy(line);
	let txt = txt.trim();
	if ! txt.is_empty() { let _res = tx.send(txt.to_owned()); }
	line.clear();
}



#[cfg(all(test, unix))]
mod test {
	use super::*;

	/// # Shell Command.
	fn sh(script: &str) -> ToolCommand {
		ToolCommand::new(Path::new("/bin/sh")).arg("-c").arg(script)
	}

	#[test]
	fn t_lines() {
		let killed = KillSwitch::default();
		let run = sh(r"printf 'one\n two \rthree\b\bfour\n\n' >&2")
			.spawn(Duration::from_secs(30), &killed)
			.expect("Spawn failed.");
		let lines = run.finish().expect("Run failed.");
		assert_eq!(lines, ["one", "two", "three", "four"]);
	}

	#[test]
	fn t_exit_code() {
		let killed = KillSwitch::default();
		let run = sh("echo 'ERROR: oh no' >&2; exit 3")
			.spawn(Duration::from_secs(30), &killed)
			.expect("Spawn failed.");
		assert_eq!(
			run.finish(),
			Err(RipTagError::Subprocess {
				program: "sh".to_owned(),
				code: Some(3),
				detail: "ERROR: oh no".to_owned(),
			}),
		);
	}

	#[test]
	fn t_missing() {
		let killed = KillSwitch::default();
		let res = ToolCommand::new(Path::new("/no/such/riptag-tool"))
			.spawn(Duration::from_secs(30), &killed);
		assert!(matches!(res, Err(RipTagError::Subprocess { code: None, .. })));
	}

	#[test]
	fn t_timeout() {
		let killed = KillSwitch::default();
		let now = Instant::now();
		let run = sh("exec sleep 30")
			.spawn(Duration::from_millis(200), &killed)
			.expect("Spawn failed.");
		assert_eq!(run.finish(), Err(RipTagError::SubprocessTimeout("sh".to_owned())));
		assert!(now.elapsed() < Duration::from_secs(10), "Timeout took too long.");
	}

	#[test]
	fn t_killed() {
		let killed = KillSwitch::default();
		let mut run = sh("echo started; exec sleep 30")
			.spawn(Duration::from_secs(60), &killed)
			.expect("Spawn failed.");
		assert_eq!(run.next().as_deref(), Some("started"));

		let now = Instant::now();
		killed.kill();
		assert_eq!(run.next(), None);
		assert_eq!(run.finish(), Err(RipTagError::Killed));
		assert!(now.elapsed() < Duration::from_secs(10), "Kill took too long.");
	}

	#[test]
	fn t_command_line() {
		let cmd = ToolCommand::new(Path::new("/usr/bin/flac"))
			.args(["--force", "--tag=TITLE=Hello World"]);
		assert_eq!(cmd.name(), "flac");
		assert_eq!(
			cmd.command_line(),
			r#"/usr/bin/flac --force "--tag=TITLE=Hello World""#,
		);
	}
}
