/*!
# Rip & Tag: Encoding Options
*/

use crate::RipTagError;
use std::{
	path::{
		Path,
		PathBuf,
	},
	time::Duration,
};



/// # FLAG: Verbose.
const FLAG_VERBOSE: u8 = 0b0000_0001;

/// # FLAG: Create Destination Directories.
const FLAG_MKDIR: u8 =   0b0000_0010;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = FLAG_MKDIR;

/// # Default FLAC Options.
pub(crate) const DEFAULT_FLAC_OPTIONS: &str = "--force --keep-foreign-metadata --verify";

/// # Default FLAC Decode Options.
pub(crate) const DEFAULT_FLAC_DECODE_OPTIONS: &str = "--force";

/// # Default LAME Options.
pub(crate) const DEFAULT_LAME_OPTIONS: &str = "--clipdetect -q 2 -V2 -b 224";

/// # Maximum Concurrency.
const JOBS_MAX: u8 = 32;

/// # Default Concurrency Ceiling.
const JOBS_AUTO_MAX: u8 = 4;

/// # Maximum Retries.
const RETRIES_MAX: u8 = 16;

/// # Default Retries.
const RETRIES_DEFAULT: u8 = 5;

/// # Maximum Timeout (Seconds).
const TIMEOUT_MAX: u32 = 86_400;

/// # Default Timeout (Seconds).
const TIMEOUT_DEFAULT: u32 = 1_800;

/// # Minimum Poll Interval (Milliseconds).
const POLL_MIN: u16 = 10;

/// # Maximum Poll Interval (Milliseconds).
const POLL_MAX: u16 = 5_000;

/// # Default Poll Interval (Milliseconds).
const POLL_DEFAULT: u16 = 625;



#[derive(Debug, Clone)]
/// # Encode Options.
///
/// This struct holds the encoder programs and their settings, along with the
/// various knobs controlling the worker pool.
///
/// Options are set using builder-style methods, like:
///
/// ```
/// use riptag_core::EncodeOptions;
///
/// let opts = EncodeOptions::default()
///     .with_concurrency(2)
///     .with_retries(100) // Too big; will be capped.
///     .with_lame_options("-V0");
///
/// assert_eq!(opts.concurrency(), 2);
/// assert_eq!(opts.retries(), 16);
/// assert_eq!(opts.lame_options(), &["-V0"]);
/// ```
pub struct EncodeOptions {
	flac: PathBuf,
	flac_options: Vec<String>,
	flac_decode_options: Vec<String>,
	lame: PathBuf,
	lame_options: Vec<String>,
	scratch: Option<PathBuf>,
	concurrency: u8,
	retries: u8,
	timeout: u32,
	poll: u16,
	flags: u8,
}

impl Default for EncodeOptions {
	fn default() -> Self {
		let concurrency = std::thread::available_parallelism()
			.ok()
			.and_then(|n| u8::try_from(n.get()).ok())
			.map_or(JOBS_AUTO_MAX, |n| n.min(JOBS_AUTO_MAX));

		Self {
			flac: PathBuf::from("flac"),
			flac_options: tokenize(DEFAULT_FLAC_OPTIONS),
			flac_decode_options: tokenize(DEFAULT_FLAC_DECODE_OPTIONS),
			lame: PathBuf::from("lame"),
			lame_options: tokenize(DEFAULT_LAME_OPTIONS),
			scratch: None,
			concurrency,
			retries: RETRIES_DEFAULT,
			timeout: TIMEOUT_DEFAULT,
			poll: POLL_DEFAULT,
			flags: FLAG_DEFAULT,
		}
	}
}

macro_rules! with_flag {
	($fn:ident, $flag:ident, $($doc:literal),+ $(,)?) => (
		#[must_use]
		$(
			#[doc = $doc]
		)+
		pub fn $fn(self, v: bool) -> Self {
			let flags =
				if v { self.flags | $flag }
				else { self.flags & ! $flag };

			Self {
				flags,
				..self
			}
		}
	)
}

/// ## Setters.
impl EncodeOptions {
	#[must_use]
	/// # Concurrency.
	///
	/// The maximum number of tracks to work on at once. Each track only ever
	/// has one encoder running at a time, so this is also the maximum number
	/// of simultaneous subprocesses.
	///
	/// Values are capped to `1..=32`. The default is the machine's available
	/// parallelism, up to `4`.
	pub fn with_concurrency(self, concurrency: u8) -> Self {
		Self {
			concurrency: concurrency.clamp(1, JOBS_MAX),
			..self
		}
	}

	#[must_use]
	/// # FLAC Program.
	///
	/// A bare name is searched for in `PATH`; anything else is used as-is.
	///
	/// The default is `flac`.
	pub fn with_flac_program<P: Into<PathBuf>>(self, flac: P) -> Self {
		Self {
			flac: flac.into(),
			..self
		}
	}

	#[must_use]
	/// # FLAC Encoding Options.
	///
	/// Whitespace-separated options to pass to `flac` when encoding. Tag and
	/// destination arguments are added separately.
	pub fn with_flac_options(self, src: &str) -> Self {
		Self {
			flac_options: tokenize(src),
			..self
		}
	}

	#[must_use]
	/// # FLAC Decoding Options.
	///
	/// Whitespace-separated options to pass to `flac` when decoding.
	pub fn with_flac_decode_options(self, src: &str) -> Self {
		Self {
			flac_decode_options: tokenize(src),
			..self
		}
	}

	#[must_use]
	/// # LAME Program.
	///
	/// A bare name is searched for in `PATH`; anything else is used as-is.
	///
	/// The default is `lame`.
	pub fn with_lame_program<P: Into<PathBuf>>(self, lame: P) -> Self {
		Self {
			lame: lame.into(),
			..self
		}
	}

	#[must_use]
	/// # LAME Options.
	///
	/// Whitespace-separated options to pass to `lame`. Note that clipping can
	/// only be detected when `--clipdetect` is among them.
	pub fn with_lame_options(self, src: &str) -> Self {
		Self {
			lame_options: tokenize(src),
			..self
		}
	}

	with_flag!(
		with_mkdir,
		FLAG_MKDIR,
		"# Create Directories.",
		"",
		"When `true`, missing destination directories are created as needed.",
		"",
		"The default is `true`.",
	);

	#[must_use]
	/// # Poll Interval.
	///
	/// The longest [`EncodingSession::poll`](crate::EncodingSession::poll)
	/// will wait for news, in milliseconds.
	///
	/// Values are capped to `10..=5000`, with a default of `625`.
	pub fn with_poll_interval(self, poll: u16) -> Self {
		Self {
			poll: poll.clamp(POLL_MIN, POLL_MAX),
			..self
		}
	}

	#[must_use]
	/// # Retry Ceiling.
	///
	/// The maximum number of times an MP3 will be re-encoded at a lower gain
	/// when lame reports clipping.
	///
	/// Values are capped to `0..=16`, with a default of `5`.
	pub fn with_retries(self, retries: u8) -> Self {
		Self {
			retries: retries.min(RETRIES_MAX),
			..self
		}
	}

	#[must_use]
	/// # Scratch Directory.
	///
	/// Where to put the temporary WAV files. The default is the system's
	/// temporary directory.
	pub fn with_scratch_dir<P: Into<PathBuf>>(self, scratch: P) -> Self {
		Self {
			scratch: Some(scratch.into()),
			..self
		}
	}

	#[must_use]
	/// # Subprocess Timeout.
	///
	/// Any single flac or lame run taking longer than this many seconds is
	/// killed and treated as a failure.
	///
	/// Values are capped to `1..=86_400`, with a default of `1_800`.
	pub fn with_timeout(self, timeout: u32) -> Self {
		Self {
			timeout: timeout.clamp(1, TIMEOUT_MAX),
			..self
		}
	}

	with_flag!(
		with_verbose,
		FLAG_VERBOSE,
		"# Verbose.",
		"",
		"When `true`, the per-track logs are meant to be printed afterward.",
		"The library itself doesn't print them; this is for the caller's",
		"benefit.",
		"",
		"The default is `false`.",
	);
}



macro_rules! get_flag {
	($fn:ident, $flag:ident, $title:literal) => (
		#[must_use]
		#[doc = concat!("# ", $title, "?")]
		pub const fn $fn(&self) -> bool { $flag == self.flags & $flag }
	);
}

/// # Getters.
impl EncodeOptions {
	get_flag!(mkdir, FLAG_MKDIR, "Create Directories");
	get_flag!(verbose, FLAG_VERBOSE, "Verbose");

	#[must_use]
	/// # Concurrency.
	pub const fn concurrency(&self) -> u8 { self.concurrency }

	#[must_use]
	/// # FLAC Program.
	pub fn flac(&self) -> &Path { &self.flac }

	#[must_use]
	/// # FLAC Encoding Options.
	pub fn flac_options(&self) -> &[String] { &self.flac_options }

	#[must_use]
	/// # FLAC Decoding Options.
	pub fn flac_decode_options(&self) -> &[String] { &self.flac_decode_options }

	#[must_use]
	/// # LAME Program.
	pub fn lame(&self) -> &Path { &self.lame }

	#[must_use]
	/// # LAME Options.
	pub fn lame_options(&self) -> &[String] { &self.lame_options }

	#[must_use]
	/// # Poll Interval.
	pub const fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll as u64)
	}

	#[must_use]
	/// # Retry Ceiling.
	pub const fn retries(&self) -> u8 { self.retries }

	#[must_use]
	/// # Scratch Directory.
	pub fn scratch_dir(&self) -> PathBuf {
		self.scratch.clone().unwrap_or_else(std::env::temp_dir)
	}

	#[must_use]
	/// # Subprocess Timeout.
	pub const fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout as u64)
	}
}

impl EncodeOptions {
	/// # Resolve Programs.
	///
	/// Look up the encoder programs, replacing them with their full paths.
	///
	/// ## Errors
	///
	/// Returns an error if either program cannot be found.
	pub(crate) fn resolve(&mut self) -> Result<(), RipTagError> {
		self.flac = find_program(&self.flac)
			.ok_or_else(|| RipTagError::MissingTool(self.flac.to_string_lossy().into_owned()))?;
		self.lame = find_program(&self.lame)
			.ok_or_else(|| RipTagError::MissingTool(self.lame.to_string_lossy().into_owned()))?;
		Ok(())
	}
}



/// # Find Program.
///
/// A bare name is looked for in each `PATH` directory; a path is just
/// checked for existence.
fn find_program(src: &Path) -> Option<PathBuf> {
	if src.as_os_str().is_empty() { return None; }

	if src.components().count() == 1 && ! src.is_absolute() {
		let paths = std::env::var_os("PATH")?;
		std::env::split_paths(&paths)
			.map(|dir| dir.join(src))
			.find(|p| p.is_file())
	}
	else if src.is_file() { Some(src.to_path_buf()) }
	else { None }
}

/// # Tokenize.
fn tokenize(src: &str) -> Vec<String> {
	src.split_whitespace().map(String::from).collect()
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_defaults() {
		let opts = EncodeOptions::default();
		assert!((1..=JOBS_AUTO_MAX).contains(&opts.concurrency()));
		assert_eq!(opts.retries(), 5);
		assert_eq!(opts.timeout(), Duration::from_secs(1800));
		assert_eq!(opts.poll_interval(), Duration::from_millis(625));
		assert_eq!(opts.flac_options(), &["--force", "--keep-foreign-metadata", "--verify"]);
		assert_eq!(opts.flac_decode_options(), &["--force"]);
		assert_eq!(opts.lame_options(), &["--clipdetect", "-q", "2", "-V2", "-b", "224"]);
		assert_eq!(opts.flac_options(), tokenize(DEFAULT_FLAC_OPTIONS));
		assert_eq!(opts.flac_decode_options(), tokenize(DEFAULT_FLAC_DECODE_OPTIONS));
		assert_eq!(opts.lame_options(), tokenize(DEFAULT_LAME_OPTIONS));
		assert!(opts.mkdir());
		assert!(! opts.verbose());
	}

	#[test]
	fn t_clamps() {
		let opts = EncodeOptions::default()
			.with_concurrency(0)
			.with_retries(200)
			.with_timeout(0)
			.with_poll_interval(1);
		assert_eq!(opts.concurrency(), 1);
		assert_eq!(opts.retries(), RETRIES_MAX);
		assert_eq!(opts.timeout(), Duration::from_secs(1));
		assert_eq!(opts.poll_interval(), Duration::from_millis(u64::from(POLL_MIN)));

		let opts = opts
			.with_concurrency(255)
			.with_retries(0)
			.with_timeout(u32::MAX)
			.with_poll_interval(u16::MAX);
		assert_eq!(opts.concurrency(), JOBS_MAX);
		assert_eq!(opts.retries(), 0);
		assert_eq!(opts.timeout(), Duration::from_secs(u64::from(TIMEOUT_MAX)));
		assert_eq!(opts.poll_interval(), Duration::from_millis(u64::from(POLL_MAX)));
	}

	#[test]
	fn t_flags() {
		let opts = EncodeOptions::default().with_verbose(true).with_mkdir(false);
		assert!(opts.verbose());
		assert!(! opts.mkdir());

		let opts = opts.with_verbose(false).with_mkdir(true);
		assert!(! opts.verbose());
		assert!(opts.mkdir());
	}

	#[test]
	fn t_tokenize() {
		let opts = EncodeOptions::default().with_flac_options("  -8 \t --verify\n");
		assert_eq!(opts.flac_options(), &["-8", "--verify"]);

		let opts = opts.with_lame_options("");
		assert!(opts.lame_options().is_empty());
	}

	#[cfg(unix)]
	#[test]
	fn t_resolve() {
		// Explicit paths.
		let mut opts = EncodeOptions::default()
			.with_flac_program("/bin/sh")
			.with_lame_program("/bin/sh");
		assert!(opts.resolve().is_ok());
		assert_eq!(opts.flac(), Path::new("/bin/sh"));

		// Search path.
		let mut opts = EncodeOptions::default()
			.with_flac_program("sh")
			.with_lame_program("sh");
		assert!(opts.resolve().is_ok());
		assert!(opts.flac().is_absolute(), "Program should have been resolved.");

		// Missing.
		let mut opts = EncodeOptions::default()
			.with_flac_program("/bin/sh")
			.with_lame_program("riptag-no-such-lame");
		assert_eq!(
			opts.resolve(),
			Err(RipTagError::MissingTool("riptag-no-such-lame".to_owned())),
		);
	}
}
