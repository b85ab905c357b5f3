/*!
# Rip & Tag: Errors
*/

use crate::TrackState;
use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r"
Rip & Tag v", env!("CARGO_PKG_VERSION"), r#"
Encode ripped CD tracks to tagged FLAC and MP3, several at a time.

USAGE:
    riptag [OPTIONS] <WAV>...

TAGS:
        --album <TXT>          The album title.
        --album-artist <TXT>   The album artist.
        --artist <TXT>         The track artist. [default: the album artist]
        --compilation          Mark the album as a compilation.
        --cover <PATH>         Embed this image as the front cover.
        --disc <NUM[/TOTAL]>   The disc number, optionally with the total.
        --genre <TXT>          The genre.
        --label <TXT>          The record label/publisher.
    -t, --title <NUM=TXT>      Set the title of track <NUM>. This option may be
                               repeated. [default: Track <NUM>]
        --year <NUM>           The release year.

ENCODING:
    -j, --jobs <NUM>           Encode up to <NUM> tracks at once.
                               [default: auto; range: 1..=32]
    -r, --retries <NUM>        Re-encode a clipping MP3 at a lower gain up to
                               <NUM> times before giving up on it.
                               [default: 5; max: 16]
        --timeout <SECS>       Kill any single flac/lame run that takes longer
                               than this. [default: 1800; range: 1..=86400]
    -x, --exclude <NUM>        Skip track <NUM>. This option may be repeated.

DESTINATIONS:
        --flac-dir <DIR>       Save FLAC files here. [default: ./FLAC]
        --mp3-dir <DIR>        Save MP3 files here. [default: ./MP3]

ENCODER OPTIONS:
        --flac-options <TXT>   [default: --force --keep-foreign-metadata --verify]
        --flac-decode-options <TXT>
                               [default: --force]
        --lame-options <TXT>   [default: --clipdetect -q 2 -V2 -b 224]

MISCELLANEOUS:
    -h, --help                 Print help information to STDOUT and exit.
    -v, --verbose              Print the per-track encoding logs to STDOUT, so
                               they can e.g. be piped to a file for review,
                               like: riptag -v *.wav > encode.log
    -V, --version              Print version information to STDOUT and exit.

EARLY EXIT:
    Press CTRL+C to stop early. Running encoders are killed, their tracks
    marked as failed, and tracks not yet started are left alone.
"#);



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
pub enum RipTagError {
	/// # Bug!
	Bug(&'static str),

	/// # MP3 clipping persisted through every allowed retry.
	ClippingRetryExhausted(u8),

	/// # Two jobs share a track index.
	DuplicateTrack(u8),

	/// # Invalid state transition.
	InvalidTransition {
		/// # Current State.
		from: TrackState,

		/// # Requested State.
		to: TrackState,
	},

	/// # User Abort.
	Killed,

	/// # Missing/unusable encoder program.
	MissingTool(String),

	/// # Noop.
	Noop,

	/// # Metadata persistence failed.
	Persist(String),

	/// # Reading from disk.
	Read(String),

	/// # Invalid/misaligned source range.
	SourceRange(u8),

	/// # Subprocess failure.
	Subprocess {
		/// # Program Name.
		program: String,

		/// # Exit Code (if any).
		code: Option<i32>,

		/// # Diagnostic Tail.
		detail: String,
	},

	/// # Subprocess took too long.
	SubprocessTimeout(String),

	/// # Writing to disk.
	Write(String),

	#[cfg(feature = "bin")]
	/// # Invalid CLI arg.
	CliArg(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Some Tracks Failed.
	Incomplete(usize),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for RipTagError {}

impl From<RipTagError> for Msg {
	#[inline]
	fn from(src: RipTagError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for RipTagError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::ClippingRetryExhausted(n) => write!(f, "MP3 still clipping after {n} re-encodes; retries exhausted."),
			Self::DuplicateTrack(n) => write!(f, "Track #{n} was queued more than once."),
			Self::InvalidTransition { from, to } => write!(f, "Invalid transition from {from} to {to}."),
			Self::Killed => f.write_str("User abort; encoding aborted."),
			Self::MissingTool(s) => write!(f, "Unable to find the {s} executable."),
			Self::Noop => f.write_str("There's nothing to do!"),
			Self::Persist(s) => write!(f, "Unable to save the metadata to {s}."),
			Self::Read(s) => write!(f, "Unable to read {s}."),
			Self::SourceRange(n) => write!(f, "The source range for track #{n} is empty or not sample-aligned."),
			Self::Subprocess { program, code, detail } => {
				match code {
					Some(c) => write!(f, "{program} exited with code {c}")?,
					None => write!(f, "{program} failed")?,
				}
				if detail.is_empty() { f.write_str(".") }
				else { write!(f, ": {detail}") }
			},
			Self::SubprocessTimeout(s) => write!(f, "{s} timed out."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),

			#[cfg(feature = "bin")]
			Self::CliArg(s) => write!(f, "Invalid CLI option: {s}"),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::Incomplete(n) =>
				if *n == 1 { f.write_str("One track failed to encode.") }
				else { write!(f, "{n} tracks failed to encode.") },

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("Rip & Tag v", env!("CARGO_PKG_VERSION"))),
		}
	}
}
