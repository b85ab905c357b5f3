/*!
# Rip & Tag: Test Fixtures

Stand-ins for `flac` and `lame`, written as POSIX shell scripts. The options
point the programs at `/bin/sh` and pass the script as the first option, so
nothing needs to be made executable.

The fake `flac` copies its input to its output (in either direction), and the
fake `lame` copies the scratch WAV to the "MP3", so tests can inspect the
exact samples each tool was given.
*/

use crate::{
	EncodeJob,
	EncodeOptions,
	EncodingSession,
	RipResult,
	TrackMetadata,
	TrackSnapshot,
	TrackSource,
	TrackState,
	WAVE_SPEC,
};
use std::{
	fmt::Write,
	path::{
		Path,
		PathBuf,
	},
};
use tempfile::TempDir;



/// # Fake FLAC.
const FLAC: &str = r#"#!/bin/sh
out=""
src=""
for a in "$@"; do
	case "$a" in
		--output-name=*) out="${a#--output-name=}" ;;
		-*) ;;
		*) src="$a" ;;
	esac
done
printf '%s: 25%% complete, ratio=0.500\b\b\b\b50%% complete, ratio=0.500\n' "$src" >&2
cp "$src" "$out" || exit 1
printf '%s: wrote 1234 bytes, ratio=0.500\n' "$src" >&2
exit 0
"#;

/// # Fake FLAC (Slow).
const FLAC_SLOW: &str = r"#!/bin/sh
printf 'track.wav: 10%% complete, ratio=0.500\n' >&2
exec sleep 30
";



/// # Test Fixture.
///
/// A temporary directory holding the scripts, sources, and destinations.
pub(crate) struct Fixture {
	dir: TempDir,
}

impl Fixture {
	/// # New.
	pub(crate) fn new() -> Self {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		for sub in ["counts", "scratch", "src"] {
			std::fs::create_dir(dir.path().join(sub)).expect("Mkdir failed.");
		}
		Self { dir }
	}

	/// # Path.
	pub(crate) fn path(&self) -> &Path { self.dir.path() }

	/// # Scratch Directory.
	pub(crate) fn scratch(&self) -> PathBuf { self.path().join("scratch") }

	/// # Write Script.
	fn script(&self, name: &str, body: &str) -> PathBuf {
		let path = self.path().join(name);
		std::fs::write(&path, body).expect("Script write failed.");
		path
	}

	/// # Source WAV.
	///
	/// Write two sectors' worth of stereo samples, all set to `value`.
	pub(crate) fn wav(&self, name: &str, value: i16) -> PathBuf {
		let path = self.path().join("src").join(name);
		let mut wav = hound::WavWriter::create(&path, WAVE_SPEC).expect("WAV create failed.");
		for _ in 0..588 * 2 * 2 { wav.write_sample(value).expect("WAV write failed."); }
		wav.finalize().expect("WAV finalize failed.");
		path
	}

	/// # Options.
	///
	/// Return options pointing to the fake tools, with the given clipping
	/// plan for `lame` (see [`Fixture::lame`]).
	pub(crate) fn options(&self, plan: &[(&str, &[f64])]) -> EncodeOptions {
		let flac = self.script("flac.sh", FLAC);
		self.options_with(&flac, plan)
	}

	/// # Options (Slow FLAC).
	pub(crate) fn options_slow(&self) -> EncodeOptions {
		let flac = self.script("flac-slow.sh", FLAC_SLOW);
		self.options_with(&flac, &[])
	}

	/// # Options (Any FLAC).
	fn options_with(&self, flac: &Path, plan: &[(&str, &[f64])]) -> EncodeOptions {
		let lame = self.lame(plan);
		EncodeOptions::default()
			.with_flac_program("/bin/sh")
			.with_flac_options(&format!("{} --force --verify", flac.display()))
			.with_flac_decode_options(&format!("{} --force", flac.display()))
			.with_lame_program("/bin/sh")
			.with_lame_options(&format!("{} --clipdetect -V2", lame.display()))
			.with_scratch_dir(self.scratch())
			.with_poll_interval(10)
	}

	/// # Fake LAME.
	///
	/// The plan maps MP3 file names to the clip fraction to report on each
	/// successive run; runs past the end repeat the last value.
	fn lame(&self, plan: &[(&str, &[f64])]) -> PathBuf {
		let mut arms = String::new();
		for (name, seq) in plan {
			for (n, clip) in seq.iter().enumerate() {
				clip_arm(&mut arms, &format!("'{name}:{n}'"), *clip);
			}
			if let Some(last) = seq.last() {
				clip_arm(&mut arms, &format!("'{name}:'*"), *last);
			}
		}

		let body = format!(
			r#"#!/bin/sh
src=""
dst=""
for a in "$@"; do
	src="$dst"
	dst="$a"
done
name=$(basename "$dst")
count="{counts}/$name"
n=0
if [ -f "$count" ]; then n=$(cat "$count"); fi
echo $((n + 1)) > "$count"
cp "$src" "$dst" || exit 1
printf '   50/100  (50%%)|    0:01/    0:02|\n  100/100  (100%%)|    0:02/    0:02|\n' >&2
case "$name:$n" in
{arms}	*) ;;
esac
exit 0
"#,
			counts=self.path().join("counts").display(),
		);

		self.script("lame.sh", &body)
	}

	/// # LAME Run Count.
	pub(crate) fn lame_runs(&self, mp3: &str) -> usize {
		std::fs::read_to_string(self.path().join("counts").join(mp3))
			.ok()
			.and_then(|s| s.trim().parse().ok())
			.unwrap_or(0)
	}

	/// # Job.
	///
	/// Destinations are `FLAC/NN Title.flac` and `MP3/NN Title.mp3`.
	pub(crate) fn job(&self, idx: u8, title: &str, src: TrackSource) -> EncodeJob {
		let meta = TrackMetadata {
			album: "Test Album".to_owned(),
			album_artist: "Test Artist".to_owned(),
			track_number: idx,
			track_total: 3,
			title: title.to_owned(),
			artist: "Test Artist".to_owned(),
			..TrackMetadata::default()
		};
		EncodeJob::new(
			idx,
			meta,
			src,
			self.path().join("FLAC").join(format!("{idx:02} {title}.flac")),
			self.path().join("MP3").join(format!("{idx:02} {title}.mp3")),
		)
	}
}

/// # Clip Arm.
///
/// Add a `case` arm reporting the given clip fraction (or nothing).
fn clip_arm(out: &mut String, pattern: &str, clip: f64) {
	if clip <= 0.0 { let _res = writeln!(out, "\t{pattern}) ;;"); }
	else {
		let _res = writeln!(
			out,
			"\t{pattern}) printf 'WARNING: clipping occurs at the current gain. Set your decode\\ngain to -0.50dB, or encode again using  --scale {:.4}\\n' >&2 ;;",
			1.0 - clip,
		);
	}
}

/// # Drain a Session.
///
/// Collect every snapshot until the session is finished, then join it.
pub(crate) fn collect(mut session: EncodingSession) -> (RipResult, Vec<TrackSnapshot>) {
	let mut all = Vec::new();
	while ! session.is_finished() { all.extend(session.poll()); }
	all.extend(session.try_drain());
	assert_eq!(session.channel().discarded(), 0, "Snapshots were discarded.");
	let res = session.join().expect("Join failed.");
	(res, all)
}

/// # History.
///
/// Return the snapshots for one track, in the order received.
pub(crate) fn history(all: &[TrackSnapshot], idx: u8) -> Vec<&TrackSnapshot> {
	all.iter().filter(|s| s.track_index() == idx).collect()
}

/// # Re-Encode Transitions.
///
/// Count the transitions into `REENCODING_MP3`, ignoring progress updates.
pub(crate) fn reencode_transitions(history: &[&TrackSnapshot]) -> usize {
	history.iter()
		.filter(|s| s.state() == TrackState::ReencodingMp3 && ! s.message().ends_with('%'))
		.count()
}

/// # First Sample.
pub(crate) fn first_sample(path: &Path) -> i16 {
	hound::WavReader::open(path)
		.expect("Invalid WAV.")
		.into_samples::<i16>()
		.next()
		.expect("No samples.")
		.expect("Bad sample.")
}
