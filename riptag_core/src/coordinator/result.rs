/*!
# Rip & Tag: Results
*/

use crate::{
	EncodeJob,
	TrackLog,
	TrackSnapshot,
	TrackState,
};
use dactyl::NiceElapsed;
use std::{
	collections::BTreeMap,
	io::Write,
	path::{
		Path,
		PathBuf,
	},
	time::Duration,
};



#[derive(Debug, Clone)]
/// # Track Outcome.
///
/// The final word on a single track.
pub struct TrackOutcome {
	idx: u8,
	label: String,
	state: TrackState,
	message: String,
	flac: PathBuf,
	mp3: PathBuf,
	reencodes: u8,
	log: TrackLog,
}

impl TrackOutcome {
	/// # New.
	pub(crate) fn new(job: &EncodeJob, snap: &TrackSnapshot, reencodes: u8, log: TrackLog)
	-> Self {
		Self {
			idx: job.track_index(),
			label: job.label().to_owned(),
			state: snap.state(),
			message: snap.message().to_owned(),
			flac: job.flac_dst().to_path_buf(),
			mp3: job.mp3_dst().to_path_buf(),
			reencodes,
			log,
		}
	}

	#[must_use]
	/// # Track Index.
	pub const fn track_index(&self) -> u8 { self.idx }

	#[must_use]
	/// # Label.
	pub fn label(&self) -> &str { &self.label }

	#[must_use]
	/// # Final State.
	pub const fn state(&self) -> TrackState { self.state }

	#[must_use]
	/// # Final Message.
	pub fn message(&self) -> &str { &self.message }

	#[must_use]
	/// # FLAC Path.
	pub fn flac(&self) -> &Path { &self.flac }

	#[must_use]
	/// # MP3 Path.
	pub fn mp3(&self) -> &Path { &self.mp3 }

	#[must_use]
	/// # Number of MP3 Re-Encodes.
	pub const fn reencodes(&self) -> u8 { self.reencodes }

	#[must_use]
	/// # Log.
	pub const fn log(&self) -> &TrackLog { &self.log }

	#[must_use]
	/// # Included?
	pub const fn included(&self) -> bool { ! matches!(self.state, TrackState::Excluded) }

	#[must_use]
	/// # Complete?
	pub const fn is_complete(&self) -> bool { matches!(self.state, TrackState::Complete) }
}



#[derive(Debug, Clone)]
/// # Rip Result.
///
/// The outcome of every track in a session, along with how long it all took.
pub struct RipResult {
	tracks: BTreeMap<u8, TrackOutcome>,
	elapsed: Duration,
}

impl RipResult {
	/// # New.
	pub(crate) fn new<I>(tracks: I, elapsed: Duration) -> Self
	where I: IntoIterator<Item=TrackOutcome> {
		Self {
			tracks: tracks.into_iter().map(|t| (t.idx, t)).collect(),
			elapsed,
		}
	}

	#[must_use]
	/// # Success?
	///
	/// Returns `true` if every included track made it to `COMPLETE`.
	pub fn success(&self) -> bool {
		let mut any = false;
		for t in self.tracks.values().filter(|t| t.included()) {
			if ! t.is_complete() { return false; }
			any = true;
		}
		any
	}

	#[must_use]
	/// # Track.
	pub fn track(&self, idx: u8) -> Option<&TrackOutcome> { self.tracks.get(&idx) }

	/// # Tracks.
	///
	/// Iterate over every outcome, in track order.
	pub fn tracks(&self) -> impl Iterator<Item=&TrackOutcome> { self.tracks.values() }

	/// # Completed Tracks.
	pub fn completed(&self) -> impl Iterator<Item=&TrackOutcome> {
		self.tracks.values().filter(|t| t.is_complete())
	}

	/// # Failed Tracks.
	///
	/// This includes tracks that never got started (because of an abort) as
	/// well as those that actually failed.
	pub fn failed(&self) -> impl Iterator<Item=&TrackOutcome> {
		self.tracks.values().filter(|t| t.included() && ! t.is_complete())
	}

	#[must_use]
	/// # Elapsed Time.
	pub const fn elapsed(&self) -> Duration { self.elapsed }

	/// # Write Log.
	///
	/// Write a summary header followed by each track's log.
	///
	/// ## Errors
	///
	/// This passes through any I/O errors from the writer.
	pub fn write_log<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
		writeln!(
			out,
			"##\n## Finished in {}: {} complete, {} failed.\n##",
			NiceElapsed::from(self.elapsed),
			self.completed().count(),
			self.failed().count(),
		)?;

		for t in self.tracks.values() {
			writeln!(out, "{:02}  {}  {}: {}", t.idx, t.state, t.label, t.message)?;
			t.log.write_to(t.idx, out)?;
		}

		Ok(())
	}
}
