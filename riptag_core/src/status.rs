/*!
# Rip & Tag: Track Status
*/

use crate::{
	RipTagError,
	StatusSender,
};
use std::{
	fmt,
	sync::Arc,
};



#[derive(Debug, Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// # Track State.
///
/// This is the lifecycle of a single track. The legal moves are:
///
/// ```text
/// PENDING        → EXCLUDED | ENCODING_FLAC
/// ENCODING_FLAC  → FAILED | DECODING_WAV
/// DECODING_WAV   → FAILED | ENCODING_MP3
/// ENCODING_MP3   → FAILED | REENCODING_MP3 | COMPLETE
/// REENCODING_MP3 → FAILED | REENCODING_MP3 | COMPLETE
/// ```
///
/// `EXCLUDED`, `FAILED`, and `COMPLETE` are terminal.
pub enum TrackState {
	/// # Waiting.
	Pending,

	/// # Not Wanted.
	Excluded,

	/// # CDDA to FLAC.
	EncodingFlac,

	/// # FLAC to Scratch WAV.
	DecodingWav,

	/// # WAV to MP3.
	EncodingMp3,

	/// # WAV to MP3, Quieter.
	ReencodingMp3,

	/// # Failed.
	Failed,

	/// # Done!
	Complete,
}

impl fmt::Display for TrackState {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl TrackState {
	/// # All States.
	pub const ALL: [Self; 8] = [
		Self::Pending,
		Self::Excluded,
		Self::EncodingFlac,
		Self::DecodingWav,
		Self::EncodingMp3,
		Self::ReencodingMp3,
		Self::Failed,
		Self::Complete,
	];

	#[must_use]
	/// # As Str.
	///
	/// Return the stable key for the state.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "PENDING",
			Self::Excluded => "EXCLUDED",
			Self::EncodingFlac => "ENCODING_FLAC",
			Self::DecodingWav => "DECODING_WAV",
			Self::EncodingMp3 => "ENCODING_MP3",
			Self::ReencodingMp3 => "REENCODING_MP3",
			Self::Failed => "FAILED",
			Self::Complete => "COMPLETE",
		}
	}

	#[must_use]
	/// # Default Description.
	///
	/// This is used in lieu of a message when none was given.
	pub const fn text(self) -> &'static str {
		match self {
			Self::Pending => "pending…",
			Self::Excluded => "excluded",
			Self::EncodingFlac => "encoding CDDA to FLAC…",
			Self::DecodingWav => "decoding FLAC to WAV…",
			Self::EncodingMp3 => "encoding WAV to MP3…",
			Self::ReencodingMp3 => "re-encoding MP3 (clipping detected)…",
			Self::Failed => "failed",
			Self::Complete => "complete",
		}
	}

	#[must_use]
	/// # Terminal?
	pub const fn is_terminal(self) -> bool {
		matches!(self, Self::Excluded | Self::Failed | Self::Complete)
	}

	#[must_use]
	/// # Working?
	///
	/// Returns `true` for the states where a subprocess is (or is about to
	/// be) running.
	pub const fn is_working(self) -> bool {
		matches!(
			self,
			Self::EncodingFlac | Self::DecodingWav | Self::EncodingMp3 | Self::ReencodingMp3
		)
	}

	#[must_use]
	/// # Can Transition?
	pub const fn can_transition_to(self, next: Self) -> bool {
		matches!(
			(self, next),
			(Self::Pending, Self::Excluded | Self::EncodingFlac) |
			(Self::EncodingFlac, Self::Failed | Self::DecodingWav) |
			(Self::DecodingWav, Self::Failed | Self::EncodingMp3) |
			(
				Self::EncodingMp3 | Self::ReencodingMp3,
				Self::Failed | Self::ReencodingMp3 | Self::Complete,
			)
		)
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Track Snapshot.
///
/// An immutable copy of a track's status at a single point in time. These
/// are what get posted to the [`StatusChannel`](crate::StatusChannel).
pub struct TrackSnapshot {
	idx: u8,
	label: Arc<str>,
	state: TrackState,
	message: String,
	sequence: u32,
}

impl fmt::Display for TrackSnapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let msg =
			if self.message.is_empty() { self.state.text() }
			else { self.message.as_str() };
		write!(f, "{}: {} ({msg})", self.label, self.state)
	}
}

impl TrackSnapshot {
	#[must_use]
	/// # Track Index.
	pub const fn track_index(&self) -> u8 { self.idx }

	#[must_use]
	/// # Label.
	pub fn label(&self) -> &str { &self.label }

	#[must_use]
	/// # State.
	pub const fn state(&self) -> TrackState { self.state }

	#[must_use]
	/// # Message.
	///
	/// Note this may be empty; see [`TrackSnapshot::describe`] for a
	/// friendlier alternative.
	pub fn message(&self) -> &str { &self.message }

	#[must_use]
	/// # Sequence.
	pub const fn sequence(&self) -> u32 { self.sequence }

	#[must_use]
	/// # Describe.
	///
	/// Return a one-line summary of the snapshot, like
	/// `01 Intro: ENCODING_MP3 (encoding WAV to MP3…)`.
	pub fn describe(&self) -> String { self.to_string() }
}



#[derive(Debug)]
/// # Track Encoding Status.
///
/// This is the one mutable status record for a track. It is owned by whoever
/// is currently working the track, and every change to it is published to
/// the status channel as a fresh [`TrackSnapshot`].
pub struct TrackEncodingStatus {
	snap: TrackSnapshot,
	tx: StatusSender,
}

impl TrackEncodingStatus {
	/// # New.
	///
	/// Create a new `PENDING` status and publish it (as sequence zero).
	pub fn new(idx: u8, label: &str, tx: StatusSender) -> Self {
		let out = Self {
			snap: TrackSnapshot {
				idx,
				label: Arc::from(label),
				state: TrackState::Pending,
				message: String::new(),
				sequence: 0,
			},
			tx,
		};
		out.tx.post(out.snap.clone());
		out
	}

	/// # Transition To.
	///
	/// Move the track to a new state, replacing its message.
	///
	/// ## Errors
	///
	/// If the move is not allowed, `InvalidTransition` is returned and nothing
	/// is changed or published.
	pub fn transition_to<S>(&mut self, state: TrackState, message: S)
	-> Result<(), RipTagError>
	where S: Into<String> {
		let from = self.snap.state;
		if from.can_transition_to(state) {
			self.snap.state = state;
			self.publish(message.into());
			Ok(())
		}
		else { Err(RipTagError::InvalidTransition { from, to: state }) }
	}

	/// # Progress.
	///
	/// Replace the message without changing state, e.g. to report a new
	/// percentage.
	///
	/// ## Errors
	///
	/// This is only allowed in the working states; otherwise
	/// `InvalidTransition` (from the current state to itself) is returned.
	pub fn progress<S>(&mut self, message: S) -> Result<(), RipTagError>
	where S: Into<String> {
		let state = self.snap.state;
		if state.is_working() {
			self.publish(message.into());
			Ok(())
		}
		else { Err(RipTagError::InvalidTransition { from: state, to: state }) }
	}

	/// # Publish.
	fn publish(&mut self, message: String) {
		self.snap.message = message;
		self.snap.sequence = self.snap.sequence.saturating_add(1);
		self.tx.post(self.snap.clone());
	}

	#[must_use]
	/// # Track Index.
	pub const fn track_index(&self) -> u8 { self.snap.idx }

	#[must_use]
	/// # State.
	pub const fn state(&self) -> TrackState { self.snap.state }

	#[must_use]
	/// # Sequence.
	pub const fn sequence(&self) -> u32 { self.snap.sequence }

	#[must_use]
	/// # Snapshot.
	pub const fn snapshot(&self) -> &TrackSnapshot { &self.snap }

	#[must_use]
	/// # Describe.
	pub fn describe(&self) -> String { self.snap.describe() }
}
