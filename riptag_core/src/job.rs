/*!
# Rip & Tag: Jobs
*/

use crate::{
	BYTES_PER_SAMPLE,
	BYTES_PER_SECTOR,
	RipTagError,
	TrackMetadata,
};
use std::{
	ops::Range,
	path::{
		Path,
		PathBuf,
	},
};



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Track Source.
///
/// Where a track's audio comes from.
pub enum TrackSource {
	/// # A WAV File.
	///
	/// This is passed to `flac` as-is.
	Wav(PathBuf),

	/// # Raw CD-DA.
	///
	/// A byte range of 16-bit little-endian stereo PCM within a disc image
	/// or device dump. This gets copied to a scratch WAV before encoding.
	Raw {
		/// # Path.
		path: PathBuf,

		/// # Byte Range.
		range: Range<u64>,
	},
}

impl TrackSource {
	/// # From WAV.
	pub fn wav<P: Into<PathBuf>>(path: P) -> Self { Self::Wav(path.into()) }

	/// # From Byte Range.
	pub fn raw<P: Into<PathBuf>>(path: P, range: Range<u64>) -> Self {
		Self::Raw { path: path.into(), range }
	}

	/// # From Sector Range.
	///
	/// Same as [`TrackSource::raw`], but with the range given in (logical)
	/// sectors rather than bytes.
	pub fn sectors<P: Into<PathBuf>>(path: P, lsn: Range<u32>) -> Self {
		let sector = u64::from(BYTES_PER_SECTOR);
		Self::raw(path, u64::from(lsn.start) * sector..u64::from(lsn.end) * sector)
	}

	#[must_use]
	/// # Path.
	pub fn path(&self) -> &Path {
		match self {
			Self::Wav(p) | Self::Raw { path: p, .. } => p,
		}
	}

	#[must_use]
	/// # Valid?
	///
	/// Raw ranges must be non-empty and sample-aligned at both ends.
	pub const fn is_valid(&self) -> bool {
		match self {
			Self::Wav(_) => true,
			Self::Raw { range, .. } => {
				let sample = BYTES_PER_SAMPLE as u64;
				range.start < range.end &&
				range.start % sample == 0 &&
				range.end % sample == 0
			},
		}
	}
}



#[derive(Debug, Clone)]
/// # Encode Job.
///
/// Everything needed to turn one track into a FLAC and an MP3.
///
/// ```
/// use riptag_core::{EncodeJob, TrackMetadata, TrackSource};
///
/// let meta = TrackMetadata {
///     track_number: 3,
///     title: "Hello".to_owned(),
///     ..TrackMetadata::default()
/// };
/// let job = EncodeJob::new(
///     3,
///     meta,
///     TrackSource::wav("/tmp/03.wav"),
///     "/music/FLAC/03 Hello.flac",
///     "/music/MP3/03 Hello.mp3",
/// );
///
/// assert_eq!(job.label(), "03 Hello");
/// assert!(job.included());
/// ```
pub struct EncodeJob {
	idx: u8,
	label: String,
	included: bool,
	meta: TrackMetadata,
	source: TrackSource,
	flac: PathBuf,
	mp3: PathBuf,
}

impl EncodeJob {
	/// # New.
	///
	/// The label defaults to the zero-padded track number and title.
	pub fn new<P1, P2>(
		idx: u8,
		meta: TrackMetadata,
		source: TrackSource,
		flac: P1,
		mp3: P2,
	) -> Self
	where P1: Into<PathBuf>, P2: Into<PathBuf> {
		let title = meta.title.trim();
		let label =
			if title.is_empty() { format!("{idx:02}") }
			else { format!("{idx:02} {title}") };

		Self {
			idx,
			label,
			included: true,
			meta,
			source,
			flac: flac.into(),
			mp3: mp3.into(),
		}
	}

	#[must_use]
	/// # With Label.
	pub fn with_label(self, label: &str) -> Self {
		Self {
			label: label.to_owned(),
			..self
		}
	}

	#[must_use]
	/// # With Included.
	///
	/// Excluded jobs are marked as such and otherwise left alone.
	pub fn with_included(self, included: bool) -> Self {
		Self {
			included,
			..self
		}
	}

	#[must_use]
	/// # Track Index.
	pub const fn track_index(&self) -> u8 { self.idx }

	#[must_use]
	/// # Label.
	pub fn label(&self) -> &str { &self.label }

	#[must_use]
	/// # Included?
	pub const fn included(&self) -> bool { self.included }

	#[must_use]
	/// # Metadata.
	pub const fn metadata(&self) -> &TrackMetadata { &self.meta }

	#[must_use]
	/// # Source.
	pub const fn source(&self) -> &TrackSource { &self.source }

	#[must_use]
	/// # FLAC Destination.
	pub fn flac_dst(&self) -> &Path { &self.flac }

	#[must_use]
	/// # MP3 Destination.
	pub fn mp3_dst(&self) -> &Path { &self.mp3 }

	/// # Validate.
	///
	/// ## Errors
	///
	/// Returns an error if the source range is bad.
	pub(crate) fn validate(&self) -> Result<(), RipTagError> {
		if self.source.is_valid() { Ok(()) }
		else { Err(RipTagError::SourceRange(self.idx)) }
	}
}
