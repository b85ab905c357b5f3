/*!
# Rip & Tag: Library

This crate turns already-ripped CD audio into a FLAC archive copy and an MP3
listening copy, one track at a time but several tracks at once.

Each [`EncodeJob`] is worked by a pool thread: the source is encoded to FLAC
(with tags), the FLAC is decoded back to scratch PCM, and the PCM is encoded
to MP3 (with tags), with the MP3 leg repeated at a lower gain whenever the
encoder reports clipping.

Progress is reported as a stream of [`TrackSnapshot`]s that the caller drains
via [`EncodingSession::poll`] at its own pace; the workers never block on
delivery.
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod abort;
mod channel;
mod coordinator;
mod encode;
mod error;
mod job;
mod log;
mod opts;
mod parse;
mod pcm;
mod status;
mod tags;
mod tool;

#[cfg(test)] mod testing;

pub use abort::KillSwitch;
pub use channel::{
	StatusChannel,
	StatusSender,
};
pub use coordinator::{
	EncodingCoordinator,
	EncodingSession,
	result::{
		RipResult,
		TrackOutcome,
	},
};
pub use error::RipTagError;
pub use job::{
	EncodeJob,
	TrackSource,
};
pub use log::{
	TrackLog,
	TrackLogKind,
};
pub use opts::EncodeOptions;
pub use status::{
	TrackEncodingStatus,
	TrackSnapshot,
	TrackState,
};
pub use tags::{
	CustomTag,
	TrackMetadata,
};



/// # Bytes Per Sample.
///
/// One 16-bit stereo sample: two channels, two bytes each.
pub const BYTES_PER_SAMPLE: u16 = 4;

/// # Bytes Per Sector.
///
/// This is the number of bytes per sector of _audio_ data.
pub const BYTES_PER_SECTOR: u16 = SAMPLES_PER_SECTOR * BYTES_PER_SAMPLE;

/// # Samples per sector.
pub const SAMPLES_PER_SECTOR: u16 = 588;

/// # Scratch Prefix.
///
/// Scratch WAV files are created with this prefix so strays are easy to spot.
pub const SCRATCH_PREFIX: &str = "riptag-";

/// # Wave Spec.
///
/// Red Book audio: 16-bit stereo at 44.1 kHz.
pub(crate) const WAVE_SPEC: hound::WavSpec = hound::WavSpec {
	channels: 2,
	sample_rate: 44100,
	bits_per_sample: 16,
	sample_format: hound::SampleFormat::Int,
};
