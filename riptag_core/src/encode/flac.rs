/*!
# Rip & Tag: FLAC Leg
*/

use crate::{
	EncodeJob,
	RipTagError,
	TrackEncodingStatus,
	TrackLog,
	TrackSource,
	TrackState,
	parse,
	pcm,
	tool::ToolCommand,
};
use std::{
	ffi::OsString,
	path::Path,
};
use super::Context;
use tempfile::TempPath;



/// # FLAC Encoder.
///
/// This takes a track from `PENDING` through `ENCODING_FLAC` and, if all goes
/// well, leaves it at `DECODING_WAV` for the MP3 leg.
pub(super) struct FlacEncoder<'a> {
	ctx: Context<'a>,
	job: &'a EncodeJob,
}

impl<'a> FlacEncoder<'a> {
	/// # New.
	pub(super) const fn new(ctx: Context<'a>, job: &'a EncodeJob) -> Self {
		Self { ctx, job }
	}

	/// # Encode.
	///
	/// ## Errors
	///
	/// Returns an error if the source can't be prepared or `flac` fails.
	pub(super) fn encode(&self, status: &mut TrackEncodingStatus, log: &mut TrackLog)
	-> Result<(), RipTagError> {
		status.transition_to(TrackState::EncodingFlac, TrackState::EncodingFlac.text())?;
		self.ctx.prepare_dst(self.job.flac_dst())?;

		// Raw sources need to be converted to WAV first.
		let scratch: TempPath;
		let src: &Path = match self.job.source() {
			TrackSource::Wav(p) => p,
			TrackSource::Raw { path, range } => {
				scratch = self.ctx.scratch_wav(self.job.track_index())?;
				log.note(format!(
					"Extracting bytes {}..{} of {}.",
					range.start,
					range.end,
					path.to_string_lossy(),
				));
				pcm::extract_range(path, range, &scratch)?;
				&scratch
			},
		};

		let mut dst = OsString::from("--output-name=");
		dst.push(self.job.flac_dst());
		let opts = self.ctx.opts();
		let cmd = ToolCommand::new(opts.flac())
			.args(opts.flac_options())
			.args(self.job.metadata().flac_args())
			.arg(dst)
			.arg(src);

		self.ctx.run_tool(
			&cmd,
			status,
			log,
			parse::flac_progress,
			TrackState::EncodingFlac.text(),
		)?;

		status.transition_to(TrackState::DecodingWav, TrackState::DecodingWav.text())
	}
}
