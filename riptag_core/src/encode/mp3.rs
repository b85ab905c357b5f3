/*!
# Rip & Tag: MP3 Leg
*/

use crate::{
	EncodeJob,
	RipTagError,
	TrackEncodingStatus,
	TrackLog,
	TrackState,
	parse,
	pcm,
	tool::ToolCommand,
};
use std::ffi::OsString;
use super::Context;



/// # MP3 Encoder.
///
/// This picks up a track at `DECODING_WAV`, decodes the finished FLAC to a
/// scratch WAV, and encodes that to MP3.
///
/// If lame reports clipping, the scratch samples are attenuated and the MP3
/// is encoded again, up to the configured number of times.
pub(super) struct Mp3Encoder<'a> {
	ctx: Context<'a>,
	job: &'a EncodeJob,
	reencodes: u8,
}

impl<'a> Mp3Encoder<'a> {
	/// # New.
	pub(super) const fn new(ctx: Context<'a>, job: &'a EncodeJob) -> Self {
		Self { ctx, job, reencodes: 0 }
	}

	/// # Number of Re-Encodes.
	pub(super) const fn reencodes(&self) -> u8 { self.reencodes }

	/// # Encode.
	///
	/// ## Errors
	///
	/// Returns an error if decoding or encoding fails, or clipping persists
	/// after the final retry.
	pub(super) fn encode(&mut self, status: &mut TrackEncodingStatus, log: &mut TrackLog)
	-> Result<(), RipTagError> {
		let opts = self.ctx.opts();
		let scratch = self.ctx.scratch_wav(self.job.track_index())?;

		// Decode. The scratch file was only created to reserve the name;
		// flac might not want to overwrite it.
		let _res = std::fs::remove_file(&scratch);
		let mut dst = OsString::from("--output-name=");
		dst.push(&scratch);
		let cmd = ToolCommand::new(opts.flac())
			.args(opts.flac_decode_options())
			.arg("--decode")
			.arg(dst)
			.arg(self.job.flac_dst());
		self.ctx.run_tool(
			&cmd,
			status,
			log,
			parse::flac_progress,
			TrackState::DecodingWav.text(),
		)?;

		// Encode.
		self.ctx.prepare_dst(self.job.mp3_dst())?;
		status.transition_to(TrackState::EncodingMp3, TrackState::EncodingMp3.text())?;
		let cmd = ToolCommand::new(opts.lame())
			.args(opts.lame_options())
			.args(self.job.metadata().lame_args())
			.arg(&scratch)
			.arg(self.job.mp3_dst());
		let mut prefix = TrackState::EncodingMp3.text().to_owned();
		let mut scale = 1.0_f64;
		loop {
			let diagnostics = self.ctx.run_tool(&cmd, status, log, parse::lame_progress, &prefix)?;
			let clip = parse::clip_fraction(&diagnostics);
			if clip <= 0.0 { break; }

			let factor = pcm::scale_factor(clip);
			log.clip(clip, factor);
			if opts.retries() <= self.reencodes {
				return Err(RipTagError::ClippingRetryExhausted(self.reencodes));
			}

			self.reencodes += 1;
			scale *= factor;
			prefix = format!("re-encoding MP3 at {scale:.2} scale (clipping detected)…");
			status.transition_to(TrackState::ReencodingMp3, prefix.as_str())?;
			pcm::scale_wav(&scratch, factor)?;
		}

		status.transition_to(TrackState::Complete, TrackState::Complete.text())
	}
}
