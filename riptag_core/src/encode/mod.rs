/*!
# Rip & Tag: Encoding
*/

pub(super) mod flac;
pub(super) mod mp3;

use crate::{
	EncodeJob,
	EncodeOptions,
	KillSwitch,
	RipTagError,
	SCRATCH_PREFIX,
	TrackEncodingStatus,
	TrackLog,
	TrackOutcome,
	TrackState,
	tool::ToolCommand,
};
use flac::FlacEncoder;
use mp3::Mp3Encoder;
use std::{
	path::Path,
	sync::Arc,
};
use tempfile::TempPath;



#[derive(Debug)]
/// # Worker.
///
/// This takes a single track all the way from source to MP3, and is what
/// each pool thread runs for each job it receives.
pub(crate) struct Worker {
	opts: Arc<EncodeOptions>,
	killed: KillSwitch,
}

impl Worker {
	/// # New.
	pub(crate) const fn new(opts: Arc<EncodeOptions>, killed: KillSwitch) -> Self {
		Self { opts, killed }
	}

	/// # Run.
	///
	/// Encode the FLAC, then the MP3. Any ordinary failure along the way is
	/// recorded on the track as `FAILED` and the outcome is returned as usual.
	///
	/// If the kill switch was already flipped, the track is left `PENDING`.
	///
	/// ## Errors
	///
	/// Only logic errors (bad transitions and bugs) are returned, as those
	/// can't be pinned on any one track.
	pub(crate) fn run(&self, job: &EncodeJob, mut status: TrackEncodingStatus)
	-> Result<TrackOutcome, RipTagError> {
		let mut log = TrackLog::default();
		if self.killed.killed() {
			log.note("Skipped; the rip was aborted before this track started.".to_owned());
			return Ok(TrackOutcome::new(job, status.snapshot(), 0, log));
		}

		let ctx = Context {
			opts: &self.opts,
			killed: &self.killed,
		};
		let mut mp3 = Mp3Encoder::new(ctx, job);
		let res = FlacEncoder::new(ctx, job).encode(&mut status, &mut log)
			.and_then(|()| mp3.encode(&mut status, &mut log));

		match res {
			Ok(()) => {},
			Err(e @ (RipTagError::Bug(_) | RipTagError::InvalidTransition { .. })) => return Err(e),
			Err(e) => {
				log.error(&e);
				status.transition_to(TrackState::Failed, e.to_string())?;
			},
		}

		Ok(TrackOutcome::new(job, status.snapshot(), mp3.reencodes(), log))
	}
}



#[derive(Debug, Clone, Copy)]
/// # Encoding Context.
///
/// The shared bits each leg needs.
pub(super) struct Context<'a> {
	opts: &'a EncodeOptions,
	killed: &'a KillSwitch,
}

impl<'a> Context<'a> {
	/// # Options.
	pub(super) const fn opts(self) -> &'a EncodeOptions { self.opts }

	/// # Prepare Destination.
	///
	/// Create the parent directory if needed and allowed.
	pub(super) fn prepare_dst(self, dst: &Path) -> Result<(), RipTagError> {
		if self.opts.mkdir() {
			if let Some(dir) = dst.parent() {
				if ! dir.as_os_str().is_empty() && ! dir.is_dir() {
					std::fs::create_dir_all(dir)
						.map_err(|_| RipTagError::Write(dir.to_string_lossy().into_owned()))?;
				}
			}
		}
		Ok(())
	}

	/// # New Scratch WAV.
	///
	/// Reserve a uniquely-named WAV in the scratch directory. The file is
	/// deleted when the returned path is dropped.
	pub(super) fn scratch_wav(self, idx: u8) -> Result<TempPath, RipTagError> {
		let dir = self.opts.scratch_dir();
		let prefix = format!("{SCRATCH_PREFIX}{idx:02}-");
		tempfile::Builder::new()
			.prefix(&prefix)
			.suffix(".wav")
			.tempfile_in(&dir)
			.map(tempfile::NamedTempFile::into_temp_path)
			.map_err(|_| RipTagError::Write(dir.to_string_lossy().into_owned()))
	}

	/// # Run Tool.
	///
	/// Run the command to completion, publishing a progress message each
	/// time `parse` finds a new percentage in its output. The message is
	/// `prefix` followed by the percentage.
	///
	/// ## Errors
	///
	/// Returns an error if the kill switch has been flipped, or the run
	/// fails for any reason.
	pub(super) fn run_tool<F>(
		self,
		cmd: &ToolCommand,
		status: &mut TrackEncodingStatus,
		log: &mut TrackLog,
		parse: F,
		prefix: &str,
	) -> Result<Vec<String>, RipTagError>
	where F: Fn(&str) -> Option<u8> {
		if self.killed.killed() { return Err(RipTagError::Killed); }

		log.command(cmd.command_line());
		let mut run = cmd.spawn(self.opts.timeout(), self.killed)?;
		let mut last = None;
		for line in run.by_ref() {
			if let Some(pct) = parse(&line) {
				if last != Some(pct) {
					last = Some(pct);
					status.progress(format!("{prefix} {pct}%"))?;
				}
			}
		}

		run.finish()
	}
}
