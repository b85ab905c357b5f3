/*!
# Rip & Tag: Track Log
*/

use crate::RipTagError;
use std::{
	io::Write,
	slice::Iter,
};
use utc2k::FmtUtc2k;



#[derive(Debug, Clone, Default)]
/// # Track Log.
///
/// This holds the log-worthy details for a single track: the commands that
/// were run, any clipping that was detected, and whatever went wrong.
///
/// Entries are buffered rather than printed as they happen so that each
/// track's log comes out in one piece, regardless of how the threads were
/// interleaved.
pub struct TrackLog(Vec<(FmtUtc2k, TrackLogKind, String)>);

impl TrackLog {
	/// # Add Command.
	pub(crate) fn command(&mut self, cmd: String) {
		self.0.push((FmtUtc2k::now(), TrackLogKind::Command, cmd));
	}

	/// # Add Clip Report.
	pub(crate) fn clip(&mut self, clip: f64, factor: f64) {
		self.0.push((
			FmtUtc2k::now(),
			TrackLogKind::Clip,
			format!("clipping {:.2}%, rescaling by {factor:.4}", clip * 100.0),
		));
	}

	/// # Add Error.
	pub(crate) fn error(&mut self, err: &RipTagError) {
		self.0.push((FmtUtc2k::now(), TrackLogKind::Error, err.to_string()));
	}

	/// # Add Note.
	pub(crate) fn note(&mut self, note: String) {
		self.0.push((FmtUtc2k::now(), TrackLogKind::Note, note));
	}

	#[must_use]
	/// # Is Empty?
	pub fn is_empty(&self) -> bool { self.0.is_empty() }

	#[must_use]
	/// # Length.
	pub fn len(&self) -> usize { self.0.len() }

	/// # Iterate.
	pub fn iter(&self) -> Iter<'_, (FmtUtc2k, TrackLogKind, String)> { self.0.iter() }

	/// # Write.
	///
	/// Write the entries out, one per line, prefixed with the track number,
	/// timestamp, and kind.
	///
	/// ## Errors
	///
	/// This passes through any I/O errors from the writer.
	pub fn write_to<W: Write>(&self, idx: u8, out: &mut W) -> std::io::Result<()> {
		for (time, kind, txt) in &self.0 {
			writeln!(out, "{idx:02}  [{time}]  {:<5}  {txt}", kind.as_str())?;
		}
		Ok(())
	}
}



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Log Entry Kind.
pub enum TrackLogKind {
	/// # Command Line.
	Command,

	/// # Clipping Detected.
	Clip,

	/// # Error.
	Error,

	/// # Miscellaneous.
	Note,
}

impl TrackLogKind {
	#[must_use]
	/// # As Str.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Command => "CMD",
			Self::Clip => "CLIP",
			Self::Error => "ERROR",
			Self::Note => "NOTE",
		}
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_write() {
		let mut log = TrackLog::default();
		assert!(log.is_empty());

		log.command("flac --force in.wav".to_owned());
		log.clip(0.08, 0.91);
		log.error(&RipTagError::Killed);
		assert_eq!(log.len(), 3);
		assert_eq!(
			log.iter().map(|(_, k, _)| *k).collect::<Vec<_>>(),
			[TrackLogKind::Command, TrackLogKind::Clip, TrackLogKind::Error],
		);

		let mut out = Vec::new();
		log.write_to(4, &mut out).unwrap();
		let out = String::from_utf8(out).unwrap();
		let lines = out.lines().collect::<Vec<_>>();
		assert_eq!(lines.len(), 3);
		assert!(lines[0].starts_with("04  ["));
		assert!(lines[0].ends_with("CMD    flac --force in.wav"), "Unexpected: {}", lines[0]);
		assert!(lines[1].ends_with("CLIP   clipping 8.00%, rescaling by 0.9100"), "Unexpected: {}", lines[1]);
		assert!(lines[2].contains("ERROR  User abort"));
	}
}
