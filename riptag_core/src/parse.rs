/*!
# Rip & Tag: Diagnostic Parsing

These parse the chatter flac and lame print to STDERR. Lines are expected to
have already been split on newlines, carriage returns, and backspaces.
*/



/// # Clipping Warning.
///
/// This is what `lame --clipdetect` says when the output would clip.
const CLIP_WARNING: &str = "clipping occurs at the current gain";

/// # Scale Suggestion.
///
/// The clip warning is followed by a suggested `--scale` value that would
/// avoid it.
const CLIP_SCALE: &str = "--scale";

/// # Default Clip Fraction.
///
/// Used when lame warns about clipping without suggesting a scale.
pub(crate) const DEFAULT_CLIP: f64 = 0.01;



/// # FLAC Progress.
///
/// Parse the percentage out of a line like `01.wav: 42% complete, ratio=0.611`.
pub(crate) fn flac_progress(line: &str) -> Option<u8> {
	let pos = line.find("% complete")?;
	trailing_percent(&line[..pos])
}

/// # LAME Progress.
///
/// Parse the percentage out of a frame line like
/// `  1234/9187  (13%)|    0:01/    0:08|`.
pub(crate) fn lame_progress(line: &str) -> Option<u8> {
	let pos = line.find("%)")?;
	let head = &line[..pos];
	let start = head.rfind('(')?;
	trailing_percent(head[start + 1..].trim_start())
}

/// # Trailing Percent.
///
/// Parse the digits at the end of the string as a percentage.
fn trailing_percent(src: &str) -> Option<u8> {
	let len = src.bytes().rev().take_while(u8::is_ascii_digit).count();
	if len == 0 || len > 3 { return None; }

	src[src.len() - len..].parse::<u8>().ok().filter(|&n| n <= 100)
}

/// # Clip Fraction.
///
/// Return the fraction of gain that needs to come off to avoid clipping, as
/// suggested by lame's diagnostics, or zero if there was no clipping.
///
/// If lame suggests `--scale 0.92`, the fraction is `0.08`. If it warns about
/// clipping but has no (usable) suggestion, the fraction is [`DEFAULT_CLIP`].
pub(crate) fn clip_fraction<S: AsRef<str>>(lines: &[S]) -> f64 {
	// The warning and suggestion often span lines, so look at everything
	// together.
	let all = lines.iter()
		.map(AsRef::as_ref)
		.collect::<Vec<&str>>()
		.join(" ");

	let Some(pos) = all.find(CLIP_WARNING) else { return 0.0; };
	let rest = &all[pos + CLIP_WARNING.len()..];

	rest.find(CLIP_SCALE)
		.and_then(|pos| rest[pos + CLIP_SCALE.len()..].split_whitespace().next())
		.and_then(|v| v.parse::<f64>().ok())
		.filter(|v| v.is_finite() && 0.0 < *v && *v < 1.0)
		.map_or(DEFAULT_CLIP, |v| 1.0 - v)
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_flac_progress() {
		for (line, expected) in [
			("01.wav: 42% complete, ratio=0.611", Some(42)),
			("01 Some Song.wav: 0% complete, ratio=1.000", Some(0)),
			("100% complete, ratio=0.5", Some(100)),
			("7% complete", Some(7)),
			("01.wav: wrote 1234 bytes, ratio=0.611", None),
			("track9: 999% complete", None),
			("% complete", None),
			("", None),
		] {
			assert_eq!(flac_progress(line), expected, "Mismatch for {line:?}.");
		}
	}

	#[test]
	fn t_lame_progress() {
		for (line, expected) in [
			("  1234/9187  (13%)|    0:01/    0:08|    0:01/    0:08|   27.852x|    0:07", Some(13)),
			("9187/9187  (100%)|    0:08/    0:08|", Some(100)),
			("    0/9187   ( 0%)|    0:00/    0:00|", Some(0)),
			("Encoding as 44.1 kHz j-stereo MPEG-1 Layer III VBR(q=2)", None),
			("(abc%)", None),
		] {
			assert_eq!(lame_progress(line), expected, "Mismatch for {line:?}.");
		}
	}

	#[test]
	fn t_clip_fraction() {
		// No warning, no clipping.
		assert!(clip_fraction::<&str>(&[]) <= 0.0);
		assert!(clip_fraction(&["LAME 3.100 64bits", "Writing LAME Tag...done"]) <= 0.0);

		// Warning and suggestion on separate lines.
		let got = clip_fraction(&[
			"WARNING: clipping occurs at the current gain. Set your decode",
			"gain to  -0.73dB, or encode again using  --scale 0.92",
			"ReplayGain: -7.2dB",
		]);
		assert!((got - 0.08).abs() < 1e-9, "Expected 0.08, got {got}.");

		// Warning without a suggestion.
		let got = clip_fraction(&["WARNING: clipping occurs at the current gain."]);
		assert!((got - DEFAULT_CLIP).abs() < 1e-9, "Expected default, got {got}.");

		// Garbage suggestion.
		let got = clip_fraction(&[
			"WARNING: clipping occurs at the current gain.",
			"encode again using --scale banana",
		]);
		assert!((got - DEFAULT_CLIP).abs() < 1e-9, "Expected default, got {got}.");

		// A --scale before the warning doesn't count.
		let got = clip_fraction(&[
			"Autoconverting from --scale 0.50",
			"WARNING: clipping occurs at the current gain.",
		]);
		assert!((got - DEFAULT_CLIP).abs() < 1e-9, "Expected default, got {got}.");
	}
}
