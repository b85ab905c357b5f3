/*!
# Rip & Tag: PCM
*/

use crate::{
	BYTES_PER_SAMPLE,
	BYTES_PER_SECTOR,
	RipTagError,
	WAVE_SPEC,
};
use hound::{
	SampleFormat,
	WavReader,
	WavWriter,
};
use std::{
	fs::File,
	io::{
		BufReader,
		Read,
		Seek,
		SeekFrom,
	},
	ops::Range,
	path::Path,
};



/// # Clip Headroom.
///
/// Each re-encode takes off this much more than lame asked for.
const CLIP_HEADROOM: f64 = 0.01;

/// # Minimum Scale Factor.
const SCALE_MIN: f64 = 0.05;

/// # Maximum Scale Factor.
const SCALE_MAX: f64 = 0.99;

/// # Extraction Chunk.
///
/// Raw data is copied a few sectors at a time.
const CHUNK: usize = BYTES_PER_SECTOR as usize * 64;



/// # Extract Range.
///
/// Copy a range of raw 16-bit stereo PCM out of `src` into a brand new WAV
/// file at `dst`.
///
/// ## Errors
///
/// Returns an error if the range is misaligned, the source is too short, or
/// any of the I/O fails.
pub(crate) fn extract_range(src: &Path, range: &Range<u64>, dst: &Path)
-> Result<(), RipTagError> {
	let len = range.end.saturating_sub(range.start);
	let samples = u32::try_from(len / u64::from(BYTES_PER_SAMPLE))
		.ok()
		.and_then(|n| n.checked_mul(2))
		.ok_or_else(|| RipTagError::Read(src.to_string_lossy().into_owned()))?;

	let read_err = || RipTagError::Read(src.to_string_lossy().into_owned());
	let write_err = || RipTagError::Write(dst.to_string_lossy().into_owned());

	let mut file = File::open(src).map_err(|_| read_err())?;
	file.seek(SeekFrom::Start(range.start)).map_err(|_| read_err())?;
	let mut file = BufReader::new(file).take(len);

	let mut wav = WavWriter::create(dst, WAVE_SPEC).map_err(|_| write_err())?;
	let mut writer = wav.get_i16_writer(samples);
	let mut buf = vec![0_u8; CHUNK];
	let mut left = usize::try_from(len).map_err(|_| read_err())?;
	while left != 0 {
		let chunk = &mut buf[..left.min(CHUNK)];
		file.read_exact(chunk).map_err(|_| read_err())?;
		for pair in chunk.chunks_exact(2) {
			writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]));
		}
		left -= chunk.len();
	}

	writer.flush().map_err(|_| write_err())?;
	wav.finalize().map_err(|_| write_err())
}

#[must_use]
/// # Scale Factor.
///
/// Convert a clip fraction into the factor to multiply each sample by for the
/// next pass.
pub(crate) fn scale_factor(clip: f64) -> f64 {
	(1.0 - clip - CLIP_HEADROOM).clamp(SCALE_MIN, SCALE_MAX)
}

#[must_use]
#[expect(clippy::cast_possible_truncation, reason = "Value is clamped.")]
/// # Scale Sample.
///
/// Multiply, round, and saturate.
pub(crate) fn scale_sample(sample: i16, factor: f64) -> i16 {
	(f64::from(sample) * factor)
		.round()
		.clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

/// # Scale WAV (In Place).
///
/// Attenuate every sample of a 16-bit integer WAV file by `factor`,
/// overwriting the original.
///
/// ## Errors
///
/// Returns an error if the file can't be read, isn't 16-bit integer PCM, or
/// can't be rewritten.
pub(crate) fn scale_wav(path: &Path, factor: f64) -> Result<(), RipTagError> {
	let read_err = || RipTagError::Read(path.to_string_lossy().into_owned());
	let write_err = || RipTagError::Write(path.to_string_lossy().into_owned());

	let reader = WavReader::open(path).map_err(|_| read_err())?;
	let spec = reader.spec();
	if spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int {
		return Err(read_err());
	}
	let samples = reader.into_samples::<i16>()
		.map(|s| s.map(|s| scale_sample(s, factor)))
		.collect::<Result<Vec<i16>, _>>()
		.map_err(|_| read_err())?;

	let mut wav = WavWriter::create(path, spec).map_err(|_| write_err())?;
	for s in samples {
		wav.write_sample(s).map_err(|_| write_err())?;
	}
	wav.finalize().map_err(|_| write_err())
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_scale_factor() {
		// The headroom always applies.
		assert!((scale_factor(0.08) - 0.91).abs() < 1e-9);
		assert!((scale_factor(0.02) - 0.97).abs() < 1e-9);

		// Bounds.
		assert!((scale_factor(0.0) - SCALE_MAX).abs() < 1e-9);
		assert!((scale_factor(0.99) - SCALE_MIN).abs() < 1e-9);
		assert!((scale_factor(5.0) - SCALE_MIN).abs() < 1e-9);

		// Bigger clips, smaller factors.
		let mut last = 1.0;
		for n in 0..90 {
			let f = scale_factor(f64::from(n) / 100.0);
			assert!(f < 1.0, "Factor must always attenuate.");
			assert!(f <= last, "Factor should not increase with clipping.");
			last = f;
		}
	}

	#[test]
	fn t_scale_sample() {
		assert_eq!(scale_sample(10_000, 0.91), 9100);
		assert_eq!(scale_sample(-10_000, 0.91), -9100);
		assert_eq!(scale_sample(0, 0.5), 0);
		assert_eq!(scale_sample(3, 0.5), 2, "Should round.");
		assert_eq!(scale_sample(i16::MAX, 2.0), i16::MAX, "Should saturate.");
		assert_eq!(scale_sample(i16::MIN, 2.0), i16::MIN, "Should saturate.");
	}

	#[test]
	fn t_extract_and_scale() {
		let dir = tempfile::tempdir().expect("Tempdir failed.");
		let raw = dir.path().join("disc.bin");
		let wav = dir.path().join("track.wav");

		// Two sectors of junk followed by one sector of a known pattern.
		let mut data = vec![0xAA_u8; usize::from(BYTES_PER_SECTOR) * 2];
		for n in 0..i16::try_from(u16::from(BYTES_PER_SECTOR) / 2).unwrap() {
			data.extend_from_slice(&(n * 10).to_le_bytes());
		}
		std::fs::write(&raw, &data).unwrap();

		let start = u64::from(BYTES_PER_SECTOR) * 2;
		let range = start..start + u64::from(BYTES_PER_SECTOR);
		extract_range(&raw, &range, &wav).expect("Extraction failed.");

		let reader = WavReader::open(&wav).expect("Invalid WAV.");
		assert_eq!(reader.spec(), WAVE_SPEC);
		let got = reader.into_samples::<i16>().map(Result::unwrap).collect::<Vec<_>>();
		assert_eq!(got.len(), usize::from(BYTES_PER_SECTOR) / 2);
		assert_eq!(&got[..4], &[0, 10, 20, 30]);

		// Now scale it.
		scale_wav(&wav, 0.5).expect("Scale failed.");
		let got = WavReader::open(&wav).unwrap()
			.into_samples::<i16>()
			.map(Result::unwrap)
			.collect::<Vec<_>>();
		assert_eq!(got.len(), usize::from(BYTES_PER_SECTOR) / 2);
		assert_eq!(&got[..4], &[0, 5, 10, 15]);

		// Reading past the end fails.
		let range = start..start + u64::from(BYTES_PER_SECTOR) * 2;
		assert!(extract_range(&raw, &range, &wav).is_err());
	}
}
