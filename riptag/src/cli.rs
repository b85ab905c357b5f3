/*!
# Rip & Tag: CLI
*/

use argyle::Argument;
use dactyl::traits::BytesToUnsigned;
use riptag_core::{
	EncodeJob,
	EncodeOptions,
	RipTagError,
	TrackMetadata,
	TrackSource,
};
use std::{
	collections::{
		BTreeMap,
		BTreeSet,
	},
	path::{
		Path,
		PathBuf,
	},
};



/// # Options Return Type.
pub(super) type Parsed = (EncodeOptions, Vec<EncodeJob>);

/// # Default FLAC Directory.
const FLAC_DIR: &str = "FLAC";

/// # Default MP3 Directory.
const MP3_DIR: &str = "MP3";



/// # Parse Options.
pub(super) fn parse() -> Result<Parsed, RipTagError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut opts = EncodeOptions::default();
	let mut meta = TrackMetadata::default();
	let mut flac_dir = PathBuf::from(FLAC_DIR);
	let mut mp3_dir = PathBuf::from(MP3_DIR);
	let mut titles = BTreeMap::new();
	let mut excluded = BTreeSet::new();
	let mut files = Vec::new();
	for arg in args {
		match arg {
			Argument::Key("--compilation") => { meta.compilation = true; },
			Argument::Key("-h" | "--help") => return Err(RipTagError::PrintHelp),
			Argument::Key("-v" | "--verbose") => { opts = opts.with_verbose(true); },
			Argument::Key("-V" | "--version") => return Err(RipTagError::PrintVersion),

			Argument::KeyWithValue("--album", s) => { meta.album = s; },
			Argument::KeyWithValue("--album-artist", s) => { meta.album_artist = s; },
			Argument::KeyWithValue("--artist", s) => { meta.artist = s; },
			Argument::KeyWithValue("--cover", s) => {
				let s = PathBuf::from(s);
				if ! s.is_file() {
					return Err(RipTagError::CliArg(format!("--cover {}", s.display())));
				}
				meta.cover.replace(s);
			},
			Argument::KeyWithValue("--disc", s) => {
				let (a, b) = parse_disc(s.as_bytes())?;
				meta.disc_number = a;
				meta.disc_total = b;
			},
			Argument::KeyWithValue("-j" | "--jobs", s) => {
				let s = u8::btou(s.trim().as_bytes())
					.ok_or(RipTagError::CliParse("-j/--jobs"))?;
				opts = opts.with_concurrency(s);
			},
			Argument::KeyWithValue("--flac-decode-options", s) => {
				opts = opts.with_flac_decode_options(&s);
			},
			Argument::KeyWithValue("--flac-dir", s) => { flac_dir = PathBuf::from(s); },
			Argument::KeyWithValue("--flac-options", s) => {
				opts = opts.with_flac_options(&s);
			},
			Argument::KeyWithValue("--genre", s) => { meta.genre = s; },
			Argument::KeyWithValue("--label", s) => { meta.label = s; },
			Argument::KeyWithValue("--lame-options", s) => {
				opts = opts.with_lame_options(&s);
			},
			Argument::KeyWithValue("--mp3-dir", s) => { mp3_dir = PathBuf::from(s); },
			Argument::KeyWithValue("-r" | "--retries", s) => {
				let s = u8::btou(s.trim().as_bytes())
					.ok_or(RipTagError::CliParse("-r/--retries"))?;
				opts = opts.with_retries(s);
			},
			Argument::KeyWithValue("-t" | "--title", s) => {
				let (idx, title) = parse_title(&s)?;
				titles.insert(idx, title);
			},
			Argument::KeyWithValue("--timeout", s) => {
				let s = u32::btou(s.trim().as_bytes())
					.ok_or(RipTagError::CliParse("--timeout"))?;
				opts = opts.with_timeout(s);
			},
			Argument::KeyWithValue("-x" | "--exclude", s) => {
				let s = u8::btou(s.trim().as_bytes())
					.ok_or(RipTagError::CliParse("-x/--exclude"))?;
				excluded.insert(s);
			},
			Argument::KeyWithValue("--year", s) => { meta.year = s.trim().to_owned(); },

			// Anything else should be a source file.
			Argument::Other(s) => {
				if s.starts_with('-') { return Err(RipTagError::CliArg(s)); }
				files.push(PathBuf::from(s));
			},
			Argument::InvalidUtf8(s) => { files.push(PathBuf::from(s)); },

			_ => {},
		}
	}

	let jobs = build_jobs(&meta, &files, &titles, &excluded, &flac_dir, &mp3_dir)?;
	Ok((opts, jobs))
}



/// # Build Jobs.
///
/// Each source file becomes a track, numbered in order.
fn build_jobs(
	meta: &TrackMetadata,
	files: &[PathBuf],
	titles: &BTreeMap<u8, String>,
	excluded: &BTreeSet<u8>,
	flac_dir: &Path,
	mp3_dir: &Path,
) -> Result<Vec<EncodeJob>, RipTagError> {
	if files.is_empty() { return Err(RipTagError::Noop); }
	let total = u8::try_from(files.len())
		.ok()
		.filter(|n| *n <= 99)
		.ok_or(RipTagError::CliParse("source files (99 max)"))?;

	// Make sure the track-specific options point to real tracks.
	if let Some(n) = titles.keys().chain(excluded.iter()).find(|n| **n == 0 || total < **n) {
		return Err(RipTagError::CliArg(format!("there is no track #{n}")));
	}

	let mut jobs = Vec::with_capacity(files.len());
	for (idx, src) in (1..=total).zip(files) {
		let title = titles.get(&idx)
			.cloned()
			.unwrap_or_else(|| format!("Track {idx:02}"));
		let artist =
			if meta.artist.is_empty() { meta.album_artist.clone() }
			else { meta.artist.clone() };

		let stem = format!("{idx:02} {}", safe_name(&title));
		let track = TrackMetadata {
			track_number: idx,
			track_total: total,
			title,
			artist,
			..meta.clone()
		};

		jobs.push(
			EncodeJob::new(
				idx,
				track,
				TrackSource::wav(src),
				flac_dir.join(format!("{stem}.flac")),
				mp3_dir.join(format!("{stem}.mp3")),
			)
				.with_included(! excluded.contains(&idx))
		);
	}

	Ok(jobs)
}

/// # Parse Disc Position.
///
/// This is either a lone number or `NUM/TOTAL`.
fn parse_disc(v: &[u8]) -> Result<(u8, u8), RipTagError> {
	let v = v.trim_ascii();
	let (a, b) = match v.iter().position(|b| b'/'.eq(b)) {
		Some(pos) => (
			u8::btou(v[..pos].trim_ascii()),
			u8::btou(v[pos + 1..].trim_ascii()),
		),
		None => (u8::btou(v), Some(0)),
	};

	match (a, b) {
		(Some(a), Some(b)) if a != 0 && (b == 0 || a <= b) => Ok((a, b)),
		_ => Err(RipTagError::CliParse("--disc")),
	}
}

/// # Parse Title.
///
/// Titles are given as `NUM=TITLE`.
fn parse_title(v: &str) -> Result<(u8, String), RipTagError> {
	v.split_once('=')
		.and_then(|(idx, title)| {
			let idx = u8::btou(idx.trim().as_bytes())?;
			let title = title.trim();
			if title.is_empty() { None }
			else { Some((idx, title.to_owned())) }
		})
		.ok_or(RipTagError::CliParse("-t/--title"))
}

/// # Safe File Name.
///
/// Replace the characters that have no business in a file name.
fn safe_name(src: &str) -> String {
	src.chars()
		.map(|c| if matches!(c, '/' | '\\' | '\0') || c.is_control() { '-' } else { c })
		.collect()
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_parse_disc() {
		assert_eq!(parse_disc(b"1"), Ok((1, 0)));
		assert_eq!(parse_disc(b" 2 / 3 "), Ok((2, 3)));
		assert!(parse_disc(b"0").is_err());
		assert!(parse_disc(b"4/3").is_err());
		assert!(parse_disc(b"one").is_err());
	}

	#[test]
	fn t_parse_title() {
		assert_eq!(parse_title("3=Hello = World"), Ok((3, "Hello = World".to_owned())));
		assert!(parse_title("3").is_err());
		assert!(parse_title("3=").is_err());
		assert!(parse_title("x=Hello").is_err());
	}

	#[test]
	fn t_build_jobs() {
		let meta = TrackMetadata {
			album: "Album".to_owned(),
			album_artist: "Band".to_owned(),
			..TrackMetadata::default()
		};
		let files = vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")];
		let titles = BTreeMap::from([(2, "AC/DC".to_owned())]);
		let excluded = BTreeSet::from([1]);

		let jobs = build_jobs(&meta, &files, &titles, &excluded, Path::new("F"), Path::new("M"))
			.expect("Build failed.");
		assert_eq!(jobs.len(), 2);

		assert!(! jobs[0].included());
		assert_eq!(jobs[0].metadata().title, "Track 01");
		assert_eq!(jobs[0].metadata().artist, "Band", "Artist should fall back to the album artist.");

		assert!(jobs[1].included());
		assert_eq!(jobs[1].label(), "02 AC/DC");
		assert_eq!(jobs[1].metadata().track_number, 2);
		assert_eq!(jobs[1].metadata().track_total, 2);
		assert_eq!(jobs[1].flac_dst(), Path::new("F/02 AC-DC.flac"));
		assert_eq!(jobs[1].mp3_dst(), Path::new("M/02 AC-DC.mp3"));

		// Bad references.
		let titles = BTreeMap::from([(3, "Nope".to_owned())]);
		assert!(build_jobs(&meta, &files, &titles, &BTreeSet::new(), Path::new("F"), Path::new("M")).is_err());
		assert_eq!(
			build_jobs(&meta, &[], &BTreeMap::new(), &BTreeSet::new(), Path::new("F"), Path::new("M")).err(),
			Some(RipTagError::Noop),
		);
	}
}
