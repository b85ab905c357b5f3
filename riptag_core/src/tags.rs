/*!
# Rip & Tag: Tags
*/

use serde::{
	Deserialize,
	Serialize,
};
use std::{
	ffi::OsString,
	path::PathBuf,
};



/// # Encoder Tag.
///
/// Both formats get stamped with this.
const ENCODER: &str = concat!("Rip & Tag v", env!("CARGO_PKG_VERSION"));



#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
/// # Track Metadata.
///
/// This holds everything worth tagging for a single track. Empty strings and
/// zero numbers are simply left out of the tags.
///
/// ```
/// use riptag_core::TrackMetadata;
///
/// let meta = TrackMetadata {
///     album: "Hello".to_owned(),
///     track_number: 2,
///     track_total: 9,
///     ..TrackMetadata::default()
/// };
///
/// assert_eq!(
///     &meta.vorbis_comments()[..3],
///     [
///         ("ALBUM".to_owned(), "Hello".to_owned()),
///         ("TRACKNUMBER".to_owned(), "2".to_owned()),
///         ("TRACKTOTAL".to_owned(), "9".to_owned()),
///     ],
/// );
/// ```
pub struct TrackMetadata {
	/// # Album Title.
	pub album: String,

	/// # Album Artist.
	pub album_artist: String,

	/// # Record Label.
	pub label: String,

	/// # Disc Number.
	pub disc_number: u8,

	/// # Disc Total.
	pub disc_total: u8,

	/// # Track Number.
	pub track_number: u8,

	/// # Track Total.
	pub track_total: u8,

	/// # Track Title.
	pub title: String,

	/// # Track Artist.
	pub artist: String,

	/// # Genre.
	pub genre: String,

	/// # Year.
	pub year: String,

	/// # Compilation?
	pub compilation: bool,

	/// # Cover Image.
	pub cover: Option<PathBuf>,

	/// # Custom Tags.
	///
	/// These are appended after (and replace) the standard tags of the same
	/// name.
	pub custom: Vec<CustomTag>,
}

impl TrackMetadata {
	#[must_use]
	/// # Vorbis Comments.
	///
	/// Return the `(NAME, value)` pairs to embed in the FLAC.
	pub fn vorbis_comments(&self) -> Vec<(String, String)> {
		let mut out = Vec::new();
		push_str(&mut out, "ALBUM", &self.album);
		push_str(&mut out, "ALBUMARTIST", &self.album_artist);
		push_str(&mut out, "ORGANIZATION", &self.label);
		push_str(&mut out, "LABEL", &self.label);
		push_num(&mut out, "DISCNUMBER", self.disc_number);
		push_num(&mut out, "DISCTOTAL", self.disc_total);
		push_num(&mut out, "TRACKNUMBER", self.track_number);
		push_num(&mut out, "TRACKTOTAL", self.track_total);
		push_str(&mut out, "TITLE", &self.title);
		push_str(&mut out, "ARTIST", &self.artist);
		push_str(&mut out, "GENRE", &self.genre);
		push_str(&mut out, "DATE", &self.year);
		if self.compilation { push_str(&mut out, "COMPILATION", "1"); }
		push_str(&mut out, "ENCODER", ENCODER);

		push_custom(&mut out, self.custom.iter().filter_map(|c| Some((c.vorbis.as_deref()?, c.value.as_str()))));
		out
	}

	#[must_use]
	/// # ID3v2 Frames.
	///
	/// Return the `(FRAME, value)` pairs to embed in the MP3.
	pub fn id3v2_frames(&self) -> Vec<(String, String)> {
		let mut out = Vec::new();
		push_str(&mut out, "TALB", &self.album);
		push_str(&mut out, "TPE2", &self.album_artist);
		push_str(&mut out, "TPUB", &self.label);
		push_pos(&mut out, "TPOS", self.disc_number, self.disc_total);
		push_pos(&mut out, "TRCK", self.track_number, self.track_total);
		push_str(&mut out, "TIT2", &self.title);
		push_str(&mut out, "TPE1", &self.artist);
		push_str(&mut out, "TCON", &self.genre);
		push_str(&mut out, "TYER", &self.year);
		push_str(&mut out, "TDRC", &self.year);
		if self.compilation { push_str(&mut out, "TCMP", "1"); }
		push_str(&mut out, "TENC", ENCODER);

		push_custom(&mut out, self.custom.iter().filter_map(|c| Some((c.id3v2.as_deref()?, c.value.as_str()))));
		out
	}

	/// # FLAC Arguments.
	///
	/// The cover and tag arguments for `flac`.
	pub(crate) fn flac_args(&self) -> Vec<OsString> {
		let mut out = Vec::new();
		if let Some(cover) = self.cover.as_ref() {
			let mut arg = OsString::from("--picture=");
			arg.push(cover);
			out.push(arg);
		}
		for (k, v) in self.vorbis_comments() {
			out.push(OsString::from(format!("--tag={k}={v}")));
		}
		out
	}

	/// # LAME Arguments.
	///
	/// The cover and tag arguments for `lame`. LAME keeps one value per text
	/// frame, so repeated frames are joined with `", "`. Frames whose values
	/// won't fit in Latin-1 are moved to the end, after `--id3v2-utf16`.
	pub(crate) fn lame_args(&self) -> Vec<OsString> {
		let mut out = vec![OsString::from("--id3v2-only")];
		if let Some(cover) = self.cover.as_ref() {
			out.push(OsString::from("--ti"));
			out.push(cover.as_os_str().to_os_string());
		}

		let (latin, wide): (Vec<_>, Vec<_>) = join_frames(self.id3v2_frames())
			.into_iter()
			.partition(|(_, v)| is_latin1(v));

		for (k, v) in latin {
			out.push(OsString::from("--tv"));
			out.push(OsString::from(format!("{k}={v}")));
		}
		if ! wide.is_empty() {
			out.push(OsString::from("--id3v2-utf16"));
			for (k, v) in wide {
				out.push(OsString::from("--tv"));
				out.push(OsString::from(format!("{k}={v}")));
			}
		}

		out
	}
}



#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
/// # Custom Tag.
///
/// A tag outside the standard set. Either name may be omitted to skip that
/// format.
pub struct CustomTag {
	/// # Vorbis Comment Name.
	pub vorbis: Option<String>,

	/// # ID3v2 Frame ID.
	pub id3v2: Option<String>,

	/// # Value.
	pub value: String,
}



/// # Push String.
fn push_str(out: &mut Vec<(String, String)>, key: &str, value: &str) {
	let value = value.trim();
	if ! value.is_empty() { out.push((key.to_owned(), value.to_owned())); }
}

/// # Push Number.
fn push_num(out: &mut Vec<(String, String)>, key: &str, value: u8) {
	if value != 0 { out.push((key.to_owned(), value.to_string())); }
}

/// # Push Position.
///
/// ID3 wants `N/TOTAL` for track and disc positions.
fn push_pos(out: &mut Vec<(String, String)>, key: &str, num: u8, total: u8) {
	if num != 0 {
		let value =
			if total == 0 { num.to_string() }
			else { format!("{num}/{total}") };
		out.push((key.to_owned(), value));
	}
}

/// # Push Custom.
///
/// Custom tags replace any earlier tags with the same (case-insensitive)
/// name. Multiple custom values for the same name are all kept.
fn push_custom<'a, I>(out: &mut Vec<(String, String)>, custom: I)
where I: Iterator<Item=(&'a str, &'a str)> {
	let custom = custom
		.map(|(k, v)| (k.trim().to_ascii_uppercase(), v.trim()))
		.filter(|(k, v)| ! k.is_empty() && ! v.is_empty())
		.collect::<Vec<_>>();

	out.retain(|(k, _)| ! custom.iter().any(|(k2, _)| k == k2));
	for (k, v) in custom { out.push((k, v.to_owned())); }
}

/// # Join Frames.
///
/// Merge the values of repeated frames into the first occurrence, keeping
/// the original order.
fn join_frames(src: Vec<(String, String)>) -> Vec<(String, String)> {
	let mut out: Vec<(String, String)> = Vec::with_capacity(src.len());
	for (k, v) in src {
		if let Some((_, old)) = out.iter_mut().find(|(k2, _)| k == *k2) {
			old.push_str(", ");
			old.push_str(&v);
		}
		else { out.push((k, v)); }
	}
	out
}

/// # Is Latin-1?
fn is_latin1(src: &str) -> bool { src.chars().all(|c| u32::from(c) < 256) }
