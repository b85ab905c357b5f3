/*!
# Rip & Tag: Metadata Snapshots

Before anything is encoded, the tracks and their tags are saved to
`CWD/_riptag/` so there's a record of what was asked for.
*/

use riptag_core::{
	EncodeJob,
	RipTagError,
	TrackMetadata,
};
use serde::Serialize;
use std::{
	io::Write,
	path::{
		Path,
		PathBuf,
	},
};



/// # Cache Base.
///
/// The snapshot root is thus `CWD/CACHE_BASE`.
pub(super) const CACHE_BASE: &str = "_riptag";



#[derive(Serialize)]
/// # Saved Track.
struct SavedTrack<'a> {
	idx: u8,
	included: bool,
	flac: &'a Path,
	mp3: &'a Path,
	meta: &'a TrackMetadata,
}

impl<'a> From<&'a EncodeJob> for SavedTrack<'a> {
	fn from(src: &'a EncodeJob) -> Self {
		Self {
			idx: src.track_index(),
			included: src.included(),
			flac: src.flac_dst(),
			mp3: src.mp3_dst(),
			meta: src.metadata(),
		}
	}
}



/// # Save Snapshot.
///
/// This is the persistence callback handed to the coordinator.
///
/// ## Errors
///
/// Returns an error if the snapshot directory can't be created or the file
/// can't be written.
pub(super) fn save(jobs: &[EncodeJob]) -> Result<(), RipTagError> {
	let root = std::env::current_dir()
		.map_err(|_| RipTagError::Persist(CACHE_BASE.to_owned()))?
		.join(CACHE_BASE);
	save_to(&root, jobs).map(|_| ())
}

/// # Save Snapshot To.
///
/// Serialize the jobs and write them to `root`, returning the file path.
fn save_to(root: &Path, jobs: &[EncodeJob]) -> Result<PathBuf, RipTagError> {
	let err = || RipTagError::Persist(root.to_string_lossy().into_owned());
	if ! root.is_dir() { std::fs::create_dir_all(root).map_err(|_| err())?; }

	let dst = root.join(file_name(jobs));
	let tracks = jobs.iter().map(SavedTrack::from).collect::<Vec<_>>();
	let data = bincode::serialize(&tracks).map_err(|_| err())?;

	// Write to a temporary file first, then move it into place.
	let mut tmp = tempfile::NamedTempFile::new_in(root).map_err(|_| err())?;
	tmp.write_all(&data)
		.and_then(|()| tmp.flush())
		.and_then(|()| tmp.as_file().sync_all())
		.map_err(|_| err())?;
	tmp.persist(&dst).map_err(|_| RipTagError::Persist(dst.to_string_lossy().into_owned()))?;

	Ok(dst)
}

/// # File Name.
///
/// Snapshots are named for the album, keeping only the file-friendly bits.
fn file_name(jobs: &[EncodeJob]) -> String {
	let album = jobs.first().map_or("", |j| j.metadata().album.as_str());
	let mut out = String::with_capacity(album.len() + 4);
	for c in album.chars() {
		if c.is_alphanumeric() { out.extend(c.to_lowercase()); }
		else if ! out.is_empty() && ! out.ends_with('-') { out.push('-'); }
	}
	while out.ends_with('-') { out.pop(); }

	if out.is_empty() { out.push_str("untitled"); }
	out.push_str(".bin");
	out
}
