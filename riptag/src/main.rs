/*!
# Rip & Tag!
*/

#![forbid(unsafe_code)]

#![deny(
	clippy::allow_attributes_without_reason,
	clippy::correctness,
	unreachable_pub,
)]

#![warn(
	clippy::complexity,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::style,

	clippy::allow_attributes,
	clippy::clone_on_ref_ptr,
	clippy::create_dir,
	clippy::filetype_is_file,
	clippy::format_push_string,
	clippy::get_unwrap,
	clippy::impl_trait_in_params,
	clippy::lossy_float_literal,
	clippy::missing_assert_message,
	clippy::missing_docs_in_private_items,
	clippy::needless_raw_strings,
	clippy::panic_in_result_fn,
	clippy::pub_without_shorthand,
	clippy::rest_pat_in_fully_bound_structs,
	clippy::semicolon_inside_block,
	clippy::str_to_string,
	clippy::string_to_string,
	clippy::todo,
	clippy::undocumented_unsafe_blocks,
	clippy::unneeded_field_pattern,
	clippy::unseparated_literal_suffix,
	clippy::unwrap_in_result,

	macro_use_extern_crate,
	missing_copy_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![expect(clippy::redundant_pub_crate, reason = "Unresolvable.")]



mod cli;
mod persist;

use dactyl::{
	NiceElapsed,
	traits::NiceInflection,
};
use fyi_ansi::{
	ansi,
	bold,
	dim,
};
use fyi_msg::{
	Msg,
	Progless,
};
use oxford_join::OxfordJoin;
use riptag_core::{
	EncodeJob,
	EncodingCoordinator,
	KillSwitch,
	RipResult,
	RipTagError,
	TrackSnapshot,
	TrackState,
};
use std::{
	collections::BTreeMap,
	io::Write,
	num::NonZeroU32,
	process::ExitCode,
};
use utc2k::FmtUtc2k;



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() -> ExitCode {
	match main__() {
		Ok(()) => ExitCode::SUCCESS,
		Err(e @ (RipTagError::PrintHelp | RipTagError::PrintVersion)) => {
			println!("{e}");
			ExitCode::SUCCESS
		},
		Err(e) => {
			Msg::from(e).eprint();
			ExitCode::FAILURE
		},
	}
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn main__() -> Result<(), RipTagError> {
	let (opts, jobs) = cli::parse()?;
	let verbose = opts.verbose();

	// CTRL+C stops the show.
	let killed = KillSwitch::default();
	let handler = killed.clone();
	if ctrlc::set_handler(move || handler.kill()).is_err() {
		Msg::warning("Unable to intercept CTRL+C; encoders will die with the program.").eprint();
	}

	let coordinator = EncodingCoordinator::new(opts)?.with_kill_switch(killed.clone());
	encode_summary(&jobs);
	if verbose { log_header(&coordinator, &jobs); }

	// Start your engines!
	let total = jobs.iter().filter(|j| j.included()).count();
	let mut session = coordinator.start(jobs, persist::save)?;
	let progress = Progless::default();
	progress.reset(progress_total(total));
	progress.set_title(Some(Msg::custom("Encoding", 199, "FLAC + MP3")));

	let mut tasks = BTreeMap::new();
	while ! session.is_finished() {
		for snap in session.poll() { watch(&progress, &mut tasks, &snap); }
	}
	for snap in session.try_drain() { watch(&progress, &mut tasks, &snap); }
	progress.finish();

	let discarded = session.channel().discarded();
	if discarded != 0 {
		Msg::warning(format!(
			"Ignored {} out of order.",
			discarded.nice_inflect("status update", "status updates"),
		)).eprint();
	}

	let res = session.join()?;
	if verbose {
		let writer = std::io::stdout();
		let mut handle = writer.lock();
		let _res = res.write_log(&mut handle).and_then(|()| handle.flush());
	}
	summarize(&res);

	if killed.killed() { Err(RipTagError::Killed) }
	else {
		let failed = res.failed().count();
		if failed == 0 { Ok(()) }
		else { Err(RipTagError::Incomplete(failed)) }
	}
}

/// # Watch Snapshot.
///
/// Keep the progress bar's task list in sync with what the workers are up
/// to: one line per track currently being worked.
fn watch(progress: &Progless, tasks: &mut BTreeMap<u8, String>, snap: &TrackSnapshot) {
	let idx = snap.track_index();
	if let Some(old) = tasks.remove(&idx) { progress.remove(&old); }

	let state = snap.state();
	if state.is_working() {
		let line = snap.describe();
		progress.add(&line);
		tasks.insert(idx, line);
	}
	else if state.is_terminal() && ! matches!(state, TrackState::Excluded) {
		progress.increment();
	}
}

/// # Encode Summary.
///
/// Briefly note what's about to happen.
fn encode_summary(jobs: &[EncodeJob]) {
	let (inc, exc): (Vec<&EncodeJob>, Vec<&EncodeJob>) = jobs.iter().partition(|j| j.included());
	let album = jobs.first().map_or("", |j| j.metadata().album.as_str());
	Msg::custom("Rip & Tag", 199, &format!(
		"{}{}.",
		inc.len().nice_inflect("track", "tracks"),
		if album.is_empty() { String::new() } else { format!(concat!(" from ", bold!("{}")), album) },
	))
		.with_newline(true)
		.eprint();

	if ! exc.is_empty() {
		let list = exc.iter().map(|j| format!("#{}", j.track_index())).collect::<Vec<_>>();
		eprintln!(concat!("        ", dim!("Skipping {}.")), list.oxford_and());
	}
}

/// # Log Header.
///
/// Print a few basic setup details for the log. Only applies when
/// -v/--verbose is set.
fn log_header(coordinator: &EncodingCoordinator, jobs: &[EncodeJob]) {
	let opts = coordinator.options();
	let writer = std::io::stdout();
	let mut handle = writer.lock();

	let _res = writeln!(
		&mut handle,
		concat!("#####
## Rip & Tag v", env!("CARGO_PKG_VERSION"), "
## Date:    {date}
## FLAC:    {flac} {flac_opts}
## LAME:    {lame} {lame_opts}
## Jobs:    {jobs}
## Retries: {retries}
## Tracks:  {tracks}
##
## Each log line is composed of the following fields, separated by two spaces:
##   * Track Number  [2 digits]
##   * Timestamp     [UTC]
##   * Kind          CMD, CLIP, ERROR, or NOTE
##   * Details
#####"),
		date=FmtUtc2k::now(),
		flac=opts.flac().display(),
		flac_opts=opts.flac_options().join(" "),
		lame=opts.lame().display(),
		lame_opts=opts.lame_options().join(" "),
		jobs=opts.concurrency(),
		retries=opts.retries(),
		tracks=jobs.iter().filter(|j| j.included()).count(),
	);

	let _res = handle.flush();
}

/// # Summarize.
///
/// Print the totals, then a line for each track that didn't make it.
fn summarize(res: &RipResult) {
	let done = res.completed().count();
	Msg::custom("Encoded", 199, &format!(
		"{} in {}.",
		done.nice_inflect("track", "tracks"),
		NiceElapsed::from(res.elapsed()),
	))
		.with_newline(true)
		.eprint();

	let reencoded = res.completed().filter(|t| t.reencodes() != 0).count();
	if reencoded != 0 {
		eprintln!(
			concat!("        ", dim!("{} re-encoded to avoid clipping.")),
			reencoded.nice_inflect("MP3 was", "MP3s were"),
		);
	}

	for t in res.failed() {
		eprintln!("{}", failed_line(t.label(), t.state(), t.message()));
	}

	// An extra line to give some separation from whatever comes next.
	eprintln!();
}

/// # Failed Line.
///
/// Format a summary line for a track that didn't make it.
fn failed_line(label: &str, state: TrackState, message: &str) -> String {
	format!(
		concat!("        ", ansi!((bold, light_red) "{}"), " ", dim!("{}: {}")),
		label,
		state,
		message,
	)
}

/// # Progress Total.
///
/// `start` rejects empty job lists, so this is never really zero.
fn progress_total(total: usize) -> NonZeroU32 {
	u32::try_from(total).ok()
		.and_then(NonZeroU32::new)
		.unwrap_or(NonZeroU32::MIN)
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_failed_line() {
		let line = failed_line("03 Locomotion", TrackState::Failed, "User abort; encoding aborted.");
		assert!(line.contains("03 Locomotion"), "Missing label.");
		assert!(line.contains("FAILED: User abort; encoding aborted."), "Missing state/message.");
		assert!(line.starts_with("        \x1b["), "Missing styling.");
		assert!(line.ends_with("\x1b[0m"), "Missing reset.");
	}

	#[test]
	fn t_progress_total() {
		assert_eq!(progress_total(0), NonZeroU32::MIN);
		assert_eq!(progress_total(12).get(), 12);
	}
}
