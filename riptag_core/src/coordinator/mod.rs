/*!
# Rip & Tag: Coordinator
*/

pub(super) mod result;

use crate::{
	EncodeJob,
	EncodeOptions,
	KillSwitch,
	RipResult,
	RipTagError,
	StatusChannel,
	TrackEncodingStatus,
	TrackLog,
	TrackOutcome,
	TrackSnapshot,
	TrackState,
	encode::Worker,
};
use std::{
	collections::BTreeSet,
	sync::Arc,
	thread::JoinHandle,
	time::Instant,
};



/// # Worker Thread Result.
type WorkerResult = Result<Vec<TrackOutcome>, RipTagError>;



#[derive(Debug)]
/// # Encoding Coordinator.
///
/// This is the entrypoint for encoding. It holds the (validated) options and
/// kill switch, and hands out [`EncodingSession`]s.
///
/// ```no_run
/// use riptag_core::{
///     EncodeJob,
///     EncodeOptions,
///     EncodingCoordinator,
///     TrackMetadata,
///     TrackSource,
/// };
///
/// let coordinator = EncodingCoordinator::new(EncodeOptions::default())
///     .expect("Missing flac or lame.");
///
/// let jobs = vec![
///     EncodeJob::new(
///         1,
///         TrackMetadata::default(),
///         TrackSource::wav("01.wav"),
///         "FLAC/01.flac",
///         "MP3/01.mp3",
///     ),
/// ];
///
/// let mut session = coordinator.start(jobs, |_| Ok(())).unwrap();
/// while ! session.is_finished() {
///     for snap in session.poll() { println!("{}", snap.describe()); }
/// }
/// assert!(session.join().unwrap().success());
/// ```
pub struct EncodingCoordinator {
	opts: Arc<EncodeOptions>,
	killed: KillSwitch,
}

impl EncodingCoordinator {
	/// # New.
	///
	/// ## Errors
	///
	/// Returns an error if `flac` or `lame` cannot be found.
	pub fn new(mut opts: EncodeOptions) -> Result<Self, RipTagError> {
		opts.resolve()?;
		Ok(Self {
			opts: Arc::new(opts),
			killed: KillSwitch::default(),
		})
	}

	#[must_use]
	/// # With Kill Switch.
	///
	/// Use an existing kill switch, e.g. one tied to CTRL+C.
	pub fn with_kill_switch(self, killed: KillSwitch) -> Self {
		Self { killed, ..self }
	}

	#[must_use]
	/// # Kill Switch.
	pub const fn kill_switch(&self) -> &KillSwitch { &self.killed }

	#[must_use]
	/// # Options.
	pub fn options(&self) -> &EncodeOptions { &self.opts }

	/// # Start.
	///
	/// Queue up the jobs and spin up the worker pool, returning straight
	/// away.
	///
	/// The `persist` callback is given the jobs before any work begins; if it
	/// fails, nothing is started.
	///
	/// Every job is announced as `PENDING`; excluded jobs are then
	/// immediately marked `EXCLUDED`.
	///
	/// ## Errors
	///
	/// Returns an error if there is nothing to do, a track is listed twice,
	/// a source range is bad, or `persist` fails.
	pub fn start<F>(&self, jobs: Vec<EncodeJob>, persist: F)
	-> Result<EncodingSession, RipTagError>
	where F: FnOnce(&[EncodeJob]) -> Result<(), RipTagError> {
		// Sanity.
		if ! jobs.iter().any(EncodeJob::included) { return Err(RipTagError::Noop); }
		let mut seen = BTreeSet::new();
		for job in &jobs {
			if ! seen.insert(job.track_index()) {
				return Err(RipTagError::DuplicateTrack(job.track_index()));
			}
			if job.included() { job.validate()?; }
		}

		persist(&jobs)?;

		let now = Instant::now();
		let channel = StatusChannel::new(self.opts.poll_interval());
		let (tx, rx) = crossbeam::channel::unbounded();
		let mut done = Vec::new();
		let mut queued = 0;
		for job in jobs {
			let mut status = TrackEncodingStatus::new(job.track_index(), job.label(), channel.sender());
			if job.included() {
				queued += 1;
				tx.send((job, status)).map_err(|_| RipTagError::Bug("job queue closed early"))?;
			}
			else {
				status.transition_to(TrackState::Excluded, "")?;
				done.push(TrackOutcome::new(&job, status.snapshot(), 0, TrackLog::default()));
			}
		}
		drop(tx);

		// Spin up the workers.
		let threads = usize::from(self.opts.concurrency()).min(queued);
		let mut workers = Vec::with_capacity(threads);
		for n in 0..threads {
			let rx = rx.clone();
			let worker = Worker::new(Arc::clone(&self.opts), self.killed.clone());
			let handle = std::thread::Builder::new()
				.name(format!("riptag-{n:02}"))
				.spawn(move || -> WorkerResult {
					let mut out = Vec::new();
					for (job, status) in &rx { out.push(worker.run(&job, status)?); }
					Ok(out)
				})
				.map_err(|_| RipTagError::Bug("unable to spawn worker thread"))?;
			workers.push(handle);
		}

		Ok(EncodingSession {
			channel,
			workers,
			done,
			killed: self.killed.clone(),
			now,
		})
	}

	/// # Run.
	///
	/// Start a session, drain it until every worker is done, and return the
	/// result. Status updates are discarded; use
	/// [`EncodingCoordinator::start`] to watch them.
	///
	/// ## Errors
	///
	/// See [`EncodingCoordinator::start`] and [`EncodingSession::join`].
	pub fn run<F>(&self, jobs: Vec<EncodeJob>, persist: F) -> Result<RipResult, RipTagError>
	where F: FnOnce(&[EncodeJob]) -> Result<(), RipTagError> {
		let mut session = self.start(jobs, persist)?;
		while ! session.is_finished() { session.poll(); }
		session.join()
	}
}



#[derive(Debug)]
/// # Encoding Session.
///
/// A batch of jobs in progress. Drain status updates with
/// [`EncodingSession::poll`] until [`EncodingSession::is_finished`], then
/// collect the results with [`EncodingSession::join`].
///
/// Dropping a session without joining it doesn't stop the workers; flip the
/// kill switch first if that's what you want.
pub struct EncodingSession {
	channel: StatusChannel,
	workers: Vec<JoinHandle<WorkerResult>>,
	done: Vec<TrackOutcome>,
	killed: KillSwitch,
	now: Instant,
}

impl EncodingSession {
	/// # Poll.
	///
	/// Wait up to the poll interval for status updates and return them.
	pub fn poll(&mut self) -> Vec<TrackSnapshot> { self.channel.poll() }

	/// # Try Drain.
	///
	/// Return any status updates already waiting, without blocking.
	pub fn try_drain(&mut self) -> Vec<TrackSnapshot> { self.channel.try_drain() }

	#[must_use]
	/// # Finished?
	///
	/// Returns `true` once every worker has run out of jobs. There may still
	/// be updates left to drain.
	pub fn is_finished(&self) -> bool {
		self.workers.iter().all(JoinHandle::is_finished)
	}

	#[must_use]
	/// # Status Channel.
	///
	/// This can be used to look up the latest snapshot for any track.
	pub const fn channel(&self) -> &StatusChannel { &self.channel }

	#[must_use]
	/// # Kill Switch.
	pub const fn kill_switch(&self) -> &KillSwitch { &self.killed }

	/// # Join.
	///
	/// Wait for the workers to finish and gather the results. Any status
	/// updates not yet drained are pulled onto the channel's board.
	///
	/// ## Errors
	///
	/// This only fails for logic errors in a worker (invalid transitions,
	/// bugs, panics); ordinary encoding failures are reported per track in
	/// the result.
	pub fn join(mut self) -> Result<RipResult, RipTagError> {
		let mut out = std::mem::take(&mut self.done);
		let mut err = None;
		for handle in self.workers.drain(..) {
			match handle.join() {
				Ok(Ok(tracks)) => { out.extend(tracks); },
				Ok(Err(e)) => { err.get_or_insert(e); },
				Err(_) => { err.get_or_insert(RipTagError::Bug("worker thread panicked")); },
			}
		}
		self.channel.try_drain();

		if let Some(e) = err { return Err(e); }
		Ok(RipResult::new(out, self.now.elapsed()))
	}
}
