/*!
# Rip & Tag: Status Channel
*/

use crate::TrackSnapshot;
use crossbeam::channel::{
	Receiver,
	RecvTimeoutError,
	Sender,
};
use std::{
	collections::{
		btree_map,
		BTreeMap,
	},
	time::Duration,
};



#[derive(Debug, Clone)]
/// # Status Sender.
///
/// The producer half of the [`StatusChannel`]. Clones are cheap, and posting
/// never blocks.
pub struct StatusSender(Sender<TrackSnapshot>);

impl StatusSender {
	/// # Post.
	///
	/// Send a snapshot along. If the consumer has gone away the snapshot is
	/// silently dropped; that is never the producer's problem.
	pub(crate) fn post(&self, snap: TrackSnapshot) {
		let _res = self.0.send(snap);
	}
}



#[derive(Debug)]
/// # Status Channel.
///
/// This is the consumer half of the status pipeline. Any number of
/// [`StatusSender`]s can post [`TrackSnapshot`]s to it from any number of
/// threads; the owner drains them whenever it likes with
/// [`StatusChannel::poll`] or [`StatusChannel::try_drain`].
///
/// Snapshots for any given track are delivered in order. As a safety net, the
/// channel also remembers the last sequence seen for each track and discards
/// anything that isn't newer. Discards are only counted; see
/// [`StatusChannel::discarded`].
///
/// The most recent snapshot for each track is kept on a "board" too, so
/// callers who only care about the current picture needn't track it
/// themselves.
pub struct StatusChannel {
	tx: Sender<TrackSnapshot>,
	rx: Receiver<TrackSnapshot>,
	wait: Duration,
	board: BTreeMap<u8, TrackSnapshot>,
	discarded: usize,
}

impl StatusChannel {
	#[must_use]
	/// # New.
	///
	/// The `wait` is the longest [`StatusChannel::poll`] will block waiting
	/// for something to show up.
	pub fn new(wait: Duration) -> Self {
		let (tx, rx) = crossbeam::channel::unbounded();
		Self {
			tx,
			rx,
			wait,
			board: BTreeMap::new(),
			discarded: 0,
		}
	}

	#[must_use]
	/// # New Sender.
	pub fn sender(&self) -> StatusSender { StatusSender(self.tx.clone()) }

	/// # Poll.
	///
	/// Wait up to the configured interval for a snapshot to arrive, then
	/// return it along with anything else already queued, in arrival order.
	///
	/// An empty result just means nothing happened in the meantime.
	pub fn poll(&mut self) -> Vec<TrackSnapshot> {
		let mut out = Vec::new();
		match self.rx.recv_timeout(self.wait) {
			Ok(snap) => { self.accept(snap, &mut out); },
			// The channel holds its own sender so disconnection can't
			// happen, but either way there's nothing to report.
			Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return out,
		}

		while let Ok(snap) = self.rx.try_recv() { self.accept(snap, &mut out); }
		out
	}

	/// # Try Drain.
	///
	/// Return whatever is queued right now, without waiting.
	pub fn try_drain(&mut self) -> Vec<TrackSnapshot> {
		let mut out = Vec::new();
		while let Ok(snap) = self.rx.try_recv() { self.accept(snap, &mut out); }
		out
	}

	/// # Accept (Maybe).
	fn accept(&mut self, snap: TrackSnapshot, out: &mut Vec<TrackSnapshot>) {
		let idx = snap.track_index();
		if self.board.get(&idx).is_some_and(|last| snap.sequence() <= last.sequence()) {
			self.discarded += 1;
			return;
		}

		self.board.insert(idx, snap.clone());
		out.push(snap);
	}

	#[must_use]
	/// # Latest.
	///
	/// Return the most recent snapshot received for the track, if any.
	pub fn latest(&self, idx: u8) -> Option<&TrackSnapshot> { self.board.get(&idx) }

	#[must_use]
	/// # Board.
	///
	/// Iterate over the most recent snapshot for each track, in track order.
	pub fn board(&self) -> btree_map::Values<'_, u8, TrackSnapshot> { self.board.values() }

	#[must_use]
	/// # Discarded.
	///
	/// Return the number of out-of-order snapshots that have been thrown out.
	pub const fn discarded(&self) -> usize { self.discarded }

	#[must_use]
	/// # Poll Interval.
	pub const fn wait(&self) -> Duration { self.wait }
}
