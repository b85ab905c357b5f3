/*!
# Rip & Tag: Kill Switch
*/

use std::sync::{
	Arc,
	atomic::{
		AtomicBool,
		Ordering::{
			Acquire,
			Release,
		},
	},
};



#[derive(Debug, Clone, Default)]
/// # Kill Switch.
///
/// This is a short-circuit for the encoding workers. Each worker checks it
/// before launching a subprocess, and keeps an eye on it while one is running
/// so the child can be stopped early.
///
/// The binary's CTRL-C intercept sets the value; library users can do the
/// same with [`KillSwitch::kill`]. Clones share the same underlying flag.
pub struct KillSwitch(Arc<AtomicBool>);

impl From<Arc<AtomicBool>> for KillSwitch {
	#[inline]
	fn from(src: Arc<AtomicBool>) -> Self { Self(src) }
}

impl KillSwitch {
	#[must_use]
	/// # Dead?
	pub fn killed(&self) -> bool { self.0.load(Acquire) }

	/// # Kill!
	///
	/// Flip the switch. There is no going back.
	pub fn kill(&self) { self.0.store(true, Release); }
}
