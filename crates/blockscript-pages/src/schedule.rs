//! Deferred, cancellable task scheduling.
//!
//! Selection changes fire in bursts. [`Coalescer`] keeps at most one pending
//! task: scheduling a new one cancels the previous one, and dropping the
//! coalescer cancels whatever is still pending.
//!
//! Tasks run on a single thread after the current turn yields. Available
//! schedulers:
//!
//! - [`MicrotaskQueue`]: an explicit queue drained by the caller.
//! - [`LocalTaskScheduler`]: a tokio `LocalSet` task (native targets).
//! - [`TimeoutScheduler`]: a zero-delay `setTimeout` (wasm32).

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A one-shot task that runs on the scheduling thread.
pub type LocalTask = Box<dyn FnOnce() + 'static>;

/// Handle to a scheduled task.
pub trait TaskHandle {
	/// Prevents the task from running if it has not run yet.
	fn cancel(&self);

	/// Whether the task is still waiting to run.
	fn is_pending(&self) -> bool;
}

/// Runs tasks on the current thread at a later turn.
pub trait Scheduler {
	type Handle: TaskHandle;

	fn schedule(&self, task: LocalTask) -> Self::Handle;
}

/// Keeps at most one pending task per owner.
pub struct Coalescer<S: Scheduler> {
	scheduler: S,
	pending: Option<S::Handle>,
}

impl<S: Scheduler> Coalescer<S> {
	pub fn new(scheduler: S) -> Self {
		Self {
			scheduler,
			pending: None,
		}
	}

	/// Schedules `task`, replacing any task that has not run yet.
	pub fn schedule(&mut self, task: impl FnOnce() + 'static) {
		self.cancel();
		self.pending = Some(self.scheduler.schedule(Box::new(task)));
	}

	/// Cancels the pending task, if any.
	pub fn cancel(&mut self) {
		if let Some(handle) = self.pending.take() {
			handle.cancel();
		}
	}

	pub fn has_pending(&self) -> bool {
		self.pending.as_ref().is_some_and(TaskHandle::is_pending)
	}

	pub fn scheduler(&self) -> &S {
		&self.scheduler
	}
}

impl<S: Scheduler> Drop for Coalescer<S> {
	fn drop(&mut self) {
		self.cancel();
	}
}

impl<S: Scheduler> fmt::Debug for Coalescer<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Coalescer")
			.field("has_pending", &self.has_pending())
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskState {
	Pending,
	Cancelled,
	Done,
}

struct QueuedTask {
	state: Rc<Cell<TaskState>>,
	task: LocalTask,
}

/// Scheduler backed by a FIFO queue that the owner drains explicitly.
///
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct MicrotaskQueue {
	tasks: Rc<RefCell<VecDeque<QueuedTask>>>,
}

impl MicrotaskQueue {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of tasks still waiting to run.
	pub fn len(&self) -> usize {
		self.tasks
			.borrow()
			.iter()
			.filter(|queued| queued.state.get() == TaskState::Pending)
			.count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Runs queued tasks, including ones they enqueue, until the queue is empty.
	///
	/// Returns how many tasks ran. Cancelled tasks are dropped without running.
	pub fn run_until_idle(&self) -> usize {
		let mut ran = 0;
		loop {
			let next = self.tasks.borrow_mut().pop_front();
			let Some(queued) = next else {
				break;
			};
			if queued.state.get() == TaskState::Pending {
				queued.state.set(TaskState::Done);
				(queued.task)();
				ran += 1;
			}
		}
		ran
	}
}

impl fmt::Debug for MicrotaskQueue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MicrotaskQueue").field("pending", &self.len()).finish()
	}
}

/// Handle returned by [`MicrotaskQueue`].
#[derive(Debug)]
pub struct QueuedTaskHandle {
	state: Rc<Cell<TaskState>>,
}

impl TaskHandle for QueuedTaskHandle {
	fn cancel(&self) {
		if self.state.get() == TaskState::Pending {
			self.state.set(TaskState::Cancelled);
		}
	}

	fn is_pending(&self) -> bool {
		self.state.get() == TaskState::Pending
	}
}

impl Scheduler for MicrotaskQueue {
	type Handle = QueuedTaskHandle;

	fn schedule(&self, task: LocalTask) -> QueuedTaskHandle {
		let state = Rc::new(Cell::new(TaskState::Pending));
		self.tasks.borrow_mut().push_back(QueuedTask {
			state: Rc::clone(&state),
			task,
		});
		QueuedTaskHandle { state }
	}
}

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub use native::{LocalTaskHandle, LocalTaskScheduler};

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
mod native {
	use super::{LocalTask, Scheduler, TaskHandle};
	use tokio::task::JoinHandle;

	/// Runs tasks on the current tokio `LocalSet` after one yield.
	///
	/// # Panics
	///
	/// Scheduling panics when called outside a `LocalSet`.
	#[derive(Debug, Clone, Copy, Default)]
	pub struct LocalTaskScheduler;

	/// Handle to a task spawned by [`LocalTaskScheduler`].
	#[derive(Debug)]
	pub struct LocalTaskHandle {
		handle: JoinHandle<()>,
	}

	impl TaskHandle for LocalTaskHandle {
		fn cancel(&self) {
			self.handle.abort();
		}

		fn is_pending(&self) -> bool {
			!self.handle.is_finished()
		}
	}

	impl Scheduler for LocalTaskScheduler {
		type Handle = LocalTaskHandle;

		fn schedule(&self, task: LocalTask) -> LocalTaskHandle {
			let handle = tokio::task::spawn_local(async move {
				tokio::task::yield_now().await;
				task();
			});
			LocalTaskHandle { handle }
		}
	}
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use browser::{TimeoutHandle, TimeoutScheduler};

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
mod browser {
	use std::cell::Cell;
	use std::rc::Rc;

	use wasm_bindgen::JsCast;
	use wasm_bindgen::closure::Closure;

	use super::{LocalTask, Scheduler, TaskHandle};

	/// Runs tasks from a zero-delay `setTimeout`.
	#[derive(Debug, Clone, Copy, Default)]
	pub struct TimeoutScheduler;

	/// Handle to a pending timeout.
	///
	/// Owns the JS callback, so it must outlive the timeout or be cancelled.
	pub struct TimeoutHandle {
		id: Option<i32>,
		pending: Rc<Cell<bool>>,
		_callback: Closure<dyn FnMut()>,
	}

	impl std::fmt::Debug for TimeoutHandle {
		fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
			f.debug_struct("TimeoutHandle")
				.field("id", &self.id)
				.field("pending", &self.pending.get())
				.finish()
		}
	}

	impl TaskHandle for TimeoutHandle {
		fn cancel(&self) {
			if let Some(id) = self.id
				&& self.pending.replace(false)
				&& let Some(window) = web_sys::window()
			{
				window.clear_timeout_with_handle(id);
			}
		}

		fn is_pending(&self) -> bool {
			self.pending.get()
		}
	}

	impl Scheduler for TimeoutScheduler {
		type Handle = TimeoutHandle;

		fn schedule(&self, task: LocalTask) -> TimeoutHandle {
			let pending = Rc::new(Cell::new(true));
			let fired = Rc::clone(&pending);
			let callback = Closure::once(move || {
				if fired.replace(false) {
					task();
				}
			});

			let id = web_sys::window().and_then(|window| {
				window
					.set_timeout_with_callback_and_timeout_and_arguments_0(
						callback.as_ref().unchecked_ref(),
						0,
					)
					.map_err(|err| tracing::warn!(?err, "setTimeout failed; task dropped"))
					.ok()
			});
			if id.is_none() {
				pending.set(false);
			}

			TimeoutHandle {
				id,
				pending,
				_callback: callback,
			}
		}
	}
}
