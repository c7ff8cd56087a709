#![doc(html_root_url = "https://docs.rs/taskpool/0.1.0")]
#![deny(missing_docs, missing_debug_implementations)]

//! A multi-queue work-stealing thread pool for executing one-shot jobs.
//!
//! The pool runs a fixed set of worker threads, each owning a double-ended
//! run queue. Submitting a job routes it to a uniformly random queue and
//! returns a [`JobHandle`], a future for the job's return value.
//!
//! ## Worker overview
//!
//! Each worker drains its own queue from the front, in FIFO order. Other
//! workers steal from the back of that queue when their own is empty; the
//! two ends keep the owner and its thieves off the same element and
//! preserve the locality of recently produced work.
//!
//! If a worker finds no work, i.e., its queue is empty and a scan of its
//! peers yields nothing to steal, the thread goes to sleep on its queue's
//! condition variable. The sleep is bounded: work can arrive on a peer
//! queue without any notification targeting this worker, so every sleeper
//! wakes after a short timeout and probes the ring again.
//!
//! ## Lifecycle
//!
//! The lifecycle is explicit. Construction (via [`TaskPool::new`] or
//! [`Builder`]) allocates queues but starts nothing; [`TaskPool::init`]
//! spawns the workers; [`TaskPool::shut`] sets the stop signal, wakes all
//! sleepers, joins the threads, and fails the handle of every job that
//! never got to run. Dropping the pool shuts it down implicitly.
//!
//! ## Job outcomes
//!
//! A job body that panics does not harm its worker: the panic is captured
//! and surfaces as an error on the corresponding handle. A job that is
//! still queued when the pool shuts down resolves its handle with an
//! abandoned error, so no caller is left waiting.
//!
//! [`JobHandle`]: struct.JobHandle.html
//! [`Builder`]: struct.Builder.html
//! [`TaskPool::new`]: struct.TaskPool.html#method.new
//! [`TaskPool::init`]: struct.TaskPool.html#method.init
//! [`TaskPool::shut`]: struct.TaskPool.html#method.shut
//!
//! # Examples
//!
//! ```
//! use taskpool::TaskPool;
//!
//! let mut pool = TaskPool::new(4);
//! pool.init().unwrap();
//!
//! let handle = pool.submit(|| 6 * 7).unwrap();
//! assert_eq!(handle.get().unwrap(), 42);
//!
//! pool.shut();
//! ```

// ## Crate layout
//
// `Pool` holds the state shared by every handle and worker: the boxed slice
// of `Queue`s, the lifecycle state (which doubles as the stop flag), the
// startup gate, and the seed counter behind the per-thread RNGs.
//
// `TaskPool` is the owning handle: it keeps the join handles and drives
// `init`/`shut`. `Sender` is the cloneable submission handle; both route
// tasks through `Pool::submit`.
//
// `Worker` contains the logic that runs on each worker thread. `Task` is
// the type-erased unit of work; it carries the producer half of the result
// channel, `JobHandle` the consumer half.
//
// ## Locking
//
// Each queue has a dedicated mutex paired with its condition variable, and
// no path ever holds two queue locks at once: the steal scan releases one
// victim's lock before probing the next. Cross-queue lock ordering is
// therefore vacuous.

mod builder;
mod config;
mod error;
mod handle;
mod pool;
mod queue;
mod sender;
mod task;
mod task_pool;
mod worker;

pub use crate::builder::Builder;
pub use crate::error::{JobError, SpawnError, StartError};
pub use crate::handle::JobHandle;
pub use crate::sender::Sender;
pub use crate::task_pool::TaskPool;
