// Core types
pub mod types;
pub use types::*;

// Error taxonomy
pub mod error;
pub use error::RagError;

// Graph extraction and derived maps
pub mod graph;

// Remaining capacity bookkeeping
pub mod accountant;

// Reduction engine
pub mod reducer;
pub use reducer::heuristic::FallbackPolicy;
pub use reducer::{ReductionEngine, RemovalObserver};

// Logging functionality
pub mod logger;
pub use logger::EventLogger;

use graph::GraphSnapshot;
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "event-channel")]
use crossbeam_channel::{Receiver, Sender, unbounded};

type RemovalCallback = Box<dyn FnMut(&RemovalEvent) + Send + 'static>;

/// Reducer configuration struct
pub struct Reducer {
    fallback: FallbackPolicy,
    log_path: Option<PathBuf>,
    step_delay: Duration,
    callback: Option<RemovalCallback>,
    #[cfg(feature = "event-channel")]
    subscribers: Vec<Sender<RemovalEvent>>,
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer {
    /// Create a new Reducer with default settings
    ///
    /// By default:
    /// - Unresolvable runs are reported as deadlocked
    /// - Logging is disabled
    /// - Removals are not paced
    pub fn new() -> Self {
        Reducer {
            fallback: FallbackPolicy::default(),
            log_path: None,
            step_delay: Duration::ZERO,
            callback: None,
            #[cfg(feature = "event-channel")]
            subscribers: Vec::new(),
        }
    }

    /// Choose what happens when no process can be satisfied
    ///
    /// # Returns
    /// The builder for method chaining
    pub fn fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = policy;
        self
    }

    /// Activate the event log and set the path for the log file
    ///
    /// # Arguments
    /// * `path` - Path to the log file. If the path contains "{timestamp}",
    ///   it will be replaced with the current timestamp.
    ///
    /// # Returns
    /// The builder for method chaining
    pub fn with_log<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.log_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Pause after each removal so an observer can follow along
    ///
    /// The pause is purely cosmetic and has no effect on the result.
    pub fn step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// Set a callback to be invoked for every removal
    ///
    /// # Arguments
    /// * `callback` - Function to call with each removal event, in order
    ///
    /// # Returns
    /// The builder for method chaining
    pub fn on_removal<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&RemovalEvent) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Receive removal events through a channel
    ///
    /// Every subscriber gets every event of every subsequent run. Dropping
    /// the receiver unsubscribes it.
    #[cfg(feature = "event-channel")]
    pub fn subscribe(&mut self) -> Receiver<RemovalEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Reduce a snapshot with the configured settings
    ///
    /// The snapshot is validated before anything else happens; a malformed
    /// snapshot returns an error and no events are emitted.
    ///
    /// # Errors
    /// Returns a structural [`RagError`] for malformed input, or
    /// `RagError::Io` if the log file cannot be created.
    pub fn run(&mut self, snapshot: &GraphSnapshot) -> error::Result<ReductionOutcome> {
        let engine = ReductionEngine::new(snapshot)?;

        let logger = match &self.log_path {
            Some(path) => Some(EventLogger::with_file(path)?),
            None => None,
        };

        let mut dispatch = Dispatch {
            callback: self.callback.as_deref_mut(),
            #[cfg(feature = "event-channel")]
            subscribers: &mut self.subscribers,
            step_delay: self.step_delay,
        };

        Ok(engine.run(self.fallback, &mut dispatch, logger.as_ref()))
    }
}

/// Reduce a snapshot with the default settings
pub fn reduce(snapshot: &GraphSnapshot) -> error::Result<ReductionOutcome> {
    Reducer::new().run(snapshot)
}

/// Fans a removal event out to the configured observers
struct Dispatch<'a> {
    callback: Option<&'a mut (dyn FnMut(&RemovalEvent) + Send + 'static)>,
    #[cfg(feature = "event-channel")]
    subscribers: &'a mut Vec<Sender<RemovalEvent>>,
    step_delay: Duration,
}

impl RemovalObserver for Dispatch<'_> {
    fn on_removal(&mut self, event: &RemovalEvent) {
        if let Some(callback) = self.callback.as_mut() {
            callback(event);
        }

        #[cfg(feature = "event-channel")]
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());

        if !self.step_delay.is_zero() {
            std::thread::sleep(self.step_delay);
        }
    }
}
