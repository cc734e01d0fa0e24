//! Bounded, thread-based batch evaluation.
//!
//! Scoring a dataset means many independent evaluations of one system. The
//! [`BatchEvaluator`] fans them out to a fixed worker pool over a bounded
//! crossbeam channel. Each worker owns a private [`Simulation`], so no two
//! evaluations ever share scratch state.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use crate::config::EngineConfig;
use crate::error::{EvaluationError, FuzzyError, FuzzyResult};
use crate::simulation::Simulation;
use crate::system::{ControlSystem, InputValues};

type Reply = (usize, Result<f64, EvaluationError>);

struct Job {
    index: usize,
    values: InputValues,
    reply: Sender<Reply>,
}

/// Worker pool evaluating many input sets against one control system.
pub struct BatchEvaluator {
    tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl BatchEvaluator {
    /// Starts `workers` threads sharing a queue of `queue_capacity` jobs.
    ///
    /// Both values are raised to at least one.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a worker thread cannot be spawned.
    pub fn start(
        system: Arc<ControlSystem>,
        workers: usize,
        queue_capacity: usize,
    ) -> FuzzyResult<Self> {
        let workers = workers.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity.max(1));

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let system = Arc::clone(&system);
            let handle = thread::Builder::new()
                .name(format!("fuzzy-batch-{idx}"))
                .spawn(move || {
                    let mut sim = Simulation::new(system);
                    while let Ok(Job { index, values, reply }) = rx.recv() {
                        sim.reset();
                        let result = values
                            .iter()
                            .try_for_each(|(name, value)| sim.set_input(name, *value))
                            .and_then(|()| sim.compute());
                        let _ = reply.send((index, result));
                    }
                })
                .map_err(|e| FuzzyError::internal(format!("failed to spawn batch worker: {e}")))?;
            handles.push(handle);
        }

        tracing::debug!(workers, "batch evaluator started");
        Ok(Self {
            tx: Some(tx),
            workers: handles,
        })
    }

    /// Starts a pool sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a worker thread cannot be spawned.
    pub fn from_config(system: Arc<ControlSystem>, config: &EngineConfig) -> FuzzyResult<Self> {
        Self::start(system, config.workers, config.queue_capacity)
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Evaluates every input set and returns the results in submission order.
    ///
    /// A failing evaluation does not abort the batch; its slot holds the error.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the worker pool has shut down.
    pub fn evaluate_all(
        &self,
        batch: impl IntoIterator<Item = InputValues>,
    ) -> FuzzyResult<Vec<Result<f64, EvaluationError>>> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| FuzzyError::internal("batch evaluator is shut down"))?;
        let (reply_tx, reply_rx) = unbounded::<Reply>();

        let mut submitted = 0usize;
        for (index, values) in batch.into_iter().enumerate() {
            tx.send(Job {
                index,
                values,
                reply: reply_tx.clone(),
            })
            .map_err(|_| FuzzyError::internal("batch workers disconnected"))?;
            submitted += 1;
        }
        drop(reply_tx);

        let mut results: Vec<Option<Result<f64, EvaluationError>>> = vec![None; submitted];
        for _ in 0..submitted {
            let (index, result) = reply_rx
                .recv()
                .map_err(|_| FuzzyError::internal("batch worker exited before replying"))?;
            results[index] = Some(result);
        }

        tracing::debug!(evaluations = submitted, "batch finished");
        results
            .into_iter()
            .map(|r| r.ok_or_else(|| FuzzyError::internal("missing batch result")))
            .collect()
    }
}

impl Drop for BatchEvaluator {
    fn drop(&mut self) {
        // Closing the channel lets workers drain and exit.
        drop(self.tx.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defuzz::Defuzzification;
    use crate::satisfaction::{customer_satisfaction_system, FOOD_QUALITY, SERVICE_SPEED};

    fn system() -> Arc<ControlSystem> {
        Arc::new(customer_satisfaction_system(1.0, Defuzzification::Centroid).unwrap())
    }

    fn values(speed: f64, quality: f64) -> InputValues {
        [(SERVICE_SPEED.to_string(), speed), (FOOD_QUALITY.to_string(), quality)]
            .into_iter()
            .collect()
    }

    #[test]
    fn results_keep_submission_order() {
        let sys = system();
        let pool = BatchEvaluator::start(Arc::clone(&sys), 3, 4).unwrap();
        let inputs: Vec<InputValues> = (0..=10)
            .map(|i| values(f64::from(i), f64::from(10 - i)))
            .collect();
        let results = pool.evaluate_all(inputs.clone()).unwrap();
        assert_eq!(results.len(), inputs.len());
        for (vals, result) in inputs.iter().zip(results) {
            assert_eq!(result, sys.evaluate(vals).map(|e| e.output()));
        }
    }

    #[test]
    fn failures_stay_in_their_slot() {
        let pool = BatchEvaluator::start(system(), 2, 1).unwrap();
        let mut missing = InputValues::new();
        missing.insert(SERVICE_SPEED.to_string(), 5.0);
        let results = pool
            .evaluate_all(vec![values(5.0, 5.0), missing, values(-5.0, 20.0)])
            .unwrap();
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(EvaluationError::MissingInput { .. })));
        assert!(matches!(results[2], Err(EvaluationError::NoRuleFired { .. })));
    }

    #[test]
    fn empty_batch() {
        let pool = BatchEvaluator::start(system(), 0, 0).unwrap();
        assert_eq!(pool.workers(), 1);
        assert!(pool.evaluate_all(Vec::new()).unwrap().is_empty());
    }
}
