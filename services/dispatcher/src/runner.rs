//! The dispatch loop
//!
//! Iterates the prompt list cyclically forever: pick the next prompt, pair
//! it with whichever model and key are next in rotation, dispatch once, log
//! the outcome, sleep a randomized pacing delay, advance. Failures are
//! contained to their iteration — the loop never retries in place and never
//! stops on its own; termination is an external signal.

use std::convert::Infallible;
use std::time::Duration;

use rand::RngExt;
use rotation::{KeyRotator, ModelRotator};
use tracing::{info, trace, warn};

use crate::client::Dispatcher;
use crate::config::PacingConfig;

/// Loop phase. Dispatching always completes into the pacing wait, and the
/// wait always re-enters dispatching; there is no terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Dispatching,
    AwaitingDelay,
}

/// Pure phase transition, independent of dispatch outcome.
fn next_phase(phase: Phase) -> Phase {
    match phase {
        Phase::Idle | Phase::AwaitingDelay => Phase::Dispatching,
        Phase::Dispatching => Phase::AwaitingDelay,
    }
}

/// Uniform draw from the closed interval `[min_secs, max_secs]`.
fn sample_delay(min_secs: f64, max_secs: f64) -> Duration {
    let secs = rand::rng().random_range(min_secs..=max_secs);
    Duration::from_secs_f64(secs)
}

/// Owns the prompt list, both rotators, and the dispatcher for the lifetime
/// of the process.
#[derive(Debug)]
pub struct DispatchLoop {
    dispatcher: Dispatcher,
    keys: KeyRotator,
    models: ModelRotator,
    prompts: Vec<String>,
    min_delay_secs: f64,
    max_delay_secs: f64,
    iterations: u64,
    failures: u64,
}

impl DispatchLoop {
    /// Build the loop. Fails if the prompt list is empty; a single prompt is
    /// valid and is dispatched repeatedly with rotating key/model.
    pub fn new(
        dispatcher: Dispatcher,
        keys: KeyRotator,
        models: ModelRotator,
        prompts: Vec<String>,
        pacing: &PacingConfig,
    ) -> common::Result<Self> {
        if prompts.is_empty() {
            return Err(common::Error::Config("prompt list is empty".into()));
        }
        Ok(Self {
            dispatcher,
            keys,
            models,
            prompts,
            min_delay_secs: pacing.min_delay_secs,
            max_delay_secs: pacing.max_delay_secs,
            iterations: 0,
            failures: 0,
        })
    }

    /// One iteration: select, dispatch, log, and return the next prompt
    /// index. The index advances unconditionally — a failed dispatch moves
    /// on to the next prompt exactly like a successful one.
    async fn run_once(&mut self, index: usize) -> usize {
        let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
        let prompt = &self.prompts[index];
        let model = self.models.next();

        info!(
            request_id = %request_id,
            prompt_index = index,
            prompt = %prompt,
            model = %model,
            "dispatching prompt"
        );

        match self
            .dispatcher
            .dispatch(&mut self.keys, prompt, model, &request_id)
            .await
        {
            Ok(answer) => {
                info!(request_id = %request_id, answer = %answer.trim(), "answer received");
            }
            Err(e) => {
                self.failures += 1;
                warn!(request_id = %request_id, error = %e, "dispatch failed, moving on");
            }
        }
        self.iterations += 1;

        (index + 1) % self.prompts.len()
    }

    /// Run forever. The only suspension points are the in-flight request and
    /// the pacing sleep between iterations.
    pub async fn run(mut self) -> Infallible {
        info!(
            prompts = self.prompts.len(),
            keys = self.keys.len(),
            models = self.models.len(),
            "dispatch loop started"
        );

        let mut phase = Phase::Idle;
        let mut index = 0usize;
        loop {
            phase = next_phase(phase);
            trace!(?phase, "loop phase");
            index = self.run_once(index).await;

            phase = next_phase(phase);
            trace!(?phase, "loop phase");
            let delay = sample_delay(self.min_delay_secs, self.max_delay_secs);
            info!(
                iterations = self.iterations,
                failures = self.failures,
                delay_secs = delay.as_secs_f64(),
                "pacing delay before next prompt"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
