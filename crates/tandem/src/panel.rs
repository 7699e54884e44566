//! Parallel evaluation of a text by a panel of independent judges.
//!
//! Each judge sees only the text and produces an [`Evaluation`]. Once every
//! judge has answered, a single aggregation pass summarizes the evaluations
//! into an [`AggregateVerdict`]. Aggregation never starts early and never
//! sees a partial set of evaluations.

use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::message::Message;
use crate::prompt_template::load_prompt_file;
use crate::providers::base::{OutputSchema, Provider};

/// Number of independent judges consulted for each text
pub const DEFAULT_JUDGES: usize = 3;

const EVALUATOR_PROMPT: &str = "You are an expert evaluator. Provided with a text, you will evaluate if it's appropriate for a general audience.";
const AGGREGATOR_PROMPT: &str = "You are an expert evaluator. Provided with a list of evaluations, you will summarize them and provide a final evaluation.";

/// A single judge's verdict on a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Evaluation {
    pub is_appropriate: bool,
    pub explanation: String,
}

/// The combined verdict over a full set of evaluations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AggregateVerdict {
    pub is_appropriate: bool,
    pub summary: String,
}

/// The evaluations and final verdict produced for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelReport {
    pub evaluations: Vec<Evaluation>,
    pub verdict: AggregateVerdict,
}

/// Fans a text out to several judges and folds their answers into one verdict
pub struct Panel {
    provider: Box<dyn Provider>,
    judges: usize,
}

impl Panel {
    /// Create a panel with the default number of judges
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            provider,
            judges: DEFAULT_JUDGES,
        }
    }

    pub fn with_judges(mut self, judges: usize) -> Self {
        self.judges = judges;
        self
    }

    /// Evaluate the text with all judges at once, then aggregate.
    ///
    /// The judge calls run concurrently on the same task. Aggregation only
    /// runs after every judge has answered, and any judge failure fails the
    /// whole run.
    pub async fn run(&self, text: &str) -> Result<PanelReport> {
        tracing::debug!(judges = self.judges, "starting evaluation panel");
        let futures: Vec<_> = (0..self.judges).map(|_| self.evaluate(text)).collect();
        let evaluations: Vec<Evaluation> = futures::future::join_all(futures)
            .await
            .into_iter()
            .collect::<Result<_>>()?;

        let verdict = self.aggregate(&evaluations).await?;
        Ok(PanelReport {
            evaluations,
            verdict,
        })
    }

    /// Like [`run`](Self::run), but never holds more than `pool_size` judge
    /// calls in flight at a time
    pub async fn run_pooled(&self, text: &str, pool_size: usize) -> Result<PanelReport> {
        // A pool of zero would never make progress
        let pool_size = pool_size.max(1);
        tracing::debug!(
            judges = self.judges,
            pool_size,
            "starting pooled evaluation panel"
        );
        let evaluations: Vec<Evaluation> =
            stream::iter((0..self.judges).map(|_| self.evaluate(text)))
                .buffer_unordered(pool_size)
                .try_collect()
                .await?;

        let verdict = self.aggregate(&evaluations).await?;
        Ok(PanelReport {
            evaluations,
            verdict,
        })
    }

    async fn evaluate(&self, text: &str) -> Result<Evaluation> {
        let mut context = HashMap::new();
        context.insert("text", text);
        let prompt = load_prompt_file("evaluate.md", &context)?;

        let output = OutputSchema::new::<Evaluation>("evaluation");
        let (message, _) = self
            .provider
            .complete_structured(EVALUATOR_PROMPT, &[Message::user().with_text(prompt)], &output)
            .await?;
        parse_structured(&message)
    }

    async fn aggregate(&self, evaluations: &[Evaluation]) -> Result<AggregateVerdict> {
        let mut context = HashMap::new();
        context.insert("evaluations", evaluations);
        let prompt = load_prompt_file("aggregate.md", &context)?;

        let output = OutputSchema::new::<AggregateVerdict>("verdict");
        let (message, _) = self
            .provider
            .complete_structured(AGGREGATOR_PROMPT, &[Message::user().with_text(prompt)], &output)
            .await?;
        parse_structured(&message)
    }
}

fn parse_structured<T: DeserializeOwned>(message: &Message) -> Result<T> {
    let text = message.text();
    serde_json::from_str(&text)
        .map_err(|e| anyhow!("Invalid structured response: {}: {}", e, text))
}
