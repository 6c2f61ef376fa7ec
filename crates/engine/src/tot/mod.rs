//! Tree of Thoughts reasoning.
//!
//! The tree is grown level by level as a beam search: every level is
//! generated and scored by the model, and only the two best thoughts of the
//! previous level are expanded. The answer is synthesised from the greedy
//! best path through the finished tree.

pub mod parse;

use crate::generator::Generator;
use futures::future::join_all;
use lectern_core::{preview, AppError, AppResult};
use lectern_prompt::ids;
use parse::{parse_rationale, parse_score, parse_thoughts, DEFAULT_SCORE};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Thoughts expanded per level.
pub const BEAM_WIDTH: usize = 2;
pub const MAX_DEPTH_LIMIT: usize = 5;
pub const MAX_BRANCHING_LIMIT: usize = 5;

/// Returned when the final synthesis call fails.
pub const FINAL_ANSWER_APOLOGY: &str =
    "Sorry, an error occurred while generating the final answer.";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    pub id: String,
    pub depth: usize,
    pub content: String,
    /// 0..=30
    pub score: u8,
    pub rationale: String,
    /// Indices into the owning tree
    pub children: Vec<usize>,
    #[serde(skip)]
    pub parent: Option<usize>,
}

/// Arena of thoughts; each node has at most one parent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThoughtTree {
    nodes: Vec<Thought>,
}

impl ThoughtTree {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Thought> {
        self.nodes.get(index)
    }

    pub fn thoughts(&self) -> &[Thought] {
        &self.nodes
    }

    /// Indices of all thoughts at `depth`, in insertion order.
    pub fn level(&self, depth: usize) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.nodes[i].depth == depth)
            .collect()
    }

    fn push(&mut self, parent: Option<usize>, depth: usize, scored: ScoredThought) -> usize {
        let ordinal = self.nodes.iter().filter(|t| t.depth == depth).count();
        let index = self.nodes.len();
        self.nodes.push(Thought {
            id: format!("{}-{}", depth, ordinal),
            depth,
            content: scored.content,
            score: scored.score,
            rationale: scored.rationale,
            children: Vec::new(),
            parent,
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(index);
        }
        index
    }

    /// Up to `width` highest-scored thoughts at `depth`; ties keep the
    /// earlier node.
    pub fn beam(&self, depth: usize, width: usize) -> Vec<usize> {
        let mut level = self.level(depth);
        level.sort_by(|&a, &b| self.nodes[b].score.cmp(&self.nodes[a].score));
        level.truncate(width);
        level
    }

    /// Greedy walk from the root level: best thought, then its best child.
    pub fn best_path(&self, max_depth: usize) -> Vec<usize> {
        let mut path = Vec::new();
        let mut candidates = self.level(0);

        while path.len() < max_depth {
            let best = candidates
                .iter()
                .copied()
                .reduce(|best, i| if self.nodes[i].score > self.nodes[best].score { i } else { best });
            let Some(best) = best else { break };
            path.push(best);
            candidates = self.nodes[best].children.clone();
        }

        path
    }
}

/// A generated thought with its evaluation, before it enters the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredThought {
    pub content: String,
    pub score: u8,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtTreeReport {
    pub problem: String,
    pub context: String,
    pub thoughts: Vec<Thought>,
    pub best_path: Vec<Thought>,
    pub final_answer: String,
    pub total_thoughts: usize,
    pub max_depth: usize,
    pub branching_factor: usize,
    pub processing_time_ms: u64,
}

pub struct TreeOfThoughts {
    generator: Generator,
    max_depth: usize,
    branching_factor: usize,
}

impl TreeOfThoughts {
    pub fn new(generator: Generator, max_depth: usize, branching_factor: usize) -> AppResult<Self> {
        if !(1..=MAX_DEPTH_LIMIT).contains(&max_depth) {
            return Err(AppError::validation(
                "maxDepth",
                format!("must be between 1 and {}", MAX_DEPTH_LIMIT),
            ));
        }
        if !(1..=MAX_BRANCHING_LIMIT).contains(&branching_factor) {
            return Err(AppError::validation(
                "branchingFactor",
                format!("must be between 1 and {}", MAX_BRANCHING_LIMIT),
            ));
        }
        Ok(Self {
            generator,
            max_depth,
            branching_factor,
        })
    }

    /// Ask for `branching_factor` candidate approaches. Empty only when the
    /// provider call fails.
    pub async fn generate_thoughts(&self, problem: &str, context: &str, depth: usize) -> Vec<String> {
        let result = self
            .generator
            .generate(
                ids::TOT_GENERATE,
                &[
                    ("problem", problem.to_string()),
                    ("context", context.to_string()),
                    ("depth", depth.to_string()),
                    ("maxDepth", self.max_depth.to_string()),
                    ("branchingFactor", self.branching_factor.to_string()),
                ],
                Vec::new(),
            )
            .await;

        match result {
            Ok(response) => {
                let thoughts = parse_thoughts(&response, self.branching_factor);
                debug!(depth, count = thoughts.len(), "Generated thoughts");
                thoughts
            }
            Err(e) => {
                warn!(depth, error = %e, "Thought generation failed");
                Vec::new()
            }
        }
    }

    /// Score every thought concurrently; sorted best first.
    ///
    /// A failed or unparseable evaluation scores [`DEFAULT_SCORE`].
    pub async fn evaluate_thoughts(
        &self,
        thoughts: Vec<String>,
        problem: &str,
        context: &str,
    ) -> Vec<ScoredThought> {
        let mut scored = join_all(
            thoughts
                .into_iter()
                .map(|thought| self.evaluate_one(thought, problem, context)),
        )
        .await;

        // Stable: equal scores keep generation order
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    async fn evaluate_one(&self, thought: String, problem: &str, context: &str) -> ScoredThought {
        let result = self
            .generator
            .generate(
                ids::TOT_EVALUATE,
                &[
                    ("problem", problem.to_string()),
                    ("context", context.to_string()),
                    ("thought", thought.clone()),
                ],
                Vec::new(),
            )
            .await;

        match result {
            Ok(response) => {
                let score = parse_score(&response).unwrap_or_else(|| {
                    warn!(thought = %preview(&thought, 40), "No score in evaluation, using default");
                    DEFAULT_SCORE
                });
                ScoredThought {
                    content: thought,
                    score,
                    rationale: parse_rationale(&response),
                }
            }
            Err(e) => {
                warn!(error = %e, "Thought evaluation failed, using default score");
                ScoredThought {
                    content: thought,
                    score: DEFAULT_SCORE,
                    rationale: String::new(),
                }
            }
        }
    }

    /// Grow the tree to `max_depth` levels with a beam of [`BEAM_WIDTH`].
    pub async fn build_tree(&self, problem: &str, context: &str) -> ThoughtTree {
        let mut tree = ThoughtTree::default();

        let roots = self.generate_thoughts(problem, context, 0).await;
        for scored in self.evaluate_thoughts(roots, problem, context).await {
            tree.push(None, 0, scored);
        }

        for depth in 1..self.max_depth {
            let beam = tree.beam(depth - 1, BEAM_WIDTH);
            if beam.is_empty() {
                break;
            }

            for parent in beam {
                let child_context = format!(
                    "{}\n\nPrevious thought: {}",
                    context, tree.nodes[parent].content
                );
                let children = self.generate_thoughts(problem, &child_context, depth).await;
                // Children are judged against the original context
                for scored in self.evaluate_thoughts(children, problem, context).await {
                    tree.push(Some(parent), depth, scored);
                }
            }
        }

        info!(total_thoughts = tree.len(), "Thought tree built");
        tree
    }

    /// Synthesise the answer from the best path; never fails.
    pub async fn final_answer(&self, problem: &str, context: &str, path: &[&Thought]) -> String {
        let path_summary = path
            .iter()
            .enumerate()
            .map(|(i, t)| format!("Step {}: {} (score: {}/30)", i + 1, t.content, t.score))
            .collect::<Vec<_>>()
            .join("\n");

        let result = self
            .generator
            .generate(
                ids::TOT_FINAL,
                &[
                    ("problem", problem.to_string()),
                    ("context", context.to_string()),
                    ("pathSummary", path_summary),
                ],
                Vec::new(),
            )
            .await;

        match result {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "Final answer generation failed");
                FINAL_ANSWER_APOLOGY.to_string()
            }
        }
    }

    /// Build the tree, pick the best path and answer from it.
    pub async fn run(&self, problem: &str, context: &str) -> ThoughtTreeReport {
        let start = Instant::now();
        info!(
            problem = %preview(problem, 50),
            max_depth = self.max_depth,
            branching_factor = self.branching_factor,
            "Running tree of thoughts"
        );

        let tree = self.build_tree(problem, context).await;
        let path: Vec<&Thought> = tree
            .best_path(self.max_depth)
            .into_iter()
            .filter_map(|i| tree.get(i))
            .collect();
        let final_answer = self.final_answer(problem, context, &path).await;
        let best_path: Vec<Thought> = path.into_iter().cloned().collect();

        ThoughtTreeReport {
            problem: problem.to_string(),
            context: context.to_string(),
            total_thoughts: tree.len(),
            best_path,
            thoughts: tree.nodes,
            final_answer,
            max_depth: self.max_depth,
            branching_factor: self.branching_factor,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}
