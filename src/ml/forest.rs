use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Hyper-parameters
// ---------------------------------------------------------------------------

/// Random forest settings. Defaults match a 50-tree forest seeded with 42.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub seed: u64,
    /// `None` grows each tree until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 50,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Regression tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    /// Rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// CART regression tree stored as an arena; node 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl RegressionTree {
    /// Grow a tree on the rows listed in `sample` (duplicates allowed, as
    /// produced by bootstrap sampling).
    ///
    /// Built iteratively with an explicit stack so deep trees cannot
    /// overflow the call stack.
    fn fit(x: &[Vec<f64>], y: &[f64], sample: Vec<usize>, params: &ForestParams) -> Self {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut stack: Vec<(usize, Vec<usize>, usize)> = vec![(0, sample, 0)];

        while let Some((node_id, rows, depth)) = stack.pop() {
            let value = mean_of(y, &rows);
            let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
            if depth_reached || rows.len() < params.min_samples_split.max(2) {
                nodes[node_id] = Node::Leaf { value };
                continue;
            }

            let Some(split) = best_split(x, y, &rows, params.min_samples_leaf.max(1)) else {
                nodes[node_id] = Node::Leaf { value };
                continue;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .into_iter()
                .partition(|&i| x[i][split.feature] <= split.threshold);

            let left = nodes.len();
            nodes.push(Node::Leaf { value: 0.0 });
            let right = nodes.len();
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[node_id] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            stack.push((right, right_rows, depth + 1));
            stack.push((left, left_rows, depth + 1));
        }

        RegressionTree { nodes }
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

fn mean_of(y: &[f64], rows: &[usize]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|&i| y[i]).sum::<f64>() / rows.len() as f64
}

/// Split maximising variance reduction, i.e. maximising
/// `sum_l^2 / n_l + sum_r^2 / n_r`. Thresholds sit halfway between adjacent
/// distinct values, so only the order of feature values matters.
///
/// Rows are bucketed per distinct feature value first; categorical codes
/// have few distinct values, which keeps each node linear in its row count.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    rows: &[usize],
    min_leaf: usize,
) -> Option<BestSplit> {
    let n = rows.len();
    let total: f64 = rows.iter().map(|&i| y[i]).sum();
    let parent_score = total * total / n as f64;
    let n_features = x[rows[0]].len();

    let mut best: Option<BestSplit> = None;

    for feature in 0..n_features {
        // value bits -> (value, sum of y, count)
        let mut buckets: HashMap<u64, (f64, f64, usize)> = HashMap::new();
        for &i in rows {
            let v = x[i][feature];
            let entry = buckets.entry(v.to_bits()).or_insert((v, 0.0, 0));
            entry.1 += y[i];
            entry.2 += 1;
        }
        if buckets.len() < 2 {
            continue;
        }
        let mut distinct: Vec<(f64, f64, usize)> = buckets.into_values().collect();
        distinct.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        let mut left_n = 0;
        for pair in distinct.windows(2) {
            let (lo, sum, count) = pair[0];
            let hi = pair[1].0;
            left_sum += sum;
            left_n += count;
            let right_n = n - left_n;
            if left_n < min_leaf || right_n < min_leaf {
                continue;
            }
            let right_sum = total - left_sum;
            let score =
                left_sum * left_sum / left_n as f64 + right_sum * right_sum / right_n as f64;
            let improves_parent = score > parent_score * (1.0 + 1e-12) + 1e-9;
            let beats_best = best.as_ref().map_or(true, |b| score > b.score);
            if improves_parent && beats_best {
                best = Some(BestSplit {
                    feature,
                    threshold: lo + (hi - lo) / 2.0,
                    score,
                });
            }
        }
    }

    best
}

// ---------------------------------------------------------------------------
// Forest
// ---------------------------------------------------------------------------

/// Bagged ensemble of regression trees.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Fit on a dense row-major matrix. Callers guarantee `x` is non-empty,
    /// rectangular and as long as `y`.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Self {
        let n = x.len();
        let n_features = x.first().map_or(0, Vec::len);
        let mut rng = StdRng::seed_from_u64(params.seed);

        let trees = (0..params.n_estimators.max(1))
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, sample, params)
            })
            .collect();

        RandomForest { trees, n_features }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// One estimate per tree, in tree order.
    pub fn predict_each(&self, features: &[f64]) -> Vec<f64> {
        self.trees.iter().map(|t| t.predict(features)).collect()
    }

    /// Mean of the per-tree estimates.
    pub fn predict(&self, features: &[f64]) -> f64 {
        let each = self.predict_each(features);
        each.iter().sum::<f64>() / each.len() as f64
    }
}
