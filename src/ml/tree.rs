//! Decision trees used by the ensembles.
//!
//! [`RegressionTree`] fits residuals for gradient boosting and splits on
//! variance reduction. [`ClassificationTree`] fits class labels for the random
//! forest and splits on Gini impurity decrease. Both share the same growth
//! procedure: at each node every candidate feature is sorted once and scanned
//! left to right with running statistics, so a node costs
//! `O(features · n log n)`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Splits must improve the criterion by more than this.
const MIN_GAIN: f64 = 1e-12;

/// A node of a binary decision tree with leaf payload `V`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode<V> {
    Leaf {
        value: V,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode<V>>,
        right: Box<TreeNode<V>>,
    },
}

impl<V> TreeNode<V> {
    /// Follow `features` down to a leaf. Values `<= threshold` go left.
    pub fn leaf(&self, features: &[f64]) -> &V {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Depth of the tree. A single leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Whether `check` holds for every leaf value.
    pub fn all_leaves(&self, check: &dyn Fn(&V) -> bool) -> bool {
        match self {
            TreeNode::Leaf { value } => check(value),
            TreeNode::Split { left, right, .. } => {
                left.all_leaves(check) && right.all_leaves(check)
            }
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Growth limits shared by both tree kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth, `None` for unlimited.
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may be split.
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split.
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Running statistics of the samples in a node.
trait NodeStats: Clone {
    fn add(&mut self, sample: usize);
    fn remove(&mut self, sample: usize);
    fn count(&self) -> usize;
    /// The criterion decrease of a split is
    /// `left.proxy() + right.proxy() - parent.proxy()`.
    fn proxy(&self) -> f64;
}

#[derive(Clone)]
struct VarianceStats<'a> {
    targets: &'a [f64],
    sum: f64,
    count: usize,
}

impl NodeStats for VarianceStats<'_> {
    fn add(&mut self, sample: usize) {
        self.sum += self.targets[sample];
        self.count += 1;
    }

    fn remove(&mut self, sample: usize) {
        self.sum -= self.targets[sample];
        self.count -= 1;
    }

    fn count(&self) -> usize {
        self.count
    }

    fn proxy(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum * self.sum / self.count as f64
        }
    }
}

#[derive(Clone)]
struct GiniStats<'a> {
    labels: &'a [usize],
    class_counts: Vec<usize>,
    sum_squares: usize,
    count: usize,
}

impl NodeStats for GiniStats<'_> {
    fn add(&mut self, sample: usize) {
        let class = self.labels[sample];
        self.sum_squares += 2 * self.class_counts[class] + 1;
        self.class_counts[class] += 1;
        self.count += 1;
    }

    fn remove(&mut self, sample: usize) {
        let class = self.labels[sample];
        self.sum_squares -= 2 * self.class_counts[class] - 1;
        self.class_counts[class] -= 1;
        self.count -= 1;
    }

    fn count(&self) -> usize {
        self.count
    }

    fn proxy(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum_squares as f64 / self.count as f64
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Grower<'a, 'r, S: NodeStats> {
    x: &'a [Vec<f64>],
    n_features: usize,
    params: TreeParams,
    empty: S,
    /// Random feature subsets of this size, drawn with `rng`.
    max_features: Option<usize>,
    rng: Option<&'r mut StdRng>,
}

impl<S: NodeStats> Grower<'_, '_, S> {
    fn stats_for(&self, indices: &[usize]) -> S {
        let mut stats = self.empty.clone();
        for &i in indices {
            stats.add(i);
        }
        stats
    }

    fn grow<V>(
        &mut self,
        indices: Vec<usize>,
        depth: usize,
        leaf_value: &dyn Fn(&[usize]) -> V,
    ) -> TreeNode<V> {
        let n = indices.len();
        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if depth_reached
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf.max(1)
        {
            return TreeNode::Leaf {
                value: leaf_value(&indices),
            };
        }

        let parent = self.stats_for(&indices);
        let Some(best) = self.find_best_split(&indices, &parent) else {
            return TreeNode::Leaf {
                value: leaf_value(&indices),
            };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.x[i][best.feature] <= best.threshold);

        let left = self.grow(left, depth + 1, leaf_value);
        let right = self.grow(right, depth + 1, leaf_value);

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn candidate_features(&mut self) -> (Vec<usize>, usize) {
        let mut features: Vec<usize> = (0..self.n_features).collect();
        match (self.max_features, self.rng.as_deref_mut()) {
            (Some(k), Some(rng)) => {
                features.shuffle(rng);
                (features, k.max(1))
            }
            _ => (features, self.n_features),
        }
    }

    /// Scan candidate features until `limit` non-constant ones were evaluated.
    fn find_best_split(&mut self, indices: &[usize], parent: &S) -> Option<BestSplit> {
        let (features, limit) = self.candidate_features();
        let parent_proxy = parent.proxy();
        let min_leaf = self.params.min_samples_leaf.max(1);

        let mut best: Option<BestSplit> = None;
        let mut visited = 0;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(indices.len());

        for feature in features {
            if visited >= limit {
                break;
            }

            sorted.clear();
            sorted.extend(indices.iter().map(|&i| (self.x[i][feature], i)));
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
                continue;
            };
            if first.0 == last.0 {
                continue;
            }
            visited += 1;

            let mut left = self.empty.clone();
            let mut right = parent.clone();

            for k in 1..sorted.len() {
                let (prev_value, prev_sample) = sorted[k - 1];
                left.add(prev_sample);
                right.remove(prev_sample);

                let value = sorted[k].0;
                if prev_value == value {
                    continue;
                }
                if left.count() < min_leaf || right.count() < min_leaf {
                    continue;
                }

                let gain = left.proxy() + right.proxy() - parent_proxy;
                if gain > MIN_GAIN && best.as_ref().is_none_or(|b| gain > b.gain) {
                    let mut threshold = prev_value + (value - prev_value) / 2.0;
                    if threshold >= value {
                        threshold = prev_value;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

fn n_features(x: &[Vec<f64>]) -> usize {
    x.first().map(Vec::len).unwrap_or(0)
}

/// Regression tree whose leaf values are supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode<f64>,
}

impl RegressionTree {
    /// Grow a tree on the rows `indices` of `x`, splitting on the variance of
    /// `targets`. `leaf_value` receives the sample indices of each leaf.
    pub fn fit(
        x: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        params: TreeParams,
        leaf_value: &dyn Fn(&[usize]) -> f64,
    ) -> Self {
        let mut grower = Grower {
            x,
            n_features: n_features(x),
            params,
            empty: VarianceStats {
                targets,
                sum: 0.0,
                count: 0,
            },
            max_features: None,
            rng: None,
        };

        RegressionTree {
            root: grower.grow(indices.to_vec(), 0, leaf_value),
        }
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        *self.root.leaf(features)
    }

    pub fn root(&self) -> &TreeNode<f64> {
        &self.root
    }
}

/// Classification tree storing the class distribution of each leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationTree {
    root: TreeNode<Vec<f64>>,
}

impl ClassificationTree {
    /// Grow a Gini tree on the rows `indices` of `x`. Indices may repeat, as
    /// they do in a bootstrap sample. Each split considers `max_features`
    /// randomly chosen features.
    pub fn fit(
        x: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
        indices: &[usize],
        params: TreeParams,
        max_features: usize,
        rng: &mut StdRng,
    ) -> Self {
        let leaf_value = |leaf: &[usize]| -> Vec<f64> {
            let mut distribution = vec![0.0; n_classes];
            for &i in leaf {
                distribution[labels[i]] += 1.0;
            }
            let total = leaf.len().max(1) as f64;
            distribution.iter_mut().for_each(|p| *p /= total);
            distribution
        };

        let mut grower = Grower {
            x,
            n_features: n_features(x),
            params,
            empty: GiniStats {
                labels,
                class_counts: vec![0; n_classes],
                sum_squares: 0,
                count: 0,
            },
            max_features: Some(max_features),
            rng: Some(rng),
        };

        ClassificationTree {
            root: grower.grow(indices.to_vec(), 0, &leaf_value),
        }
    }

    /// Class distribution of the leaf reached by `features`.
    pub fn predict_proba(&self, features: &[f64]) -> &[f64] {
        self.root.leaf(features)
    }

    pub fn root(&self) -> &TreeNode<Vec<f64>> {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn mean(targets: &[f64]) -> impl Fn(&[usize]) -> f64 + '_ {
        move |idx: &[usize]| idx.iter().map(|&i| targets[i]).sum::<f64>() / idx.len() as f64
    }

    #[test]
    fn test_regression_tree_separates_steps() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![10.0], vec![11.0], vec![12.0]];
        let y = vec![1.0, 1.0, 1.0, 5.0, 5.0, 5.0];
        let indices: Vec<usize> = (0..6).collect();

        let tree = RegressionTree::fit(&x, &y, &indices, TreeParams::default(), &mean(&y));

        assert_eq!(tree.root().depth(), 1);
        assert_eq!(tree.predict(&[1.5]), 1.0);
        assert_eq!(tree.predict(&[11.0]), 5.0);
        match tree.root() {
            TreeNode::Split { threshold, .. } => assert_eq!(*threshold, 6.0),
            TreeNode::Leaf { .. } => panic!("expected a split"),
        }
    }

    #[test]
    fn test_constant_targets_make_a_leaf() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0]];
        let y = vec![3.0, 3.0, 3.0];
        let tree = RegressionTree::fit(&x, &y, &[0, 1, 2], TreeParams::default(), &mean(&y));
        assert_eq!(tree.root().n_leaves(), 1);
        assert_eq!(tree.predict(&[100.0]), 3.0);
    }

    #[test]
    fn test_max_depth_and_min_leaf() {
        let x: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..8).map(|i| (i * i) as f64).collect();
        let indices: Vec<usize> = (0..8).collect();

        let params = TreeParams {
            max_depth: Some(2),
            min_samples_split: 2,
            min_samples_leaf: 2,
        };
        let tree = RegressionTree::fit(&x, &y, &indices, params, &mean(&y));
        assert!(tree.root().depth() <= 2);
        assert!(tree.root().n_leaves() <= 4);
    }

    #[test]
    fn test_classification_tree_is_pure_on_separable_data() {
        let x = vec![
            vec![0.0, 0.3],
            vec![0.1, 0.3],
            vec![0.2, 0.3],
            vec![0.9, 0.3],
            vec![1.0, 0.3],
            vec![0.8, 0.3],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let indices: Vec<usize> = (0..6).collect();
        let mut rng = StdRng::seed_from_u64(42);

        let params = TreeParams {
            max_depth: Some(10),
            min_samples_split: 2,
            min_samples_leaf: 1,
        };
        let tree = ClassificationTree::fit(&x, &labels, 2, &indices, params, 1, &mut rng);

        assert_eq!(tree.predict_proba(&[0.05, 0.3]), &[1.0, 0.0]);
        assert_eq!(tree.predict_proba(&[0.95, 0.3]), &[0.0, 1.0]);
    }

    #[test]
    fn test_bootstrap_duplicates_weight_the_leaf() {
        let x = vec![vec![0.0], vec![0.0]];
        let labels = vec![0, 1];
        let mut rng = StdRng::seed_from_u64(7);

        let tree = ClassificationTree::fit(
            &x,
            &labels,
            3,
            &[0, 0, 0, 1],
            TreeParams::default(),
            1,
            &mut rng,
        );

        assert_eq!(tree.predict_proba(&[0.0]), &[0.75, 0.25, 0.0]);
    }
}
