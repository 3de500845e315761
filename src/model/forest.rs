//! Tree-ensemble regressor read from a JSON dump of scikit-learn tree arrays.
//!
//! ```json
//! {"n_features": 37,
//!  "trees": [{"children_left": [1, -1, -1], "children_right": [2, -1, -1],
//!             "feature": [2, -2, -2], "threshold": [4.0, -2.0, -2.0],
//!             "value": [0.0, 30.0, 90.0]}]}
//! ```
//!
//! `-1` in `children_left` marks a leaf. A sample goes left when
//! `x[feature] <= threshold`. The ensemble output is the mean over trees.

use serde::Deserialize;
use std::path::Path;

use super::Regressor;
use crate::error::{ModelLoadError, PredictionError};

const LEAF: i64 = -1;

#[derive(Debug, Deserialize)]
struct TreeArrays {
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ForestJson {
    n_features: usize,
    trees: Vec<TreeArrays>,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    Leaf(f64),
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn eval(&self, x: &[f32]) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf(v) => return v,
                Node::Split { feature, threshold, left, right } => {
                    // f32 inputs are widened, never the f64 threshold narrowed
                    i = if f64::from(x[feature]) <= threshold { left } else { right };
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct ForestModel {
    n_features: usize,
    trees: Vec<Tree>,
}

impl ForestModel {
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let txt = std::fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&txt).map_err(|reason| ModelLoadError::Corrupt {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_json(txt: &str) -> Result<Self, String> {
        let raw: ForestJson = serde_json::from_str(txt).map_err(|e| e.to_string())?;
        if raw.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        let trees = raw
            .trees
            .iter()
            .enumerate()
            .map(|(t, arrays)| {
                build_tree(arrays, raw.n_features).map_err(|e| format!("tree {}: {}", t, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            n_features: raw.n_features,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn build_tree(a: &TreeArrays, n_features: usize) -> Result<Tree, String> {
    let n = a.children_left.len();
    if n == 0 {
        return Err("empty tree".into());
    }
    if [a.children_right.len(), a.feature.len(), a.threshold.len(), a.value.len()]
        .iter()
        .any(|len| *len != n)
    {
        return Err("tree arrays differ in length".into());
    }

    // children must come after their parent, which also rules out cycles
    let child = |node: usize, c: i64| -> Result<usize, String> {
        usize::try_from(c)
            .ok()
            .filter(|c| *c > node && *c < n)
            .ok_or_else(|| format!("node {} has bad child index {}", node, c))
    };

    let mut nodes = Vec::with_capacity(n);
    for i in 0..n {
        let node = if a.children_left[i] == LEAF {
            Node::Leaf(a.value[i])
        } else {
            let feature = usize::try_from(a.feature[i])
                .ok()
                .filter(|f| *f < n_features)
                .ok_or_else(|| format!("node {} splits on feature {}", i, a.feature[i]))?;
            Node::Split {
                feature,
                threshold: a.threshold[i],
                left: child(i, a.children_left[i])?,
                right: child(i, a.children_right[i])?,
            }
        };
        nodes.push(node);
    }
    Ok(Tree { nodes })
}

impl Regressor for ForestModel {
    fn in_dim(&self) -> usize {
        self.n_features
    }

    fn forward(&self, x: &[f32]) -> Result<f64, PredictionError> {
        if x.len() != self.n_features {
            return Err(PredictionError::ShapeMismatch {
                expected: self.n_features,
                got: x.len(),
            });
        }
        let sum: f64 = self.trees.iter().map(|t| t.eval(x)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}
