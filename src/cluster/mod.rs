//! Topic clustering over post titles
//!
//! TF-IDF features followed by k-means with deterministic farthest-point
//! seeding, so the same titles always produce the same topics.

pub mod tfidf;

use serde::Serialize;
use tracing::{debug, warn};

const MAX_ITERATIONS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub id: usize,
    /// Highest-weighted centroid terms, strongest first
    pub keywords: Vec<String>,
    /// Positions of member texts in the input slice
    pub indices: Vec<usize>,
    pub count: usize,
}

/// Group `texts` into at most `k` clusters; empty clusters are omitted
pub fn cluster_texts(
    texts: &[String],
    k: usize,
    max_features: usize,
    keywords_per_cluster: usize,
) -> Vec<Cluster> {
    if texts.is_empty() || k == 0 {
        return Vec::new();
    }

    let matrix = tfidf::fit_transform(texts, max_features);
    if matrix.features.is_empty() {
        warn!("Clustering skipped: empty vocabulary after stop-word removal");
        return Vec::new();
    }

    let k = k.min(texts.len());
    let (labels, centroids) = kmeans(&matrix.rows, k);

    (0..k)
        .filter_map(|id| {
            let indices: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|(_, &label)| label == id)
                .map(|(i, _)| i)
                .collect();
            if indices.is_empty() {
                return None;
            }

            let mut order: Vec<usize> = (0..matrix.features.len()).collect();
            order.sort_by(|&a, &b| centroids[id][b].total_cmp(&centroids[id][a]).then(a.cmp(&b)));
            let keywords = order
                .into_iter()
                .take(keywords_per_cluster)
                .map(|i| matrix.features[i].clone())
                .collect();

            Some(Cluster {
                id,
                keywords,
                count: indices.len(),
                indices,
            })
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

/// First row, then repeatedly the row farthest from every chosen centroid
fn seed_centroids(rows: &[Vec<f64>], k: usize) -> Vec<Vec<f64>> {
    let mut centroids = vec![rows[0].clone()];
    let mut min_dist: Vec<f64> = rows.iter().map(|r| squared_distance(r, &rows[0])).collect();

    while centroids.len() < k {
        let mut next = 0;
        for (i, d) in min_dist.iter().enumerate() {
            if *d > min_dist[next] {
                next = i;
            }
        }
        centroids.push(rows[next].clone());
        for (i, r) in rows.iter().enumerate() {
            min_dist[i] = min_dist[i].min(squared_distance(r, &rows[next]));
        }
    }
    centroids
}

fn kmeans(rows: &[Vec<f64>], k: usize) -> (Vec<usize>, Vec<Vec<f64>>) {
    let dims = rows[0].len();
    let mut centroids = seed_centroids(rows, k);
    let mut labels: Vec<usize> = rows.iter().map(|r| nearest(r, &centroids)).collect();

    for iteration in 0..MAX_ITERATIONS {
        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (row, &label) in rows.iter().zip(&labels) {
            counts[label] += 1;
            for (s, v) in sums[label].iter_mut().zip(row) {
                *s += v;
            }
        }
        for (c, (sum, count)) in centroids.iter_mut().zip(sums.into_iter().zip(&counts)) {
            if *count > 0 {
                *c = sum.into_iter().map(|s| s / *count as f64).collect();
            }
        }

        let next: Vec<usize> = rows.iter().map(|r| nearest(r, &centroids)).collect();
        if next == labels {
            debug!("k-means converged after {} iterations", iteration + 1);
            break;
        }
        labels = next;
    }

    (labels, centroids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(cluster_texts(&[], 5, 1000, 5).is_empty());
        assert!(cluster_texts(&titles(&["the and of"]), 5, 1000, 5).is_empty());
    }

    #[test]
    fn test_separates_distinct_topics() {
        let texts = titles(&[
            "rust ownership explained",
            "chess opening traps",
            "rust ownership lifetimes",
            "chess opening gambit",
        ]);

        let clusters = cluster_texts(&texts, 2, 1000, 3);
        assert_eq!(clusters.len(), 2);

        let mut groups: Vec<Vec<usize>> = clusters.iter().map(|c| c.indices.clone()).collect();
        groups.sort();
        assert_eq!(groups, vec![vec![0, 2], vec![1, 3]]);

        let rust = clusters.iter().find(|c| c.indices.contains(&0)).unwrap();
        assert!(rust.keywords.iter().any(|k| k == "rust" || k == "ownership"));
        assert_eq!(rust.count, 2);
    }

    #[test]
    fn test_k_capped_by_input_size() {
        let texts = titles(&["cooking pasta", "cooking ramen"]);
        let clusters = cluster_texts(&texts, 5, 1000, 5);
        let total: usize = clusters.iter().map(|c| c.count).sum();
        assert!(clusters.len() <= 2);
        assert_eq!(total, 2);
    }

    #[test]
    fn test_deterministic() {
        let texts = titles(&["lofi beats", "lofi study", "news today", "news politics", "gaming"]);
        assert_eq!(cluster_texts(&texts, 3, 1000, 5), cluster_texts(&texts, 3, 1000, 5));
    }
}
