use crate::config::SearchConfig;
use crate::indexer::models::Chunk;

pub const TEXT_MATCH_SCORE: i64 = 50;
pub const SYMBOL_MATCH_SCORE: i64 = 80;
pub const INTERNAL_PATH_PENALTY: i64 = -500;
pub const BOOST_PATH_SCORE: i64 = 600;

/// Additive keyword scorer with path-based boosts and penalties.
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    internal_prefixes: Vec<String>,
    boost_prefixes: Vec<String>,
}

impl Ranker {
    pub fn new(internal_prefixes: &[String], boost_prefixes: &[String]) -> Self {
        Self {
            internal_prefixes: lowercase_all(internal_prefixes),
            boost_prefixes: lowercase_all(boost_prefixes),
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(&config.internal_prefixes, &config.boost_prefixes)
    }

    pub fn score(&self, chunk: &Chunk, query: &str) -> i64 {
        let q = query.to_lowercase();
        let path = chunk.path.to_lowercase();
        let mut score = 0;

        if chunk.text.to_lowercase().contains(&q) {
            score += TEXT_MATCH_SCORE;
        }
        if chunk.symbol.to_lowercase().contains(&q) {
            score += SYMBOL_MATCH_SCORE;
        }
        if self.internal_prefixes.iter().any(|p| path.starts_with(p)) {
            score += INTERNAL_PATH_PENALTY;
        }
        if self.boost_prefixes.iter().any(|p| path.starts_with(p)) {
            score += BOOST_PATH_SCORE;
        }

        score
    }

    /// Score every chunk, keep the positive ones and return the best
    /// `top_k`, highest first. The sort is stable, so equal scores keep
    /// collection order.
    pub fn rank<'a>(&self, chunks: &'a [Chunk], query: &str, top_k: usize) -> Vec<(i64, &'a Chunk)> {
        let mut scored: Vec<(i64, &Chunk)> =
            chunks.iter().map(|c| (self.score(c, query), c)).collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .filter(|(score, _)| *score > 0)
            .take(top_k)
            .collect()
    }
}

/// Rank `chunks` against `query` using the configured path boosts.
pub fn rank<'a>(
    chunks: &'a [Chunk],
    query: &str,
    top_k: usize,
    config: &SearchConfig,
) -> Vec<(i64, &'a Chunk)> {
    Ranker::from_config(config).rank(chunks, query, top_k)
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}
