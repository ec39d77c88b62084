use crate::indexer::models::Chunk;

/// Find chunks by symbol name, case-insensitively.
///
/// Exact matches win outright. Without any, chunks whose symbol contains or
/// ends with the query are returned in collection order, up to `top_k`.
pub fn find_by_symbol<'a>(chunks: &'a [Chunk], query: &str, top_k: usize) -> Vec<&'a Chunk> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }

    let exact: Vec<&Chunk> = chunks
        .iter()
        .filter(|c| c.symbol.to_lowercase() == q)
        .take(top_k)
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    chunks
        .iter()
        .filter(|c| {
            let symbol = c.symbol.to_lowercase();
            symbol.contains(&q) || symbol.ends_with(&q)
        })
        .take(top_k)
        .collect()
}

/// Case-insensitive substring scan over chunk text, in collection order,
/// capped at `limit` hits.
pub fn grep<'a>(chunks: &'a [Chunk], keyword: &str, limit: usize) -> Vec<&'a Chunk> {
    let kw = keyword.to_lowercase();
    chunks
        .iter()
        .filter(|c| c.text.to_lowercase().contains(&kw))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::models::ChunkKind;

    fn chunk(symbol: &str, text: &str) -> Chunk {
        Chunk {
            path: "agents/promo.py".to_string(),
            symbol: symbol.to_string(),
            kind: ChunkKind::Function,
            start_line: 1,
            end_line: 2,
            text: text.to_string(),
        }
    }

    fn chunks() -> Vec<Chunk> {
        vec![
            chunk("respond_node", "def respond_node(state):"),
            chunk("respond_node.bundle_score", "def bundle_score(a, b):"),
            chunk("Bundle_Score", "class Bundle_Score:"),
            chunk("score_bundle", "def score_bundle(): return PRODUCT_ID"),
        ]
    }

    #[test]
    fn test_exact_match_wins() {
        let chunks = chunks();
        let hits = find_by_symbol(&chunks, " bundle_score ", 5);
        let symbols: Vec<&str> = hits.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Bundle_Score"]);
    }

    #[test]
    fn test_partial_match_in_order() {
        let chunks = chunks();
        let hits = find_by_symbol(&chunks, "node", 5);
        let symbols: Vec<&str> = hits.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["respond_node", "respond_node.bundle_score"]);

        let capped = find_by_symbol(&chunks, "score", 2);
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].symbol, "respond_node.bundle_score");
    }

    #[test]
    fn test_empty_query_finds_nothing() {
        assert!(find_by_symbol(&chunks(), "   ", 5).is_empty());
        assert!(find_by_symbol(&chunks(), "missing", 5).is_empty());
    }

    #[test]
    fn test_grep_case_insensitive_and_capped() {
        let chunks = chunks();
        let hits = grep(&chunks, "product_id", 25);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].symbol, "score_bundle");

        let capped = grep(&chunks, "def", 2);
        let symbols: Vec<&str> = capped.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["respond_node", "respond_node.bundle_score"]);
    }
}
