//! Request-scoped memory retrieval over past interactions.
//!
//! The vector index is rebuilt on every call from the user's recent
//! history; nothing is shared across requests. Staleness is bounded at the
//! cost of latency, an accepted trade-off.

use sqlx::PgPool;
use uuid::Uuid;

use crate::gemini::GenerativeClient;
use crate::models::Interaction;

const HISTORY_WINDOW: i64 = 100;
const TOP_K: usize = 5;

pub const NO_MEMORY: &str = "No memory available.";
pub const MEMORY_UNAVAILABLE: &str = "Unable to retrieve relevant memory.";

#[derive(Debug, Clone)]
pub struct MemoryContext {
    pub text: String,
    pub degraded: bool,
}

/// Build a context snippet from the k most relevant prior interactions.
/// Degrades to a static string when there is no user, no history, or the
/// embedding call fails; `degraded` tells those cases apart from success.
pub async fn retrieve(
    ai: &dyn GenerativeClient,
    pool: &PgPool,
    user_id: Option<Uuid>,
    user_input: &str,
) -> MemoryContext {
    let Some(user_id) = user_id else {
        return MemoryContext {
            text: NO_MEMORY.to_string(),
            degraded: true,
        };
    };

    match build_context(ai, pool, user_id, user_input).await {
        Ok(Some(text)) => MemoryContext {
            text,
            degraded: false,
        },
        Ok(None) => MemoryContext {
            text: NO_MEMORY.to_string(),
            degraded: true,
        },
        Err(e) => {
            tracing::error!("❌ Memory retrieval failed: {}", e);
            MemoryContext {
                text: MEMORY_UNAVAILABLE.to_string(),
                degraded: true,
            }
        }
    }
}

async fn build_context(
    ai: &dyn GenerativeClient,
    pool: &PgPool,
    user_id: Uuid,
    user_input: &str,
) -> anyhow::Result<Option<String>> {
    let interactions = sqlx::query_as::<_, Interaction>(
        "SELECT id, user_id, message, response, created_at
         FROM interactions WHERE user_id = $1
         ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(HISTORY_WINDOW)
    .fetch_all(pool)
    .await?;

    if interactions.is_empty() {
        return Ok(None);
    }

    let documents: Vec<String> = interactions
        .iter()
        .map(|i| format!("User: {}\nAI: {}", i.message, i.response))
        .collect();

    let mut to_embed = documents.clone();
    to_embed.push(user_input.to_string());
    let mut vectors = ai.embed(&to_embed).await?;

    let query = vectors
        .pop()
        .ok_or_else(|| anyhow::anyhow!("embedding response was empty"))?;

    let retrieved: Vec<&str> = rank_by_distance(&query, &vectors, TOP_K)
        .into_iter()
        .map(|i| documents[i].as_str())
        .collect();

    Ok(Some(format!(
        "Relevant past interactions:\n\n{}",
        retrieved.join("\n\n")
    )))
}

/// Indices of the k documents closest to the query by L2 distance,
/// most similar first.
pub fn rank_by_distance(query: &[f32], documents: &[Vec<f32>], k: usize) -> Vec<usize> {
    let mut scored: Vec<(usize, f32)> = documents
        .iter()
        .enumerate()
        .map(|(i, doc)| (i, l2_distance(query, doc)))
        .collect();
    scored.sort_by(|a, b| a.1.total_cmp(&b.1));
    scored.truncate(k);
    scored.into_iter().map(|(i, _)| i).collect()
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ranks_closest_first() {
        let query = vec![0.0, 0.0];
        let docs = vec![
            vec![3.0, 4.0], // distance 5
            vec![0.0, 1.0], // distance 1
            vec![1.0, 1.0], // distance sqrt(2)
        ];
        assert_eq!(rank_by_distance(&query, &docs, 3), vec![1, 2, 0]);
    }

    #[test]
    fn caps_at_k() {
        let query = vec![0.0];
        let docs = vec![vec![1.0], vec![2.0], vec![3.0]];
        assert_eq!(rank_by_distance(&query, &docs, 2), vec![0, 1]);
    }

    #[test]
    fn empty_documents_yield_nothing() {
        let query = vec![0.0];
        assert!(rank_by_distance(&query, &[], 5).is_empty());
    }
}
