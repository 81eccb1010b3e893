use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::embeddings::EmbeddingProvider;
use super::rules::RankedRule;
use super::snapshot::KnowledgeSnapshot;
use super::vector::{cosine_similarity, hybrid_score};
use crate::core::profile::UserProfile;
use crate::error::RetrievalError;

/// Relevance assigned to every condition match on the keyword path.
pub const KEYWORD_MATCH_RELEVANCE: f64 = 0.9;

/// One hit from a similarity search, keyed by rule id.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub id: String,
    pub score: f32,
}

/// Nearest-neighbour search over rule descriptions. May live out of process.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    fn name(&self) -> &str;

    async fn query(&self, text: &str, limit: usize) -> anyhow::Result<Vec<SimilarityMatch>>;
}

struct IndexState {
    version: u64,
    entries: Vec<(String, Vec<f32>)>,
}

/// In-process similarity index: rule documents embedded once per snapshot.
pub struct EmbeddingIndex {
    provider: Arc<dyn EmbeddingProvider>,
    state: ArcSwap<IndexState>,
}

impl EmbeddingIndex {
    pub async fn build(
        provider: Arc<dyn EmbeddingProvider>,
        snapshot: &KnowledgeSnapshot,
    ) -> anyhow::Result<Self> {
        let state = embed_rules(provider.as_ref(), snapshot).await?;
        Ok(Self {
            provider,
            state: ArcSwap::from_pointee(state),
        })
    }

    /// Re-embed the rules of a newer snapshot and swap the vectors in.
    pub async fn rebuild(&self, snapshot: &KnowledgeSnapshot) -> anyhow::Result<()> {
        let state = embed_rules(self.provider.as_ref(), snapshot).await?;
        self.state.store(Arc::new(state));
        Ok(())
    }

    pub fn version(&self) -> u64 {
        self.state.load().version
    }
}

async fn embed_rules(
    provider: &dyn EmbeddingProvider,
    snapshot: &KnowledgeSnapshot,
) -> anyhow::Result<IndexState> {
    let documents: Vec<String> = snapshot.rules.iter().map(|r| r.document()).collect();
    let texts: Vec<&str> = documents.iter().map(String::as_str).collect();
    let vectors = provider.embed(&texts).await?;
    if vectors.len() != texts.len() {
        anyhow::bail!(
            "embedding provider {} returned {} vectors for {} rules",
            provider.name(),
            vectors.len(),
            texts.len()
        );
    }

    let entries = snapshot
        .rules
        .iter()
        .map(|rule| rule.id.clone())
        .zip(vectors)
        .collect();
    Ok(IndexState {
        version: snapshot.version,
        entries,
    })
}

#[async_trait]
impl SimilarityIndex for EmbeddingIndex {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn query(&self, text: &str, limit: usize) -> anyhow::Result<Vec<SimilarityMatch>> {
        let query = self.provider.embed_one(text).await?;
        let state = self.state.load();

        let mut matches: Vec<SimilarityMatch> = state
            .entries
            .iter()
            .map(|(id, vector)| SimilarityMatch {
                id: id.clone(),
                score: cosine_similarity(&query, vector),
            })
            .collect();
        // Stable sort keeps declaration order among equal scores.
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        matches.truncate(limit);
        Ok(matches)
    }
}

/// A strategy that ranks knowledge-base rules for a profile.
#[async_trait]
pub trait RuleRetriever: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the backend can be tried for this request at all.
    fn available(&self) -> bool {
        true
    }

    async fn retrieve(
        &self,
        snapshot: &KnowledgeSnapshot,
        profile: &UserProfile,
        top_k: usize,
    ) -> Result<Vec<RankedRule>, RetrievalError>;
}

/// Deterministic fallback: a rule matches iff its condition holds.
/// Ordered by declared priority (desc), then declaration order.
pub struct KeywordRetriever;

impl KeywordRetriever {
    pub fn rank(snapshot: &KnowledgeSnapshot, profile: &UserProfile, top_k: usize) -> Vec<RankedRule> {
        let mut matched: Vec<&super::rules::CorrectionRule> = snapshot
            .rules
            .iter()
            .filter(|rule| rule.condition.evaluate(profile))
            .collect();
        matched.sort_by_key(|rule| std::cmp::Reverse(rule.priority));
        matched
            .into_iter()
            .take(top_k)
            .map(|rule| RankedRule {
                rule: rule.clone(),
                relevance: KEYWORD_MATCH_RELEVANCE,
            })
            .collect()
    }
}

#[async_trait]
impl RuleRetriever for KeywordRetriever {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn retrieve(
        &self,
        snapshot: &KnowledgeSnapshot,
        profile: &UserProfile,
        top_k: usize,
    ) -> Result<Vec<RankedRule>, RetrievalError> {
        Ok(Self::rank(snapshot, profile, top_k))
    }
}

/// Primary strategy: similarity over rule documents fused with an exact
/// condition-match score.
///
/// Exact matches are weighted so they always outrank similarity-only hits,
/// which keeps every rule the keyword path would return inside the top-K here
/// too (as long as no more than K rules match).
pub struct HybridRetriever {
    index: Arc<dyn SimilarityIndex>,
    vector_weight: f32,
    keyword_weight: f32,
}

impl HybridRetriever {
    pub fn new(index: Arc<dyn SimilarityIndex>, vector_weight: f32, keyword_weight: f32) -> Self {
        Self {
            index,
            vector_weight,
            keyword_weight,
        }
    }
}

#[async_trait]
impl RuleRetriever for HybridRetriever {
    fn name(&self) -> &str {
        "hybrid"
    }

    async fn retrieve(
        &self,
        snapshot: &KnowledgeSnapshot,
        profile: &UserProfile,
        top_k: usize,
    ) -> Result<Vec<RankedRule>, RetrievalError> {
        let query = profile.query_text();
        let matches = self
            .index
            .query(&query, snapshot.rules.len())
            .await
            .map_err(|e| RetrievalError::Unavailable {
                backend: self.index.name().to_string(),
                message: e.to_string(),
            })?;

        let vector_scores: HashMap<&str, f32> = matches
            .iter()
            .map(|m| (m.id.as_str(), m.score))
            .collect();

        let mut scored: Vec<(usize, f32)> = snapshot
            .rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| {
                let vector = vector_scores.get(rule.id.as_str()).copied();
                let keyword = if rule.condition.evaluate(profile) {
                    1.0
                } else {
                    0.0
                };
                if vector.is_none() && keyword == 0.0 {
                    return None;
                }
                let score = hybrid_score(
                    vector.unwrap_or(0.0),
                    keyword,
                    self.vector_weight,
                    self.keyword_weight,
                );
                Some((index, score))
            })
            .collect();

        scored.sort_by(|(ia, sa), (ib, sb)| {
            sb.partial_cmp(sa)
                .unwrap_or(Ordering::Equal)
                .then_with(|| snapshot.rules[*ib].priority.cmp(&snapshot.rules[*ia].priority))
                .then_with(|| ia.cmp(ib))
        });
        scored.truncate(top_k);

        tracing::debug!(query = %query, hits = scored.len(), "hybrid rule retrieval");
        Ok(scored
            .into_iter()
            .map(|(index, score)| RankedRule {
                rule: snapshot.rules[index].clone(),
                relevance: f64::from(score),
            })
            .collect())
    }
}

/// Ranked rules plus how they were obtained.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    pub rules: Vec<RankedRule>,
    pub strategy: String,
    pub degraded: Vec<String>,
}

/// Ordered capability list: the first available strategy that answers within
/// the timeout wins; the keyword matcher is the unconditional last resort.
pub struct RetrievalChain {
    strategies: Vec<Arc<dyn RuleRetriever>>,
    timeout: Duration,
    top_k: usize,
}

impl RetrievalChain {
    pub fn new(strategies: Vec<Arc<dyn RuleRetriever>>, timeout: Duration, top_k: usize) -> Self {
        Self {
            strategies,
            timeout,
            top_k: top_k.max(1),
        }
    }

    pub fn keyword_only(top_k: usize) -> Self {
        Self::new(Vec::new(), Duration::ZERO, top_k)
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub async fn retrieve(
        &self,
        snapshot: &KnowledgeSnapshot,
        profile: &UserProfile,
    ) -> RetrievalOutcome {
        let mut degraded = Vec::new();

        for strategy in self.strategies.iter().filter(|s| s.available()) {
            let attempt =
                tokio::time::timeout(self.timeout, strategy.retrieve(snapshot, profile, self.top_k))
                    .await;
            let error = match attempt {
                Ok(Ok(rules)) => {
                    return RetrievalOutcome {
                        rules,
                        strategy: strategy.name().to_string(),
                        degraded,
                    };
                }
                Ok(Err(e)) => e,
                Err(_) => RetrievalError::Timeout {
                    backend: strategy.name().to_string(),
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                },
            };
            tracing::warn!(strategy = strategy.name(), error = %error, "rule retrieval degraded");
            degraded.push(error.to_string());
        }

        RetrievalOutcome {
            rules: KeywordRetriever::rank(snapshot, profile, self.top_k),
            strategy: "keyword".into(),
            degraded,
        }
    }
}
