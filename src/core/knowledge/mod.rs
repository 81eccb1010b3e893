pub mod embeddings;
pub mod retrieval;
pub mod rules;
pub mod seed;
pub mod snapshot;
pub mod vector;

pub use embeddings::{
    EmbeddingProvider, HashedEmbedding, NoopEmbedding, create_embedding_provider,
};
pub use retrieval::{
    EmbeddingIndex, HybridRetriever, KeywordRetriever, RetrievalChain, RetrievalOutcome,
    RuleRetriever, SimilarityIndex, SimilarityMatch,
};
pub use rules::{Condition, CorrectionAction, CorrectionRule, RankedRule, Selector};
pub use snapshot::{KnowledgeHandle, KnowledgeSnapshot};
