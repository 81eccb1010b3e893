use async_trait::async_trait;

/// Trait for embedding providers: convert text to vectors
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Embedding dimensions
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts into vectors
    async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn embed_one(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut results = self.embed(&[text]).await?;
        results
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Empty embedding result"))
    }
}

// ── Feature-hashing provider (in-process, no model weights) ──

/// Bag-of-tokens embedding via signed feature hashing.
///
/// Texts sharing vocabulary ("skin", "pH", "dry", ...) land close together
/// under cosine similarity, which is all rule retrieval needs. Output vectors
/// are L2-normalised; an input with no tokens embeds to the zero vector.
pub struct HashedEmbedding {
    dims: usize,
    seed: u64,
}

impl HashedEmbedding {
    pub fn new(dims: usize) -> Self {
        Self {
            dims: dims.max(1),
            seed: 0,
        }
    }

    pub fn with_seed(dims: usize, seed: u64) -> Self {
        Self {
            dims: dims.max(1),
            seed,
        }
    }

    fn fnv1a64(seed: u64, bytes: &[u8]) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325 ^ seed;
        for &b in bytes {
            hash ^= u64::from(b);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash
    }

    fn splitmix64(mut x: u64) -> u64 {
        x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = x;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !(c.is_alphanumeric() || c == '.' || c == '-'))
            .map(|token| token.trim_matches(|c| c == '.' || c == '-'))
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; self.dims];
        for token in Self::tokens(text) {
            let hash = Self::fnv1a64(self.seed, token.as_bytes());
            let slot = (hash % self.dims as u64) as usize;
            let sign = if Self::splitmix64(hash) & 1 == 0 {
                1.0
            } else {
                -1.0
            };
            v[slot] += sign;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashedEmbedding {
    fn name(&self) -> &str {
        "hashed"
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

// ── Noop provider (keyword-only fallback) ────────────────────

pub struct NoopEmbedding;

#[async_trait]
impl EmbeddingProvider for NoopEmbedding {
    fn name(&self) -> &str {
        "none"
    }

    fn dimensions(&self) -> usize {
        0
    }

    async fn embed(&self, _texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(Vec::new())
    }
}

pub fn create_embedding_provider(provider: &str, dims: usize) -> Box<dyn EmbeddingProvider> {
    match provider {
        "hashed" => Box::new(HashedEmbedding::new(dims)),
        "none" => Box::new(NoopEmbedding),
        other => {
            tracing::warn!("Unknown embedding provider '{other}', falling back to none");
            Box::new(NoopEmbedding)
        }
    }
}
