mod embedding;
mod strategic_tags;
mod vector_store;

pub use embedding::{cosine_similarity, embed, EmbeddingModel, HashEmbeddingModel};
pub use strategic_tags::{build_semantic_document, generate_strategic_tags};
pub use vector_store::{DisabledVectorStore, InMemoryVectorStore, VectorStore, VectorStoreError};
