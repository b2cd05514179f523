//! Fixed demo corpus indexed on the first interaction of each session.

/// Six sentences covering AI/ML/RAG terminology.
pub const DEMO_CORPUS: [&str; 6] = [
    "Artificial Intelligence (AI) is a field of computer science focused on building smart machines capable of performing tasks that typically require human intelligence.",
    "Machine learning is a subset of AI that involves training algorithms on data so they can make predictions or decisions without being explicitly programmed.",
    "Deep learning is a type of machine learning that uses neural networks with many layers.",
    "Large Language Models (LLMs) are deep learning models that can understand and generate human language.",
    "Retrieval-Augmented Generation (RAG) combines document retrieval with generation for accurate and grounded responses.",
    "Pinecone is a vector database for storing and searching large collections of embeddings efficiently.",
];

/// The demo corpus as owned strings.
pub fn demo_corpus() -> Vec<String> {
    DEMO_CORPUS.iter().map(|s| s.to_string()).collect()
}
