//! Property tests for index construction and top-k retrieval

mod common;

use std::sync::Arc;

use common::KeywordEmbedder;
use docqa::{Chunk, EmbedderId, Error, IndexBuilder, Retriever, VectorIndex};
use proptest::prelude::*;

const VOCABULARY: &[&str] = &["alpha", "beta", "gamma", "delta", "omega"];

fn arb_chunks() -> impl Strategy<Value = Vec<Chunk>> {
    proptest::collection::vec(
        proptest::collection::vec(proptest::sample::select(VOCABULARY), 1..8),
        1..20,
    )
    .prop_map(|docs| {
        docs.into_iter()
            .enumerate()
            .map(|(i, words)| Chunk::from_text(words.join(" "), i))
            .collect()
    })
}

/// **Top-k retrieval is bounded by k and by the index size**
mod prop_result_size {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn results_never_exceed_k_or_index_size(
            chunks in arb_chunks(),
            question in proptest::sample::select(VOCABULARY),
            k in 1usize..30,
        ) {
            let n = chunks.len();
            let embedder = Arc::new(KeywordEmbedder::new(VOCABULARY));

            let result = tokio_test::block_on(async {
                let index = IndexBuilder::new(embedder.clone()).build(chunks).await?;
                Retriever::new(embedder).search(&index, question, k).await
            })
            .unwrap();

            prop_assert_eq!(result.len(), k.min(n));
            for pair in result.hits().windows(2) {
                prop_assert!(pair[0].distance <= pair[1].distance);
            }
        }
    }
}

/// **Re-indexing the same chunks gives the same ranking**
mod prop_reindex_idempotent {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn rebuilt_index_ranks_identically(
            chunks in arb_chunks(),
            question in "(alpha|beta|gamma|delta|omega)( (alpha|beta|gamma|delta|omega)){0,3}",
            k in 1usize..10,
        ) {
            let embedder = Arc::new(KeywordEmbedder::new(VOCABULARY));
            let retriever = Retriever::new(embedder.clone());

            let (first, second) = tokio_test::block_on(async {
                let builder = IndexBuilder::new(embedder.clone());
                let a = builder.build(chunks.clone()).await?;
                let b = builder.build(chunks).await?;
                Ok::<_, Error>((
                    retriever.search(&a, &question, k).await?,
                    retriever.search(&b, &question, k).await?,
                ))
            })
            .unwrap();

            let order = |r: &docqa::RetrievalResult| {
                r.chunks().map(|c| c.metadata.chunk_index).collect::<Vec<_>>()
            };
            prop_assert_eq!(order(&first), order(&second));
        }
    }
}

#[tokio::test]
async fn search_on_empty_index_is_empty_index_error() {
    let embedder = Arc::new(KeywordEmbedder::new(VOCABULARY));
    let index = VectorIndex::new(EmbedderId::new("keyword", "bag-v1", VOCABULARY.len()));

    let err = Retriever::new(embedder.clone())
        .search(&index, "alpha", 3)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyIndex));
    assert_eq!(embedder.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn building_from_no_chunks_is_rejected() {
    let embedder = Arc::new(KeywordEmbedder::new(VOCABULARY));
    let err = IndexBuilder::new(embedder).build(Vec::new()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn exact_match_ranks_first() {
    let embedder = Arc::new(KeywordEmbedder::new(VOCABULARY));
    let chunks = vec![
        Chunk::from_text("alpha beta", 0),
        Chunk::from_text("gamma delta", 1),
        Chunk::from_text("omega", 2),
    ];
    let index = IndexBuilder::new(embedder.clone()).build(chunks).await.unwrap();

    let result = Retriever::new(embedder).search(&index, "omega", 1).await.unwrap();
    assert_eq!(result.texts(), vec!["omega"]);
    assert!(result.hits()[0].distance.abs() < 1e-6);
}
