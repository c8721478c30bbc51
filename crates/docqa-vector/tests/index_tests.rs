use docqa_core::traits::VectorIndex;
use docqa_core::types::Chunk;
use docqa_core::Error;
use docqa_vector::{cosine_similarity, InMemoryIndex};
use proptest::prelude::*;

fn chunk(i: usize) -> Chunk {
    Chunk { index: i, start: i * 10, end: i * 10 + 10, source: "doc.txt".to_string(), text: format!("chunk {}", i) }
}

fn index_with(vectors: Vec<Vec<f32>>) -> InMemoryIndex {
    let chunks = (0..vectors.len()).map(chunk).collect();
    let mut index = InMemoryIndex::new();
    index.insert_batch(chunks, vectors).expect("insert");
    index
}

#[test]
fn returns_nearest_in_descending_order() {
    let index = index_with(vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0], vec![-1.0, 0.0]]);
    let hits = index.search(&[1.0, 0.1], 3).unwrap();

    let ids: Vec<usize> = hits.iter().map(|h| h.entry_id).collect();
    assert_eq!(ids, vec![1, 2, 0]);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(hits[0].chunk.text, "chunk 1");
}

#[test]
fn ties_are_broken_by_insertion_order() {
    let index = index_with(vec![vec![0.0, 1.0], vec![2.0, 0.0], vec![1.0, 0.0], vec![3.0, 0.0]]);
    let hits = index.search(&[1.0, 0.0], 3).unwrap();
    let ids: Vec<usize> = hits.iter().map(|h| h.entry_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn fewer_entries_than_k() {
    let index = index_with(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 2);
    assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
}

#[test]
fn empty_index_returns_nothing() {
    let index = InMemoryIndex::new();
    assert!(index.is_empty());
    assert_eq!(index.dim(), None);
    assert!(index.search(&[1.0, 2.0, 3.0], 4).unwrap().is_empty());
}

#[test]
fn ids_continue_across_batches() {
    let mut index = index_with(vec![vec![1.0, 0.0]]);
    index.insert_batch(vec![chunk(1), chunk(2)], vec![vec![0.0, 1.0], vec![1.0, 1.0]]).unwrap();
    let ids: Vec<usize> = index.entries().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(index.len(), 3);
}

#[test]
fn mismatched_batch_leaves_index_untouched() {
    let mut index = index_with(vec![vec![1.0, 0.0]]);

    let err = index.insert_batch(vec![chunk(1), chunk(2)], vec![vec![0.0, 1.0]]).unwrap_err();
    assert!(matches!(err, Error::LengthMismatch { chunks: 2, vectors: 1 }));

    let err = index.insert_batch(vec![chunk(1), chunk(2)], vec![vec![0.0, 1.0], vec![1.0, 0.0, 0.0]]).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 3 }));

    assert_eq!(index.len(), 1);
}

#[test]
fn query_dimension_must_match() {
    let index = index_with(vec![vec![1.0, 0.0]]);
    let err = index.search(&[1.0, 0.0, 0.0], 1).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 2, actual: 3 }));
}

#[test]
fn fixed_dimension_applies_to_first_insert() {
    let mut index = InMemoryIndex::with_dim(3);
    let err = index.insert_batch(vec![chunk(0)], vec![vec![1.0, 0.0]]).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 2 }));
    assert!(index.is_empty());
}

proptest! {
    #[test]
    fn result_is_sorted_and_independent_of_insert_grouping(
        vectors in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 4), 1..40),
        query in prop::collection::vec(-1.0f32..1.0, 4),
        k in 0usize..12,
        split in 0usize..40,
    ) {
        let whole = index_with(vectors.clone());

        let split = split.min(vectors.len());
        let mut grouped = InMemoryIndex::new();
        grouped.insert_batch((0..split).map(chunk).collect(), vectors[..split].to_vec()).unwrap();
        grouped.insert_batch((split..vectors.len()).map(chunk).collect(), vectors[split..].to_vec()).unwrap();

        let a = whole.search(&query, k).unwrap();
        let b = grouped.search(&query, k).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.len(), k.min(vectors.len()));
        for w in a.windows(2) {
            prop_assert!(w[0].score > w[1].score || (w[0].score == w[1].score && w[0].entry_id < w[1].entry_id));
        }
    }

    #[test]
    fn top_k_matches_brute_force_scoring(
        vectors in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 3), 1..40),
        query in prop::collection::vec(-1.0f32..1.0, 3),
        k in 0usize..12,
    ) {
        let index = index_with(vectors.clone());
        let hits = index.search(&query, k).unwrap();

        let mut expected: Vec<(usize, f32)> =
            vectors.iter().enumerate().map(|(i, v)| (i, cosine_similarity(&query, v))).collect();
        expected.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        expected.truncate(k);

        let actual: Vec<(usize, f32)> = hits.iter().map(|h| (h.entry_id, h.score)).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn insertion_order_does_not_change_the_top_k(
        (vectors, order) in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 4), 1..30)
            .prop_flat_map(|vectors| {
                let order = Just((0..vectors.len()).collect::<Vec<usize>>()).prop_shuffle();
                (Just(vectors), order)
            }),
        query in prop::collection::vec(-1.0f32..1.0, 4),
        k in 1usize..10,
    ) {
        let original = index_with(vectors.clone());

        // chunk.index keeps the original position so hits can be mapped back
        let mut shuffled = InMemoryIndex::new();
        shuffled
            .insert_batch(order.iter().map(|&i| chunk(i)).collect(), order.iter().map(|&i| vectors[i].clone()).collect())
            .unwrap();

        let a = original.search(&query, k).unwrap();
        let b = shuffled.search(&query, k).unwrap();
        prop_assert_eq!(a.len(), b.len());

        let scores_a: Vec<f32> = a.iter().map(|h| h.score).collect();
        let scores_b: Vec<f32> = b.iter().map(|h| h.score).collect();
        prop_assert_eq!(&scores_a, &scores_b);

        for hit in &b {
            prop_assert_eq!(hit.score, cosine_similarity(&query, &vectors[hit.chunk.index]));
        }

        // without a tie straddling the cut, both runs select the same chunks
        let cut_is_tied = a.len() < vectors.len() && {
            let mut all: Vec<f32> = vectors.iter().map(|v| cosine_similarity(&query, v)).collect();
            all.sort_by(|x, y| y.total_cmp(x));
            all[a.len() - 1] == all[a.len()]
        };
        if !cut_is_tied {
            let mut set_a: Vec<usize> = a.iter().map(|h| h.chunk.index).collect();
            let mut set_b: Vec<usize> = b.iter().map(|h| h.chunk.index).collect();
            set_a.sort_unstable();
            set_b.sort_unstable();
            prop_assert_eq!(set_a, set_b);
        }
    }
}
