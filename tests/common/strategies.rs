//! Proptest strategies over catalogs and source layouts.

use proptest::prelude::*;

use super::fixtures::TAGGED_POOL;

/// Which pooled types a catalog lists.
pub fn catalog_mask_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), TAGGED_POOL)
}

/// For one to three sources, which pooled types each answers for.
pub fn source_answers_strategy() -> impl Strategy<Value = Vec<Vec<bool>>> {
    prop::collection::vec(prop::collection::vec(any::<bool>(), TAGGED_POOL), 1..4)
}

/// A source count plus, for every pooled type, the single source owning it.
pub fn disjoint_owners_strategy() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1usize..4).prop_flat_map(|sources| {
        (
            Just(sources),
            prop::collection::vec(0..sources, TAGGED_POOL),
        )
    })
}
