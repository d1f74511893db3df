#![allow(dead_code)]

use collections_core::models::CompanyId;
use proptest::prelude::*;

/// Company id lists, possibly empty, possibly with duplicates
pub fn company_ids_strategy() -> impl Strategy<Value = Vec<CompanyId>> {
    prop::collection::vec(1i64..10_000, 0..1_000)
}

pub fn chunk_size_strategy() -> impl Strategy<Value = usize> {
    1usize..250
}
