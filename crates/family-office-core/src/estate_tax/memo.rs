//! Caller-owned memoisation in front of an estate tax assessor.
//!
//! The calculator itself is stateless. A caller that evaluates the same
//! household repeatedly (a baseline shared by several what-ifs, a UI
//! re-rendering on every keystroke) can wrap it in a [`MemoizedAssessor`].
//! Results are keyed by the full input tuple and are identical to the
//! uncached ones.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::calculator::{EstateTaxAssessment, EstateTaxAssessor, Household};
use crate::tax_tables::EstateTaxConstants;
use crate::types::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssessmentKey {
    pub total_assets: Money,
    pub household: Household,
}

pub struct MemoizedAssessor<'a, A: EstateTaxAssessor + ?Sized> {
    inner: &'a A,
    memo: RefCell<HashMap<AssessmentKey, EstateTaxAssessment>>,
    hits: Cell<u64>,
}

impl<'a, A: EstateTaxAssessor + ?Sized> MemoizedAssessor<'a, A> {
    pub fn new(inner: &'a A) -> Self {
        Self {
            inner,
            memo: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
        }
    }

    /// Number of distinct inputs assessed so far.
    pub fn len(&self) -> usize {
        self.memo.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.borrow().is_empty()
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.get()
    }

    pub fn clear(&self) {
        self.memo.borrow_mut().clear();
        self.hits.set(0);
    }
}

impl<A: EstateTaxAssessor + ?Sized> EstateTaxAssessor for MemoizedAssessor<'_, A> {
    fn constants(&self) -> &EstateTaxConstants {
        self.inner.constants()
    }

    fn assess(&self, total_assets: Money, household: &Household) -> EstateTaxAssessment {
        let key = AssessmentKey {
            total_assets,
            household: *household,
        };

        if let Some(hit) = self.memo.borrow().get(&key) {
            self.hits.set(self.hits.get() + 1);
            return hit.clone();
        }

        let assessment = self.inner.assess(total_assets, household);
        self.memo.borrow_mut().insert(key, assessment.clone());
        assessment
    }
}
