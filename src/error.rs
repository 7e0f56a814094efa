// 🚫 Contract Errors - Invalid parameters handed to the ranking engine
//
// Data problems (missing stats, bad ranks, bad dates) never end up here:
// they are absorbed with fallback values. Only caller mistakes do.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankingError {
    #[error("unknown round selector: {0:?} (expected one of round1, round2, round3, final)")]
    UnknownRound(String),

    #[error("unknown sort field: {0:?}")]
    UnknownSortField(String),

    #[error("unknown sort direction: {0:?} (expected asc or desc)")]
    UnknownSortDirection(String),

    #[error("unknown value type: {0:?} (expected number or string)")]
    UnknownValueType(String),

    #[error("sort field {field} compares as {expected}, but {declared} was requested")]
    SortTypeMismatch {
        field: &'static str,
        declared: &'static str,
        expected: &'static str,
    },
}

pub type RankingResult<T> = std::result::Result<T, RankingError>;
