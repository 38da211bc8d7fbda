/// Local and remote persistence of the score data.
pub mod score_store;
/// Storage abstraction layer for persistence operations.
pub mod storage;
