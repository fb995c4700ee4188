/*
 * Responsibility
 * - 永続化層 (users / resumes)
 */
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod resume_repo;
pub mod user_repo;
