/*
 * Responsibility
 * - v1 の request/response DTO
 * - 形式チェックは各 DTO の validate() に置く (DB を見る判定は handler 側)
 */
pub mod auth;
pub mod resumes;
pub mod users;
