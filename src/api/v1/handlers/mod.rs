/*
 * Responsibility
 * - v1 の handler 群 (HTTP ↔ repo/service の橋渡し)
 */
pub mod auth;
pub mod health;
pub mod resumes;
pub mod users;
