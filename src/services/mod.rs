/*
 * Responsibility
 * - ドメインサービス (authorizer / model directory / passthrough) の公開
 */
pub mod auth;
pub mod models;
pub mod passthrough;
