/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (Authorizer), cors, http (trace/request-id/limit/timeout), security_headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
