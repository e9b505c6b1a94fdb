/*
 * Responsibility
 * - 認可済みリクエストを model-serving gateway (LiteLLM) へ転送
 * - stream 指定時は upstream の行を SSE 形式で中継
 */
pub mod client;
pub mod lines;

pub use client::{ForwardRequest, Forwarded, PassthroughClient, ProxyError};
