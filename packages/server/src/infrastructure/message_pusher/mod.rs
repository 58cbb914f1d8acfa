//! メッセージ送信（通知）の実装
//!
//! `broadcaster`: fans a message out to the sessions in a registry snapshot.

pub mod broadcaster;

pub use broadcaster::Broadcaster;
