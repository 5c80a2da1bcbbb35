/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`     — Interactive chat loop over the active session
- `topics`   — Taxonomy browsing and admin mutations
- `sessions` — Session listing and lifecycle
- `voices`   — Voice catalog listing
- `key`      — API key management

The handlers are intentionally small and use the library components:
the knowledge client, providers, retrieval, and the session store.
*/

pub mod chat;
pub mod key;
pub mod sessions;
pub mod special;
pub mod topics;
pub mod voices;
