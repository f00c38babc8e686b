// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod completion;
pub mod linkedin;

pub use completion::{CompletionChoice, CompletionClient};
pub use linkedin::{build_share_payload, LinkedInClient, LinkedInService, OAuthResult};
