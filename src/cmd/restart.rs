// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `restart` — `stop` then `start`.

use crate::paths::StateDir;

pub async fn run(state_dir: StateDir) -> i32 {
    crate::cmd::stop::run(state_dir.clone()).await;
    crate::cmd::start::run(state_dir, None).await
}
