// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The on-disk YAML shape (§6). Every field is optional/defaulted so a
//! partially hand-edited config file parses instead of failing mid-field;
//! `validate_configuration` is what turns "parses" into "is usable".

use std::collections::HashMap;

use orch_core::{GlobalTuning, ProjectRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OnDiskConfig {
    #[serde(default)]
    pub global: GlobalTuning,
    #[serde(default)]
    pub projects: HashMap<String, ProjectRecord>,
}
