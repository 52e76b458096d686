// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// User preferences. Missing fields fall back to their defaults, so older or
/// partial settings objects still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    /// 0 means no budget.
    pub daily_budget: f64,
    pub weekly_budget: f64,
    pub monthly_budget: f64,
    /// Category names pinned for quick selection.
    pub favorites: Vec<String>,
}

impl Settings {
    /// Clamp budgets to finite, non-negative values.
    pub fn normalized(mut self) -> Self {
        for budget in [
            &mut self.daily_budget,
            &mut self.weekly_budget,
            &mut self.monthly_budget,
        ] {
            if !budget.is_finite() || *budget < 0.0 {
                *budget = 0.0;
            }
        }
        self
    }
}
