//! Ficha Status Tool
//!
//! Provides runtime status information about the ficha service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};
use crate::models::Recipe;

/// Technical sheet instructions for AI assistants
pub const SHEET_INSTRUCTIONS: &str = r#"
# Ficha Técnica Instructions

This guide explains how to build recipes with technical sheets using the ficha tools.

## Overview

A recipe is stored together with its technical sheet: one line per ingredient with
the quantities that go into the pan and the quantities that come out of it.

1. **Ingredients** - catalogue entries (`create_ingredient`, `list_ingredients`)
2. **Recipe** - title, method, category, tags and the sheet items (`create_recipe`)
3. **Extras** - comments, star rating and an optional nutrition table

---

## Sheet Item Fields

| Field | Meaning | Default |
|-------|---------|---------|
| `ingredient_id` | Catalogue id of the ingredient | required |
| `gross_quantity` | Quantity bought/weighed before cleaning | required |
| `unit` | Free text unit (g, kg, ml, un) | required |
| `correction_factor` | FC, gross / net after cleaning | 1 |
| `cooking_index` | IC, cooked / raw after cooking | 1 |
| `notes` | Free text, kept as is | none |

Quantities are decimals. Send them as JSON numbers or strings ("2.5"). Results come
back as strings with exactly two decimal places.

---

## How Each Line Is Computed

```
net_quantity          = round2(gross_quantity / correction_factor)
yield_quantity        = round2(net_quantity * cooking_index)
participation_percent = round2(gross_quantity / recipe_gross_total * 100)
```

- `round2` rounds half away from zero to two decimal places
- The net quantity is rounded first and the rounded value feeds the yield
- `recipe_gross_total` is the sum of every line's gross quantity
- When the gross total is zero every participation is 0.00

### Example

Rice, gross 100 g, FC 1, IC 2.5:
- net = 100.00
- yield = 250.00

Carrot, gross 200 g, FC 1.25, IC 0.9 (total gross 1000 g):
- net = 160.00
- yield = 144.00
- participation = 20.00

---

## Validation

- `correction_factor` must be greater than zero
- `gross_quantity` and `cooking_index` cannot be negative
- A zero gross quantity or a zero cooking index is accepted
- Every `ingredient_id` must exist in the catalogue
- Recipe titles are unique and star ratings go from 0 to 5

If any line fails, nothing is saved. Use `preview_sheet` to check the numbers before
calling `create_recipe`.

Participation percentages are rounded per line, so the total may differ from 100 by up
to 0.01 per line. `preview_sheet` reports whether the total is within that tolerance.

---

## Quick Reference

| Task | Tool |
|------|------|
| Register an ingredient | `create_ingredient` |
| Find ingredients | `list_ingredients`, `get_ingredient` |
| Check a sheet without saving | `preview_sheet` |
| Save a recipe with its sheet | `create_recipe` |
| Read a recipe | `get_recipe` |
| Recipe book | `list_recipes_complete` |
| Stars | `rate_recipe` |
| Remove a recipe | `delete_recipe` |
| Comments | `add_comment`, `list_comments` |
| Nutrition table | `set_nutrition_table`, `get_nutrition_table` |
"#;

/// Runtime status of the ficha service
#[derive(Debug, Clone, Serialize)]
pub struct FichaStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    /// None when the database could not be queried
    pub recipe_count: Option<i64>,
    pub schema_up_to_date: Option<bool>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, database: &Database) -> FichaStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let recipe_count = database
            .with_conn(Recipe::count)
            .map_err(|e| tracing::warn!(error = %e, "Could not count recipes"))
            .ok();
        let schema_up_to_date = database
            .with_conn(migrations::needs_migration)
            .map(|pending| !pending)
            .ok();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        FichaStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            recipe_count,
            schema_up_to_date,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
