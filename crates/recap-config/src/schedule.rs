// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cron expression parsing.
//!
//! Config files carry standard 5-field cron expressions. The `cron`
//! crate expects a seconds field, so a `0` seconds column is prepended
//! before parsing; 6- and 7-field expressions are passed through.

use std::str::FromStr;

use cron::Schedule;

/// Parse a cron expression, accepting the 5-field form.
pub fn parse_cron_expression(expr: &str) -> Result<Schedule, String> {
    let expr = expr.trim();
    let normalized = if expr.split_whitespace().count() == 5 {
        format!("0 {expr}")
    } else {
        expr.to_string()
    };
    Schedule::from_str(&normalized).map_err(|e| format!("invalid cron expression `{expr}`: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_field_expression_parses() {
        assert!(parse_cron_expression("0 23 * * *").is_ok());
        assert!(parse_cron_expression("30 6 * * 1-5").is_ok());
    }

    #[test]
    fn six_field_expression_passes_through() {
        assert!(parse_cron_expression("0 0 23 * * *").is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_cron_expression("not a cron").is_err());
        assert!(parse_cron_expression("").is_err());
        assert!(parse_cron_expression("61 * * * *").is_err());
    }
}
