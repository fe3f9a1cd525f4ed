//! SQL text helpers.
//!
//! Escaping here is a textual transform: it guarantees a value cannot leave its
//! surrounding quotes, it does not check that the result names anything real.

/// Table name patterns (SQL `LIKE` syntax) hidden from `list_tables`.
pub const HIDDEN_TABLE_PATTERNS: [&str; 3] = ["backfill_%", ".inner_%", "%_mv"];

/// Exact table names hidden from `list_tables`.
pub const HIDDEN_TABLE_NAMES: [&str; 1] = ["cursors"];

/// Marker that every published database name carries (`{network}:{name}@{version}`).
pub const DATABASE_VERSION_MARKER: char = '@';

/// Quotes a value as a backtick identifier.
#[must_use]
pub fn escape_identifier(value: &str) -> String {
    quote(value, '`')
}

/// Quotes a value as a single-quoted string literal.
#[must_use]
pub fn escape_string(value: &str) -> String {
    quote(value, '\'')
}

fn quote(value: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c == quote => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped.push(quote);
    escaped
}

/// Statement listing versioned databases with their comments.
#[must_use]
pub fn list_databases_statement() -> String {
    format!(
        "SELECT name, comment AS description FROM system.databases WHERE name LIKE {} ORDER BY name",
        escape_string(&format!("%{DATABASE_VERSION_MARKER}%"))
    )
}

/// Statement listing the public tables of `database`.
#[must_use]
pub fn list_tables_statement(database: &str) -> String {
    let mut clauses = vec![format!("database = {}", escape_string(database))];
    clauses.extend(
        HIDDEN_TABLE_PATTERNS
            .iter()
            .map(|pattern| format!("name NOT LIKE {}", escape_string(pattern))),
    );
    clauses.extend(
        HIDDEN_TABLE_NAMES
            .iter()
            .map(|name| format!("name != {}", escape_string(name))),
    );
    format!(
        "SELECT name, comment AS description FROM system.tables WHERE {} ORDER BY name",
        clauses.join(" AND ")
    )
}

/// Statement describing the columns of `database.table`.
#[must_use]
pub fn describe_table_statement(database: &str, table: &str) -> String {
    format!(
        "DESCRIBE {}.{}",
        escape_identifier(database),
        escape_identifier(table)
    )
}

/// Returns true when a database name follows the versioned naming convention.
#[must_use]
pub fn is_versioned_database(name: &str) -> bool {
    name.contains(DATABASE_VERSION_MARKER)
}

/// Returns true for internal, backfill and materialized-view tables.
#[must_use]
pub fn is_hidden_table(name: &str) -> bool {
    HIDDEN_TABLE_NAMES.contains(&name)
        || HIDDEN_TABLE_PATTERNS
            .iter()
            .any(|pattern| like_matches(pattern, name))
}

/// Matches `text` against a SQL `LIKE` pattern (`%` any run, `_` one char).
#[must_use]
pub fn like_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut resume: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                resume = Some((p, t));
                p += 1;
            }
            Some('_') => {
                p += 1;
                t += 1;
            }
            Some(&c) if c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match resume {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    resume = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Index of the first unescaped `quote` after the opening one.
    fn closing_quote(escaped: &str, quote: char) -> Option<usize> {
        let mut chars = escaped.char_indices().skip(1);
        while let Some((index, ch)) = chars.next() {
            if ch == '\\' {
                chars.next();
            } else if ch == quote {
                return Some(index);
            }
        }
        None
    }

    fn assert_contained(value: &str) {
        for (escaped, quote) in [(escape_string(value), '\''), (escape_identifier(value), '`')] {
            assert!(escaped.starts_with(quote), "{escaped} should open with {quote}");
            assert_eq!(
                closing_quote(&escaped, quote),
                Some(escaped.len() - 1),
                "{escaped} closes before its end"
            );
        }
    }

    #[test]
    fn escaping_keeps_hostile_values_inside_quotes() {
        for value in [
            "",
            "plain",
            "it's",
            "'; DROP TABLE users; --",
            "back`tick",
            "trailing\\",
            "\\'",
            "\\\\'",
            "mixed ' ` \" \\ quotes",
            "line\nbreak\r\ttab\0nul",
            "mainnet:evm-tokens@v1",
        ] {
            assert_contained(value);
        }
    }

    #[test]
    fn escape_string_backslash_escapes_quotes() {
        assert_eq!(escape_string("it's"), r"'it\'s'");
        assert_eq!(escape_string(r"a\b"), r"'a\\b'");
        assert_eq!(escape_string("x\\"), r"'x\\'");
        assert_eq!(escape_string(r"\'"), r"'\\\''");
        assert_eq!(escape_string(""), "''");
        assert_eq!(escape_string("a\nb"), r"'a\nb'");
    }

    #[test]
    fn escape_identifier_uses_backticks() {
        assert_eq!(escape_identifier("mainnet:evm-nft@v1"), "`mainnet:evm-nft@v1`");
        assert_eq!(escape_identifier("we`ird"), r"`we\`ird`");
        assert_eq!(escape_identifier("it's"), "`it's`");
    }

    #[test]
    fn describe_statement_escapes_both_identifiers() {
        assert_eq!(describe_table_statement("db", "t"), "DESCRIBE `db`.`t`");
        assert_eq!(
            describe_table_statement("x`; DROP", "t"),
            r"DESCRIBE `x\`; DROP`.`t`"
        );
    }

    #[test]
    fn list_tables_statement_filters_hidden_tables() {
        let sql = list_tables_statement("mainnet:evm-tokens@v1");
        assert_eq!(
            sql,
            "SELECT name, comment AS description FROM system.tables \
             WHERE database = 'mainnet:evm-tokens@v1' \
             AND name NOT LIKE 'backfill_%' \
             AND name NOT LIKE '.inner_%' \
             AND name NOT LIKE '%_mv' \
             AND name != 'cursors' \
             ORDER BY name"
        );
    }

    #[test]
    fn list_tables_statement_escapes_database_literal() {
        let sql = list_tables_statement("x' OR '1'='1");
        assert!(sql.contains(r"database = 'x\' OR \'1\'=\'1'"));
    }

    #[test]
    fn list_databases_statement_requires_marker() {
        assert_eq!(
            list_databases_statement(),
            "SELECT name, comment AS description FROM system.databases WHERE name LIKE '%@%' ORDER BY name"
        );
    }

    #[test]
    fn like_matching_follows_sql_wildcards() {
        assert!(like_matches("backfill_%", "backfill_balances"));
        assert!(like_matches("backfill_%", "backfillX"));
        assert!(!like_matches("backfill_%", "backfill"));
        assert!(like_matches("%_mv", "transfers_mv"));
        assert!(like_matches("%_mv", "x_mv"));
        assert!(!like_matches("%_mv", "mv"));
        assert!(!like_matches("%_mv", "transfers_mvx"));
        assert!(like_matches("%@%", "@"));
        assert!(like_matches("a%b%c", "aXXbYYc"));
        assert!(!like_matches("a%b%c", "aXXbYY"));
        assert!(like_matches("", ""));
        assert!(!like_matches("", "a"));
    }

    #[test]
    fn hidden_tables_are_detected() {
        for name in ["backfill_transfers", ".inner_id.1234", "balances_mv", "cursors"] {
            assert!(is_hidden_table(name), "{name} should be hidden");
        }
        for name in ["balances", "transfers", "cursor", "mv", "cursors_v2"] {
            assert!(!is_hidden_table(name), "{name} should be visible");
        }
    }

    #[test]
    fn versioned_databases_need_marker() {
        assert!(is_versioned_database("mainnet:evm-tokens@v1"));
        assert!(!is_versioned_database("default"));
        assert!(!is_versioned_database("system"));
    }
}
