//! SQL identifier quoting utilities

/// Quote a SQL identifier, doubling any embedded double quotes.
///
/// # Examples
/// ```
/// use sw_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("app"), r#""app""#);
/// assert_eq!(quote_ident(r#"my"schema"#), r#""my""schema""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a potentially qualified name (e.g. `catalog.schema`).
///
/// Splits on `.` and individually quotes each component.
///
/// # Examples
/// ```
/// use sw_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("main"), r#""main""#);
/// assert_eq!(quote_qualified("warehouse.app"), r#""warehouse"."app""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_empty() {
        assert_eq!(quote_ident(""), r#""""#);
    }

    #[test]
    fn test_quote_qualified_escapes_each_part() {
        assert_eq!(quote_qualified(r#"a"b.c"#), r#""a""b"."c""#);
    }
}
