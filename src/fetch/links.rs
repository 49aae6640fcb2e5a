// Link header parsing.
// Turns `<url>; rel="name"` lists into a relation -> URL map.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Relation name to URL, as advertised by a response's `Link` header.
pub type Relations = BTreeMap<String, String>;

pub const NEXT: &str = "next";

// `<url>`, then any parameters (quoted values may hold commas) up to a
// `rel="name"` parameter. Neither part may cross into the next entry.
static LINK_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^<>]*)>(?:[^,"<]|"[^"]*")*?;\s*(?i:rel)\s*=\s*"([^"<>,]*)""#)
        .expect("Invalid Link header regex")
});

/// Parse a `Link` header value.
///
/// Entries that do not have the `<url>; rel="name"` shape are skipped.
/// The quoted `rel` value is kept whole as the relation name.
/// When a name repeats, the last entry wins.
pub fn parse_link_header(header: Option<&str>) -> Relations {
    let mut relations = Relations::new();

    let Some(header) = header else {
        return relations;
    };

    for captures in LINK_ENTRY.captures_iter(header) {
        let url = captures[1].trim();
        let name = captures[2].trim();
        if url.is_empty() || name.is_empty() {
            continue;
        }
        relations.insert(name.to_string(), url.to_string());
    }

    relations
}
