// SPDX-License-Identifier: PMPL-1.0-or-later

//! REST endpoint templates.
//!
//! Every resource call resolves one [`Endpoint`] against the server's base
//! URL. Path segments are substituted verbatim except for command queries,
//! which are percent-escaped first.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::Storage;

/// Characters left untouched when escaping a query: alphanumerics, `_.-/`.
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'/');

/// Percent-escape a command query for use as a path segment.
pub fn escape_query(query: &str) -> String {
    utf8_percent_encode(query, QUERY_ESCAPE).to_string()
}

/// A REST endpoint of the document server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint<'a> {
    ServerInfo,
    Disconnect,
    Connect { db: &'a str },
    Database { db: &'a str },
    CreateDatabase { db: &'a str, storage: Storage },
    Command { db: &'a str, lang: &'a str, query: &'a str },
    Cluster { db: &'a str, class: &'a str },
    Klass { db: &'a str, class: &'a str, limit: usize },
    CreateKlass { db: &'a str, class: &'a str },
    Property { db: &'a str, class: &'a str, property: &'a str },
    /// Single document; `rid` is already normalized.
    Document { db: &'a str, rid: &'a str },
    /// Document collection, used for create and update.
    Documents { db: &'a str },
}

impl Endpoint<'_> {
    /// Resolve the endpoint against `base` (no trailing slash).
    pub fn url(&self, base: &str) -> String {
        match self {
            Endpoint::ServerInfo => format!("{base}/server"),
            Endpoint::Disconnect => format!("{base}/disconnect"),
            Endpoint::Connect { db } => format!("{base}/connect/{db}"),
            Endpoint::Database { db } => format!("{base}/database/{db}"),
            Endpoint::CreateDatabase { db, storage } => {
                format!("{base}/database/{db}/{storage}")
            }
            Endpoint::Command { db, lang, query } => {
                format!("{base}/command/{db}/{lang}/{}", escape_query(query))
            }
            Endpoint::Cluster { db, class } => format!("{base}/cluster/{db}/{class}"),
            Endpoint::Klass { db, class, limit } => format!("{base}/class/{db}/{class}/{limit}"),
            Endpoint::CreateKlass { db, class } => format!("{base}/class/{db}/{class}"),
            Endpoint::Property {
                db,
                class,
                property,
            } => format!("{base}/property/{db}/{class}/{property}"),
            Endpoint::Document { db, rid } => format!("{base}/document/{db}/{rid}"),
            Endpoint::Documents { db } => format!("{base}/document/{db}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:2480";

    #[test]
    fn test_templates() {
        let cases = [
            (Endpoint::ServerInfo, "/server"),
            (Endpoint::Disconnect, "/disconnect"),
            (Endpoint::Connect { db: "demo" }, "/connect/demo"),
            (Endpoint::Database { db: "demo" }, "/database/demo"),
            (
                Endpoint::CreateDatabase {
                    db: "demo",
                    storage: Storage::Memory,
                },
                "/database/demo/memory",
            ),
            (
                Endpoint::Cluster {
                    db: "demo",
                    class: "Person",
                },
                "/cluster/demo/Person",
            ),
            (
                Endpoint::Klass {
                    db: "demo",
                    class: "Person",
                    limit: 20,
                },
                "/class/demo/Person/20",
            ),
            (
                Endpoint::CreateKlass {
                    db: "demo",
                    class: "Person",
                },
                "/class/demo/Person",
            ),
            (
                Endpoint::Property {
                    db: "demo",
                    class: "Person",
                    property: "age",
                },
                "/property/demo/Person/age",
            ),
            (
                Endpoint::Document {
                    db: "demo",
                    rid: "12:0",
                },
                "/document/demo/12:0",
            ),
            (Endpoint::Documents { db: "demo" }, "/document/demo"),
        ];

        for (endpoint, path) in cases {
            assert_eq!(endpoint.url(BASE), format!("{BASE}{path}"));
        }
    }

    #[test]
    fn test_command_escapes_query() {
        let endpoint = Endpoint::Command {
            db: "demo",
            lang: "sql",
            query: "select from Person where name = 'a'",
        };
        assert_eq!(
            endpoint.url(BASE),
            "http://localhost:2480/command/demo/sql/select%20from%20Person%20where%20name%20%3D%20%27a%27"
        );
    }

    #[test]
    fn test_escape_keeps_safe_characters() {
        assert_eq!(escape_query("a_b.c-d/e"), "a_b.c-d/e");
        assert_eq!(escape_query("#12:0"), "%2312%3A0");
    }
}
