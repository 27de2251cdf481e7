// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for RID normalization and command query escaping

#![no_main]

use libfuzzer_sys::fuzz_target;

use compass::endpoint::{escape_query, Endpoint};
use compass::rid::{self, Rid};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Exactly one leading '#' goes, nothing else changes
        let normalized = rid::normalize(s);
        assert_eq!(normalized, s.strip_prefix('#').unwrap_or(s));
        assert_eq!(Rid::new(s).as_str(), normalized);

        // Escaped queries stay a single path segment run
        let escaped = escape_query(s);
        assert!(escaped.is_ascii());
        assert!(!escaped.contains(' '));
        assert!(!escaped.contains('?'));

        let url = Endpoint::Command { db: "fuzz", lang: "sql", query: s }.url("http://localhost:2480");
        assert!(url.ends_with(&escaped));
    }
});
