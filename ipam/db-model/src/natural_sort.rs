// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Natural-sort keys for name ordering.
//!
//! Names are listed in natural (numeric-aware) order: "RT-9" sorts before
//! "RT-10".  The database has no such collation, so the ordering is
//! materialized as a derived `name_key` column, maintained on every write,
//! that compares byte-wise in natural order.

/// Derives the natural-sort key for `name`.
///
/// Each numeric run is encoded as a fixed-width length prefix followed by
/// the digits with leading zeros stripped, so byte-wise comparison of two
/// keys orders numeric runs by value.  Non-numeric characters pass through
/// unchanged.  Names whose numeric runs are equal in value but written
/// differently ("a01" and "a1") derive the same key; listings break such
/// ties on a secondary column.
pub fn natural_sort_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 8);
    let mut digits = String::new();
    for c in name.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else {
            if !digits.is_empty() {
                push_numeric_run(&mut key, &digits);
                digits.clear();
            }
            key.push(c);
        }
    }
    if !digits.is_empty() {
        push_numeric_run(&mut key, &digits);
    }
    key
}

fn push_numeric_run(key: &mut String, digits: &str) {
    let trimmed = digits.trim_start_matches('0');
    let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
    // Two equal-length digit strings compare numerically byte-wise, so
    // ordering by (length, digits) is ordering by value.  Four digits of
    // length cover any run that fits in a name column.
    key.push_str(&format!("{:04}", trimmed.len()));
    key.push_str(trimmed);
}

#[cfg(test)]
mod test {
    use super::natural_sort_key;

    #[test]
    fn test_numeric_runs_compare_by_value() {
        assert!(natural_sort_key("RT-9") < natural_sort_key("RT-10"));
        assert!(natural_sort_key("RT-10") < natural_sort_key("RT-11"));
        assert!(natural_sort_key("vrf2") < natural_sort_key("vrf10"));
        assert!(natural_sort_key("9") < natural_sort_key("10"));
    }

    #[test]
    fn test_plain_names_sort_bytewise() {
        assert!(natural_sort_key("alpha") < natural_sort_key("beta"));
        assert!(natural_sort_key("Customer-A") < natural_sort_key("Customer-B"));
    }

    #[test]
    fn test_leading_zeros_compare_equal() {
        assert_eq!(natural_sort_key("a01"), natural_sort_key("a1"));
        assert_eq!(natural_sort_key("a000"), natural_sort_key("a0"));
    }

    #[test]
    fn test_mixed_runs() {
        assert!(natural_sort_key("a1b2") < natural_sort_key("a1b10"));
        assert!(natural_sort_key("a1b2") < natural_sort_key("a2b1"));
        // A name that ends where another continues sorts first.
        assert!(natural_sort_key("RT") < natural_sort_key("RT-1"));
    }
}
