//
//  bitbucket-metrics
//  api/common/extract.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Fail-closed extraction from untyped JSON.
//!
//! Bitbucket records are consumed as raw [`serde_json::Value`]s rather than
//! deserialized structs so that one odd record never fails a whole page.
//! These helpers walk a dotted path through nested objects and return `None`
//! as soon as a segment is missing or has the wrong type. Decoders combine
//! them with `?` inside functions returning `Option`, so a record is produced
//! only when every required field is present.
//!
//! # Example
//!
//! ```rust
//! use bitbucket_metrics::api::common::extract::str_at;
//! use serde_json::json;
//!
//! let record = json!({"author": {"user": {"slug": "alice"}}});
//! assert_eq!(str_at(&record, &["author", "user", "slug"]), Some("alice"));
//! assert_eq!(str_at(&record, &["author", "name"]), None);
//! ```

use serde_json::Value;

use super::JsonObject;

/// Path lookup through nested JSON objects.
///
/// Implemented for both [`Value`] and [`JsonObject`] so decoders can work on
/// the records handed out by the paginator without re-wrapping them.
///
/// A path names a field, so an empty path yields `None` for every receiver.
pub trait Lookup {
    /// Descends through nested objects following `path`.
    fn lookup(&self, path: &[&str]) -> Option<&Value>;
}

impl Lookup for Value {
    fn lookup(&self, path: &[&str]) -> Option<&Value> {
        self.as_object()?.lookup(path)
    }
}

impl Lookup for JsonObject {
    fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.get(*first)?, |current, key| current.as_object()?.get(*key))
    }
}

/// Returns the string found at `path`, if every segment exists and the leaf is a string.
pub fn str_at<'a, L: Lookup + ?Sized>(value: &'a L, path: &[&str]) -> Option<&'a str> {
    value.lookup(path)?.as_str()
}

/// Returns the array found at `path`.
pub fn array_at<'a, L: Lookup + ?Sized>(value: &'a L, path: &[&str]) -> Option<&'a [Value]> {
    value.lookup(path)?.as_array().map(Vec::as_slice)
}

/// Returns the boolean found at `path`.
pub fn bool_at<L: Lookup + ?Sized>(value: &L, path: &[&str]) -> Option<bool> {
    value.lookup(path)?.as_bool()
}

/// Returns the non-negative integer found at `path`.
///
/// Bitbucket sends offsets as JSON numbers; floats with no fractional part
/// are accepted as well.
pub fn u64_at<L: Lookup + ?Sized>(value: &L, path: &[&str]) -> Option<u64> {
    let number = value.lookup(path)?;
    number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

/// Decodes every element of `items` with `decode`, failing if any element fails.
///
/// ```rust
/// use bitbucket_metrics::api::common::extract::{all_or_nothing, str_at};
/// use serde_json::json;
///
/// let good = json!([{"name": "a"}, {"name": "b"}]);
/// let bad = json!([{"name": "a"}, {"title": "b"}]);
/// let name = |v: &serde_json::Value| str_at(v, &["name"]).map(str::to_string);
///
/// assert_eq!(all_or_nothing(good.as_array().unwrap(), name), Some(vec!["a".into(), "b".into()]));
/// assert_eq!(all_or_nothing(bad.as_array().unwrap(), name), None);
/// ```
pub fn all_or_nothing<T, F>(items: &[Value], decode: F) -> Option<Vec<T>>
where
    F: FnMut(&Value) -> Option<T>,
{
    items.iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_str_at_nested() {
        let value = json!({"refChange": {"ref": {"displayId": "main", "type": "BRANCH"}}});
        assert_eq!(str_at(&value, &["refChange", "ref", "displayId"]), Some("main"));
        assert_eq!(str_at(&value, &["refChange", "ref", "type"]), Some("BRANCH"));
    }

    #[test]
    fn test_str_at_wrong_type() {
        let value = json!({"key": 42, "nested": "not-an-object"});
        assert_eq!(str_at(&value, &["key"]), None);
        assert_eq!(str_at(&value, &["nested", "inner"]), None);
    }

    #[test]
    fn test_empty_path_is_none_for_every_receiver() {
        let value = json!({"a": 1});
        assert_eq!(value.lookup(&[]), None);
        assert_eq!(value.as_object().unwrap().lookup(&[]), None);
        assert_eq!(json!(7).lookup(&[]), None);
    }

    #[test]
    fn test_value_and_object_agree() {
        let value = json!({"user": {"name": "bob"}, "n": 3});
        let record = value.as_object().unwrap();
        let paths: [&[&str]; 5] = [&["user", "name"], &["n"], &["user"], &["missing"], &["n", "deeper"]];
        for path in paths {
            assert_eq!(value.lookup(path), record.lookup(path), "path {path:?}");
        }
    }

    #[test]
    fn test_u64_at() {
        let value = json!({"int": 25, "float": 50.0, "fraction": 1.5, "negative": -1, "text": "3"});
        assert_eq!(u64_at(&value, &["int"]), Some(25));
        assert_eq!(u64_at(&value, &["float"]), Some(50));
        assert_eq!(u64_at(&value, &["fraction"]), None);
        assert_eq!(u64_at(&value, &["negative"]), None);
        assert_eq!(u64_at(&value, &["text"]), None);
    }

    #[test]
    fn test_bool_and_array() {
        let value = json!({"isLastPage": true, "values": [1, 2]});
        assert_eq!(bool_at(&value, &["isLastPage"]), Some(true));
        assert_eq!(bool_at(&value, &["values"]), None);
        assert_eq!(array_at(&value, &["values"]).map(<[Value]>::len), Some(2));
    }

    #[test]
    fn test_lookup_on_object_root() {
        let value = json!({"user": {"name": "bob"}});
        let record = value.as_object().unwrap();
        assert_eq!(str_at(record, &["user", "name"]), Some("bob"));
    }

    #[test]
    fn test_all_or_nothing_empty() {
        let decoded: Option<Vec<String>> = all_or_nothing(&[], |_| None);
        assert_eq!(decoded, Some(vec![]));
    }
}
