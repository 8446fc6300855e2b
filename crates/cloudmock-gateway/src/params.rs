//! Decoded form/query parameters.

use std::collections::BTreeMap;

/// Ordered `(name, value)` pairs from a URL query string or a
/// `application/x-www-form-urlencoded` body.
///
/// A name without `=` is kept with an empty value, so presence checks work
/// for S3 sub-resources like `?location`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Decode a URL query string.
    #[must_use]
    pub fn from_query(query: Option<&str>) -> Self {
        query.map_or_else(Self::default, |q| Self::from_form(q.as_bytes()))
    }

    /// Decode a form-encoded body.
    #[must_use]
    pub fn from_form(body: &[u8]) -> Self {
        Self(
            form_urlencoded::parse(body)
                .into_owned()
                .filter(|(k, _)| !k.is_empty())
                .collect(),
        )
    }

    /// Append every pair of `other` after the existing ones.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// First value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First non-empty value of `name`.
    #[must_use]
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// Whether `name` is present, with or without a value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Values of a query-protocol list such as `TagKeys.member.1`,
    /// `TagKeys.member.2`, ordered by index.
    #[must_use]
    pub fn member_list(&self, prefix: &str) -> Vec<String> {
        let mut members = BTreeMap::new();
        for (k, v) in &self.0 {
            let index = k
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(|index| index.parse::<u32>().ok());
            if let Some(index) = index {
                members.insert(index, v.clone());
            }
        }
        members.into_values().collect()
    }

    /// Pairs of a query-protocol map such as `Tags.member.1.Key` /
    /// `Tags.member.1.Value`, ordered by index. Entries without a key are
    /// dropped; a missing value is empty.
    #[must_use]
    pub fn member_pairs(
        &self,
        prefix: &str,
        key_field: &str,
        value_field: &str,
    ) -> Vec<(String, String)> {
        let mut entries: BTreeMap<u32, (Option<String>, Option<String>)> = BTreeMap::new();
        for (k, v) in &self.0 {
            let Some((index, field)) = k
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(|rest| rest.split_once('.'))
            else {
                continue;
            };
            let Ok(index) = index.parse::<u32>() else {
                continue;
            };
            let entry = entries.entry(index).or_default();
            if field == key_field {
                entry.0 = Some(v.clone());
            } else if field == value_field {
                entry.1 = Some(v.clone());
            }
        }
        entries
            .into_values()
            .filter_map(|(k, v)| k.map(|k| (k, v.unwrap_or_default())))
            .collect()
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
