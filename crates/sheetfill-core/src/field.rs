//! Field keys and the bindings a caller supplies for one fill
//!
//! A field key is either a literal cell token (`E7`) or the name of a
//! workbook-level defined name (`rngFirstName`). [`FieldKey::classify`] makes
//! that decision once; everything downstream works on the tagged value.

use lazy_regex::regex_is_match;

use crate::address::CellAddress;
use crate::error::{Error, Result};
use crate::named_range::{DefinedNames, NameReference};

/// A classified field key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKey {
    /// The key is itself a cell token such as `E7`
    DirectAddress(CellAddress),
    /// The key names a defined name in the workbook
    NamedRange(String),
}

/// Which worksheet a resolved field lives on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRef {
    /// The first worksheet in declaration order
    First,
    /// A worksheet looked up by its tab name
    Named(String),
}

/// A field key resolved to a concrete sheet and cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub sheet: SheetRef,
    pub address: CellAddress,
}

/// Check whether a key has the shape of a direct cell token (`^[A-Za-z]+[0-9]+$`)
pub fn is_direct_address(key: &str) -> bool {
    regex_is_match!(r"^[A-Za-z]+[0-9]+$", key)
}

impl FieldKey {
    /// Classify a raw field key
    ///
    /// Keys shaped like a cell token are parsed into a [`CellAddress`]; a
    /// token of the right shape that is still out of range (`A0`,
    /// `ZZZZ1`) is reported as an error rather than treated as a name.
    pub fn classify(key: &str) -> Result<Self> {
        if is_direct_address(key) {
            CellAddress::parse(key).map(FieldKey::DirectAddress)
        } else {
            Ok(FieldKey::NamedRange(key.to_string()))
        }
    }

    /// Resolve this key against the workbook's defined names
    ///
    /// Direct addresses always target the first worksheet. Named ranges are
    /// matched case-insensitively and reduced to the first cell of their
    /// reference; a missing name yields [`Error::NameNotFound`].
    pub fn resolve(&self, names: &DefinedNames) -> Result<ResolvedTarget> {
        match self {
            FieldKey::DirectAddress(address) => Ok(ResolvedTarget {
                sheet: SheetRef::First,
                address: *address,
            }),
            FieldKey::NamedRange(name) => {
                let defined = names
                    .find(name)
                    .ok_or_else(|| Error::NameNotFound(name.clone()))?;
                let reference = NameReference::parse(&defined.refers_to)?;
                Ok(ResolvedTarget {
                    sheet: SheetRef::Named(reference.sheet),
                    address: reference.cell,
                })
            }
        }
    }
}

/// Ordered field-to-value bindings for one fill
///
/// Keys compare case-insensitively: setting `"e7"` after `"E7"` replaces the
/// earlier value but keeps its original position and spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBindings {
    entries: Vec<(String, Option<String>)>,
}

impl FieldBindings {
    /// Create an empty set of bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to a value, replacing any earlier binding for the same key
    pub fn set(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| keys_equal(existing, &key))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style [`FieldBindings::set`] for a present value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, Some(value.into()));
        self
    }

    /// Look up a value by key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(existing, _)| keys_equal(existing, key))
            .map(|(_, value)| value.as_deref())
    }

    /// Iterate bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldBindings
where
    K: Into<String>,
    V: Into<Option<String>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bindings = FieldBindings::new();
        for (key, value) in iter {
            bindings.set(key, value.into());
        }
        bindings
    }
}

fn keys_equal(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(feature = "serde")]
mod de {
    use super::FieldBindings;
    use serde::de::{Deserialize, Deserializer, Error, MapAccess, Visitor};
    use std::fmt;

    /// A flat scalar JSON-ish value; nested containers are rejected
    struct Scalar(Option<String>);

    impl<'de> Deserialize<'de> for Scalar {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct ScalarVisitor;

            impl<'de> Visitor<'de> for ScalarVisitor {
                type Value = Scalar;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a string, number, boolean or null")
                }

                fn visit_str<E: Error>(self, v: &str) -> Result<Scalar, E> {
                    Ok(Scalar(Some(v.to_string())))
                }

                fn visit_string<E: Error>(self, v: String) -> Result<Scalar, E> {
                    Ok(Scalar(Some(v)))
                }

                fn visit_bool<E: Error>(self, v: bool) -> Result<Scalar, E> {
                    Ok(Scalar(Some(v.to_string())))
                }

                fn visit_i64<E: Error>(self, v: i64) -> Result<Scalar, E> {
                    Ok(Scalar(Some(v.to_string())))
                }

                fn visit_u64<E: Error>(self, v: u64) -> Result<Scalar, E> {
                    Ok(Scalar(Some(v.to_string())))
                }

                fn visit_f64<E: Error>(self, v: f64) -> Result<Scalar, E> {
                    Ok(Scalar(Some(v.to_string())))
                }

                fn visit_unit<E: Error>(self) -> Result<Scalar, E> {
                    Ok(Scalar(None))
                }

                fn visit_none<E: Error>(self) -> Result<Scalar, E> {
                    Ok(Scalar(None))
                }

                fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Scalar, D::Error> {
                    Scalar::deserialize(d)
                }
            }

            deserializer.deserialize_any(ScalarVisitor)
        }
    }

    impl<'de> Deserialize<'de> for FieldBindings {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct BindingsVisitor;

            impl<'de> Visitor<'de> for BindingsVisitor {
                type Value = FieldBindings;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a flat map of field keys to values")
                }

                fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FieldBindings, A::Error> {
                    let mut bindings = FieldBindings::new();
                    while let Some((key, Scalar(value))) = map.next_entry::<String, Scalar>()? {
                        bindings.set(key, value);
                    }
                    Ok(bindings)
                }
            }

            deserializer.deserialize_map(BindingsVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::named_range::DefinedName;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_direct_and_named() {
        assert_eq!(
            FieldKey::classify("E7").unwrap(),
            FieldKey::DirectAddress(CellAddress::new(4, 7))
        );
        assert_eq!(
            FieldKey::classify("d5").unwrap(),
            FieldKey::DirectAddress(CellAddress::new(3, 5))
        );
        assert_eq!(
            FieldKey::classify("rngFirstName").unwrap(),
            FieldKey::NamedRange("rngFirstName".into())
        );
        // Digits before letters, underscores and anchors are not cell tokens.
        assert!(matches!(
            FieldKey::classify("7E").unwrap(),
            FieldKey::NamedRange(_)
        ));
        assert!(matches!(
            FieldKey::classify("rngMedications_TtlNum").unwrap(),
            FieldKey::NamedRange(_)
        ));
        assert!(matches!(
            FieldKey::classify("$E$7").unwrap(),
            FieldKey::NamedRange(_)
        ));
    }

    #[test]
    fn test_classify_out_of_range_token_is_an_error() {
        assert!(FieldKey::classify("A0").is_err());
        assert!(FieldKey::classify("ZZZZ1").is_err());
    }

    #[test]
    fn test_resolve_named_range_to_first_cell() {
        let mut names = DefinedNames::new();
        names.push(DefinedName::new("rngFirstName", "Sheet1!$F$11:$F$13"));

        let target = FieldKey::classify("rngfirstname")
            .unwrap()
            .resolve(&names)
            .unwrap();
        assert_eq!(target.sheet, SheetRef::Named("Sheet1".into()));
        assert_eq!(target.address.column_letters(), "F");
        assert_eq!(target.address.row, 11);
    }

    #[test]
    fn test_resolve_missing_name() {
        let names = DefinedNames::new();
        let err = FieldKey::classify("rngMissing")
            .unwrap()
            .resolve(&names)
            .unwrap_err();
        assert_eq!(err, Error::NameNotFound("rngMissing".into()));
    }

    #[test]
    fn test_direct_address_targets_first_sheet() {
        let target = FieldKey::classify("E7")
            .unwrap()
            .resolve(&DefinedNames::new())
            .unwrap();
        assert_eq!(target.sheet, SheetRef::First);
        assert_eq!(target.address.to_string(), "E7");
    }

    #[test]
    fn test_bindings_collapse_keys_case_insensitively() {
        let bindings: FieldBindings = vec![
            ("E7", Some("first".to_string())),
            ("rngName", Some("a".to_string())),
            ("e7", Some("last".to_string())),
        ]
        .into_iter()
        .collect();

        assert_eq!(bindings.len(), 2);
        let keys: Vec<_> = bindings.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["E7", "rngName"]);
        assert_eq!(bindings.get("E7"), Some(Some("last")));
        assert_eq!(bindings.get("RNGNAME"), Some(Some("a")));
        assert_eq!(bindings.get("missing"), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_bindings_from_json_keep_document_order() {
        let json = r#"{"rngLastName": "Doe", "E7": "Acme", "rngAge": 42, "rngNote": null, "e7": "Acme Corp"}"#;
        let bindings: FieldBindings = serde_json::from_str(json).unwrap();

        let entries: Vec<_> = bindings.iter().collect();
        assert_eq!(
            entries,
            vec![
                ("rngLastName", Some("Doe")),
                ("E7", Some("Acme Corp")),
                ("rngAge", Some("42")),
                ("rngNote", None),
            ]
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_bindings_reject_nested_values() {
        let json = r#"{"rngPreferences": ["a", "b"]}"#;
        assert!(serde_json::from_str::<FieldBindings>(json).is_err());
    }
}
