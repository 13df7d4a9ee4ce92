// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Metadata graphs used across the test suite.

use modtoken_value::{Record, Sequence, Value};

/// `{ providers: [{}] }`
pub fn single_empty_provider() -> Record {
    providers_with([Record::new()])
}

/// `{ providers: [..providers] }`
pub fn providers_with(providers: impl IntoIterator<Item = Record>) -> Record {
    Record::new().with(
        "providers",
        providers.into_iter().map(Value::Record).collect::<Sequence>(),
    )
}

/// `obj = { test: true }; obj.circular = obj`
///
/// The returned record is part of a reference cycle and is never freed.
pub fn circular_value() -> Record {
    let obj = Record::new().with("test", true);
    obj.insert("circular", obj.clone());
    obj
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_value_points_at_itself() {
        let obj = circular_value();
        assert!(matches!(obj.get("circular"), Some(Value::Record(r)) if r.ptr_eq(&obj)));
    }

    #[test]
    fn single_provider_shape() {
        let meta = single_empty_provider();
        assert_eq!(meta.keys(), vec!["providers"]);
        assert!(matches!(meta.get("providers"), Some(Value::Sequence(s)) if s.len() == 1));
    }
}
