// Consistency Gate
//
// Optimistic push-acceptance rule. A push is admitted against the
// current latest version of a key; the gate itself is pure and never
// touches the store.

/// Outcome of checking a push against the current latest version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Key has no history yet.
    Create,

    /// `prev_version` matches the latest version.
    Advance,

    /// `version == prev_version`; accepted without looking at the latest.
    /// The bypass is unconditional, even when the latest version differs.
    Overwrite,

    /// `prev_version` does not match the latest version.
    Conflict,
}

impl Admission {
    pub fn is_accepted(self) -> bool {
        !matches!(self, Admission::Conflict)
    }
}

/// Decide whether a push may be applied.
///
/// `latest` is the version of the most recently appended record, or
/// `None` when the key has no history.
pub fn admit<V: PartialEq>(latest: Option<&V>, version: &V, prev_version: Option<&V>) -> Admission {
    let Some(latest) = latest else {
        return Admission::Create;
    };

    match prev_version {
        Some(prev) if prev == version => Admission::Overwrite,
        Some(prev) if prev == latest => Admission::Advance,
        _ => Admission::Conflict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_key_is_always_created() {
        assert_eq!(admit(None, &"a", None), Admission::Create);
        assert_eq!(admit(None, &"a", Some(&"zz")), Admission::Create);
    }

    #[test]
    fn matching_prev_version_advances() {
        assert_eq!(admit(Some(&"a"), &"b", Some(&"a")), Admission::Advance);
    }

    #[test]
    fn mismatched_prev_version_conflicts() {
        let admission = admit(Some(&"a"), &"c", Some(&"z"));
        assert_eq!(admission, Admission::Conflict);
        assert!(!admission.is_accepted());
    }

    #[test]
    fn missing_prev_version_conflicts_on_existing_key() {
        assert_eq!(admit(Some(&"a"), &"b", None), Admission::Conflict);
    }

    #[test]
    fn equal_version_and_prev_version_bypass_the_check() {
        assert_eq!(admit(Some(&"a"), &"a", Some(&"a")), Admission::Overwrite);
        assert_eq!(admit(Some(&"b"), &"a", Some(&"a")), Admission::Overwrite);
        assert!(Admission::Overwrite.is_accepted());
    }
}
