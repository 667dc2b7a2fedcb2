//! Per-backend tables of what an `ALTER TABLE` and a foreign key may do.
//!
//! Policies are static data, so a check is a pure lookup: the same input
//! always produces the same verdict and nothing touches the database.

use crate::changes::{ChangeKind, ChangeSet, FieldAttribute};
use crate::definition::{ForeignKey, ForeignKeyAction};
use crate::error::{Result, SchemaError};

/// Outcome of a policy lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The backend can apply the change.
    Accept,
    /// The backend refuses the change.
    Reject(&'static str),
}

/// Which changes a backend can apply in place.
///
/// Anything absent from the tables is rejected.
#[derive(Debug)]
pub struct AlterPolicy {
    /// Verdicts per change kind.
    pub kinds: &'static [(ChangeKind, Verdict)],
    /// Verdicts per changed attribute.
    pub attributes: &'static [(FieldAttribute, Verdict)],
}

impl AlterPolicy {
    /// Looks up a change kind.
    #[must_use]
    pub fn kind_verdict(&self, kind: ChangeKind) -> Verdict {
        self.kinds
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(Verdict::Reject("change type not supported"), |(_, v)| *v)
    }

    /// Looks up a changed attribute.
    #[must_use]
    pub fn attribute_verdict(&self, attribute: FieldAttribute) -> Verdict {
        self.attributes
            .iter()
            .find(|(a, _)| *a == attribute)
            .map_or(Verdict::Reject("change type not supported"), |(_, v)| *v)
    }

    /// Checks a whole change set.
    ///
    /// # Errors
    ///
    /// Returns `CannotAlter` naming the first rejected change.
    pub fn check(&self, changes: &ChangeSet) -> Result<()> {
        for kind in changes.kinds() {
            if let Verdict::Reject(reason) = self.kind_verdict(kind) {
                return Err(SchemaError::cannot_alter(kind.as_str(), reason));
            }
        }
        for change in &changes.change {
            for attribute in &change.changed {
                if let Verdict::Reject(reason) = self.attribute_verdict(*attribute) {
                    return Err(SchemaError::cannot_alter(
                        format!("change.{}.{}", change.field, attribute),
                        reason,
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Which referential actions a backend understands.
#[derive(Debug)]
pub struct ForeignKeyPolicy {
    /// Accepted `ON UPDATE` actions.
    pub on_update: &'static [ForeignKeyAction],
    /// Accepted `ON DELETE` actions.
    pub on_delete: &'static [ForeignKeyAction],
    /// Deferrable checking is available.
    pub deferrable: bool,
}

impl ForeignKeyPolicy {
    /// Checks a foreign key against the policy.
    ///
    /// # Errors
    ///
    /// Returns `CannotAlter` for an action or deferral the backend does
    /// not understand.
    pub fn check(&self, backend: &'static str, fk: &ForeignKey) -> Result<()> {
        if let Some(action) = fk.on_update
            && !self.on_update.contains(&action)
        {
            return Err(SchemaError::cannot_alter(
                format!("ON UPDATE {}", action.as_sql()),
                format!("{backend} does not support this referential action"),
            ));
        }
        if let Some(action) = fk.on_delete
            && !self.on_delete.contains(&action)
        {
            return Err(SchemaError::cannot_alter(
                format!("ON DELETE {}", action.as_sql()),
                format!("{backend} does not support this referential action"),
            ));
        }
        if fk.deferrable && !self.deferrable {
            return Err(SchemaError::cannot_alter(
                "DEFERRABLE",
                format!("{backend} does not support deferred constraint checking"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{integer, text};

    static STRICT: AlterPolicy = AlterPolicy {
        kinds: &[
            (ChangeKind::Add, Verdict::Accept),
            (ChangeKind::Change, Verdict::Accept),
            (ChangeKind::Name, Verdict::Reject("table rename is not supported")),
        ],
        attributes: &[
            (FieldAttribute::Length, Verdict::Accept),
            (FieldAttribute::NotNull, Verdict::Reject("nullability cannot change")),
        ],
    };

    static NO_DEFER: ForeignKeyPolicy = ForeignKeyPolicy {
        on_update: &[ForeignKeyAction::Cascade],
        on_delete: &[ForeignKeyAction::Cascade, ForeignKeyAction::SetNull],
        deferrable: false,
    };

    #[test]
    fn test_verdicts_are_deterministic() {
        for _ in 0..3 {
            assert_eq!(STRICT.kind_verdict(ChangeKind::Add), Verdict::Accept);
            assert_eq!(
                STRICT.kind_verdict(ChangeKind::Name),
                Verdict::Reject("table rename is not supported")
            );
            assert_eq!(
                STRICT.attribute_verdict(FieldAttribute::Default),
                Verdict::Reject("change type not supported")
            );
        }
    }

    #[test]
    fn test_check_names_the_rejected_change() {
        let changes = ChangeSet::new().change_field(
            "id",
            [FieldAttribute::Length, FieldAttribute::NotNull],
            integer("id").not_null(),
        );
        let err = STRICT.check(&changes).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::CannotAlter { ref change, .. } if change == "change.id.notnull"
        ));

        let changes = ChangeSet::new().remove_field("x");
        let err = STRICT.check(&changes).unwrap_err();
        assert!(matches!(err, SchemaError::CannotAlter { ref change, .. } if change == "remove"));

        let ok = ChangeSet::new().add_field(text("note"));
        assert!(STRICT.check(&ok).is_ok());
    }

    #[test]
    fn test_foreign_key_policy() {
        let fk = ForeignKey::references("users", ["id"]).on_delete(ForeignKeyAction::SetNull);
        assert!(NO_DEFER.check("test", &fk).is_ok());

        let fk = ForeignKey::references("users", ["id"]).on_update(ForeignKeyAction::SetDefault);
        let err = NO_DEFER.check("test", &fk).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::CannotAlter { ref change, .. } if change == "ON UPDATE SET DEFAULT"
        ));

        let fk = ForeignKey::references("users", ["id"]).deferrable(true);
        assert!(NO_DEFER.check("test", &fk).is_err());
    }
}
