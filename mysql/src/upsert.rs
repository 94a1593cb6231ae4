use quarry_core::ast::{ConflictAction, InsertQuery, OnConflict};
use quarry_core::compiler::{SqlWriter, UpsertStrategy};
use quarry_core::error::{QuarryError, Result};

/// `INSERT ... ON DUPLICATE KEY UPDATE c = VALUES(c)`.
///
/// MySQL resolves the conflict against every unique key of the table, so a
/// conflict target is accepted but never written. `DO NOTHING` is expressed
/// as a self-assignment of the first inserted column, which leaves the row
/// untouched. A conditional update has no MySQL form.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateKeyUpsert;

impl UpsertStrategy for DuplicateKeyUpsert {
    fn compile(
        &self,
        w: &mut SqlWriter<'_>,
        insert: &InsertQuery,
        conflict: &OnConflict,
    ) -> Result<()> {
        let dialect = w.dialect().name();
        if !insert.returning.is_none() {
            return Err(QuarryError::unsupported(dialect, "RETURNING"));
        }
        if let ConflictAction::DoUpdate { where_: Some(_), .. } = &conflict.action {
            return Err(QuarryError::unsupported(
                dialect,
                "ON DUPLICATE KEY UPDATE ... WHERE",
            ));
        }

        w.insert_head(insert)?;
        w.push(" ON DUPLICATE KEY UPDATE ");
        match &conflict.action {
            ConflictAction::DoNothing => {
                let column = insert.columns.first().ok_or_else(|| {
                    QuarryError::InvalidStatement(
                        "ignoring duplicates needs at least one inserted column".into(),
                    )
                })?;
                w.ident(column);
                w.push(" = ");
                w.ident(column);
                Ok(())
            }
            ConflictAction::DoUpdate { set, .. } => {
                w.set_excluded_scope(true);
                w.assignments(set)?;
                w.set_excluded_scope(false);
                Ok(())
            }
        }
    }

    fn render_excluded(&self, w: &mut SqlWriter<'_>, column: &str) -> Result<()> {
        w.push("VALUES(");
        w.ident(column);
        w.push_char(')');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::ast::*;
    use quarry_core::expr::{add, col, excluded, gt, lit};
    use quarry_core::value::Value;

    fn insert(action: ConflictAction) -> InsertQuery {
        InsertQuery {
            into: TableRef::new("counters"),
            columns: vec!["id".into(), "hits".into()],
            source: InsertSource::Values(vec![vec![lit(1), lit(1)]]),
            on_conflict: Some(OnConflict {
                target: Some(ConflictTarget::Columns(vec!["id".into()])),
                action,
            }),
            returning: Returning::None,
        }
    }

    #[test]
    fn update_reads_the_proposed_row() {
        let out = crate::compiler()
            .compile_insert(&insert(ConflictAction::DoUpdate {
                set: vec![Assignment::new(
                    "hits",
                    add(col("hits"), excluded("hits")).unwrap(),
                )],
                where_: None,
            }))
            .unwrap();
        assert_eq!(
            out.sql,
            "INSERT INTO `counters` (`id`, `hits`) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE `hits` = (`hits` + VALUES(`hits`))"
        );
        assert_eq!(out.params, vec![Value::from(1), Value::from(1)]);
    }

    #[test]
    fn do_nothing_is_a_self_assignment() {
        let out = crate::compiler()
            .compile_insert(&insert(ConflictAction::DoNothing))
            .unwrap();
        assert!(out.sql.ends_with("ON DUPLICATE KEY UPDATE `id` = `id`"));
    }

    #[test]
    fn conditional_update_is_unsupported() {
        let err = crate::compiler()
            .compile_insert(&insert(ConflictAction::DoUpdate {
                set: vec![Assignment::new("hits", excluded("hits"))],
                where_: Some(gt(excluded("hits"), 0).unwrap()),
            }))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "ON DUPLICATE KEY UPDATE ... WHERE is not supported by mysql"
        );
    }
}
