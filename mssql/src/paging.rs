use quarry_core::compiler::{Page, PaginationStrategy, SqlWriter};
use quarry_core::error::Result;

/// `OFFSET m ROWS [FETCH NEXT n ROWS ONLY]`.
///
/// SQL Server only pages an ordered result, so an unordered query gets
/// `ORDER BY (SELECT NULL)` first.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetFetch;

impl PaginationStrategy for OffsetFetch {
    fn render(&self, w: &mut SqlWriter<'_>, page: Page) -> Result<()> {
        if !page.ordered {
            w.push(" ORDER BY (SELECT NULL)");
        }
        w.push(" OFFSET ");
        w.push_number(page.offset.unwrap_or(0));
        w.push(" ROWS");
        if let Some(limit) = page.limit {
            w.push(" FETCH NEXT ");
            w.push_number(limit);
            w.push(" ROWS ONLY");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quarry_core::ast::{OrderByItem, SelectItem, SelectQuery};
    use quarry_core::expr::col;

    fn todos() -> SelectQuery {
        let mut q = SelectQuery::from_table("todos");
        q.columns = vec![SelectItem::new(col("id"))];
        q
    }

    #[test]
    fn unordered_pages_get_a_neutral_ordering() {
        let mut q = todos();
        q.limit = Some(10);
        assert_eq!(
            crate::compiler().compile_select(&q).unwrap().sql,
            "SELECT [id] FROM [todos] ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn ordered_offset_only() {
        let mut q = todos();
        q.order_by = vec![OrderByItem::desc(col("id"))];
        q.offset = Some(20);
        assert_eq!(
            crate::compiler().compile_select(&q).unwrap().sql,
            "SELECT [id] FROM [todos] ORDER BY [id] DESC OFFSET 20 ROWS"
        );
    }
}
