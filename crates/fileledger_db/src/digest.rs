//! Salted, order-dependent table digest.
//!
//! For every row in id order and every column in declared order, the cell's
//! text is hashed together with the salt and the 16 raw digest bytes are
//! appended to a buffer. The signature is the hex MD5 of that buffer.
//!
//! ```text
//! row 1: md5(salt ‖ id) md5(salt ‖ full_path) ... md5(salt ‖ date_last_modification)
//! row 2: ...
//! signature = hex(md5(all of the above))
//! ```
//!
//! Reordering rows or columns changes the signature even when the multiset of
//! values is the same.

/// Fixed salt mixed into every cell. A constant rather than a per-run nonce, so
/// identical tables always yield identical signatures.
pub const DEFAULT_CHALLENGE: &str =
    "510D5B0B6245A77B40B52C60DF3E0F85480D323C184B3BF6673044E249E12B3F";

/// A named, typed accessor that renders one column of a row as text.
pub struct Column<R> {
    pub name: &'static str,
    pub render: fn(&R) -> String,
}

/// A table whose rows can be digested column by column.
pub trait DigestTable: Sized + 'static {
    /// Table name in the store.
    const TABLE: &'static str;

    /// Columns in digest order. Must list every column of the table.
    const COLUMNS: &'static [Column<Self>];

    /// Build a row from a `SELECT` of [`Self::COLUMNS`] in declared order.
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;

    /// `SELECT` statement reading every column in digest order.
    fn select_sql() -> String {
        let cols = Self::COLUMNS
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ");
        format!("SELECT {} FROM {} ORDER BY id", cols, Self::TABLE)
    }
}

/// Running digest over cells.
#[derive(Debug, Clone)]
pub struct TableDigest {
    salt: String,
    buffer: Vec<u8>,
    cells: u64,
}

impl TableDigest {
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            buffer: Vec::new(),
            cells: 0,
        }
    }

    /// Hash one cell's text with the salt and append it.
    pub fn push_cell(&mut self, text: &str) {
        let mut ctx = md5::Context::new();
        ctx.consume(self.salt.as_bytes());
        ctx.consume(text.as_bytes());
        self.buffer.extend_from_slice(&ctx.compute().0);
        self.cells += 1;
    }

    /// Append every column of `row` in declared order.
    pub fn push_row<R: DigestTable>(&mut self, row: &R) {
        for column in R::COLUMNS {
            self.push_cell(&(column.render)(row));
        }
    }

    pub fn cells(&self) -> u64 {
        self.cells
    }

    /// Final signature as lowercase hex.
    pub fn finish(self) -> String {
        format!("{:x}", md5::compute(&self.buffer))
    }
}

/// Digest a sequence of rows in iteration order.
pub fn digest_rows<'a, R, I>(rows: I, salt: &str) -> String
where
    R: DigestTable + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut digest = TableDigest::new(salt);
    for row in rows {
        digest.push_row(row);
    }
    digest.finish()
}
