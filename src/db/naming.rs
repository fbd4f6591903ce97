//! Constraint naming convention.
//!
//! Every index and constraint the schema creates gets a name derived from its
//! kind, table and column(s), so two schema dumps of the same version always
//! diff cleanly.
//!
//! | kind        | template                                 |
//! |-------------|------------------------------------------|
//! | index       | `ix_<table>_<column>`                    |
//! | unique      | `uq_<table>_<column>`                    |
//! | check       | `ck_<table>_<constraint>`                |
//! | foreign key | `fk_<table>_<column>_<referred_table>`   |
//! | primary key | `pk_<table>`                             |

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintName<'a> {
    Index {
        table: &'a str,
        column: &'a str,
    },
    Unique {
        table: &'a str,
        column: &'a str,
    },
    Check {
        table: &'a str,
        constraint: &'a str,
    },
    ForeignKey {
        table: &'a str,
        column: &'a str,
        referred_table: &'a str,
    },
    PrimaryKey {
        table: &'a str,
    },
}

impl ConstraintName<'_> {
    pub fn prefix(&self) -> &'static str {
        match self {
            ConstraintName::Index { .. } => "ix",
            ConstraintName::Unique { .. } => "uq",
            ConstraintName::Check { .. } => "ck",
            ConstraintName::ForeignKey { .. } => "fk",
            ConstraintName::PrimaryKey { .. } => "pk",
        }
    }
}

impl fmt::Display for ConstraintName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.prefix();
        match self {
            // The index template uses the column label, which is `<table>_<column>`.
            ConstraintName::Index { table, column } | ConstraintName::Unique { table, column } => {
                write!(f, "{prefix}_{table}_{column}")
            }
            ConstraintName::Check { table, constraint } => {
                write!(f, "{prefix}_{table}_{constraint}")
            }
            ConstraintName::ForeignKey {
                table,
                column,
                referred_table,
            } => write!(f, "{prefix}_{table}_{column}_{referred_table}"),
            ConstraintName::PrimaryKey { table } => write!(f, "{prefix}_{table}"),
        }
    }
}
