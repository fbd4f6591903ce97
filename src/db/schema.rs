//! Table definitions for the camp database.
//!
//! The DDL for each table is rendered from these definitions so every
//! constraint carries a name from [`ConstraintName`].

use crate::db::naming::ConstraintName;

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
    pub not_null: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub referred_table: &'static str,
    pub referred_column: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    pub expression: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
    pub checks: &'static [Check],
    pub indexed_columns: &'static [&'static str],
}

const fn column(name: &'static str, sql_type: &'static str, not_null: bool) -> Column {
    Column {
        name,
        sql_type,
        not_null,
    }
}

pub const ACTIVITIES: Table = Table {
    name: "activities",
    primary_key: "id",
    columns: &[
        column("id", "INTEGER", true),
        column("name", "TEXT", false),
        column("difficulty", "INTEGER", false),
        column("created_at", "TEXT", true),
        column("updated_at", "TEXT", true),
    ],
    foreign_keys: &[],
    checks: &[],
    indexed_columns: &[],
};

pub const CAMPERS: Table = Table {
    name: "campers",
    primary_key: "id",
    columns: &[
        column("id", "INTEGER", true),
        column("name", "TEXT", true),
        column("age", "INTEGER", true),
        column("created_at", "TEXT", true),
        column("updated_at", "TEXT", true),
    ],
    foreign_keys: &[],
    checks: &[
        Check {
            name: "name_present",
            expression: "length(name) > 0",
        },
        Check {
            name: "age_range",
            expression: "age BETWEEN 8 AND 18",
        },
    ],
    indexed_columns: &[],
};

// Signups intentionally carry no created_at/updated_at columns.
pub const SIGNUPS: Table = Table {
    name: "signups",
    primary_key: "id",
    columns: &[
        column("id", "INTEGER", true),
        column("time", "INTEGER", false),
        column("camper_id", "INTEGER", true),
        column("activity_id", "INTEGER", true),
    ],
    foreign_keys: &[
        ForeignKey {
            column: "camper_id",
            referred_table: "campers",
            referred_column: "id",
        },
        ForeignKey {
            column: "activity_id",
            referred_table: "activities",
            referred_column: "id",
        },
    ],
    checks: &[Check {
        name: "time_range",
        expression: "time BETWEEN 0 AND 23",
    }],
    indexed_columns: &["camper_id", "activity_id"],
};

/// Tables in creation order (referenced tables first).
pub const TABLES: [&Table; 3] = [&ACTIVITIES, &CAMPERS, &SIGNUPS];

impl Table {
    pub fn create_table_sql(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|col| {
                if col.not_null && col.name != self.primary_key {
                    format!("{} {} NOT NULL", col.name, col.sql_type)
                } else {
                    format!("{} {}", col.name, col.sql_type)
                }
            })
            .collect();

        // A single INTEGER primary key stays an alias for the rowid.
        parts.push(format!(
            "CONSTRAINT {} PRIMARY KEY ({})",
            ConstraintName::PrimaryKey { table: self.name },
            self.primary_key
        ));

        for fk in self.foreign_keys {
            parts.push(format!(
                "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
                ConstraintName::ForeignKey {
                    table: self.name,
                    column: fk.column,
                    referred_table: fk.referred_table,
                },
                fk.column,
                fk.referred_table,
                fk.referred_column
            ));
        }

        for check in self.checks {
            parts.push(format!(
                "CONSTRAINT {} CHECK ({})",
                ConstraintName::Check {
                    table: self.name,
                    constraint: check.name,
                },
                check.expression
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
            self.name,
            parts.join(",\n    ")
        )
    }

    pub fn create_index_sql(&self) -> Vec<String> {
        self.indexed_columns
            .iter()
            .map(|&column| {
                format!(
                    "CREATE INDEX IF NOT EXISTS {} ON {} ({});",
                    ConstraintName::Index {
                        table: self.name,
                        column,
                    },
                    self.name,
                    column
                )
            })
            .collect()
    }
}

/// Full DDL batch for a fresh database.
pub fn create_schema_sql() -> String {
    let mut statements = Vec::new();
    for table in TABLES {
        statements.push(table.create_table_sql());
        statements.extend(table.create_index_sql());
    }
    statements.join("\n")
}
