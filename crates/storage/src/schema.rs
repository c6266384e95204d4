//! `members` table definition
//!
//! One `TEXT` column per record attribute, in [`FIELDS`] order, keyed by
//! `sid`. `identifier` is a generated alias of `sid` so queries can use
//! either name.

use roster_core::{FIELDS, FIELD_COUNT};

/// Name of the only table in a store.
pub const TABLE_NAME: &str = "members";

/// Generated alias column for the record identifier.
pub const IDENTIFIER_ALIAS: &str = "identifier";

/// One `members` column as documented for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnGuide {
    /// Column name
    pub name: &'static str,
    /// Meaning, value format and sentinel values
    pub description: &'static str,
}

const fn column(name: &'static str, description: &'static str) -> ColumnGuide {
    ColumnGuide { name, description }
}

/// Every `members` column in table order, `identifier` last.
///
/// All columns are `TEXT`; compare numbers with `CAST(col AS INTEGER)`.
pub const COLUMN_GUIDE: [ColumnGuide; FIELD_COUNT + 1] = [
    column("sid", "Member id, primary key, e.g. \"10125\""),
    column(
        "gid",
        "Group id: SNH48=10, GNZ48=20, BEJ48=30, CKG48=50, CGT48=60",
    ),
    column("gname", "Group short name: SNH | GNZ | BEJ | CKG | CGT"),
    column("sname", "Chinese stage name, e.g. \"刘增艳\""),
    column("fname", "Name with family and given parts split, e.g. \"刘 增艳\""),
    column("pinyin", "Romanized name, e.g. \"Liu ZengYan\""),
    column("abbr", "Name initials, e.g. \"LZY\""),
    column("tid", "Team id: SII=101, NII=102, HII=103, X=104 (SNH48 teams)"),
    column("tname", "Team short name: SII | NII | HII | X"),
    column("pid", "Generation id"),
    column("pname", "Generation name, e.g. \"SNH48 五期生\""),
    column("nickname", "Nicknames separated by \"、\""),
    column("company", "Managing company"),
    column("join_day", "Join date, YYYY-MM-DD"),
    column("height", "Height in cm, e.g. \"157\"; may be empty"),
    column("birth_day", "Birthday, MM.DD, e.g. \"08.31\""),
    column("star_sign_12", "Western zodiac sign, e.g. \"处女座\""),
    column("star_sign_48", "Group-specific constellation"),
    column("birth_place", "Birthplace, \"中国 <province> \", e.g. \"中国 四川 \""),
    column("speciality", "Talents"),
    column("hobby", "Hobbies"),
    column("experience", "Career notes with <br> line breaks"),
    column("catch_phrase", "Self-introduction line"),
    column("weibo_uid", "Weibo user id; \"0\" when none"),
    column("blood_type", "A | B | O | AB; \"-\" when unknown"),
    column("status", "\"99\" for active members"),
    column("ranking", "Latest annual ranking; \"0\" when unranked"),
    column("pocket_id", "Pocket48 user id; \"0\" when none"),
    column("is_group_new", "\"1\" for new members, \"0\" otherwise"),
    column("tcolor", "Team colour, hex without '#', e.g. \"91cdeb\""),
    column("gcolor", "Group colour, hex without '#', e.g. \"8ed2f5\""),
    column(IDENTIFIER_ALIAS, "Alias of sid"),
];

/// A worked query over the `members` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleQuery {
    /// What the query answers
    pub description: &'static str,
    /// The statement
    pub sql: &'static str,
}

/// Example statements shown by schema listings.
pub const EXAMPLE_QUERIES: &[ExampleQuery] = &[
    ExampleQuery {
        description: "Search by name",
        sql: "SELECT sid, sname, pinyin, gname, tname, pname FROM members WHERE sname LIKE '%段艺璇%'",
    },
    ExampleQuery {
        description: "All of SNH48 Team SII",
        sql: "SELECT sname, pinyin, birth_place, height FROM members WHERE gname = 'SNH' AND tname = 'SII'",
    },
    ExampleQuery {
        description: "Members per team",
        sql: "SELECT gname, tname, COUNT(*) AS cnt FROM members GROUP BY gname, tname ORDER BY gname, cnt DESC",
    },
    ExampleQuery {
        description: "Members born in Sichuan",
        sql: "SELECT sname, gname, tname, birth_place FROM members WHERE birth_place LIKE '%四川%'",
    },
    ExampleQuery {
        description: "Ten tallest members",
        sql: "SELECT sname, gname, tname, CAST(height AS INTEGER) AS h FROM members WHERE height != '' ORDER BY h DESC LIMIT 10",
    },
    ExampleQuery {
        description: "Members with a Pocket48 account",
        sql: "SELECT sname, tname, pocket_id FROM members WHERE pocket_id != '0' ORDER BY tname",
    },
    ExampleQuery {
        description: "Top ten of the latest annual ranking",
        sql: "SELECT sname, gname, tname, CAST(ranking AS INTEGER) AS r FROM members WHERE ranking != '0' ORDER BY r LIMIT 10",
    },
];

pub(crate) fn create_table_sql() -> String {
    let mut columns: Vec<String> = FIELDS
        .iter()
        .map(|field| {
            if *field == "sid" {
                format!("    {} TEXT PRIMARY KEY NOT NULL", field)
            } else {
                format!("    {} TEXT", field)
            }
        })
        .collect();
    columns.push(format!(
        "    {} TEXT GENERATED ALWAYS AS (sid) VIRTUAL",
        IDENTIFIER_ALIAS
    ));
    format!("CREATE TABLE {} (\n{}\n)", TABLE_NAME, columns.join(",\n"))
}

pub(crate) fn insert_sql() -> String {
    let placeholders = vec!["?"; FIELDS.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        TABLE_NAME,
        FIELDS.join(", "),
        placeholders
    )
}
