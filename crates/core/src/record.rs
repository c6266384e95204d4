//! Roster record schema
//!
//! A [`Record`] is one member entry as published by the upstream roster API.
//! The upstream payload encodes every attribute as a string; numeric-looking
//! fields (height, ranking, ids) stay strings here and are cast by queries.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Number of attributes carried by every record.
pub const FIELD_COUNT: usize = 31;

/// Column names, in storage order.
///
/// This order is the order of [`Record::values`] and of the `members` table.
pub const FIELDS: [&str; FIELD_COUNT] = [
    "sid",
    "gid",
    "gname",
    "sname",
    "fname",
    "pinyin",
    "abbr",
    "tid",
    "tname",
    "pid",
    "pname",
    "nickname",
    "company",
    "join_day",
    "height",
    "birth_day",
    "star_sign_12",
    "star_sign_48",
    "birth_place",
    "speciality",
    "hobby",
    "experience",
    "catch_phrase",
    "weibo_uid",
    "blood_type",
    "status",
    "ranking",
    "pocket_id",
    "is_group_new",
    "tcolor",
    "gcolor",
];

/// One roster member.
///
/// Missing or null optional attributes deserialize to the empty string.
/// Upstream numbers and booleans are kept as their textual rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    /// Member id, unique across the roster (e.g. "10125")
    #[serde(deserialize_with = "text")]
    pub sid: String,
    /// Group id (SNH48=10, GNZ48=20, BEJ48=30, CKG48=50, CGT48=60)
    #[serde(deserialize_with = "text")]
    pub gid: String,
    /// Group short name ("SNH", "GNZ", ...)
    #[serde(deserialize_with = "text")]
    pub gname: String,
    /// Chinese stage name
    #[serde(deserialize_with = "text")]
    pub sname: String,
    /// Name split into family / given parts
    #[serde(deserialize_with = "text")]
    pub fname: String,
    /// Romanized name
    #[serde(deserialize_with = "text")]
    pub pinyin: String,
    /// Name initials
    #[serde(deserialize_with = "text")]
    pub abbr: String,
    /// Team id (SII=101, NII=102, HII=103, X=104)
    #[serde(deserialize_with = "text")]
    pub tid: String,
    /// Team short name ("SII", "NII", "HII", "X")
    #[serde(deserialize_with = "text")]
    pub tname: String,
    /// Generation id
    #[serde(deserialize_with = "text")]
    pub pid: String,
    /// Generation name (e.g. "SNH48 五期生")
    #[serde(deserialize_with = "text")]
    pub pname: String,
    /// Nicknames separated by "、"
    #[serde(deserialize_with = "text")]
    pub nickname: String,
    /// Managing company
    #[serde(deserialize_with = "text")]
    pub company: String,
    /// YYYY-MM-DD
    #[serde(deserialize_with = "text")]
    pub join_day: String,
    /// Centimetres
    #[serde(deserialize_with = "text")]
    pub height: String,
    /// MM.DD
    #[serde(deserialize_with = "text")]
    pub birth_day: String,
    /// Western zodiac sign
    #[serde(deserialize_with = "text")]
    pub star_sign_12: String,
    /// Group-specific constellation
    #[serde(deserialize_with = "text")]
    pub star_sign_48: String,
    /// Birthplace, e.g. "中国 四川 "
    #[serde(deserialize_with = "text")]
    pub birth_place: String,
    /// Talents
    #[serde(deserialize_with = "text")]
    pub speciality: String,
    /// Hobbies
    #[serde(deserialize_with = "text")]
    pub hobby: String,
    /// Free text, may contain `<br>` markup
    #[serde(deserialize_with = "text")]
    pub experience: String,
    /// Self-introduction line
    #[serde(deserialize_with = "text")]
    pub catch_phrase: String,
    /// "0" when the member has no account
    #[serde(deserialize_with = "text")]
    pub weibo_uid: String,
    /// "-" when unknown
    #[serde(deserialize_with = "text")]
    pub blood_type: String,
    /// "99" for active members
    #[serde(deserialize_with = "text")]
    pub status: String,
    /// Latest annual ranking, "0" when unranked
    #[serde(deserialize_with = "text")]
    pub ranking: String,
    /// "0" when the member has no account
    #[serde(deserialize_with = "text")]
    pub pocket_id: String,
    /// "1" or "0"
    #[serde(deserialize_with = "text")]
    pub is_group_new: String,
    /// Team colour, hex without '#'
    #[serde(deserialize_with = "text")]
    pub tcolor: String,
    /// Group colour, hex without '#'
    #[serde(deserialize_with = "text")]
    pub gcolor: String,
}

impl Record {
    /// The unique identifier of this record.
    pub fn identifier(&self) -> &str {
        &self.sid
    }

    /// All attribute values in [`FIELDS`] order.
    pub fn values(&self) -> [&str; FIELD_COUNT] {
        [
            &self.sid,
            &self.gid,
            &self.gname,
            &self.sname,
            &self.fname,
            &self.pinyin,
            &self.abbr,
            &self.tid,
            &self.tname,
            &self.pid,
            &self.pname,
            &self.nickname,
            &self.company,
            &self.join_day,
            &self.height,
            &self.birth_day,
            &self.star_sign_12,
            &self.star_sign_48,
            &self.birth_place,
            &self.speciality,
            &self.hobby,
            &self.experience,
            &self.catch_phrase,
            &self.weibo_uid,
            &self.blood_type,
            &self.status,
            &self.ranking,
            &self.pocket_id,
            &self.is_group_new,
            &self.tcolor,
            &self.gcolor,
        ]
    }

    /// Check the required attributes.
    ///
    /// `position` is the record's index in its dataset, used for reporting.
    pub fn validate(&self, position: usize) -> Result<()> {
        for (field, value) in [("sid", &self.sid), ("sname", &self.sname)] {
            if value.trim().is_empty() {
                return Err(Error::MissingField { position, field });
            }
        }
        Ok(())
    }
}

/// Accept strings, numbers, booleans and null as text.
fn text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(if b { "1" } else { "0" }.to_string()),
        other => Err(D::Error::custom(format!(
            "expected a scalar attribute, found {}",
            other
        ))),
    }
}
