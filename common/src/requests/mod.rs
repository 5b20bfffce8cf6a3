use crate::model::row::NaturalKey;
use crate::model::ChatId;
use serde::Serialize;

/// Query string for `GET /users?chat_id=<id>`.
#[derive(Debug, Serialize)]
pub struct UserQuery {
    pub chat_id: ChatId,
}

/// Query string for `GET /data` filtered by natural key.
#[derive(Debug, Serialize)]
pub struct DataQuery<'a> {
    #[serde(rename = "user_full_name")]
    pub full_name: &'a str,
    pub month: &'a str,
    #[serde(rename = "organization_name")]
    pub organization: &'a str,
}

impl<'a> From<&'a NaturalKey> for DataQuery<'a> {
    fn from(key: &'a NaturalKey) -> Self {
        DataQuery {
            full_name: &key.full_name,
            month: &key.month,
            organization: &key.organization,
        }
    }
}
