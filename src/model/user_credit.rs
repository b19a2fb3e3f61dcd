use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::OffsetDateTime;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UserCredit {
    pub points: i64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_claim: Option<OffsetDateTime>,
}

pub type UserCredits = HashMap<String, UserCredit>;

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct UserCreditUpdateInfo {
    pub credit: i64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UserCreditUpdateOpt {
    Plus,
    Minus,
}

